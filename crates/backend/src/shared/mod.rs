pub mod activity_log;
pub mod config;
pub mod data;
pub mod error;
pub mod format;
pub mod print_layout;
pub mod time;
pub mod validation;
