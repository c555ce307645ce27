pub mod activity_log;
pub mod print_layout;
