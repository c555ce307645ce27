// Aggregate handlers (a001-a004)
pub mod a001_work_order;
pub mod a002_accessory_sale;
pub mod a003_expense;
pub mod a004_customer;

// Dashboard handlers
pub mod d400_financial_reports;

// Shared stores
pub mod activity_log;
pub mod print_layouts;
