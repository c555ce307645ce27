pub mod a001_work_order;
pub mod a002_accessory_sale;
pub mod a003_expense;
pub mod a004_customer;
