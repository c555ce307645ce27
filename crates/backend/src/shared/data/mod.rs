pub mod db;
pub mod row;
pub mod schema;
pub mod sequence;
