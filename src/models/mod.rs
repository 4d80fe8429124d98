pub mod employee;
pub mod query;
