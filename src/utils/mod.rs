pub mod pagination;
pub mod upload;
pub mod validation;
