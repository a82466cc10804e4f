pub mod error;
pub mod position;
