pub mod sender;
pub mod source;
pub mod viewer;
