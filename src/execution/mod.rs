pub mod processor;
pub mod stream;
