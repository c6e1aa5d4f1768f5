pub mod sentiment;
pub mod types;
