pub mod types;
pub mod weatherapi;
