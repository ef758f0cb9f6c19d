pub mod inputs;
pub mod quote;
