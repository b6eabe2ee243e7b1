pub mod calc;
pub mod quote;
pub mod token;
