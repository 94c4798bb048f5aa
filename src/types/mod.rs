pub mod ast;
pub mod grammar;
pub mod span;
pub mod unit;
