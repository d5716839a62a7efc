//! Front end for a small imperative language: a scanner that turns source
//! text into tokens on demand, and a predictive recursive-descent parser that
//! accepts or rejects the token stream.

pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
