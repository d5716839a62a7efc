mod parser;

pub use parser::{ParseReport, Parser, ParserError};

use crate::lexer::Scanner;

/// Scans and validates `src` in one pass with a fresh scanner.
pub fn parse_source(src: &str) -> ParseReport {
    Parser::new(Scanner::new(src)).parse()
}
