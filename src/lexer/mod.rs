mod token;
mod scanner;

pub use scanner::{reserved_word, LexError, Scanner, END_OF_INPUT_TEXT};
pub use token::{Token, TokenKind};

/// Scans the whole source, ending with the `EndOfInput` token.
pub fn lex(src: &str) -> Result<Vec<Token>, LexError> {
    Scanner::new(src).collect()
}
