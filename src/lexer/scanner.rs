use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::lexer::{Token, TokenKind};
use crate::span::Position;

/// Text carried by the `EndOfInput` token.
pub const END_OF_INPUT_TEXT: &str = "END_OF_INPUT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("invalid identifier '{text}' at {position}")]
    InvalidIdentifier { text: String, position: Position },

    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("unrecognized symbol '{symbol}' at {position}")]
    UnrecognizedSymbol { symbol: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::InvalidNumber { position, .. }
            | LexError::InvalidIdentifier { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::UnrecognizedSymbol { position, .. } => *position,
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        let position = err.position();
        Diagnostic::error(format!("lexical error: {err}")).with_position(position)
    }
}

/// Reserved words are case-sensitive and matched on the whole lexeme.
pub fn reserved_word(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "DECLARACOES" => TokenKind::Declarations,
        "ALGORITMO" => TokenKind::Algorithm,
        "INTEIRO" => TokenKind::Integer,
        "REAL" => TokenKind::Real,
        "IMPRIMIR" => TokenKind::Print,
        "LER" => TokenKind::Read,
        "SE" => TokenKind::If,
        "ENTAO" => TokenKind::Then,
        "SENAO" => TokenKind::Else,
        "ENQUANTO" => TokenKind::While,
        "INICIO" => TokenKind::Begin,
        "FIM" => TokenKind::End,
        "E" => TokenKind::And,
        "OU" => TokenKind::Or,
        "VARIAVEL" => TokenKind::Variable,
        _ => return None,
    };
    Some(kind)
}

/// Produces tokens on demand from a source string.
///
/// `offset` and `position` always describe the next unconsumed character and
/// only move forward. Once the input is exhausted every call yields an
/// `EndOfInput` token at the same position.
pub struct Scanner<'a> {
    source: &'a str,
    offset: usize,
    position: Position,
    exhausted: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::start(),
            exhausted: false,
        }
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> Position {
        self.position
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.offset..].chars().nth(1)
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.offset += ch.len_utf8();
        self.position.advance(ch);
        Some(ch)
    }

    fn next_if(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn skip_insignificant(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.next_char();
            } else if ch == '/' && self.peek_second() == Some('*') {
                self.skip_block_comment();
            } else if ch == '#' {
                self.skip_line_comment();
            } else {
                break;
            }
        }
    }

    // An unclosed comment swallows the rest of the input.
    fn skip_block_comment(&mut self) {
        self.next_char();
        self.next_char();
        while let Some(ch) = self.next_char() {
            if ch == '*' && self.next_if('/') {
                return;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' || ch == '\r' {
                break;
            }
            self.next_char();
        }
    }

    fn fail(&self, err: LexError) -> LexError {
        tracing::error!(line = err.position().line, column = err.position().column, "{err}");
        err
    }

    fn read_word(&mut self, first: char, start: Position) -> Token {
        let mut text = String::new();
        text.push(first);

        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.next_char();
            } else {
                break;
            }
        }

        let kind = reserved_word(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, start)
    }

    fn read_number(&mut self, first: char, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first);
        let mut seen_dot = first == '.';

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.next_char();
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                text.push(ch);
                self.next_char();
            } else {
                break;
            }
        }

        if text.ends_with('.') {
            return Err(self.fail(LexError::InvalidNumber { text, position: start }));
        }

        if self.peek_char().is_some_and(char::is_alphabetic) {
            while let Some(ch) = self.peek_char() {
                if ch.is_alphanumeric() {
                    text.push(ch);
                    self.next_char();
                } else {
                    break;
                }
            }
            return Err(self.fail(LexError::InvalidIdentifier { text, position: start }));
        }

        let kind = if seen_dot {
            TokenKind::RealLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        Ok(Token::new(kind, text, start))
    }

    fn read_string(&mut self, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();

        while let Some(ch) = self.next_char() {
            if ch == '"' {
                return Ok(Token::new(TokenKind::StringLiteral, text, start));
            }
            text.push(ch);
        }

        Err(self.fail(LexError::UnterminatedString { position: start }))
    }

    /// Relational operator that may take a trailing `=`.
    fn relational(&mut self, first: char, start: Position) -> Token {
        let mut text = String::from(first);
        if self.next_if('=') {
            text.push('=');
        }
        Token::new(TokenKind::RelationalOp, text, start)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_insignificant();

        let start = self.position;
        let ch = match self.next_char() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::EndOfInput, END_OF_INPUT_TEXT, start)),
        };

        let single = |kind: TokenKind| -> Result<Token, LexError> { Ok(Token::new(kind, ch.to_string(), start)) };

        match ch {
            c if c.is_alphabetic() || c == '_' => Ok(self.read_word(c, start)),
            c if c.is_ascii_digit() || c == '.' => self.read_number(c, start),
            '+' | '-' | '*' | '/' => single(TokenKind::ArithmeticOp),
            '(' => single(TokenKind::LeftParen),
            ')' => single(TokenKind::RightParen),
            ':' => single(TokenKind::Colon),
            '>' | '<' => Ok(self.relational(ch, start)),
            '!' if self.next_if('=') => Ok(Token::new(TokenKind::RelationalOp, "!=", start)),
            '=' => {
                if self.next_if('=') {
                    Ok(Token::new(TokenKind::RelationalOp, "==", start))
                } else {
                    single(TokenKind::AssignOp)
                }
            }
            '"' => self.read_string(start),
            other => Err(self.fail(LexError::UnrecognizedSymbol { symbol: other, position: start })),
        }
    }
}

/// Yields tokens up to and including the first `EndOfInput` or the first
/// lexical error, then stops.
impl Iterator for Scanner<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let item = self.next_token();
        self.exhausted = match &item {
            Ok(tok) => tok.is(TokenKind::EndOfInput),
            Err(_) => true,
        };
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::{reserved_word, LexError, Scanner, END_OF_INPUT_TEXT};
    use crate::lexer::{Token, TokenKind};
    use crate::span::Position;

    fn collect_kinds(src: &str) -> Result<Vec<TokenKind>, LexError> {
        let mut scanner = Scanner::new(src);
        let mut kinds = Vec::new();

        loop {
            let kind = scanner.next_token()?.kind;
            kinds.push(kind);
            if kind == TokenKind::EndOfInput {
                break;
            }
        }

        Ok(kinds)
    }

    fn single(src: &str) -> Token {
        let mut scanner = Scanner::new(src);
        let tok = scanner.next_token().unwrap();
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::EndOfInput);
        tok
    }

    #[test]
    fn lex_identifier() {
        let tok = single("idade_2");
        assert_eq!(tok, Token::new(TokenKind::Identifier, "idade_2", Position::new(1, 1)));
    }

    #[test]
    fn lex_underscore_start_identifier() {
        assert_eq!(single("_x").kind, TokenKind::Identifier);
    }

    #[test]
    fn lex_keywords() {
        let kinds = collect_kinds("DECLARACOES ALGORITMO INTEIRO REAL IMPRIMIR LER").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Declarations,
                TokenKind::Algorithm,
                TokenKind::Integer,
                TokenKind::Real,
                TokenKind::Print,
                TokenKind::Read,
                TokenKind::EndOfInput,
            ]
        );

        let kinds = collect_kinds("SE ENTAO SENAO ENQUANTO INICIO FIM E OU VARIAVEL").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Begin,
                TokenKind::End,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Variable,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn lex_keywords_are_case_sensitive() {
        let kinds = collect_kinds("inicio Fim ENTAOX").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
        assert_eq!(reserved_word("se"), None);
        assert_eq!(reserved_word("SE"), Some(TokenKind::If));
    }

    #[test]
    fn lex_integer() {
        let tok = single("12345");
        assert_eq!(tok.kind, TokenKind::IntegerLiteral);
        assert_eq!(tok.text, "12345");
    }

    #[test]
    fn lex_real() {
        let tok = single("3.14");
        assert_eq!(tok.kind, TokenKind::RealLiteral);
        assert_eq!(tok.text, "3.14");
    }

    #[test]
    fn lex_real_without_integer_part() {
        let tok = single(".5");
        assert_eq!(tok.kind, TokenKind::RealLiteral);
        assert_eq!(tok.text, ".5");
    }

    #[test]
    fn lex_second_dot_starts_new_number() {
        let mut scanner = Scanner::new("1.2.3");
        assert_eq!(scanner.next_token().unwrap().text, "1.2");
        assert_eq!(scanner.next_token().unwrap().text, ".3");
    }

    #[test]
    fn lex_trailing_dot_is_error() {
        let mut scanner = Scanner::new("3.");
        assert_eq!(
            scanner.next_token(),
            Err(LexError::InvalidNumber { text: "3.".to_string(), position: Position::new(1, 1) })
        );
    }

    #[test]
    fn lex_lone_dot_is_error() {
        let mut scanner = Scanner::new(".");
        assert!(matches!(scanner.next_token(), Err(LexError::InvalidNumber { .. })));
    }

    #[test]
    fn lex_number_followed_by_letters_is_error() {
        let mut scanner = Scanner::new("123abc x");
        assert_eq!(
            scanner.next_token(),
            Err(LexError::InvalidIdentifier {
                text: "123abc".to_string(),
                position: Position::new(1, 1),
            })
        );
        // the malformed lexeme was consumed whole
        assert_eq!(scanner.next_token().unwrap().text, "x");
    }

    #[test]
    fn lex_two_char_relational_operators() {
        for op in [">=", "<=", "==", "!="] {
            let tok = single(op);
            assert_eq!(tok.kind, TokenKind::RelationalOp, "{op}");
            assert_eq!(tok.text, op);
        }
    }

    #[test]
    fn lex_one_char_relational_operators() {
        for op in [">", "<"] {
            let tok = single(op);
            assert_eq!(tok.kind, TokenKind::RelationalOp);
            assert_eq!(tok.text, op);
        }
    }

    #[test]
    fn lex_assign_vs_equality() {
        let mut scanner = Scanner::new("= == =");
        let texts: Vec<_> = std::iter::from_fn(|| scanner.next_token().ok())
            .take_while(|t| !t.is(TokenKind::EndOfInput))
            .map(|t| (t.kind, t.text))
            .collect();
        assert_eq!(
            texts,
            vec![
                (TokenKind::AssignOp, "=".to_string()),
                (TokenKind::RelationalOp, "==".to_string()),
                (TokenKind::AssignOp, "=".to_string()),
            ]
        );
    }

    #[test]
    fn lex_lone_bang_is_unrecognized() {
        let mut scanner = Scanner::new("! =");
        assert_eq!(
            scanner.next_token(),
            Err(LexError::UnrecognizedSymbol { symbol: '!', position: Position::new(1, 1) })
        );
        assert_eq!(scanner.next_token().unwrap().kind, TokenKind::AssignOp);
    }

    #[test]
    fn lex_punctuation() {
        let kinds = collect_kinds("+-*/():").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::ArithmeticOp,
                TokenKind::ArithmeticOp,
                TokenKind::ArithmeticOp,
                TokenKind::ArithmeticOp,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Colon,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn lex_string() {
        let tok = single("\"ola mundo\"");
        assert_eq!(tok.kind, TokenKind::StringLiteral);
        assert_eq!(tok.text, "ola mundo");
    }

    #[test]
    fn lex_empty_string() {
        assert_eq!(single("\"\"").text, "");
    }

    #[test]
    fn lex_unterminated_string() {
        let mut scanner = Scanner::new("x \"never closed");
        scanner.next_token().unwrap();
        assert_eq!(
            scanner.next_token(),
            Err(LexError::UnterminatedString { position: Position::new(1, 3) })
        );
    }

    #[test]
    fn lex_unrecognized_symbol() {
        let mut scanner = Scanner::new("a ; b");
        assert!(scanner.next_token().is_ok());
        assert_eq!(
            scanner.next_token(),
            Err(LexError::UnrecognizedSymbol { symbol: ';', position: Position::new(1, 3) })
        );
    }

    #[test]
    fn lex_error_is_reported_once_then_scanning_continues() {
        let results: Vec<_> = {
            let mut scanner = Scanner::new("a 3. b");
            (0..4).map(|_| scanner.next_token()).collect()
        };
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().text, "b");
        assert_eq!(results[3].as_ref().unwrap().kind, TokenKind::EndOfInput);
    }

    #[test]
    fn lex_comments() {
        let kinds = collect_kinds("# line comment\na /* block\n comment */ b # tail").unwrap();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EndOfInput]
        );
    }

    #[test]
    fn lex_unclosed_block_comment_is_tolerated() {
        let kinds = collect_kinds("a /* never closed").unwrap();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::EndOfInput]);
    }

    #[test]
    fn lex_slash_without_star_is_division() {
        let kinds = collect_kinds("a / b").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::ArithmeticOp,
                TokenKind::Identifier,
                TokenKind::EndOfInput
            ]
        );
    }

    #[test]
    fn lex_positions() {
        let mut scanner = Scanner::new(":DECLARACOES\n  idade:INTEIRO");
        let positions: Vec<_> = (0..5)
            .map(|_| scanner.next_token().unwrap().position)
            .collect();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 1),
                Position::new(1, 2),
                Position::new(2, 3),
                Position::new(2, 8),
                Position::new(2, 9),
            ]
        );
    }

    #[test]
    fn lex_end_of_input_is_repeatable() {
        let mut scanner = Scanner::new("  \n ");
        let first = scanner.next_token().unwrap();
        let second = scanner.next_token().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text, END_OF_INPUT_TEXT);
        assert_eq!(first.position, Position::new(2, 2));
    }

    #[test]
    fn iterator_stops_after_end_of_input() {
        let tokens: Vec<_> = Scanner::new("a b").collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(Result::is_ok));
    }

    #[test]
    fn iterator_stops_after_error() {
        let tokens: Vec<_> = Scanner::new("a $ b").collect();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[1].is_err());
    }

    #[test]
    fn rescanning_is_deterministic() {
        let src = ":DECLARACOES x:REAL :ALGORITMO x = (1.5 + 2) * 3 IMPRIMIR(\"ok\")";
        let first: Vec<_> = Scanner::new(src).collect();
        let second: Vec<_> = Scanner::new(src).collect();
        assert_eq!(first, second);
    }
}
