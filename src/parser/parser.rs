use crate::diagnostics::Diagnostic;
use crate::lexer::{LexError, Scanner, Token, TokenKind};
use crate::span::{Position, SourceFile};
use thiserror::Error;

fn describe(found: &Option<Token>) -> String {
    match found {
        Some(tok) => tok.describe(),
        None => "nothing at unknown position".to_string(),
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserError {
    #[error("lexical error encountered, aborting syntax analysis")]
    Lexical(#[source] LexError),

    #[error("expected token kind {expected}, found {}", describe(.found))]
    UnexpectedKind { expected: TokenKind, found: Option<Token> },

    #[error("expected literal '{expected}', found {}", describe(.found))]
    UnexpectedLiteral { expected: &'static str, found: Option<Token> },

    #[error("invalid type: expected INTEGER or REAL, found {}", describe(.found))]
    InvalidType { found: Option<Token> },

    #[error(
        "invalid factor: expected INTEGER_LITERAL, REAL_LITERAL, IDENTIFIER, VARIABLE or '(', found {}",
        describe(.found)
    )]
    InvalidFactor { found: Option<Token> },

    #[error(
        "invalid output argument: expected VARIABLE, IDENTIFIER or STRING_LITERAL, found {}",
        describe(.found)
    )]
    InvalidOutputArgument { found: Option<Token> },

    #[error("invalid boolean operator: found {}", describe(.found))]
    InvalidBooleanOperator { found: Option<Token> },

    #[error("invalid command start: found {}", describe(.found))]
    InvalidCommandStart { found: Option<Token> },
}

impl ParserError {
    /// Where the offending token (or malformed lexeme) starts, when known.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParserError::Lexical(err) => Some(err.position()),
            ParserError::UnexpectedKind { found, .. }
            | ParserError::UnexpectedLiteral { found, .. }
            | ParserError::InvalidType { found }
            | ParserError::InvalidFactor { found }
            | ParserError::InvalidOutputArgument { found }
            | ParserError::InvalidBooleanOperator { found }
            | ParserError::InvalidCommandStart { found } => found.as_ref().map(|t| t.position),
        }
    }
}

impl From<ParserError> for Diagnostic {
    fn from(err: ParserError) -> Self {
        let position = err.position();
        let diag = match &err {
            ParserError::Lexical(cause) => Diagnostic::error(format!("{err} ({cause})")),
            _ => Diagnostic::error(format!("syntax error: {err}")),
        };
        match position {
            Some(pos) => diag.with_position(pos),
            None => diag,
        }
    }
}

/// Outcome of one parse run. Parsing stops at the first error, so a failed
/// run carries exactly one entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub errors: Vec<ParserError>,
}

impl ParseReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn into_diagnostics(self, src: &SourceFile) -> Vec<Diagnostic> {
        self.errors
            .into_iter()
            .map(|e| Diagnostic::from(e).with_source(src.clone()))
            .collect()
    }
}

type ParseResult<T = ()> = Result<T, ParserError>;

/// Kinds that may begin a `decl`.
const DECLARATION_START: [TokenKind; 2] = [TokenKind::Identifier, TokenKind::Variable];

/// Kinds that may begin a `cmd`.
const COMMAND_START: [TokenKind; 7] = [
    TokenKind::Variable,
    TokenKind::Identifier,
    TokenKind::Read,
    TokenKind::Print,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Begin,
];

/// Predictive recursive-descent recognizer with one token of lookahead.
///
/// Tokens are pulled from the scanner one at a time. No tree is built; the
/// parser only accepts or rejects the program.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Option<Token>,
    errors: Vec<ParserError>,
}

impl<'a> Parser<'a> {
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self { scanner, current: None, errors: Vec::new() }
    }

    /// Runs the single pass over the input. Consuming `self` keeps a parser
    /// from being run twice over an exhausted scanner.
    pub fn parse(mut self) -> ParseReport {
        match self.parse_program() {
            Ok(()) => tracing::debug!("syntax analysis finished without errors"),
            Err(err) => {
                tracing::debug!(%err, "syntax analysis aborted");
                self.errors.push(err);
            }
        }

        ParseReport { errors: self.errors }
    }

    // -------------------------
    // Cursor helpers
    // -------------------------

    fn advance(&mut self) -> ParseResult {
        let tok = self.scanner.next_token().map_err(ParserError::Lexical)?;
        tracing::trace!(token = %tok, "advance");
        self.current = Some(tok);
        Ok(())
    }

    fn found(&self) -> Option<Token> {
        self.current.clone()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.as_ref().is_some_and(|t| t.is(kind))
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        self.current.as_ref().is_some_and(|t| kinds.contains(&t.kind))
    }

    fn at_literal(&self, kind: TokenKind, text: &str) -> bool {
        self.current.as_ref().is_some_and(|t| t.is(kind) && t.text == text)
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult {
        if !self.at(kind) {
            return Err(ParserError::UnexpectedKind { expected: kind, found: self.found() });
        }
        self.advance()
    }

    fn expect_literal(&mut self, kind: TokenKind, text: &'static str) -> ParseResult {
        if !self.at(kind) {
            return Err(ParserError::UnexpectedKind { expected: kind, found: self.found() });
        }
        if !self.at_literal(kind, text) {
            return Err(ParserError::UnexpectedLiteral { expected: text, found: self.found() });
        }
        self.advance()
    }

    fn optional(&mut self, kind: TokenKind) -> ParseResult<bool> {
        if self.at(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn optional_literal(&mut self, kind: TokenKind, text: &str) -> ParseResult<bool> {
        if self.at_literal(kind, text) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// `VARIABLE | IDENTIFIER`
    fn expect_variable(&mut self) -> ParseResult {
        if self.optional(TokenKind::Variable)? {
            return Ok(());
        }
        self.expect(TokenKind::Identifier)
    }

    // -------------------------
    // Top-level
    // -------------------------

    fn parse_program(&mut self) -> ParseResult {
        self.advance()?;
        self.expect_literal(TokenKind::Colon, ":")?;
        self.expect(TokenKind::Declarations)?;
        self.parse_declaration_list()?;
        self.expect_literal(TokenKind::Colon, ":")?;
        self.expect(TokenKind::Algorithm)?;
        self.parse_command_list()?;
        self.expect(TokenKind::EndOfInput)
    }

    // -------------------------
    // Declarations
    // -------------------------

    fn is_declaration_start(&self) -> bool {
        self.at_any(&DECLARATION_START)
    }

    fn parse_declaration_list(&mut self) -> ParseResult {
        self.parse_declaration()?;
        while self.is_declaration_start() {
            self.parse_declaration()?;
        }
        Ok(())
    }

    fn parse_declaration(&mut self) -> ParseResult {
        self.expect_variable()?;
        self.expect_literal(TokenKind::Colon, ":")?;
        self.parse_var_type()
    }

    fn parse_var_type(&mut self) -> ParseResult {
        if self.optional(TokenKind::Integer)? || self.optional(TokenKind::Real)? {
            return Ok(());
        }
        Err(ParserError::InvalidType { found: self.found() })
    }

    // -------------------------
    // Commands
    // -------------------------

    fn is_command_start(&self) -> bool {
        self.at_any(&COMMAND_START)
    }

    fn parse_command_list(&mut self) -> ParseResult {
        self.parse_command()?;
        while self.is_command_start() {
            self.parse_command()?;
        }
        Ok(())
    }

    fn parse_command(&mut self) -> ParseResult {
        match self.current.as_ref().map(|t| t.kind) {
            Some(TokenKind::Variable | TokenKind::Identifier) => self.parse_assignment(),
            Some(TokenKind::Read) => self.parse_input(),
            Some(TokenKind::Print) => self.parse_output(),
            Some(TokenKind::If) => self.parse_conditional(),
            Some(TokenKind::While) => self.parse_repetition(),
            Some(TokenKind::Begin) => self.parse_block(),
            _ => Err(ParserError::InvalidCommandStart { found: self.found() }),
        }
    }

    fn parse_assignment(&mut self) -> ParseResult {
        self.expect_variable()?;
        self.expect_literal(TokenKind::AssignOp, "=")?;
        self.parse_arithmetic_expression()
    }

    fn parse_input(&mut self) -> ParseResult {
        self.expect(TokenKind::Read)?;
        self.expect_variable()
    }

    fn parse_output(&mut self) -> ParseResult {
        self.expect(TokenKind::Print)?;
        self.expect_literal(TokenKind::LeftParen, "(")?;

        let accepted = self.optional(TokenKind::Variable)?
            || self.optional(TokenKind::Identifier)?
            || self.optional(TokenKind::StringLiteral)?;
        if !accepted {
            return Err(ParserError::InvalidOutputArgument { found: self.found() });
        }

        self.expect_literal(TokenKind::RightParen, ")")
    }

    // A dangling ELSE binds to the nearest IF.
    fn parse_conditional(&mut self) -> ParseResult {
        self.expect(TokenKind::If)?;
        self.parse_relational_expression()?;
        self.expect(TokenKind::Then)?;
        self.parse_command()?;

        if self.optional(TokenKind::Else)? {
            self.parse_command()?;
        }
        Ok(())
    }

    fn parse_repetition(&mut self) -> ParseResult {
        self.expect(TokenKind::While)?;
        self.parse_relational_expression()?;
        self.parse_command()
    }

    fn parse_block(&mut self) -> ParseResult {
        self.expect(TokenKind::Begin)?;
        self.parse_command_list()?;
        self.expect(TokenKind::End)
    }

    // -------------------------
    // Expressions
    // -------------------------

    fn parse_arithmetic_expression(&mut self) -> ParseResult {
        self.parse_term()?;
        while self.at_literal(TokenKind::ArithmeticOp, "+") || self.at_literal(TokenKind::ArithmeticOp, "-") {
            self.advance()?;
            self.parse_term()?;
        }
        Ok(())
    }

    fn parse_term(&mut self) -> ParseResult {
        self.parse_factor()?;
        while self.at_literal(TokenKind::ArithmeticOp, "*") || self.at_literal(TokenKind::ArithmeticOp, "/") {
            self.advance()?;
            self.parse_factor()?;
        }
        Ok(())
    }

    fn parse_factor(&mut self) -> ParseResult {
        let operand = self.optional(TokenKind::IntegerLiteral)?
            || self.optional(TokenKind::RealLiteral)?
            || self.optional(TokenKind::Identifier)?
            || self.optional(TokenKind::Variable)?;
        if operand {
            return Ok(());
        }

        if self.optional_literal(TokenKind::LeftParen, "(")? {
            self.parse_arithmetic_expression()?;
            return self.expect_literal(TokenKind::RightParen, ")");
        }

        Err(ParserError::InvalidFactor { found: self.found() })
    }

    fn parse_relational_expression(&mut self) -> ParseResult {
        self.parse_relational_term()?;
        while self.at_any(&[TokenKind::And, TokenKind::Or]) {
            self.parse_boolean_operator()?;
            self.parse_relational_term()?;
        }
        Ok(())
    }

    // A leading '(' always opens a nested relational expression, so
    // `(a + b) > c` is rejected.
    fn parse_relational_term(&mut self) -> ParseResult {
        if self.optional_literal(TokenKind::LeftParen, "(")? {
            self.parse_relational_expression()?;
            return self.expect_literal(TokenKind::RightParen, ")");
        }

        self.parse_arithmetic_expression()?;
        self.expect(TokenKind::RelationalOp)?;
        self.parse_arithmetic_expression()
    }

    fn parse_boolean_operator(&mut self) -> ParseResult {
        if self.optional(TokenKind::And)? || self.optional(TokenKind::Or)? {
            return Ok(());
        }
        Err(ParserError::InvalidBooleanOperator { found: self.found() })
    }
}
