use std::fmt;

use crate::span::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Reserved words
    Declarations,
    Algorithm,
    Integer,
    Real,
    Print,
    Read,
    If,
    Then,
    Else,
    While,
    Begin,
    End,
    And,
    Or,
    Variable,

    Identifier,
    IntegerLiteral,
    RealLiteral,
    StringLiteral,

    // Operators and punctuation
    RelationalOp,
    ArithmeticOp,
    AssignOp,
    LeftParen,
    RightParen,
    Colon,

    EndOfInput,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Declarations => "DECLARATIONS",
            TokenKind::Algorithm => "ALGORITHM",
            TokenKind::Integer => "INTEGER",
            TokenKind::Real => "REAL",
            TokenKind::Print => "PRINT",
            TokenKind::Read => "READ",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Variable => "VARIABLE",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::IntegerLiteral => "INTEGER_LITERAL",
            TokenKind::RealLiteral => "REAL_LITERAL",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::RelationalOp => "RELATIONAL_OP",
            TokenKind::ArithmeticOp => "ARITHMETIC_OP",
            TokenKind::AssignOp => "ASSIGN_OP",
            TokenKind::LeftParen => "LEFT_PAREN",
            TokenKind::RightParen => "RIGHT_PAREN",
            TokenKind::Colon => "COLON",
            TokenKind::EndOfInput => "END_OF_INPUT",
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Declarations
                | TokenKind::Algorithm
                | TokenKind::Integer
                | TokenKind::Real
                | TokenKind::Print
                | TokenKind::Read
                | TokenKind::If
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Begin
                | TokenKind::End
                | TokenKind::And
                | TokenKind::Or
                | TokenKind::Variable
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified lexeme. `position` is where its first character sits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self { kind, text: text.into(), position }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Short form used inside error messages: `'idade' (IDENTIFIER) at line 2, column 1`.
    pub fn describe(&self) -> String {
        format!("'{}' ({}) at {}", self.text, self.kind, self.position)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token [Kind: {}, Text: '{}', Line: {}, Column: {}]",
            self.kind, self.text, self.position.line, self.position.column
        )
    }
}
