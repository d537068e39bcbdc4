use crate::language::span::Span;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub raw: String,
    pub span: Span,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        let value = value.into();
        Self {
            raw: value.clone(),
            value,
            kind,
            span,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    String,
    Identifier,

    Let,
    Const,
    Func,
    If,
    Else,
    For,

    BinaryOperator,
    Equals,
    Comma,
    Dot,
    Colon,
    Semicolon,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Greater,
    GreaterEquals,
    Lesser,
    LesserEquals,
    EqualsCompare,
    NotEqualsCompare,
    Exclamation,
    And,
    Ampersand,
    Bar,
    Arrow, // ->

    Eof,
}

impl TokenKind {
    pub fn keyword(ident: &str) -> Option<TokenKind> {
        match ident {
            "let" => Some(TokenKind::Let),
            "const" => Some(TokenKind::Const),
            "func" => Some(TokenKind::Func),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "for" => Some(TokenKind::For),
            _ => None,
        }
    }

    /// Whether a token of this kind can close an operand, which decides
    /// how a following `-` is read.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Identifier
                | TokenKind::CloseParen
                | TokenKind::CloseBracket
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Let => "`let`",
            TokenKind::Const => "`const`",
            TokenKind::Func => "`func`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::For => "`for`",
            TokenKind::BinaryOperator => "operator",
            TokenKind::Equals => "`=`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::OpenBrace => "`{`",
            TokenKind::CloseBrace => "`}`",
            TokenKind::OpenBracket => "`[`",
            TokenKind::CloseBracket => "`]`",
            TokenKind::Greater => "`>`",
            TokenKind::GreaterEquals => "`>=`",
            TokenKind::Lesser => "`<`",
            TokenKind::LesserEquals => "`<=`",
            TokenKind::EqualsCompare => "`==`",
            TokenKind::NotEqualsCompare => "`!=`",
            TokenKind::Exclamation => "`!`",
            TokenKind::And => "`&&`",
            TokenKind::Ampersand => "`&`",
            TokenKind::Bar => "`|`",
            TokenKind::Arrow => "`->`",
            TokenKind::Eof => "end of file",
        };
        f.write_str(text)
    }
}
