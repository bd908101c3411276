//! Token model for the pattern language (C3), shaped like the teacher's
//! `Token { kind, start, end }` byte-offset pair so higher-level code (the
//! parser, diagnostics) can slice the original pattern text without a
//! parallel reconstructed string.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    Caret,
    Bang,
    QMark,
    Dollar,
    Underscore,
    Ellipsis,
    DqString(String),
    SqString(String),
    Ident(String),
}

impl TokenKind {
    pub fn is_closer(&self) -> bool {
        matches!(
            self,
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBrack
        )
    }

    /// True for tokens that can *start* a value-pattern expression (used by
    /// the parser's head-conditions lookahead, spec.md §4.4).
    pub fn starts_expression(&self) -> bool {
        match self {
            TokenKind::LBrace
            | TokenKind::LBrack
            | TokenKind::LParen
            | TokenKind::DqString(_)
            | TokenKind::SqString(_)
            | TokenKind::Underscore
            | TokenKind::Ellipsis
            | TokenKind::Caret
            | TokenKind::Bang
            | TokenKind::QMark
            | TokenKind::Dollar
            | TokenKind::Ident(_) => true,
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBrack => false,
        }
    }

    pub fn ident(&self) -> Option<&str> {
        match self {
            TokenKind::Ident(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A lexical token with inclusive-start/exclusive-end byte offsets into the
/// original pattern text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub const fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}
