use crate::pattern::token::Token;

/// Offset (into the original pattern text) where a [`Error::PatternSyntax`]
/// was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternPosition {
    pub offset: usize,
}

impl PatternPosition {
    pub const fn new(offset: usize) -> Self {
        Self { offset }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pattern syntax error at offset {position:?}: {message}")]
    PatternSyntax {
        position: PatternPosition,
        message: String,
    },

    #[error("SQL parse error: {0}")]
    SqlParse(#[from] pg_query::Error),

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

pub type Result<T = ()> = std::result::Result<T, Error>;

impl Error {
    pub fn unexpected_token(found: Option<&Token>, expected: &str) -> Self {
        let (offset, message) = match found {
            Some(tok) => (
                tok.start,
                format!("unexpected {:?}, expected {expected}", tok.kind),
            ),
            None => (0, format!("unexpected end of pattern, expected {expected}")),
        };
        Error::PatternSyntax {
            position: PatternPosition::new(offset),
            message,
        }
    }

    pub fn unbalanced_delimiter(offset: usize, delimiter: char) -> Self {
        Error::PatternSyntax {
            position: PatternPosition::new(offset),
            message: format!("unbalanced '{delimiter}'"),
        }
    }

    pub fn bad_character(offset: usize, ch: char) -> Self {
        Error::PatternSyntax {
            position: PatternPosition::new(offset),
            message: format!("unexpected character '{ch}'"),
        }
    }
}
