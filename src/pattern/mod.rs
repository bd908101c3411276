//! The pattern language: tokenizer (C3) → parser (C4) → matcher tree (C5),
//! plus the capture store (C6) that matching writes into and the compiled-
//! pattern cache that sits in front of the parser.

pub mod capture;
pub mod cache;
pub mod matcher;
pub mod parser;
pub mod token;
pub mod tokenizer;

pub use capture::{CaptureStore, OwnedCaptures};
pub use cache::Patterns;
pub use matcher::{MatchContext, Matcher};
pub use parser::{parse, parse_with_diagnostics};
