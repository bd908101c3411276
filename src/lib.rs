//! Structural grep for SQL: compile Lisp-like s-expression patterns (see
//! [`pattern`]) and evaluate them against the PostgreSQL AST that
//! `pg_query` produces (see [`ast`] and [`engine`]).
//!
//! The quickest way in is [`engine::search`]:
//!
//! ```
//! let matches = grepsql::search("RangeVar", "SELECT * FROM users;").unwrap();
//! assert_eq!(matches.len(), 1);
//! ```
//!
//! Callers who want zero-copy results across repeated searches of the same
//! SQL buffer use [`engine::ParsedDocument`] and [`engine::search_compiled`]
//! directly instead.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod registry;

pub use engine::{search, search_compiled, search_many, search_with_captures, ParsedDocument};
pub use error::{Error, Result};
pub use pattern::{parse, Matcher, Patterns};
