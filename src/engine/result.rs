//! C9 — Result Types.
//!
//! A match is always reported together with its provenance: which top-level
//! statement it was found in, and whether that statement was parsed
//! directly from the input SQL or extracted from inside a `DO` block's
//! dollar-quoted body (spec.md §4.8, "Provenance"). [`MatchRecord`] borrows
//! from the [`crate::engine::sql::ParsedDocument`] that produced it;
//! [`OwnedMatch`] is the lifetime-free snapshot returned by the one-shot
//! `engine::sql::search`/`search_with_captures` entry points.

use crate::ast::AstNode;
use serde_json::Value;

/// Where a statement came from, relative to the SQL buffer that was parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Origin {
    /// Parsed directly as one of the buffer's top-level statements.
    #[display("direct")]
    Direct,
    /// Extracted from the dollar-quoted body of a `DO` block, itself the
    /// `do_stmt_index`-th top-level statement. `extracted_sql` is that
    /// block's full PL/pgSQL body text (spec.md §3 Match record: "origin:
    /// Direct | EmbeddedInDoStmt{ extracted_sql }"). Nested `DO` blocks (a
    /// `DO` block whose body contains another `DO` block) are reported with
    /// `do_stmt_index`/`extracted_sql` pointing at the *outermost* enclosing
    /// `DO` statement, per spec.md §4.8's invariant that provenance always
    /// resolves to a position in the original input.
    #[display("DO block at statement {do_stmt_index}")]
    EmbeddedInDoStmt {
        do_stmt_index: usize,
        extracted_sql: String,
    },
}

/// Owned counterpart of [`Origin`], identical in shape; kept as a distinct
/// type so a lifetime-free [`OwnedMatch`] never has to borrow anything.
pub type OwnedOrigin = Origin;

/// One matched node plus its provenance, borrowing from the
/// [`crate::engine::sql::ParsedDocument`] it was found in.
#[derive(Debug, Clone)]
pub struct MatchRecord<'a> {
    pub node: AstNode<'a>,
    pub statement_index: usize,
    pub origin: Origin,
}

impl<'a> MatchRecord<'a> {
    pub fn new(node: AstNode<'a>, statement_index: usize, origin: Origin) -> Self {
        Self {
            node,
            statement_index,
            origin,
        }
    }

    /// Clone into a snapshot independent of the source document's lifetime.
    pub fn to_owned_match(&self) -> OwnedMatch {
        OwnedMatch {
            node: self.node.to_owned_value(),
            statement_index: self.statement_index,
            origin: self.origin.clone(),
        }
    }
}

/// Lifetime-free snapshot of a [`MatchRecord`], returned by the owned
/// `engine::sql::search`/`search_with_captures`/`search_many` entry points.
#[derive(Debug, Clone)]
pub struct OwnedMatch {
    pub node: Value,
    pub statement_index: usize,
    pub origin: OwnedOrigin,
}
