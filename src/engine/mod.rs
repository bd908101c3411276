//! Glues the pattern language to SQL text: parses a buffer (including the
//! PL/pgSQL bridge of [`doblock`]), runs a compiled pattern against it, and
//! reports matches with provenance ([`result`]).

pub mod doblock;
pub mod result;
pub mod sql;

pub use result::{MatchRecord, Origin, OwnedMatch, OwnedOrigin};
pub use sql::{
    search, search_compiled, search_many, search_with_captures, ParsedDocument, SearchManyOutcome,
};
