//! Compiled-pattern cache.
//!
//! Parsing a pattern is pure and the result is immutable, so repeated
//! searches with the same pattern text (the common case for a long-lived
//! process driving many SQL buffers through one pattern, or a CLI invocation
//! reusing a pattern across multiple input files) reuse the same compiled
//! [`Matcher`] rather than re-tokenizing and re-parsing it. Grounded on the
//! teacher's own use of `moka::sync::Cache` for its metadata lookups
//! (`examples/NexRX-qview` — same crate, same call shape: compute-once,
//! keyed by an owned `String`, bounded by entry count).

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::pattern::matcher::Matcher;
use crate::pattern::parser;
use moka::sync::Cache;
use std::sync::{Arc, OnceLock};

/// A process-wide cache of compiled patterns, bounded by
/// [`crate::config::Config::pattern_cache_size`].
pub struct Patterns {
    cache: Cache<String, Arc<Matcher>>,
}

impl Patterns {
    fn global() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(|| Patterns {
            cache: Cache::new(crate::config::config().pattern_cache_size),
        })
    }

    /// Compile `text`, or return the previously-compiled matcher for the
    /// exact same pattern text.
    pub fn compile(text: &str) -> Result<Arc<Matcher>> {
        Self::compile_with_diagnostics(text, DiagnosticSink::disabled())
    }

    pub fn compile_with_diagnostics(text: &str, diagnostics: DiagnosticSink) -> Result<Arc<Matcher>> {
        let patterns = Self::global();
        if let Some(hit) = patterns.cache.get(text) {
            return Ok(hit);
        }
        let matcher = Arc::new(parser::parse_with_diagnostics(text, diagnostics)?);
        patterns.cache.insert(text.to_string(), matcher.clone());
        Ok(matcher)
    }
}
