//! C10 — Diagnostics.
//!
//! An explicit, per-call sink rather than a global flag: the design note in
//! spec.md is emphatic that debug state must not be a module-level mutable
//! singleton or thread-local. Callers construct a [`DiagnosticSink`] and
//! thread it through tokenization, parsing, and matching; the default is a
//! no-op that costs nothing beyond a branch.

use crate::pattern::token::Token;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticSink {
    enabled: bool,
}

impl DiagnosticSink {
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    pub const fn disabled() -> Self {
        Self { enabled: false }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn tokenized(&self, pattern: &str, tokens: &[Token]) {
        if self.enabled {
            trace!(pattern, count = tokens.len(), "tokenized pattern");
        }
    }

    pub fn parse_production(&self, rule: &str, detail: &str) {
        if self.enabled {
            trace!(rule, detail, "parser production");
        }
    }

    pub fn match_attempt(&self, matcher: &str, type_name: &str, matched: bool) {
        if self.enabled {
            debug!(matcher, type_name, matched, "match attempt");
        }
    }

    pub fn capture_fired(&self, name: &str) {
        if self.enabled {
            debug!(name, "capture fired");
        }
    }
}
