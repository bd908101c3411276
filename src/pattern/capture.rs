//! C6 — Capture Store.
//!
//! A fresh map from capture name to an ordered list of captured values,
//! created per top-level evaluation (spec.md §3 "Capture store", §4.6). A
//! captured value is either an AST node or, for attribute captures, the
//! scalar field value wrapped as a virtual attribute node — both cases are
//! already the same [`AstNode`] type (see `ast::value`), so no separate
//! "captured value" wrapper type is needed.

use crate::ast::AstNode;
use serde_json::Value;
use std::collections::HashMap;

/// Bucket name used for `$` captures with no following identifier.
pub const UNNAMED: &str = "$";

#[derive(Debug, Default)]
pub struct CaptureStore<'a> {
    captures: HashMap<String, Vec<AstNode<'a>>>,
}

impl<'a> CaptureStore<'a> {
    pub fn new() -> Self {
        Self {
            captures: HashMap::with_capacity(crate::config::config().capture_capacity_hint),
        }
    }

    /// Record `value` under `name`, appending in encounter order.
    pub fn record(&mut self, name: &str, value: AstNode<'a>) {
        self.captures.entry(name.to_string()).or_default().push(value);
    }

    pub fn get(&self, name: &str) -> &[AstNode<'a>] {
        self.captures.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.captures.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.captures.values().all(Vec::is_empty)
    }

    pub fn count(&self, name: &str) -> usize {
        self.get(name).len()
    }

    /// Merge `other` into `self`, appending values so relative order within
    /// each name is preserved across the statements merged so far (used by
    /// `engine::sql` when combining per-statement capture stores).
    pub fn merge(&mut self, other: CaptureStore<'a>) {
        for (name, values) in other.captures {
            self.captures.entry(name).or_default().extend(values);
        }
    }

    /// Clone every captured value into a lifetime-free snapshot, for callers
    /// of the owned, one-shot `engine::sql::search_with_captures` entry
    /// point that don't want to keep a [`crate::engine::sql::ParsedDocument`]
    /// alive themselves.
    pub fn to_owned_captures(&self) -> OwnedCaptures {
        let mut out = HashMap::with_capacity(self.captures.len());
        for (name, values) in &self.captures {
            out.insert(
                name.clone(),
                values.iter().map(AstNode::to_owned_value).collect(),
            );
        }
        OwnedCaptures(out)
    }
}

/// Owned snapshot of a [`CaptureStore`], produced by
/// [`CaptureStore::to_owned_captures`].
#[derive(Debug, Default, Clone)]
pub struct OwnedCaptures(HashMap<String, Vec<Value>>);

impl OwnedCaptures {
    pub fn get(&self, name: &str) -> &[Value] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn records_append_in_encounter_order() {
        let v1 = json!({"RangeVar": {"relname": "a"}});
        let v2 = json!({"RangeVar": {"relname": "b"}});
        let mut store = CaptureStore::new();
        store.record("t", AstNode::from_value(&v1).unwrap());
        store.record("t", AstNode::from_value(&v2).unwrap());
        assert_eq!(store.count("t"), 2);
        assert_eq!(store.get("t")[0].type_name(), "RangeVar");
    }

    #[test]
    fn merge_concatenates_same_named_buckets() {
        let v = json!({"RangeVar": {"relname": "a"}});
        let mut a = CaptureStore::new();
        a.record("t", AstNode::from_value(&v).unwrap());
        let mut b = CaptureStore::new();
        b.record("t", AstNode::from_value(&v).unwrap());
        a.merge(b);
        assert_eq!(a.count("t"), 2);
    }

    #[test]
    fn empty_store_reports_empty() {
        assert!(CaptureStore::new().is_empty());
    }

    #[test]
    fn owned_captures_survive_the_store_being_dropped() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let owned = {
            let mut store = CaptureStore::new();
            store.record("t", AstNode::from_value(&v).unwrap());
            store.to_owned_captures()
        };
        assert_eq!(owned.get("t").len(), 1);
        assert_eq!(owned.get("t")[0]["RangeVar"]["relname"], "users");
    }
}
