//! C1 — AST Facade: a uniform view over the `pg_query`-parsed PostgreSQL AST.
//!
//! See [`value::AstNode`] for the facade itself and SPEC_FULL.md §2 for why
//! it is built on a serialized JSON tree rather than a hand-written
//! per-node-type field table.

pub mod value;

pub use value::AstNode;

use serde_json::Value;

/// Serialize a `pg_query` parse result into the canonical
/// `{"NodeType": {...}}`-shaped JSON tree that [`AstNode`] reflects over.
pub fn parse_result_to_json(result: &pg_query::ParseResult) -> Value {
    serde_json::to_value(&result.protobuf)
        .expect("pg_query protobuf parse tree must be representable as JSON")
}

/// The ordered `RawStmt`-shaped values (`{"stmt": ..., "stmt_location": ...,
/// "stmt_len": ...}`) of a parsed SQL buffer, i.e. `ParseResult.protobuf.stmts`.
pub fn top_level_statements(tree: &Value) -> &[Value] {
    tree.get("stmts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
