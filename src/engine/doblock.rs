//! C8 — PL/pgSQL Bridge.
//!
//! `DO $$ ... $$` blocks (and, transitively, any `DO` block nested inside
//! one) carry a dollar-quoted body that `pg_query`'s SQL-statement parser
//! treats as an opaque string literal — it is PL/pgSQL, a different
//! grammar. This module finds those bodies, extracts the individual SQL
//! statements they contain, and re-parses each one so the matcher can see
//! inside them (spec.md §4.8).
//!
//! Two extraction strategies, tried in order per body (spec.md §4.8,
//! "Strategy 1 / Strategy 2"):
//!
//! 1. **Structured**: hand the body to `pg_query`'s PL/pgSQL-aware parser
//!    and walk its statement list for embedded SQL expressions. Precise,
//!    but only covers the PL/pgSQL constructs that parser understands.
//! 2. **Line-based fallback**: split the body on top-level semicolons
//!    (tracking dollar-quote and string-literal nesting so semicolons
//!    inside those aren't mistaken for statement terminators) and attempt
//!    to parse each candidate as a standalone SQL statement, discarding
//!    candidates that don't parse. Lossy by construction — PL/pgSQL control
//!    flow (`IF`, `LOOP`, variable declarations) is not SQL and will never
//!    parse, so statements embedded inside it are silently dropped rather
//!    than surfaced with a false position. This matches spec.md's explicit
//!    acceptance of the fallback's lossiness rather than inventing a PL/pgSQL
//!    grammar of our own.
//!
//! Grounded on the `DefElem`/`arg`/`String.sval` walk demonstrated in
//! `examples/other_examples/215e681f_robert-sjoblom-pg-migration-lint__tests-pg_query_spike.rs.rs`
//! for reading scalar text back out of `pg_query::NodeEnum` values.

use crate::ast::AstNode;
use serde_json::Value;
use tracing::debug;

/// A `DO` block body found in a parsed document, along with the index of
/// the `DoStmt` that contains it among the document's top-level statements.
pub struct DoBlockBody<'a> {
    pub do_stmt_index: usize,
    pub text: String,
    _marker: std::marker::PhantomData<&'a ()>,
}

/// Walk `statements` (top-level `RawStmt`-shaped values) and return the
/// dollar-quoted body of every `DoStmt` found among them.
pub fn find_do_block_bodies(statements: &[Value]) -> Vec<DoBlockBody<'_>> {
    let mut out = Vec::new();
    for (index, raw_stmt) in statements.iter().enumerate() {
        let Some(node) = AstNode::from_raw_stmt(raw_stmt) else {
            continue;
        };
        if node.type_name() != "DoStmt" {
            continue;
        }
        match extract_as_body(node) {
            Some(text) => out.push(DoBlockBody {
                do_stmt_index: index,
                text,
                _marker: std::marker::PhantomData,
            }),
            None => debug!(do_stmt_index = index, "DO block has no `as` body, skipping"),
        }
    }
    out
}

/// Read the `as`-named `DefElem`'s body text out of a `DoStmt` node's
/// `args` field. Also used by `engine::sql` when recursing into a nested
/// `DO` block discovered inside an already-extracted statement.
pub(crate) fn extract_as_body(do_stmt: AstNode<'_>) -> Option<String> {
    let args = do_stmt.field("args")?.as_array()?;
    for arg in args {
        let Some(def_elem) = AstNode::from_value(arg) else {
            continue;
        };
        if def_elem.type_name() != "DefElem" {
            continue;
        }
        let defname = def_elem.field("defname")?.as_str()?;
        if !defname.eq_ignore_ascii_case("as") {
            continue;
        }
        if let Some(text) = def_elem.field("arg").and_then(string_value_of) {
            return Some(text);
        }
    }
    None
}

/// Read the scalar text out of a `{"String": {"sval": "..."}}` node, or
/// concatenate a `{"List": {"items": [...String nodes...]}}` — PostgreSQL's
/// lexer sometimes splits a very long dollar-quoted literal into several
/// `String` nodes joined in a `List`.
fn string_value_of(value: &Value) -> Option<String> {
    let node = AstNode::from_value(value)?;
    match node.type_name() {
        "String" => node.field("sval").and_then(Value::as_str).map(str::to_string),
        "List" => {
            let items = node.field("items")?.as_array()?;
            let mut out = String::new();
            for item in items {
                out.push_str(&string_value_of(item)?);
            }
            Some(out)
        }
        _ => None,
    }
}

/// The outcome of extracting SQL statements from one `DO` block body.
pub struct ExtractedStatements {
    pub statements: Vec<Value>,
    pub structured: bool,
}

/// Parse `body` into its constituent top-level SQL statements, trying the
/// structured path first and falling back to the line-based splitter.
pub fn extract_statements(body: &str) -> ExtractedStatements {
    if crate::config::config().structured_plpgsql_extraction {
        if let Some(statements) = try_structured_extraction(body) {
            return ExtractedStatements {
                statements,
                structured: true,
            };
        }
    }
    ExtractedStatements {
        statements: line_based_fallback(body),
        structured: false,
    }
}

/// Strategy 1: ask `pg_query` for a PL/pgSQL-aware parse of the body and
/// collect every embedded SQL statement's own parse tree. Returns `None`
/// if the structured parser rejects the body (e.g. `body` contains PL/pgSQL
/// syntax outside what the structured parser models), letting the caller
/// fall back to the line-based splitter instead of surfacing a spurious
/// error — a malformed PL/pgSQL body should degrade the match results for
/// that one `DO` block, not abort the whole search (spec.md §4.8).
fn try_structured_extraction(body: &str) -> Option<Vec<Value>> {
    let parsed = pg_query::parse_plpgsql(body).ok()?;
    let function_asts: Vec<Value> = serde_json::from_str(&parsed).ok()?;
    let mut statements = Vec::new();
    for function_ast in &function_asts {
        collect_sql_expressions(function_ast, &mut statements);
    }
    if statements.is_empty() {
        None
    } else {
        Some(statements)
    }
}

/// Recursively walk a PL/pgSQL statement tree for the text of every
/// embedded SQL expression/query (`PLpgSQL_expr.query`) and re-parse it as
/// a standalone statement, keeping whichever of its top-level statements
/// result (normally exactly one).
fn collect_sql_expressions(node: &Value, out: &mut Vec<Value>) {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(query)) = map.get("query") {
                if let Ok(result) = pg_query::parse(query) {
                    let tree = crate::ast::parse_result_to_json(&result);
                    out.extend(crate::ast::top_level_statements(&tree).iter().cloned());
                }
            }
            for value in map.values() {
                collect_sql_expressions(value, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_sql_expressions(item, out);
            }
        }
        _ => {}
    }
}

/// The leading keyword a candidate must have to even be attempted as SQL
/// (spec.md §4.8 strategy 2).
const ALLOWED_LEADING_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "WITH", "CREATE", "DROP", "ALTER", "GRANT", "REVOKE",
];

/// PL/pgSQL control-flow keywords that disqualify a candidate even if it
/// happens to parse as SQL on its own (e.g. a bare `BEGIN`/`END` is also
/// valid standalone transaction-control SQL, but here it's PL/pgSQL block
/// delimiter noise, not a statement the source actually contains).
const REJECTED_CONTROL_KEYWORDS: &[&str] = &["BEGIN", "END", "DECLARE", "EXECUTE"];

/// Strategy 2: split `body` on semicolons that are not nested inside a
/// quoted string or a dollar-quoted literal, then keep whichever candidate
/// substrings both start with an allowed SQL keyword and don't contain a
/// rejected PL/pgSQL control-flow keyword at the top level (spec.md §4.8),
/// and which go on to parse as standalone SQL. Everything else is discarded
/// — PL/pgSQL control-flow keywords like `IF`/`LOOP` never parse as SQL and
/// are expected to be dropped here regardless of the allow-list.
fn line_based_fallback(body: &str) -> Vec<Value> {
    let mut statements = Vec::new();
    for candidate in split_top_level_semicolons(body) {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !candidate_is_eligible(trimmed) {
            continue;
        }
        if let Ok(result) = pg_query::parse(trimmed) {
            let tree = crate::ast::parse_result_to_json(&result);
            statements.extend(crate::ast::top_level_statements(&tree).iter().cloned());
        }
    }
    statements
}

/// spec.md §4.8 strategy 2's allow-list/reject-list gate: the candidate's
/// first word must be one of [`ALLOWED_LEADING_KEYWORDS`], and it must not
/// contain any of [`REJECTED_CONTROL_KEYWORDS`] outside a quoted or
/// dollar-quoted region.
fn candidate_is_eligible(trimmed: &str) -> bool {
    let first_word = trimmed
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or("")
        .to_ascii_uppercase();
    if !ALLOWED_LEADING_KEYWORDS.contains(&first_word.as_str()) {
        return false;
    }
    let stripped = strip_quoted_regions(trimmed);
    !stripped
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|word| REJECTED_CONTROL_KEYWORDS.iter().any(|k| word.eq_ignore_ascii_case(k)))
}

/// Blank out every character inside a single-quoted or dollar-quoted region
/// of `text` (replacing it with a space, preserving length and the position
/// of everything outside those regions) so a top-level keyword scan can't be
/// fooled by a keyword appearing inside a string literal.
fn strip_quoted_regions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut in_single_quote = false;
    let mut dollar_tag: Option<String> = None;

    while let Some(c) = chars.next() {
        if let Some(tag) = &dollar_tag {
            current.push(c);
            out.push(' ');
            if c == '$' {
                let closer = format!("${}$", tag);
                if body_remainder_starts_with(&current, &closer) {
                    dollar_tag = None;
                }
            }
            continue;
        }
        if in_single_quote {
            current.push(c);
            out.push(' ');
            if c == '\'' {
                in_single_quote = false;
            }
            continue;
        }
        match c {
            '\'' => {
                in_single_quote = true;
                current.push(c);
                out.push(' ');
            }
            '$' => {
                current.push(c);
                out.push(' ');
                let mut tag = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '$' || (!next.is_ascii_alphanumeric() && next != '_') {
                        break;
                    }
                    tag.push(next);
                    current.push(next);
                    out.push(' ');
                    chars.next();
                }
                if chars.peek() == Some(&'$') {
                    current.push('$');
                    out.push(' ');
                    chars.next();
                    dollar_tag = Some(tag);
                }
            }
            other => {
                current.push(other);
                out.push(other);
            }
        }
    }
    out
}

fn split_top_level_semicolons(body: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();
    let mut in_single_quote = false;
    let mut dollar_tag: Option<String> = None;

    while let Some(c) = chars.next() {
        if let Some(tag) = &dollar_tag {
            current.push(c);
            if c == '$' {
                let closer = format!("${}$", tag);
                if body_remainder_starts_with(&current, &closer) {
                    dollar_tag = None;
                }
            }
            continue;
        }
        match c {
            '\'' if !in_single_quote => {
                in_single_quote = true;
                current.push(c);
            }
            '\'' if in_single_quote => {
                in_single_quote = false;
                current.push(c);
            }
            '$' if !in_single_quote => {
                current.push(c);
                let mut tag = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '$' {
                        break;
                    }
                    if !next.is_ascii_alphanumeric() && next != '_' {
                        break;
                    }
                    tag.push(next);
                    current.push(next);
                    chars.next();
                }
                if chars.peek() == Some(&'$') {
                    current.push('$');
                    chars.next();
                    dollar_tag = Some(tag);
                }
            }
            ';' if !in_single_quote => {
                out.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

fn body_remainder_starts_with(current: &str, closer: &str) -> bool {
    current.ends_with(closer)
}
