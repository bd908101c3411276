//! C7 — SQL Entry Layer.
//!
//! The literal one-call contract (`search(pattern, sql) -> matches`) that
//! spec.md §4.7 describes is not expressible as a single safe Rust function
//! without a self-referential struct: the matches borrow from the parsed
//! AST, and the AST has to live somewhere the caller can see. This module
//! splits the contract into two steps instead — exactly the split
//! `sqlx::query` forces between preparing a statement and running it, a
//! shape this crate's own dependency stack already commits callers to:
//!
//! 1. [`ParsedDocument::parse`] parses the SQL once (including discovering
//!    and recursively extracting every `DO` block body per
//!    [`crate::engine::doblock`]) into an owned tree the caller holds.
//! 2. [`search_compiled`] runs a compiled pattern against a `&ParsedDocument`
//!    and returns matches and captures that borrow from it, zero-copy.
//!
//! For callers who want the spec's exact single-call ergonomics and don't
//! need to keep the parsed document around, [`search`],
//! [`search_with_captures`], and [`search_many`] wrap the two-step API and
//! return owned (cloned) [`OwnedMatch`]/[`OwnedCaptures`] values instead.

use crate::ast::AstNode;
use crate::diagnostics::DiagnosticSink;
use crate::engine::doblock;
use crate::engine::result::{MatchRecord, OwnedMatch, Origin};
use crate::error::Result;
use crate::pattern::{CaptureStore, MatchContext, Matcher, OwnedCaptures, Patterns};
use itertools::Itertools;
use serde_json::Value;

/// An owned, parsed SQL buffer: its top-level statements plus every
/// statement recursively discovered inside `DO` block bodies. Parse once,
/// search as many times as needed against the same tree.
pub struct ParsedDocument {
    tree: Value,
    embedded: Vec<(usize, String, Value)>,
}

impl ParsedDocument {
    pub fn parse(sql: &str) -> Result<Self> {
        let result = pg_query::parse(sql)?;
        let tree = crate::ast::parse_result_to_json(&result);
        let top = crate::ast::top_level_statements(&tree).to_vec();

        let mut embedded = Vec::new();
        for block in doblock::find_do_block_bodies(&top) {
            let extracted = doblock::extract_statements(&block.text).statements;
            collect_embedded(extracted, block.do_stmt_index, &block.text, &mut embedded);
        }

        Ok(Self { tree, embedded })
    }

    /// Every statement in this document with its provenance: direct
    /// top-level statements in source order, followed by every statement
    /// discovered inside a `DO` block body (including nested `DO` blocks,
    /// tagged with the outermost enclosing one's body text — spec.md §4.8).
    pub fn statements(&self) -> impl Iterator<Item = (usize, Origin, AstNode<'_>)> + '_ {
        let direct = crate::ast::top_level_statements(&self.tree)
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| AstNode::from_raw_stmt(raw).map(|n| (i, Origin::Direct, n)));
        let from_do_blocks =
            self.embedded
                .iter()
                .filter_map(|(do_stmt_index, extracted_sql, raw)| {
                    AstNode::from_raw_stmt(raw).map(|n| {
                        (
                            *do_stmt_index,
                            Origin::EmbeddedInDoStmt {
                                do_stmt_index: *do_stmt_index,
                                extracted_sql: extracted_sql.clone(),
                            },
                            n,
                        )
                    })
                });
        direct.chain(from_do_blocks)
    }
}

fn collect_embedded(
    statements: Vec<Value>,
    do_stmt_index: usize,
    outer_body: &str,
    out: &mut Vec<(usize, String, Value)>,
) {
    for stmt in statements {
        if let Some(node) = AstNode::from_raw_stmt(&stmt) {
            if node.type_name() == "DoStmt" {
                if let Some(body) = doblock::extract_as_body(node) {
                    let nested = doblock::extract_statements(&body).statements;
                    // Nested DO blocks still tag their statements with the
                    // outermost enclosing block's body text (spec.md §4.8).
                    collect_embedded(nested, do_stmt_index, outer_body, out);
                }
            }
        }
        out.push((do_stmt_index, outer_body.to_string(), stmt));
    }
}

/// Run `matcher` against every statement of `doc`, returning every match
/// (with provenance) and the capture store accumulated across all of them.
pub fn search_compiled<'a>(
    matcher: &Matcher,
    doc: &'a ParsedDocument,
    diagnostics: DiagnosticSink,
) -> (Vec<MatchRecord<'a>>, CaptureStore<'a>) {
    let mut records = Vec::new();
    let mut captures = CaptureStore::new();
    for (statement_index, origin, root) in doc.statements() {
        let mut ctx = MatchContext::new(diagnostics);
        for node in matcher.search(root, &mut ctx) {
            records.push(MatchRecord::new(node, statement_index, origin));
        }
        captures.merge(ctx.captures);
    }
    (records, captures)
}

/// One-shot, owned-result search: compiles `pattern_text`, parses
/// `sql_text`, and returns only the matches.
pub fn search(pattern_text: &str, sql_text: &str) -> Result<Vec<OwnedMatch>> {
    let (matches, _) = search_with_captures(pattern_text, sql_text)?;
    Ok(matches)
}

/// One-shot, owned-result search that also returns accumulated captures.
pub fn search_with_captures(
    pattern_text: &str,
    sql_text: &str,
) -> Result<(Vec<OwnedMatch>, OwnedCaptures)> {
    let matcher = Patterns::compile(pattern_text)?;
    let doc = ParsedDocument::parse(sql_text)?;
    let (records, captures) = search_compiled(&matcher, &doc, DiagnosticSink::disabled());
    let owned_matches = records.iter().map(MatchRecord::to_owned_match).collect_vec();
    Ok((owned_matches, captures.to_owned_captures()))
}

/// The result of [`search_many`]: matches from every input that parsed
/// successfully, plus the `(index, error)` of every input that didn't. A
/// single malformed SQL buffer in the batch never aborts the others
/// (spec.md §4.7 step 2: "SQL parse errors are never fatal to the search
/// orchestration — other inputs can still be processed").
#[derive(Debug, Default)]
pub struct SearchManyOutcome {
    pub matches: Vec<OwnedMatch>,
    pub errors: Vec<(usize, crate::error::Error)>,
}

/// One-shot search of the same compiled pattern across several independent
/// SQL buffers (e.g. one per file on a `grepsql` CLI invocation). Only
/// pattern compilation is fatal to the whole batch; a parse failure in one
/// input is recorded in `errors` and the rest are still searched.
pub fn search_many<'s>(
    pattern_text: &str,
    sql_texts: impl IntoIterator<Item = &'s str>,
) -> Result<SearchManyOutcome> {
    let matcher = Patterns::compile(pattern_text)?;
    let mut outcome = SearchManyOutcome::default();
    for (index, sql_text) in sql_texts.into_iter().enumerate() {
        match ParsedDocument::parse(sql_text) {
            Ok(doc) => {
                let (records, _) = search_compiled(&matcher, &doc, DiagnosticSink::disabled());
                outcome
                    .matches
                    .extend(records.iter().map(MatchRecord::to_owned_match));
            }
            Err(err) => outcome.errors.push((index, err)),
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse;

    #[test]
    fn parsed_document_walks_direct_statements_in_source_order() {
        let doc = ParsedDocument::parse("SELECT 1; SELECT 2;").unwrap();
        let kinds: Vec<_> = doc.statements().map(|(i, origin, node)| {
            assert_eq!(origin, Origin::Direct);
            (i, node.type_name())
        }).collect();
        assert_eq!(kinds, vec![(0, "SelectStmt"), (1, "SelectStmt")]);
    }

    #[test]
    fn parsed_document_discovers_statements_inside_do_blocks() {
        let sql = "DO $$ BEGIN; SELECT 1; END; $$;";
        let doc = ParsedDocument::parse(sql).unwrap();
        let embedded: Vec<_> = doc
            .statements()
            .filter(|(_, origin, _)| matches!(origin, Origin::EmbeddedInDoStmt { .. }))
            .collect();
        assert!(!embedded.is_empty(), "expected at least one embedded statement");
        for (statement_index, origin, _) in &embedded {
            assert_eq!(*statement_index, 0);
            match origin {
                Origin::EmbeddedInDoStmt {
                    do_stmt_index,
                    extracted_sql,
                } => {
                    assert_eq!(*do_stmt_index, 0);
                    assert!(extracted_sql.contains("SELECT 1"), "{extracted_sql}");
                }
                other => panic!("expected EmbeddedInDoStmt, got {other:?}"),
            }
        }
    }

    #[test]
    fn search_compiled_finds_a_range_var_and_reports_direct_origin() {
        let matcher = parse("RangeVar").unwrap();
        let doc = ParsedDocument::parse("SELECT * FROM users;").unwrap();
        let (records, _) = search_compiled(&matcher, &doc, DiagnosticSink::disabled());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin, Origin::Direct);
        assert_eq!(records[0].node.type_name(), "RangeVar");
    }

    #[test]
    fn search_one_shot_returns_owned_matches_independent_of_the_document() {
        let matches = search("RangeVar", "SELECT * FROM users;").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].node["RangeVar"]["relname"], "users");
    }

    #[test]
    fn search_with_captures_collects_named_captures_across_the_search() {
        let (matches, captures) =
            search_with_captures("(RangeVar $t)", "SELECT * FROM users;").unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(captures.get("t").len(), 1);
    }

    #[test]
    fn create_stmt_inside_do_block_is_tagged_with_the_extracted_body() {
        // Seed scenario from spec.md §8 #5.
        let sql = "DO $$ BEGIN CREATE TABLE t(id INT); CREATE INDEX ix ON t(id); END $$;";
        let matches = search("CreateStmt", sql).unwrap();
        assert_eq!(matches.len(), 1, "{matches:?}");
        match &matches[0].origin {
            Origin::EmbeddedInDoStmt { extracted_sql, .. } => {
                assert!(extracted_sql.contains("CREATE TABLE"), "{extracted_sql}");
            }
            other => panic!("expected EmbeddedInDoStmt, got {other:?}"),
        }
    }

    #[test]
    fn search_many_runs_the_same_pattern_over_independent_buffers() {
        let outcome =
            search_many("RangeVar", ["SELECT * FROM a;", "SELECT * FROM b;"]).unwrap();
        assert_eq!(outcome.matches.len(), 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn search_many_isolates_a_bad_input_instead_of_aborting_the_batch() {
        let outcome = search_many(
            "RangeVar",
            ["SELECT * FROM a;", "SELECT FROM WHERE", "SELECT * FROM b;"],
        )
        .unwrap();
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].0, 1);
    }

    #[test]
    fn invalid_sql_is_a_sql_parse_error() {
        assert!(ParsedDocument::parse("SELECT FROM WHERE").is_err());
    }
}
