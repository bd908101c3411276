//! C5 — Matcher Expressions, the core of the engine.
//!
//! A [`Matcher`] is a compiled pattern expression. Every variant implements
//! the same two-operation contract of spec.md §4.5: [`Matcher::match_here`]
//! tests a single node (or its absence, for the `Maybe`/null case), and
//! [`Matcher::search`] is the generic, inherited pre-order traversal that
//! collects every descendant-or-self node for which `match_here` holds.
//!
//! Grounded on `ast-grep`'s `Matcher` trait + pre-order `Visit` shape
//! (`examples/other_examples/ef4946ce_..._traversal.rs.rs`) and
//! `rust-analyzer`'s `ra_ssr` matching module's capture/placeholder handling
//! (`examples/other_examples/b835d80f_..._matching.rs.rs`), adapted to a
//! closed enum instead of a trait object (the pattern language has a fixed,
//! small set of node kinds, unlike a general-purpose matcher trait).

use crate::ast::AstNode;
use crate::diagnostics::DiagnosticSink;
use crate::pattern::capture::CaptureStore;

/// A compiled pattern expression (C5). Owns only its child matchers and
/// literal strings; borrows nothing from the AST (Design Notes, Ownership).
#[derive(Debug, Clone)]
pub enum Matcher {
    /// `_` — true iff the node is non-null.
    AnyNode,
    /// `...` as a standalone atom — true iff the node has at least one
    /// enumerable child. As a *mid-group* marker it instead splits the
    /// enclosing [`Matcher::Group`]'s conjuncts into same-node and
    /// exists-descendant phases; see [`Matcher::Group`] and the pattern
    /// parser, which never compiles a mid-group `...` into this variant.
    HasChildren,
    /// A bare identifier classified as a known AST node-type name.
    NodeType(String),
    /// `(attr value_pred)`, or a bare `attr` (value predicate defaults to
    /// [`Matcher::AnyNode`]).
    Attribute { name: String, value: Box<Matcher> },
    /// A quoted string or an identifier that is neither a known attribute
    /// nor node-type name. `case_insensitive` is true only for the
    /// unknown-identifier case; quoted strings compare exactly (spec.md
    /// §3 invariants: "exact on values after unquoting").
    Literal { text: String, case_insensitive: bool },
    /// `{a b c}` — true iff any child matches (logical OR).
    Any(Vec<Matcher>),
    /// `[a b c]` — true iff every child matches (logical AND).
    All(Vec<Matcher>),
    /// `!p` — true iff `p` does not match. Captures performed while
    /// evaluating `p` are always discarded, win or lose.
    Not(Box<Matcher>),
    /// `?p` — true iff the node is null, or `p` matches. Captures inside
    /// `p` are committed only when `p` actually fires.
    Maybe(Box<Matcher>),
    /// `^p` — true iff the immediate parent (if any) matches `p`.
    Parent(Box<Matcher>),
    /// `$name p` (or `$p` / `$` for the unnamed bucket, or bare `$name` with
    /// an implicit [`Matcher::AnyNode`] body). Records a value against
    /// `name` in the active [`CaptureStore`] whenever `p` matches.
    Capture { name: String, inner: Box<Matcher> },
    /// A parenthesized group `(head c1 ... c2 c3)`: `head` and the
    /// `same_node` conjuncts apply to the current node; each `descendant`
    /// conjunct (appearing after a mid-group `...`) must match *some*
    /// descendant of the current node (spec.md §4.5, "Ellipsis
    /// monotonicity"/the two-phase group rule in the Design Notes).
    Group {
        head: Box<Matcher>,
        same_node: Vec<Matcher>,
        descendant: Vec<Matcher>,
    },
}

/// The mutable state threaded through one evaluation (spec.md §5: "an
/// explicit evaluation context passed to each `match_here`/`search` call",
/// replacing the original's thread-local capture store and global debug
/// flag).
pub struct MatchContext<'a> {
    pub captures: CaptureStore<'a>,
    pub diagnostics: DiagnosticSink,
}

impl<'a> MatchContext<'a> {
    pub fn new(diagnostics: DiagnosticSink) -> Self {
        Self {
            captures: CaptureStore::new(),
            diagnostics,
        }
    }

    /// A context that shares nothing with `self`: same diagnostic sink, a
    /// fresh capture store. Used by `Not`/`Maybe` to evaluate their child
    /// without committing captures the caller didn't ask for.
    fn scratch(&self) -> MatchContext<'a> {
        MatchContext::new(self.diagnostics)
    }
}

impl Matcher {
    /// Pre-order, field-declaration-order, sequence-index-order traversal
    /// of `root` and its descendants, collecting every node for which
    /// `match_here` is true. Visits each physical node exactly once.
    pub fn search<'a>(&self, root: AstNode<'a>, ctx: &mut MatchContext<'a>) -> Vec<AstNode<'a>> {
        let mut out = Vec::new();
        let mut parents: Vec<AstNode<'a>> = Vec::new();
        self.collect(root, &mut parents, ctx, &mut out);
        out
    }

    fn collect<'a>(
        &self,
        node: AstNode<'a>,
        parents: &mut Vec<AstNode<'a>>,
        ctx: &mut MatchContext<'a>,
        out: &mut Vec<AstNode<'a>>,
    ) {
        if self.match_here(Some(node), parents, ctx) {
            out.push(node);
        }
        parents.push(node);
        for child in node.children() {
            self.collect(child, parents, ctx, out);
        }
        parents.pop();
    }

    /// Single-node matching contract (spec.md §4.5). `node` is `None` only
    /// when testing the value of an absent/empty attribute field (see
    /// [`AstNode::field_as_node`]) — the one place the engine has a
    /// meaningful notion of "no node here" to hand to [`Matcher::Maybe`].
    /// `parents` is the ancestor chain of `node`, nearest last, empty at the
    /// root of a search.
    pub fn match_here<'a>(
        &self,
        node: Option<AstNode<'a>>,
        parents: &[AstNode<'a>],
        ctx: &mut MatchContext<'a>,
    ) -> bool {
        let matched = self.match_here_inner(node, parents, ctx);
        ctx.diagnostics.match_attempt(
            self.label(),
            node.map(|n| n.type_name()).unwrap_or("<null>"),
            matched,
        );
        matched
    }

    fn match_here_inner<'a>(
        &self,
        node: Option<AstNode<'a>>,
        parents: &[AstNode<'a>],
        ctx: &mut MatchContext<'a>,
    ) -> bool {
        match self {
            Matcher::AnyNode => node.is_some(),

            Matcher::HasChildren => node.is_some_and(|n| !n.children().is_empty()),

            Matcher::NodeType(name) => node.is_some_and(|n| n.type_name().eq_ignore_ascii_case(name)),

            Matcher::Literal {
                text,
                case_insensitive,
            } => match node.and_then(|n| n.as_text()) {
                Some(actual) => {
                    if *case_insensitive {
                        actual.eq_ignore_ascii_case(text)
                    } else {
                        actual == *text
                    }
                }
                None => false,
            },

            Matcher::Attribute { name, value } => match node {
                Some(n) => value.match_here(n.field_as_node(name), parents, ctx),
                None => false,
            },

            Matcher::Any(children) => children.iter().any(|m| m.match_here(node, parents, ctx)),

            Matcher::All(children) => children.iter().all(|m| m.match_here(node, parents, ctx)),

            Matcher::Not(inner) => {
                let mut scratch = ctx.scratch();
                !inner.match_here(node, parents, &mut scratch)
            }

            Matcher::Maybe(inner) => match node {
                None => true,
                Some(n) => {
                    let mut scratch = ctx.scratch();
                    let matched = inner.match_here(Some(n), parents, &mut scratch);
                    if matched {
                        ctx.captures.merge(scratch.captures);
                    }
                    matched
                }
            },

            Matcher::Parent(inner) => match parents.split_last() {
                None => false,
                Some((immediate, ancestors)) => inner.match_here(Some(*immediate), ancestors, ctx),
            },

            Matcher::Capture { name, inner } => {
                if !inner.match_here(node, parents, ctx) {
                    return false;
                }
                let captured = match inner.as_ref() {
                    Matcher::Attribute { name: field, .. } => node.and_then(|n| n.field_as_node(field)),
                    _ => node,
                };
                if let Some(value) = captured {
                    ctx.captures.record(name, value);
                    ctx.diagnostics.capture_fired(name);
                }
                true
            }

            Matcher::Group {
                head,
                same_node,
                descendant,
            } => {
                let Some(n) = node else { return false };
                if !head.match_here(Some(n), parents, ctx) {
                    return false;
                }
                if !same_node.iter().all(|m| m.match_here(Some(n), parents, ctx)) {
                    return false;
                }
                descendant
                    .iter()
                    .all(|m| Self::exists_descendant(m, n, parents, ctx))
            }
        }
    }

    /// The "exists-descendant" half of the two-phase group rule: true iff
    /// some proper descendant of `node` (not `node` itself) matches `m`,
    /// short-circuiting on the first witness found in pre-order.
    fn exists_descendant<'a>(
        m: &Matcher,
        node: AstNode<'a>,
        parents: &[AstNode<'a>],
        ctx: &mut MatchContext<'a>,
    ) -> bool {
        let mut stack: Vec<AstNode<'a>> = parents.to_vec();
        stack.push(node);
        Self::walk_for_witness(m, node, &mut stack, ctx)
    }

    fn walk_for_witness<'a>(
        m: &Matcher,
        node: AstNode<'a>,
        parents: &mut Vec<AstNode<'a>>,
        ctx: &mut MatchContext<'a>,
    ) -> bool {
        for child in node.children() {
            if m.match_here(Some(child), parents, ctx) {
                return true;
            }
            parents.push(child);
            let found = Self::walk_for_witness(m, child, parents, ctx);
            parents.pop();
            if found {
                return true;
            }
        }
        false
    }

    fn label(&self) -> &'static str {
        match self {
            Matcher::AnyNode => "AnyNode",
            Matcher::HasChildren => "HasChildren",
            Matcher::NodeType(_) => "NodeType",
            Matcher::Attribute { .. } => "Attribute",
            Matcher::Literal { .. } => "Literal",
            Matcher::Any(_) => "Any",
            Matcher::All(_) => "All",
            Matcher::Not(_) => "Not",
            Matcher::Maybe(_) => "Maybe",
            Matcher::Parent(_) => "Parent",
            Matcher::Capture { .. } => "Capture",
            Matcher::Group { .. } => "Group",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticSink;
    use serde_json::json;

    fn ctx() -> MatchContext<'static> {
        MatchContext::new(DiagnosticSink::disabled())
    }

    #[test]
    fn any_node_matches_every_physical_node() {
        let v = json!({"SelectStmt": {"targetList": [{"ResTarget": {"name": "a"}}]}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let hits = Matcher::AnyNode.search(root, &mut c);
        // SelectStmt + targetList's virtual? no, targetList is a sequence of
        // real nodes: SelectStmt, ResTarget, and ResTarget's "name" virtual
        // attribute child.
        assert_eq!(hits.len(), 3, "{hits:?}");
    }

    #[test]
    fn node_type_matcher_is_case_insensitive() {
        let v = json!({"SelectStmt": {}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        assert!(Matcher::NodeType("selectstmt".into()).match_here(Some(root), &[], &mut c));
        assert!(!Matcher::NodeType("InsertStmt".into()).match_here(Some(root), &[], &mut c));
    }

    #[test]
    fn attribute_matcher_requires_nonempty_field() {
        let v = json!({"RangeVar": {"relname": "users", "schemaname": ""}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let present = Matcher::Attribute {
            name: "relname".into(),
            value: Box::new(Matcher::AnyNode),
        };
        let absent = Matcher::Attribute {
            name: "schemaname".into(),
            value: Box::new(Matcher::AnyNode),
        };
        assert!(present.match_here(Some(root), &[], &mut c));
        assert!(!absent.match_here(Some(root), &[], &mut c));
    }

    #[test]
    fn attribute_value_predicate_checks_literal_text() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Attribute {
            name: "relname".into(),
            value: Box::new(Matcher::Literal {
                text: "users".into(),
                case_insensitive: false,
            }),
        };
        assert!(matcher.match_here(Some(root), &[], &mut c));
    }

    #[test]
    fn not_never_leaves_captures_behind_win_or_lose() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let inner = Matcher::Capture {
            name: "t".into(),
            inner: Box::new(Matcher::NodeType("RangeVar".into())),
        };
        let not_matching = Matcher::Not(Box::new(inner.clone()));
        assert!(!not_matching.match_here(Some(root), &[], &mut c));
        assert!(c.captures.is_empty());

        let not_failing = Matcher::Not(Box::new(Matcher::NodeType("SelectStmt".into())));
        assert!(not_failing.match_here(Some(root), &[], &mut c));
        assert!(c.captures.is_empty());
    }

    #[test]
    fn maybe_matches_null_field_or_a_matching_value() {
        let v = json!({"RangeVar": {"relname": "users", "schemaname": ""}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Attribute {
            name: "schemaname".into(),
            value: Box::new(Matcher::Maybe(Box::new(Matcher::AnyNode))),
        };
        assert!(matcher.match_here(Some(root), &[], &mut c));
    }

    #[test]
    fn maybe_commits_captures_only_when_it_fires() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Attribute {
            name: "relname".into(),
            value: Box::new(Matcher::Maybe(Box::new(Matcher::Capture {
                name: "t".into(),
                inner: Box::new(Matcher::AnyNode),
            }))),
        };
        assert!(matcher.match_here(Some(root), &[], &mut c));
        assert_eq!(c.captures.count("t"), 1);
    }

    #[test]
    fn capture_of_an_attribute_stores_the_scalar_value_not_the_node() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Capture {
            name: "t".into(),
            inner: Box::new(Matcher::Attribute {
                name: "relname".into(),
                value: Box::new(Matcher::AnyNode),
            }),
        };
        assert!(matcher.match_here(Some(root), &[], &mut c));
        let captured = c.captures.get("t");
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].as_text().as_deref(), Some("users"));
        assert!(captured[0].is_virtual());
    }

    #[test]
    fn capture_of_a_node_type_stores_the_node_itself() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Capture {
            name: "t".into(),
            inner: Box::new(Matcher::NodeType("RangeVar".into())),
        };
        assert!(matcher.match_here(Some(root), &[], &mut c));
        assert_eq!(c.captures.get("t")[0].type_name(), "RangeVar");
    }

    #[test]
    fn parent_matcher_consults_the_immediate_ancestor() {
        let v = json!({"SelectStmt": {"fromClause": [{"RangeVar": {"relname": "users"}}]}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Group {
            head: Box::new(Matcher::NodeType("RangeVar".into())),
            same_node: vec![Matcher::Parent(Box::new(Matcher::NodeType(
                "SelectStmt".into(),
            )))],
            descendant: vec![],
        };
        let hits = matcher.search(root, &mut c);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].type_name(), "RangeVar");
    }

    #[test]
    fn any_and_all_combine_children_with_or_and_and() {
        let v = json!({"RangeVar": {"relname": "users"}});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let any = Matcher::Any(vec![
            Matcher::NodeType("SelectStmt".into()),
            Matcher::NodeType("RangeVar".into()),
        ]);
        assert!(any.match_here(Some(root), &[], &mut c));

        let all = Matcher::All(vec![
            Matcher::NodeType("RangeVar".into()),
            Matcher::Attribute {
                name: "relname".into(),
                value: Box::new(Matcher::AnyNode),
            },
        ]);
        assert!(all.match_here(Some(root), &[], &mut c));

        let all_fails = Matcher::All(vec![
            Matcher::NodeType("RangeVar".into()),
            Matcher::NodeType("SelectStmt".into()),
        ]);
        assert!(!all_fails.match_here(Some(root), &[], &mut c));
    }

    #[test]
    fn group_ellipsis_requires_an_existing_descendant_witness() {
        let v = json!({"SelectStmt": {
            "whereClause": {"A_Expr": {"name": [{"String": {"sval": ">"}}]}},
        }});
        let root = AstNode::from_value(&v).unwrap();
        let mut c = ctx();
        let matcher = Matcher::Group {
            head: Box::new(Matcher::NodeType("SelectStmt".into())),
            same_node: vec![],
            descendant: vec![Matcher::NodeType("A_Expr".into())],
        };
        assert!(matcher.match_here(Some(root), &[], &mut c));

        let no_witness = Matcher::Group {
            head: Box::new(Matcher::NodeType("SelectStmt".into())),
            same_node: vec![],
            descendant: vec![Matcher::NodeType("InsertStmt".into())],
        };
        assert!(!no_witness.match_here(Some(root), &[], &mut c));
    }

    #[test]
    fn ellipsis_monotonicity_prepending_never_loses_matches() {
        let v = json!({"SelectStmt": {"fromClause": [{"RangeVar": {"relname": "users"}}]}});
        let root = AstNode::from_value(&v).unwrap();
        let plain = Matcher::NodeType("RangeVar".into());
        let widened = Matcher::Group {
            head: Box::new(Matcher::AnyNode),
            same_node: vec![],
            descendant: vec![Matcher::NodeType("RangeVar".into())],
        };
        let mut c1 = ctx();
        let mut c2 = ctx();
        let plain_hits = plain.search(root, &mut c1);
        let widened_hits = widened.search(root, &mut c2);
        assert!(!plain_hits.is_empty());
        assert!(widened_hits.len() >= 1);
    }
}
