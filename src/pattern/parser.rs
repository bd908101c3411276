//! C4 — Pattern Parser.
//!
//! Recursive-descent over the token stream produced by
//! [`crate::pattern::tokenizer::tokenize`], grounded on `ast-grep`'s
//! s-expression-like query parser
//! (`examples/other_examples/ef4946ce_ast-grep-ast-grep__crates-core-src-traversal.rs.rs`
//! for the shape of "head then conjuncts" grouping) and `rust-analyzer`'s
//! `ra_ssr` parser for the capture-prefix (`$name`) handling.
//!
//! Grammar, informally (see spec.md §4.4 for the authoritative prose):
//!
//! ```text
//! expr    := '_' | '...' | dq-string | sq-string | ident
//!          | '{' expr* '}'            (Any)
//!          | '[' expr* ']'            (All)
//!          | '(' group-body ')'
//!          | '^' expr                 (Parent)
//!          | '!' expr                 (Not)
//!          | '?' expr                 (Maybe)
//!          | '$' [ident] [expr]       (Capture)
//!
//! group-body := attr-ident [expr]            (Attribute form)
//!             | expr conjunct* ('...' conjunct*)?   (Group form)
//! ```
//!
//! An identifier is classified by [`crate::registry`] alone: a known
//! node-type name becomes [`Matcher::NodeType`], a known attribute name
//! becomes a bare [`Matcher::Attribute`] (implicit `_` value), and anything
//! else becomes a case-insensitive [`Matcher::Literal`] (spec.md §3:
//! "unrecognized bare identifiers fall back to a literal text match").

use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::pattern::capture::UNNAMED;
use crate::pattern::matcher::Matcher;
use crate::pattern::token::{Token, TokenKind};
use crate::pattern::tokenizer::tokenize;
use crate::registry;

/// Compile `pattern` with no diagnostics.
pub fn parse(pattern: &str) -> Result<Matcher> {
    parse_with_diagnostics(pattern, DiagnosticSink::disabled())
}

/// Compile `pattern`, reporting tokenization/parser productions to `diagnostics`.
pub fn parse_with_diagnostics(pattern: &str, diagnostics: DiagnosticSink) -> Result<Matcher> {
    let tokens = tokenize(pattern)?;
    diagnostics.tokenized(pattern, &tokens);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        diagnostics,
    };
    let matcher = parser.parse_expression()?;
    if let Some(trailing) = parser.peek() {
        return Err(Error::unexpected_token(Some(trailing), "end of pattern"));
    }
    Ok(matcher)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    diagnostics: DiagnosticSink,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token> {
        let tok = self.tokens.get(self.pos);
        match tok {
            Some(t) if t.kind == kind => {
                self.pos += 1;
                Ok(t)
            }
            _ => Err(Error::unexpected_token(tok, &format!("{kind:?}"))),
        }
    }

    fn parse_expression(&mut self) -> Result<Matcher> {
        let tok = self
            .peek()
            .ok_or_else(|| Error::unexpected_token(None, "a pattern"))?;
        self.diagnostics
            .parse_production("expression", &format!("{:?}", tok.kind));

        match tok.kind.clone() {
            TokenKind::Underscore => {
                self.advance();
                Ok(Matcher::AnyNode)
            }
            TokenKind::Ellipsis => {
                self.advance();
                Ok(Matcher::HasChildren)
            }
            TokenKind::DqString(text) | TokenKind::SqString(text) => {
                self.advance();
                Ok(Matcher::Literal {
                    text,
                    case_insensitive: false,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(classify_ident(&name))
            }
            TokenKind::LBrace => self.parse_bracketed(TokenKind::RBrace, Matcher::Any),
            TokenKind::LBrack => self.parse_bracketed(TokenKind::RBrack, Matcher::All),
            TokenKind::LParen => self.parse_paren_group(),
            TokenKind::Caret => {
                self.advance();
                Ok(Matcher::Parent(Box::new(self.parse_expression()?)))
            }
            TokenKind::Bang => {
                self.advance();
                Ok(Matcher::Not(Box::new(self.parse_expression()?)))
            }
            TokenKind::QMark => {
                self.advance();
                Ok(Matcher::Maybe(Box::new(self.parse_expression()?)))
            }
            TokenKind::Dollar => {
                self.advance();
                self.parse_capture()
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBrack => {
                Err(Error::unexpected_token(Some(tok), "a pattern"))
            }
        }
    }

    fn parse_bracketed(
        &mut self,
        closer: TokenKind,
        ctor: impl Fn(Vec<Matcher>) -> Matcher,
    ) -> Result<Matcher> {
        self.advance(); // opener
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::unexpected_token(None, "a closing bracket")),
                Some(tok) if tok.kind == closer => {
                    self.advance();
                    break;
                }
                _ => items.push(self.parse_expression()?),
            }
        }
        Ok(ctor(items))
    }

    /// `$name`, `$name expr`, `$expr`, or bare `$` — see module docs.
    fn parse_capture(&mut self) -> Result<Matcher> {
        if let Some(Token {
            kind: TokenKind::Ident(name),
            ..
        }) = self.peek()
        {
            let name = name.clone();
            self.advance();
            let inner = if self.next_starts_expression() {
                self.parse_expression()?
            } else {
                Matcher::AnyNode
            };
            return Ok(Matcher::Capture {
                name,
                inner: Box::new(inner),
            });
        }

        let inner = if self.next_starts_expression() {
            self.parse_expression()?
        } else {
            Matcher::AnyNode
        };
        Ok(Matcher::Capture {
            name: UNNAMED.to_string(),
            inner: Box::new(inner),
        })
    }

    fn next_starts_expression(&self) -> bool {
        self.peek().is_some_and(|t| t.kind.starts_expression())
    }

    /// `(group-body)`: either the attribute form `(attr_name [value])` or the
    /// general form `head conjunct* ('...' conjunct*)?`.
    fn parse_paren_group(&mut self) -> Result<Matcher> {
        self.expect(TokenKind::LParen)?;
        // spec.md §4.4: "an empty group parses to the any-node wildcard".
        if self.peek().is_some_and(|t| t.kind == TokenKind::RParen) {
            self.advance();
            return Ok(Matcher::AnyNode);
        }
        if self.peek().is_none_or(|t| t.kind.is_closer()) {
            return Err(Error::unexpected_token(self.peek(), "a pattern inside '('"));
        }

        if let Some(name) = self.peek_attribute_ident() {
            self.advance();
            let value = if self.peek().is_some_and(|t| t.kind == TokenKind::RParen) {
                Matcher::AnyNode
            } else {
                self.parse_expression()?
            };
            self.expect(TokenKind::RParen)?;
            return Ok(Matcher::Attribute {
                name,
                value: Box::new(value),
            });
        }

        let head = self.parse_expression()?;
        let mut same_node = Vec::new();
        let mut descendant = Vec::new();
        let mut seen_ellipsis = false;
        loop {
            match self.peek() {
                None => return Err(Error::unexpected_token(None, "')'")),
                Some(tok) if tok.kind == TokenKind::RParen => {
                    self.advance();
                    break;
                }
                Some(tok) if tok.kind == TokenKind::Ellipsis && !seen_ellipsis => {
                    self.advance();
                    seen_ellipsis = true;
                }
                _ => {
                    let conjunct = self.parse_expression()?;
                    if seen_ellipsis {
                        descendant.push(conjunct);
                    } else {
                        same_node.push(conjunct);
                    }
                }
            }
        }
        Ok(Matcher::Group {
            head: Box::new(head),
            same_node,
            descendant,
        })
    }

    /// If the next token is an identifier that the registry recognizes as an
    /// attribute name, return it (without consuming). The registries are
    /// disjoint (`registry` tests assert this), so no separate node-type
    /// exclusion check is needed.
    fn peek_attribute_ident(&self) -> Option<String> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Ident(name)) if registry::is_attribute_name(name) => {
                Some(name.clone())
            }
            _ => None,
        }
    }
}

fn classify_ident(name: &str) -> Matcher {
    if registry::is_node_type_name(name) {
        Matcher::NodeType(name.to_string())
    } else if registry::is_attribute_name(name) {
        Matcher::Attribute {
            name: name.to_string(),
            value: Box::new(Matcher::AnyNode),
        }
    } else {
        Matcher::Literal {
            text: name.to_string(),
            case_insensitive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_compiles_to_any_node() {
        assert!(matches!(parse("_").unwrap(), Matcher::AnyNode));
    }

    #[test]
    fn standalone_ellipsis_compiles_to_has_children() {
        assert!(matches!(parse("...").unwrap(), Matcher::HasChildren));
    }

    #[test]
    fn known_node_type_ident_compiles_to_node_type() {
        match parse("SelectStmt").unwrap() {
            Matcher::NodeType(name) => assert_eq!(name, "SelectStmt"),
            other => panic!("expected NodeType, got {other:?}"),
        }
    }

    #[test]
    fn known_attribute_ident_compiles_to_bare_attribute() {
        match parse("relname").unwrap() {
            Matcher::Attribute { name, value } => {
                assert_eq!(name, "relname");
                assert!(matches!(*value, Matcher::AnyNode));
            }
            other => panic!("expected Attribute, got {other:?}"),
        }
    }

    #[test]
    fn unknown_ident_falls_back_to_case_insensitive_literal() {
        match parse("users").unwrap() {
            Matcher::Literal {
                text,
                case_insensitive,
            } => {
                assert_eq!(text, "users");
                assert!(case_insensitive);
            }
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    #[test]
    fn quoted_string_is_exact_literal() {
        match parse("\"users\"").unwrap() {
            Matcher::Literal {
                text,
                case_insensitive,
            } => {
                assert_eq!(text, "users");
                assert!(!case_insensitive);
            }
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_attribute_form_parses_name_and_value() {
        match parse("(relname \"users\")").unwrap() {
            Matcher::Attribute { name, value } => {
                assert_eq!(name, "relname");
                match *value {
                    Matcher::Literal { text, .. } => assert_eq!(text, "users"),
                    other => panic!("expected Literal value, got {other:?}"),
                }
            }
            other => panic!("expected Attribute, got {other:?}"),
        }
    }

    #[test]
    fn bare_attribute_form_defaults_value_to_any_node() {
        match parse("(relname)").unwrap() {
            Matcher::Attribute { name, value } => {
                assert_eq!(name, "relname");
                assert!(matches!(*value, Matcher::AnyNode));
            }
            other => panic!("expected Attribute, got {other:?}"),
        }
    }

    #[test]
    fn node_type_group_collects_same_node_conjuncts() {
        match parse("(RangeVar relname)").unwrap() {
            Matcher::Group {
                head,
                same_node,
                descendant,
            } => {
                assert!(matches!(*head, Matcher::NodeType(ref n) if n == "RangeVar"));
                assert_eq!(same_node.len(), 1);
                assert!(descendant.is_empty());
            }
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn ellipsis_inside_group_splits_same_node_from_descendant() {
        match parse("(SelectStmt (relname) ... InsertStmt)").unwrap() {
            Matcher::Group {
                same_node,
                descendant,
                ..
            } => {
                assert_eq!(same_node.len(), 1);
                assert_eq!(descendant.len(), 1);
            }
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn any_group_parses_brace_delimited_alternatives() {
        match parse("{SelectStmt InsertStmt}").unwrap() {
            Matcher::Any(children) => assert_eq!(children.len(), 2),
            other => panic!("expected Any, got {other:?}"),
        }
    }

    #[test]
    fn all_group_parses_bracket_delimited_conjuncts() {
        match parse("[RangeVar (relname)]").unwrap() {
            Matcher::All(children) => assert_eq!(children.len(), 2),
            other => panic!("expected All, got {other:?}"),
        }
    }

    #[test]
    fn bang_caret_qmark_wrap_their_operand() {
        assert!(matches!(parse("!SelectStmt").unwrap(), Matcher::Not(_)));
        assert!(matches!(parse("^SelectStmt").unwrap(), Matcher::Parent(_)));
        assert!(matches!(parse("?SelectStmt").unwrap(), Matcher::Maybe(_)));
    }

    #[test]
    fn bare_dollar_captures_the_unnamed_bucket_with_any_node() {
        match parse("$").unwrap() {
            Matcher::Capture { name, inner } => {
                assert_eq!(name, UNNAMED);
                assert!(matches!(*inner, Matcher::AnyNode));
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn dollar_name_alone_captures_with_implicit_any_node_body() {
        match parse("$t").unwrap() {
            Matcher::Capture { name, inner } => {
                assert_eq!(name, "t");
                assert!(matches!(*inner, Matcher::AnyNode));
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn dollar_name_followed_by_all_group_captures_that_group() {
        match parse("$t [RangeVar relname]").unwrap() {
            Matcher::Capture { name, inner } => {
                assert_eq!(name, "t");
                assert!(matches!(*inner, Matcher::All(_)));
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn dollar_name_followed_by_pattern_captures_that_pattern() {
        match parse("$t SelectStmt").unwrap() {
            Matcher::Capture { name, inner } => {
                assert_eq!(name, "t");
                assert!(matches!(*inner, Matcher::NodeType(ref n) if n == "SelectStmt"));
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn dollar_directly_followed_by_non_ident_expr_uses_unnamed_bucket() {
        match parse("$_").unwrap() {
            Matcher::Capture { name, inner } => {
                assert_eq!(name, UNNAMED);
                assert!(matches!(*inner, Matcher::AnyNode));
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn trailing_tokens_after_a_complete_pattern_are_a_syntax_error() {
        assert!(parse("SelectStmt InsertStmt").is_err());
    }

    #[test]
    fn unclosed_group_is_a_syntax_error() {
        assert!(parse("(SelectStmt").is_err());
    }

    #[test]
    fn empty_parens_compile_to_any_node_wildcard() {
        assert!(matches!(parse("()").unwrap(), Matcher::AnyNode));
    }

    #[test]
    fn full_seed_pattern_compiles_without_error() {
        // "a SELECT whose FROM clause names a table, captured" — exercises
        // Group + same-node Attribute conjunct + Capture composition.
        parse("(SelectStmt (fromClause $t RangeVar))").unwrap();
    }
}
