//! C1 — AST Facade, implemented over the canonical `{"NodeType": {field:
//! value, ...}}` JSON shape that `pg_query`'s generated protobuf tree
//! serializes to (see SPEC_FULL.md §2 for why: writing a per-node-type field
//! table by hand for ~200 protobuf message types is not how this gets built
//! without a proto-aware code generator, so the facade reflects over the
//! serialized tree instead).
//!
//! A node is represented as a `&serde_json::Value` together with its type
//! name. A "virtual attribute node" (§3 of spec.md) wraps a scalar leaf value
//! together with the field name that exposed it; it borrows nothing beyond
//! the lifetime of the parent traversal.

use serde_json::{Value, json};

/// Either a real AST node (a single-key `{"Type": {...}}` object drawn from
/// the parsed tree) or a virtual attribute node presenting a scalar field as
/// if it were a node of type equal to the field name.
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'a> {
    Real {
        type_name: &'a str,
        fields: &'a Value,
    },
    Virtual {
        name: &'a str,
        value: &'a Value,
    },
}

/// One child in the uniform child stream of §3: either another [`AstNode`]
/// or, equivalently, just an [`AstNode`] — virtual attributes and real nodes
/// share the same type once produced by [`AstNode::children`].
pub type Child<'a> = AstNode<'a>;

impl<'a> AstNode<'a> {
    /// Interpret a raw JSON value as a node, if it is shaped like one (a
    /// single-key object). Returns `None` for anything else (arrays,
    /// scalars, multi-key or empty objects), which callers treat as "not a
    /// node" rather than panicking — the AST is externally produced and
    /// this facade must not assume every shape it wasn't told about.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.len() != 1 {
            return None;
        }
        let (type_name, fields) = obj.iter().next().unwrap();
        Some(AstNode::Real {
            type_name: type_name.as_str(),
            fields,
        })
    }

    /// Root statement node from a `RawStmt`-shaped value (`{"stmt": {...},
    /// "stmt_location": N, "stmt_len": N}`), as produced per top-level
    /// statement by `engine::sql`.
    pub fn from_raw_stmt(raw_stmt: &'a Value) -> Option<Self> {
        let stmt = raw_stmt.as_object()?.get("stmt")?;
        Self::from_value(stmt)
    }

    pub fn type_name(&self) -> &'a str {
        match self {
            AstNode::Real { type_name, .. } => type_name,
            AstNode::Virtual { name, .. } => name,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, AstNode::Virtual { .. })
    }

    /// The scalar value of a virtual attribute node. `None` for real nodes.
    pub fn scalar_value(&self) -> Option<&'a Value> {
        match self {
            AstNode::Virtual { value, .. } => Some(value),
            AstNode::Real { .. } => None,
        }
    }

    /// String form of this node's value, used by literal/attribute value
    /// matching (spec.md §4.5 Attribute/Literal). For a virtual attribute
    /// node this is the scalar's natural text form (unquoted for strings);
    /// for a real node with no meaningful scalar shape, `None`.
    pub fn as_text(&self) -> Option<String> {
        let value = match self {
            AstNode::Virtual { value, .. } => Some(*value),
            AstNode::Real { fields, .. } => {
                // Some "real" nodes are themselves thin scalar wrappers,
                // e.g. the Value nodes `{"String": {"sval": "x"}}`,
                // `{"Integer": {"ival": 5}}`. Surface their single scalar
                // field so `(relname "users")`-style literal comparisons
                // work uniformly whether the RHS is a virtual attribute or
                // one of these wrapper nodes.
                fields.as_object().and_then(|obj| {
                    if obj.len() == 1 {
                        obj.values().next()
                    } else {
                        None
                    }
                })
            }
        }?;
        Some(match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => return None,
            other => other.to_string(),
        })
    }

    /// True if `value` should be treated as "not present" per spec.md §3:
    /// null, empty string, or empty sequence. `false`/`0` are present.
    fn is_empty_value(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            _ => false,
        }
    }

    /// The uniform child stream: every nested node, every element of every
    /// nested sequence, and every non-empty scalar field surfaced as a
    /// virtual attribute node — in field-declaration order.
    pub fn children(&self) -> Vec<Child<'a>> {
        let fields = match self {
            AstNode::Real { fields, .. } => fields,
            AstNode::Virtual { .. } => return Vec::new(),
        };
        let Some(obj) = fields.as_object() else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(obj.len());
        for (key, value) in obj.iter() {
            if Self::is_empty_value(value) {
                continue;
            }
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(node) = AstNode::from_value(item) {
                            out.push(node);
                        } else if !Self::is_empty_value(item) {
                            out.push(AstNode::Virtual { name: key, value: item });
                        }
                    }
                }
                Value::Object(_) => {
                    if let Some(node) = AstNode::from_value(value) {
                        out.push(node);
                    }
                }
                scalar => out.push(AstNode::Virtual { name: key, value: scalar }),
            }
        }
        out
    }

    /// Case-insensitive lookup of a named scalar/nested field on this node,
    /// returning the raw JSON value regardless of emptiness.
    pub fn field(&self, name: &str) -> Option<&'a Value> {
        let AstNode::Real { fields, .. } = self else {
            return None;
        };
        let obj = fields.as_object()?;
        obj.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// True iff this node has a field named `name` (case-insensitive) whose
    /// value is non-empty per spec.md §3.
    pub fn has_nonempty_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(|v| !Self::is_empty_value(v))
    }

    /// The named field presented as a node, for attribute matching (§4.5
    /// Attribute). `None` when the field is absent or empty — callers that
    /// need to distinguish "absent" for `Maybe` semantics get that for free,
    /// since both map to `None` here. A nested-object field becomes a real
    /// node; anything else (scalar, bool, number) becomes a virtual
    /// attribute node named after the field's own key. Sequence-valued
    /// fields are not attribute-shaped and are not surfaced here (they are
    /// reached through `children()` instead).
    ///
    /// `name` only needs to live long enough for the lookup itself — the
    /// returned `Virtual` node borrows its name from the matched key in
    /// `fields` (lifetime `'a`), not from the caller's `name` argument, so
    /// this works for a short-lived `name` borrowed from `&self` elsewhere
    /// (e.g. a `Matcher::Attribute`'s field name borrowed from `&self` in the
    /// matcher, whose lifetime is unrelated to the AST's `'a`).
    pub fn field_as_node(&self, name: &str) -> Option<AstNode<'a>> {
        let AstNode::Real { fields, .. } = self else {
            return None;
        };
        let obj = fields.as_object()?;
        let (key, raw) = obj.iter().find(|(key, _)| key.eq_ignore_ascii_case(name))?;
        if Self::is_empty_value(raw) {
            return None;
        }
        match raw {
            Value::Object(_) => AstNode::from_value(raw),
            Value::Array(_) => None,
            scalar => Some(AstNode::Virtual { name: key.as_str(), value: scalar }),
        }
    }

    /// Clone this node into a standalone, lifetime-free JSON value, in the
    /// same `{"Type": {...}}` / `{"field": value}` shape `from_value` reads.
    /// Used by the owned result types (`engine::result::OwnedMatch`) so a
    /// match can outlive the `ParsedDocument` it was found in.
    pub fn to_owned_value(&self) -> Value {
        match self {
            AstNode::Real { type_name, fields } => json!({ *type_name: (*fields).clone() }),
            AstNode::Virtual { name, value } => json!({ *name: (*value).clone() }),
        }
    }
}
