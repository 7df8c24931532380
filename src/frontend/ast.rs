//! The generic node record model produced by the normalizer.
//!
//! A `NodeRecord` is a parser-independent description of one syntax tree
//! node: a kind tag, an optional source span, the kind-specific scalar
//! attributes and an ordered list of named structural fields. The layout
//! engine only ever reads this model, so it stays free of any reference to
//! the host grammar's own node types.

use super::span::Span;
use std::fmt;

/// A single normalized syntax tree node.
///
/// Records are built once per normalization call and never mutated
/// afterwards; the layout engine walks them read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Syntactic category tag, e.g. `function_definition` or `identifier`.
    pub kind: String,
    /// Source range, absent for hand-built synthetic nodes.
    pub span: Option<Span>,
    /// Kind-specific leaf data. Never contains child records.
    pub attrs: Attrs,
    /// Structural children, in the grammar's canonical field order.
    /// Absent optional children are omitted entirely.
    pub fields: Vec<Field>,
}

impl NodeRecord {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            span: None,
            attrs: Attrs::None,
            fields: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Append a field holding exactly one child.
    pub fn push_single(&mut self, name: impl Into<String>, child: NodeRecord) {
        self.fields.push(Field {
            name: name.into(),
            children: FieldChildren::Single(Box::new(child)),
        });
    }

    /// Append a field holding an ordered (possibly empty) list of children.
    pub fn push_many(&mut self, name: impl Into<String>, children: Vec<NodeRecord>) {
        self.fields.push(Field {
            name: name.into(),
            children: FieldChildren::Many(children),
        });
    }

    /// Look up a field by name. Mostly useful in tests.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named structural slot on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub children: FieldChildren,
}

impl Field {
    /// Iterate over the field's children regardless of multiplicity.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        match &self.children {
            FieldChildren::Single(child) => std::slice::from_ref(&**child).iter(),
            FieldChildren::Many(children) => children.iter(),
        }
    }
}

/// Multiplicity of a field: one child, or an order-significant sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChildren {
    Single(Box<NodeRecord>),
    Many(Vec<NodeRecord>),
}

/// Kind-specific scalar attributes. Identifier-like values (declared names,
/// binding names, parameter names) are stored here as plain strings and are
/// never wrapped as child records.
#[derive(Debug, Clone, PartialEq)]
pub enum Attrs {
    /// No notable scalar data for this kind.
    None,
    /// A declared or referenced name: definitions, keyword arguments,
    /// attribute members, import targets, exception aliases.
    Name { name: String },
    /// An identifier reference together with its binding context.
    Ident { name: String, ctx: BindingCtx },
    /// A literal's source text and its runtime type tag.
    Literal {
        value: String,
        type_tag: &'static str,
    },
    /// An operator's symbolic kind, e.g. `add` or `lt`.
    Op { op: String },
    /// A comparison chain's ordered sequence of operator kinds.
    Ops { ops: Vec<String> },
}

/// How an identifier is being used at its occurrence site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingCtx {
    Read,
    Write,
    Delete,
    Param,
}

impl BindingCtx {
    pub fn is_default(self) -> bool {
        matches!(self, BindingCtx::Read)
    }
}

impl fmt::Display for BindingCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingCtx::Read => "read",
            BindingCtx::Write => "write",
            BindingCtx::Delete => "del",
            BindingCtx::Param => "param",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_iteration() {
        let mut rec = NodeRecord::new("assignment");
        rec.push_single("left", NodeRecord::new("identifier"));
        rec.push_many(
            "right",
            vec![NodeRecord::new("integer"), NodeRecord::new("integer")],
        );

        assert_eq!(rec.field("left").unwrap().iter().count(), 1);
        assert_eq!(rec.field("right").unwrap().iter().count(), 2);
        assert!(rec.field("missing").is_none());
    }

    #[test]
    fn test_field_order_is_insertion_order() {
        let mut rec = NodeRecord::new("call");
        rec.push_single("function", NodeRecord::new("identifier"));
        rec.push_many("args", vec![]);

        let names: Vec<&str> = rec.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["function", "args"]);
    }
}
