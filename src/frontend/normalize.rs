//! Tree normalizer: converts the grammar's concrete syntax tree into the
//! generic node record model.
//!
//! The conversion is a single recursive pass over the parse tree. Every kind
//! with interesting scalar data (names, literal values, operator symbols,
//! binding contexts) has a dedicated rule in one closed `match`; everything
//! else goes through a generic fallback that keeps the span and recovers the
//! structural fields from the tree cursor, so unrecognized kinds can never
//! abort a normalization.
//!
//! Example:
//! ```no_run
//! use astviz::frontend::normalize::normalize;
//! let record = normalize("x = 1").unwrap();
//! assert_eq!(record.kind, "module");
//! ```

use tree_sitter::{Node, Parser};

use super::ast::{Attrs, BindingCtx, NodeRecord};
use super::span::Span;
use crate::error::AstVizError;

/// Parse `source` and convert the resulting tree into a node record.
///
/// Returns `Err` exactly when the grammar cannot parse the input; the error
/// carries the position of the first offending node. A fresh parser is set
/// up per call, so concurrent normalizations are independent.
pub fn normalize(source: &str) -> Result<NodeRecord, AstVizError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| AstVizError::Grammar {
            msg: format!("failed to load the Python grammar: {}", e),
        })?;
    let tree = parser.parse(source, None).ok_or_else(|| AstVizError::Grammar {
        msg: "the parser produced no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(first_syntax_error(root));
    }
    Ok(Normalizer::new(source).convert(root, BindingCtx::Read))
}

/// Locate the first ERROR or MISSING node and turn it into a syntax error.
fn first_syntax_error(root: Node) -> AstVizError {
    fn find<'t>(node: Node<'t>) -> Option<Node<'t>> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            return None;
        }
        for i in 0..node.child_count() {
            if let Some(hit) = node.child(i).and_then(find) {
                return Some(hit);
            }
        }
        None
    }

    let offender = find(root).unwrap_or(root);
    let msg = if offender.is_missing() {
        format!("missing '{}'", offender.kind())
    } else {
        "invalid syntax".to_string()
    };
    let pos = offender.start_position();
    AstVizError::SyntaxError {
        line: pos.row as u32 + 1,
        column: pos.column as u32,
        msg,
    }
}

fn span_of(node: Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        start.row as u32 + 1,
        start.column as u32,
        end.row as u32 + 1,
        end.column as u32,
    )
}

struct Normalizer<'a> {
    source: &'a [u8],
}

impl<'a> Normalizer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
        }
    }

    //-------
    // HELPER
    //-------

    fn text(&self, node: Node) -> String {
        node.utf8_text(self.source).unwrap_or_default().to_string()
    }

    /// Kind tag plus span; the starting point of every rule.
    fn base(&self, node: Node, kind: &str) -> NodeRecord {
        NodeRecord::new(kind).with_span(span_of(node))
    }

    /// Named children in document order, with comment nodes dropped.
    fn named_children<'t>(&self, node: Node<'t>) -> Vec<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect()
    }

    /// All children stored under the given grammar field.
    fn field_nodes<'t>(&self, node: Node<'t>, field: &str) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                if cursor.field_name() == Some(field) {
                    out.push(cursor.node());
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        out
    }

    fn children_of_kind<'t>(&self, node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
        self.named_children(node)
            .into_iter()
            .filter(|child| child.kind() == kind)
            .collect()
    }

    fn convert_many(&self, nodes: Vec<Node>, ctx: BindingCtx) -> Vec<NodeRecord> {
        nodes.into_iter().map(|n| self.convert(n, ctx)).collect()
    }

    /// Push a single-child field if the grammar field is present.
    fn single(&self, rec: &mut NodeRecord, node: Node, ts_field: &str, name: &str, ctx: BindingCtx) {
        if let Some(child) = node.child_by_field_name(ts_field) {
            if child.kind() != "comment" {
                rec.push_single(name, self.convert(child, ctx));
            }
        }
    }

    //-----------
    // CONVERSION
    //-----------

    /// Convert one native node into a record. `ctx` is the binding context
    /// identifiers below this node resolve to; rules that introduce bindings
    /// (assignment targets, loop targets, parameter lists, deletions)
    /// override it on the way down.
    fn convert(&self, node: Node, ctx: BindingCtx) -> NodeRecord {
        let kind = node.kind();
        match kind {
            "module" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "body",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }

            // ---- Definitions ----
            "function_definition" => {
                let is_async = node.child(0).map_or(false, |c| c.kind() == "async");
                let tag = if is_async {
                    "async_function_definition"
                } else {
                    "function_definition"
                };
                let mut rec = self.base(node, tag);
                if let Some(name) = node.child_by_field_name("name") {
                    rec.attrs = Attrs::Name {
                        name: self.text(name),
                    };
                }
                self.single(&mut rec, node, "parameters", "parameters", BindingCtx::Param);
                self.single(&mut rec, node, "return_type", "return_type", BindingCtx::Read);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                rec
            }
            "class_definition" => {
                let mut rec = self.base(node, kind);
                if let Some(name) = node.child_by_field_name("name") {
                    rec.attrs = Attrs::Name {
                        name: self.text(name),
                    };
                }
                self.single(&mut rec, node, "superclasses", "superclasses", BindingCtx::Read);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                rec
            }
            "decorated_definition" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "decorators",
                    self.convert_many(self.children_of_kind(node, "decorator"), BindingCtx::Read),
                );
                self.single(&mut rec, node, "definition", "definition", BindingCtx::Read);
                rec
            }
            "decorator" => {
                let mut rec = self.base(node, kind);
                if let Some(child) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(child, BindingCtx::Read));
                }
                rec
            }

            // ---- Parameters ----
            "parameters" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "params",
                    self.convert_many(self.named_children(node), BindingCtx::Param),
                );
                rec
            }
            "default_parameter" | "typed_default_parameter" => {
                let mut rec = self.base(node, kind);
                if let Some(name) = node.child_by_field_name("name") {
                    rec.attrs = Attrs::Name {
                        name: self.text(name),
                    };
                }
                self.single(&mut rec, node, "type", "type", BindingCtx::Read);
                self.single(&mut rec, node, "value", "value", BindingCtx::Read);
                rec
            }
            "typed_parameter" => {
                let mut rec = self.base(node, kind);
                if let Some(inner) = self.named_children(node).into_iter().next() {
                    if inner.kind() != "type" {
                        rec.attrs = Attrs::Name {
                            name: self.text(inner),
                        };
                    }
                }
                self.single(&mut rec, node, "type", "type", BindingCtx::Read);
                rec
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                self.base(node, kind).with_attrs(Attrs::Name {
                    name: self.text(node),
                })
            }

            // ---- Simple statements ----
            "expression_statement" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "value",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }
            "return_statement" => {
                let mut rec = self.base(node, kind);
                if let Some(value) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(value, BindingCtx::Read));
                }
                rec
            }
            "delete_statement" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "targets",
                    self.convert_many(self.named_children(node), BindingCtx::Delete),
                );
                rec
            }
            "assignment" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "left", "left", BindingCtx::Write);
                self.single(&mut rec, node, "type", "type", BindingCtx::Read);
                self.single(&mut rec, node, "right", "right", BindingCtx::Read);
                rec
            }
            "augmented_assignment" => {
                let mut rec = self.base(node, kind);
                if let Some(op) = node.child_by_field_name("operator") {
                    let raw = self.text(op);
                    let trimmed = raw.trim_end_matches('=');
                    rec.attrs = Attrs::Op {
                        op: binary_op_symbol(trimmed)
                            .map(str::to_string)
                            .unwrap_or(raw),
                    };
                }
                self.single(&mut rec, node, "left", "left", BindingCtx::Write);
                self.single(&mut rec, node, "right", "right", BindingCtx::Read);
                rec
            }
            "raise_statement" => {
                let mut rec = self.base(node, kind);
                let mut kids = self.named_children(node).into_iter();
                if let Some(exc) = kids.next() {
                    rec.push_single("exc", self.convert(exc, BindingCtx::Read));
                }
                if let Some(cause) = kids.next() {
                    rec.push_single("cause", self.convert(cause, BindingCtx::Read));
                }
                rec
            }
            "assert_statement" => {
                let mut rec = self.base(node, kind);
                let mut kids = self.named_children(node).into_iter();
                if let Some(test) = kids.next() {
                    rec.push_single("test", self.convert(test, BindingCtx::Read));
                }
                if let Some(msg) = kids.next() {
                    rec.push_single("msg", self.convert(msg, BindingCtx::Read));
                }
                rec
            }
            "global_statement" | "nonlocal_statement" => {
                let names: Vec<String> = self
                    .named_children(node)
                    .into_iter()
                    .map(|n| self.text(n))
                    .collect();
                self.base(node, kind).with_attrs(Attrs::Name {
                    name: names.join(", "),
                })
            }
            "import_statement" | "future_import_statement" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "names",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }
            "import_from_statement" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "module_name", "module", BindingCtx::Read);
                let names = self.field_nodes(node, "name");
                if !names.is_empty() {
                    rec.push_many("names", self.convert_many(names, BindingCtx::Read));
                }
                rec
            }
            "dotted_name" | "relative_import" => {
                self.base(node, kind).with_attrs(Attrs::Name {
                    name: self.text(node),
                })
            }
            "aliased_import" => {
                self.base(node, kind).with_attrs(Attrs::Name {
                    name: self.text(node),
                })
            }
            "pass_statement" | "break_statement" | "continue_statement" => self.base(node, kind),

            // ---- Compound statements ----
            "block" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "body",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }
            "if_statement" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "condition", "condition", BindingCtx::Read);
                self.single(&mut rec, node, "consequence", "consequence", BindingCtx::Read);
                let alternatives = self.field_nodes(node, "alternative");
                if !alternatives.is_empty() {
                    rec.push_many(
                        "alternative",
                        self.convert_many(alternatives, BindingCtx::Read),
                    );
                }
                rec
            }
            "elif_clause" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "condition", "condition", BindingCtx::Read);
                self.single(&mut rec, node, "consequence", "consequence", BindingCtx::Read);
                rec
            }
            "else_clause" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                rec
            }
            "for_statement" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "left", "left", BindingCtx::Write);
                self.single(&mut rec, node, "right", "right", BindingCtx::Read);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                self.single(&mut rec, node, "alternative", "alternative", BindingCtx::Read);
                rec
            }
            "while_statement" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "condition", "condition", BindingCtx::Read);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                self.single(&mut rec, node, "alternative", "alternative", BindingCtx::Read);
                rec
            }
            "with_statement" => {
                let mut rec = self.base(node, kind);
                if let Some(clause) = self
                    .children_of_kind(node, "with_clause")
                    .into_iter()
                    .next()
                {
                    rec.push_single("items", self.convert(clause, BindingCtx::Read));
                }
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                rec
            }
            "with_clause" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "items",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }
            "with_item" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "value", "value", BindingCtx::Read);
                rec
            }
            "as_pattern" => {
                let mut rec = self.base(node, kind);
                if let Some(value) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(value, BindingCtx::Read));
                }
                self.single(&mut rec, node, "alias", "alias", BindingCtx::Write);
                rec
            }
            "try_statement" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                let handlers = self.children_of_kind(node, "except_clause");
                if !handlers.is_empty() {
                    rec.push_many("handlers", self.convert_many(handlers, BindingCtx::Read));
                }
                if let Some(orelse) = self.children_of_kind(node, "else_clause").into_iter().next()
                {
                    rec.push_single("orelse", self.convert(orelse, BindingCtx::Read));
                }
                if let Some(finalizer) = self
                    .children_of_kind(node, "finally_clause")
                    .into_iter()
                    .next()
                {
                    rec.push_single("finalbody", self.convert(finalizer, BindingCtx::Read));
                }
                rec
            }
            "except_clause" => {
                let mut rec = self.base(node, kind);
                let kids = self.named_children(node);
                let mut exprs: Vec<Node> =
                    kids.iter().copied().filter(|k| k.kind() != "block").collect();
                if !exprs.is_empty() {
                    rec.push_single("type", self.convert(exprs.remove(0), BindingCtx::Read));
                }
                if let Some(alias) = exprs.first() {
                    if alias.kind() == "identifier" {
                        rec.attrs = Attrs::Name {
                            name: self.text(*alias),
                        };
                    } else {
                        rec.push_single("alias", self.convert(*alias, BindingCtx::Write));
                    }
                }
                if let Some(block) = kids.iter().find(|k| k.kind() == "block") {
                    rec.push_single("body", self.convert(*block, BindingCtx::Read));
                }
                rec
            }
            "finally_clause" => {
                let mut rec = self.base(node, kind);
                if let Some(block) = self.children_of_kind(node, "block").into_iter().next() {
                    rec.push_single("body", self.convert(block, BindingCtx::Read));
                }
                rec
            }

            // ---- Operators ----
            "binary_operator" => {
                let mut rec = self.base(node, kind);
                if let Some(op) = node.child_by_field_name("operator") {
                    let raw = self.text(op);
                    rec.attrs = Attrs::Op {
                        op: binary_op_symbol(&raw).map(str::to_string).unwrap_or(raw),
                    };
                }
                self.single(&mut rec, node, "left", "left", BindingCtx::Read);
                self.single(&mut rec, node, "right", "right", BindingCtx::Read);
                rec
            }
            "boolean_operator" => {
                let mut rec = self.base(node, kind);
                if let Some(op) = node.child_by_field_name("operator") {
                    rec.attrs = Attrs::Op { op: self.text(op) };
                }
                self.single(&mut rec, node, "left", "left", BindingCtx::Read);
                self.single(&mut rec, node, "right", "right", BindingCtx::Read);
                rec
            }
            "not_operator" => {
                let mut rec = self.base(node, kind).with_attrs(Attrs::Op {
                    op: "not".to_string(),
                });
                self.single(&mut rec, node, "argument", "argument", BindingCtx::Read);
                rec
            }
            "unary_operator" => {
                let mut rec = self.base(node, kind);
                if let Some(op) = node.child_by_field_name("operator") {
                    let raw = self.text(op);
                    rec.attrs = Attrs::Op {
                        op: unary_op_symbol(&raw).map(str::to_string).unwrap_or(raw),
                    };
                }
                self.single(&mut rec, node, "argument", "argument", BindingCtx::Read);
                rec
            }
            "comparison_operator" => {
                let mut rec = self.base(node, kind);
                let ops: Vec<String> = self
                    .field_nodes(node, "operators")
                    .into_iter()
                    .map(|op| {
                        let raw = self.text(op);
                        comparison_op_symbol(&raw)
                            .map(str::to_string)
                            .unwrap_or(raw)
                    })
                    .collect();
                rec.attrs = Attrs::Ops { ops };
                rec.push_many(
                    "operands",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }

            // ---- Expressions ----
            "lambda" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "parameters", "parameters", BindingCtx::Param);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                rec
            }
            "conditional_expression" => {
                let mut rec = self.base(node, kind);
                let mut kids = self.named_children(node).into_iter();
                if let Some(body) = kids.next() {
                    rec.push_single("body", self.convert(body, BindingCtx::Read));
                }
                if let Some(test) = kids.next() {
                    rec.push_single("test", self.convert(test, BindingCtx::Read));
                }
                if let Some(orelse) = kids.next() {
                    rec.push_single("orelse", self.convert(orelse, BindingCtx::Read));
                }
                rec
            }
            "named_expression" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "name", "target", BindingCtx::Write);
                self.single(&mut rec, node, "value", "value", BindingCtx::Read);
                rec
            }
            "call" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "function", "function", BindingCtx::Read);
                self.single(&mut rec, node, "arguments", "arguments", BindingCtx::Read);
                rec
            }
            "argument_list" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "args",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }
            "keyword_argument" => {
                let mut rec = self.base(node, kind);
                if let Some(name) = node.child_by_field_name("name") {
                    rec.attrs = Attrs::Name {
                        name: self.text(name),
                    };
                }
                self.single(&mut rec, node, "value", "value", BindingCtx::Read);
                rec
            }
            "attribute" => {
                let mut rec = self.base(node, kind);
                if let Some(attr) = node.child_by_field_name("attribute") {
                    rec.attrs = Attrs::Name {
                        name: self.text(attr),
                    };
                }
                self.single(&mut rec, node, "object", "object", BindingCtx::Read);
                rec
            }
            "subscript" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "value", "value", BindingCtx::Read);
                let subscripts = self.field_nodes(node, "subscript");
                if !subscripts.is_empty() {
                    rec.push_many("subscript", self.convert_many(subscripts, BindingCtx::Read));
                }
                rec
            }
            "parenthesized_expression" => {
                let mut rec = self.base(node, kind);
                if let Some(inner) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(inner, BindingCtx::Read));
                }
                rec
            }
            "await" => {
                let mut rec = self.base(node, kind);
                if let Some(value) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(value, BindingCtx::Read));
                }
                rec
            }
            "yield" => {
                let mut rec = self.base(node, kind);
                if let Some(value) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(value, BindingCtx::Read));
                }
                rec
            }
            "list_comprehension" | "set_comprehension" | "dictionary_comprehension"
            | "generator_expression" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "body", "body", BindingCtx::Read);
                let clauses: Vec<Node> = self
                    .named_children(node)
                    .into_iter()
                    .filter(|k| matches!(k.kind(), "for_in_clause" | "if_clause"))
                    .collect();
                rec.push_many("clauses", self.convert_many(clauses, BindingCtx::Read));
                rec
            }
            "for_in_clause" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "left", "left", BindingCtx::Write);
                self.single(&mut rec, node, "right", "right", BindingCtx::Read);
                rec
            }
            "if_clause" => {
                let mut rec = self.base(node, kind);
                if let Some(cond) = self.named_children(node).into_iter().next() {
                    rec.push_single("condition", self.convert(cond, BindingCtx::Read));
                }
                rec
            }

            // ---- Containers ----
            // Element lists forward the surrounding binding context so that
            // tuple/list assignment targets mark their identifiers as writes.
            "list" | "tuple" | "set" | "expression_list" | "pattern_list" | "tuple_pattern"
            | "list_pattern" => {
                let mut rec = self.base(node, kind);
                rec.push_many("elts", self.convert_many(self.named_children(node), ctx));
                rec
            }
            "dictionary" => {
                let mut rec = self.base(node, kind);
                rec.push_many(
                    "entries",
                    self.convert_many(self.named_children(node), BindingCtx::Read),
                );
                rec
            }
            "pair" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "key", "key", BindingCtx::Read);
                self.single(&mut rec, node, "value", "value", BindingCtx::Read);
                rec
            }
            "list_splat" | "dictionary_splat" => {
                let mut rec = self.base(node, kind);
                if let Some(inner) = self.named_children(node).into_iter().next() {
                    rec.push_single("value", self.convert(inner, ctx));
                }
                rec
            }

            // ---- Names and literals ----
            "identifier" => self.base(node, kind).with_attrs(Attrs::Ident {
                name: self.text(node),
                ctx,
            }),
            "integer" => self.literal(node, "int"),
            "float" => self.literal(node, "float"),
            "true" | "false" => self.literal(node, "bool"),
            "none" => self.literal(node, "NoneType"),
            "ellipsis" => self.literal(node, "ellipsis"),
            "string" => {
                let interpolations = self.children_of_kind(node, "interpolation");
                if interpolations.is_empty() {
                    self.literal(node, "str")
                } else {
                    // f-string: interleave the literal chunks and the
                    // interpolated expressions in document order.
                    let mut rec = self.base(node, kind);
                    let values: Vec<Node> = self
                        .named_children(node)
                        .into_iter()
                        .filter(|k| matches!(k.kind(), "interpolation" | "string_content"))
                        .collect();
                    rec.push_many("values", self.convert_many(values, BindingCtx::Read));
                    rec
                }
            }
            "string_content" => self.literal(node, "str"),
            "interpolation" => {
                let mut rec = self.base(node, kind);
                self.single(&mut rec, node, "expression", "expression", BindingCtx::Read);
                rec
            }

            // ---- Fallback ----
            // No dedicated rule: keep the span and recover the structural
            // fields generically so nothing is ever dropped.
            _ => self.convert_generic(node),
        }
    }

    fn literal(&self, node: Node, type_tag: &'static str) -> NodeRecord {
        self.base(node, node.kind()).with_attrs(Attrs::Literal {
            value: self.text(node),
            type_tag,
        })
    }

    /// Generic conversion for kinds without a dedicated rule: named fields
    /// are kept under their grammar names (in first-appearance order),
    /// remaining named children land in one `children` list.
    fn convert_generic(&self, node: Node) -> NodeRecord {
        let mut rec = self.base(node, node.kind());
        let mut groups: Vec<(String, Vec<Node>)> = Vec::new();
        let mut rest: Vec<Node> = Vec::new();

        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() && child.kind() != "comment" {
                    match cursor.field_name() {
                        Some(field) => match groups.iter_mut().find(|(name, _)| name == field) {
                            Some((_, nodes)) => nodes.push(child),
                            None => groups.push((field.to_string(), vec![child])),
                        },
                        None => rest.push(child),
                    }
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        for (name, nodes) in groups {
            if nodes.len() == 1 {
                rec.push_single(name, self.convert(nodes[0], BindingCtx::Read));
            } else {
                rec.push_many(name, self.convert_many(nodes, BindingCtx::Read));
            }
        }
        if !rest.is_empty() {
            rec.push_many("children", self.convert_many(rest, BindingCtx::Read));
        }
        rec
    }
}

//--------------------
// OPERATOR SYMBOL MAP
//--------------------

fn binary_op_symbol(op: &str) -> Option<&'static str> {
    Some(match op {
        "+" => "add",
        "-" => "sub",
        "*" => "mult",
        "/" => "div",
        "//" => "floordiv",
        "%" => "mod",
        "**" => "pow",
        "<<" => "lshift",
        ">>" => "rshift",
        "|" => "bitor",
        "^" => "bitxor",
        "&" => "bitand",
        "@" => "matmult",
        _ => return None,
    })
}

fn unary_op_symbol(op: &str) -> Option<&'static str> {
    Some(match op {
        "+" => "uadd",
        "-" => "usub",
        "~" => "invert",
        "not" => "not",
        _ => return None,
    })
}

fn comparison_op_symbol(op: &str) -> Option<&'static str> {
    Some(match op {
        "==" => "eq",
        "!=" | "<>" => "noteq",
        "<" => "lt",
        "<=" => "lte",
        ">" => "gt",
        ">=" => "gte",
        "in" => "in",
        "not in" => "notin",
        "is" => "is",
        "is not" => "isnot",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::FieldChildren;

    fn child<'r>(rec: &'r NodeRecord, field: &str) -> &'r NodeRecord {
        match &rec.field(field).expect("missing field").children {
            FieldChildren::Single(c) => c,
            FieldChildren::Many(cs) => &cs[0],
        }
    }

    #[test]
    fn test_module_root() {
        let rec = normalize("x = 1").unwrap();
        assert_eq!(rec.kind, "module");
        assert_eq!(rec.field("body").unwrap().iter().count(), 1);
    }

    #[test]
    fn test_empty_module_keeps_body_field() {
        let rec = normalize("").unwrap();
        assert_eq!(rec.kind, "module");
        let body = rec.field("body").unwrap();
        assert_eq!(body.iter().count(), 0);
        assert!(matches!(&body.children, FieldChildren::Many(v) if v.is_empty()));
    }

    #[test]
    fn test_function_definition() {
        let rec = normalize("def add(a):\n    return a + 1\n").unwrap();
        let func = child(&rec, "body");
        assert_eq!(func.kind, "function_definition");
        assert_eq!(
            func.attrs,
            Attrs::Name {
                name: "add".to_string()
            }
        );

        let params = child(func, "parameters");
        assert_eq!(params.kind, "parameters");
        let param = child(params, "params");
        assert_eq!(
            param.attrs,
            Attrs::Ident {
                name: "a".to_string(),
                ctx: BindingCtx::Param
            }
        );

        let ret = child(child(func, "body"), "body");
        assert_eq!(ret.kind, "return_statement");
        let binop = child(ret, "value");
        assert_eq!(binop.kind, "binary_operator");
        assert_eq!(
            binop.attrs,
            Attrs::Op {
                op: "add".to_string()
            }
        );
        assert_eq!(
            child(binop, "left").attrs,
            Attrs::Ident {
                name: "a".to_string(),
                ctx: BindingCtx::Read
            }
        );
        assert_eq!(
            child(binop, "right").attrs,
            Attrs::Literal {
                value: "1".to_string(),
                type_tag: "int"
            }
        );
    }

    #[test]
    fn test_async_function_gets_its_own_kind() {
        let rec = normalize("async def fetch():\n    pass\n").unwrap();
        assert_eq!(child(&rec, "body").kind, "async_function_definition");
    }

    #[test]
    fn test_assignment_marks_write_context() {
        let rec = normalize("x = 1").unwrap();
        let stmt = child(&rec, "body");
        let assign = child(stmt, "value");
        assert_eq!(assign.kind, "assignment");
        assert_eq!(
            child(assign, "left").attrs,
            Attrs::Ident {
                name: "x".to_string(),
                ctx: BindingCtx::Write
            }
        );
    }

    #[test]
    fn test_tuple_target_forwards_write_context() {
        let rec = normalize("a, b = 1, 2").unwrap();
        let stmt = child(&rec, "body");
        let assign = child(stmt, "value");
        let left = child(assign, "left");
        for elt in left.field("elts").unwrap().iter() {
            assert!(matches!(
                elt.attrs,
                Attrs::Ident {
                    ctx: BindingCtx::Write,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_delete_marks_delete_context() {
        let rec = normalize("del x").unwrap();
        let del = child(&rec, "body");
        assert_eq!(del.kind, "delete_statement");
        assert_eq!(
            child(del, "targets").attrs,
            Attrs::Ident {
                name: "x".to_string(),
                ctx: BindingCtx::Delete
            }
        );
    }

    #[test]
    fn test_comparison_chain_symbols() {
        let rec = normalize("a < b >= c").unwrap();
        let stmt = child(&rec, "body");
        let cmp = child(stmt, "value");
        assert_eq!(cmp.kind, "comparison_operator");
        assert_eq!(
            cmp.attrs,
            Attrs::Ops {
                ops: vec!["lt".to_string(), "gte".to_string()]
            }
        );
        assert_eq!(cmp.field("operands").unwrap().iter().count(), 3);
    }

    #[test]
    fn test_literal_type_tags() {
        let rec = normalize("x = None").unwrap();
        let stmt = child(&rec, "body");
        let assign = child(stmt, "value");
        assert_eq!(
            child(assign, "right").attrs,
            Attrs::Literal {
                value: "None".to_string(),
                type_tag: "NoneType"
            }
        );
    }

    #[test]
    fn test_fstring_keeps_interpolations() {
        let rec = normalize("x = f'hi {name}'").unwrap();
        let stmt = child(&rec, "body");
        let assign = child(stmt, "value");
        let string = child(assign, "right");
        assert_eq!(string.kind, "string");
        let kinds: Vec<&str> = string
            .field("values")
            .unwrap()
            .iter()
            .map(|v| v.kind.as_str())
            .collect();
        assert!(kinds.contains(&"interpolation"));
    }

    #[test]
    fn test_generic_fallback_recovers_fields() {
        let rec = normalize("match x:\n    case 1:\n        pass\n").unwrap();
        let stmt = child(&rec, "body");
        assert_eq!(stmt.kind, "match_statement");
        // No dedicated rule, but the subject and the case blocks survive.
        assert!(!stmt.fields.is_empty());
        assert!(stmt.span.is_some());
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = normalize("(1 + 2\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SyntaxError"), "got: {}", msg);
        assert!(msg.contains("line"), "got: {}", msg);
    }

    #[test]
    fn test_spans_are_one_based_lines() {
        let rec = normalize("x = 1\ny = 2\n").unwrap();
        let second = match &rec.field("body").unwrap().children {
            FieldChildren::Many(stmts) => &stmts[1],
            _ => unreachable!(),
        };
        assert_eq!(second.span.unwrap().start_line, 2);
    }
}
