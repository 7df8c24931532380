//! Functionality concerned with visualizing a normalized syntax tree with
//! the help of Graphviz and the DOT DSL.
//!
//! The layout engine walks a node record and classifies every kind one of
//! three ways:
//! 1. transparent wrapper kinds contribute nothing and hand their fields to
//!    the enclosing drawing context,
//! 2. scope-forming kinds open a bounded cluster region that contains
//!    everything below them,
//! 3. everything else becomes one labeled, filled box with edges to its
//!    children, labeled by field name.
//!
//! A legend of the registry's categories is appended to every graph as a
//! disconnected region.

use std::collections::BTreeSet;

use phf::phf_set;

use crate::frontend::ast::{Attrs, NodeRecord};
use self::graph::{escape_html, Cluster, Edge, Graph, Item, Label, Node};

pub mod graph;
pub mod palette;

/// Purely structural wrapper kinds. They carry no visual identity of their
/// own; their fields are reattached to the parent's drawing context,
/// removing one level of nesting without losing field names.
static FLATTEN_KINDS: phf::Set<&'static str> = phf_set! {
    "parameters",
    "argument_list",
    "expression_statement",
    "block",
    "decorated_definition",
    "with_clause",
    "parenthesized_expression",
};

/// Scope- and block-forming kinds that open a cluster region.
static CLUSTER_KINDS: phf::Set<&'static str> = phf_set! {
    "module",
    "function_definition",
    "async_function_definition",
    "class_definition",
    "for_statement",
    "while_statement",
    "with_statement",
    "try_statement",
    "except_clause",
};

/// Advisory sink for kinds that have no registered visual encoding. Each
/// kind is reported once per sink; the sink is owned by the visualizer, so
/// tests can hand in their own and inspect it afterwards.
#[derive(Debug, Default)]
pub struct Diagnostics {
    seen: BTreeSet<String>,
}

impl Diagnostics {
    pub fn unknown_kind(&mut self, kind: &str) {
        if self.seen.insert(kind.to_string()) {
            tracing::warn!(kind = %kind, "no visual encoding registered for node kind");
        }
    }

    pub fn unknown_kinds(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }
}

/// Where a node attaches while walking the tree.
#[derive(Clone, Copy)]
enum Attach<'a> {
    /// The root record; nothing to connect to.
    Root,
    /// Directly inside a cluster region; containment replaces the edge.
    Cluster,
    /// Below a plain box with the given identifier; an edge is drawn.
    Box(&'a str),
}

/// Walks node records and produces graph descriptions.
///
/// Identifier assignment is a plain counter that restarts with every
/// `layout` call, so separate calls are fully independent and a given tree
/// always produces the same identifiers.
pub struct Visualizer {
    graph_name: String,
    node_counter: u32,
    edges: Vec<Edge>,
    diagnostics: Diagnostics,
}

impl Visualizer {
    pub fn new(graph_name: &str) -> Self {
        Self::with_diagnostics(graph_name, Diagnostics::default())
    }

    pub fn with_diagnostics(graph_name: &str, diagnostics: Diagnostics) -> Self {
        Self {
            graph_name: graph_name.to_string(),
            node_counter: 0,
            edges: Vec::new(),
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Produce the graph description for one normalized tree. Never fails:
    /// unrecognized kinds render as generically labeled white boxes.
    pub fn layout(&mut self, root: &NodeRecord) -> Graph {
        self.node_counter = 0;
        self.edges.clear();
        let mut items = Vec::new();
        self.walk(root, &mut items, Attach::Root, None);
        self.add_legend(&mut items);
        Graph::new(&self.graph_name, items, std::mem::take(&mut self.edges))
    }

    fn next_id(&mut self) -> u32 {
        self.node_counter += 1;
        self.node_counter
    }

    fn walk(
        &mut self,
        record: &NodeRecord,
        items: &mut Vec<Item>,
        attach: Attach,
        label: Option<&str>,
    ) {
        let kind = record.kind.as_str();

        if FLATTEN_KINDS.contains(kind) {
            for field in &record.fields {
                for child in field.iter() {
                    self.walk(child, items, attach, Some(field.name.as_str()));
                }
            }
            return;
        }

        if CLUSTER_KINDS.contains(kind) {
            let cluster_id = format!("cluster_{}_{}", kind, self.next_id());
            let mut inner = Vec::new();
            if let Attach::Box(parent_id) = attach {
                // An explicit edge only when the enclosing context is a
                // plain box. A cluster nested in a cluster is connected by
                // containment alone.
                let anchor_id = format!("node_{}", self.next_id());
                self.edges
                    .push(Edge::new(parent_id, &anchor_id, label).with_lhead(&cluster_id));
                inner.push(Item::Node(Node::anchor(&anchor_id)));
            }
            for field in &record.fields {
                for child in field.iter() {
                    self.walk(child, &mut inner, Attach::Cluster, Some(field.name.as_str()));
                }
            }
            let fill = self.color_for(kind);
            items.push(Item::Cluster(Cluster::new(
                cluster_id,
                cluster_label(record),
                fill,
                inner,
            )));
            return;
        }

        let id = format!("node_{}", self.next_id());
        let fill = self.color_for(kind);
        items.push(Item::Node(Node::boxed(&id, box_label(record), fill)));
        if let Attach::Box(parent_id) = attach {
            self.edges.push(Edge::new(parent_id, &id, label));
        }
        for field in &record.fields {
            for child in field.iter() {
                self.walk(child, items, Attach::Box(&id), Some(field.name.as_str()));
            }
        }
    }

    fn color_for(&mut self, kind: &str) -> &'static str {
        if !palette::is_known(kind) {
            self.diagnostics.unknown_kind(kind);
        }
        palette::color_of(kind)
    }

    fn add_legend(&mut self, items: &mut Vec<Item>) {
        let cluster_id = format!("cluster_legend_{}", self.next_id());
        let mut inner = Vec::new();
        for (label, kind) in palette::LEGEND.iter() {
            let id = format!("node_{}", self.next_id());
            inner.push(Item::Node(Node::swatch(&id, label, palette::color_of(kind))));
        }
        items.push(Item::Cluster(Cluster::legend(cluster_id, inner)));
    }
}

//-------
// LABELS
//-------

/// Second label line: start line number, extended with the end line when
/// the node spans more than one line.
fn span_line(record: &NodeRecord) -> Option<String> {
    record.span.map(|span| {
        if span.is_single_line() {
            format!("l#: {}", span.start_line)
        } else {
            format!("l#: {}-{}", span.start_line, span.end_line)
        }
    })
}

/// Inline rendering of a kind's notable scalar attribute, if it has one.
fn attrs_suffix(attrs: &Attrs) -> Option<String> {
    match attrs {
        Attrs::None => None,
        Attrs::Name { name } => Some(format!(": {}", escape_html(name))),
        Attrs::Ident { name, ctx } => {
            let mut s = format!(": {}", escape_html(name));
            if !ctx.is_default() {
                s.push_str(&format!(" <FONT POINT-SIZE=\"8\">[{}]</FONT>", ctx));
            }
            Some(s)
        }
        Attrs::Literal { value, .. } => Some(format!(": {}", escape_html(value))),
        Attrs::Op { op } => Some(format!(": {}", escape_html(op))),
        Attrs::Ops { ops } => Some(format!(": {}", escape_html(&ops.join(",")))),
    }
}

fn box_label(record: &NodeRecord) -> Label {
    let mut html = format!("<B>{}</B>", escape_html(&record.kind));
    if let Some(suffix) = attrs_suffix(&record.attrs) {
        html.push_str(&suffix);
    }
    if let Some(line) = span_line(record) {
        html.push_str(&format!(
            "<BR/><FONT POINT-SIZE=\"7\" COLOR=\"grey60\">{}</FONT>",
            line
        ));
    }
    Label::Html(html)
}

fn cluster_label(record: &NodeRecord) -> Label {
    let mut html = escape_html(&record.kind);
    if let Attrs::Name { name } = &record.attrs {
        html.push_str(&format!(": {}", escape_html(name)));
    }
    if let Some(line) = span_line(record) {
        html.push_str(&format!(
            "<BR/><FONT POINT-SIZE=\"7\" COLOR=\"grey60\">{}</FONT>",
            line
        ));
    }
    Label::Html(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::NodeRecord;
    use crate::frontend::normalize::normalize;

    fn layout_source(source: &str) -> Graph {
        let record = normalize(source).unwrap();
        Visualizer::new("ast").layout(&record)
    }

    /// Boxes of the main drawing, legend swatches not included.
    fn boxes(graph: &Graph) -> Vec<&graph::Node> {
        graph.nodes().into_iter().filter(|n| n.is_box()).collect()
    }

    fn filled_clusters(graph: &Graph) -> Vec<&Cluster> {
        graph
            .clusters()
            .into_iter()
            .filter(|c| !c.id().starts_with("cluster_legend_"))
            .collect()
    }

    fn box_with_label<'g>(graph: &'g Graph, needle: &str) -> Option<&'g graph::Node> {
        boxes(graph)
            .into_iter()
            .find(|n| n.label().map_or(false, |l| l.as_str().contains(needle)))
    }

    #[test]
    fn test_layout_is_deterministic() {
        let record = normalize("def add(a):\n    return a + 1\n").unwrap();
        let mut viz = Visualizer::new("ast");
        let first = viz.layout(&record);
        let second = viz.layout(&record);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_flatten_kinds_are_transparent() {
        let mut wrapper = NodeRecord::new("argument_list");
        wrapper.push_many(
            "args",
            vec![NodeRecord::new("integer"), NodeRecord::new("integer")],
        );
        let mut with_wrapper = NodeRecord::new("call");
        with_wrapper.push_single("args", wrapper);

        let mut without_wrapper = NodeRecord::new("call");
        without_wrapper.push_many(
            "args",
            vec![NodeRecord::new("integer"), NodeRecord::new("integer")],
        );

        let first = Visualizer::new("ast").layout(&with_wrapper);
        let second = Visualizer::new("ast").layout(&without_wrapper);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_nested_clusters_have_no_connecting_edge() {
        let graph = layout_source("class C:\n    def m(self):\n        pass\n");
        assert!(graph.edges().is_empty());
        // module > class > method
        assert_eq!(filled_clusters(&graph).len(), 3);
    }

    #[test]
    fn test_box_to_cluster_edge_uses_anchor_and_lhead() {
        let graph = layout_source("if x:\n    for i in y:\n        pass\n");
        let to_cluster: Vec<_> = graph
            .edges()
            .iter()
            .filter(|e| e.lhead().is_some())
            .collect();
        assert_eq!(to_cluster.len(), 1);
        let edge = to_cluster[0];
        assert_eq!(edge.label(), Some("body"));
        assert!(edge.lhead().unwrap().starts_with("cluster_for_statement_"));
        // the anchor the edge points at sits inside the for cluster
        let anchors: Vec<_> = graph.nodes().into_iter().filter(|n| n.is_anchor()).collect();
        assert_eq!(anchors.len(), 1);
        assert_eq!(edge.to(), anchors[0].id());
    }

    #[test]
    fn test_absent_fields_draw_nothing() {
        let graph = layout_source("def f():\n    return\n");
        // just the bare return box inside the function cluster
        assert_eq!(boxes(&graph).len(), 1);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_unknown_kind_falls_back_to_generic_box() {
        let mut root = NodeRecord::new("module");
        root.push_many("body", vec![NodeRecord::new("mystery_kind")]);

        let mut viz = Visualizer::new("ast");
        let graph = viz.layout(&root);

        let node = box_with_label(&graph, "mystery_kind").unwrap();
        assert_eq!(node.label().unwrap().as_str(), "<B>mystery_kind</B>");
        assert_eq!(node.fill(), Some("white"));
        let unknown: Vec<&str> = viz.diagnostics().unknown_kinds().collect();
        assert_eq!(unknown, vec!["mystery_kind"]);
    }

    #[test]
    fn test_legend_is_fixed_regardless_of_input() {
        for source in ["", "def f(a, b):\n    return a * b\n"].iter() {
            let graph = layout_source(source);
            let legend = graph
                .clusters()
                .into_iter()
                .find(|c| c.id().starts_with("cluster_legend_"))
                .expect("legend present");
            let swatches = legend.direct_nodes();
            assert_eq!(swatches.len(), palette::LEGEND.len());
            // fixed registry order, resolved colors
            assert_eq!(swatches[0].label().unwrap().as_str(), "module level");
            assert_eq!(swatches[0].fill(), Some("lightblue"));
            assert_eq!(swatches[4].fill(), Some("orange"));
        }
    }

    #[test]
    fn test_scenario_simple_function() {
        let graph = layout_source("def add(a): return a + 1");

        let clusters = filled_clusters(&graph);
        assert_eq!(clusters.len(), 2);
        assert!(clusters[0].label().as_str().starts_with("module"));
        let func = clusters
            .iter()
            .find(|c| c.id().starts_with("cluster_function_definition_"))
            .unwrap();
        assert!(func.label().as_str().contains("function_definition: add"));

        let binop = box_with_label(&graph, "<B>binary_operator</B>: add").unwrap();
        assert!(box_with_label(&graph, "<B>return_statement</B>").is_some());
        assert!(box_with_label(&graph, "<B>integer</B>: 1").is_some());
        // parameter identifier carries its binding context suffix
        assert!(box_with_label(&graph, "[param]").is_some());

        let labels: Vec<_> = graph.edges().iter().filter_map(|e| e.label()).collect();
        assert_eq!(labels, vec!["value", "left", "right"]);
        let left_edges: Vec<_> = graph
            .edges()
            .iter()
            .filter(|e| e.from() == binop.id())
            .collect();
        assert_eq!(left_edges.len(), 2);
    }

    #[test]
    fn test_scenario_empty_module() {
        let graph = layout_source("");
        let clusters = filled_clusters(&graph);
        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].id().starts_with("cluster_module_"));
        assert!(clusters[0].direct_nodes().is_empty());
        assert!(boxes(&graph).is_empty());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_scenario_class_with_two_methods() {
        let graph = layout_source(
            "class Greeter:\n    def hi(self):\n        pass\n\n    def bye(self):\n        pass\n",
        );
        let clusters = filled_clusters(&graph);
        // module, class, both methods
        assert_eq!(clusters.len(), 4);
        let class = clusters
            .iter()
            .find(|c| c.id().starts_with("cluster_class_definition_"))
            .unwrap();
        assert!(class.label().as_str().contains("class_definition: Greeter"));
        let methods: Vec<_> = class
            .items()
            .iter()
            .filter(|i| matches!(i, Item::Cluster(_)))
            .collect();
        assert_eq!(methods.len(), 2);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_identifier_context_suffix_only_when_not_read() {
        let graph = layout_source("x = y\n");
        let write = box_with_label(&graph, "<B>identifier</B>: x").unwrap();
        assert!(write.label().unwrap().as_str().contains("[write]"));
        let read = box_with_label(&graph, "<B>identifier</B>: y").unwrap();
        assert!(!read.label().unwrap().as_str().contains("[read]"));
    }

    #[test]
    fn test_span_line_rendering() {
        let graph = layout_source("x = (1 +\n     2)\n");
        let assign = box_with_label(&graph, "<B>assignment</B>").unwrap();
        assert!(assign.label().unwrap().as_str().contains("l#: 1-2"));
        let x = box_with_label(&graph, "<B>identifier</B>: x").unwrap();
        assert!(x.label().unwrap().as_str().contains("l#: 1"));
    }
}
