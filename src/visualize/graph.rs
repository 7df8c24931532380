//! Structs and functions concerned with generating graphs with Graphviz and DOT language.
//!
//! The model captures the content of a drawing: labeled boxes, nested
//! cluster regions, directed edges and the graph-wide defaults. `Display`
//! renders it as DOT text; everything else about the final picture is the
//! renderer's business.

use std::fmt::{self, Display};

/// A complete directed graph description.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: String,
    items: Vec<Item>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new(name: &str, items: Vec<Item>, edges: Vec<Edge>) -> Self {
        Graph {
            name: name.to_string(),
            items,
            edges,
        }
    }

    pub fn as_dot<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(writer, "{}", self)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// All nodes, including those nested inside clusters.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_nodes(&self.items, &mut out);
        out
    }

    /// All cluster regions, including nested ones.
    pub fn clusters(&self) -> Vec<&Cluster> {
        let mut out = Vec::new();
        collect_clusters(&self.items, &mut out);
        out
    }
}

fn collect_nodes<'g>(items: &'g [Item], out: &mut Vec<&'g Node>) {
    for item in items {
        match item {
            Item::Node(node) => out.push(node),
            Item::Cluster(cluster) => collect_nodes(&cluster.items, out),
        }
    }
}

fn collect_clusters<'g>(items: &'g [Item], out: &mut Vec<&'g Cluster>) {
    for item in items {
        if let Item::Cluster(cluster) = item {
            out.push(cluster);
            collect_clusters(&cluster.items, out);
        }
    }
}

impl Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "digraph {} {{", &self.name)?;
        writeln!(f, "\tgraph [rankdir=TB ranksep=0.25 nodesep=0.25 compound=true];")?;
        writeln!(f, "\tnode [shape=box fontname=\"Consolas\" fontsize=10];")?;
        writeln!(f, "\tedge [fontname=\"Consolas\" fontsize=10];")?;
        for item in self.items.iter() {
            write_item(f, item, 1)?;
        }
        for edge in self.edges.iter() {
            writeln!(f, "\t{}", edge)?;
        }
        write!(f, "}}")
    }
}

fn write_item(f: &mut fmt::Formatter, item: &Item, depth: usize) -> fmt::Result {
    let pad = "\t".repeat(depth);
    match item {
        Item::Node(node) => writeln!(f, "{}{}", pad, node),
        Item::Cluster(cluster) => {
            writeln!(f, "{}subgraph {} {{", pad, cluster.id)?;
            writeln!(f, "{}\t{};", pad, cluster.label)?;
            match cluster.style {
                ClusterStyle::Filled => {
                    writeln!(f, "{}\tstyle=filled;", pad)?;
                    if let Some(fill) = cluster.fill {
                        writeln!(f, "{}\tfillcolor=\"{}\";", pad, fill)?;
                    }
                }
                ClusterStyle::Dashed => writeln!(f, "{}\tstyle=dashed;", pad)?,
            }
            for inner in cluster.items.iter() {
                write_item(f, inner, depth + 1)?;
            }
            writeln!(f, "{}}}", pad)
        }
    }
}

/// One entry of a drawing region: either a node or a nested cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Node(Node),
    Cluster(Cluster),
}

/// A node label, either plain quoted text or HTML-like markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Text(String),
    Html(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Text(s) | Label::Html(s) => s,
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Text(s) => write!(f, "label=\"{}\"", escape_text(s)),
            Label::Html(s) => write!(f, "label=<{}>", s),
        }
    }
}

/// What a node is used for; decides its rendered attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// An ordinary labeled, filled box.
    Box,
    /// A small legend swatch.
    Swatch,
    /// An invisible point serving as an edge target inside a cluster.
    Anchor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    label: Option<Label>,
    fill: Option<&'static str>,
    role: Role,
}

impl Node {
    pub fn boxed(id: &str, label: Label, fill: &'static str) -> Self {
        Self {
            id: id.to_string(),
            label: Some(label),
            fill: Some(fill),
            role: Role::Box,
        }
    }

    pub fn swatch(id: &str, label: &str, fill: &'static str) -> Self {
        Self {
            id: id.to_string(),
            label: Some(Label::Text(label.to_string())),
            fill: Some(fill),
            role: Role::Swatch,
        }
    }

    pub fn anchor(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            fill: None,
            role: Role::Anchor,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    pub fn fill(&self) -> Option<&'static str> {
        self.fill
    }

    pub fn is_box(&self) -> bool {
        self.role == Role::Box
    }

    pub fn is_swatch(&self) -> bool {
        self.role == Role::Swatch
    }

    pub fn is_anchor(&self) -> bool {
        self.role == Role::Anchor
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.role {
            Role::Anchor => write!(
                f,
                "{} [shape=point style=invis label=\"\" width=0.001 height=0.001];",
                self.id
            ),
            Role::Box | Role::Swatch => {
                write!(f, "{} [", self.id)?;
                if let Some(ref label) = self.label {
                    write!(f, "{} ", label)?;
                }
                write!(f, "style=filled fillcolor=\"{}\"", self.fill.unwrap_or("white"))?;
                if self.role == Role::Swatch {
                    write!(f, " fontsize=7")?;
                }
                write!(f, "];")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterStyle {
    Filled,
    Dashed,
}

/// A bounded, labeled drawing region that may contain nodes and further
/// clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: String,
    label: Label,
    fill: Option<&'static str>,
    style: ClusterStyle,
    items: Vec<Item>,
}

impl Cluster {
    pub fn new(id: String, label: Label, fill: &'static str, items: Vec<Item>) -> Self {
        Self {
            id,
            label,
            fill: Some(fill),
            style: ClusterStyle::Filled,
            items,
        }
    }

    /// The disconnected legend region: dashed border, no fill.
    pub fn legend(id: String, items: Vec<Item>) -> Self {
        Self {
            id,
            label: Label::Text("legend".to_string()),
            fill: None,
            style: ClusterStyle::Dashed,
            items,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Nodes directly inside this cluster, not counting nested clusters.
    pub fn direct_nodes(&self) -> Vec<&Node> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Node(node) => Some(node),
                Item::Cluster(_) => None,
            })
            .collect()
    }
}

/// A directed edge. `lhead` clips the edge at a cluster boundary so a box
/// can point at a region rather than at a node inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    from: String,
    to: String,
    label: Option<String>,
    lhead: Option<String>,
}

impl Edge {
    pub fn new(from: &str, to: &str, label: Option<&str>) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            label: label.map(str::to_string),
            lhead: None,
        }
    }

    pub fn with_lhead(mut self, lhead: &str) -> Self {
        self.lhead = Some(lhead.to_string());
        self
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn lhead(&self) -> Option<&str> {
        self.lhead.as_deref()
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)?;
        if self.label.is_none() && self.lhead.is_none() {
            return write!(f, ";");
        }
        write!(f, " [")?;
        if let Some(ref label) = self.label {
            write!(f, "label=\"{}\"", escape_text(label))?;
            if self.lhead.is_some() {
                write!(f, " ")?;
            }
        }
        if let Some(ref lhead) = self.lhead {
            write!(f, "lhead=\"{}\"", lhead)?;
        }
        write!(f, "];")
    }
}

/// Escape a string for use inside a double-quoted DOT attribute.
pub(crate) fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a string for use inside an HTML-like label.
pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let empty_graph = Graph::new("empty", Vec::new(), Vec::new());
        let mut buf = String::new();
        empty_graph.as_dot(&mut buf).unwrap();

        assert_eq!(
            buf,
            "digraph empty {\n\
             \tgraph [rankdir=TB ranksep=0.25 nodesep=0.25 compound=true];\n\
             \tnode [shape=box fontname=\"Consolas\" fontsize=10];\n\
             \tedge [fontname=\"Consolas\" fontsize=10];\n\
             }"
        );
    }

    #[test]
    fn test_boxes_and_edges() {
        let items = vec![
            Item::Node(Node::boxed("node_1", Label::Html("<B>call</B>".to_string()), "lightyellow")),
            Item::Node(Node::boxed("node_2", Label::Text("x".to_string()), "lightpink")),
        ];
        let edges = vec![Edge::new("node_1", "node_2", Some("function"))];
        let graph = Graph::new("g", items, edges);

        let dot = graph.to_string();
        assert!(dot.contains("node_1 [label=<<B>call</B>> style=filled fillcolor=\"lightyellow\"];"));
        assert!(dot.contains("node_2 [label=\"x\" style=filled fillcolor=\"lightpink\"];"));
        assert!(dot.contains("node_1 -> node_2 [label=\"function\"];"));
    }

    #[test]
    fn test_nested_clusters() {
        let inner = Cluster::new(
            "cluster_function_definition_2".to_string(),
            Label::Text("function_definition: f".to_string()),
            "#90ee90",
            vec![Item::Node(Node::boxed(
                "node_3",
                Label::Text("pass_statement".to_string()),
                "#90ee90",
            ))],
        );
        let outer = Cluster::new(
            "cluster_module_1".to_string(),
            Label::Text("module".to_string()),
            "lightblue",
            vec![Item::Cluster(inner)],
        );
        let graph = Graph::new("g", vec![Item::Cluster(outer)], Vec::new());

        let dot = graph.to_string();
        assert!(dot.contains("subgraph cluster_module_1 {"));
        assert!(dot.contains("\t\tsubgraph cluster_function_definition_2 {"));
        assert!(dot.contains("fillcolor=\"lightblue\";"));
        assert_eq!(graph.clusters().len(), 2);
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn test_edge_with_lhead() {
        let edge = Edge::new("node_1", "node_4", Some("body")).with_lhead("cluster_for_statement_3");
        assert_eq!(
            edge.to_string(),
            "node_1 -> node_4 [label=\"body\" lhead=\"cluster_for_statement_3\"];"
        );
    }

    #[test]
    fn test_text_escaping() {
        let node = Node::swatch("node_1", "say \"hi\"", "white");
        assert!(node.to_string().contains("label=\"say \\\"hi\\\"\""));
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
    }
}
