//! Renders the syntax tree of a Python program as a clustered, colored
//! directed graph in the Graphviz DOT language.
//!
//! The pipeline has two stages: the frontend normalizes the grammar's parse
//! tree into generic node records, and the visualize module lays those
//! records out as a graph description with per-kind colors, nested scope
//! clusters and a legend.
//!
//! ### Example
//! ```no_run
//! let dot = astviz::dot_from_source("def f():\n    return 1\n").unwrap();
//! assert!(dot.starts_with("digraph"));
//! ```

pub mod error;
pub mod frontend;
pub mod visualize;

pub use error::AstVizError;

/// Run the whole pipeline: normalize `source` and lay the tree out,
/// returning the DOT text. Fails exactly when the input does not parse.
pub fn dot_from_source(source: &str) -> Result<String, AstVizError> {
    let record = frontend::normalize::normalize(source)?;
    let mut viz = visualize::Visualizer::new("ast");
    Ok(viz.layout(&record).to_string())
}
