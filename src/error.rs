//! Error types surfaced by the normalizer and the CLI.

/// Everything that can go wrong before a graph exists. Once a tree has been
/// normalized successfully, layout cannot fail anymore.
#[derive(Debug, thiserror::Error)]
pub enum AstVizError {
    /// The grammar rejected the input. Carries the position of the first
    /// offending node so the message reads like the host language's own
    /// parser output.
    #[error("SyntaxError: {msg} at line {line}, column {column}")]
    SyntaxError { line: u32, column: u32, msg: String },

    /// The grammar itself could not be loaded into the parser. This is a
    /// build/version problem, not an input problem.
    #[error("grammar error: {msg}")]
    Grammar { msg: String },
}
