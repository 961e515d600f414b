//! Rewrite engine of a JavaScript compressor.
//!
//! Takes a parsed program ([`ast::Node`]) and returns a semantically
//! equivalent, shorter one: constant folding, boolean shortening, branch and
//! loop simplification, dead code removal, statement fusion and declaration
//! hoisting. Parsing, scope analysis and printing the final output are the
//! caller's business; [`output`] only prints compactly enough to compare
//! candidate rewrites.

pub mod ast;
pub mod compressor;
pub mod error;
pub mod evaluate;
pub mod hoist;
pub mod negate;
pub mod options;
pub mod output;
pub mod predicates;
mod squeeze;
pub mod tighten;
pub mod value;
pub mod warnings;

pub use ast::{Node, NodeKind, Pos, Span};
pub use compressor::Compressor;
pub use error::{CompressError, Result};
pub use options::{CompressOption, CompressOptions};
pub use warnings::{NullSink, TracingSink, Warning, WarningSink};

/// Squeeze `root` once with `options`, reporting warnings to `sink`.
pub fn compress(
    root: Node,
    options: &CompressOptions,
    sink: &mut dyn WarningSink,
) -> Result<Node> {
    Compressor::new(options.clone(), sink).compress(root)
}

/// [`compress`] over the JSON form of a tree.
pub fn compress_json(
    text: &str,
    options: &CompressOptions,
    sink: &mut dyn WarningSink,
) -> Result<String> {
    let root = ast::from_json(text)?;
    let out = compress(root, options, sink)?;
    ast::to_json(&out)
}
