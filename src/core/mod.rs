//! Extraction primitives
//!
//! Leaves first: the brace tokenizer and comment stripper, the command
//! argument parsers built on them, then the per-concern extractors.

pub mod authors;
pub mod command;
pub mod comments;
pub mod environment;
pub mod figure;
pub mod macros;
pub mod references;
pub mod structure;
pub mod tokenizer;
