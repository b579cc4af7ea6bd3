//! # ondeck
//!
//! Structured extraction from LaTeX paper sources.
//!
//! Given the raw text of a paper, ondeck recovers its title, authors,
//! abstract, header macros, figures (caption, label, files and how often
//! each is referenced) and section outline. There is no LaTeX grammar or
//! macro expansion: extraction works on balanced-brace groups and command
//! boundaries, and tolerates the inconsistent sources found in practice.
//!
//! ## Example
//!
//! ```rust
//! use ondeck::{DocumentModel, ExtractOptions};
//!
//! let source = r"\documentclass{article}
//! \begin{document}
//! \title{On Decks}
//! \section{Intro}
//! \end{document}";
//! let doc = DocumentModel::from_source(source, &ExtractOptions::default()).unwrap();
//! assert_eq!(doc.title(), "On Decks");
//! assert_eq!(doc.outline(), "Intro\n");
//! ```

pub mod core;
pub mod document;
pub mod utils;

pub use document::DocumentModel;
pub use ondeck_model::{
    Extracted, Figure, FigureCommand, FigureSources, SectionNode, SubfigureEntry,
};
pub use ondeck_render::{render_postage, select_figures, PostageInput, PostageOptions};
pub use utils::config::ExtractOptions;
pub use utils::error::{ExtractError, ExtractResult, Recover};

/// Extract a document model with default options.
pub fn extract(source: &str) -> ExtractResult<DocumentModel> {
    DocumentModel::from_source(source, &ExtractOptions::default())
}
