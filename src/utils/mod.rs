//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Configuration loading
//! - Source resolution for multi-file papers

pub mod config;
pub mod error;
pub mod files;

// Re-export commonly used items
pub use self::config::{config_loader, load_config, ExtractOptions, Loader, OndeckConfig};
pub use error::{ExtractError, ExtractResult, Recover};
pub use files::{
    expand_inputs, load_document, select_main_document, FsSourceResolver, MemorySourceResolver,
    SourceFile, SourceResolver,
};
