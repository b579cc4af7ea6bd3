//! Configuration
//!
//! [`ExtractOptions`] is what the library needs. [`OndeckConfig`] is the
//! whole file-backed configuration used by the binary: the embedded
//! `defaults/ondeck.default.toml`, with a user file and command-line
//! overrides layered over it key by key.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use ondeck_render::PostageOptions;
use serde::Deserialize;

use super::error::{ExtractError, ExtractResult};
use crate::core::authors::parse_author_list;

const DEFAULT_TOML: &str = include_str!("../../defaults/ondeck.default.toml");

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "ONDECK_CONFIG";

/// Options threaded through document extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Return errors for unreadable optional fields (authors, abstract) and
    /// figures instead of logging and dropping them.
    /// Default: false
    pub strict: bool,

    /// Author count from which the short form is `First, et al.`
    /// Default: 5
    pub short_author_limit: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strict: false,
            short_author_limit: 5,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first unreadable field.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OndeckConfig {
    pub extract: ExtractConfig,
    pub render: RenderConfig,
    pub authors: AuthorsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractConfig {
    pub strict: bool,
    pub short_author_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderConfig {
    pub figure_limit: usize,
    pub include_macros: bool,
    /// Cover page template replacing the built-in one.
    #[serde(default)]
    pub template: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorsConfig {
    pub highlight: Vec<String>,
    /// Co-worker list, one full name per line.
    #[serde(default)]
    pub list: Option<PathBuf>,
}

impl OndeckConfig {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            strict: self.extract.strict,
            short_author_limit: self.extract.short_author_limit,
        }
    }

    /// Render options, reading the template file when one is configured.
    pub fn postage_options(&self) -> ExtractResult<PostageOptions> {
        let template = match &self.render.template {
            Some(path) => Some(read_file(path)?),
            None => None,
        };
        Ok(PostageOptions {
            figure_limit: self.render.figure_limit,
            include_macros: self.render.include_macros,
            template,
        })
    }

    /// Configured highlight names followed by the co-worker list entries.
    pub fn highlight_names(&self) -> ExtractResult<Vec<String>> {
        let mut names = self.authors.highlight.clone();
        if let Some(path) = &self.authors.list {
            names.extend(parse_author_list(&read_file(path)?));
        }
        Ok(names)
    }
}

fn read_file(path: &Path) -> ExtractResult<String> {
    std::fs::read_to_string(path)
        .map_err(|err| ExtractError::io(format!("{}: {}", path.display(), err)))
}

fn config_error(err: ConfigError) -> ExtractError {
    ExtractError::config(err.to_string())
}

/// Layers configuration sources over the embedded defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start from the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer TOML text. Syntax errors surface from [`Loader::build`].
    pub fn with_str(mut self, text: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(text, FileFormat::Toml));
        self
    }

    /// Layer a configuration file. A missing file is an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> ExtractResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExtractError::io(format!(
                "{}: configuration file not found",
                path.display()
            )));
        }
        let source = File::from(path).format(FileFormat::Toml).required(true);
        self.builder = self.builder.add_source(source);
        Ok(self)
    }

    /// Apply a single key/value override, e.g. a command-line flag.
    pub fn set_override<I>(mut self, key: &str, value: I) -> ExtractResult<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(config_error)?;
        Ok(self)
    }

    pub fn build(self) -> ExtractResult<OndeckConfig> {
        self.builder
            .build()
            .and_then(|config| config.try_deserialize::<OndeckConfig>())
            .map_err(config_error)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Defaults only.
pub fn load_defaults() -> ExtractResult<OndeckConfig> {
    Loader::new().build()
}

/// Defaults layered with `explicit`, or with the file named by
/// `ONDECK_CONFIG` when no explicit path is given.
pub fn config_loader(explicit: Option<&Path>) -> ExtractResult<Loader> {
    let loader = Loader::new();
    match explicit {
        Some(path) => loader.with_file(path),
        None => match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => loader.with_file(PathBuf::from(path)),
            _ => Ok(loader),
        },
    }
}

pub fn load_config(explicit: Option<&Path>) -> ExtractResult<OndeckConfig> {
    config_loader(explicit)?.build()
}
