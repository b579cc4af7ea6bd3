//! Document model
//!
//! [`DocumentModel::from_source`] runs every extractor once over a LaTeX
//! source and keeps the results. Fields known from outside the source
//! (identifier, listing comment, date, highlighted authors) are set
//! afterwards through explicit setters; nothing is re-parsed.

use std::fmt;

use lazy_static::lazy_static;
use log::{debug, warn};
use ondeck_model::{Extracted, Figure, SectionNode};
use ondeck_render::PostageInput;
use regex::Regex;
use serde::Serialize;

use crate::core::authors::{author_names, match_highlights, short_authors};
use crate::core::command::{parse_command, parse_command_contiguous, parse_command_field};
use crate::core::comments::strip_comments;
use crate::core::environment::{environment_contents, split_document};
use crate::core::figure::extract_figures;
use crate::core::macros::harvest_macros;
use crate::core::references::update_reference_counts;
use crate::core::structure::{build_structure, format_outline};
use crate::utils::config::ExtractOptions;
use crate::utils::error::{ExtractError, ExtractResult};

lazy_static! {
    static ref ARXIVER_TAG: Regex = Regex::new(r"%\s*@arxiver\s*\{([^}]*)\}").unwrap();
}

/// Number of argument groups of an A&A structured abstract.
const STRUCTURED_ABSTRACT_PARTS: usize = 5;

/// Structured content of one LaTeX paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    identifier: Option<String>,
    title: String,
    authors: Option<Extracted>,
    author_names: Vec<String>,
    short_authors: String,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    macros: String,
    figures: Vec<Figure>,
    structure: Vec<SectionNode>,
    arxiver_tag: Option<Vec<String>>,
    highlight_authors: Vec<String>,
    comment: Option<String>,
    date: String,
    #[serde(skip)]
    short_author_limit: usize,
}

/// Lenient mode turns a failed optional field into `None`.
fn optional<T>(result: ExtractResult<T>, field: &str, strict: bool) -> ExtractResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if strict => Err(err),
        Err(err) => {
            warn!("{}: {}; leaving it empty", field, err);
            Ok(None)
        }
    }
}

fn drop_blank_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abstract of a paper, trying in order the A&A five-part `\abstract`, a
/// single-argument `\abstract{..}` and `abstract` environments.
pub fn extract_abstract(text: &str, body: &str) -> ExtractResult<String> {
    let raw = parse_command_contiguous("abstract", body, STRUCTURED_ABSTRACT_PARTS)
        .map(|parts| parts.join("\n"))
        .or_else(|_| parse_command("abstract", body))
        .or_else(|_| {
            let contents = environment_contents("abstract", text);
            if contents.is_empty() {
                return Err(ExtractError::not_found("abstract"));
            }
            Ok(contents
                .iter()
                .map(|content| content.trim())
                .collect::<Vec<_>>()
                .join(" "))
        })?;
    Ok(drop_blank_lines(&raw))
}

/// Files listed in an `%@arxiver{a.png, b.png}` comment.
pub fn arxiver_tag(text: &str) -> Option<Vec<String>> {
    let caps = ARXIVER_TAG.captures(text)?;
    let entries: Vec<String> = caps
        .get(1)?
        .as_str()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();
    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

impl DocumentModel {
    /// Extract the model of a complete LaTeX source.
    ///
    /// A missing body or title fails the call. Authors, abstract and
    /// figures degrade to empty values unless `options.strict` is set.
    pub fn from_source(text: &str, options: &ExtractOptions) -> ExtractResult<Self> {
        let stripped = strip_comments(text);
        let parts = split_document(&stripped)?;
        let title = parse_command("title", &stripped)?;

        let authors = optional(
            parse_command_field("author", &stripped),
            "authors",
            options.strict,
        )?;
        let abstract_text = optional(
            extract_abstract(&stripped, parts.body),
            "abstract",
            options.strict,
        )?;

        let mut figures = extract_figures(parts.body, options.strict)?;
        update_reference_counts(&mut figures, &stripped);
        let structure = build_structure(parts.body);

        let names = authors.as_ref().map(author_names).unwrap_or_default();
        let short = short_authors(&names, &[], options.short_author_limit);
        debug!(
            "extracted \"{}\": {} author(s), {} figure(s)",
            title,
            names.len(),
            figures.len()
        );

        Ok(Self {
            identifier: None,
            title,
            authors,
            author_names: names,
            short_authors: short,
            abstract_text,
            macros: harvest_macros(parts.header),
            figures,
            structure,
            arxiver_tag: arxiver_tag(text),
            highlight_authors: Vec::new(),
            comment: None,
            date: String::new(),
            short_author_limit: options.short_author_limit,
        })
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw `\author` value(s).
    pub fn authors(&self) -> Option<&Extracted> {
        self.authors.as_ref()
    }

    pub fn author_names(&self) -> &[String] {
        &self.author_names
    }

    pub fn short_authors(&self) -> &str {
        &self.short_authors
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.abstract_text.as_deref()
    }

    /// Header macro block.
    pub fn macros(&self) -> &str {
        &self.macros
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn structure(&self) -> &[SectionNode] {
        &self.structure
    }

    pub fn arxiver_tag(&self) -> Option<&[String]> {
        self.arxiver_tag.as_deref()
    }

    pub fn highlight_authors(&self) -> &[String] {
        &self.highlight_authors
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn outline(&self) -> String {
        format_outline(&self.structure)
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = Some(identifier.into());
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    /// Replace the author list, e.g. with one known from a listing page
    /// when the source has none.
    pub fn set_authors(&mut self, authors: Extracted) {
        self.author_names = author_names(&authors);
        self.authors = Some(authors);
        self.refresh_short_authors();
    }

    pub fn set_abstract(&mut self, abstract_text: impl Into<String>) {
        self.abstract_text = Some(drop_blank_lines(&abstract_text.into()));
    }

    /// Replace the highlighted authors and recompute the short form.
    pub fn set_highlight_authors(&mut self, highlights: Vec<String>) {
        self.highlight_authors = highlights;
        self.refresh_short_authors();
    }

    /// Highlight the authors whose family name matches one of `names`.
    pub fn highlight_matching(&mut self, names: &[String]) {
        let matched = match_highlights(&self.author_names, names);
        self.set_highlight_authors(matched);
    }

    fn refresh_short_authors(&mut self) {
        self.short_authors = short_authors(
            &self.author_names,
            &self.highlight_authors,
            self.short_author_limit,
        );
    }

    /// View used by the cover page renderer.
    pub fn to_postage_input(&self) -> PostageInput<'_> {
        PostageInput {
            title: &self.title,
            short_authors: &self.short_authors,
            abstract_text: self.abstract_text.as_deref().unwrap_or(""),
            macros: &self.macros,
            identifier: self.identifier.as_deref(),
            date: &self.date,
            comment: self.comment.as_deref().unwrap_or(""),
            figures: &self.figures,
            arxiver_tag: self.arxiver_tag.as_deref(),
        }
    }
}

impl fmt::Display for DocumentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(identifier) = &self.identifier {
            write!(f, "[{}]: ", identifier)?;
        }
        write!(f, "{}\n\t{}", self.title, self.short_authors)
    }
}
