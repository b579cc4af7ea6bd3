//! Structured model of a LaTeX paper: figures and the section outline.

use std::fmt;

use serde::Serialize;

/// A value recovered from a command that may legally appear more than once.
///
/// `\label{a}` yields `Scalar("a")`; a block with two `\label` commands
/// yields `Multiple(vec!["a", "b"])`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Extracted {
    Scalar(String),
    Multiple(Vec<String>),
}

impl Extracted {
    /// The scalar value, or the first of several.
    pub fn first(&self) -> Option<&str> {
        match self {
            Extracted::Scalar(value) => Some(value.as_str()),
            Extracted::Multiple(values) => values.first().map(String::as_str),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            Extracted::Scalar(value) => vec![value.as_str()],
            Extracted::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    pub fn joined(&self, separator: &str) -> String {
        match self {
            Extracted::Scalar(value) => value.clone(),
            Extracted::Multiple(values) => values.join(separator),
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Extracted::Multiple(_))
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Extracted::Scalar(value) => vec![value],
            Extracted::Multiple(values) => values,
        }
    }
}

impl From<String> for Extracted {
    fn from(value: String) -> Self {
        Extracted::Scalar(value)
    }
}

impl From<Vec<String>> for Extracted {
    fn from(values: Vec<String>) -> Self {
        Extracted::Multiple(values)
    }
}

/// The single-argument commands a figure block is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureCommand {
    Caption,
    Label,
    IncludeGraphics,
    PlotOne,
    Fig,
}

impl FigureCommand {
    /// Search order inside a figure or subfigure block.
    pub const ALL: [FigureCommand; 5] = [
        FigureCommand::Caption,
        FigureCommand::Label,
        FigureCommand::IncludeGraphics,
        FigureCommand::PlotOne,
        FigureCommand::Fig,
    ];

    /// Command name without the leading backslash.
    pub fn name(self) -> &'static str {
        match self {
            FigureCommand::Caption => "caption",
            FigureCommand::Label => "label",
            FigureCommand::IncludeGraphics => "includegraphics",
            FigureCommand::PlotOne => "plotone",
            FigureCommand::Fig => "fig",
        }
    }

    /// Whether the argument of this command names a graphics file.
    pub fn names_file(self) -> bool {
        matches!(
            self,
            FigureCommand::IncludeGraphics | FigureCommand::PlotOne | FigureCommand::Fig
        )
    }
}

impl fmt::Display for FigureCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\{}", self.name())
    }
}

/// One match found inside a `subfigure` sub-block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubfigureEntry {
    pub command: FigureCommand,
    pub value: String,
}

impl SubfigureEntry {
    pub fn new(command: FigureCommand, value: impl Into<String>) -> Self {
        Self {
            command,
            value: value.into(),
        }
    }
}

/// Raw per-command results for the file-bearing figure idioms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FigureSources {
    pub includegraphics: Option<Extracted>,
    pub plotone: Option<Extracted>,
    pub fig: Option<Extracted>,
    pub plottwo: Option<Vec<String>>,
    pub subfigures: Option<Vec<SubfigureEntry>>,
}

impl FigureSources {
    pub fn is_empty(&self) -> bool {
        self.includegraphics.is_none()
            && self.plotone.is_none()
            && self.fig.is_none()
            && self.plottwo.is_none()
            && self.subfigures.is_none()
    }
}

/// A figure environment recovered from the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Figure {
    /// 1-based position in the body.
    pub ordinal: usize,
    pub caption: Option<Extracted>,
    pub label: Option<Extracted>,
    pub files: Vec<String>,
    pub reference_count: usize,
    pub sources: FigureSources,
}

impl Figure {
    /// A figure whose extraction failed: every field absent.
    pub fn empty(ordinal: usize) -> Self {
        Self {
            ordinal,
            caption: None,
            label: None,
            files: Vec::new(),
            reference_count: 0,
            sources: FigureSources::default(),
        }
    }

    /// Caption text; several captions are joined with a space.
    pub fn caption_text(&self) -> Option<String> {
        self.caption.as_ref().map(|caption| caption.joined(" "))
    }

    /// The label references are counted against.
    pub fn primary_label(&self) -> Option<&str> {
        self.label.as_ref().and_then(Extracted::first)
    }

    /// Entries of `files` that name graphics. Subfigure captions and labels
    /// are listed in `files` but are left out here.
    pub fn graphic_files(&self) -> Vec<&str> {
        match &self.sources.subfigures {
            Some(entries) => entries
                .iter()
                .filter(|entry| entry.command.names_file())
                .map(|entry| entry.value.as_str())
                .collect(),
            None => self.files.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Figure {} ({})",
            self.ordinal,
            self.primary_label().unwrap_or("")
        )?;
        writeln!(f, "    {}", self.caption_text().unwrap_or_default())?;
        write!(f, "    File(s): {}", self.files.join(","))
    }
}

/// Title used for the synthetic node opening the appendix region.
pub const APPENDIX_TITLE: &str = "Appendix";

/// One node of the section outline.
///
/// Levels are 0 (section), 1 (subsection) and 2 (subsubsection), shifted by
/// one for headings inside the appendix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionNode {
    pub level: u8,
    pub title: String,
    pub children: Vec<SectionNode>,
}

impl SectionNode {
    pub fn new(level: u8, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            children: Vec::new(),
        }
    }

    pub fn appendix() -> Self {
        Self::new(0, APPENDIX_TITLE)
    }

    pub fn with_children(mut self, children: Vec<SectionNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SectionNode::node_count)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracted_first_prefers_scalar() {
        assert_eq!(Extracted::Scalar("a".into()).first(), Some("a"));
        let multi = Extracted::Multiple(vec!["b".into(), "c".into()]);
        assert_eq!(multi.first(), Some("b"));
        assert_eq!(multi.joined(" "), "b c");
        assert!(Extracted::Multiple(Vec::new()).first().is_none());
    }

    #[test]
    fn empty_figure_has_no_fields() {
        let fig = Figure::empty(3);
        assert_eq!(fig.ordinal, 3);
        assert!(fig.caption.is_none() && fig.label.is_none());
        assert!(fig.files.is_empty());
        assert!(fig.sources.is_empty());
    }

    #[test]
    fn figure_display_lists_files() {
        let mut fig = Figure::empty(1);
        fig.label = Some(Extracted::Scalar("fig:a".into()));
        fig.caption = Some(Extracted::Scalar("A plot".into()));
        fig.files = vec!["a.pdf".into(), "b.pdf".into()];
        let text = fig.to_string();
        assert!(text.starts_with("Figure 1 (fig:a)"));
        assert!(text.contains("File(s): a.pdf,b.pdf"));
    }

    #[test]
    fn graphic_files_skip_subfigure_text() {
        let mut fig = Figure::empty(2);
        fig.sources.subfigures = Some(vec![
            SubfigureEntry::new(FigureCommand::Caption, "Left"),
            SubfigureEntry::new(FigureCommand::IncludeGraphics, "left.pdf"),
            SubfigureEntry::new(FigureCommand::Label, "fig:right"),
            SubfigureEntry::new(FigureCommand::PlotOne, "right.eps"),
        ]);
        fig.files = vec![
            "Left".into(),
            "left.pdf".into(),
            "fig:right".into(),
            "right.eps".into(),
        ];
        assert_eq!(fig.graphic_files(), vec!["left.pdf", "right.eps"]);

        let mut plain = Figure::empty(1);
        plain.files = vec!["a.png".into()];
        assert_eq!(plain.graphic_files(), vec!["a.png"]);
    }

    #[test]
    fn section_node_count_covers_subtree() {
        let node = SectionNode::new(0, "Intro").with_children(vec![
            SectionNode::new(1, "A").with_children(vec![SectionNode::new(2, "a")]),
            SectionNode::new(1, "B"),
        ]);
        assert_eq!(node.node_count(), 4);
    }
}
