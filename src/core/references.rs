//! `\ref{label}` counting.

use fxhash::FxHashMap;
use ondeck_model::{Extracted, Figure};

const REF_OPEN: &str = "\\ref{";

/// Number of literal `\ref{label}` occurrences in `text`.
pub fn count_references(text: &str, label: &str) -> usize {
    let needle = format!("{}{}}}", REF_OPEN, label);
    text.matches(needle.as_str()).count()
}

/// Counts of every `\ref{..}` target in a text, built in one scan.
///
/// The key is the exact text between the braces, so lookups behave like
/// [`count_references`].
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    counts: FxHashMap<String, usize>,
}

impl ReferenceIndex {
    pub fn build(text: &str) -> Self {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        let mut from = 0usize;
        while let Some(rel) = text[from..].find(REF_OPEN) {
            let open = from + rel + REF_OPEN.len();
            let Some(close) = text[open..].find('}') else {
                break;
            };
            *counts.entry(text[open..open + close].to_string()).or_insert(0) += 1;
            from = open;
        }
        Self { counts }
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// References to a figure label. A figure without a label has none; a
    /// repeated label is counted through its first value.
    pub fn count_for(&self, label: Option<&Extracted>) -> usize {
        match label {
            None => 0,
            Some(Extracted::Scalar(label)) => self.count(label),
            Some(Extracted::Multiple(labels)) => labels
                .first()
                .map_or(0, |label| self.count(label)),
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Set `reference_count` on every figure from the references in `text`.
pub fn update_reference_counts(figures: &mut [Figure], text: &str) {
    let index = ReferenceIndex::build(text);
    for figure in figures.iter_mut() {
        figure.reference_count = index.count_for(figure.label.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "As shown in Fig.~\\ref{fig:one} and again \\ref{fig:one}, unlike \\ref{fig:two}. See \\eqref{fig:one} and \\ref{fig:one:b}.";

    #[test]
    fn test_count_literal_references() {
        assert_eq!(count_references(TEXT, "fig:one"), 2);
        assert_eq!(count_references(TEXT, "fig:two"), 1);
        assert_eq!(count_references(TEXT, "fig:three"), 0);
    }

    #[test]
    fn test_index_agrees_with_literal_count() {
        let index = ReferenceIndex::build(TEXT);
        for label in ["fig:one", "fig:two", "fig:one:b", "missing"] {
            assert_eq!(index.count(label), count_references(TEXT, label), "{}", label);
        }
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_multiple_labels_use_first() {
        let index = ReferenceIndex::build(TEXT);
        let labels = Extracted::Multiple(vec!["fig:two".into(), "fig:one".into()]);
        assert_eq!(index.count_for(Some(&labels)), 1);
        assert_eq!(index.count_for(None), 0);
    }

    #[test]
    fn test_unlabelled_figure_has_no_references() {
        let mut figures = vec![Figure::empty(1), Figure::empty(2)];
        figures[1].label = Some(Extracted::Scalar("fig:one".into()));
        update_reference_counts(&mut figures, TEXT);
        assert_eq!(figures[0].reference_count, 0);
        assert_eq!(figures[1].reference_count, 2);
    }

    #[test]
    fn test_unclosed_reference_ignored() {
        let index = ReferenceIndex::build("\\ref{a} \\ref{b");
        assert_eq!(index.count("a"), 1);
        assert_eq!(index.count("b"), 0);
    }
}
