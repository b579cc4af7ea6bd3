//! Document split and environment spans.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::error::{ExtractError, ExtractResult};

lazy_static! {
    static ref BEGIN_DOCUMENT: Regex = Regex::new(r"\\begin\s*\{document\}").unwrap();
    static ref END_DOCUMENT: Regex = Regex::new(r"\\end\s*\{document\}").unwrap();
    static ref BEGIN_FIGURE: Regex = Regex::new(r"\\begin\s*\{figure\*?\}").unwrap();
    static ref END_FIGURE: Regex = Regex::new(r"\\end\s*\{figure\*?\}").unwrap();
}

/// Header and body of a LaTeX source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentParts<'a> {
    /// Everything up to and including `\begin{document}`.
    pub header: &'a str,
    /// Text between `\begin{document}` and `\end{document}`.
    pub body: &'a str,
}

pub fn split_document(text: &str) -> ExtractResult<DocumentParts<'_>> {
    let begin = BEGIN_DOCUMENT
        .find(text)
        .ok_or(ExtractError::MissingBody)?;
    let end = END_DOCUMENT
        .find_at(text, begin.end())
        .ok_or(ExtractError::MissingBody)?;
    Ok(DocumentParts {
        header: &text[..begin.end()],
        body: &text[begin.end()..end.start()],
    })
}

/// Pair every begin match with the first end match after it. Pairs do not
/// nest: the next begin is searched after the previous end.
fn paired_spans(text: &str, begin: &Regex, end: &Regex) -> Vec<(Range<usize>, Range<usize>)> {
    let mut spans = Vec::new();
    let mut from = 0usize;
    while let Some(open) = begin.find_at(text, from) {
        let Some(close) = end.find_at(text, open.end()) else {
            break;
        };
        spans.push((open.range(), close.range()));
        from = close.end();
    }
    spans
}

fn environment_regexes(name: &str) -> (Regex, Regex) {
    let escaped = regex::escape(name);
    // An escaped literal name always forms a valid pattern.
    let begin = Regex::new(&format!(r"\\begin\s*\{{{}\}}", escaped)).unwrap();
    let end = Regex::new(&format!(r"\\end\s*\{{{}\}}", escaped)).unwrap();
    (begin, end)
}

/// Byte ranges of the inner text of every `\begin{name}...\end{name}` pair.
pub fn environment_spans(name: &str, text: &str) -> Vec<Range<usize>> {
    let (begin, end) = environment_regexes(name);
    paired_spans(text, &begin, &end)
        .into_iter()
        .map(|(open, close)| open.end..close.start)
        .collect()
}

/// Inner text of every `\begin{name}...\end{name}` pair, in order.
pub fn environment_contents<'a>(name: &str, text: &'a str) -> Vec<&'a str> {
    environment_spans(name, text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Every `figure` / `figure*` environment of `body`, from `\begin` through
/// `\end`. Text sharing a line with the markers stays out of the block.
pub fn figure_blocks(body: &str) -> Vec<&str> {
    paired_spans(body, &BEGIN_FIGURE, &END_FIGURE)
        .into_iter()
        .map(|(open, close)| &body[open.start..close.end])
        .collect()
}
