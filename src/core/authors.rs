//! Author lists: splitting, the short form used on cover pages, and the
//! co-worker list used for highlighting.

use indexmap::IndexSet;
use lazy_static::lazy_static;
use ondeck_model::Extracted;
use regex::Regex;

use super::command::{command_occurrences, strip_command};

/// Commands attaching affiliations or notes to a name.
const AFFILIATION_COMMANDS: &[&str] = &[
    "inst",
    "thanks",
    "altaffilmark",
    "affil",
    "affiliation",
    "orcidlink",
    "footnote",
    "footnotemark",
    "textsuperscript",
];

lazy_static! {
    static ref FOOTNOTE_MARK: Regex = Regex::new(r"\$\s*\^\s*(?:\{[^}]*\}|[^$\s])\s*\$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

fn clean_author_text(text: &str) -> String {
    let mut cleaned = text.replace("\\\\", " ").replace('~', " ");
    for command in AFFILIATION_COMMANDS {
        cleaned = strip_command(&cleaned, command);
    }
    FOOTNOTE_MARK.replace_all(&cleaned, "").into_owned()
}

/// Split on commas and `\and` outside braces.
fn split_top_level(text: &str) -> Vec<&str> {
    let and_starts: Vec<std::ops::Range<usize>> = command_occurrences(text, "and");
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut idx = 0usize;
    let bytes = text.as_bytes();
    while idx < bytes.len() {
        match bytes[idx] {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            b'\\' if depth == 0 => {
                if let Some(and) = and_starts.iter().find(|range| range.start == idx) {
                    parts.push(&text[start..idx]);
                    start = and.end;
                    idx = and.end;
                    continue;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    parts.push(&text[start..]);
    parts
}

/// Individual author names of a raw `\author` value.
///
/// Affiliation markers and footnote marks are dropped and whitespace is
/// collapsed. Repeated `\author` commands give one entry each, and every
/// entry may itself hold several comma or `\and` separated names.
pub fn author_names(raw: &Extracted) -> Vec<String> {
    raw.values()
        .into_iter()
        .flat_map(|value| {
            let cleaned = clean_author_text(value);
            split_top_level(&cleaned)
                .into_iter()
                .map(|name| WHITESPACE.replace_all(name.trim(), " ").into_owned())
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn highlight(name: &str) -> String {
    format!("\\hl{{{}}}", name)
}

/// Short author form for a cover page.
///
/// With fewer than `limit` names every name is listed. Otherwise only the
/// first author is kept (`First, et al.`), highlighted when one of
/// `highlights` occurs in it, followed by the other highlighted authors.
pub fn short_authors(names: &[String], highlights: &[String], limit: usize) -> String {
    let Some(first) = names.first() else {
        return String::new();
    };
    if names.len() < limit {
        return names.join(", ");
    }

    let mut out = if highlights.iter().any(|name| first.contains(name.as_str())) {
        format!("{}, et al.", highlight(first))
    } else {
        format!("{}, et al.", first)
    };

    let others: IndexSet<&str> = highlights
        .iter()
        .map(String::as_str)
        .filter(|name| *name != first.as_str())
        .collect();
    if !others.is_empty() {
        let listed: Vec<String> = others.into_iter().map(highlight).collect();
        out.push_str("; incl. ");
        out.push_str(&listed.join(", "));
    }
    out
}

fn initials(word: &str) -> String {
    word.split('-')
        .filter_map(|part| part.chars().next())
        .map(|c| format!("{}.", c))
        .collect::<Vec<_>>()
        .join("-")
}

/// Initials form of a full name: "Ivo-Marc van Groot" becomes
/// "I.-M. v. Groot". The family name (last word) is kept whole.
pub fn abbreviate_name(full: &str) -> String {
    let words: Vec<&str> = full.split_whitespace().collect();
    let Some((family, given)) = words.split_last() else {
        return String::new();
    };
    given
        .iter()
        .map(|word| initials(word))
        .chain(std::iter::once(family.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read a co-worker list: one full name per line, `#` starts a comment
/// line. Returns the sorted, deduplicated initials forms.
pub fn parse_author_list(text: &str) -> Vec<String> {
    let mut names: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(abbreviate_name)
        .collect();
    names.sort();
    names.dedup();
    names
}

fn family_name(name: &str) -> Option<&str> {
    name.split_whitespace().last()
}

/// Authors whose family name equals the family name of one of `names`.
///
/// `names` may be bare family names or full/initials forms. Order follows
/// `authors`; duplicates are removed.
pub fn match_highlights(authors: &[String], names: &[String]) -> Vec<String> {
    let families: IndexSet<&str> = names.iter().filter_map(|name| family_name(name)).collect();
    authors
        .iter()
        .filter(|author| family_name(author).is_some_and(|family| families.contains(family)))
        .map(String::as_str)
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
