//! Header macro harvesting.
//!
//! Macros are copied out of the source header so a rendered page can use
//! the document's own shorthands. `\newcommand`-family declarations are
//! rewritten to `\providecommand` so they never clash with a template.
//! `\def`, `\gdef` and `\graphicspath` statements are kept verbatim.
//! Definitions that do not close on their own line are dropped. Several
//! declarations sharing a line are each cut at the end of their own body.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use super::command::skip_options;
use super::tokenizer::{brace_groups, is_balanced};

lazy_static! {
    static ref NEWCOMMAND: Regex =
        Regex::new(r"\\(?:new|renew|provide)command(\*?)").unwrap();
    static ref DEFINITION: Regex = Regex::new(r"\\(?:g?def|graphicspath)").unwrap();
}

/// Macro declarations found in a header, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMacros {
    /// `\providecommand` rewrites of command declarations.
    pub commands: Vec<String>,
    /// Raw `\def` / `\gdef` / `\graphicspath` lines.
    pub definitions: Vec<String>,
}

impl HeaderMacros {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.definitions.is_empty()
    }

    /// Newline-joined block: commands first, then definitions.
    pub fn to_block(&self) -> String {
        self.commands
            .iter()
            .chain(self.definitions.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |nl| from + nl)
}

fn followed_by_letter(text: &str, end: usize) -> bool {
    text.as_bytes()
        .get(end)
        .is_some_and(|b| b.is_ascii_alphabetic())
}

/// Length of the macro name at the start of `text`: a braced `{\name}` or
/// a bare `\name`.
fn macro_name_len(text: &str) -> Option<usize> {
    if text.starts_with('{') {
        let mut groups = brace_groups(text);
        return groups.next().map(|_| groups.consumed());
    }
    let name = text.strip_prefix('\\')?;
    let letters = name
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic() || *b == b'@')
        .count();
    match letters {
        0 => name.chars().next().map(|c| 1 + c.len_utf8()),
        n => Some(1 + n),
    }
}

/// Length of one declaration (`{\name}[n][default]{body}`) at the start of
/// `text`, or `None` when its body does not close within `text`.
fn declaration_len(text: &str) -> Option<usize> {
    let name_len = macro_name_len(text)?;
    let after_name = &text[name_len..];
    let body = skip_options(after_name);
    if !body.starts_with('{') {
        return None;
    }
    let mut groups = brace_groups(body);
    groups.next()?;
    Some(name_len + (after_name.len() - body.len()) + groups.consumed())
}

fn collect_commands(header: &str) -> Vec<String> {
    let mut commands = Vec::new();
    let mut from = 0usize;
    while let Some(caps) = NEWCOMMAND.captures_at(header, from) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        from = whole.end.max(from + 1);
        if followed_by_letter(header, whole.end) {
            continue;
        }
        let eol = line_end(header, whole.end);
        let rest = &header[whole.end..eol];
        let trimmed = rest.trim_start();
        let Some(len) = declaration_len(trimmed) else {
            continue;
        };
        let star = caps.get(1).map_or("", |m| m.as_str());
        commands.push(format!("\\providecommand{}{}", star, &trimmed[..len]));
        from = whole.end + (rest.len() - trimmed.len()) + len;
    }
    commands
}

fn collect_definitions(header: &str) -> Vec<String> {
    let mut definitions = Vec::new();
    let mut from = 0usize;
    while let Some(found) = DEFINITION.find_at(header, from) {
        from = found.end();
        if followed_by_letter(header, found.end()) {
            continue;
        }
        let eol = line_end(header, found.start());
        let statement = header[found.start()..eol].trim_end();
        if is_balanced(statement) {
            definitions.push(statement.to_string());
        }
        from = eol;
    }
    definitions
}

/// Collect the macro declarations of `header`.
pub fn collect_header_macros(header: &str) -> HeaderMacros {
    let macros = HeaderMacros {
        commands: collect_commands(header),
        definitions: collect_definitions(header),
    };
    debug!(
        "found {} command declaration(s) and {} definition(s) in the header",
        macros.commands.len(),
        macros.definitions.len()
    );
    macros
}

/// Macro block for `header`: every declaration on its own line.
pub fn harvest_macros(header: &str) -> String {
    collect_header_macros(header).to_block()
}
