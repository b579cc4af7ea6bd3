//! Command argument parsing
//!
//! Locates `\name` tokens and reads the balanced-brace groups that follow
//! them. A token only matches when the name is not the prefix of a longer
//! command (`\fig` never matches `\figure`) and the backslash is not itself
//! escaped (`\\caption` is a line break followed by text).
//!
//! Arguments are read with the forgiving brace tokenizer over the rest of
//! the text: the first `arity` groups after the command are taken, wherever
//! they are. [`parse_command_contiguous`] is the strict variant that only
//! accepts groups separated by whitespace.

use std::ops::Range;

use log::debug;
use ondeck_model::Extracted;

use super::tokenizer::brace_groups;
use crate::utils::error::{ExtractError, ExtractResult};

/// Command name with any leading backslashes removed, so `"\\fig"` and
/// `"fig"` address the same command.
pub fn command_name(command: &str) -> &str {
    command.trim_start_matches('\\')
}

/// Byte ranges (backslash to end of name) of every `\name` token in `text`.
pub fn command_occurrences(text: &str, command: &str) -> Vec<Range<usize>> {
    let name = command_name(command);
    let mut found = Vec::new();
    if name.is_empty() {
        return found;
    }
    let bytes = text.as_bytes();
    let mut from = 0usize;
    while let Some(rel) = text[from..].find('\\') {
        let start = from + rel;
        let name_start = start + 1;
        from = name_start;
        if !text[name_start..].starts_with(name) {
            continue;
        }
        let end = name_start + name.len();
        if bytes.get(end).is_some_and(|b| b.is_ascii_alphabetic()) {
            continue;
        }
        if is_escaped(bytes, start) {
            continue;
        }
        found.push(start..end);
        from = end;
    }
    found
}

/// The backslash at `idx` is preceded by an odd run of backslashes.
fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    bytes[..idx]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count()
        % 2
        == 1
}

fn find_command(text: &str, name: &str) -> Option<Range<usize>> {
    command_occurrences(text, name).into_iter().next()
}

pub fn count_command(text: &str, command: &str) -> usize {
    command_occurrences(text, command).len()
}

pub fn contains_command(text: &str, command: &str) -> bool {
    find_command(text, command_name(command)).is_some()
}

/// Skip a star and any `[...]` option groups at the start of `text`.
pub fn skip_options(text: &str) -> &str {
    let mut rest = text.trim_start();
    if let Some(stripped) = rest.strip_prefix('*') {
        rest = stripped.trim_start();
    }
    while rest.starts_with('[') {
        match matching_bracket(rest) {
            Some(end) => rest = rest[end + 1..].trim_start(),
            None => break,
        }
    }
    rest
}

/// Index of the `]` closing the `[` at the start of `text`. Brackets inside
/// braces (`trim={0 0 1 1}`) do not count.
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut braces = 0usize;
    for (idx, byte) in text.bytes().enumerate() {
        match byte {
            b'{' => braces += 1,
            b'}' => braces = braces.saturating_sub(1),
            b'[' if braces == 0 => depth += 1,
            b']' if braces == 0 => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn arguments_after(name: &str, rest: &str, arity: usize) -> ExtractResult<Vec<String>> {
    let rest = skip_options(rest);
    let mut groups = brace_groups(rest);
    let args: Vec<String> = groups.by_ref().take(arity).map(str::to_string).collect();
    if args.len() < arity {
        if groups.is_unterminated() {
            return Err(ExtractError::malformed(name));
        }
        return Err(ExtractError::incomplete(name, arity, args.len()));
    }
    Ok(args)
}

/// First argument of the first `\command` in `text`.
pub fn parse_command(command: &str, text: &str) -> ExtractResult<String> {
    let mut args = parse_command_args(command, text, 1)?;
    Ok(args.remove(0))
}

/// First `arity` arguments of the first `\command` in `text`.
pub fn parse_command_args(command: &str, text: &str, arity: usize) -> ExtractResult<Vec<String>> {
    let name = command_name(command);
    let occurrence =
        find_command(text, name).ok_or_else(|| ExtractError::not_found(format!("\\{}", name)))?;
    arguments_after(name, &text[occurrence.end..], arity)
}

/// Like [`parse_command_args`], but every group must directly follow the
/// previous one, only whitespace in between.
pub fn parse_command_contiguous(
    command: &str,
    text: &str,
    arity: usize,
) -> ExtractResult<Vec<String>> {
    let name = command_name(command);
    let occurrence =
        find_command(text, name).ok_or_else(|| ExtractError::not_found(format!("\\{}", name)))?;
    let mut rest = skip_options(&text[occurrence.end..]);
    let mut args = Vec::with_capacity(arity);
    while args.len() < arity {
        let trimmed = rest.trim_start();
        if !trimmed.starts_with('{') {
            break;
        }
        let mut groups = brace_groups(trimmed);
        match groups.next() {
            Some(group) => {
                args.push(group.to_string());
                rest = &trimmed[groups.consumed()..];
            }
            None => return Err(ExtractError::malformed(name)),
        }
    }
    if args.len() < arity {
        return Err(ExtractError::incomplete(name, arity, args.len()));
    }
    Ok(args)
}

/// First argument of every `\command` in `text`, in order.
pub fn parse_command_all(command: &str, text: &str) -> ExtractResult<Vec<String>> {
    parse_command_args_all(command, text, 1)
        .map(|all| all.into_iter().flat_map(|args| args.into_iter().take(1)).collect())
}

/// First `arity` arguments of every `\command` in `text`.
///
/// Each occurrence is parsed on the suffix starting at its backslash, so an
/// occurrence never reads arguments from before itself. Occurrences that
/// cannot be read are skipped; the call fails with `NotFound` only when
/// none of them parses.
pub fn parse_command_args_all(
    command: &str,
    text: &str,
    arity: usize,
) -> ExtractResult<Vec<Vec<String>>> {
    let name = command_name(command);
    let mut parsed = Vec::new();
    for occurrence in command_occurrences(text, name) {
        match parse_command_args(name, &text[occurrence.start..], arity) {
            Ok(args) => parsed.push(args),
            Err(err) if err.is_recoverable() => {
                debug!("skipping \\{} at byte {}: {}", name, occurrence.start, err)
            }
            Err(err) => return Err(err),
        }
    }
    if parsed.is_empty() {
        return Err(ExtractError::not_found(format!("\\{}", name)));
    }
    Ok(parsed)
}

/// A command that may be repeated: `Multiple` when more than one
/// occurrence parses, otherwise `Scalar`.
pub fn parse_command_field(command: &str, text: &str) -> ExtractResult<Extracted> {
    if count_command(text, command) > 1 {
        let mut values = parse_command_all(command, text)?;
        if values.len() == 1 {
            return Ok(Extracted::Scalar(values.remove(0)));
        }
        Ok(Extracted::Multiple(values))
    } else {
        parse_command(command, text).map(Extracted::Scalar)
    }
}

/// Remove every `\command[opt]{arg}` from `input`. A `\command` without a
/// braced argument loses only its name.
pub fn strip_command(input: &str, command: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0usize;
    for occurrence in command_occurrences(input, command) {
        if occurrence.start < last {
            continue;
        }
        out.push_str(&input[last..occurrence.start]);
        last = occurrence.end;

        let after = &input[occurrence.end..];
        let rest = skip_options(after);
        if rest.starts_with('{') {
            let mut groups = brace_groups(rest);
            if groups.next().is_some() {
                last = occurrence.end + (after.len() - rest.len()) + groups.consumed();
            }
        }
    }
    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title() {
        assert_eq!(parse_command("title", "\\title{Hello}").unwrap(), "Hello");
        assert_eq!(parse_command("\\title", "\\title{Hello}").unwrap(), "Hello");
    }

    #[test]
    fn test_missing_command_is_not_found() {
        let err = parse_command("title", "no title here").unwrap_err();
        assert!(matches!(err, ExtractError::NotFound { .. }));
    }

    #[test]
    fn test_prefix_of_longer_command_does_not_match() {
        let text = "\\begin{figure}\\figurename{x}";
        assert!(parse_command("fig", text).is_err());
        let text = "\\captionsetup{font=small}\\caption{Real}";
        assert_eq!(parse_command("caption", text).unwrap(), "Real");
    }

    #[test]
    fn test_escaped_backslash_is_not_a_command() {
        let text = "a\\\\caption text \\caption{Real}";
        assert_eq!(count_command(text, "caption"), 1);
        assert_eq!(parse_command("caption", text).unwrap(), "Real");
    }

    #[test]
    fn test_options_are_skipped() {
        let text = "\\includegraphics[width=0.5\\textwidth]{plot.pdf}";
        assert_eq!(parse_command("includegraphics", text).unwrap(), "plot.pdf");
        let text = "\\includegraphics[trim={1 2 3 4}, clip]{a.png}";
        assert_eq!(parse_command("includegraphics", text).unwrap(), "a.png");
        let text = "\\section*[Short]{Long title}";
        assert_eq!(parse_command("section", text).unwrap(), "Long title");
    }

    #[test]
    fn test_arity_two() {
        let text = "\\plottwo{a.eps}{b.eps}";
        assert_eq!(
            parse_command_args("plottwo", text, 2).unwrap(),
            vec!["a.eps", "b.eps"]
        );
    }

    #[test]
    fn test_arguments_need_not_be_adjacent() {
        let text = "\\caption\n\n{Late}";
        assert_eq!(parse_command("caption", text).unwrap(), "Late");
    }

    #[test]
    fn test_incomplete_and_malformed() {
        let err = parse_command_args("plottwo", "\\plottwo{a.eps}", 2).unwrap_err();
        assert_eq!(err, ExtractError::incomplete("plottwo", 2, 1));
        let err = parse_command("caption", "\\caption{never closed").unwrap_err();
        assert_eq!(err, ExtractError::malformed("caption"));
    }

    #[test]
    fn test_contiguous_requires_adjacent_groups() {
        let text = "\\abstract{a}{b} text {c}";
        assert_eq!(
            parse_command_contiguous("abstract", text, 2).unwrap(),
            vec!["a", "b"]
        );
        assert!(matches!(
            parse_command_contiguous("abstract", text, 3),
            Err(ExtractError::Incomplete { found: 2, .. })
        ));
        assert!(parse_command_args("abstract", text, 3).is_ok());
    }

    #[test]
    fn test_parse_all_occurrences() {
        let text = "\\includegraphics{a.png}\\includegraphics{b.png}";
        assert_eq!(
            parse_command_all("includegraphics", text).unwrap(),
            vec!["a.png", "b.png"]
        );
    }

    #[test]
    fn test_parse_all_missing_is_not_found() {
        assert!(matches!(
            parse_command_all("plotone", "\\includegraphics{a}"),
            Err(ExtractError::NotFound { .. })
        ));
    }

    #[test]
    fn test_parse_all_with_arity() {
        let text = "\\plottwo{a}{b}\n\\plottwo{c}{d}";
        assert_eq!(
            parse_command_args_all("plottwo", text, 2).unwrap(),
            vec![vec!["a", "b"], vec!["c", "d"]]
        );
    }

    #[test]
    fn test_parse_all_skips_unreadable_occurrence() {
        let text = "\\includegraphics{a.png}\n\\includegraphics{b.png\n\\end{figure}";
        assert_eq!(
            parse_command_all("includegraphics", text).unwrap(),
            vec!["a.png"]
        );
        assert_eq!(
            parse_command_field("includegraphics", text).unwrap(),
            Extracted::Scalar("a.png".into())
        );

        let text = "\\plottwo{a}{b}\n\\plottwo{c}";
        assert_eq!(
            parse_command_args_all("plottwo", text, 2).unwrap(),
            vec![vec!["a", "b"]]
        );
    }

    #[test]
    fn test_parse_all_none_readable_is_not_found() {
        assert!(matches!(
            parse_command_all("caption", "\\caption{open \\caption{still open"),
            Err(ExtractError::NotFound { .. })
        ));
    }

    #[test]
    fn test_field_scalar_or_multiple() {
        assert_eq!(
            parse_command_field("label", "\\label{a}").unwrap(),
            Extracted::Scalar("a".into())
        );
        assert_eq!(
            parse_command_field("label", "\\label{a} \\label{b}").unwrap(),
            Extracted::Multiple(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_fig_command_name_normalized() {
        let text = "\\figure{x} \\fig{f1.eps}{0.5}{Caption}";
        assert_eq!(parse_command("\\fig", text).unwrap(), "f1.eps");
        assert_eq!(parse_command_all("fig", text).unwrap(), vec!["f1.eps"]);
    }

    #[test]
    fn test_strip_command() {
        let text = "A. Author\\inst{1,2} and B. Author\\thanks{Fellow}\\inst{3}";
        let stripped = strip_command(&strip_command(text, "inst"), "thanks");
        assert_eq!(stripped, "A. Author and B. Author");
        assert_eq!(strip_command("x\\and y", "and"), "x y");
    }
}
