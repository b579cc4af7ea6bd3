//! Source resolution for multi-file papers
//!
//! A paper usually arrives as a directory of `.tex` files. The resolver
//! abstraction lets the same expansion code run against the file system or
//! an in-memory set of files (tests, archives already unpacked in memory).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};

use super::error::{ExtractError, ExtractResult};
use crate::core::command::{command_occurrences, skip_options};
use crate::core::comments::is_commented;
use crate::core::tokenizer::brace_groups;

/// Nesting limit for `\input` chains.
const MAX_INPUT_DEPTH: usize = 12;

/// Access to the files of one paper.
pub trait SourceResolver {
    /// Read a file, `path` relative to the paper root.
    fn read(&self, path: &Path) -> ExtractResult<String>;

    /// Every top-level `.tex` file, sorted by path.
    fn tex_files(&self) -> ExtractResult<Vec<PathBuf>>;
}

/// Files held in memory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceResolver {
    files: IndexMap<PathBuf, String>,
}

impl MemorySourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files.insert(path.into(), text.into());
    }
}

impl SourceResolver for MemorySourceResolver {
    fn read(&self, path: &Path) -> ExtractResult<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ExtractError::io(format!("{}: no such file", path.display())))
    }

    fn tex_files(&self) -> ExtractResult<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|path| is_tex(path) && path.parent().map_or(true, |p| p.as_os_str().is_empty()))
            .cloned()
            .collect();
        paths.sort();
        Ok(paths)
    }
}

/// Files under a base directory.
#[derive(Debug, Clone)]
pub struct FsSourceResolver {
    base: PathBuf,
}

impl FsSourceResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl SourceResolver for FsSourceResolver {
    fn read(&self, path: &Path) -> ExtractResult<String> {
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        };
        std::fs::read_to_string(&full)
            .map_err(|err| ExtractError::io(format!("{}: {}", full.display(), err)))
    }

    fn tex_files(&self) -> ExtractResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.base)
            .map_err(|err| ExtractError::io(format!("{}: {}", self.base.display(), err)))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_tex(&path) {
                if let Some(name) = path.file_name() {
                    paths.push(PathBuf::from(name));
                }
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn is_tex(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "tex")
}

/// One candidate source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

/// Pick the main document: the only candidate, or the first one declaring
/// a `\documentclass`.
pub fn select_main_document(candidates: &[SourceFile]) -> ExtractResult<&SourceFile> {
    if let [only] = candidates {
        return Ok(only);
    }
    candidates
        .iter()
        .find(|candidate| candidate.text.contains("\\documentclass"))
        .ok_or_else(|| ExtractError::not_found("main document (\\documentclass)"))
}

/// Target of the `\input` / `\include` whose name ends at `name_end`,
/// plus the offset just past it.
fn input_target(text: &str, name_end: usize) -> Option<(String, usize)> {
    let after = &text[name_end..];
    let rest = skip_options(after);
    let rest_offset = name_end + (after.len() - rest.len());
    if rest.starts_with('{') {
        let mut groups = brace_groups(rest);
        let target = groups.next()?;
        return Some((target.to_string(), rest_offset + groups.consumed()));
    }
    let len = rest
        .find(|c: char| c.is_whitespace() || c == '\\' || c == '}')
        .unwrap_or(rest.len());
    if len == 0 {
        return None;
    }
    Some((rest[..len].to_string(), rest_offset + len))
}

fn input_path(dir: &Path, target: &str) -> PathBuf {
    let mut path = PathBuf::from(target.trim());
    if path.extension().is_none() {
        path.set_extension("tex");
    }
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

/// Replace every `\input` / `\include` with the referenced file.
///
/// Paths are relative to the including file. Unresolvable or cyclic inputs
/// stay in place. Inputs inside comments are not followed.
pub fn expand_inputs(text: &str, resolver: &dyn SourceResolver) -> String {
    let mut seen = HashSet::new();
    expand_inputs_in(text, Path::new(""), resolver, 0, &mut seen)
}

/// [`expand_inputs`] for a file at `path`, so its own directory is the
/// base for relative inputs.
pub fn expand_inputs_from(path: &Path, text: &str, resolver: &dyn SourceResolver) -> String {
    let mut seen = HashSet::new();
    seen.insert(path.to_path_buf());
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    expand_inputs_in(text, dir, resolver, 0, &mut seen)
}

fn expand_inputs_in(
    text: &str,
    dir: &Path,
    resolver: &dyn SourceResolver,
    depth: usize,
    seen: &mut HashSet<PathBuf>,
) -> String {
    if depth > MAX_INPUT_DEPTH {
        warn!("\\input nesting deeper than {}; not expanding further", MAX_INPUT_DEPTH);
        return text.to_string();
    }

    let mut occurrences = command_occurrences(text, "input");
    occurrences.extend(command_occurrences(text, "include"));
    occurrences.sort_by_key(|range| range.start);

    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    for occurrence in occurrences {
        if occurrence.start < last || is_commented(text, occurrence.start) {
            continue;
        }
        let Some((target, end)) = input_target(text, occurrence.end) else {
            continue;
        };
        let path = input_path(dir, &target);
        if seen.contains(&path) {
            warn!("{} includes itself; left in place", path.display());
            continue;
        }
        match resolver.read(&path) {
            Ok(content) => {
                debug!("expanding input {}", path.display());
                seen.insert(path.clone());
                let next_dir = path.parent().unwrap_or(dir);
                let expanded = expand_inputs_in(&content, next_dir, resolver, depth + 1, seen);
                seen.remove(&path);
                out.push_str(&text[last..occurrence.start]);
                out.push_str(&expanded);
                last = end;
            }
            Err(err) => warn!("unresolved input {}: {}", target, err),
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Read the main document of a paper with its inputs expanded.
pub fn load_document(resolver: &dyn SourceResolver) -> ExtractResult<SourceFile> {
    let mut candidates = Vec::new();
    for path in resolver.tex_files()? {
        let text = resolver.read(&path)?;
        candidates.push(SourceFile { path, text });
    }
    if candidates.is_empty() {
        return Err(ExtractError::not_found(".tex source"));
    }
    let main = select_main_document(&candidates)?;
    debug!("main document: {}", main.path.display());
    Ok(SourceFile {
        path: main.path.clone(),
        text: expand_inputs_from(&main.path, &main.text, resolver),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_braced_and_bare_inputs() {
        let resolver = MemorySourceResolver::new()
            .with_file("intro.tex", "Intro text.")
            .with_file("sections/method.tex", "Method \\input{sections/detail}")
            .with_file("sections/detail.tex", "detail");
        let text = "A \\input{intro} B \\include{sections/method.tex} C \\input sections/detail\n";
        // Nested inputs resolve against the including file's directory.
        assert_eq!(
            expand_inputs(text, &resolver),
            "A Intro text. B Method \\input{sections/detail} C detail\n"
        );
    }

    #[test]
    fn test_nested_relative_input() {
        let resolver = MemorySourceResolver::new()
            .with_file("sec/a.tex", "[\\input{b}]")
            .with_file("sec/b.tex", "b");
        assert_eq!(expand_inputs("\\input{sec/a}", &resolver), "[b]");
    }

    #[test]
    fn test_unrelated_commands_untouched() {
        let resolver = MemorySourceResolver::new();
        let text = "\\usepackage[utf8]{inputenc}\\includegraphics{a.png}\\input{missing}";
        assert_eq!(expand_inputs(text, &resolver), text);
    }

    #[test]
    fn test_commented_input_not_followed() {
        let resolver = MemorySourceResolver::new().with_file("a.tex", "A");
        assert_eq!(expand_inputs("% \\input{a}\n", &resolver), "% \\input{a}\n");
    }

    #[test]
    fn test_cycle_left_in_place() {
        let resolver = MemorySourceResolver::new()
            .with_file("main.tex", "M \\input{loop}")
            .with_file("loop.tex", "L \\input{main}");
        let main = load_document(&resolver).unwrap_err();
        // Neither file declares a class.
        assert!(matches!(main, ExtractError::NotFound { .. }));

        let expanded = expand_inputs_from(Path::new("main.tex"), "M \\input{loop}", &resolver);
        assert_eq!(expanded, "M L \\input{main}");
    }

    #[test]
    fn test_select_main_document() {
        let single = vec![SourceFile {
            path: "only.tex".into(),
            text: "no class".into(),
        }];
        assert_eq!(select_main_document(&single).unwrap().path, PathBuf::from("only.tex"));

        let many = vec![
            SourceFile {
                path: "a.tex".into(),
                text: "\\section{A}".into(),
            },
            SourceFile {
                path: "b.tex".into(),
                text: "\\documentclass{aa}".into(),
            },
        ];
        assert_eq!(select_main_document(&many).unwrap().path, PathBuf::from("b.tex"));
        assert!(select_main_document(&many[..1]).is_ok());
        assert!(select_main_document(&[]).is_err());
    }

    #[test]
    fn test_load_document_expands_main() {
        let resolver = MemorySourceResolver::new()
            .with_file("paper.tex", "\\documentclass{aa}\\input{body}")
            .with_file("body.tex", "\\begin{document}x\\end{document}")
            .with_file("figs/plot.tex", "\\documentclass{standalone}");
        let doc = load_document(&resolver).unwrap();
        assert_eq!(doc.path, PathBuf::from("paper.tex"));
        assert_eq!(doc.text, "\\documentclass{aa}\\begin{document}x\\end{document}");
    }

    #[test]
    fn test_fs_resolver_lists_tex_files() {
        let dir = std::env::temp_dir().join(format!("ondeck-files-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("main.tex"), "\\documentclass{article}").unwrap();
        std::fs::write(dir.join("notes.txt"), "x").unwrap();
        let resolver = FsSourceResolver::new(&dir);
        assert_eq!(resolver.tex_files().unwrap(), vec![PathBuf::from("main.tex")]);
        assert_eq!(
            resolver.read(Path::new("main.tex")).unwrap(),
            "\\documentclass{article}"
        );
        assert!(resolver.read(Path::new("absent.tex")).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
