//! Balanced-brace group extraction
//!
//! This is a content extractor, not a parser: only the text inside top-level
//! `{...}` groups is returned, characters outside any group are dropped.
//! Nested braces stay verbatim inside their enclosing group.

/// Iterator over the top-level `{...}` groups of a text.
///
/// Each item is the group content with surrounding whitespace trimmed.
/// A `}` at depth zero is ignored. A group still open when the text ends
/// produces nothing; [`BraceGroups::is_unterminated`] reports it.
#[derive(Debug, Clone)]
pub struct BraceGroups<'a> {
    text: &'a str,
    pos: usize,
    depth: usize,
    start: usize,
}

impl<'a> BraceGroups<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            depth: 0,
            start: 0,
        }
    }

    /// Byte offset just past the last character scanned.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// The scan stopped inside a group that never closed.
    pub fn is_unterminated(&self) -> bool {
        self.depth > 0
    }
}

impl<'a> Iterator for BraceGroups<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let idx = self.pos;
            self.pos += 1;
            match bytes[idx] {
                b'{' => {
                    if self.depth == 0 {
                        self.start = idx + 1;
                    }
                    self.depth += 1;
                }
                b'}' => {
                    if self.depth == 0 {
                        continue;
                    }
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(self.text[self.start..idx].trim());
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Lazily iterate the top-level brace groups of `text`.
pub fn brace_groups(text: &str) -> BraceGroups<'_> {
    BraceGroups::new(text)
}

/// All top-level brace groups of `text`, in order.
pub fn balanced_braces(text: &str) -> Vec<String> {
    if !text.contains('{') {
        return Vec::new();
    }
    brace_groups(text).map(str::to_string).collect()
}

/// Concatenation of [`balanced_braces`] over several fragments.
pub fn balanced_braces_all<I, S>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .flat_map(|fragment| balanced_braces(fragment.as_ref()))
        .collect()
}

/// At least one group, no stray `}` and every `{` closed.
pub fn is_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    let mut groups = 0usize;
    for byte in text.bytes() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 {
                    groups += 1;
                }
            }
            _ => {}
        }
    }
    depth == 0 && groups > 0
}
