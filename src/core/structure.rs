//! Section outline.
//!
//! Sectioning commands are placed with a two-level lookback: a deeper node
//! goes under the last top-level node, or under that node's last child when
//! it is deeper still. There is no general stack, so outlines deeper than
//! three levels flatten. Headings at or after the appendix marker are
//! shifted one level down and gathered under a synthetic "Appendix" root.

use lazy_static::lazy_static;
use log::debug;
use ondeck_model::SectionNode;
use phf::phf_map;
use regex::Regex;

use super::command::parse_command;

static SECTION_LEVELS: phf::Map<&'static str, u8> = phf_map! {
    "section" => 0,
    "subsection" => 1,
    "subsubsection" => 2,
};

lazy_static! {
    static ref SECTION_TAG: Regex = Regex::new(r"\\((?:sub){0,2}section)\b").unwrap();
    static ref APPENDIX: Regex =
        Regex::new(r"\\appendix\b|\\begin\s*\{(?:appendix|appendices)\}").unwrap();
}

/// A sectioning command found in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTag<'a> {
    /// Command name without backslash.
    pub name: &'a str,
    /// Byte offset of the backslash.
    pub offset: usize,
    pub base_level: u8,
}

/// Every sectioning command of `body`, in order.
pub fn section_tags(body: &str) -> Vec<SectionTag<'_>> {
    SECTION_TAG
        .captures_iter(body)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str();
            let base_level = *SECTION_LEVELS.get(name)?;
            Some(SectionTag {
                name,
                offset: whole.start(),
                base_level,
            })
        })
        .collect()
}

/// Offset just past the first appendix marker, or the end of `body`.
pub fn appendix_offset(body: &str) -> usize {
    APPENDIX.find(body).map_or(body.len(), |m| m.end())
}

/// Assemble the section forest of `body`.
pub fn build_structure(body: &str) -> Vec<SectionNode> {
    let boundary = appendix_offset(body);
    let mut structure: Vec<SectionNode> = Vec::new();
    let mut appendix_opened = false;

    for tag in section_tags(body) {
        let title = match parse_command(tag.name, &body[tag.offset..]) {
            Ok(title) => title,
            Err(err) => {
                debug!("skipping \\{} at {}: {}", tag.name, tag.offset, err);
                continue;
            }
        };
        let in_appendix = tag.offset >= boundary;
        let node = SectionNode::new(tag.base_level + u8::from(in_appendix), title);

        if in_appendix && !appendix_opened {
            structure.push(SectionNode::appendix());
            appendix_opened = true;
        }

        let Some(last) = structure.last_mut() else {
            structure.push(node);
            continue;
        };
        if node.level > last.level {
            match last.children.last_mut() {
                Some(child) if node.level > child.level => child.children.push(node),
                _ => last.children.push(node),
            }
        } else {
            structure.push(node);
        }
    }

    debug!("outline has {} top-level node(s)", structure.len());
    structure
}

/// Outline listing: one title per line, indented by two spaces per level.
pub fn format_outline(structure: &[SectionNode]) -> String {
    let mut out = String::new();
    for node in structure {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &SectionNode) {
    for _ in 0..node.level {
        out.push_str("  ");
    }
    out.push_str(&node.title);
    out.push('\n');
    for child in &node.children {
        write_node(out, child);
    }
}
