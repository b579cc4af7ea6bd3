//! Figure extraction.
//!
//! A figure block is searched for the known declaration idioms:
//! `\includegraphics`, `\plotone`, `\plottwo` and AASTeX `\fig`. Blocks
//! mentioning `subfigure` take a separate path where each sub-block is
//! searched on its own and the matches are collected into one flat list.

use std::ops::Range;

use log::{debug, warn};
use ondeck_model::{Extracted, Figure, FigureCommand, FigureSources, SubfigureEntry};

use super::command::{
    command_occurrences, parse_command, parse_command_args, parse_command_field, skip_options,
};
use super::environment::{environment_spans, figure_blocks};
use super::tokenizer::brace_groups;
use crate::utils::error::{ExtractError, ExtractResult, Recover};

const SUBFIGURE: &str = "subfigure";

/// Build the figure record for one figure block.
///
/// Missing commands leave their field empty. An error is returned only when
/// the block as a whole cannot be read (a subfigure argument that never
/// closes).
pub fn try_extract_figure(block: &str, ordinal: usize) -> ExtractResult<Figure> {
    let mut figure = Figure::empty(ordinal);

    if block.contains(SUBFIGURE) {
        figure.caption = parse_command("caption", block)
            .recover()?
            .map(Extracted::Scalar);
        figure.label = parse_command("label", block)
            .recover()?
            .map(Extracted::Scalar);
        figure.sources.subfigures = Some(collect_subfigures(block)?);
    } else {
        figure.caption = parse_command_field("caption", block).recover()?;
        figure.label = parse_command_field("label", block).recover()?;
        figure.sources = FigureSources {
            includegraphics: parse_command_field("includegraphics", block).recover()?,
            plotone: parse_command_field("plotone", block).recover()?,
            fig: parse_command_field("fig", block).recover()?,
            plottwo: parse_command_args("plottwo", block, 2).recover()?,
            subfigures: None,
        };
    }

    figure.files = figure_files(&figure.sources);
    debug!(
        "figure {}: label {:?}, {} file(s)",
        ordinal,
        figure.primary_label(),
        figure.files.len()
    );
    Ok(figure)
}

/// Lenient form of [`try_extract_figure`]: a block that cannot be read
/// becomes an empty figure.
pub fn extract_figure(block: &str, ordinal: usize) -> Figure {
    try_extract_figure(block, ordinal).unwrap_or_else(|err| {
        warn!("figure {}: {}; keeping an empty record", ordinal, err);
        Figure::empty(ordinal)
    })
}

/// Every figure of `body`, numbered from 1 in document order.
///
/// With `strict` the first unreadable figure fails the call.
pub fn extract_figures(body: &str, strict: bool) -> ExtractResult<Vec<Figure>> {
    figure_blocks(body)
        .into_iter()
        .enumerate()
        .map(|(idx, block)| {
            let ordinal = idx + 1;
            if strict {
                try_extract_figure(block, ordinal)
            } else {
                Ok(extract_figure(block, ordinal))
            }
        })
        .collect()
}

/// Sub-blocks of a subfigure figure, in document order: the body of each
/// `subfigure` environment and the first braced argument of each
/// `\subfigure[..]{..}` command.
fn subfigure_blocks(block: &str) -> ExtractResult<Vec<&str>> {
    let mut spans: Vec<Range<usize>> = environment_spans(SUBFIGURE, block);

    for occurrence in command_occurrences(block, SUBFIGURE) {
        let after = &block[occurrence.end..];
        let rest = skip_options(after);
        let rest_offset = occurrence.end + (after.len() - rest.len());
        let mut groups = brace_groups(rest);
        match groups.next() {
            Some(_) => {
                let consumed = groups.consumed();
                // `consumed` points past the closing brace of the group.
                let inner = &rest[..consumed - 1];
                let open = inner.find('{').map_or(0, |idx| idx + 1);
                spans.push(rest_offset + open..rest_offset + consumed - 1);
            }
            None if groups.is_unterminated() => {
                return Err(ExtractError::malformed(SUBFIGURE));
            }
            None => debug!("\\subfigure without an argument"),
        }
    }

    spans.sort_by_key(|span| span.start);
    Ok(spans.into_iter().map(|span| &block[span]).collect())
}

fn collect_subfigures(block: &str) -> ExtractResult<Vec<SubfigureEntry>> {
    let mut entries = Vec::new();
    for sub_block in subfigure_blocks(block)? {
        for command in FigureCommand::ALL {
            if let Some(value) = parse_command(command.name(), sub_block).recover()? {
                entries.push(SubfigureEntry::new(command, value));
            }
        }
    }
    Ok(entries)
}

fn strip_braces(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '{' | '}')).collect()
}

/// Files of a figure, in fixed priority order: `\plotone`, `\fig`,
/// `\includegraphics`, `\plottwo`, then every subfigure match (captions and
/// labels included, see [`Figure::graphic_files`]). Duplicates stay.
pub fn figure_files(sources: &FigureSources) -> Vec<String> {
    let mut files = Vec::new();
    if let Some(plotone) = &sources.plotone {
        files.extend(plotone.values().into_iter().map(strip_braces));
    }
    if let Some(fig) = &sources.fig {
        files.extend(fig.values().into_iter().map(str::to_string));
    }
    if let Some(includegraphics) = &sources.includegraphics {
        files.extend(includegraphics.values().into_iter().map(strip_braces));
    }
    if let Some(plottwo) = &sources.plottwo {
        files.extend(plottwo.iter().cloned());
    }
    if let Some(subfigures) = &sources.subfigures {
        files.extend(subfigures.iter().map(|entry| entry.value.clone()));
    }
    files
}
