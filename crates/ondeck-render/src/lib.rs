//! Paper model to LaTeX "postage" cover page backend.

use ondeck_model::Figure;

/// Built-in cover page template. Placeholders are `<NAME>` tokens.
pub const DEFAULT_TEMPLATE: &str = r"%
\documentclass[a4paper]{article}
\usepackage[utf8]{inputenc}
\usepackage[a4paper,margin=.5cm,landscape]{geometry}
\usepackage[english]{babel}
\usepackage{natbib}
\usepackage{graphicx}
\usepackage{txfonts}
\usepackage{xcolor}
\usepackage{amsfonts}
\usepackage{mathrsfs}
\usepackage{amssymb}
\usepackage{textgreek}
\usepackage[nolist,nohyperlinks,printonlyused]{acronym}
\usepackage[breaklinks,colorlinks,citecolor=blue,unicode]{hyperref}
\usepackage{siunitx}

\DeclareGraphicsExtensions{.jpg, .ps, .eps, .png, .pdf}

%Document found macros
<MACROS>

% template macros
\renewcommand{\abstract}[1]{%
  \textbf{<IDENTIFIER> } #1
}
\newcommand\hl[1]{\colorbox{yellow}{#1}}

\renewcommand{\thanks}[1]{}
\renewcommand{\caption}[1]{{\scriptsize{#1}}}
\providecommand{\acronymused}[1]{}
\providecommand{\altaffilmark}[1]{}

\begin{document}
\thispagestyle{plain}
\begin{minipage}[t][0pt]{0.98\linewidth}

\textbf{\LARGE{<TITLE>}}

\vspace{1em}

\textbf{\large{<AUTHORS>}}

\vspace{1em}

\abstract{
<ABSTRACT>
}

\vspace{1em}

\centering
<FIGURES>

\vfill
\hl{<DATE>} -- <COMMENTS>
\end{minipage}

\end{document}
";

#[derive(Debug, Clone)]
pub struct PostageOptions {
    /// Maximum number of figures placed on the page.
    pub figure_limit: usize,
    /// Copy the header macros of the source document into the page.
    pub include_macros: bool,
    /// Replacement for [`DEFAULT_TEMPLATE`].
    pub template: Option<String>,
}

impl Default for PostageOptions {
    fn default() -> Self {
        Self {
            figure_limit: 3,
            include_macros: false,
            template: None,
        }
    }
}

/// Everything the renderer reads from an extracted document.
#[derive(Debug, Clone, Copy)]
pub struct PostageInput<'a> {
    pub title: &'a str,
    pub short_authors: &'a str,
    pub abstract_text: &'a str,
    pub macros: &'a str,
    pub identifier: Option<&'a str>,
    pub date: &'a str,
    pub comment: &'a str,
    pub figures: &'a [Figure],
    pub arxiver_tag: Option<&'a [String]>,
}

/// Choose the figures shown on the page.
///
/// An arxiver tag wins: its entries are matched against figure files in tag
/// order. Otherwise figures are ranked by reference count, ties keeping
/// document order. Both paths stop at `limit`.
pub fn select_figures<'a>(
    figures: &'a [Figure],
    arxiver_tag: Option<&[String]>,
    limit: usize,
) -> Vec<&'a Figure> {
    if limit == 0 {
        return Vec::new();
    }
    if let Some(tag) = arxiver_tag.filter(|tag| !tag.is_empty()) {
        let mut selected: Vec<&Figure> = Vec::new();
        for entry in tag {
            let found = figures.iter().find(|fig| {
                fig.files.iter().any(|file| file_matches(file, entry))
                    && !selected.iter().any(|s| s.ordinal == fig.ordinal)
            });
            if let Some(fig) = found {
                selected.push(fig);
            }
            if selected.len() >= limit {
                break;
            }
        }
        return selected;
    }

    let mut ranked: Vec<&Figure> = figures.iter().collect();
    ranked.sort_by(|a, b| b.reference_count.cmp(&a.reference_count));
    ranked.truncate(limit);
    ranked
}

/// `entry` names `file` exactly, as a path suffix, or without its extension.
fn file_matches(file: &str, entry: &str) -> bool {
    let entry = entry.trim();
    if entry.is_empty() {
        return false;
    }
    if file == entry || file.ends_with(&format!("/{}", entry)) {
        return true;
    }
    let stem = match file.rfind('.') {
        Some(dot) if dot > file.rfind('/').map_or(0, |slash| slash + 1) => &file[..dot],
        _ => file,
    };
    stem == entry || stem.ends_with(&format!("/{}", entry))
}

pub fn render_figure(figure: &Figure) -> String {
    let mut out = String::from("\\begin{minipage}{0.32\\textwidth}\n");
    for file in figure.graphic_files() {
        out.push_str(
            "    \\includegraphics[width=\\textwidth, height=0.4\\textheight,keepaspectratio]{",
        );
        out.push_str(file);
        out.push_str("}\\\\\n");
    }
    out.push_str(&format!(
        "    \\caption{{Fig. {}: {}}}\n",
        figure.ordinal,
        figure.caption_text().unwrap_or_default()
    ));
    out.push_str("\\end{minipage}\n%\n");
    out
}

pub fn render_postage(input: &PostageInput<'_>, options: &PostageOptions) -> String {
    let template = options.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);

    let identifier = match input.identifier {
        Some(id) if !id.is_empty() => format!("\\hl{{{}}}", id),
        _ => "Abstract ".to_string(),
    };
    let abstract_line = input
        .abstract_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let figures: String = select_figures(input.figures, input.arxiver_tag, options.figure_limit)
        .into_iter()
        .map(render_figure)
        .collect();
    let macros = if options.include_macros {
        input.macros
    } else {
        ""
    };

    template
        .replace("<MACROS>", macros)
        .replace("<IDENTIFIER>", &identifier)
        .replace("<TITLE>", input.title)
        .replace("<AUTHORS>", input.short_authors)
        .replace("<ABSTRACT>", &abstract_line)
        .replace("<FIGURES>", &figures)
        .replace("<COMMENTS>", input.comment)
        .replace("<DATE>", input.date)
}
