//! Integration tests for ondeck full document extraction

use ondeck::{
    utils::files::{load_document, FsSourceResolver, MemorySourceResolver},
    DocumentModel, ExtractError, ExtractOptions, Extracted, SectionNode,
};
use pretty_assertions::assert_eq;

const AA_PAPER: &str = include_str!("fixtures/aa_paper.tex");
const AASTEX_PAPER: &str = include_str!("fixtures/aastex_paper.tex");

fn extract(source: &str) -> DocumentModel {
    DocumentModel::from_source(source, &ExtractOptions::default()).unwrap()
}

fn files_of(doc: &DocumentModel) -> Vec<Vec<String>> {
    doc.figures().iter().map(|fig| fig.files.clone()).collect()
}

// ============================================================================
// A&A style paper
// ============================================================================

mod aa_paper {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_and_authors() {
        let doc = extract(AA_PAPER);
        assert_eq!(doc.title(), "Stellar populations of a nearby disc");
        assert_eq!(
            doc.author_names(),
            ["M. Fouesneau", "I.-M. van Groot", "J. Doe", "A. N. Other", "B. Last"]
        );
        assert_eq!(doc.short_authors(), "M. Fouesneau, et al.");
        assert!(matches!(doc.authors(), Some(Extracted::Scalar(_))));
    }

    #[test]
    fn test_structured_abstract() {
        let doc = extract(AA_PAPER);
        assert_eq!(
            doc.abstract_text(),
            Some(
                "Context of the study.\nWe aim to measure things.\nWe fit models to 50\\% of the data.\nThe disc is old.\nDiscs are old."
            )
        );
    }

    #[test]
    fn test_header_macros() {
        let doc = extract(AA_PAPER);
        assert_eq!(
            doc.macros(),
            "\\providecommand{\\kms}{km\\,s$^{-1}$}\n\\providecommand*{\\Msun}{M$_\\odot$}\n\\def\\hii{H\\,{\\sc ii}}\n\\graphicspath{{figures/}}"
        );
    }

    #[test]
    fn test_figures_in_document_order() {
        let doc = extract(AA_PAPER);
        let ordinals: Vec<usize> = doc.figures().iter().map(|fig| fig.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
        assert_eq!(
            files_of(&doc),
            vec![
                vec!["map.pdf".to_string()],
                vec!["young.png".to_string(), "old.png".to_string()],
                vec!["cmd1.pdf".to_string(), "cmd2.pdf".to_string()],
                vec![],
            ]
        );
    }

    #[test]
    fn test_reference_counts_ignore_comments() {
        let doc = extract(AA_PAPER);
        let counts: Vec<(Option<&str>, usize)> = doc
            .figures()
            .iter()
            .map(|fig| (fig.primary_label(), fig.reference_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (Some("fig:map"), 2),
                (Some("fig:panels"), 1),
                (Some("fig:cmd"), 0),
                (None, 0),
            ]
        );
    }

    #[test]
    fn test_subfigure_figure_keeps_outer_caption() {
        let doc = extract(AA_PAPER);
        let panels = &doc.figures()[1];
        assert_eq!(panels.caption_text().as_deref(), Some("Two populations."));
        assert_eq!(panels.sources.subfigures.as_ref().map(Vec::len), Some(2));
        assert!(panels.sources.includegraphics.is_none());
    }

    #[test]
    fn test_outline_with_appendix() {
        let doc = extract(AA_PAPER);
        assert_eq!(
            doc.outline(),
            "Introduction\nData\n  Photometry\n    Calibration\n  Spectroscopy\nResults\nAppendix\n  Extra tables\n    Table notes\n"
        );
        let appendix = doc.structure().last().unwrap();
        assert_eq!(
            appendix,
            &SectionNode::appendix().with_children(vec![SectionNode::new(1, "Extra tables")
                .with_children(vec![SectionNode::new(2, "Table notes")])])
        );
    }

    #[test]
    fn test_no_arxiver_tag() {
        assert!(extract(AA_PAPER).arxiver_tag().is_none());
    }
}

// ============================================================================
// AASTeX style paper
// ============================================================================

mod aastex_paper {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_repeated_author_commands() {
        let doc = extract(AASTEX_PAPER);
        assert_eq!(
            doc.authors(),
            Some(&Extracted::Multiple(vec![
                "Jane Roe".to_string(),
                "John Smith".to_string()
            ]))
        );
        assert_eq!(doc.short_authors(), "Jane Roe, John Smith");
    }

    #[test]
    fn test_abstract_environment() {
        let doc = extract(AASTEX_PAPER);
        assert_eq!(
            doc.abstract_text(),
            Some("We report the discovery of a planet.\nIts orbit is wide.")
        );
    }

    #[test]
    fn test_renewcommand_becomes_providecommand() {
        let doc = extract(AASTEX_PAPER);
        assert_eq!(
            doc.macros(),
            "\\providecommand{\\vdag}{(v)^\\dagger}\n\\providecommand{\\arraystretch}{1.2}"
        );
    }

    #[test]
    fn test_aastex_figure_idioms() {
        let doc = extract(AASTEX_PAPER);
        assert_eq!(
            files_of(&doc),
            vec![
                vec!["orbit.eps".to_string()],
                vec!["spectrum.eps".to_string(), "residuals.eps".to_string()],
                vec!["light_curve.pdf".to_string()],
            ]
        );
        let counts: Vec<usize> = doc.figures().iter().map(|fig| fig.reference_count).collect();
        assert_eq!(counts, vec![0, 2, 1]);
    }

    #[test]
    fn test_label_inside_caption() {
        let doc = extract(AASTEX_PAPER);
        let light_curve = &doc.figures()[2];
        assert_eq!(light_curve.primary_label(), Some("fig:lc"));
        assert_eq!(
            light_curve.caption_text().as_deref(),
            Some("Light curve \\label{fig:lc}")
        );
    }

    #[test]
    fn test_arxiver_tag_read_from_comment() {
        let doc = extract(AASTEX_PAPER);
        assert_eq!(
            doc.arxiver_tag(),
            Some(&["orbit.eps".to_string(), "spectrum".to_string()][..])
        );
    }

    #[test]
    fn test_starred_section() {
        assert_eq!(extract(AASTEX_PAPER).outline(), "Introduction\nDiscussion\n");
    }
}

// ============================================================================
// Multi-file sources
// ============================================================================

mod multi_file {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_directory_with_inputs() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/multi");
        let main = load_document(&FsSourceResolver::new(dir)).unwrap();
        assert_eq!(main.path.to_str(), Some("main.tex"));

        let doc = extract(&main.text);
        assert_eq!(doc.title(), "Split across files");
        assert_eq!(doc.macros(), "\\providecommand{\\given}{\\,|\\,}");
        assert_eq!(doc.outline(), "Introduction\nResults\n");
        assert_eq!(files_of(&doc), vec![vec!["one.png".to_string()]]);
        assert_eq!(doc.figures()[0].reference_count, 1);
    }

    #[test]
    fn test_memory_sources() {
        let resolver = MemorySourceResolver::new()
            .with_file(
                "paper.tex",
                "\\documentclass{article}\\begin{document}\\title{T}\\input{body}\\end{document}",
            )
            .with_file("body.tex", "\\section{Only}");
        let main = load_document(&resolver).unwrap();
        assert_eq!(extract(&main.text).outline(), "Only\n");
    }
}

// ============================================================================
// Whole-document properties
// ============================================================================

mod properties {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extraction_is_idempotent() {
        for source in [AA_PAPER, AASTEX_PAPER] {
            assert_eq!(extract(source), extract(source));
        }
    }

    #[test]
    fn test_parallel_extraction_matches_sequential() {
        let sequential = vec![extract(AA_PAPER), extract(AASTEX_PAPER)];
        let parallel: Vec<DocumentModel> = std::thread::scope(|scope| {
            let handles: Vec<_> = [AA_PAPER, AASTEX_PAPER]
                .into_iter()
                .map(|source| scope.spawn(move || extract(source)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_unreadable_figure_degrades_only_itself() {
        let source = "\\begin{document}\\title{T}\\author{A}\\abstract{x}\n\\begin{figure}\n\\subfigure[a]{\\includegraphics{a.png}\n\\end{figure}\n\\begin{figure}\\includegraphics{b.png}\\end{figure}\n\\end{document}";
        let doc = extract(source);
        assert_eq!(files_of(&doc), vec![vec![], vec!["b.png".to_string()]]);

        let strict = DocumentModel::from_source(source, &ExtractOptions::strict());
        assert!(matches!(strict, Err(ExtractError::Malformed { .. })));
    }

    #[test]
    fn test_json_serialization() {
        let doc = extract(AASTEX_PAPER);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["title"], "A planet on a wide orbit");
        assert_eq!(value["authors"][1], "John Smith");
        assert_eq!(value["figures"][1]["files"][0], "spectrum.eps");
        assert_eq!(value["structure"][0]["title"], "Introduction");
    }
}
