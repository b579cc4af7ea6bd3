//! ondeck CLI - structured extraction and cover pages for LaTeX papers

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use ondeck::{
    render_postage,
    utils::config::{config_loader, OndeckConfig},
    utils::files::{expand_inputs_from, load_document, FsSourceResolver},
    DocumentModel, ExtractError, ExtractOptions,
};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "ondeck")]
#[command(version)]
#[command(about = "ondeck - structured extraction from LaTeX paper sources", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Configuration file layered over the built-in defaults
    /// (falls back to $ONDECK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fail on unreadable authors, abstract or figures instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Extract a paper and print a summary
    Parse {
        /// Main .tex file, or a directory holding the paper sources
        path: PathBuf,

        /// Print the whole model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the section outline
    Outline {
        /// Main .tex file, or a directory holding the paper sources
        path: PathBuf,
    },

    /// List figures with their files and reference counts
    Figures {
        /// Main .tex file, or a directory holding the paper sources
        path: PathBuf,
    },

    /// Render the LaTeX cover page of a paper
    Postage {
        /// Main .tex file, or a directory holding the paper sources
        path: PathBuf,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cover page template replacing the configured one
        #[arg(long)]
        template: Option<PathBuf>,

        /// Date line (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Paper identifier shown in front of the abstract
        #[arg(long)]
        identifier: Option<String>,

        /// Listing comment shown at the bottom of the page
        #[arg(long)]
        comment: Option<String>,
    },
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut loader = config_loader(cli.config.as_deref()).map_err(to_io)?;
    if cli.strict {
        loader = loader.set_override("extract.strict", true).map_err(to_io)?;
    }
    let config = loader.build().map_err(to_io)?;
    let options = config.extract_options();

    match cli.command {
        Commands::Parse { path, json } => {
            let doc = load_model(&path, &options, &config)?;
            if json {
                let text = serde_json::to_string_pretty(&doc)
                    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
                println!("{}", text);
            } else {
                print_summary(&doc);
            }
        }
        Commands::Outline { path } => {
            let doc = load_model(&path, &options, &config)?;
            print!("{}", doc.outline());
        }
        Commands::Figures { path } => {
            let doc = load_model(&path, &options, &config)?;
            for figure in doc.figures() {
                println!("{}", figure);
                println!("    References: {}", figure.reference_count);
            }
        }
        Commands::Postage {
            path,
            output,
            template,
            date,
            identifier,
            comment,
        } => {
            let mut doc = load_model(&path, &options, &config)?;
            doc.set_date(date.unwrap_or_else(today));
            if let Some(identifier) = identifier {
                doc.set_identifier(identifier);
            }
            if let Some(comment) = comment {
                doc.set_comment(comment);
            }

            let mut postage = config.postage_options().map_err(to_io)?;
            if let Some(template) = template {
                postage.template = Some(fs::read_to_string(template)?);
            }
            let page = render_postage(&doc.to_postage_input(), &postage);
            match output {
                Some(out) => {
                    fs::write(&out, page)?;
                    log::info!("cover page written to {}", out.display());
                }
                None => print!("{}", page),
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

#[cfg(feature = "cli")]
fn to_io(err: ExtractError) -> io::Error {
    let kind = match err {
        ExtractError::Io { .. } => io::ErrorKind::NotFound,
        _ => io::ErrorKind::InvalidData,
    };
    io::Error::new(kind, err)
}

#[cfg(feature = "cli")]
fn today() -> String {
    chrono::Local::now().format("%a, %d %b %Y").to_string()
}

/// Source text of the paper at `path`, with `\input`s expanded.
#[cfg(feature = "cli")]
fn read_source(path: &Path) -> io::Result<String> {
    if path.is_dir() {
        let resolver = FsSourceResolver::new(path);
        let main = load_document(&resolver).map_err(to_io)?;
        log::info!("main document: {}", main.path.display());
        return Ok(main.text);
    }
    let text = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let resolver = FsSourceResolver::new(base);
    let name = path.file_name().map(PathBuf::from).unwrap_or_default();
    Ok(expand_inputs_from(&name, &text, &resolver))
}

#[cfg(feature = "cli")]
fn load_model(
    path: &Path,
    options: &ExtractOptions,
    config: &OndeckConfig,
) -> io::Result<DocumentModel> {
    let text = read_source(path)?;
    let mut doc = DocumentModel::from_source(&text, options).map_err(to_io)?;
    let highlights = config.highlight_names().map_err(to_io)?;
    if !highlights.is_empty() {
        doc.highlight_matching(&highlights);
    }
    Ok(doc)
}

#[cfg(feature = "cli")]
fn print_summary(doc: &DocumentModel) {
    println!("{}", doc);
    if let Some(text) = doc.abstract_text() {
        println!();
        println!("{}", text);
    }
    println!();
    println!(
        "{} figure(s), {} top-level section(s)",
        doc.figures().len(),
        doc.structure().len()
    );
    if let Some(tag) = doc.arxiver_tag() {
        println!("arxiver selection: {}", tag.join(", "));
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install ondeck --features cli");
    eprintln!("  ondeck <parse|outline|figures|postage> <PATH>");
}
