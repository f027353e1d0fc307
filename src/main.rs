mod export;
mod extractor;
mod layout;
mod normalize;
mod parser;
mod pdf;
mod settings;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use export::ExportOptions;
use extractor::VocabExtractor;
use normalize::Normalizer;
use parser::lines::{classify, validate_lines, LineKind};
use pdf::{PageSource, PdfDocument};
use settings::{EmptyPages, OutputFormat, Settings};

#[derive(Parser)]
#[command(name = "vocab_extractor", about = "Extract numbered vocabulary lists from PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// Settings file (default: optional ./vocab.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Running header to drop from the Words column
    #[arg(long)]
    header: Option<String>,
    /// What to do with pages that have no numbered entries
    #[arg(long, value_enum)]
    empty_pages: Option<EmptyPages>,
    /// Gap between word and meaning in the extracted text
    #[arg(long)]
    separator: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the vocabulary table and write it out
    Extract {
        pdf: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Add Words_trimmed / Meanings_trimmed columns
        #[arg(long)]
        normalize: bool,
        #[command(flatten)]
        common: Common,
    },
    /// Print the extracted table
    Preview {
        pdf: PathBuf,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        #[command(flatten)]
        common: Common,
    },
    /// Show how each raw line of a page is classified
    Inspect {
        pdf: PathBuf,
        /// 1-based page number
        #[arg(short, long)]
        page: usize,
        #[command(flatten)]
        common: Common,
    },
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .try_init();
}

fn load_settings(common: &Common) -> anyhow::Result<Settings> {
    let mut settings =
        Settings::load(common.config.as_deref()).context("Failed to load settings")?;
    if let Some(header) = &common.header {
        settings.header = Some(header.clone());
    }
    if let Some(mode) = common.empty_pages {
        settings.empty_pages = mode;
    }
    if let Some(sep) = &common.separator {
        settings.separator = sep.clone();
    }
    tracing::debug!(?settings, "settings loaded");
    Ok(settings)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            pdf,
            output,
            format,
            normalize,
            common,
        } => {
            let mut settings = load_settings(&common)?;
            if let Some(format) = format {
                settings.format = format;
            }
            settings.normalize |= normalize;
            run_extract(&pdf, output.as_deref(), &settings)?;
        }
        Commands::Preview { pdf, limit, common } => {
            let settings = load_settings(&common)?;
            let table = VocabExtractor::new(&settings)
                .extract_from_pdf(&pdf)
                .with_context(|| format!("Failed to extract {:?}", pdf))?;
            if table.is_empty() {
                println!("No entries found.");
                return Ok(());
            }

            println!("{:>5} | {:<32} | {:<60}", "#", "Words", "Meanings");
            println!("{}", "-".repeat(103));
            for (i, row) in table.rows().iter().take(limit).enumerate() {
                println!(
                    "{:>5} | {:<32} | {:<60}",
                    i,
                    clip_cell(&row.word, 32),
                    clip_cell(&row.meaning, 60)
                );
            }
            println!("\n{} of {} rows", table.len().min(limit), table.len());
        }
        Commands::Inspect { pdf, page, common } => {
            let settings = load_settings(&common)?;
            inspect_page(&pdf, page, &settings)?;
        }
    }
    Ok(())
}

fn run_extract(pdf: &Path, output: Option<&Path>, settings: &Settings) -> anyhow::Result<()> {
    let options = ExportOptions::from_settings(settings)?;
    let normalizer = if settings.normalize {
        Some(Normalizer::new(&settings.articles).context("Invalid article list")?)
    } else {
        None
    };

    let doc = PdfDocument::open(pdf)?;
    let pb = ProgressBar::new(doc.page_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] page {pos}/{len}")?
            .progress_chars("#>-"),
    );
    let table = VocabExtractor::new(settings)
        .extract_pages(&doc, |_| pb.inc(1))
        .with_context(|| format!("Failed to extract {:?}", pdf))?;
    pb.finish_and_clear();

    match output {
        Some(path) => {
            export::write_file(path, &table, normalizer.as_ref(), &options)
                .with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Wrote {} rows to {:?}", table.len(), path);
        }
        None => export::write_table(io::stdout().lock(), &table, normalizer.as_ref(), &options)?,
    }
    Ok(())
}

fn inspect_page(pdf: &Path, page: usize, settings: &Settings) -> anyhow::Result<()> {
    let doc = PdfDocument::open(pdf)?;
    anyhow::ensure!(
        (1..=doc.page_count()).contains(&page),
        "page {} out of range (document has {} pages)",
        page,
        doc.page_count()
    );
    let text = doc.page_text(page - 1)?;

    for (i, (kind, line)) in classify(text.lines()).into_iter().enumerate() {
        let label = match kind {
            LineKind::Entry => "entry",
            LineKind::Continuation => "cont",
            LineKind::Blank => "",
            LineKind::Noise => "noise",
        };
        println!("{:>4} {:<5} | {}", i + 1, label, line);
    }

    let entries = validate_lines(text.lines()).len();
    println!("\n{} entry lines", entries);
    match parser::pipeline_lines(&text, &settings.separator) {
        Ok(table) => println!("{} rows", table.len()),
        Err(e) => println!("pipeline error: {}", e),
    }
    Ok(())
}

/// Fit `cell` into `width` columns, ending in `…` when it had to be cut.
fn clip_cell(cell: &str, width: usize) -> String {
    match cell.char_indices().nth(width) {
        None => cell.to_string(),
        Some(_) if width == 0 => String::new(),
        Some(_) => {
            let keep = cell.char_indices().nth(width - 1).map_or(cell.len(), |(i, _)| i);
            format!("{}…", cell[..keep].trim_end())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_cell_fits_width() {
        assert_eq!(clip_cell("één", 3), "één");
        assert_eq!(clip_cell("aanbieden", 4), "aan…");
        assert_eq!(clip_cell("de kat", 4), "de…");
        assert_eq!(clip_cell("kat", 0), "");
    }

    #[test]
    fn cli_parses_extract() {
        let cli = Cli::try_parse_from([
            "vocab_extractor",
            "extract",
            "vocab.pdf",
            "-o",
            "vocab.csv",
            "--empty-pages",
            "skip",
            "--header",
            "Derde Ronde Nederlands voor buitenlanders",
            "--normalize",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract {
                output,
                normalize,
                common,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("vocab.csv")));
                assert!(normalize);
                assert_eq!(common.empty_pages, Some(EmptyPages::Skip));
                assert_eq!(
                    common.header.as_deref(),
                    Some("Derde Ronde Nederlands voor buitenlanders")
                );
            }
            _ => panic!("expected extract"),
        }
    }
}
