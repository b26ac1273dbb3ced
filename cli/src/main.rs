//! pdfpick CLI - pick images out of a PDF into a new document

mod review;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfpick::session::DOWNLOAD_FILE_NAME;
use pdfpick::{
    compose, extract_file, render, ComposeOptions, ContentSummary, ExtractOptions, Extraction,
    JsonFormat, PageSelection, Selection,
};

#[derive(Parser)]
#[command(name = "pdfpick")]
#[command(version)]
#[command(about = "Pick images out of a PDF into a new document", long_about = None)]
struct Cli {
    /// Input PDF file (starts an interactive review)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF for the interactive review
    #[arg(short, long, value_name = "FILE", env = "PDFPICK_OUTPUT", default_value = DOWNLOAD_FILE_NAME)]
    output: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Review text and images, choose images, create the PDF
    Review {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE", env = "PDFPICK_OUTPUT", default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Stop at the first image that cannot be decoded
        #[arg(long)]
        strict: bool,

        /// Title for the output document
        #[arg(long)]
        title: Option<String>,
    },

    /// List the extracted content sequence
    #[command(alias = "ls")]
    List {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print a JSON summary instead
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Compose a PDF from images chosen by position
    Compose {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Item positions as shown by `list` (e.g., "2,4", "2-6")
        #[arg(short, long, value_name = "POSITIONS")]
        images: String,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE", env = "PDFPICK_OUTPUT", default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Title for the output document
        #[arg(long)]
        title: Option<String>,
    },

    /// Save extracted images as PNG files
    Images {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Show version information
    Version,
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Review {
            input,
            output,
            pages,
            strict,
            title,
        }) => extract_options(pages.as_deref(), strict).and_then(|options| {
            review::run(&input, &output, options, compose_options(title))
        }),
        Some(Commands::List {
            input,
            json,
            compact,
            pages,
        }) => cmd_list(&input, json, compact, pages.as_deref()),
        Some(Commands::Compose {
            input,
            images,
            output,
            pages,
            title,
        }) => cmd_compose(&input, &images, &output, pages.as_deref(), title),
        Some(Commands::Images {
            input,
            output,
            pages,
        }) => cmd_images(&input, output.as_deref(), pages.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: review if input is provided
            if let Some(input) = cli.input {
                review::run(
                    &input,
                    &cli.output,
                    ExtractOptions::default(),
                    ComposeOptions::default(),
                )
            } else {
                println!("{}", "Usage: pdfpick <FILE>".yellow());
                println!("       pdfpick --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn extract_options(
    pages: Option<&str>,
    strict: bool,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new();
    if let Some(p) = pages {
        let selection =
            PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?;
        options = options.with_pages(selection);
    }
    if strict {
        options = options.strict();
    }
    Ok(options)
}

fn compose_options(title: Option<String>) -> ComposeOptions {
    match title {
        Some(title) => ComposeOptions::new().with_title(title),
        None => ComposeOptions::new(),
    }
}

pub(crate) fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Extract with a spinner, reporting skipped images on stderr.
pub(crate) fn extract_with_progress(
    input: &Path,
    options: &ExtractOptions,
) -> Result<Extraction, Box<dyn std::error::Error>> {
    let pb = spinner("Extracting content...");
    let extraction = extract_file(input, options);
    pb.finish_and_clear();

    warn_skipped(&extraction);
    if let Some(ref e) = extraction.error {
        if extraction.content.is_empty() {
            return Err(e.to_string().into());
        }
        eprintln!("{}: {} (showing partial content)", "Warning".yellow(), e);
    }
    Ok(extraction)
}

pub(crate) fn warn_skipped(extraction: &Extraction) {
    for skip in &extraction.skipped {
        eprintln!(
            "{}: image {} on page {} skipped: {}",
            "Warning".yellow(),
            skip.object,
            skip.page,
            skip.error
        );
    }
}

fn cmd_list(input: &Path, json: bool, compact: bool, pages: Option<&str>) -> CmdResult {
    let options = extract_options(pages, false)?;
    let extraction = extract_with_progress(input, &options)?;
    let content = &extraction.content;

    if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        let summary = ContentSummary::new(content, &Selection::new());
        println!("{}", render::to_json(&summary, format)?);
    } else {
        print!("{}", render::to_text(content, &Selection::new()));
        println!(
            "\n{} {} pages, {} text blocks, {} images",
            "Total:".bold(),
            content.page_count(),
            content.text_count(),
            content.image_count()
        );
    }

    Ok(())
}

fn cmd_compose(
    input: &Path,
    images: &str,
    output: &Path,
    pages: Option<&str>,
    title: Option<String>,
) -> CmdResult {
    let options = extract_options(pages, false)?;
    let extraction = extract_with_progress(input, &options)?;
    let selection = Selection::parse_positions(images, extraction.content.len())?;

    let pb = spinner("Creating PDF...");
    let report = compose(&extraction.content, &selection, output, &compose_options(title));
    pb.finish_and_clear();
    let report = report?;

    println!(
        "{} {} ({} pages, {} images)",
        "Saved to".green(),
        output.display(),
        report.pages,
        report.images
    );
    Ok(())
}

fn cmd_images(input: &Path, output: Option<&Path>, pages: Option<&str>) -> CmdResult {
    let options = extract_options(pages, false)?;
    let extraction = extract_with_progress(input, &options)?;

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let mut count = 0;
    for (index, item) in extraction.content.iter().enumerate() {
        if let Some(image) = item.as_image() {
            let filename = format!("image_{:03}_p{}.png", index + 1, image.page);
            image.image.save(output_dir.join(&filename))?;
            println!("{} {}", "Extracted".green(), filename);
            count += 1;
        }
    }

    println!("\n{} {} images extracted", "Done!".green().bold(), count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfpick".cyan().bold(), pdfpick::VERSION);
    println!("Pick images out of a PDF into a new document");
}
