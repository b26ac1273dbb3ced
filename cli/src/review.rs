//! Interactive review: show each item, ask about each image, create the PDF.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use pdfpick::{ComposeOptions, Entry, ExtractOptions, Session, Workspace};

use crate::{spinner, warn_skipped};

pub fn run(
    input: &Path,
    output: &Path,
    extract_options: ExtractOptions,
    compose_options: ComposeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let dir = tempfile::tempdir()?;
    let mut session = Session::new(Workspace::new(dir.path()))
        .with_extract_options(extract_options)
        .with_compose_options(compose_options);

    let pb = spinner("Extracting content...");
    let uploaded = session.upload(&data);
    pb.finish_and_clear();

    let extraction = uploaded?;
    warn_skipped(extraction);
    if let Some(ref e) = extraction.error {
        if extraction.content.is_empty() {
            return Err(e.to_string().into());
        }
        eprintln!("{}: {} (showing partial content)", "Warning".yellow(), e);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    let chosen = choose(&session, &mut input, &mut out)?;
    for index in chosen {
        session.set_included(index, true)?;
    }

    if session.selection().is_empty() {
        println!("{}", "No images selected.".yellow());
    }
    if !ask(&mut input, &mut out, "Create PDF?", true)? {
        return Ok(());
    }

    let pb = spinner("Creating PDF...");
    let created = session.create_pdf();
    pb.finish_and_clear();
    let download = created?;

    fs::copy(&download.path, output)?;
    println!(
        "{}: {} ({}, {} pages, {} images)",
        download.label.green().bold(),
        output.display(),
        download.mime_type,
        download.report.pages,
        download.report.images
    );
    Ok(())
}

/// Print every entry and return the indices of the images the user keeps.
fn choose<R: BufRead, W: Write>(
    session: &Session,
    input: &mut R,
    out: &mut W,
) -> io::Result<Vec<usize>> {
    let mut chosen = Vec::new();
    let mut current_page = None;

    for entry in session.entries() {
        match entry {
            Entry::Text { page, text, .. } => {
                if current_page != Some(page) {
                    current_page = Some(page);
                    writeln!(out, "{}", format!("=== Page {} ===", page).cyan().bold())?;
                }
                let text = text.trim_end();
                if !text.is_empty() {
                    writeln!(out, "{}", text)?;
                }
            }
            Entry::Image {
                index,
                page,
                image,
                toggle,
            } => {
                if current_page != Some(page) {
                    current_page = Some(page);
                    writeln!(out, "{}", format!("=== Page {} ===", page).cyan().bold())?;
                }
                writeln!(
                    out,
                    "{}",
                    format!("[image {}x{}]", image.width(), image.height()).dimmed()
                )?;
                if ask(input, out, &toggle.label, toggle.checked)? {
                    chosen.push(index);
                }
            }
        }
    }

    Ok(chosen)
}

/// Ask a yes/no question. Empty input or end of input takes `default`.
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    question: &str,
    default: bool,
) -> io::Result<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(out, "{}? {} ", question.trim_end_matches('?'), hint)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(default);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(out, "Please answer y or n.")?,
        }
    }
}
