//! CLI tool for extracting slide text, speaker notes and comments from
//! PowerPoint files.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use xtract_core::Extraction;
use xtract_pptx::PptxExtractor;
use xtract_render::OutputFormat;

/// Extract slide text, speaker notes and comments from a .pptx file.
#[derive(Parser, Debug)]
#[command(name = "ppt-xtract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output format: docx, md, rtf or json
    #[arg(default_value = "docx", value_parser = parse_format)]
    format: OutputFormat,

    /// Leave slide comments out of the output
    #[arg(long)]
    no_comments: bool,

    /// Wrap Markdown body lines at WIDTH characters (0 disables wrapping)
    #[arg(long, value_name = "WIDTH", default_value = "0")]
    wrap_text: usize,

    /// Output file (default: input file with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.verbose {
        eprintln!("Processing: {}", args.input.display());
    }

    let extraction = PptxExtractor::new()
        .with_comments(!args.no_comments)
        .extract_path(&args.input)
        .with_context(|| format!("Failed to extract {}", args.input.display()))?;

    if args.verbose {
        eprintln!("  Found {} slides", extraction.slide_count());
        if !extraction.warnings.is_empty() {
            eprintln!("  {} parts could not be read", extraction.warnings.len());
        }
    }

    let output_path = get_output_path(&args.input, args.output.as_deref(), args.format);
    write_output(&output_path, &extraction, args.format, args.wrap_text)?;

    if args.verbose {
        eprintln!("Written to: {}", output_path.display());
    }

    Ok(())
}

/// Determine the output path: the explicit one, or the input path with the
/// format's extension.
fn get_output_path(input_path: &Path, output: Option<&Path>, format: OutputFormat) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => input_path.with_extension(format.extension()),
    }
}

/// Render the extraction into a file.
fn write_output(
    path: &Path,
    extraction: &Extraction,
    format: OutputFormat,
    wrap_width: usize,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    format
        .renderer(wrap_width)
        .render(extraction, &mut writer)
        .with_context(|| format!("Failed to write {} output", format))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
