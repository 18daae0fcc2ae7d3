use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use pdftext_core::config_file::{self, ConfigFile};
use pdftext_core::{
    DocumentInput, ExtractOptions, Extraction, NormalizeOption, NormalizeSpec, OutputMode,
    PdfExtractor,
};
use pdftext_mupdf::MupdfEngine;
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Extract text and metadata from PDF documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from a PDF file, or from stdin with `-`
    Extract {
        /// Path to the PDF file, or `-` to read the document from stdin
        file: PathBuf,

        /// Password for a protected document
        #[arg(long)]
        password: Option<String>,

        /// First page to extract (1-based, inclusive)
        #[arg(long)]
        page_start: Option<i64>,

        /// Last page to extract (1-based, inclusive)
        #[arg(long)]
        page_end: Option<i64>,

        /// Print all pages as one text instead of a structured result
        #[arg(long)]
        text: bool,

        /// Separator placed between pages with --text (default: newline)
        #[arg(long)]
        separator: Option<String>,

        /// Normalize line endings, blank lines, spaces and line edges
        #[arg(long)]
        normalize: bool,

        /// Keep runs of blank lines (implies --normalize)
        #[arg(long)]
        no_collapse_blank_lines: bool,

        /// Keep runs of spaces and tabs (implies --normalize)
        #[arg(long)]
        no_collapse_spaces: bool,

        /// Keep leading and trailing whitespace on lines (implies --normalize)
        #[arg(long)]
        no_trim_lines: bool,

        /// Output format for structured results
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Write output to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Time repeated extractions of a file, from its path and from memory
    Bench {
        /// Path to the PDF file
        file: PathBuf,

        /// Number of runs per input kind
        #[arg(long, default_value_t = 3)]
        runs: usize,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the resolved configuration
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Plain,
}

/// Flags of the `extract` command that shape [`ExtractOptions`].
#[derive(Debug, Default)]
struct ExtractFlags {
    password: Option<String>,
    page_start: Option<i64>,
    page_end: Option<i64>,
    text: bool,
    separator: Option<String>,
    normalize: bool,
    no_collapse_blank_lines: bool,
    no_collapse_spaces: bool,
    no_trim_lines: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Extract {
            file,
            password,
            page_start,
            page_end,
            text,
            separator,
            normalize,
            no_collapse_blank_lines,
            no_collapse_spaces,
            no_trim_lines,
            format,
            output,
            no_color,
        } => {
            let config = config_file::load_config();
            let flags = ExtractFlags {
                password,
                page_start,
                page_end,
                text,
                separator,
                normalize,
                no_collapse_blank_lines,
                no_collapse_spaces,
                no_trim_lines,
            };
            let options = build_options(&config, flags);
            let format = format
                .or_else(|| config.format().and_then(|f| Format::from_str(f, true).ok()))
                .unwrap_or(Format::Json);
            extract(&file, &options, format, output, no_color)
        }
        Command::Bench {
            file,
            runs,
            no_color,
        } => bench(&file, runs, no_color),
        Command::Config => {
            let config = config_file::load_config();
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve options: CLI flags > config file > defaults.
fn build_options(config: &ConfigFile, flags: ExtractFlags) -> ExtractOptions {
    let mut options = config.extract_options();

    if let Some(password) = flags.password {
        options.password = Some(password);
    }
    if let Some(page) = flags.page_start {
        options.page_start = Some(page);
    }
    if let Some(page) = flags.page_end {
        options.page_end = Some(page);
    }
    if flags.text {
        options.output_mode = OutputMode::Text;
    }
    if let Some(separator) = flags.separator {
        options.separator = Some(separator);
    }

    let wants_normalize = flags.normalize
        || flags.no_collapse_blank_lines
        || flags.no_collapse_spaces
        || flags.no_trim_lines;
    if wants_normalize {
        let mut spec = options.normalize_spec().unwrap_or_default();
        if flags.no_collapse_blank_lines {
            spec.collapse_blank_lines = false;
        }
        if flags.no_collapse_spaces {
            spec.collapse_spaces = false;
        }
        if flags.no_trim_lines {
            spec.trim_lines = false;
        }
        options.normalize = Some(NormalizeOption::Custom(spec));
    }

    options
}

fn read_input(file: &Path) -> anyhow::Result<DocumentInput> {
    if file.as_os_str() == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        tracing::debug!(len = bytes.len(), "read document from stdin");
        Ok(DocumentInput::Bytes(bytes))
    } else {
        Ok(DocumentInput::Path(file.to_path_buf()))
    }
}

fn extract(
    file: &Path,
    options: &ExtractOptions,
    format: Format,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let use_color = !no_color && output.is_none() && std::io::stdout().is_terminal();
    let color = ColorMode(use_color);

    let input = read_input(file)?;
    let engine = MupdfEngine::new();
    let extraction = PdfExtractor::new().extract(input, options, &engine)?;

    let mut writer: Box<dyn Write> = if let Some(ref output_path) = output {
        Box::new(std::fs::File::create(output_path)?)
    } else {
        Box::new(std::io::stdout().lock())
    };

    match extraction {
        Extraction::Text(text) => output::print_text(&mut writer, &text)?,
        Extraction::Structured(result) => match format {
            Format::Json => output::print_json(&mut writer, &result)?,
            Format::Plain => output::print_plain(&mut writer, &result, color)?,
        },
    }
    writer.flush()?;
    Ok(())
}

fn bench(file: &Path, runs: usize, no_color: bool) -> anyhow::Result<()> {
    let color = ColorMode(!no_color && std::io::stdout().is_terminal());
    let mut w = std::io::stdout().lock();

    let data = std::fs::read(file)
        .map_err(|e| anyhow::anyhow!("Benchmark file not found: {} ({})", file.display(), e))?;
    let engine = MupdfEngine::new();
    let extractor = PdfExtractor::new();
    let options = ExtractOptions::default();

    writeln!(w, "Benchmark pdftext")?;
    writeln!(w, "File: {}", file.display())?;

    let mut path_runs = Vec::with_capacity(runs);
    for i in 0..runs {
        let start = Instant::now();
        let result = extractor.extract_structured(file, &options, &engine)?;
        let elapsed = start.elapsed();
        output::print_bench_run(
            &mut w,
            &format!("Run {} (path)", i + 1),
            elapsed,
            result.pages.len(),
            color,
        )?;
        path_runs.push(elapsed);
    }

    let mut buffer_runs = Vec::with_capacity(runs);
    for i in 0..runs {
        let start = Instant::now();
        let result = extractor.extract_structured(data.clone(), &options, &engine)?;
        let elapsed = start.elapsed();
        output::print_bench_run(
            &mut w,
            &format!("Run {} (buffer)", i + 1),
            elapsed,
            result.pages.len(),
            color,
        )?;
        buffer_runs.push(elapsed);
    }

    output::print_bench_summary(&mut w, "path", &path_runs, color)?;
    output::print_bench_summary(&mut w, "buffer", &buffer_runs, color)?;
    Ok(())
}
