use std::io::Write;
use std::time::Duration;

use owo_colors::OwoColorize;
use pdftext_core::ExtractionResult;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a structured result as pretty JSON.
pub fn print_json(w: &mut dyn Write, result: &ExtractionResult) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, result)?;
    writeln!(w)?;
    Ok(())
}

/// Print a structured result as a metadata header followed by each page.
pub fn print_plain(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let meta = &result.metadata;
    let or_none = |s: &str| {
        if s.is_empty() {
            "(none)".to_string()
        } else {
            s.to_string()
        }
    };

    writeln!(w, "Title:  {}", or_none(&meta.title))?;
    writeln!(w, "Author: {}", or_none(&meta.author))?;
    writeln!(
        w,
        "Pages:  {} of {} extracted",
        result.pages.len(),
        meta.page_count
    )?;

    for page in &result.pages {
        writeln!(w)?;
        let header = format!("--- Page {} ---", page.page_number);
        if color.enabled() {
            writeln!(w, "{}", header.bold().cyan())?;
        } else {
            writeln!(w, "{}", header)?;
        }
        write!(w, "{}", page.text)?;
        if !page.text.ends_with('\n') {
            writeln!(w)?;
        }
    }
    Ok(())
}

/// Print flattened text as-is, with a trailing newline.
pub fn print_text(w: &mut dyn Write, text: &str) -> std::io::Result<()> {
    write!(w, "{}", text)?;
    if !text.ends_with('\n') {
        writeln!(w)?;
    }
    Ok(())
}

/// Print one benchmark run.
pub fn print_bench_run(
    w: &mut dyn Write,
    label: &str,
    elapsed: Duration,
    pages: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let ms = format!("{:.2} ms", elapsed.as_secs_f64() * 1000.0);
    if color.enabled() {
        writeln!(w, "{}: {}, pages={}", label, ms.green(), pages)
    } else {
        writeln!(w, "{}: {}, pages={}", label, ms, pages)
    }
}

/// Print the mean of a set of benchmark runs.
pub fn print_bench_summary(
    w: &mut dyn Write,
    label: &str,
    runs: &[Duration],
    color: ColorMode,
) -> std::io::Result<()> {
    if runs.is_empty() {
        return Ok(());
    }
    let total: Duration = runs.iter().sum();
    let mean_ms = total.as_secs_f64() * 1000.0 / runs.len() as f64;
    let line = format!("{} mean: {:.2} ms over {} runs", label, mean_ms, runs.len());
    if color.enabled() {
        writeln!(w, "{}", line.bold())
    } else {
        writeln!(w, "{}", line)
    }
}
