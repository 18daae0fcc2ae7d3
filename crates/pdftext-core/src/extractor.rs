use crate::backend::PdfEngine;
use crate::input::{DocumentInput, FsProbe, PathProbe, validate_with};
use crate::normalize::normalize;
use crate::options::{ExtractOptions, OutputMode, translate};
use crate::{ExtractError, Extraction, ExtractionResult};

/// Runs the extraction pipeline: validate the input, translate options, call
/// the engine once, normalize page text and shape the output.
///
/// Holds no per-call state; one extractor can serve any number of calls,
/// from any number of threads.
pub struct PdfExtractor {
    probe: Box<dyn PathProbe>,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            probe: Box::new(FsProbe),
        }
    }
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom probe for the filesystem check on path inputs.
    pub fn with_probe(mut self, probe: impl PathProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Extract and return the shape selected by `options.output_mode`.
    pub fn extract(
        &self,
        input: impl Into<DocumentInput>,
        options: &ExtractOptions,
        engine: &dyn PdfEngine,
    ) -> Result<Extraction, ExtractError> {
        let result = self.run(input.into(), options, engine)?;
        Ok(match options.output_mode {
            OutputMode::Structured => Extraction::Structured(result),
            OutputMode::Text => Extraction::Text(flatten(&result, options.separator())),
        })
    }

    /// Extract metadata and per-page text, ignoring `options.output_mode`.
    pub fn extract_structured(
        &self,
        input: impl Into<DocumentInput>,
        options: &ExtractOptions,
        engine: &dyn PdfEngine,
    ) -> Result<ExtractionResult, ExtractError> {
        self.run(input.into(), options, engine)
    }

    /// Extract page texts joined with `options.separator()`, ignoring
    /// `options.output_mode`.
    pub fn extract_text(
        &self,
        input: impl Into<DocumentInput>,
        options: &ExtractOptions,
        engine: &dyn PdfEngine,
    ) -> Result<String, ExtractError> {
        let result = self.run(input.into(), options, engine)?;
        Ok(flatten(&result, options.separator()))
    }

    fn run(
        &self,
        input: DocumentInput,
        options: &ExtractOptions,
        engine: &dyn PdfEngine,
    ) -> Result<ExtractionResult, ExtractError> {
        let doc = validate_with(input, self.probe.as_ref())?;
        let engine_options = translate(options);

        tracing::debug!(
            engine = engine.name(),
            has_password = engine_options.password.is_some(),
            page_start = ?engine_options.page_start,
            page_end = ?engine_options.page_end,
            "invoking extraction engine"
        );

        // Omit the options argument entirely when nothing would be forwarded,
        // so the engine takes its own default path.
        let mut result = if engine_options.is_empty() {
            engine.extract(&doc, None)?
        } else {
            engine.extract(&doc, Some(&engine_options))?
        };

        if let Some(spec) = options.normalize_spec() {
            for page in &mut result.pages {
                page.text = normalize(&page.text, Some(&spec)).into_owned();
            }
        }

        tracing::debug!(
            engine = engine.name(),
            pages = result.pages.len(),
            page_count = result.metadata.page_count,
            "extraction finished"
        );

        Ok(result)
    }
}

fn flatten(result: &ExtractionResult, separator: &str) -> String {
    result
        .pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Extract a document with the default filesystem probe.
///
/// Returns [`Extraction::Text`] when `options.output_mode` is
/// [`OutputMode::Text`], otherwise [`Extraction::Structured`].
pub fn extract(
    input: impl Into<DocumentInput>,
    options: &ExtractOptions,
    engine: &dyn PdfEngine,
) -> Result<Extraction, ExtractError> {
    PdfExtractor::new().extract(input, options, engine)
}

/// Extract metadata and per-page text.
pub fn extract_structured(
    input: impl Into<DocumentInput>,
    options: &ExtractOptions,
    engine: &dyn PdfEngine,
) -> Result<ExtractionResult, ExtractError> {
    PdfExtractor::new().extract_structured(input, options, engine)
}

/// Extract all selected pages as one string.
pub fn extract_text(
    input: impl Into<DocumentInput>,
    options: &ExtractOptions,
    engine: &dyn PdfEngine,
) -> Result<String, ExtractError> {
    PdfExtractor::new().extract_text(input, options, engine)
}
