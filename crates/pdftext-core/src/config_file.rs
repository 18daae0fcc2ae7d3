use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizeSpec;
use crate::options::{ExtractOptions, NormalizeOption, OutputMode};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extract: Option<ExtractConfig>,
    pub normalize: Option<NormalizeConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub separator: Option<String>,
    /// `"structured"` or `"text"`.
    pub output_mode: Option<String>,
    /// Output format for structured results: `"json"` or `"plain"`.
    pub format: Option<String>,
}

/// Presence of a `[normalize]` table turns normalization on; omitted toggles
/// default to enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    pub enabled: Option<bool>,
    pub collapse_blank_lines: Option<bool>,
    pub collapse_spaces: Option<bool>,
    pub trim_lines: Option<bool>,
}

impl NormalizeConfig {
    /// The normalization steps this table enables, or `None` when explicitly disabled.
    pub fn spec(&self) -> Option<NormalizeSpec> {
        if self.enabled == Some(false) {
            return None;
        }
        Some(NormalizeSpec {
            collapse_blank_lines: self.collapse_blank_lines.unwrap_or(true),
            collapse_spaces: self.collapse_spaces.unwrap_or(true),
            trim_lines: self.trim_lines.unwrap_or(true),
        })
    }
}

impl ConfigFile {
    /// Default extraction options described by this config.
    pub fn extract_options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::default();
        if let Some(extract) = &self.extract {
            options.separator = extract.separator.clone();
            if extract.output_mode.as_deref() == Some("text") {
                options.output_mode = OutputMode::Text;
            }
        }
        if let Some(spec) = self.normalize.as_ref().and_then(NormalizeConfig::spec) {
            options.normalize = Some(NormalizeOption::Custom(spec));
        }
        options
    }

    /// Configured structured-output format, if any.
    pub fn format(&self) -> Option<&str> {
        self.extract.as_ref().and_then(|e| e.format.as_deref())
    }
}

/// Platform config directory path: `<config_dir>/pdftext/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdftext").join("config.toml"))
}

/// Load config by cascading CWD `.pdftext.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdftext.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "loaded config");
            Some(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let extract = match (base.extract, overlay.extract) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(ExtractConfig {
                separator: o.separator.or(b.separator),
                output_mode: o.output_mode.or(b.output_mode),
                format: o.format.or(b.format),
            })
        }
    };
    let normalize = match (base.normalize, overlay.normalize) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(NormalizeConfig {
                enabled: o.enabled.or(b.enabled),
                collapse_blank_lines: o.collapse_blank_lines.or(b.collapse_blank_lines),
                collapse_spaces: o.collapse_spaces.or(b.collapse_spaces),
                trim_lines: o.trim_lines.or(b.trim_lines),
            })
        }
    };
    ConfigFile { extract, normalize }
}
