//! Caller-facing extraction options and their translation into the minimal
//! option set an engine understands.

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizeSpec;

/// Shape of the value returned by [`crate::extract`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Metadata plus per-page text.
    #[default]
    Structured,
    /// Page texts joined with the separator; metadata dropped.
    Text,
}

/// Normalization request: a boolean shorthand or an explicit set of toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizeOption {
    /// `true` enables every step, `false` disables normalization.
    Enabled(bool),
    Custom(NormalizeSpec),
}

impl NormalizeOption {
    /// The normalization steps to run, or `None` when normalization is off.
    pub fn resolve(&self) -> Option<NormalizeSpec> {
        match self {
            NormalizeOption::Enabled(true) => Some(NormalizeSpec::default()),
            NormalizeOption::Enabled(false) => None,
            NormalizeOption::Custom(spec) => Some(*spec),
        }
    }
}

impl From<bool> for NormalizeOption {
    fn from(enabled: bool) -> Self {
        NormalizeOption::Enabled(enabled)
    }
}

impl From<NormalizeSpec> for NormalizeOption {
    fn from(spec: NormalizeSpec) -> Self {
        NormalizeOption::Custom(spec)
    }
}

/// Options accepted by the extraction entry points.
///
/// Every field is optional. When deserialized, malformed values are treated
/// as absent rather than rejected: a non-string password, a fractional page
/// bound or an unknown output mode simply fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawExtractOptions", rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Password for protected documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// First page to extract (1-based, inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start: Option<i64>,
    /// Last page to extract (1-based, inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<i64>,
    pub output_mode: OutputMode,
    /// Joins page texts in [`OutputMode::Text`]. Defaults to `"\n"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<NormalizeOption>,
}

/// Wire form of [`ExtractOptions`]. `outputMode` and the legacy `return` key
/// are read separately; `outputMode` wins when both carry a known mode.
#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawExtractOptions {
    #[serde(deserialize_with = "lenient::string")]
    password: Option<String>,
    #[serde(deserialize_with = "lenient::integer")]
    page_start: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    page_end: Option<i64>,
    #[serde(deserialize_with = "lenient::output_mode")]
    output_mode: Option<OutputMode>,
    #[serde(rename = "return", deserialize_with = "lenient::output_mode")]
    legacy_return: Option<OutputMode>,
    #[serde(deserialize_with = "lenient::string")]
    separator: Option<String>,
    #[serde(deserialize_with = "lenient::normalize")]
    normalize: Option<NormalizeOption>,
}

impl From<RawExtractOptions> for ExtractOptions {
    fn from(raw: RawExtractOptions) -> Self {
        Self {
            password: raw.password,
            page_start: raw.page_start,
            page_end: raw.page_end,
            output_mode: raw.output_mode.or(raw.legacy_return).unwrap_or_default(),
            separator: raw.separator,
            normalize: raw.normalize,
        }
    }
}

pub const DEFAULT_SEPARATOR: &str = "\n";

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_page_start(mut self, page: i64) -> Self {
        self.page_start = Some(page);
        self
    }

    pub fn with_page_end(mut self, page: i64) -> Self {
        self.page_end = Some(page);
        self
    }

    /// Select an inclusive 1-based page range.
    pub fn with_pages(self, start: i64, end: i64) -> Self {
        self.with_page_start(start).with_page_end(end)
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_normalize(mut self, normalize: impl Into<NormalizeOption>) -> Self {
        self.normalize = Some(normalize.into());
        self
    }

    /// Separator used in text mode.
    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR)
    }

    /// Resolved normalization spec, `None` when normalization is off.
    pub fn normalize_spec(&self) -> Option<NormalizeSpec> {
        self.normalize.as_ref().and_then(NormalizeOption::resolve)
    }
}

/// The subset of options an engine understands.
///
/// Only meaningful values are present; an absent key means "engine default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_end: Option<i64>,
}

impl EngineOptions {
    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        self.password.is_none() && self.page_start.is_none() && self.page_end.is_none()
    }
}

/// Translate caller options into engine options.
///
/// Empty passwords and zero page bounds are dropped. Ranges are not checked
/// here: `start > end` and out-of-document bounds reach the engine as given.
pub fn translate(options: &ExtractOptions) -> EngineOptions {
    EngineOptions {
        password: options.password.clone().filter(|p| !p.is_empty()),
        page_start: options.page_start.filter(|&n| n != 0),
        page_end: options.page_end.filter(|&n| n != 0),
    }
}

/// Deserializers that map malformed values to "absent".
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    use super::{NormalizeOption, OutputMode};
    use crate::normalize::NormalizeSpec;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Number(n) = Value::deserialize(deserializer)? else {
            return Ok(None);
        };
        if let Some(i) = n.as_i64() {
            return Ok(Some(i));
        }
        Ok(n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64))
    }

    /// `"text"` or `"structured"`; anything else is absent.
    pub fn output_mode<'de, D>(deserializer: D) -> Result<Option<OutputMode>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if s == "text" => Some(OutputMode::Text),
            Value::String(s) if s == "structured" => Some(OutputMode::Structured),
            _ => None,
        })
    }

    /// Objects become a [`NormalizeSpec`]; any other truthy value enables
    /// every step, falsy values leave normalization off.
    pub fn normalize<'de, D>(deserializer: D) -> Result<Option<NormalizeOption>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::Bool(b) => Some(NormalizeOption::Enabled(b)),
            Value::Object(map) => Some(NormalizeOption::Custom(NormalizeSpec {
                collapse_blank_lines: toggle(
                    &map,
                    &["collapseBlankLines", "collapse_blank_lines", "newlines"],
                ),
                collapse_spaces: toggle(&map, &["collapseSpaces", "collapse_spaces", "spaces"]),
                trim_lines: toggle(&map, &["trimLines", "trim_lines", "trim"]),
            })),
            Value::Number(n) => Some(NormalizeOption::Enabled(n.as_f64() != Some(0.0))),
            Value::String(s) => Some(NormalizeOption::Enabled(!s.is_empty())),
            Value::Array(_) => Some(NormalizeOption::Enabled(true)),
        })
    }

    /// A step stays on unless one of its keys is exactly `false`.
    fn toggle(map: &Map<String, Value>, keys: &[&str]) -> bool {
        !keys
            .iter()
            .any(|key| matches!(map.get(*key), Some(Value::Bool(false))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_empty_options() {
        let engine = translate(&ExtractOptions::default());
        assert!(engine.is_empty());
        assert_eq!(engine, EngineOptions::default());
    }

    #[test]
    fn test_translate_forwards_meaningful_values() {
        let opts = ExtractOptions::new().with_password("secret").with_pages(2, 4);
        let engine = translate(&opts);
        assert_eq!(engine.password.as_deref(), Some("secret"));
        assert_eq!(engine.page_start, Some(2));
        assert_eq!(engine.page_end, Some(4));
        assert!(!engine.is_empty());
    }

    #[test]
    fn test_translate_drops_empty_password_and_zero_pages() {
        let opts = ExtractOptions::new().with_password("").with_pages(0, 0);
        assert!(translate(&opts).is_empty());
    }

    #[test]
    fn test_translate_passes_inverted_range_through() {
        let opts = ExtractOptions::new().with_pages(5, 2);
        let engine = translate(&opts);
        assert_eq!(engine.page_start, Some(5));
        assert_eq!(engine.page_end, Some(2));
    }

    #[test]
    fn test_translate_ignores_output_settings() {
        let opts = ExtractOptions::new()
            .with_output_mode(OutputMode::Text)
            .with_separator(" | ")
            .with_normalize(true);
        assert!(translate(&opts).is_empty());
    }

    #[test]
    fn test_engine_options_serialize_only_present_keys() {
        let engine = EngineOptions {
            page_start: Some(1),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&engine).unwrap(), r#"{"pageStart":1}"#);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let opts: ExtractOptions = serde_json::from_str(
            r#"{"password":"pw","pageStart":1,"pageEnd":3,"outputMode":"text","separator":" | "}"#,
        )
        .unwrap();
        assert_eq!(opts.password.as_deref(), Some("pw"));
        assert_eq!(opts.page_start, Some(1));
        assert_eq!(opts.page_end, Some(3));
        assert_eq!(opts.output_mode, OutputMode::Text);
        assert_eq!(opts.separator(), " | ");
    }

    #[test]
    fn test_deserialize_legacy_return_key() {
        let opts: ExtractOptions = serde_json::from_str(r#"{"return":"text"}"#).unwrap();
        assert_eq!(opts.output_mode, OutputMode::Text);
    }

    #[test]
    fn test_deserialize_lenient_values() {
        let opts: ExtractOptions = serde_json::from_str(
            r#"{"password":42,"pageStart":1.5,"pageEnd":"3","outputMode":"xml","separator":7}"#,
        )
        .unwrap();
        assert_eq!(opts, ExtractOptions::default());
        assert_eq!(opts.separator(), "\n");
    }

    #[test]
    fn test_deserialize_whole_float_page() {
        let opts: ExtractOptions = serde_json::from_str(r#"{"pageStart":2.0}"#).unwrap();
        assert_eq!(opts.page_start, Some(2));
    }

    #[test]
    fn test_deserialize_normalize_forms() {
        let on: ExtractOptions = serde_json::from_str(r#"{"normalize":true}"#).unwrap();
        assert_eq!(on.normalize_spec(), Some(NormalizeSpec::default()));

        let off: ExtractOptions = serde_json::from_str(r#"{"normalize":false}"#).unwrap();
        assert_eq!(off.normalize_spec(), None);

        let custom: ExtractOptions =
            serde_json::from_str(r#"{"normalize":{"collapseSpaces":false}}"#).unwrap();
        assert_eq!(
            custom.normalize_spec(),
            Some(NormalizeSpec {
                collapse_blank_lines: true,
                collapse_spaces: false,
                trim_lines: true,
            })
        );

        let short_keys: ExtractOptions =
            serde_json::from_str(r#"{"normalize":{"newlines":false,"trim":false}}"#).unwrap();
        assert_eq!(
            short_keys.normalize_spec(),
            Some(NormalizeSpec {
                collapse_blank_lines: false,
                collapse_spaces: true,
                trim_lines: false,
            })
        );

        let empty_string: ExtractOptions =
            serde_json::from_str(r#"{"normalize":""}"#).unwrap();
        assert_eq!(empty_string.normalize_spec(), None);
    }

    #[test]
    fn test_deserialize_normalize_record_is_lenient() {
        let zero_trim: ExtractOptions =
            serde_json::from_str(r#"{"normalize":{"trim":0}}"#).unwrap();
        assert_eq!(zero_trim.normalize_spec(), Some(NormalizeSpec::default()));

        let null_spaces: ExtractOptions =
            serde_json::from_str(r#"{"normalize":{"spaces":null,"newlines":"no"}}"#).unwrap();
        assert_eq!(null_spaces.normalize_spec(), Some(NormalizeSpec::default()));

        let mixed: ExtractOptions = serde_json::from_str(
            r#"{"normalize":{"collapseBlankLines":false,"spaces":false,"trimLines":1}}"#,
        )
        .unwrap();
        assert_eq!(
            mixed.normalize_spec(),
            Some(NormalizeSpec {
                collapse_blank_lines: false,
                collapse_spaces: false,
                trim_lines: true,
            })
        );
    }

    #[test]
    fn test_deserialize_output_mode_and_return_together() {
        let both: ExtractOptions =
            serde_json::from_str(r#"{"outputMode":"text","return":"text"}"#).unwrap();
        assert_eq!(both.output_mode, OutputMode::Text);

        let mode_wins: ExtractOptions =
            serde_json::from_str(r#"{"outputMode":"structured","return":"text"}"#).unwrap();
        assert_eq!(mode_wins.output_mode, OutputMode::Structured);

        let unknown_mode: ExtractOptions =
            serde_json::from_str(r#"{"outputMode":"xml","return":"text"}"#).unwrap();
        assert_eq!(unknown_mode.output_mode, OutputMode::Text);
    }

    #[test]
    fn test_serialize_round_trips_through_lenient_form() {
        let opts = ExtractOptions::new()
            .with_pages(2, 3)
            .with_output_mode(OutputMode::Text)
            .with_normalize(NormalizeSpec {
                collapse_blank_lines: true,
                collapse_spaces: false,
                trim_lines: true,
            });
        let json = serde_json::to_string(&opts).unwrap();
        let back: ExtractOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
    }
}
