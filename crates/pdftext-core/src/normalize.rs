use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Toggles for the normalization pipeline.
///
/// Every toggle defaults to enabled, both in [`Default`] and when a key is
/// omitted from a deserialized record. The short keys `newlines`, `spaces`
/// and `trim` are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizeSpec {
    /// Collapse runs of newlines into one.
    #[serde(alias = "newlines", alias = "collapse_blank_lines")]
    pub collapse_blank_lines: bool,
    /// Collapse runs of spaces, tabs, vertical tabs and form feeds into one space.
    #[serde(alias = "spaces", alias = "collapse_spaces")]
    pub collapse_spaces: bool,
    /// Trim every line, then the whole text.
    #[serde(alias = "trim", alias = "trim_lines")]
    pub trim_lines: bool,
}

impl Default for NormalizeSpec {
    fn default() -> Self {
        Self {
            collapse_blank_lines: true,
            collapse_spaces: true,
            trim_lines: true,
        }
    }
}

impl NormalizeSpec {
    /// All steps disabled; only line endings are canonicalized.
    pub fn none() -> Self {
        Self {
            collapse_blank_lines: false,
            collapse_spaces: false,
            trim_lines: false,
        }
    }
}

static LINE_ENDING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r").unwrap());
static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x0B\x0C]+").unwrap());

/// Normalize extracted text.
///
/// With `spec = None` the input is returned untouched. Otherwise the steps
/// run in a fixed order, each on the output of the previous one:
///
/// 1. `\r\n` and lone `\r` become `\n` (always).
/// 2. `collapse_blank_lines`: `\n\n+` → `\n`.
/// 3. `collapse_spaces`: `[ \t\v\f]+` → one space.
/// 4. `trim_lines`: trim each line, rejoin with `\n`, trim the whole text.
///    Lines left empty by trimming are collapsed again when
///    `collapse_blank_lines` is on, so normalizing twice gives the same text.
///    This extra pass departs from a plain four-step run: `"a\n \nb"` becomes
///    `"a\nb"` with every step on, not `"a\n\nb"`.
pub fn normalize<'a>(text: &'a str, spec: Option<&NormalizeSpec>) -> Cow<'a, str> {
    let Some(spec) = spec else {
        return Cow::Borrowed(text);
    };

    let mut out = LINE_ENDING_RE.replace_all(text, "\n");

    if spec.collapse_blank_lines {
        out = collapse_blank_lines(out);
    }

    if spec.collapse_spaces {
        out = match out {
            Cow::Borrowed(s) => HSPACE_RE.replace_all(s, " "),
            Cow::Owned(s) => Cow::Owned(HSPACE_RE.replace_all(&s, " ").into_owned()),
        };
    }

    if spec.trim_lines {
        let trimmed = out
            .split('\n')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        out = Cow::Owned(trimmed);
        if spec.collapse_blank_lines {
            out = collapse_blank_lines(out);
        }
    }

    out
}

fn collapse_blank_lines(text: Cow<'_, str>) -> Cow<'_, str> {
    match text {
        Cow::Borrowed(s) => BLANK_LINES_RE.replace_all(s, "\n"),
        Cow::Owned(s) => Cow::Owned(BLANK_LINES_RE.replace_all(&s, "\n").into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only(blank: bool, spaces: bool, trim: bool) -> NormalizeSpec {
        NormalizeSpec {
            collapse_blank_lines: blank,
            collapse_spaces: spaces,
            trim_lines: trim,
        }
    }

    #[test]
    fn test_absent_spec_is_identity() {
        for text in ["", "a\r\n\r\nb", "  x \t y  ", "\n\n\n"] {
            let out = normalize(text, None);
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(out, text);
        }
    }

    #[test]
    fn test_line_endings_always_canonicalized() {
        assert_eq!(
            normalize("a\r\nb\rc\n", Some(&NormalizeSpec::none())),
            "a\nb\nc\n"
        );
    }

    #[test]
    fn test_unchanged_text_is_borrowed_without_trim() {
        let out = normalize("plain\ntext", Some(&only(true, true, false)));
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, "plain\ntext");
    }

    #[test]
    fn test_clean_text_unchanged_with_all_steps() {
        let out = normalize("plain", Some(&NormalizeSpec::default()));
        assert_eq!(out, "plain");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(
            normalize("a\n\n\n\nb", Some(&only(true, false, false))),
            "a\nb"
        );
    }

    #[test]
    fn test_collapse_blank_lines_after_crlf() {
        assert_eq!(
            normalize("a\r\n\r\n\r\nb", Some(&only(true, false, false))),
            "a\nb"
        );
    }

    #[test]
    fn test_collapse_spaces() {
        assert_eq!(
            normalize("a   b\tc", Some(&only(false, true, false))),
            "a b c"
        );
    }

    #[test]
    fn test_collapse_spaces_keeps_newlines() {
        assert_eq!(
            normalize("a \x0B\x0C b\n\n  c", Some(&only(false, true, false))),
            "a b\n\n c"
        );
    }

    #[test]
    fn test_trim_lines() {
        assert_eq!(
            normalize("  a  \n  b  ", Some(&only(false, false, true))),
            "a\nb"
        );
    }

    #[test]
    fn test_trim_lines_strips_outer_newlines() {
        assert_eq!(
            normalize("\n\n  a \n b\n\n", Some(&only(false, false, true))),
            "a\nb"
        );
    }

    #[test]
    fn test_trim_without_blank_collapse_keeps_empty_lines() {
        assert_eq!(
            normalize("a\n   \nb", Some(&only(false, false, true))),
            "a\n\nb"
        );
    }

    #[test]
    fn test_full_pipeline() {
        let raw = "  Title\r\n\r\n\r\n  body   text\there \n\n\n  end  ";
        assert_eq!(
            normalize(raw, Some(&NormalizeSpec::default())),
            "Title\nbody text here\nend"
        );
    }

    #[test]
    fn test_whitespace_only_lines_removed_when_all_enabled() {
        assert_eq!(
            normalize("a\n \t \nb", Some(&NormalizeSpec::default())),
            "a\nb"
        );
    }

    #[test]
    fn test_idempotent_with_all_enabled() {
        let spec = NormalizeSpec::default();
        let samples = [
            "",
            "a\n \nb",
            "\u{a0}\n x \u{a0}\n\n\ty",
            "  a\r\n\r\n b\t\tc \r d  ",
            "\n\n\n",
            "one\u{2028}two  \x0C three",
        ];
        for text in samples {
            let once = normalize(text, Some(&spec)).into_owned();
            let twice = normalize(&once, Some(&spec)).into_owned();
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn test_default_spec_enables_everything() {
        let spec = NormalizeSpec::default();
        assert!(spec.collapse_blank_lines && spec.collapse_spaces && spec.trim_lines);
    }

    #[test]
    fn test_deserialize_record_defaults() {
        let spec: NormalizeSpec = serde_json::from_str(r#"{"trimLines":false}"#).unwrap();
        assert_eq!(spec, only(true, true, false));
        let spec: NormalizeSpec = serde_json::from_str(r#"{"spaces":false}"#).unwrap();
        assert_eq!(spec, only(true, false, true));
    }
}
