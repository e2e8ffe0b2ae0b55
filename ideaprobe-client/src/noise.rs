//! Noise stripping for workflow engine responses
//!
//! The workflow engine injects stray markup (separator tags, line breaks, a
//! byte-order mark) into otherwise-JSON bodies. Everything outside this module
//! only ever sees cleaned text.

use std::borrow::Cow;

/// Markers the engine is known to inject
pub const DEFAULT_MARKERS: [&str; 8] = [
    "\u{feff}",
    "<hr>",
    "<hr/>",
    "<hr />",
    "<br>",
    "<br/>",
    "<br />",
    "<!-- separator -->",
];

/// Removes known non-JSON markers from response text
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    markers: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS)
    }
}

impl NoiseFilter {
    /// Create a filter for the given markers; empty markers are ignored
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    /// Add another marker to strip
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.is_empty() {
            self.markers.push(marker);
        }
        self
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Strip every marker found outside JSON string literals
    ///
    /// Markers inside a string value are payload (step outputs routinely carry
    /// `<br>` or `<hr>`) and are kept. Removal repeats until no marker remains
    /// outside a string, so a marker reassembled by an earlier removal is also
    /// stripped and the result is a fixed point. Text without such markers is
    /// returned borrowed and unchanged.
    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Some(mut cleaned) = self.strip_once(text) else {
            return Cow::Borrowed(text);
        };
        while let Some(next) = self.strip_once(&cleaned) {
            cleaned = next;
        }
        Cow::Owned(cleaned)
    }

    /// One left-to-right pass; `None` when nothing was removed
    fn strip_once(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut in_string = false;
        let mut escaped = false;
        let mut removed = false;

        while let Some(c) = rest.chars().next() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
            } else if let Some(marker) = self.marker_at(rest) {
                rest = &rest[marker.len()..];
                removed = true;
                continue;
            } else if c == '"' {
                in_string = true;
            }
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }

        removed.then_some(out)
    }

    fn marker_at(&self, text: &str) -> Option<&str> {
        self.markers
            .iter()
            .map(String::as_str)
            .find(|m| text.starts_with(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_borrowed_unchanged() {
        let filter = NoiseFilter::default();
        let clean = r#"{"processing_status":"pending"}"#;
        let stripped = filter.strip(clean);
        assert!(matches!(stripped, Cow::Borrowed(_)));
        assert_eq!(stripped, clean);
        assert!(serde_json::from_str::<serde_json::Value>(&stripped).is_ok());
    }

    #[test]
    fn test_strips_injected_separators() {
        let filter = NoiseFilter::default();
        let noisy = "\u{feff}<hr>{\"execution_id\":\"abc\"}<br />\n<!-- separator -->";
        let stripped = filter.strip(noisy);
        assert_eq!(stripped, "{\"execution_id\":\"abc\"}\n");
    }

    #[test]
    fn test_strip_is_idempotent_for_nested_markers() {
        let filter = NoiseFilter::default();
        let noisy = "<h<hr>r>{}";
        let once = filter.strip(noisy).into_owned();
        assert_eq!(once, "{}");
        assert_eq!(filter.strip(&once), once);
    }

    #[test]
    fn test_markers_inside_strings_are_kept() {
        let filter = NoiseFilter::default();
        let body = "\u{feff}<hr>{\"processing_status\":\"finished\",\"steps\":[{\"name\":\"Market\",\
                    \"output\":\"Line one<br>Line two<hr>Footer\"}]}<br />";
        let stripped = filter.strip(body);
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(
            value["steps"][0]["output"],
            "Line one<br>Line two<hr>Footer"
        );
        assert!(stripped.starts_with('{'));
        assert!(stripped.ends_with('}'));
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let filter = NoiseFilter::default();
        let body = r#"{"output":"say \"hi\"<br>there"}<hr>"#;
        assert_eq!(filter.strip(body), r#"{"output":"say \"hi\"<br>there"}"#);
    }

    #[test]
    fn test_clean_json_with_markup_in_strings_is_borrowed() {
        let filter = NoiseFilter::default();
        let body = r#"{"output":"a<br>b"}"#;
        assert!(matches!(filter.strip(body), Cow::Borrowed(_)));
    }

    #[test]
    fn test_custom_markers() {
        let filter = NoiseFilter::new(["--", ""]).with_marker("##");
        assert_eq!(filter.markers().len(), 2);
        assert_eq!(filter.strip("--{}##"), "{}");
    }
}
