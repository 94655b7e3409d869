//! Failure snippet extraction
//!
//! Build logs front-load verbose setup output, so the most recent failure
//! indicator is the one worth showing. The scan runs from the end of the
//! log toward the start and stops at the first marker it meets.

use crate::types::FailureSnippet;

/// Default vocabulary of failure markers (matched against lowercased lines)
pub const FAILURE_MARKERS: &[&str] = &[
    "error",
    "fail",
    "failed",
    "traceback",
    "exception",
    "assert",
    "panic",
    "fatal",
    "timeout",
    "segmentation fault",
];

/// A case-insensitive set of substrings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    markers: Vec<String>,
}

impl MarkerSet {
    /// Build a set from any list of markers. Markers are lowercased; empty
    /// markers are dropped since they would match everything.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        Self { markers }
    }

    /// Add more markers to the set
    #[must_use]
    pub fn extended<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for marker in Self::new(extra).markers {
            if !self.markers.contains(&marker) {
                self.markers.push(marker);
            }
        }
        self
    }

    /// Whether `text` contains any marker, ignoring case
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.markers.iter().any(|m| lowered.contains(m.as_str()))
    }

    /// The markers in this set
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

/// Extracts the part of a log most likely to explain a failure
#[derive(Debug, Clone)]
pub struct SnippetExtractor {
    markers: MarkerSet,
}

impl Default for SnippetExtractor {
    fn default() -> Self {
        Self::new(MarkerSet::new(FAILURE_MARKERS))
    }
}

impl SnippetExtractor {
    /// Create an extractor with a custom marker vocabulary
    pub const fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    /// Index of the last line containing a failure marker
    pub fn find_failure_index(&self, lines: &[&str]) -> Option<usize> {
        lines.iter().rposition(|line| self.markers.matches(line))
    }

    /// Extract at most `max_lines` lines around the last failure marker.
    ///
    /// The window is `[i - context, i + context)` around marker index `i`,
    /// clipped to the log. If it is still longer than `max_lines`, its tail
    /// is kept. Without a marker the last `max_lines` lines are returned.
    pub fn extract(&self, log_text: &str, max_lines: usize, context: usize) -> FailureSnippet {
        let lines: Vec<&str> = log_text.lines().collect();
        if lines.is_empty() {
            return FailureSnippet::default();
        }

        let Some(marker) = self.find_failure_index(&lines) else {
            let start = lines.len().saturating_sub(max_lines);
            return snippet(&lines, start, lines.len(), None);
        };

        let window_start = marker.saturating_sub(context);
        let end = marker.saturating_add(context).min(lines.len());
        let start = window_start.max(end.saturating_sub(max_lines));
        snippet(&lines, start, end, Some(marker))
    }
}

fn snippet(lines: &[&str], start: usize, end: usize, marker_line: Option<usize>) -> FailureSnippet {
    let start = start.min(end);
    FailureSnippet {
        lines: lines[start..end].iter().map(ToString::to_string).collect(),
        start,
        marker_line,
    }
}

/// The last `max_lines` lines of `text`, unconditionally
pub fn tail_lines(text: &str, max_lines: usize) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_set_is_case_insensitive() {
        let set = MarkerSet::new(["Panic"]);
        assert!(set.matches("thread 'main' PANICKED at src/lib.rs"));
        assert!(!set.matches("all good"));
    }

    #[test]
    fn test_marker_set_drops_empty_markers() {
        let set = MarkerSet::new(["", "oops"]);
        assert_eq!(set.markers(), ["oops".to_string()]);
        assert!(!set.matches("fine"));
    }

    #[test]
    fn test_extended_skips_duplicates() {
        let set = MarkerSet::new(["error"]).extended(["ERROR", "denied"]);
        assert_eq!(set.markers().len(), 2);
        assert!(set.matches("permission denied"));
    }

    #[test]
    fn test_marker_window_clipped_at_start() {
        let log = "boom error\nb\nc\nd";
        let snippet = SnippetExtractor::default().extract(log, 10, 2);
        assert_eq!(snippet.start, 0);
        assert_eq!(snippet.marker_line, Some(0));
        assert_eq!(snippet.lines, vec!["boom error", "b"]);
    }
}
