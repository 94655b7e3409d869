//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark glyph
pub const CHECK: &str = "✓";

/// Cross glyph
pub const CROSS: &str = "✗";

/// Horizontal rule between report sections
pub const RULE_WIDTH: usize = 60;

/// Semantic colors, applied only when stdout supports them
pub trait Stylize {
    /// Bold text for headings
    fn emphasis(&self) -> String;
    /// Dimmed text for secondary information
    fn muted(&self) -> String;
    /// Highlighted identifiers (names, numbers)
    fn accent(&self) -> String;
    /// Positive outcome
    fn success(&self) -> String;
    /// Warning or degraded outcome
    fn warn(&self) -> String;
    /// Failure
    fn error(&self) -> String;
}

impl<T: Display> Stylize for T {
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    fn error(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.red())
            .to_string()
    }
}

/// Render a URL as a terminal hyperlink when supported
pub fn link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner style for progress feedback
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Section separator
pub fn rule() -> String {
    "-".repeat(RULE_WIDTH).muted()
}
