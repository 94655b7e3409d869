//! CLI command implementations

mod context;
mod diagnose;
mod render;
pub mod style;

pub use diagnose::{DiagnoseOptions, run_diagnose};

use async_trait::async_trait;
use indicatif::ProgressBar;
use pr_doctor::diagnosis::ProgressCallback;
use std::time::Duration;

/// Spinner-backed progress reporting
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Start a spinner on stderr
    pub fn spinner() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style::spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    /// Remove the spinner from the terminal
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        self.spinner.set_message(message.to_string());
    }
}
