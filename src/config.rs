//! User configuration in `<config dir>/pr-doctor/config.toml`.

use crate::diagnosis::review::DEFAULT_MAX_COMMENT_CHARS;
use crate::diagnosis::{
    DEFAULT_CONTEXT_LINES, DEFAULT_MAX_LINES, DiagnosisOptions, FAILURE_MARKERS, MarkerSet,
    PENDING_LOG_MARKERS, ReviewDisplay,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
const CONFIG_DIR: &str = "pr-doctor";

/// Filename for the configuration.
const CONFIG_FILE: &str = "config.toml";

/// Tunables read from the config file. Missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum lines in a failure snippet
    pub max_lines: usize,
    /// Context lines around a failure marker
    pub context: usize,
    /// Maximum review entries listed per section
    pub max_review_comments: usize,
    /// Character budget for comment bodies
    pub max_comment_chars: usize,
    /// Additional failure markers
    pub extra_failure_markers: Vec<String>,
    /// Additional pending-log markers
    pub extra_pending_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
            context: DEFAULT_CONTEXT_LINES,
            max_review_comments: 50,
            max_comment_chars: DEFAULT_MAX_COMMENT_CHARS,
            extra_failure_markers: Vec::new(),
            extra_pending_markers: Vec::new(),
        }
    }
}

impl Config {
    /// Build engine options, clamping counts to at least 1
    pub fn diagnosis_options(&self) -> DiagnosisOptions {
        DiagnosisOptions {
            max_lines: self.max_lines.max(1),
            context: self.context.max(1),
            review_display: ReviewDisplay {
                max_items: self.max_review_comments.max(1),
                max_body_chars: self.max_comment_chars.max(1),
            },
            failure_markers: MarkerSet::new(FAILURE_MARKERS)
                .extended(&self.extra_failure_markers),
            pending_markers: MarkerSet::new(PENDING_LOG_MARKERS)
                .extended(&self.extra_pending_markers),
        }
    }
}

/// Default location of the config file, if the platform has a config dir.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load configuration from an explicit path.
///
/// Returns defaults if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Load configuration from the default location.
pub fn load_config() -> Result<Config> {
    config_path().map_or_else(|| Ok(Config::default()), |path| load_config_from(&path))
}
