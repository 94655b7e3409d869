//! Two-tier log retrieval
//!
//! CI log storage is eventually consistent: a run-level log may not exist
//! yet while a job-level log already does. The retriever probes the run log
//! first and only falls back to the job log when the run log is reported as
//! pending. The fallback order lives in [`transition`] as a flat table.

use crate::diagnosis::snippet::MarkerSet;
use crate::error::Result;
use crate::types::LogFetchResult;
use async_trait::async_trait;
use tracing::debug;

/// Default markers identifying a "log not materialized yet" error
pub const PENDING_LOG_MARKERS: &[&str] = &[
    "still in progress",
    "log will be available when it is complete",
];

/// Local file header signature of a ZIP archive
pub const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Where raw log payloads come from
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch the log of a whole workflow run
    async fn fetch_run_log(&self, run_id: u64) -> Result<Vec<u8>>;

    /// Fetch the log of a single job
    async fn fetch_job_log(&self, job_id: u64) -> Result<Vec<u8>>;
}

/// Whether a payload is a ZIP archive rather than plain text
pub fn is_archive(payload: &[u8]) -> bool {
    payload.starts_with(ZIP_SIGNATURE)
}

/// Log tier being probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    /// Whole workflow run
    Run,
    /// Single job, carrying the pending reason from the run tier
    Job {
        /// Job identifier
        job_id: u64,
        /// Why the run-level log was pending
        run_reason: String,
    },
}

/// Classified result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Non-empty text
    Text(String),
    /// Success with an empty body
    Empty,
    /// Failure carrying a pending marker
    Pending(String),
    /// Any other failure, including unusable payloads
    Failed(String),
}

/// What to do after a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Probe the next tier
    Next(Tier),
    /// Terminal result
    Done(LogFetchResult),
}

/// The fallback table
pub fn transition(tier: Tier, probe: Probe, job_id: Option<u64>) -> Step {
    match (tier, probe) {
        (Tier::Run, Probe::Text(text)) => Step::Done(LogFetchResult::Ok(text)),
        (Tier::Run, Probe::Empty) => Step::Done(LogFetchResult::Ok(String::new())),
        (Tier::Run, Probe::Pending(reason)) => match job_id {
            Some(job_id) => Step::Next(Tier::Job {
                job_id,
                run_reason: reason,
            }),
            None => Step::Done(LogFetchResult::Pending(reason)),
        },
        (Tier::Run | Tier::Job { .. }, Probe::Failed(reason)) => {
            Step::Done(LogFetchResult::Error(reason))
        }
        (Tier::Job { .. }, Probe::Text(text)) => Step::Done(LogFetchResult::Ok(text)),
        (Tier::Job { run_reason, .. }, Probe::Empty) => {
            Step::Done(LogFetchResult::Pending(run_reason))
        }
        (Tier::Job { .. }, Probe::Pending(reason)) => Step::Done(LogFetchResult::Pending(reason)),
    }
}

/// Fetches check logs through the run -> job fallback chain
pub struct LogRetriever<'a, S: ?Sized> {
    source: &'a S,
    pending_markers: MarkerSet,
}

impl<'a, S: LogSource + ?Sized> LogRetriever<'a, S> {
    /// Create a retriever with the default pending markers
    pub fn new(source: &'a S) -> Self {
        Self::with_markers(source, MarkerSet::new(PENDING_LOG_MARKERS))
    }

    /// Create a retriever with a custom pending vocabulary
    pub const fn with_markers(source: &'a S, pending_markers: MarkerSet) -> Self {
        Self {
            source,
            pending_markers,
        }
    }

    /// Whether an error message says the log is not available yet
    pub fn is_pending_message(&self, message: &str) -> bool {
        self.pending_markers.matches(message)
    }

    /// Fetch the log for a run, falling back to the job log when needed
    pub async fn fetch(&self, run_id: u64, job_id: Option<u64>) -> LogFetchResult {
        let mut tier = Tier::Run;
        loop {
            let probe = self.probe(&tier, run_id).await;
            debug!(run_id, ?job_id, ?tier, probe = probe_label(&probe), "log probe");
            match transition(tier, probe, job_id) {
                Step::Next(next) => tier = next,
                Step::Done(result) => return result,
            }
        }
    }

    async fn probe(&self, tier: &Tier, run_id: u64) -> Probe {
        let fetched = match tier {
            Tier::Run => self.source.fetch_run_log(run_id).await,
            Tier::Job { job_id, .. } => self.source.fetch_job_log(*job_id).await,
        };
        match fetched {
            Ok(payload) if is_archive(&payload) => {
                Probe::Failed("Log payload is a zip archive; unable to parse.".to_string())
            }
            Ok(payload) if payload.is_empty() => Probe::Empty,
            Ok(payload) => Probe::Text(String::from_utf8_lossy(&payload).into_owned()),
            Err(e) => {
                let message = e.to_string();
                if self.is_pending_message(&message) {
                    Probe::Pending(message)
                } else {
                    Probe::Failed(message)
                }
            }
        }
    }
}

const fn probe_label(probe: &Probe) -> &'static str {
    match probe {
        Probe::Text(_) => "text",
        Probe::Empty => "empty",
        Probe::Pending(_) => "pending",
        Probe::Failed(_) => "failed",
    }
}
