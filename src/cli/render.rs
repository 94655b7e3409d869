//! Text and JSON rendering of a diagnosis

use super::style::{CHECK, CROSS, Stylize, link, rule};
use pr_doctor::diagnosis::{CheckFinding, CheckStatus, Diagnosis, Finding, ReviewFinding};
use pr_doctor::error::Result;
use pr_doctor::types::{IssueComment, MergeMetadata, Review, ReviewComment};
use serde::Serialize;
use std::fmt::Display;

/// Characters of the head SHA shown in text output
const SHORT_SHA_LEN: usize = 12;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    #[serde(flatten)]
    diagnosis: &'a Diagnosis,
    blocking: bool,
}

/// Render the diagnosis as pretty-printed JSON
pub fn render_json(diagnosis: &Diagnosis) -> Result<String> {
    let report = JsonReport {
        diagnosis,
        blocking: diagnosis.has_blocking(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

#[derive(Default)]
struct Lines(String);

impl Lines {
    fn push(&mut self, line: impl Display) {
        self.0.push_str(&line.to_string());
        self.0.push('\n');
    }

    fn field(&mut self, label: &str, value: impl Display) {
        self.push(format!("{} {value}", format!("{label}:").muted()));
    }
}

/// Render the diagnosis as a human-readable report
pub fn render_text(diagnosis: &Diagnosis) -> String {
    let mut out = Lines::default();
    out.push(format!(
        "{}: {} items analyzed.",
        format!("PR #{}", diagnosis.pr).emphasis(),
        diagnosis.results.len()
    ));

    for finding in &diagnosis.results {
        out.push(rule());
        out.field("Check", finding.name().accent());
        match finding {
            Finding::MergeConflict {
                details_url,
                merge,
                note,
            }
            | Finding::BehindBase {
                details_url,
                merge,
                note,
            } => {
                out.field("Details", link(details_url));
                out.field("Status", status_label(finding).error());
                render_merge(&mut out, merge);
                out.field("Note", note);
            }
            Finding::Review(review) => render_review(&mut out, review, &status_label(finding)),
            Finding::ChecksUnavailable { error } => {
                out.field("Status", status_label(finding).error());
                out.field("Error", error);
            }
            Finding::Check(check) => render_check(&mut out, check),
        }
    }
    out.push(rule());

    let blocking = diagnosis.results.iter().filter(|f| f.is_blocking()).count();
    if blocking == 0 {
        out.push(format!("{} Nothing blocks this pull request", CHECK.success()));
    } else {
        out.push(format!(
            "{} {blocking} blocking finding{}",
            CROSS.error(),
            if blocking == 1 { "" } else { "s" }
        ));
    }
    out.0
}

fn status_label(finding: &Finding) -> String {
    match finding {
        Finding::MergeConflict { .. } => "merge_conflict".to_string(),
        Finding::BehindBase { .. } => "behind_base".to_string(),
        Finding::Review(review) if review.action_required => "review_changes_requested".to_string(),
        Finding::Review(_) => "review_feedback".to_string(),
        Finding::ChecksUnavailable { .. } => "checks_unavailable".to_string(),
        Finding::Check(check) => check.status.to_string(),
    }
}

fn render_merge(out: &mut Lines, merge: &MergeMetadata) {
    let mergeable = merge.mergeable.as_deref().unwrap_or("UNKNOWN");
    let state = merge.merge_state_status.as_deref().unwrap_or("UNKNOWN");
    out.field("Merge state", format!("{mergeable} / {state}"));
    if let (Some(head), Some(base)) = (&merge.head_ref_name, &merge.base_ref_name) {
        out.field("Branches", format!("{head} -> {base}"));
    }
}

fn render_review(out: &mut Lines, review: &ReviewFinding, label: &str) {
    out.field("Details", link(&review.details_url));
    out.field(
        "Status",
        if review.action_required {
            label.warn()
        } else {
            label.muted()
        },
    );
    out.field("Review decision", review.decision);
    out.field(
        "Action required",
        if review.action_required { "yes" } else { "no" },
    );
    let counts = review.counts;
    out.field(
        "Counts",
        format!(
            "reviews {}, reviewers {}, review comments {}, issue comments {}",
            counts.reviews, counts.reviewers, counts.review_comments, counts.issue_comments
        ),
    );
    if let Some(note) = &review.note {
        out.field("Note", note);
    }
    if let Some(error) = &review.error {
        out.field("Error", error.error());
    }

    if !review.latest_reviews.is_empty() {
        out.push("Latest reviews:");
        for item in &review.latest_reviews {
            out.push(format!("  - {}", review_line(item)));
        }
    }
    if !review.review_comments.is_empty() {
        out.push("Inline review comments:");
        for item in &review.review_comments {
            out.push(format!("  - {}", review_comment_line(item)));
        }
    }
    if !review.issue_comments.is_empty() {
        out.push("Issue comments:");
        for item in &review.issue_comments {
            out.push(format!("  - {}", issue_comment_line(item)));
        }
    }
}

fn render_check(out: &mut Lines, check: &CheckFinding) {
    if !check.details_url.is_empty() {
        out.field("Details", link(&check.details_url));
    }
    if let Some(run_id) = check.run_id {
        out.field("Run ID", run_id);
    }
    if let Some(job_id) = check.job_id {
        out.field("Job ID", job_id);
    }
    let status = check.status.to_string();
    out.field(
        "Status",
        match check.status {
            CheckStatus::LogPending | CheckStatus::External => status.warn(),
            CheckStatus::Ok | CheckStatus::LogUnavailable => status.error(),
        },
    );
    if let Some(secs) = check.duration_secs {
        out.field("Duration", format_duration(secs));
    }

    if let Some(run) = &check.run {
        let workflow = run
            .name
            .as_deref()
            .or(check.workflow.as_deref())
            .unwrap_or_default();
        let conclusion = run
            .conclusion
            .as_deref()
            .or(run.status.as_deref())
            .unwrap_or_default();
        out.field("Workflow", format!("{workflow} ({conclusion})"));
        let branch = run.head_branch.as_deref().unwrap_or_default();
        let sha = run.head_sha.as_deref().unwrap_or_default();
        let sha: String = sha.chars().take(SHORT_SHA_LEN).collect();
        if !branch.is_empty() || !sha.is_empty() {
            out.field("Branch/SHA", format!("{branch} {sha}"));
        }
        if let Some(url) = &run.url {
            out.field("Run URL", link(url));
        }
    }

    if let Some(note) = &check.note {
        out.field("Note", note);
    }
    if let Some(error) = &check.error {
        out.field("Error fetching logs", error.error());
        return;
    }

    match &check.snippet {
        Some(snippet) if !snippet.is_empty() => {
            out.push("Failure snippet:".emphasis());
            for line in &snippet.lines {
                out.push(format!("  {line}"));
            }
        }
        _ => out.push("No snippet available.".muted()),
    }
}

fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

fn join_parts(parts: &[&str], body: &str) -> String {
    let head = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    match (head.is_empty(), body.is_empty()) {
        (_, true) => head,
        (true, false) => body.to_string(),
        (false, false) => format!("{head} - {body}"),
    }
}

fn review_line(review: &Review) -> String {
    let state = review
        .state
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    join_parts(
        &[&review.author, &state, &review.submitted_at, &review.url],
        &review.body,
    )
}

fn review_comment_line(comment: &ReviewComment) -> String {
    let location = match (comment.path.is_empty(), comment.line) {
        (_, Some(line)) => format!("{}:{line}", comment.path),
        (false, None) => comment.path.clone(),
        (true, None) => String::new(),
    };
    join_parts(
        &[&comment.author, &location, &comment.created_at, &comment.url],
        &comment.body,
    )
}

fn issue_comment_line(comment: &IssueComment) -> String {
    join_parts(
        &[&comment.author, &comment.created_at, &comment.url],
        &comment.body,
    )
}
