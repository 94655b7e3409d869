//! Review decision reduction
//!
//! Folds reviews and comments from everyone except the PR author into one
//! decision. Only each reviewer's most recent review counts.

use crate::diagnosis::report::{ReviewCounts, ReviewDecision, ReviewFinding};
use crate::types::{IssueComment, Review, ReviewComment, ReviewState};
use std::collections::BTreeMap;

/// Default character budget for compacted comment bodies
pub const DEFAULT_MAX_COMMENT_CHARS: usize = 400;

const ELLIPSIS: &str = "...";

/// Raw feedback collections for one PR
#[derive(Debug, Clone, Default)]
pub struct ReviewInput {
    /// Submitted (and unsubmitted) reviews
    pub reviews: Vec<Review>,
    /// Inline review comments
    pub review_comments: Vec<ReviewComment>,
    /// Conversation comments
    pub issue_comments: Vec<IssueComment>,
}

/// Reduced feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// Overall decision
    pub decision: ReviewDecision,
    /// Whether the author has to respond
    pub action_required: bool,
    /// Surviving submitted reviews (before per-reviewer dedup)
    pub review_count: usize,
    /// Latest review per reviewer, newest first
    pub latest_reviews: Vec<Review>,
    /// Surviving inline comments
    pub review_comments: Vec<ReviewComment>,
    /// Surviving conversation comments
    pub issue_comments: Vec<IssueComment>,
}

impl ReviewOutcome {
    /// Whether any feedback survived filtering
    pub fn has_feedback(&self) -> bool {
        self.review_count > 0 || !self.review_comments.is_empty() || !self.issue_comments.is_empty()
    }

    /// Feedback counts
    pub fn counts(&self) -> ReviewCounts {
        ReviewCounts {
            reviews: self.review_count,
            reviewers: self.latest_reviews.len(),
            review_comments: self.review_comments.len(),
            issue_comments: self.issue_comments.len(),
        }
    }
}

/// True for logins other than the PR author. Empty logins never count.
fn is_other_person(login: &str, author_key: &str) -> bool {
    !login.is_empty() && login.to_lowercase() != author_key
}

/// Reduce feedback to a decision, ignoring anything authored by `author`
pub fn reduce_reviews(input: &ReviewInput, author: &str) -> ReviewOutcome {
    let author_key = author.to_lowercase();

    let submitted: Vec<&Review> = input
        .reviews
        .iter()
        .filter(|r| is_other_person(&r.author, &author_key))
        .filter(|r| !matches!(r.state, None | Some(ReviewState::Pending)))
        .collect();

    // Last write wins, but only for a strictly newer timestamp
    let mut latest_by_reviewer: BTreeMap<String, &Review> = BTreeMap::new();
    for review in &submitted {
        let key = review.author.to_lowercase();
        match latest_by_reviewer.get(&key) {
            Some(current) if review.submitted_at <= current.submitted_at => {}
            _ => {
                latest_by_reviewer.insert(key, review);
            }
        }
    }

    let mut latest_reviews: Vec<Review> = latest_by_reviewer.into_values().cloned().collect();
    latest_reviews.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    let review_comments: Vec<ReviewComment> = input
        .review_comments
        .iter()
        .filter(|c| is_other_person(&c.author, &author_key))
        .cloned()
        .collect();
    let issue_comments: Vec<IssueComment> = input
        .issue_comments
        .iter()
        .filter(|c| is_other_person(&c.author, &author_key))
        .cloned()
        .collect();

    let decision = decide(&latest_reviews);
    let summary_comments = latest_reviews
        .iter()
        .any(|r| r.state == Some(ReviewState::Commented) && !r.body.trim().is_empty());
    let action_required = decision == ReviewDecision::ChangesRequested
        || summary_comments
        || !review_comments.is_empty()
        || !issue_comments.is_empty();

    ReviewOutcome {
        decision,
        action_required,
        review_count: submitted.len(),
        latest_reviews,
        review_comments,
        issue_comments,
    }
}

fn decide(latest: &[Review]) -> ReviewDecision {
    let any = |state: ReviewState| latest.iter().any(|r| r.state.as_ref() == Some(&state));
    if any(ReviewState::ChangesRequested) {
        ReviewDecision::ChangesRequested
    } else if any(ReviewState::Approved) {
        ReviewDecision::Approved
    } else if any(ReviewState::Commented) {
        ReviewDecision::Commented
    } else if !latest.is_empty() {
        ReviewDecision::Reviewed
    } else {
        ReviewDecision::Pending
    }
}

/// Collapse whitespace and cut to `max_chars` characters.
///
/// Text that fits is returned collapsed. Longer text is cut so that the
/// result, ellipsis included, is exactly `max_chars` characters.
pub fn compact_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = cleaned.chars().take(keep).collect();
    out.extend(ELLIPSIS.chars().take(max_chars - keep));
    out
}

/// Display limits for a review finding
#[derive(Debug, Clone, Copy)]
pub struct ReviewDisplay {
    /// Maximum entries per list
    pub max_items: usize,
    /// Character budget per body
    pub max_body_chars: usize,
}

impl Default for ReviewDisplay {
    fn default() -> Self {
        Self {
            max_items: 50,
            max_body_chars: DEFAULT_MAX_COMMENT_CHARS,
        }
    }
}

/// Build the review finding from a reduced outcome.
///
/// Returns `None` when there is no feedback and nothing failed to load.
pub fn build_review_finding(
    outcome: &ReviewOutcome,
    details_url: &str,
    errors: &[String],
    display: ReviewDisplay,
) -> Option<ReviewFinding> {
    if !outcome.has_feedback() && errors.is_empty() {
        return None;
    }

    let limit = display.max_items.max(1);
    let budget = display.max_body_chars;

    let latest_reviews = outcome
        .latest_reviews
        .iter()
        .take(limit)
        .map(|r| Review {
            body: compact_text(&r.body, budget),
            ..r.clone()
        })
        .collect();
    let review_comments = outcome
        .review_comments
        .iter()
        .take(limit)
        .map(|c| ReviewComment {
            body: compact_text(&c.body, budget),
            ..c.clone()
        })
        .collect();
    let issue_comments = outcome
        .issue_comments
        .iter()
        .take(limit)
        .map(|c| IssueComment {
            body: compact_text(&c.body, budget),
            ..c.clone()
        })
        .collect();

    let mut notes = Vec::new();
    let mut note_if_truncated = |total: usize, what: &str| {
        if total > limit {
            notes.push(format!("Showing {limit} of {total} {what}."));
        }
    };
    note_if_truncated(outcome.latest_reviews.len(), "latest reviews");
    note_if_truncated(outcome.review_comments.len(), "inline review comments");
    note_if_truncated(outcome.issue_comments.len(), "issue comments");

    Some(ReviewFinding {
        details_url: details_url.to_string(),
        decision: outcome.decision,
        action_required: outcome.action_required,
        counts: outcome.counts(),
        latest_reviews,
        review_comments,
        issue_comments,
        note: (!notes.is_empty()).then(|| notes.join(" ")),
        error: (!errors.is_empty()).then(|| errors.join("; ")),
    })
}
