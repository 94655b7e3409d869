//! pr-doctor: diagnose why a pull request is not mergeable
//!
//! Detects merge conflicts and stale branches, reduces reviewer feedback to a
//! single decision, finds failing CI checks and pulls a bounded failure
//! snippet out of each failing check's log.

pub mod auth;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod platform;
pub mod repo;
pub mod types;
