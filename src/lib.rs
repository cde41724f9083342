//! mergewatch - merge a GitHub pull request once it is ready, then release
//!
//! Watches one pull request. Each tick fetches its combined status, reviews
//! and comments, and merges once every required check is green, a
//! `QA: PASS` comment exists and the PR is approved. After merging, the head
//! branch is deleted and an external release procedure runs.

pub mod auth;
pub mod config;
pub mod error;
pub mod merge;
pub mod platform;
pub mod progress;
pub mod readiness;
pub mod release;
pub mod types;
pub mod watch;
