//! Readiness engine
//!
//! Two phases, run once per tick:
//! 1. Signals - fetch PR snapshot, combined status, reviews, comments
//!    (effectful, failures degrade per signal)
//! 2. Evaluate - combine into a verdict (pure, plus optional auto-approval)

mod evaluate;
mod signals;

pub use evaluate::{
    DEFAULT_QA_PATTERN, QaPattern, ReadinessReport, checks_green, evaluate_readiness,
    missing_contexts, qa_approved, review_approved,
};
pub use signals::{
    Fetched, MAX_COMMENT_PAGES, SignalSnapshot, fetch_signals, fetch_signals_for,
    list_all_comments,
};
