//! Merge action
//!
//! Invoked by the watch loop once the readiness verdict is positive:
//! merge → delete head branch → release → confirmation comment.

mod execute;

pub use execute::execute_action;
