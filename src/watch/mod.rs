//! Watch loop driving fetch → evaluate → merge until the PR is merged

mod scheduler;

pub use scheduler::{IntervalTicker, Ticker, WatchOutcome, WatchState, Watcher};
