//! Batch submission: per-name build, optional commit, pacing and progress

pub mod pacing;
pub mod progress;
pub mod submitter;
pub mod suggest;

pub use pacing::{Pacer, PacingConfig, PacingPolicy, PacingStats};
pub use progress::{LogProgress, NoProgress, ProgressReporter, render_bar};
pub use submitter::{Action, BatchAborted, BatchReport, BatchResult, BatchSubmitter, ItemFailure};
pub use suggest::{MatchType, Suggestion, suggest};
