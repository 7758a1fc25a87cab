//! Pure job-status transition function.
//!
//! The supervisor owns no transition logic of its own: it only interprets
//! what the substrate reports on each poll. This module validates that those
//! observations progress monotonically:
//!
//! ```text
//! Waiting ──▶ Ready ──▶ Running ──▶ Succeeded
//!                                └▶ Failed
//! ```
//!
//! Forward skips are legal — a poll may land after the job already moved
//! through an intermediate state. Terminal states never change, and a
//! status may never move backwards.

use crate::substrate::JobStatus;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid job status transition from {from:?} to {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },
}

fn rank(status: JobStatus) -> u8 {
    match status {
        JobStatus::Waiting => 0,
        JobStatus::Ready => 1,
        JobStatus::Running => 2,
        JobStatus::Succeeded | JobStatus::Failed => 3,
    }
}

/// Fold one polled status into the tracked status.
///
/// Re-observing the current status is a no-op; any forward move is
/// accepted, including skips. Everything else is invalid.
pub fn observe(current: JobStatus, reported: JobStatus) -> Result<JobStatus, StateError> {
    if current == reported {
        return Ok(current);
    }
    if !current.is_terminal() && rank(reported) > rank(current) {
        return Ok(reported);
    }
    Err(StateError::InvalidTransition {
        from: current,
        to: reported,
    })
}
