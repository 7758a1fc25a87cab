//! # pagestat
//!
//! Aggregates delimited page view records into two figures per grouping key:
//! the total time spent (`ts_sum`) and the average estimated revenue
//! (`er_avg`). Records flow through a three-stage pipeline —
//! extract → combine → reduce — executed under a job substrate and watched
//! by a polling supervisor.
//!
//! ## Modules
//!
//! - `config` - Runtime configuration for the pipeline and supervisor
//! - `pipeline` - Extract, combine, and reduce stages with their skip semantics
//! - `substrate` - The consumed job-execution interface plus an in-process runner
//! - `supervisor` - Poll-driven job lifecycle supervision

pub mod config;
pub mod error;
pub mod pipeline;
pub mod substrate;
pub mod supervisor;

pub use error::{Error, Result};
