//! Runtime configuration for the aggregation job.

use crate::pipeline::DEFAULT_DELIMITER;
use crate::supervisor::{DEFAULT_POLL_INTERVAL, DEFAULT_REPORT_EVERY};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for the pipeline and its supervisor. Loaded from a JSON file
/// when one is given on the command line, otherwise defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Field delimiter for input records and intermediate tuples.
    pub delimiter: char,

    /// Delay between supervisor status polls.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Dump job-state buckets every this many poll iterations.
    pub report_every: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            poll_interval: DEFAULT_POLL_INTERVAL,
            report_every: DEFAULT_REPORT_EVERY,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
