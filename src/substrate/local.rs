//! In-process substrate implementation.
//!
//! Runs one submitted pipeline on a background tokio task and exposes its
//! lifecycle through [`JobControl`]. Grouping happens in memory, which
//! satisfies the substrate guarantee the aggregators rely on: every tuple
//! for a key reaches a single combine or reduce invocation. The combine
//! stage runs once per input file per key, so reduce genuinely sees merged
//! partials rather than raw seeds.

use super::{JobControl, JobDescriptor, JobRequest, JobStatus};
use crate::pipeline::Pipeline;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Name of the single reducer's output file under the output directory.
pub const OUTPUT_FILE_NAME: &str = "part-r-00000";

struct JobState {
    name: String,
    status: JobStatus,
    failure_message: Option<String>,
}

/// Handle to a job submitted to the local substrate.
pub struct LocalJob {
    state: Arc<Mutex<JobState>>,
    stop_requested: Arc<AtomicBool>,
}

/// Submit the pipeline for background execution and return immediately.
///
/// Must be called from within a tokio runtime.
pub fn submit(request: JobRequest, pipeline: Pipeline) -> LocalJob {
    let state = Arc::new(Mutex::new(JobState {
        name: request.name.clone(),
        status: JobStatus::Waiting,
        failure_message: None,
    }));
    let stop_requested = Arc::new(AtomicBool::new(false));

    let task_state = Arc::clone(&state);
    let stop = Arc::clone(&stop_requested);
    tokio::spawn(async move {
        set_status(&task_state, JobStatus::Running);
        info!(job = %request.name, input = %request.input.display(), "job started");
        match run_pipeline(&request, pipeline, &stop).await {
            Ok(()) => {
                info!(job = %request.name, "job succeeded");
                set_status(&task_state, JobStatus::Succeeded);
            }
            Err(e) => {
                let mut state = task_state.lock().expect("job state poisoned");
                state.status = JobStatus::Failed;
                state.failure_message = Some(e.to_string());
            }
        }
    });

    LocalJob {
        state,
        stop_requested,
    }
}

fn set_status(state: &Mutex<JobState>, status: JobStatus) {
    state.lock().expect("job state poisoned").status = status;
}

async fn run_pipeline(request: &JobRequest, pipeline: Pipeline, stop: &AtomicBool) -> Result<()> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(&request.input).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    // Each input file plays the role of one map unit: extract its lines,
    // then combine once per key before handing partials to reduce.
    let mut partials: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in paths {
        if stop.load(Ordering::Relaxed) {
            return Err(Error::Job("stop requested before completion".to_string()));
        }
        let contents = tokio::fs::read_to_string(&path).await?;
        let mut seeds: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for line in contents.lines() {
            if let Some((key, seed)) = pipeline.extract(line) {
                seeds.entry(key).or_default().push(seed);
            }
        }
        debug!(file = %path.display(), keys = seeds.len(), "combined map unit");
        for (key, values) in seeds {
            let partial = pipeline.combine(values.iter().map(String::as_str));
            partials
                .entry(key)
                .or_default()
                .push(partial.encode(pipeline.delimiter()));
        }
    }

    // Final-stage parallelism is fixed at 1: a single sequential pass.
    tokio::fs::create_dir_all(&request.output).await?;
    let mut out = String::new();
    for (key, values) in &partials {
        let agg = pipeline.reduce(values.iter().map(String::as_str));
        out.push_str(&pipeline.format_output(key, &agg));
        out.push('\n');
    }
    tokio::fs::write(request.output.join(OUTPUT_FILE_NAME), out).await?;
    Ok(())
}

impl LocalJob {
    fn descriptor(&self) -> JobDescriptor {
        let state = self.state.lock().expect("job state poisoned");
        JobDescriptor {
            name: state.name.clone(),
            status: state.status,
            failure_message: state.failure_message.clone(),
        }
    }

    fn bucket(&self, status: JobStatus) -> Vec<JobDescriptor> {
        let descriptor = self.descriptor();
        if descriptor.status == status {
            vec![descriptor]
        } else {
            Vec::new()
        }
    }
}

#[async_trait]
impl JobControl for LocalJob {
    async fn all_finished(&self) -> bool {
        self.descriptor().status.is_terminal()
    }

    async fn failed_jobs(&self) -> Vec<JobDescriptor> {
        self.bucket(JobStatus::Failed)
    }

    async fn running_jobs(&self) -> Vec<JobDescriptor> {
        self.bucket(JobStatus::Running)
    }

    async fn ready_jobs(&self) -> Vec<JobDescriptor> {
        self.bucket(JobStatus::Ready)
    }

    async fn waiting_jobs(&self) -> Vec<JobDescriptor> {
        self.bucket(JobStatus::Waiting)
    }

    async fn successful_jobs(&self) -> Vec<JobDescriptor> {
        self.bucket(JobStatus::Succeeded)
    }

    async fn stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DEFAULT_DELIMITER;
    use std::time::Duration;

    async fn wait_for_finish(job: &LocalJob) {
        for _ in 0..200 {
            if job.all_finished().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job did not finish in time");
    }

    fn record(ts: &str, er: &str) -> String {
        [
            "user", "action", ts, "url", "ip", "ref", er, "agent", "cookie",
        ]
        .join("\u{1}")
    }

    #[tokio::test]
    async fn runs_pipeline_over_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(
            input.join("part-0"),
            format!("{}\n{}\n", record("2", "1.5"), record("3", "2.5")),
        )
        .unwrap();

        let request = JobRequest::new("test job", input, output.clone());
        let job = submit(request, Pipeline::new(DEFAULT_DELIMITER));
        wait_for_finish(&job).await;

        // One input file means one combined partial (5, 4, 2); reduce
        // divides by the single arriving tuple, so the average is 4.
        assert_eq!(job.successful_jobs().await.len(), 1);
        let written = std::fs::read_to_string(output.join(OUTPUT_FILE_NAME)).unwrap();
        assert_eq!(written, "all\t5\u{1}4\n");
    }

    #[tokio::test]
    async fn missing_input_directory_fails_the_job() {
        let dir = tempfile::tempdir().unwrap();
        let request = JobRequest::new(
            "test job",
            dir.path().join("does-not-exist"),
            dir.path().join("out"),
        );
        let job = submit(request, Pipeline::default());
        wait_for_finish(&job).await;

        let failures = job.failed_jobs().await;
        assert_eq!(failures.len(), 1);
        assert!(failures[0].failure_message.is_some());
        assert!(job.successful_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn wrong_field_count_lines_are_dropped_silently() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(
            input.join("part-0"),
            format!("short\u{1}line\n{}\n", record("7", "2.0")),
        )
        .unwrap();

        let request = JobRequest::new("test job", input, output.clone());
        let job = submit(request, Pipeline::default());
        wait_for_finish(&job).await;

        let written = std::fs::read_to_string(output.join(OUTPUT_FILE_NAME)).unwrap();
        assert_eq!(written, "all\t7\u{1}2\n");
    }
}
