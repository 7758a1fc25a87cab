//! End-to-end runs through the local substrate and the supervisor.

use pagestat::pipeline::Pipeline;
use pagestat::substrate::local::{self, OUTPUT_FILE_NAME};
use pagestat::substrate::JobRequest;
use pagestat::supervisor::ticker::ManualTicker;
use pagestat::supervisor::{JobSupervisor, SupervisionOutcome};
use std::path::Path;

const D: char = '\u{1}';

fn record(ts: &str, er: &str) -> String {
    ["user", "action", ts, "url", "ip", "ref", er, "agent", "cookie"].join("\u{1}")
}

fn write_input(dir: &Path, name: &str, records: &[String]) {
    let mut contents = records.join("\n");
    contents.push('\n');
    std::fs::write(dir.join(name), contents).unwrap();
}

#[tokio::test]
async fn aggregates_across_files_with_per_file_combining() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page_views");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();

    // File one combines two records into one partial; file two contributes
    // a single-record partial. The reducer divides by the two arriving
    // partials, not the three original records: (4.0 + 2.0) / 2 = 3.
    write_input(
        &input,
        "part-0",
        &[record("2", "1.5"), record("3", "2.5")],
    );
    write_input(&input, "part-1", &[record("3", "2.0")]);

    let request = JobRequest::new("load page views", input, output.clone()).with_env();
    let job = local::submit(request, Pipeline::new(D));

    let mut ticker = ManualTicker::new();
    let outcome = JobSupervisor::new().supervise(&job, &mut ticker).await;
    assert_eq!(outcome, SupervisionOutcome::Completed);

    let written = std::fs::read_to_string(output.join(OUTPUT_FILE_NAME)).unwrap();
    assert_eq!(written, format!("all\t8{D}3\n"));
}

#[tokio::test]
async fn malformed_records_and_fields_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page_views");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();

    write_input(
        &input,
        "part-0",
        &[
            "too\u{1}short".to_string(),
            record("4", "1.0"),
            record("10", "not-a-float"),
            record("not-an-int", "9.9"),
            record("6", "3.0"),
        ],
    );

    let request = JobRequest::new("load page views", input, output.clone());
    let job = local::submit(request, Pipeline::new(D));

    let mut ticker = ManualTicker::new();
    let outcome = JobSupervisor::new().supervise(&job, &mut ticker).await;
    assert_eq!(outcome, SupervisionOutcome::Completed);

    // ts_sum keeps the float-failure record's 10. The single file combines
    // into one partial (20, 4, 2), and reduce divides by that one arriving
    // tuple, so the average is 4.
    let written = std::fs::read_to_string(output.join(OUTPUT_FILE_NAME)).unwrap();
    assert_eq!(written, format!("all\t20{D}4\n"));
}

#[tokio::test]
async fn fully_unparsable_input_still_emits_a_zero_record() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page_views");
    let output = dir.path().join("out");
    std::fs::create_dir(&input).unwrap();

    write_input(&input, "part-0", &[record("x", "y")]);

    let request = JobRequest::new("load page views", input, output.clone());
    let job = local::submit(request, Pipeline::new(D));

    let mut ticker = ManualTicker::new();
    let outcome = JobSupervisor::new().supervise(&job, &mut ticker).await;
    assert_eq!(outcome, SupervisionOutcome::Completed);

    // The combine stage emits a zero partial even when nothing parsed, and
    // the reduce stage double-parses that partial, so the average is 0
    // rather than NaN. NaN only appears when zero tuples arrive at reduce.
    let written = std::fs::read_to_string(output.join(OUTPUT_FILE_NAME)).unwrap();
    assert_eq!(written, format!("all\t0{D}0\n"));
}

#[tokio::test]
async fn missing_input_directory_surfaces_one_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");

    let request = JobRequest::new(
        "load page views",
        dir.path().join("does-not-exist"),
        output.clone(),
    );
    let job = local::submit(request, Pipeline::new(D));

    let mut ticker = ManualTicker::new();
    let outcome = JobSupervisor::new().supervise(&job, &mut ticker).await;

    match outcome {
        SupervisionOutcome::Failed(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].name, "load page views");
            assert!(failures[0].failure_message.is_some());
        }
        other => panic!("expected failure outcome, got {other:?}"),
    }
    assert!(!output.exists());
}
