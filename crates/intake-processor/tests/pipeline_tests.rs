//! Integration tests for the streaming pipeline
//!
//! Covers the pipeline's externally observable contract: row ordering and
//! numbering, single header emission, value case transform, the sparse-row
//! serialization policy, abort-on-error behavior, and the worked
//! `name,age` example.

use std::io::Cursor;
use std::time::Duration;

use chrono::DateTime;
use intake_processor::pipeline::{self, PipelineError, PipelineSummary};

async fn run_pipeline(input: &str) -> (PipelineSummary, String) {
    let mut sink = Cursor::new(Vec::new());
    let summary = pipeline::run(Cursor::new(input.as_bytes().to_vec()), &mut sink)
        .await
        .unwrap();
    (summary, String::from_utf8(sink.into_inner()).unwrap())
}

#[tokio::test]
async fn test_example_scenario() {
    let (summary, output) = run_pipeline("name,age\nAna,30\nBob,25\n").await;

    assert_eq!(summary.rows, 2);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "NAME,AGE,processedAt,processedRow");

    let row1: Vec<&str> = lines[1].split(',').collect();
    let row2: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(&row1[..2], ["ANA", "30"]);
    assert_eq!(row1[3], "1");
    assert_eq!(&row2[..2], ["BOB", "25"]);
    assert_eq!(row2[3], "2");

    // Timestamps are valid and non-decreasing across rows.
    let ts1 = DateTime::parse_from_rfc3339(row1[2]).unwrap();
    let ts2 = DateTime::parse_from_rfc3339(row2[2]).unwrap();
    assert!(ts2 >= ts1);
}

#[tokio::test]
async fn test_rows_are_numbered_one_to_n_in_order() {
    let mut input = String::from("id,value\n");
    for i in 0..200 {
        input.push_str(&format!("row{i},{i}\n"));
    }

    let (summary, output) = run_pipeline(&input).await;
    assert_eq!(summary.rows, 200);

    let data_lines: Vec<&str> = output.lines().skip(1).collect();
    assert_eq!(data_lines.len(), 200);

    for (index, line) in data_lines.iter().enumerate() {
        let columns: Vec<&str> = line.split(',').collect();
        // Input order is preserved and processedRow has no gaps.
        assert_eq!(columns[0], format!("ROW{index}"));
        assert_eq!(columns[3], (index + 1).to_string());
    }
}

#[tokio::test]
async fn test_header_is_emitted_exactly_once() {
    let (_, output) = run_pipeline("name\nAna\nBob\nCarla\n").await;

    let header = "NAME,processedAt,processedRow";
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], header);
    assert!(lines.iter().skip(1).all(|line| *line != header));
}

#[tokio::test]
async fn test_values_are_uppercased() {
    let (_, output) = run_pipeline("city,note\nsão paulo,hello World\n").await;

    let row: Vec<&str> = output.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(row[0], "SÃO PAULO");
    assert_eq!(row[1], "HELLO WORLD");
}

#[tokio::test]
async fn test_sparse_later_row_serializes_empty_fields() {
    let (_, output) = run_pipeline("name,age\nAna,30\nBob\n").await;

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "NAME,AGE,processedAt,processedRow");

    // Row 2 has no age: same column layout, empty value.
    let row2: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(row2.len(), 4);
    assert_eq!(row2[0], "BOB");
    assert_eq!(row2[1], "");
    assert_eq!(row2[3], "2");
}

#[tokio::test]
async fn test_first_record_fixes_the_column_layout() {
    // Row 2 carries a value with no column in the schema; it is dropped
    // rather than shifting the layout.
    let (_, output) = run_pipeline("name\nAna\nBob,99\n").await;

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "NAME,processedAt,processedRow");

    let row2: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(row2.len(), 3);
    assert_eq!(row2[0], "BOB");
    assert_eq!(row2[2], "2");
}

#[tokio::test]
async fn test_empty_input_produces_empty_output() {
    let (summary, output) = run_pipeline("").await;
    assert_eq!(summary.rows, 0);
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_header_only_input_produces_empty_output() {
    // No data rows means no transformed records, so not even a header line.
    let (summary, output) = run_pipeline("name,age\n").await;
    assert_eq!(summary.rows, 0);
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_reruns_differ_only_in_timestamps() {
    let input = "name,age\nAna,30\nBob,25\nCarla,41\n";
    let (summary, first) = run_pipeline(input).await;
    let (_, second) = run_pipeline(input).await;

    let timestamp_column = summary.fields.len() - 2;
    let blank_timestamps = |output: &str| -> Vec<String> {
        output
            .lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    return line.to_string();
                }
                let mut columns: Vec<&str> = line.split(',').collect();
                columns[timestamp_column] = "";
                columns.join(",")
            })
            .collect()
    };

    assert_eq!(blank_timestamps(&first), blank_timestamps(&second));
}

#[tokio::test]
async fn test_invalid_utf8_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("bad.csv");
    let destination = dir.path().join("processed-bad.csv");

    let mut content = b"name\nAna\n".to_vec();
    content.extend_from_slice(&[0xff, 0xfe, 0x0a]);
    std::fs::write(&source, content).unwrap();

    let result = pipeline::process_file(&source, &destination, None).await;
    assert!(matches!(result, Err(PipelineError::Parse(_))));

    // The destination is left behind, incomplete; presence alone is
    // inconclusive after a failure.
    assert!(destination.exists());
}

#[tokio::test]
async fn test_process_file_creates_destination_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.csv");
    std::fs::write(&source, "name\nAna\n").unwrap();

    let destination = dir.path().join("out").join("nested").join("processed-in.csv");
    let summary = pipeline::process_file(&source, &destination, None)
        .await
        .unwrap();

    assert_eq!(summary.rows, 1);
    let written = std::fs::read_to_string(&destination).unwrap();
    assert!(written.starts_with("NAME,processedAt,processedRow\n"));
}

#[tokio::test]
async fn test_process_file_within_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.csv");
    std::fs::write(&source, "name\nAna\nBob\n").unwrap();

    let destination = dir.path().join("processed-in.csv");
    let summary =
        pipeline::process_file(&source, &destination, Some(Duration::from_secs(30)))
            .await
            .unwrap();

    assert_eq!(summary.rows, 2);
}

#[tokio::test]
async fn test_missing_source_fails_before_creating_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("does-not-exist.csv");
    let destination = dir.path().join("processed-missing.csv");

    let result = pipeline::process_file(&source, &destination, None).await;
    assert!(matches!(result, Err(PipelineError::Io(_))));
    assert!(!destination.exists());
}
