//! Streaming CSV transform pipeline
//!
//! Wires a byte-stream source through a record parser, the row transform, a
//! record serializer, and a byte-stream sink. The parse stage runs as its
//! own task and feeds the transform/serialize/write stage through a bounded
//! channel, so at most a small constant number of records is in memory no
//! matter how large the source is, and the sink's write rate governs how
//! fast the source is read.
//!
//! Ordering is strict FIFO: record *n* is fully written before record *n+1*
//! is serialized, and `processedRow` for record *n* is exactly *n*. The
//! first error from any stage aborts the run and is surfaced to the caller;
//! whatever had already reached the destination stays there.

use std::path::Path;
use std::time::Duration;

use csv_async::{AsyncReaderBuilder, StringRecord};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

pub mod record;
pub mod transform;

pub use record::Record;
pub use transform::{transform, PROCESSED_AT_FIELD, PROCESSED_ROW_FIELD};

/// Records in flight between the parse and write stages. This window is the
/// only buffering between source and sink.
const RECORD_WINDOW: usize = 8;

/// Output column delimiter. Values are joined verbatim: embedded delimiters
/// are not quoted or escaped, a documented limitation of the output format.
const DELIMITER: &str = ",";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv_async::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse stage failed: {0}")]
    Stage(String),

    #[error("Processing exceeded the {0:?} time limit")]
    Timeout(Duration),
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Number of data rows transformed and written
    pub rows: u64,
    /// Output schema (field names of the first transformed record); empty
    /// when the source had no data rows
    pub fields: Vec<String>,
}

/// Stream `source` through the transform into `sink`.
///
/// The source must be positioned at the start of the CSV data; it is read
/// exactly once, front to back. The sink is flushed and shut down after the
/// last record, or abandoned mid-write when the run aborts.
pub async fn run<R, W>(source: R, sink: W) -> Result<PipelineSummary, PipelineError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::channel(RECORD_WINDOW);
    let parser = spawn_parse_stage(source, tx);

    let outcome = write_stage(&mut rx, sink).await;

    // Unblock the parse stage if the write side bailed out first, then reap
    // it so a panic there is not lost.
    drop(rx);
    let join = parser.await;

    match outcome {
        Err(err) => Err(err),
        Ok(summary) => {
            join.map_err(|err| PipelineError::Stage(err.to_string()))?;
            Ok(summary)
        },
    }
}

/// Parse stage: reads the header record, then streams data records into the
/// bounded channel. Parse errors travel through the channel so the write
/// stage observes them in order.
fn spawn_parse_stage<R>(
    source: R,
    tx: mpsc::Sender<Result<Record, csv_async::Error>>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .create_reader(source);

        let headers = match reader.headers().await {
            Ok(headers) => headers.clone(),
            Err(err) => {
                let _ = tx.send(Err(err)).await;
                return;
            },
        };

        let mut row = StringRecord::new();
        loop {
            match reader.read_record(&mut row).await {
                Ok(true) => {
                    // A full window applies backpressure here; a dropped
                    // receiver means the write stage already ended.
                    if tx.send(Ok(Record::from_row(&headers, &row))).await.is_err() {
                        break;
                    }
                },
                Ok(false) => break,
                Err(err) => {
                    let _ = tx.send(Err(err)).await;
                    break;
                },
            }
        }
    })
}

/// Transform/serialize/write stage.
///
/// The first transformed record fixes the output schema and emits the header
/// line; every later record serializes its values in that schema's order,
/// with absent fields as empty, never as a different column layout.
async fn write_stage<W>(
    rx: &mut mpsc::Receiver<Result<Record, csv_async::Error>>,
    sink: W,
) -> Result<PipelineSummary, PipelineError>
where
    W: AsyncWrite + Unpin,
{
    let mut sink = BufWriter::new(sink);
    let mut fields: Vec<String> = Vec::new();
    let mut rows: u64 = 0;

    while let Some(parsed) = rx.recv().await {
        let record = parsed?;
        rows += 1;
        let transformed = transform(&record, rows);

        if rows == 1 {
            fields = transformed.field_names();
            let names: Vec<&str> = fields.iter().map(String::as_str).collect();
            sink.write_all(join_line(&names).as_bytes()).await?;
        }

        let values: Vec<&str> = fields
            .iter()
            .map(|name| transformed.get(name).unwrap_or(""))
            .collect();
        sink.write_all(join_line(&values).as_bytes()).await?;
    }

    sink.flush().await?;
    sink.shutdown().await?;

    Ok(PipelineSummary { rows, fields })
}

fn join_line(values: &[&str]) -> String {
    let mut line = values.join(DELIMITER);
    line.push('\n');
    line
}

/// Run the pipeline from one stored file to its destination path.
///
/// Creates the destination's parent directory if absent. On failure the
/// destination file is left in place, incomplete; callers must treat a
/// present destination as inconclusive after an error.
#[instrument(skip_all, fields(source = %source.display(), destination = %destination.display()))]
pub async fn process_file(
    source: &Path,
    destination: &Path,
    timeout: Option<Duration>,
) -> Result<PipelineSummary, PipelineError> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let source = tokio::fs::File::open(source).await?;
    let sink = tokio::fs::File::create(destination).await?;

    let summary = match timeout {
        Some(limit) => tokio::time::timeout(limit, run(source, sink))
            .await
            .map_err(|_| PipelineError::Timeout(limit))??,
        None => run(source, sink).await?,
    };

    debug!(rows = summary.rows, "Pipeline run complete");
    Ok(summary)
}
