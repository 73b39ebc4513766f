//! Streaming insertion pipeline.
//!
//! One line source feeds a bounded queue drained by a fixed pool of
//! insertion workers:
//!
//! ```text
//! Line source → queue → N insert workers → TokenTree
//!                           ↓ (failures)
//!                      warning channel
//! ```
//!
//! When the queue is full the source blocks, naturally propagating
//! backpressure. There is no fatal error path: malformed records and stream
//! read failures become warnings on a separate channel, drained by the
//! driver without disturbing insertion or rendering.

mod source;
mod worker;

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

use self::{source::line_source, worker::insert_worker};
use crate::{record::RecordError, tree::TokenTree};

/// Configuration for the insertion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
  /// Number of insertion workers (clamped to at least 1).
  pub workers: usize,
  /// Line queue depth between the source and the workers.
  pub queue_depth: usize,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      workers: num_cpus::get(),
      queue_depth: 256,
    }
  }
}

/// Non-fatal conditions reported on the warning channel.
#[derive(Debug, thiserror::Error)]
pub enum Warning {
  #[error("skipping malformed record at line {line_no}: {source} ({line:?})")]
  MalformedRecord {
    line_no: usize,
    line: String,
    source: RecordError,
  },
  #[error("input stream read failed, treating as end of input: {0}")]
  StreamRead(#[source] std::io::Error),
}

/// Counters for one full pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
  pub lines_read: usize,
  pub records_inserted: usize,
  pub malformed: usize,
}

/// Run the full pipeline to completion: spawn the line source and the worker
/// pool, wait for the source to exhaust the input and the workers to drain
/// the queue, and return the run's counters.
///
/// `warn_tx` (and its clones) are dropped on completion, which closes the
/// warning channel and tells the driver no further diagnostics can arrive.
pub async fn run_pipeline<R>(
  input: R,
  tree: Arc<TokenTree>,
  config: PipelineConfig,
  warn_tx: mpsc::Sender<Warning>,
) -> PipelineStats
where
  R: tokio::io::AsyncBufRead + Unpin + Send + 'static,
{
  let workers = config.workers.max(1);
  debug!(workers, queue_depth = config.queue_depth, "pipeline starting");

  let (line_tx, line_rx) = mpsc::channel(config.queue_depth.max(1));
  let line_rx = Arc::new(Mutex::new(line_rx));

  let source = tokio::spawn(line_source(input, line_tx, warn_tx.clone()));

  let mut handles = Vec::with_capacity(workers);
  for worker_id in 0..workers {
    handles.push(tokio::spawn(insert_worker(
      worker_id,
      line_rx.clone(),
      tree.clone(),
      warn_tx.clone(),
    )));
  }
  drop(warn_tx);

  let mut stats = PipelineStats::default();

  match source.await {
    Ok(lines_read) => stats.lines_read = lines_read,
    Err(error) => error!(error = %error, "line source task failed"),
  }

  for result in join_all(handles).await {
    match result {
      Ok(worker_stats) => {
        stats.records_inserted += worker_stats.inserted;
        stats.malformed += worker_stats.malformed;
      }
      Err(error) => error!(error = %error, "insert worker task failed"),
    }
  }

  debug!(
    lines = stats.lines_read,
    records = stats.records_inserted,
    malformed = stats.malformed,
    "pipeline complete"
  );
  stats
}
