//! Insertion workers - parse queued lines and apply them to the tree.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::trace;

use super::Warning;
use crate::{record::Record, tree::TokenTree};

/// Per-worker counters, summed into the pipeline stats.
#[derive(Debug, Default)]
pub(crate) struct WorkerStats {
  pub(crate) inserted: usize,
  pub(crate) malformed: usize,
}

/// One insertion worker. The pool shares a single receiver behind a mutex;
/// each worker pulls a line, parses it and inserts on success. Parse failures
/// go to the warning channel and never halt the worker. Workers terminate
/// when the queue is closed and drained.
pub(crate) async fn insert_worker(
  worker_id: usize,
  rx: Arc<Mutex<mpsc::Receiver<(usize, String)>>>,
  tree: Arc<TokenTree>,
  warn_tx: mpsc::Sender<Warning>,
) -> WorkerStats {
  trace!(worker_id, "insert worker starting");
  let mut stats = WorkerStats::default();

  loop {
    let msg = { rx.lock().await.recv().await };

    match msg {
      Some((line_no, line)) => match Record::parse(&line) {
        Ok(record) => {
          tree.insert(&record.path, record.tokens).await;
          stats.inserted += 1;
        }
        Err(source) => {
          stats.malformed += 1;
          let _ = warn_tx.send(Warning::MalformedRecord { line_no, line, source }).await;
        }
      },
      None => {
        trace!(worker_id, inserted = stats.inserted, "insert worker: queue drained");
        break;
      }
    }
  }

  stats
}
