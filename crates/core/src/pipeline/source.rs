//! Line source stage - reads the input stream and feeds the worker queue.

use tokio::{
  io::{AsyncBufRead, AsyncBufReadExt},
  sync::mpsc,
};
use tracing::debug;

use super::Warning;

/// Read the input one line at a time and push each raw line onto the worker
/// queue. End-of-input is signalled by dropping the sender, which closes the
/// queue once the workers drain it.
///
/// A read failure on the stream itself is forwarded as a warning and treated
/// as end-of-input; the engine still reaches its final render.
///
/// Returns the number of lines read.
pub(crate) async fn line_source<R>(input: R, tx: mpsc::Sender<(usize, String)>, warn_tx: mpsc::Sender<Warning>) -> usize
where
  R: AsyncBufRead + Unpin,
{
  let mut lines = input.lines();
  let mut line_no = 0usize;

  loop {
    match lines.next_line().await {
      Ok(Some(line)) => {
        line_no += 1;
        if tx.send((line_no, line)).await.is_err() {
          debug!(line_no, "line source: workers gone, stopping");
          break;
        }
      }
      Ok(None) => {
        debug!(lines = line_no, "line source: input exhausted");
        break;
      }
      Err(error) => {
        let _ = warn_tx.send(Warning::StreamRead(error)).await;
        break;
      }
    }
  }

  line_no
}
