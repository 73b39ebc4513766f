//! Driver - wires the pipeline, the tree and the renderer together.
//!
//! Streaming mode runs a periodic clear-and-redraw loop while input is still
//! arriving; batch mode waits silently. Both end with exactly one final
//! render with no emphasis markers. Warnings drain concurrently at any point
//! and go to the diagnostic stream via `tracing`, never to the dashboard.

use std::{sync::Arc, time::Duration};

use tokio::{
  io::{AsyncBufRead, AsyncWrite, AsyncWriteExt},
  sync::mpsc,
  time,
};
use tracing::{debug, info, warn};

use crate::{
  pipeline::{PipelineConfig, PipelineStats, run_pipeline},
  render::{CLEAR_SCREEN, RenderOptions, render},
  tree::TokenTree,
};

/// Buffer for the warning channel; the driver drains it continuously, so it
/// only needs to absorb short bursts.
const WARN_BUFFER: usize = 64;

/// Shape of the final output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
  /// Indented connector-style tree text.
  #[default]
  Text,
  /// JSON snapshot of the final tree. Implies batch mode.
  Json,
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
  /// Periodic live rendering while input is open. Ignored for JSON output.
  pub stream: bool,
  /// Redraw period in streaming mode.
  pub interval: Duration,
  pub format: OutputFormat,
  pub render: RenderOptions,
  pub pipeline: PipelineConfig,
}

impl Default for DriverConfig {
  fn default() -> Self {
    Self {
      stream: true,
      interval: Duration::from_millis(100),
      format: OutputFormat::default(),
      render: RenderOptions::default(),
      pipeline: PipelineConfig::default(),
    }
  }
}

/// The only failure paths in the engine, all outside the pipeline proper:
/// the output sink, the snapshot encoder, and the spawned pipeline task.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
  #[error("failed to write to output sink")]
  Output(#[from] std::io::Error),
  #[error("failed to encode JSON snapshot")]
  Encode(#[from] serde_json::Error),
  #[error("pipeline task failed")]
  Pipeline(#[from] tokio::task::JoinError),
}

pub struct Driver {
  config: DriverConfig,
}

impl Driver {
  pub fn new(config: DriverConfig) -> Self {
    Self { config }
  }

  /// Run the engine to completion: aggregate every record on `input`, render
  /// to `out`, and return the run's counters. Always reaches the final
  /// render; per-record and per-stream failures are demoted to warnings.
  pub async fn run<R, W>(&self, input: R, out: &mut W) -> Result<PipelineStats, DriverError>
  where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
  {
    let tree = Arc::new(TokenTree::new());
    let (warn_tx, mut warn_rx) = mpsc::channel(WARN_BUFFER);

    let mut pipeline = tokio::spawn(run_pipeline(
      input,
      tree.clone(),
      self.config.pipeline.clone(),
      warn_tx,
    ));

    let streaming = self.config.stream && self.config.format == OutputFormat::Text;
    debug!(streaming, "driver starting");

    let stats = if streaming {
      let live = RenderOptions {
        live: true,
        ..self.config.render.clone()
      };
      let mut interval = time::interval(self.config.interval);

      loop {
        tokio::select! {
          result = &mut pipeline => break result?,
          Some(warning) = warn_rx.recv() => warn!(%warning),
          _ = interval.tick() => {
            let frame = render(&tree, &live).await;
            out.write_all(CLEAR_SCREEN.as_bytes()).await?;
            out.write_all(frame.as_bytes()).await?;
            out.flush().await?;
          }
        }
      }
    } else {
      loop {
        tokio::select! {
          result = &mut pipeline => break result?,
          Some(warning) = warn_rx.recv() => warn!(%warning),
        }
      }
    };

    // The pipeline dropped its warning senders on completion; report
    // anything still queued before the final render.
    while let Ok(warning) = warn_rx.try_recv() {
      warn!(%warning);
    }

    match self.config.format {
      OutputFormat::Text => {
        let final_opts = RenderOptions {
          live: false,
          ..self.config.render.clone()
        };
        let frame = render(&tree, &final_opts).await;
        if streaming {
          out.write_all(CLEAR_SCREEN.as_bytes()).await?;
        }
        out.write_all(frame.as_bytes()).await?;
      }
      OutputFormat::Json => {
        let snapshot = tree.snapshot().await;
        let mut encoded = serde_json::to_string_pretty(&snapshot)?;
        encoded.push('\n');
        out.write_all(encoded.as_bytes()).await?;
      }
    }
    out.flush().await?;

    info!(
      lines = stats.lines_read,
      records = stats.records_inserted,
      malformed = stats.malformed,
      total_tokens = tree.total_tokens().await,
      "aggregation complete"
    );
    Ok(stats)
  }
}
