//! cctally - live token-count dashboard for path-tagged token records

use std::{
  io::IsTerminal,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tally_core::{Driver, DriverConfig, OutputFormat, PipelineConfig, RenderOptions, SortMode};
use tokio::io::BufReader;

mod logging;

#[derive(Parser)]
#[command(name = "cctally")]
#[command(about = "Live token-count dashboard for path-tagged token records")]
#[command(after_help = "\
INPUT FORMAT:
  <tokens> <relative-path> <absolute-path>    one record per line

EXAMPLES:
  token-scan src/ | cctally                 # live dashboard while counts stream in
  cctally --sort weight --min-tokens 100 records.txt
  cctally --dirs-only --max-depth 2 records.txt
  cctally --no-stream --json records.txt    # machine-readable final snapshot")]
struct Cli {
  /// Record file to read; stdin when omitted or `-`
  input: Option<PathBuf>,

  /// Only show directories, hiding file rows
  #[arg(long)]
  dirs_only: bool,

  /// Maximum tree depth to render (0 = unbounded)
  #[arg(long, default_value_t = 0)]
  max_depth: usize,

  /// Number of insertion workers
  #[arg(short = 'j', long, default_value_t = num_cpus::get())]
  parallelism: usize,

  /// Hide rows whose aggregate count is below this threshold
  #[arg(long, default_value_t = 0)]
  min_tokens: u64,

  /// Sibling ordering within each directory
  #[arg(long, value_enum, default_value = "name")]
  sort: SortArg,

  /// Disable live rendering; only produce the final render
  #[arg(long)]
  no_stream: bool,

  /// Redraw interval for the live dashboard, in milliseconds
  #[arg(long, default_value_t = 100)]
  interval_ms: u64,

  /// Emit the final tree as JSON instead of text (implies --no-stream)
  #[arg(long)]
  json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
  /// Lexicographic by segment name
  Name,
  /// Heaviest aggregate count first, ties broken by name
  Weight,
}

impl From<SortArg> for SortMode {
  fn from(sort: SortArg) -> Self {
    match sort {
      SortArg::Name => SortMode::Name,
      SortArg::Weight => SortMode::Weight,
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init();

  // A clear-and-redraw protocol is meaningless into a pipe.
  let stream = !cli.no_stream && !cli.json && std::io::stdout().is_terminal();

  let driver = Driver::new(DriverConfig {
    stream,
    interval: Duration::from_millis(cli.interval_ms.max(1)),
    format: if cli.json { OutputFormat::Json } else { OutputFormat::Text },
    render: RenderOptions {
      max_depth: cli.max_depth,
      min_tokens: cli.min_tokens,
      sort: cli.sort.into(),
      dirs_only: cli.dirs_only,
      ..RenderOptions::default()
    },
    pipeline: PipelineConfig {
      workers: cli.parallelism.max(1),
      ..PipelineConfig::default()
    },
  });

  let mut stdout = tokio::io::stdout();

  match cli.input {
    Some(path) if path != Path::new("-") => {
      let file = tokio::fs::File::open(&path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
      driver.run(BufReader::new(file), &mut stdout).await?;
    }
    _ => {
      driver.run(BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    }
  }

  Ok(())
}
