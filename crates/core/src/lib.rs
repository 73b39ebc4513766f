//! Streaming token-count aggregation engine.
//!
//! Ingests a line-oriented stream of `(token-count, relative-path, source)`
//! records, accumulates per-segment aggregates into a lock-guarded prefix
//! tree, and renders the tree as a live text dashboard while input is still
//! arriving, switching to a single final render on completion.
//!
//! ```text
//! Line source → queue → N insert workers → TokenTree (RwLock)
//!                                               ↑ shared reads
//!                     Driver ← interval ticks ← Renderer
//! ```

mod driver;
mod pipeline;
mod record;
mod render;
mod tree;

pub use driver::{Driver, DriverConfig, DriverError, OutputFormat};
pub use pipeline::{PipelineConfig, PipelineStats, Warning, run_pipeline};
pub use record::{Record, RecordError};
pub use render::{CLEAR_SCREEN, RenderOptions, SortMode, render};
pub use tree::{Node, NodeKind, TokenTree, TreeSnapshot};
