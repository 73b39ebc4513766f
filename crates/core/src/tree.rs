//! The shared aggregate tree.
//!
//! A prefix tree keyed by path segment where every node carries the sum of
//! the token counts of all records whose path passes through it. The whole
//! tree sits behind a single `RwLock`: one exclusive acquisition per insert
//! walk, one shared acquisition per render pass. That makes every insert
//! atomic with respect to readers and other writers, and because insertion is
//! purely additive and commutative, final aggregates are independent of
//! worker scheduling order.

use std::{collections::HashMap, time::Instant};

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Name of the synthetic root node.
pub const ROOT_NAME: &str = ".";

/// One path segment and its aggregate count.
#[derive(Debug)]
pub struct Node {
  pub(crate) name: String,
  pub(crate) tokens: u64,
  pub(crate) children: HashMap<String, Node>,
  /// Whether this node has ever been the terminal segment of a record.
  pub(crate) terminal: bool,
  /// Most recent insertion that visited this node. Only consulted for
  /// live-render emphasis, never for correctness.
  pub(crate) touched: Instant,
}

impl Node {
  fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      tokens: 0,
      children: HashMap::new(),
      terminal: false,
      touched: Instant::now(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn tokens(&self) -> u64 {
    self.tokens
  }

  /// Derived node kind. A node can be a directory and a file at once when a
  /// record terminated at it and a longer record later passed through it.
  pub fn kind(&self) -> NodeKind {
    match (self.children.is_empty(), self.terminal) {
      (false, true) => NodeKind::Both,
      (false, false) => NodeKind::Directory,
      (true, true) => NodeKind::File,
      // Only the untouched root has neither children nor a terminal record.
      (true, false) => NodeKind::Directory,
    }
  }
}

/// Explicit tri-state for dual-status nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  File,
  Directory,
  Both,
}

/// Concurrency-safe aggregate tree, exposed only through its own locked
/// operations. Nodes are created lazily on first reference and never deleted;
/// counts only ever increase.
pub struct TokenTree {
  root: RwLock<Node>,
}

impl TokenTree {
  pub fn new() -> Self {
    Self {
      root: RwLock::new(Node::new(ROOT_NAME)),
    }
  }

  /// Add `tokens` along every node of `path`, creating nodes as needed.
  ///
  /// The path is split on `/` with empty and `.` segments discarded, so
  /// `./a/b`, `a/b` and `a/b/` are all the same chain. The terminal node is
  /// marked as having carried a record of its own. Safe under unbounded
  /// concurrent callers; the write lock is held for the full walk.
  pub async fn insert(&self, path: &str, tokens: u64) {
    let now = Instant::now();
    let mut root = self.root.write().await;

    root.tokens += tokens;
    root.touched = now;

    let mut node = &mut *root;
    for segment in segments(path) {
      node = node.children.entry(segment.to_string()).or_insert_with(|| Node::new(segment));
      node.tokens += tokens;
      node.touched = now;
    }
    node.terminal = true;
  }

  /// Shared read access for one render pass. Holding the guard excludes
  /// inserts, so the renderer always observes an internally consistent tree.
  pub async fn read(&self) -> RwLockReadGuard<'_, Node> {
    self.root.read().await
  }

  /// Root aggregate: the token total across every inserted record.
  pub async fn total_tokens(&self) -> u64 {
    self.root.read().await.tokens
  }

  /// Deep, name-sorted copy of the tree for machine-readable output.
  pub async fn snapshot(&self) -> TreeSnapshot {
    let root = self.root.read().await;
    TreeSnapshot::from_node(&root)
  }
}

impl Default for TokenTree {
  fn default() -> Self {
    Self::new()
  }
}

/// Serializable point-in-time copy of one subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot {
  pub name: String,
  pub tokens: u64,
  pub kind: NodeKind,
  pub children: Vec<TreeSnapshot>,
}

impl TreeSnapshot {
  fn from_node(node: &Node) -> Self {
    let mut children: Vec<TreeSnapshot> = node.children.values().map(Self::from_node).collect();
    children.sort_by(|a, b| a.name.cmp(&b.name));
    Self {
      name: node.name.clone(),
      tokens: node.tokens,
      kind: node.kind(),
      children,
    }
  }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|segment| !segment.is_empty() && *segment != ".")
}
