//! Tree rendering.
//!
//! Produces the indented connector-style text for one pass over the tree,
//! holding the shared read lock for the duration of the pass. The renderer
//! never mutates the tree and never touches the output sink itself; the
//! driver owns timing, clearing and writing.

use std::time::{Duration, Instant};

use crate::tree::{Node, NodeKind, TokenTree};

/// ANSI clear-screen + cursor-home, written by the driver before each live
/// frame and before the final frame in streaming mode.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

const EMPHASIS: &str = "\x1b[1m";
const EMPHASIS_RESET: &str = "\x1b[0m";

/// Sibling ordering within each directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
  /// Lexicographic ascending by segment name.
  #[default]
  Name,
  /// Non-increasing aggregate count, ties broken by name.
  Weight,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
  /// Maximum depth to visit, root at depth 0. Zero means unbounded. Unlike
  /// the token threshold this is a true prune: deeper nodes are not visited.
  pub max_depth: usize,
  /// Per-node display threshold. A node below the threshold is not printed,
  /// but recursion into its children still proceeds and each child is judged
  /// independently. The root is always printed.
  pub min_tokens: u64,
  pub sort: SortMode,
  /// Drop file rows entirely, keeping directory and dual-status rows.
  pub dirs_only: bool,
  /// Emphasize recently-mutated rows. Never set on the final render.
  pub live: bool,
  /// Recency window for live emphasis.
  pub highlight_window: Duration,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      max_depth: 0,
      min_tokens: 0,
      sort: SortMode::default(),
      dirs_only: false,
      live: false,
      highlight_window: Duration::from_millis(300),
    }
  }
}

/// Render one pass over the tree into a string, one line per displayed node.
pub async fn render(tree: &TokenTree, opts: &RenderOptions) -> String {
  let root = tree.read().await;
  let now = Instant::now();
  let mut out = String::new();

  // Root is always printed, threshold and dirs-only notwithstanding.
  push_line(&mut out, "", "", &root, true, now, opts);
  render_children(&mut out, &root, "", 1, now, opts);
  out
}

fn render_children(out: &mut String, node: &Node, prefix: &str, depth: usize, now: Instant, opts: &RenderOptions) {
  if opts.max_depth > 0 && depth > opts.max_depth {
    return;
  }

  let mut siblings: Vec<&Node> = node
    .children
    .values()
    .filter(|child| !(opts.dirs_only && child.kind() == NodeKind::File))
    .collect();
  sort_siblings(&mut siblings, opts.sort);

  for (index, child) in siblings.iter().enumerate() {
    let is_last = index + 1 == siblings.len();

    if child.tokens >= opts.min_tokens {
      let connector = if is_last { "└── " } else { "├── " };
      push_line(out, prefix, connector, child, false, now, opts);
    }

    let extension = if is_last { "    " } else { "│   " };
    let child_prefix = format!("{prefix}{extension}");
    render_children(out, child, &child_prefix, depth + 1, now, opts);
  }
}

fn sort_siblings(siblings: &mut [&Node], sort: SortMode) {
  match sort {
    SortMode::Name => siblings.sort_by(|a, b| a.name.cmp(&b.name)),
    SortMode::Weight => siblings.sort_by(|a, b| b.tokens.cmp(&a.tokens).then_with(|| a.name.cmp(&b.name))),
  }
}

fn push_line(
  out: &mut String,
  prefix: &str,
  connector: &str,
  node: &Node,
  is_root: bool,
  now: Instant,
  opts: &RenderOptions,
) {
  let emphasized = opts.live && now.duration_since(node.touched) <= opts.highlight_window;
  let suffix = match node.kind() {
    // The root's `.` already reads as a directory.
    _ if is_root => "",
    NodeKind::Directory | NodeKind::Both => "/",
    NodeKind::File => "",
  };

  if emphasized {
    out.push_str(EMPHASIS);
  }
  out.push_str(&format!("{prefix}{connector}{}{suffix} ({} tokens)", node.name, node.tokens));
  if emphasized {
    out.push_str(EMPHASIS_RESET);
  }
  out.push('\n');
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::tree::TokenTree;

  async fn sample_tree() -> TokenTree {
    let tree = TokenTree::new();
    tree.insert("a/b/c.go", 10).await;
    tree.insert("a/b/d.go", 5).await;
    tree.insert("a/e.go", 3).await;
    tree
  }

  #[tokio::test]
  async fn renders_full_tree_by_name() {
    let tree = sample_tree().await;
    let out = render(&tree, &RenderOptions::default()).await;
    assert_eq!(
      out,
      ". (18 tokens)\n\
       └── a/ (18 tokens)\n    \
           ├── b/ (15 tokens)\n    \
           │   ├── c.go (10 tokens)\n    \
           │   └── d.go (5 tokens)\n    \
           └── e.go (3 tokens)\n"
    );
  }

  #[tokio::test]
  async fn threshold_filters_display_without_pruning() {
    let tree = sample_tree().await;
    let opts = RenderOptions {
      min_tokens: 4,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;

    // a/e.go (3) drops out; a/b/d.go (5) and the whole ancestor chain stay.
    assert_eq!(
      out,
      ". (18 tokens)\n\
       └── a/ (18 tokens)\n    \
           ├── b/ (15 tokens)\n    \
           │   ├── c.go (10 tokens)\n    \
           │   └── d.go (5 tokens)\n"
    );
  }

  #[tokio::test]
  async fn root_is_printed_even_below_threshold() {
    let tree = sample_tree().await;
    let opts = RenderOptions {
      min_tokens: 100,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;
    assert_eq!(out, ". (18 tokens)\n");
  }

  #[tokio::test]
  async fn threshold_boundary_is_inclusive() {
    let tree = TokenTree::new();
    tree.insert("exact/hit.go", 50).await;
    let opts = RenderOptions {
      min_tokens: 50,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;
    assert!(out.contains("exact/"), "{out}");
    assert!(out.contains("hit.go"), "{out}");
  }

  #[tokio::test]
  async fn depth_limit_is_a_true_prune() {
    let tree = sample_tree().await;
    let opts = RenderOptions {
      max_depth: 1,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;
    assert_eq!(
      out,
      ". (18 tokens)\n\
       └── a/ (18 tokens)\n"
    );
  }

  #[tokio::test]
  async fn weight_sort_orders_by_count_then_name() {
    let tree = sample_tree().await;
    tree.insert("z.go", 100).await;
    tree.insert("mirror.go", 3).await;
    tree.insert("apple.go", 3).await;

    let opts = RenderOptions {
      sort: SortMode::Weight,
      max_depth: 1,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;

    // z.go (100) > a (18) > the two 3-token files, tied and broken by name.
    assert_eq!(
      out,
      ". (124 tokens)\n\
       ├── z.go (100 tokens)\n\
       ├── a/ (18 tokens)\n\
       ├── apple.go (3 tokens)\n\
       └── mirror.go (3 tokens)\n"
    );
  }

  #[tokio::test]
  async fn weight_sort_applies_at_every_level() {
    let tree = sample_tree().await;
    tree.insert("a/b/aa.go", 1).await;

    let opts = RenderOptions {
      sort: SortMode::Weight,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;

    // Within a/b/, aa.go would lead under name ordering but sinks to the
    // bottom by weight.
    assert_eq!(
      out,
      ". (19 tokens)\n\
       └── a/ (19 tokens)\n    \
           ├── b/ (16 tokens)\n    \
           │   ├── c.go (10 tokens)\n    \
           │   ├── d.go (5 tokens)\n    \
           │   └── aa.go (1 tokens)\n    \
           └── e.go (3 tokens)\n"
    );
  }

  #[tokio::test]
  async fn dirs_only_drops_file_rows() {
    let tree = sample_tree().await;
    let opts = RenderOptions {
      dirs_only: true,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;
    assert_eq!(
      out,
      ". (18 tokens)\n\
       └── a/ (18 tokens)\n    \
           └── b/ (15 tokens)\n"
    );
  }

  #[tokio::test]
  async fn dirs_only_keeps_dual_status_nodes() {
    let tree = TokenTree::new();
    tree.insert("pkg", 4).await;
    tree.insert("pkg/lib.rs", 6).await;

    let opts = RenderOptions {
      dirs_only: true,
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;
    assert!(out.contains("pkg/ (10 tokens)"), "{out}");
    assert!(!out.contains("lib.rs"), "{out}");
  }

  #[tokio::test]
  async fn live_render_emphasizes_recent_mutations() {
    let tree = sample_tree().await;
    let opts = RenderOptions {
      live: true,
      highlight_window: Duration::from_secs(3600),
      ..RenderOptions::default()
    };
    let out = render(&tree, &opts).await;
    assert!(out.contains(EMPHASIS), "freshly inserted rows should be emphasized:\n{out}");
  }

  #[tokio::test]
  async fn final_render_is_plain_and_idempotent() {
    let tree = sample_tree().await;
    let opts = RenderOptions::default();

    let first = render(&tree, &opts).await;
    let second = render(&tree, &opts).await;

    assert_eq!(first, second);
    assert!(!first.contains('\x1b'), "final render must carry no escape sequences");
  }
}
