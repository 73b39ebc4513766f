//! Record parsing for the token stream input format.
//!
//! Each input line carries one record:
//!
//! ```text
//! <token-count> <relative-path> <absolute-path>
//! ```
//!
//! The line is split on the first two whitespace boundaries only, so the
//! trailing source path may itself contain whitespace.

/// One parsed input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
  /// Pre-computed token count for this path.
  pub tokens: u64,
  /// Relative path aggregated into the tree.
  pub path: String,
  /// Absolute source path. Accepted for input-format compatibility; the tree
  /// never consumes it.
  pub source: String,
}

/// Errors produced by [`Record::parse`].
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
  #[error("expected `<tokens> <path> <source>`, got {found} field(s)")]
  MissingFields { found: usize },
  #[error("invalid token count {value:?}")]
  InvalidCount {
    value: String,
    #[source]
    source: std::num::ParseIntError,
  },
}

impl Record {
  /// Parse one input line into a record.
  ///
  /// Pure function of the line; malformed lines are the caller's problem to
  /// report (they never abort the pipeline).
  pub fn parse(line: &str) -> Result<Self, RecordError> {
    let line = line.trim();
    let mut fields = line.splitn(3, |c: char| c.is_ascii_whitespace());

    let (Some(count), Some(path), Some(source)) = (fields.next(), fields.next(), fields.next()) else {
      return Err(RecordError::MissingFields {
        found: line.split_ascii_whitespace().count(),
      });
    };

    let tokens = count.parse::<u64>().map_err(|source| RecordError::InvalidCount {
      value: count.to_string(),
      source,
    })?;

    Ok(Self {
      tokens,
      path: path.to_string(),
      source: source.to_string(),
    })
  }
}
