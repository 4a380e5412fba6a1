//! The display-ready read model for a single entity.
//!
//! [`ItemDetails`] is never stored; it is assembled per request from the
//! record, its template, and the file on disk.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{entity::EntityRef, world::CustomField};

/// Content shown when the entity's file does not exist yet.
pub const MISSING_FILE_PLACEHOLDER: &str =
  "# File not found\nCreate the file to start writing; use \"create file\" to create it.";

/// Content shown when the file exists but reading it failed.
pub const UNREADABLE_FILE_PLACEHOLDER: &str =
  "# Error reading file\nThe file exists but could not be read.";

/// Result of probing a path on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
  pub mtime: DateTime<Utc>,
  pub len:   u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDetails {
  pub entity:        EntityRef,
  pub name:          String,
  /// Absolute path of the backing file, when the entity has one.
  pub path:          Option<PathBuf>,
  pub content:       String,
  /// `true` only when the file existed and was read successfully.
  pub file_exists:   bool,
  /// Modification time captured when the content was read.
  pub mtime:         Option<DateTime<Utc>>,
  /// Present for world objects only.
  pub custom_fields: Option<Vec<CustomField>>,
}

impl ItemDetails {
  /// Whether a fresh stat of the backing file means this aggregate is out of
  /// date and has to be reassembled.
  ///
  /// Only aggregates that were built from a readable file can go stale; the
  /// file vanishing counts as a change.
  pub fn is_stale(&self, current: Option<&FileStat>) -> bool {
    if !self.file_exists {
      return false;
    }
    match current {
      Some(stat) => Some(stat.mtime) != self.mtime,
      None => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::id::NarrativeId;

  fn details(file_exists: bool, mtime: Option<DateTime<Utc>>) -> ItemDetails {
    ItemDetails {
      entity: EntityRef::Narrative(NarrativeId(1)),
      name: "Ch1".into(),
      path: Some("/p/narrative/ch1.md".into()),
      content: String::new(),
      file_exists,
      mtime,
      custom_fields: None,
    }
  }

  #[test]
  fn changed_mtime_is_stale() {
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let t1 = Utc.timestamp_opt(1_700_000_060, 0).unwrap();
    let held = details(true, Some(t0));

    assert!(!held.is_stale(Some(&FileStat { mtime: t0, len: 3 })));
    assert!(held.is_stale(Some(&FileStat { mtime: t1, len: 3 })));
    assert!(held.is_stale(None));
  }

  #[test]
  fn placeholder_aggregates_never_go_stale() {
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let held = details(false, None);
    assert!(!held.is_stale(Some(&FileStat { mtime: t0, len: 0 })));
  }
}
