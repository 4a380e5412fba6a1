//! Where things live inside a project directory.

use std::path::{Path, PathBuf};

use folio_core::id::WorldObjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Project-relative locations of the database and the content directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
  pub database_file: PathBuf,
  pub narrative_dir: PathBuf,
  pub world_dir:     PathBuf,
}

impl Default for ProjectLayout {
  fn default() -> Self {
    Self {
      database_file: "project.sqlite".into(),
      narrative_dir: "narrative".into(),
      world_dir:     "world".into(),
    }
  }
}

impl ProjectLayout {
  /// A fresh, unique relative path for a new narrative item's file.
  pub fn new_narrative_file(&self) -> PathBuf {
    self
      .narrative_dir
      .join(format!("{}.md", Uuid::new_v4().simple()))
  }

  /// `<world>/<kind>/<id>`, the directory owned by one world object.
  pub fn world_object_dir(&self, kind_name: &str, id: WorldObjectId) -> PathBuf {
    self
      .world_dir
      .join(path_segment(kind_name))
      .join(id.to_string())
  }

  /// `<world>/<kind>/<id>/content.md`. The path is derived, never stored, so
  /// renaming a kind moves where all of its objects' content is looked up.
  pub fn world_object_file(&self, kind_name: &str, id: WorldObjectId) -> PathBuf {
    self.world_object_dir(kind_name, id).join("content.md")
  }

  /// Every path that must exist for a directory to be an openable project.
  pub fn required_paths(&self) -> [&Path; 3] {
    [&self.database_file, &self.narrative_dir, &self.world_dir]
  }
}

/// The kind name as a single path component. Names are validated when
/// templates are written, so only rows from elsewhere hit the fallbacks.
fn path_segment(name: &str) -> String {
  match name {
    "" | "." | ".." => "_".to_owned(),
    s => s.replace(['/', '\\'], "_"),
  }
}
