//! Error types for `folio-core`.
//!
//! These are the caller-actionable validation failures. "Not found" on reads
//! is never an error; lookups return `Option` instead.

use thiserror::Error;

use crate::{
  entity::{EntityKind, EntityRef},
  id::{NarrativeId, TemplateId, WorldObjectId},
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("narrative item not found: {0}")]
  NarrativeNotFound(NarrativeId),

  #[error("world object not found: {0}")]
  WorldObjectNotFound(WorldObjectId),

  #[error("template not found: {0}")]
  TemplateNotFound(TemplateId),

  #[error("no {category} template named {name:?}")]
  UnknownTemplate { name: String, category: EntityKind },

  #[error("template {id} belongs to the {actual} category, expected {expected}")]
  CategoryMismatch {
    id:       TemplateId,
    expected: EntityKind,
    actual:   EntityKind,
  },

  #[error("cannot delete narrative item {id}: it still has {count} child item(s)")]
  HasChildren { id: NarrativeId, count: u64 },

  #[error("cannot archive template {id}: it is used by {count} world object(s)")]
  TemplateInUse { id: TemplateId, count: u64 },

  #[error("could not find {0} for the connection")]
  MissingEntity(EntityRef),

  #[error("cannot move narrative item {id} under {parent}: that would create a cycle")]
  NarrativeCycle { id: NarrativeId, parent: NarrativeId },

  #[error("{0} name must not be empty")]
  EmptyName(&'static str),

  #[error("template name {0:?} cannot be used as a directory name")]
  InvalidTemplateName(String),

  #[error("unknown entity kind: {0:?}")]
  UnknownKind(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject names that are empty after trimming.
pub fn require_name(what: &'static str, name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::EmptyName(what));
  }
  Ok(())
}

/// Template names double as a directory name under the world directory, so
/// besides being non-empty they must be a single literal path component.
pub fn require_template_name(name: &str) -> Result<()> {
  require_name("template", name)?;
  if matches!(name, "." | "..") || name.contains(['/', '\\']) {
    return Err(Error::InvalidTemplateName(name.to_owned()));
  }
  Ok(())
}
