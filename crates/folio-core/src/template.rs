//! Templates — user-defined record kinds with an ordered custom-field schema.
//!
//! A field is identified by an internal [`FieldKey`] that is generated once and
//! never derived from the field's label, so relabelling a field (or renaming
//! the template) never orphans the values stored under that key.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{entity::EntityKind, id::TemplateId};

// ─── Field keys ──────────────────────────────────────────────────────────────

/// Stable internal identifier of a custom field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(pub String);

impl FieldKey {
  /// Generate a fresh key. Keys are random, so they never collide across
  /// calls and are never reused after a field is dropped.
  pub fn generate() -> Self { Self(format!("field_{}", Uuid::new_v4().simple())) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FieldKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for FieldKey {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

/// One entry of a template's field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
  /// Older project files store the key under `name`.
  #[serde(alias = "name")]
  pub key:   FieldKey,
  pub label: String,
}

impl FieldDescriptor {
  /// A new field with a freshly generated key.
  pub fn with_label(label: impl Into<String>) -> Self {
    Self { key: FieldKey::generate(), label: label.into() }
  }
}

/// Build a schema for `labels`, generating one key per label, in order.
pub fn schema_from_labels<I, S>(labels: I) -> Vec<FieldDescriptor>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
{
  labels.into_iter().map(FieldDescriptor::with_label).collect()
}

// ─── Template ────────────────────────────────────────────────────────────────

/// A named schema definition for records of one [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
  pub id:         TemplateId,
  pub name:       String,
  pub category:   EntityKind,
  pub fields:     Vec<FieldDescriptor>,
  /// `false` once archived. Archived templates are hidden from creation
  /// pickers but stay valid for the records that already use them.
  pub is_visible: bool,
}

/// Parameters for [`ProjectStore::create_template`](crate::store::ProjectStore::create_template).
#[derive(Debug, Clone)]
pub struct NewTemplate {
  pub name:     String,
  pub category: EntityKind,
  pub fields:   Vec<FieldDescriptor>,
}

impl NewTemplate {
  pub fn new<I, S>(name: impl Into<String>, category: EntityKind, labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self { name: name.into(), category, fields: schema_from_labels(labels) }
  }
}

/// Filter for [`ProjectStore::list_templates`](crate::store::ProjectStore::list_templates).
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateQuery {
  pub include_archived: bool,
  pub category:         Option<EntityKind>,
}

/// The light-weight "kind" entry shown in the world catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObjectKind {
  pub id:         TemplateId,
  pub name:       String,
  /// `false` once archived; hidden from creation but still browsable.
  pub is_visible: bool,
}
