//! Change notifications published by an open project.
//!
//! Mutations publish after they complete; subscribers decide when to refresh.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{entity::EntityRef, id::TemplateId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProjectEvent {
  ProjectOpened { root: PathBuf },
  ProjectClosed,
  /// Any narrative item was created, renamed, moved or deleted.
  NarrativeChanged,
  /// The world objects of one kind changed.
  WorldObjectsChanged { template_id: TemplateId },
  TemplatesChanged,
  /// A connection between `entities` was created or removed. Endpoints that
  /// no longer resolve are left out.
  ConnectionsChanged { entities: Vec<EntityRef> },
}
