//! The unified identity space over narrative items and world objects.
//!
//! Narrative items and world objects live in two disjoint tables. Everything
//! that has to treat them uniformly (connections, search) works with an
//! [`EntityRef`] — a tagged pointer into one of the two tables — or with the
//! opaque [`EntityId`] the store assigns to each record.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  id::{EntityId, NarrativeId, WorldObjectId},
};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which concrete table a record lives in. Also used as a template category:
/// the two kinds never share templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  Narrative,
  World,
}

impl EntityKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Narrative => "narrative",
      Self::World => "world",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EntityKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "narrative" => Ok(Self::Narrative),
      "world" => Ok(Self::World),
      other => Err(Error::UnknownKind(other.to_owned())),
    }
  }
}

// ─── Tagged reference ────────────────────────────────────────────────────────

/// A concrete record address: kind tag plus the id within that kind's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
  Narrative(NarrativeId),
  World(WorldObjectId),
}

impl EntityRef {
  /// Build a reference from a kind tag and a raw row id.
  pub fn new(kind: EntityKind, id: i64) -> Self {
    match kind {
      EntityKind::Narrative => Self::Narrative(NarrativeId(id)),
      EntityKind::World => Self::World(WorldObjectId(id)),
    }
  }

  pub fn kind(self) -> EntityKind {
    match self {
      Self::Narrative(_) => EntityKind::Narrative,
      Self::World(_) => EntityKind::World,
    }
  }

  /// The row id inside the kind's own table.
  pub fn raw_id(self) -> i64 {
    match self {
      Self::Narrative(id) => id.get(),
      Self::World(id) => id.get(),
    }
  }
}

impl fmt::Display for EntityRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.kind(), self.raw_id())
  }
}

impl From<NarrativeId> for EntityRef {
  fn from(id: NarrativeId) -> Self { Self::Narrative(id) }
}

impl From<WorldObjectId> for EntityRef {
  fn from(id: WorldObjectId) -> Self { Self::World(id) }
}

// ─── Resolution results ──────────────────────────────────────────────────────

/// One row of a bulk reverse lookup: an identity and the record that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntity {
  pub entity_id: EntityId,
  pub entity:    EntityRef,
}

/// A human-presentable handle on any entity: where it lives, what it is
/// called, and its identity. Used for connection endpoints and search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
  pub entity:    EntityRef,
  pub name:      String,
  pub entity_id: EntityId,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_parses_its_own_display() {
    for kind in [EntityKind::Narrative, EntityKind::World] {
      assert_eq!(kind.to_string().parse::<EntityKind>().unwrap(), kind);
    }
    assert!("scene".parse::<EntityKind>().is_err());
  }

  #[test]
  fn entity_ref_serializes_with_kind_tag() {
    let json = serde_json::to_value(EntityRef::World(WorldObjectId(7))).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "world", "id": 7 }));
  }

  #[test]
  fn entity_ref_round_trips_through_kind_and_raw_id() {
    let r = EntityRef::new(EntityKind::Narrative, 3);
    assert_eq!(r, EntityRef::Narrative(NarrativeId(3)));
    assert_eq!(r.kind(), EntityKind::Narrative);
    assert_eq!(r.raw_id(), 3);
  }
}
