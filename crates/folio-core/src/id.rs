//! Strongly-typed row identifiers.
//!
//! Every table uses an integer primary key; the newtypes keep a narrative id
//! from being passed where a world object id or an identity is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl $name {
      pub fn get(self) -> i64 { self.0 }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
      }
    }

    impl From<i64> for $name {
      fn from(v: i64) -> Self { Self(v) }
    }
  };
}

row_id!(
  /// Primary key of a narrative item (part, chapter, scene, ...).
  NarrativeId
);
row_id!(
  /// Primary key of a world object (character, location, ...).
  WorldObjectId
);
row_id!(
  /// Primary key of an entity template.
  TemplateId
);
row_id!(
  /// Primary key of a connection edge.
  ConnectionId
);
row_id!(
  /// Opaque global identity shared by both concrete record kinds.
  ///
  /// Connections reference only this type. Values are never reused, so an
  /// identity whose owner was deleted can never resolve to a different record.
  EntityId
);
