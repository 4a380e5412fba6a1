//! The `all_entities` indirection table.

use std::collections::HashMap;

use folio_core::{
  entity::{EntityKind, EntityRef, ResolvedEntity},
  id::EntityId,
};
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use crate::{
  Result,
  encode::{RawIdentity, placeholders},
};

/// The concrete table holding records of `kind`.
pub fn table_of(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Narrative => "narrative_items",
    EntityKind::World => "world_objects",
  }
}

fn owner_column(entity: EntityRef) -> &'static str {
  match entity {
    EntityRef::Narrative(_) => "narrative_id",
    EntityRef::World(_) => "world_object_id",
  }
}

/// Create the identity owned by `entity`. Must run in the same transaction
/// as the insert of the owning row.
pub fn insert(conn: &Connection, entity: EntityRef) -> Result<EntityId> {
  let sql = format!("INSERT INTO all_entities ({}) VALUES (?1)", owner_column(entity));
  conn.execute(&sql, params![entity.raw_id()])?;
  Ok(EntityId(conn.last_insert_rowid()))
}

pub fn find(conn: &Connection, entity: EntityRef) -> Result<Option<EntityId>> {
  let sql = format!("SELECT id FROM all_entities WHERE {} = ?1", owner_column(entity));
  let id = conn
    .query_row(&sql, params![entity.raw_id()], |row| row.get(0))
    .optional()?;
  Ok(id.map(EntityId))
}

/// One query for the whole set; identities without a row are dropped.
pub fn resolve(conn: &Connection, ids: &[EntityId]) -> Result<Vec<ResolvedEntity>> {
  if ids.is_empty() {
    return Ok(Vec::new());
  }

  let sql = format!(
    "SELECT id, narrative_id, world_object_id FROM all_entities WHERE id IN ({})",
    placeholders(ids.len())
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params_from_iter(ids.iter().map(|id| id.get())), |row| {
      Ok(RawIdentity {
        id:              row.get(0)?,
        narrative_id:    row.get(1)?,
        world_object_id: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawIdentity::into_resolved).collect()
}

/// Names for a batch of records: at most one query per concrete table.
pub fn names(conn: &Connection, entities: &[EntityRef]) -> Result<HashMap<EntityRef, String>> {
  let mut narrative = Vec::new();
  let mut world = Vec::new();
  for entity in entities {
    match entity {
      EntityRef::Narrative(id) => narrative.push(id.get()),
      EntityRef::World(id) => world.push(id.get()),
    }
  }

  let mut out = HashMap::with_capacity(entities.len());
  for (kind, ids) in [(EntityKind::Narrative, narrative), (EntityKind::World, world)] {
    if ids.is_empty() {
      continue;
    }
    let sql = format!(
      "SELECT id, name FROM {} WHERE id IN ({})",
      table_of(kind),
      placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params_from_iter(ids), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    out.extend(rows.into_iter().map(|(id, name)| (EntityRef::new(kind, id), name)));
  }

  Ok(out)
}
