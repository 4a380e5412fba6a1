//! The `world_objects` table.

use folio_core::{
  Error as CoreError,
  entity::{EntityKind, EntityRef},
  error::require_name,
  id::{TemplateId, WorldObjectId},
  world::{NewWorldObject, Properties, WorldObject, WorldObjectSummary},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use super::{identity, templates};
use crate::{
  Result,
  encode::{RawWorldObject, WORLD_COLUMNS, encode_properties},
};

pub fn list(conn: &Connection, template_id: TemplateId) -> Result<Vec<WorldObjectSummary>> {
  let mut stmt = conn.prepare(
    "SELECT id, name, template_id FROM world_objects
     WHERE template_id = ?1
     ORDER BY name COLLATE NOCASE, id",
  )?;
  let objects = stmt
    .query_map(params![template_id.get()], |row| {
      Ok(WorldObjectSummary {
        id:          WorldObjectId(row.get(0)?),
        name:        row.get(1)?,
        template_id: TemplateId(row.get(2)?),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(objects)
}

pub fn get(conn: &Connection, id: WorldObjectId) -> Result<Option<WorldObject>> {
  let raw = conn
    .query_row(
      &format!("SELECT {WORLD_COLUMNS} FROM world_objects WHERE id = ?1"),
      params![id.get()],
      RawWorldObject::from_row,
    )
    .optional()?;
  Ok(raw.map(RawWorldObject::into_world_object))
}

pub fn insert(conn: &mut Connection, input: NewWorldObject) -> Result<WorldObject> {
  require_name("world object", &input.name)?;
  let properties = encode_properties(&input.properties)?;

  let tx = conn.transaction()?;

  let template = templates::require(&tx, input.template_id)?;
  if template.category != EntityKind::World {
    return Err(
      CoreError::CategoryMismatch {
        id:       input.template_id,
        expected: EntityKind::World,
        actual:   template.category,
      }
      .into(),
    );
  }

  tx.execute(
    "INSERT INTO world_objects (name, template_id, properties) VALUES (?1, ?2, ?3)",
    params![input.name, input.template_id.get(), properties],
  )?;
  let id = WorldObjectId(tx.last_insert_rowid());
  identity::insert(&tx, EntityRef::World(id))?;

  tx.commit()?;

  Ok(WorldObject {
    id,
    name: input.name,
    template_id: input.template_id,
    properties: Some(input.properties),
    description: None,
  })
}

/// Update the name, and the properties when `properties` is given.
pub fn update(
  conn: &Connection,
  id: WorldObjectId,
  name: &str,
  properties: Option<&Properties>,
) -> Result<bool> {
  require_name("world object", name)?;

  let n = match properties {
    Some(props) => conn.execute(
      "UPDATE world_objects SET name = ?1, properties = ?2 WHERE id = ?3",
      params![name, encode_properties(props)?, id.get()],
    )?,
    None => conn.execute("UPDATE world_objects SET name = ?1 WHERE id = ?2", params![
      name,
      id.get()
    ])?,
  };
  Ok(n > 0)
}

/// Delete an object; its identity row cascades.
pub fn delete(conn: &mut Connection, id: WorldObjectId) -> Result<Option<WorldObject>> {
  let tx = conn.transaction()?;

  let Some(object) = get(&tx, id)? else {
    return Ok(None);
  };
  tx.execute("DELETE FROM world_objects WHERE id = ?1", params![id.get()])?;
  tx.commit()?;
  Ok(Some(object))
}
