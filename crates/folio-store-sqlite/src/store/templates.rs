//! The `entity_templates` table.

use folio_core::{
  Error as CoreError,
  entity::EntityKind,
  error::require_template_name,
  id::TemplateId,
  template::{NewTemplate, Template, TemplateQuery, WorldObjectKind},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Result,
  encode::{RawTemplate, TEMPLATE_COLUMNS, encode_fields, encode_kind},
};

pub fn insert(conn: &Connection, input: &NewTemplate) -> Result<Template> {
  require_template_name(&input.name)?;
  let fields = encode_fields(&input.fields)?;

  conn.execute(
    "INSERT INTO entity_templates (name, category, fields_schema) VALUES (?1, ?2, ?3)",
    params![input.name, encode_kind(input.category), fields],
  )?;

  Ok(Template {
    id:         TemplateId(conn.last_insert_rowid()),
    name:       input.name.clone(),
    category:   input.category,
    fields:     input.fields.clone(),
    is_visible: true,
  })
}

pub fn get(conn: &Connection, id: TemplateId) -> Result<Option<Template>> {
  let raw = conn
    .query_row(
      &format!("SELECT {TEMPLATE_COLUMNS} FROM entity_templates WHERE id = ?1"),
      params![id.get()],
      RawTemplate::from_row,
    )
    .optional()?;
  raw.map(RawTemplate::into_template).transpose()
}

/// Like [`get`], but a missing template is an error.
pub fn require(conn: &Connection, id: TemplateId) -> Result<Template> {
  get(conn, id)?.ok_or_else(|| CoreError::TemplateNotFound(id).into())
}

/// Exact-name lookup; visible templates win over archived ones of the same
/// name, then the oldest wins.
pub fn find(conn: &Connection, name: &str, category: EntityKind) -> Result<Option<Template>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {TEMPLATE_COLUMNS} FROM entity_templates
         WHERE name = ?1 AND category = ?2
         ORDER BY is_visible DESC, id
         LIMIT 1"
      ),
      params![name, encode_kind(category)],
      RawTemplate::from_row,
    )
    .optional()?;
  raw.map(RawTemplate::into_template).transpose()
}

pub fn list(conn: &Connection, query: TemplateQuery) -> Result<Vec<Template>> {
  let mut conds: Vec<&'static str> = vec![];
  if !query.include_archived {
    conds.push("is_visible = 1");
  }
  if query.category.is_some() {
    conds.push("category = ?1");
  }
  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM entity_templates {where_clause} ORDER BY id");
  let mut stmt = conn.prepare(&sql)?;
  let raws = match query.category {
    Some(category) => stmt
      .query_map(params![encode_kind(category)], RawTemplate::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?,
    None => stmt
      .query_map([], RawTemplate::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?,
  };

  raws.into_iter().map(RawTemplate::into_template).collect()
}

pub fn world_object_count(conn: &Connection, id: TemplateId) -> Result<u64> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM world_objects WHERE template_id = ?1",
    params![id.get()],
    |row| row.get(0),
  )?;
  Ok(count.max(0) as u64)
}

/// Archive unless a world object still uses the template.
pub fn archive(conn: &mut Connection, id: TemplateId) -> Result<()> {
  let tx = conn.transaction()?;
  require(&tx, id)?;

  let count = world_object_count(&tx, id)?;
  if count > 0 {
    return Err(CoreError::TemplateInUse { id, count }.into());
  }

  tx.execute("UPDATE entity_templates SET is_visible = 0 WHERE id = ?1", params![id.get()])?;
  tx.commit()?;
  Ok(())
}

pub fn restore(conn: &Connection, id: TemplateId) -> Result<()> {
  let n = conn.execute("UPDATE entity_templates SET is_visible = 1 WHERE id = ?1", params![
    id.get()
  ])?;
  if n == 0 {
    return Err(CoreError::TemplateNotFound(id).into());
  }
  Ok(())
}

pub fn rename(conn: &Connection, id: TemplateId, name: &str) -> Result<()> {
  require_template_name(name)?;
  let n = conn.execute("UPDATE entity_templates SET name = ?1 WHERE id = ?2", params![
    name,
    id.get()
  ])?;
  if n == 0 {
    return Err(CoreError::TemplateNotFound(id).into());
  }
  Ok(())
}

/// Every world template, archived ones included: objects created before an
/// archive stay reachable through their kind.
pub fn world_kinds(conn: &Connection) -> Result<Vec<WorldObjectKind>> {
  let mut stmt = conn.prepare(
    "SELECT id, name, is_visible FROM entity_templates
     WHERE category = 'world'
     ORDER BY name COLLATE NOCASE, id",
  )?;
  let kinds = stmt
    .query_map([], |row| {
      Ok(WorldObjectKind {
        id:         TemplateId(row.get(0)?),
        name:       row.get(1)?,
        is_visible: row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(kinds)
}
