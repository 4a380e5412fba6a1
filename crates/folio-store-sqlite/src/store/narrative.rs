//! The `narrative_items` table.

use folio_core::{
  Error as CoreError,
  entity::{EntityKind, EntityRef},
  error::require_name,
  id::NarrativeId,
  narrative::{NarrativeItem, NarrativeNode, NewNarrativeItem},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use super::{identity, templates};
use crate::{
  Result,
  encode::{NARRATIVE_COLUMNS, narrative_from_row, narrative_node_from_row},
};

pub fn list_nodes(conn: &Connection) -> Result<Vec<NarrativeNode>> {
  let mut stmt = conn.prepare(
    "SELECT ni.id, ni.name, ni.parent_id, ni.sort_order, et.name
     FROM narrative_items ni
     JOIN entity_templates et ON et.id = ni.template_id
     ORDER BY ni.sort_order, ni.id",
  )?;
  let nodes = stmt
    .query_map([], narrative_node_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(nodes)
}

pub fn get(conn: &Connection, id: NarrativeId) -> Result<Option<NarrativeItem>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {NARRATIVE_COLUMNS} FROM narrative_items WHERE id = ?1"),
        params![id.get()],
        narrative_from_row,
      )
      .optional()?,
  )
}

fn exists(conn: &Connection, id: NarrativeId) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM narrative_items WHERE id = ?1", params![id.get()], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// `MAX(sort_order) + 1` among the children of `parent_id` (roots when
/// `None`), or 0 for the first child.
fn next_sort_order(conn: &Connection, parent_id: Option<NarrativeId>) -> Result<i64> {
  let max: Option<i64> = conn.query_row(
    "SELECT MAX(sort_order) FROM narrative_items WHERE parent_id IS ?1",
    params![parent_id.map(NarrativeId::get)],
    |row| row.get(0),
  )?;
  Ok(max.map_or(0, |m| m + 1))
}

fn child_count(conn: &Connection, id: NarrativeId) -> Result<u64> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM narrative_items WHERE parent_id = ?1",
    params![id.get()],
    |row| row.get(0),
  )?;
  Ok(count.max(0) as u64)
}

pub fn insert(conn: &mut Connection, input: NewNarrativeItem) -> Result<NarrativeItem> {
  require_name("narrative item", &input.name)?;

  let tx = conn.transaction()?;

  let template = templates::require(&tx, input.template_id)?;
  if template.category != EntityKind::Narrative {
    return Err(
      CoreError::CategoryMismatch {
        id:       input.template_id,
        expected: EntityKind::Narrative,
        actual:   template.category,
      }
      .into(),
    );
  }
  if let Some(parent) = input.parent_id
    && !exists(&tx, parent)?
  {
    return Err(CoreError::NarrativeNotFound(parent).into());
  }

  let sort_order = next_sort_order(&tx, input.parent_id)?;
  tx.execute(
    "INSERT INTO narrative_items (name, template_id, parent_id, sort_order, file_path)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      input.name,
      input.template_id.get(),
      input.parent_id.map(NarrativeId::get),
      sort_order,
      input.file_path,
    ],
  )?;
  let id = NarrativeId(tx.last_insert_rowid());
  identity::insert(&tx, EntityRef::Narrative(id))?;

  tx.commit()?;

  Ok(NarrativeItem {
    id,
    name: input.name,
    template_id: input.template_id,
    parent_id: input.parent_id,
    sort_order,
    file_path: input.file_path,
    description: None,
  })
}

pub fn rename(conn: &Connection, id: NarrativeId, name: &str) -> Result<bool> {
  require_name("narrative item", name)?;
  let n = conn.execute("UPDATE narrative_items SET name = ?1 WHERE id = ?2", params![
    name,
    id.get()
  ])?;
  Ok(n > 0)
}

/// Whether `candidate` is `id` itself or sits somewhere below it.
fn is_in_subtree(conn: &Connection, id: NarrativeId, candidate: NarrativeId) -> Result<bool> {
  let found: Option<i64> = conn
    .query_row(
      "WITH RECURSIVE subtree(id) AS (
         SELECT ?1
         UNION
         SELECT ni.id FROM narrative_items ni JOIN subtree s ON ni.parent_id = s.id
       )
       SELECT id FROM subtree WHERE id = ?2",
      params![id.get(), candidate.get()],
      |row| row.get(0),
    )
    .optional()?;
  Ok(found.is_some())
}

pub fn relocate(
  conn: &mut Connection,
  id: NarrativeId,
  parent_id: Option<NarrativeId>,
  sort_order: i64,
) -> Result<()> {
  let tx = conn.transaction()?;

  if !exists(&tx, id)? {
    return Err(CoreError::NarrativeNotFound(id).into());
  }
  if let Some(parent) = parent_id {
    if !exists(&tx, parent)? {
      return Err(CoreError::NarrativeNotFound(parent).into());
    }
    if is_in_subtree(&tx, id, parent)? {
      return Err(CoreError::NarrativeCycle { id, parent }.into());
    }
  }

  tx.execute(
    "UPDATE narrative_items SET parent_id = ?1, sort_order = ?2 WHERE id = ?3",
    params![parent_id.map(NarrativeId::get), sort_order, id.get()],
  )?;
  tx.commit()?;
  Ok(())
}

/// Delete a childless item. The identity row goes with it through the
/// `ON DELETE CASCADE` on `all_entities`.
pub fn delete(conn: &mut Connection, id: NarrativeId) -> Result<Option<NarrativeItem>> {
  let tx = conn.transaction()?;

  let Some(item) = get(&tx, id)? else {
    return Ok(None);
  };
  let count = child_count(&tx, id)?;
  if count > 0 {
    return Err(CoreError::HasChildren { id, count }.into());
  }

  tx.execute("DELETE FROM narrative_items WHERE id = ?1", params![id.get()])?;
  tx.commit()?;
  Ok(Some(item))
}

