//! The `connections` table and cross-kind name search.

use folio_core::{
  Error as CoreError,
  connection::Connection as Edge,
  entity::{EntityKind, EntityRef, EntitySummary},
  id::{ConnectionId, EntityId},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use super::identity;
use crate::Result;

fn edge_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Edge> {
  Ok(Edge {
    id:          ConnectionId(row.get(0)?),
    description: row.get(1)?,
    source:      EntityId(row.get(2)?),
    target:      EntityId(row.get(3)?),
  })
}

pub fn edges_of(conn: &Connection, id: EntityId) -> Result<Vec<Edge>> {
  let mut stmt = conn.prepare(
    "SELECT id, description, source_id, target_id FROM connections
     WHERE source_id = ?1 OR target_id = ?1
     ORDER BY id",
  )?;
  let edges = stmt
    .query_map(params![id.get()], edge_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(edges)
}

pub fn insert(
  conn: &mut Connection,
  source: EntityRef,
  target: EntityRef,
  description: &str,
) -> Result<Edge> {
  let tx = conn.transaction()?;

  let source_id = identity::find(&tx, source)?.ok_or(CoreError::MissingEntity(source))?;
  let target_id = identity::find(&tx, target)?.ok_or(CoreError::MissingEntity(target))?;

  tx.execute(
    "INSERT INTO connections (source_id, target_id, description) VALUES (?1, ?2, ?3)",
    params![source_id.get(), target_id.get(), description],
  )?;
  let id = ConnectionId(tx.last_insert_rowid());
  tx.commit()?;

  Ok(Edge {
    id,
    description: description.to_owned(),
    source: source_id,
    target: target_id,
  })
}

pub fn delete(conn: &mut Connection, id: ConnectionId) -> Result<Option<Edge>> {
  let tx = conn.transaction()?;
  let edge = tx
    .query_row(
      "SELECT id, description, source_id, target_id FROM connections WHERE id = ?1",
      params![id.get()],
      edge_from_row,
    )
    .optional()?;
  if edge.is_some() {
    tx.execute("DELETE FROM connections WHERE id = ?1", params![id.get()])?;
  }
  tx.commit()?;
  Ok(edge)
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`.
fn like_pattern(query: &str) -> String {
  let mut out = String::with_capacity(query.len() + 2);
  out.push('%');
  for c in query.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

/// Substring search over both concrete tables, narrative first.
///
/// SQLite's `LIKE` only folds ASCII case, so names are lowercased on the Rust
/// side and matched there; the query still runs once per table.
pub fn search(conn: &Connection, query: &str, exclude: Option<EntityId>) -> Result<Vec<EntitySummary>> {
  let needle = query.to_lowercase();
  let ascii_only = needle.is_ascii();
  let pattern = like_pattern(query);

  let mut out = Vec::new();
  for (kind, owner) in [
    (EntityKind::Narrative, "narrative_id"),
    (EntityKind::World, "world_object_id"),
  ] {
    // Non-ASCII needles cannot be narrowed with LIKE; fetch all and filter.
    let name_filter = if ascii_only { "t.name LIKE ?2 ESCAPE '\\'" } else { "?2 IS NOT NULL" };
    let sql = format!(
      "SELECT t.id, t.name, ae.id
       FROM {table} t
       JOIN all_entities ae ON ae.{owner} = t.id
       WHERE (?1 IS NULL OR ae.id != ?1) AND {name_filter}
       ORDER BY t.id",
      table = identity::table_of(kind),
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
      .query_map(params![exclude.map(EntityId::get), pattern], |row| {
        Ok(EntitySummary {
          entity:    EntityRef::new(kind, row.get(0)?),
          name:      row.get(1)?,
          entity_id: EntityId(row.get(2)?),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    out.extend(rows.into_iter().filter(|hit| hit.name.to_lowercase().contains(&needle)));
  }

  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::like_pattern;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("ab"), "%ab%");
    assert_eq!(like_pattern("50%_x\\"), "%50\\%\\_x\\\\%");
  }
}
