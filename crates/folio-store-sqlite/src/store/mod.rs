//! [`SqliteStore`] — the SQLite implementation of [`ProjectStore`].
//!
//! Each submodule owns one table and exposes plain synchronous functions over
//! a [`rusqlite::Connection`]; the trait impl below ships them to the
//! connection thread.

mod connections;
mod identity;
mod narrative;
mod templates;
mod world;

use std::{collections::HashMap, path::Path};

use folio_core::{
  connection::Connection as Edge,
  entity::{EntityKind, EntityRef, EntitySummary, ResolvedEntity},
  id::{ConnectionId, EntityId, NarrativeId, TemplateId, WorldObjectId},
  narrative::{NarrativeItem, NarrativeNode, NewNarrativeItem},
  store::ProjectStore,
  template::{NewTemplate, Template, TemplateQuery, WorldObjectKind},
  world::{NewWorldObject, Properties, WorldObject, WorldObjectSummary},
};
use rusqlite::Connection;

use crate::{
  Error, Result,
  schema::{CONNECTION_PRAGMAS, SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio project database backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let version = self
      .conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version < SCHEMA_VERSION {
          conn.execute_batch(SCHEMA)?;
        }
        Ok(version)
      })
      .await?;

    if version < SCHEMA_VERSION {
      tracing::debug!(from = version, to = SCHEMA_VERSION, "initialised project schema");
    }
    Ok(())
  }

  /// Run `f` on the connection thread.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }

  /// Execute raw SQL against the database. Only tests reach past the typed
  /// API.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    self.run(move |c| Ok(c.execute(sql, [])?)).await
  }
}

// ─── ProjectStore impl ───────────────────────────────────────────────────────

impl ProjectStore for SqliteStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn find_identity(&self, entity: EntityRef) -> Result<Option<EntityId>> {
    self.run(move |c| identity::find(c, entity)).await
  }

  async fn resolve_identities(&self, ids: Vec<EntityId>) -> Result<Vec<ResolvedEntity>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    self.run(move |c| identity::resolve(c, &ids)).await
  }

  async fn entity_names(&self, entities: Vec<EntityRef>) -> Result<HashMap<EntityRef, String>> {
    if entities.is_empty() {
      return Ok(HashMap::new());
    }
    self.run(move |c| identity::names(c, &entities)).await
  }

  // ── Templates ─────────────────────────────────────────────────────────────

  async fn create_template(&self, input: NewTemplate) -> Result<Template> {
    let template = self.run(move |c| templates::insert(c, &input)).await?;
    tracing::debug!(id = %template.id, name = %template.name, "template created");
    Ok(template)
  }

  async fn get_template(&self, id: TemplateId) -> Result<Option<Template>> {
    self.run(move |c| templates::get(c, id)).await
  }

  async fn find_template(&self, name: String, category: EntityKind) -> Result<Option<Template>> {
    self.run(move |c| templates::find(c, &name, category)).await
  }

  async fn list_templates(&self, query: TemplateQuery) -> Result<Vec<Template>> {
    self.run(move |c| templates::list(c, query)).await
  }

  async fn archive_template(&self, id: TemplateId) -> Result<()> {
    self.run(move |c| templates::archive(c, id)).await
  }

  async fn restore_template(&self, id: TemplateId) -> Result<()> {
    self.run(move |c| templates::restore(c, id)).await
  }

  async fn rename_template(&self, id: TemplateId, name: String) -> Result<()> {
    self.run(move |c| templates::rename(c, id, &name)).await
  }

  async fn list_world_object_kinds(&self) -> Result<Vec<WorldObjectKind>> {
    self.run(|c| templates::world_kinds(c)).await
  }

  // ── Narrative items ───────────────────────────────────────────────────────

  async fn list_narrative_nodes(&self) -> Result<Vec<NarrativeNode>> {
    self.run(|c| narrative::list_nodes(c)).await
  }

  async fn get_narrative_item(&self, id: NarrativeId) -> Result<Option<NarrativeItem>> {
    self.run(move |c| narrative::get(c, id)).await
  }

  async fn create_narrative_item(&self, input: NewNarrativeItem) -> Result<NarrativeItem> {
    self.run(move |c| narrative::insert(c, input)).await
  }

  async fn rename_narrative_item(&self, id: NarrativeId, name: String) -> Result<bool> {
    self.run(move |c| narrative::rename(c, id, &name)).await
  }

  async fn move_narrative_item(
    &self,
    id: NarrativeId,
    parent_id: Option<NarrativeId>,
    sort_order: i64,
  ) -> Result<()> {
    self.run(move |c| narrative::relocate(c, id, parent_id, sort_order)).await
  }

  async fn delete_narrative_item(&self, id: NarrativeId) -> Result<Option<NarrativeItem>> {
    self.run(move |c| narrative::delete(c, id)).await
  }

  // ── World objects ─────────────────────────────────────────────────────────

  async fn list_world_objects(&self, template_id: TemplateId) -> Result<Vec<WorldObjectSummary>> {
    self.run(move |c| world::list(c, template_id)).await
  }

  async fn get_world_object(&self, id: WorldObjectId) -> Result<Option<WorldObject>> {
    self.run(move |c| world::get(c, id)).await
  }

  async fn create_world_object(&self, input: NewWorldObject) -> Result<WorldObject> {
    self.run(move |c| world::insert(c, input)).await
  }

  async fn update_world_object(
    &self,
    id: WorldObjectId,
    name: String,
    properties: Option<Properties>,
  ) -> Result<bool> {
    self
      .run(move |c| world::update(c, id, &name, properties.as_ref()))
      .await
  }

  async fn delete_world_object(&self, id: WorldObjectId) -> Result<Option<WorldObject>> {
    self.run(move |c| world::delete(c, id)).await
  }

  // ── Connections ───────────────────────────────────────────────────────────

  async fn edges_of(&self, id: EntityId) -> Result<Vec<Edge>> {
    self.run(move |c| connections::edges_of(c, id)).await
  }

  async fn create_connection(
    &self,
    source: EntityRef,
    target: EntityRef,
    description: String,
  ) -> Result<Edge> {
    let edge = self
      .run(move |c| connections::insert(c, source, target, &description))
      .await?;
    tracing::debug!(id = %edge.id, %source, %target, "connection created");
    Ok(edge)
  }

  async fn delete_connection(&self, id: ConnectionId) -> Result<Option<Edge>> {
    self.run(move |c| connections::delete(c, id)).await
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search_entities(
    &self,
    query: String,
    exclude: Option<EntityId>,
  ) -> Result<Vec<EntitySummary>> {
    self.run(move |c| connections::search(c, &query, exclude)).await
  }
}
