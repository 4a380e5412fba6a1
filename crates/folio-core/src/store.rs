//! The `ProjectStore` trait: persistence for one project's records.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! The project session and the detail assembler depend on this abstraction,
//! not on any concrete backend. Filesystem content is not the store's
//! concern.

use std::{collections::HashMap, future::Future};

use crate::{
  connection::Connection,
  entity::{EntityKind, EntityRef, EntitySummary, ResolvedEntity},
  id::{ConnectionId, EntityId, NarrativeId, TemplateId, WorldObjectId},
  narrative::{NarrativeItem, NarrativeNode, NewNarrativeItem},
  template::{NewTemplate, Template, TemplateQuery, WorldObjectKind},
  world::{NewWorldObject, Properties, WorldObject, WorldObjectSummary},
};

/// Abstraction over a Folio project database.
///
/// Creating a narrative item or world object also creates its [`EntityId`]
/// in the same transaction; deleting the record deletes the identity.
/// Bulk lookups take whole id sets and cost one round trip per table no
/// matter how many ids are passed.
pub trait ProjectStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Forward lookup: the identity owned by `entity`, if the record exists.
  fn find_identity(
    &self,
    entity: EntityRef,
  ) -> impl Future<Output = Result<Option<EntityId>, Self::Error>> + Send + '_;

  /// Bulk reverse lookup. Returns one row per input identity that still has
  /// a live owner; dead identities are dropped. Empty input returns empty
  /// output without touching the database.
  fn resolve_identities(
    &self,
    ids: Vec<EntityId>,
  ) -> impl Future<Output = Result<Vec<ResolvedEntity>, Self::Error>> + Send + '_;

  /// Display names for a batch of records. Records that no longer exist are
  /// absent from the map.
  fn entity_names(
    &self,
    entities: Vec<EntityRef>,
  ) -> impl Future<Output = Result<HashMap<EntityRef, String>, Self::Error>> + Send + '_;

  // ── Templates ─────────────────────────────────────────────────────────

  fn create_template(
    &self,
    input: NewTemplate,
  ) -> impl Future<Output = Result<Template, Self::Error>> + Send + '_;

  /// Retrieve a template, archived or not. Returns `None` if not found.
  fn get_template(
    &self,
    id: TemplateId,
  ) -> impl Future<Output = Result<Option<Template>, Self::Error>> + Send + '_;

  /// Look a template up by its exact name within a category.
  fn find_template(
    &self,
    name: String,
    category: EntityKind,
  ) -> impl Future<Output = Result<Option<Template>, Self::Error>> + Send + '_;

  fn list_templates(
    &self,
    query: TemplateQuery,
  ) -> impl Future<Output = Result<Vec<Template>, Self::Error>> + Send + '_;

  /// Hide a template from creation pickers.
  ///
  /// Fails with [`Error::TemplateInUse`](crate::Error::TemplateInUse) while
  /// any world object references it.
  fn archive_template(
    &self,
    id: TemplateId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Undo [`archive_template`](Self::archive_template).
  fn restore_template(
    &self,
    id: TemplateId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Rename a template. The field schema and its keys are left untouched.
  fn rename_template(
    &self,
    id: TemplateId,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Visible world templates ordered by name.
  fn list_world_object_kinds(
    &self,
  ) -> impl Future<Output = Result<Vec<WorldObjectKind>, Self::Error>> + Send + '_;

  // ── Narrative items ───────────────────────────────────────────────────

  /// Every narrative item with its kind name, ordered by `sort_order` then id.
  fn list_narrative_nodes(
    &self,
  ) -> impl Future<Output = Result<Vec<NarrativeNode>, Self::Error>> + Send + '_;

  fn get_narrative_item(
    &self,
    id: NarrativeId,
  ) -> impl Future<Output = Result<Option<NarrativeItem>, Self::Error>> + Send + '_;

  /// Insert an item after its last sibling, together with its identity.
  fn create_narrative_item(
    &self,
    input: NewNarrativeItem,
  ) -> impl Future<Output = Result<NarrativeItem, Self::Error>> + Send + '_;

  /// Returns `false` if the item does not exist.
  fn rename_narrative_item(
    &self,
    id: NarrativeId,
    name: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Reparent and/or reorder an item. Rejects moves under the item itself or
  /// one of its descendants.
  fn move_narrative_item(
    &self,
    id: NarrativeId,
    parent_id: Option<NarrativeId>,
    sort_order: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete a childless item and its identity, returning the deleted row.
  ///
  /// Fails with [`Error::HasChildren`](crate::Error::HasChildren) without
  /// writing anything if the item has children. Returns `None` if it did not
  /// exist.
  fn delete_narrative_item(
    &self,
    id: NarrativeId,
  ) -> impl Future<Output = Result<Option<NarrativeItem>, Self::Error>> + Send + '_;

  // ── World objects ─────────────────────────────────────────────────────

  /// Objects of one kind ordered by name.
  fn list_world_objects(
    &self,
    template_id: TemplateId,
  ) -> impl Future<Output = Result<Vec<WorldObjectSummary>, Self::Error>> + Send + '_;

  fn get_world_object(
    &self,
    id: WorldObjectId,
  ) -> impl Future<Output = Result<Option<WorldObject>, Self::Error>> + Send + '_;

  /// Insert an object together with its identity. The template must exist
  /// and belong to the world category.
  fn create_world_object(
    &self,
    input: NewWorldObject,
  ) -> impl Future<Output = Result<WorldObject, Self::Error>> + Send + '_;

  /// Update the name and, when given, the properties. Returns `false` if the
  /// object does not exist.
  fn update_world_object(
    &self,
    id: WorldObjectId,
    name: String,
    properties: Option<Properties>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete an object and its identity, returning the deleted row.
  fn delete_world_object(
    &self,
    id: WorldObjectId,
  ) -> impl Future<Output = Result<Option<WorldObject>, Self::Error>> + Send + '_;

  // ── Connections ───────────────────────────────────────────────────────

  /// All edges where `id` is the source or the target.
  fn edges_of(
    &self,
    id: EntityId,
  ) -> impl Future<Output = Result<Vec<Connection>, Self::Error>> + Send + '_;

  /// Connect two records. Fails with
  /// [`Error::MissingEntity`](crate::Error::MissingEntity) if either side has
  /// no identity. Self-connections are allowed.
  fn create_connection(
    &self,
    source: EntityRef,
    target: EntityRef,
    description: String,
  ) -> impl Future<Output = Result<Connection, Self::Error>> + Send + '_;

  /// Remove an edge, returning it. Removing an absent edge is not an error.
  fn delete_connection(
    &self,
    id: ConnectionId,
  ) -> impl Future<Output = Result<Option<Connection>, Self::Error>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Case-insensitive substring match over narrative and world names,
  /// skipping `exclude`. Narrative hits come first; there is no ranking.
  fn search_entities(
    &self,
    query: String,
    exclude: Option<EntityId>,
  ) -> impl Future<Output = Result<Vec<EntitySummary>, Self::Error>> + Send + '_;
}
