//! [`Project`] — one open project directory.

use std::path::{Path, PathBuf};

use folio_core::{
  connection::{Connection, ConnectionView, load_views},
  details::{FileStat, ItemDetails},
  entity::{EntityKind, EntityRef, EntitySummary},
  event::ProjectEvent,
  id::{ConnectionId, EntityId, NarrativeId, TemplateId, WorldObjectId},
  narrative::{NarrativeEntry, NarrativeItem, NewNarrativeItem, flatten_forest},
  store::ProjectStore,
  template::{NewTemplate, Template, TemplateQuery, WorldObjectKind},
  world::{NewWorldObject, Properties, WorldObject, WorldObjectSummary},
};
use folio_store_sqlite::SqliteStore;
use tokio::sync::broadcast;

use crate::{Error, Result, content::ContentStore, details::Assembler, layout::ProjectLayout};

/// Kinds every new project starts with.
const DEFAULT_TEMPLATES: &[(&str, EntityKind)] = &[
  ("Part", EntityKind::Narrative),
  ("Chapter", EntityKind::Narrative),
  ("Scene", EntityKind::Narrative),
  ("Character", EntityKind::World),
  ("Location", EntityKind::World),
];

/// Text written by [`Project::create_content_file`].
const NEW_FILE_CONTENTS: &str = "\n";

// ─── Project ─────────────────────────────────────────────────────────────────

/// An open project: its database, its content directories and the channel
/// change events are published on.
pub struct Project {
  root:    PathBuf,
  layout:  ProjectLayout,
  store:   SqliteStore,
  content: ContentStore,
  events:  broadcast::Sender<ProjectEvent>,
}

impl Project {
  /// Create a new project at `root`: content directories, a fresh database
  /// and the default templates.
  ///
  /// Fails with [`Error::AlreadyExists`] if a database is already there.
  pub async fn create(
    root: impl Into<PathBuf>,
    layout: ProjectLayout,
    events: broadcast::Sender<ProjectEvent>,
  ) -> Result<Self> {
    let root = root.into();
    let db_path = root.join(&layout.database_file);
    if tokio::fs::try_exists(&db_path)
      .await
      .map_err(|e| Error::io(&db_path, e))?
    {
      return Err(Error::AlreadyExists(root));
    }

    for dir in [&layout.narrative_dir, &layout.world_dir] {
      let dir = root.join(dir);
      tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| Error::io(&dir, e))?;
    }
    if let Some(parent) = db_path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| Error::io(parent, e))?;
    }

    let store = SqliteStore::open(&db_path).await?;
    for (name, category) in DEFAULT_TEMPLATES {
      store
        .create_template(NewTemplate::new(*name, *category, std::iter::empty::<String>()))
        .await?;
    }

    tracing::info!(root = %root.display(), "created project");
    Ok(Self::assemble(root, layout, store, events))
  }

  /// Open an existing project. The database file and both content
  /// directories must already exist; nothing is created.
  pub async fn open(
    root: impl Into<PathBuf>,
    layout: ProjectLayout,
    events: broadcast::Sender<ProjectEvent>,
  ) -> Result<Self> {
    let root = root.into();
    for required in layout.required_paths() {
      let path = root.join(required);
      let present = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| Error::io(&path, e))?;
      if !present {
        return Err(Error::InvalidProject { root, missing: required.to_path_buf() });
      }
    }

    let store = SqliteStore::open(root.join(&layout.database_file)).await?;

    tracing::info!(root = %root.display(), "opened project");
    Ok(Self::assemble(root, layout, store, events))
  }

  fn assemble(
    root: PathBuf,
    layout: ProjectLayout,
    store: SqliteStore,
    events: broadcast::Sender<ProjectEvent>,
  ) -> Self {
    let project = Self {
      content: ContentStore::new(&root),
      root,
      layout,
      store,
      events,
    };
    project.publish(ProjectEvent::ProjectOpened { root: project.root.clone() });
    project
  }

  /// Close the project and release its database connection.
  pub fn close(self) {
    tracing::info!(root = %self.root.display(), "closed project");
    self.publish(ProjectEvent::ProjectClosed);
  }

  pub fn root(&self) -> &Path { &self.root }

  pub fn store(&self) -> &SqliteStore { &self.store }

  pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> { self.events.subscribe() }

  fn publish(&self, event: ProjectEvent) {
    // No subscribers is not an error.
    let _ = self.events.send(event);
  }

  fn assembler(&self) -> Assembler<'_, SqliteStore> {
    Assembler {
      store:   &self.store,
      content: &self.content,
      layout:  &self.layout,
    }
  }

  /// Run a filesystem side effect after its database write has committed.
  /// Failures are logged and otherwise ignored.
  async fn side_effect<F>(&self, what: &'static str, path: &Path, f: F)
  where
    F: Future<Output = std::io::Result<()>>,
  {
    if let Err(e) = f.await {
      tracing::warn!(path = %path.display(), error = %e, "{what} failed; database change kept");
    }
  }

  // ── Files ─────────────────────────────────────────────────────────────────

  /// Current mtime and size of `path` (relative to the project root unless
  /// absolute), or `None` when nothing is there.
  pub async fn stat_file(&self, path: impl AsRef<Path>) -> Result<Option<FileStat>> {
    let path = self.content.resolve(path);
    self
      .content
      .stat(&path)
      .await
      .map_err(|e| Error::io(path, e))
  }

  /// Create the file backing `entity` with a single newline, together with
  /// any missing parent directories. An existing file is left as it is.
  pub async fn create_content_file(&self, entity: EntityRef) -> Result<PathBuf> {
    let path = self
      .assembler()
      .content_path(entity)
      .await?
      .ok_or(Error::NoContentPath(entity))?;
    let written = self
      .content
      .create_file(&path, NEW_FILE_CONTENTS)
      .await
      .map_err(|e| Error::io(&path, e))?;
    if written {
      tracing::debug!(%entity, path = %path.display(), "created content file");
    }
    Ok(path)
  }

  // ── Narrative ─────────────────────────────────────────────────────────────

  /// The narrative forest flattened depth-first, siblings by sort order.
  pub async fn list_narrative_items(&self) -> Result<Vec<NarrativeEntry>> {
    Ok(flatten_forest(self.store.list_narrative_nodes().await?))
  }

  pub async fn narrative_details(&self, id: NarrativeId) -> Result<Option<ItemDetails>> {
    self.assembler().narrative(id).await
  }

  /// Create an item of the narrative kind called `kind_name` as the last
  /// child of `parent_id` (or the last root).
  pub async fn create_narrative_item(
    &self,
    parent_id: Option<NarrativeId>,
    kind_name: &str,
    name: &str,
  ) -> Result<NarrativeItem> {
    let template = self
      .store
      .find_template(kind_name.to_owned(), EntityKind::Narrative)
      .await?
      .ok_or_else(|| folio_core::Error::UnknownTemplate {
        name:     kind_name.to_owned(),
        category: EntityKind::Narrative,
      })?;

    let file_path = self.layout.new_narrative_file();
    let item = self
      .store
      .create_narrative_item(NewNarrativeItem {
        name: name.to_owned(),
        template_id: template.id,
        parent_id,
        file_path: Some(file_path.to_string_lossy().into_owned()),
      })
      .await?;

    let abs = self.content.resolve(&file_path);
    self
      .side_effect("creating narrative file", &abs, async {
        self.content.create_file(&abs, "").await.map(drop)
      })
      .await;

    tracing::debug!(id = %item.id, kind = %template.name, "narrative item created");
    self.publish(ProjectEvent::NarrativeChanged);
    Ok(item)
  }

  pub async fn rename_narrative_item(&self, id: NarrativeId, name: &str) -> Result<()> {
    if self.store.rename_narrative_item(id, name.to_owned()).await? {
      self.publish(ProjectEvent::NarrativeChanged);
    }
    Ok(())
  }

  /// Reparent and/or reorder an item.
  pub async fn move_narrative_item(
    &self,
    id: NarrativeId,
    parent_id: Option<NarrativeId>,
    sort_order: i64,
  ) -> Result<()> {
    self
      .store
      .move_narrative_item(id, parent_id, sort_order)
      .await?;
    self.publish(ProjectEvent::NarrativeChanged);
    Ok(())
  }

  /// Delete a childless item, then its file.
  pub async fn delete_narrative_item(&self, id: NarrativeId) -> Result<()> {
    let Some(item) = self.store.delete_narrative_item(id).await? else {
      return Ok(());
    };

    if let Some(rel) = &item.file_path {
      let abs = self.content.resolve(rel);
      self
        .side_effect("removing narrative file", &abs, self.content.remove_file(&abs))
        .await;
    }

    tracing::debug!(%id, "narrative item deleted");
    self.publish(ProjectEvent::NarrativeChanged);
    Ok(())
  }

  // ── World ─────────────────────────────────────────────────────────────────

  pub async fn list_world_object_kinds(&self) -> Result<Vec<WorldObjectKind>> {
    Ok(self.store.list_world_object_kinds().await?)
  }

  pub async fn list_world_objects(&self, kind_id: TemplateId) -> Result<Vec<WorldObjectSummary>> {
    Ok(self.store.list_world_objects(kind_id).await?)
  }

  /// The stored record, without its content.
  pub async fn get_world_object(&self, id: WorldObjectId) -> Result<Option<WorldObject>> {
    Ok(self.store.get_world_object(id).await?)
  }

  pub async fn world_object_details(&self, id: WorldObjectId) -> Result<Option<ItemDetails>> {
    self.assembler().world(id).await
  }

  pub async fn create_world_object(
    &self,
    name: &str,
    kind_id: TemplateId,
    properties: Option<Properties>,
  ) -> Result<WorldObject> {
    let object = self
      .store
      .create_world_object(NewWorldObject {
        name:        name.to_owned(),
        template_id: kind_id,
        properties:  properties.unwrap_or_default(),
      })
      .await?;

    if let Some(template) = self.store.get_template(kind_id).await? {
      let abs = self
        .content
        .resolve(self.layout.world_object_file(&template.name, object.id));
      self
        .side_effect("creating world object file", &abs, async {
          self.content.create_file(&abs, "").await.map(drop)
        })
        .await;
    }

    tracing::debug!(id = %object.id, kind = %kind_id, "world object created");
    self.publish(ProjectEvent::WorldObjectsChanged { template_id: kind_id });
    Ok(object)
  }

  pub async fn rename_world_object(&self, id: WorldObjectId, name: &str) -> Result<()> {
    self.update_world_object(id, name, None).await
  }

  /// Replace the name and the whole property map.
  pub async fn update_world_object_details(
    &self,
    id: WorldObjectId,
    name: &str,
    properties: Properties,
  ) -> Result<()> {
    self.update_world_object(id, name, Some(properties)).await
  }

  async fn update_world_object(
    &self,
    id: WorldObjectId,
    name: &str,
    properties: Option<Properties>,
  ) -> Result<()> {
    if !self
      .store
      .update_world_object(id, name.to_owned(), properties)
      .await?
    {
      return Ok(());
    }
    if let Some(object) = self.store.get_world_object(id).await? {
      self.publish(ProjectEvent::WorldObjectsChanged { template_id: object.template_id });
    }
    Ok(())
  }

  /// Delete an object, then its directory under the world dir.
  pub async fn delete_world_object(&self, id: WorldObjectId) -> Result<()> {
    let Some(object) = self.store.delete_world_object(id).await? else {
      return Ok(());
    };

    if let Some(template) = self.store.get_template(object.template_id).await? {
      let dir = self
        .content
        .resolve(self.layout.world_object_dir(&template.name, object.id));
      self
        .side_effect("removing world object directory", &dir, self.content.remove_dir(&dir))
        .await;
    }

    tracing::debug!(%id, "world object deleted");
    self.publish(ProjectEvent::WorldObjectsChanged { template_id: object.template_id });
    Ok(())
  }

  // ── Connections ───────────────────────────────────────────────────────────

  /// Every connection touching `entity`, seen from `entity`'s side.
  pub async fn connections(&self, entity: EntityRef) -> Result<Vec<ConnectionView>> {
    Ok(load_views(&self.store, entity).await?)
  }

  pub async fn create_connection(
    &self,
    source: EntityRef,
    target: EntityRef,
    description: &str,
  ) -> Result<Connection> {
    let edge = self
      .store
      .create_connection(source, target, description.to_owned())
      .await?;
    self.publish(ProjectEvent::ConnectionsChanged { entities: vec![source, target] });
    Ok(edge)
  }

  pub async fn delete_connection(&self, id: ConnectionId) -> Result<()> {
    let Some(edge) = self.store.delete_connection(id).await? else {
      return Ok(());
    };
    let entities = self
      .store
      .resolve_identities(vec![edge.source, edge.target])
      .await?
      .into_iter()
      .map(|r| r.entity)
      .collect();
    self.publish(ProjectEvent::ConnectionsChanged { entities });
    Ok(())
  }

  /// Candidates for a new connection from the entity with identity
  /// `exclude`.
  pub async fn search_entities(
    &self,
    query: &str,
    exclude: Option<EntityId>,
  ) -> Result<Vec<EntitySummary>> {
    Ok(self.store.search_entities(query.to_owned(), exclude).await?)
  }

  /// Forward identity lookup, for callers that need to pass `exclude` to
  /// [`search_entities`](Self::search_entities).
  pub async fn identity_of(&self, entity: EntityRef) -> Result<Option<EntityId>> {
    Ok(self.store.find_identity(entity).await?)
  }

  // ── Templates ─────────────────────────────────────────────────────────────

  pub async fn create_template(
    &self,
    name: &str,
    category: EntityKind,
    field_labels: Vec<String>,
  ) -> Result<Template> {
    let template = self
      .store
      .create_template(NewTemplate::new(name, category, field_labels))
      .await?;
    self.publish(ProjectEvent::TemplatesChanged);
    Ok(template)
  }

  pub async fn list_templates(&self, query: TemplateQuery) -> Result<Vec<Template>> {
    Ok(self.store.list_templates(query).await?)
  }

  pub async fn get_template(&self, id: TemplateId) -> Result<Option<Template>> {
    Ok(self.store.get_template(id).await?)
  }

  pub async fn archive_template(&self, id: TemplateId) -> Result<()> {
    self.store.archive_template(id).await?;
    self.publish(ProjectEvent::TemplatesChanged);
    Ok(())
  }

  pub async fn restore_template(&self, id: TemplateId) -> Result<()> {
    self.store.restore_template(id).await?;
    self.publish(ProjectEvent::TemplatesChanged);
    Ok(())
  }

  /// Rename a template. For a world kind this also changes where its
  /// objects' content files are looked up; existing files are not moved.
  pub async fn rename_template(&self, id: TemplateId, name: &str) -> Result<()> {
    self.store.rename_template(id, name.to_owned()).await?;
    self.publish(ProjectEvent::TemplatesChanged);
    Ok(())
  }
}
