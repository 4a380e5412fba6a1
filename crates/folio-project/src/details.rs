//! The detail assembler: builds an [`ItemDetails`] per request from the
//! record, its template and the file on disk. Nothing is cached.

use std::path::PathBuf;

use folio_core::{
  details::{ItemDetails, MISSING_FILE_PLACEHOLDER, UNREADABLE_FILE_PLACEHOLDER},
  entity::EntityRef,
  id::{NarrativeId, WorldObjectId},
  store::ProjectStore,
  world::custom_fields,
};

use crate::{
  Error, Result,
  content::{ContentStore, Loaded},
  layout::ProjectLayout,
};

/// Borrowed view over everything needed to assemble details.
pub struct Assembler<'a, S> {
  pub store:   &'a S,
  pub content: &'a ContentStore,
  pub layout:  &'a ProjectLayout,
}

/// The content-related half of an [`ItemDetails`].
struct Body {
  path:        Option<PathBuf>,
  content:     String,
  file_exists: bool,
  mtime:       Option<chrono::DateTime<chrono::Utc>>,
}

impl<S> Assembler<'_, S>
where
  S: ProjectStore,
  Error: From<S::Error>,
{
  pub async fn narrative(&self, id: NarrativeId) -> Result<Option<ItemDetails>> {
    let Some(item) = self.store.get_narrative_item(id).await? else {
      return Ok(None);
    };

    let path = item.file_path.as_deref().map(|p| self.content.resolve(p));
    let body = self.body(path, item.description).await;

    Ok(Some(ItemDetails {
      entity:        EntityRef::Narrative(item.id),
      name:          item.name,
      path:          body.path,
      content:       body.content,
      file_exists:   body.file_exists,
      mtime:         body.mtime,
      custom_fields: None,
    }))
  }

  pub async fn world(&self, id: WorldObjectId) -> Result<Option<ItemDetails>> {
    let Some(object) = self.store.get_world_object(id).await? else {
      return Ok(None);
    };

    let template = self.store.get_template(object.template_id).await?;
    let fields = match &template {
      Some(t) => custom_fields(&t.fields, object.properties.as_ref()),
      None => Vec::new(),
    };
    let path = template.map(|t| {
      self
        .content
        .resolve(self.layout.world_object_file(&t.name, object.id))
    });
    let body = self.body(path, object.description).await;

    Ok(Some(ItemDetails {
      entity:        EntityRef::World(object.id),
      name:          object.name,
      path:          body.path,
      content:       body.content,
      file_exists:   body.file_exists,
      mtime:         body.mtime,
      custom_fields: Some(fields),
    }))
  }

  /// Absolute path of the file backing `entity`, if the entity exists and
  /// has one.
  pub async fn content_path(&self, entity: EntityRef) -> Result<Option<PathBuf>> {
    match entity {
      EntityRef::Narrative(id) => {
        let item = self
          .store
          .get_narrative_item(id)
          .await?
          .ok_or(folio_core::Error::NarrativeNotFound(id))?;
        Ok(item.file_path.map(|p| self.content.resolve(p)))
      }
      EntityRef::World(id) => {
        let object = self
          .store
          .get_world_object(id)
          .await?
          .ok_or(folio_core::Error::WorldObjectNotFound(id))?;
        let template = self.store.get_template(object.template_id).await?;
        Ok(template.map(|t| {
          self
            .content
            .resolve(self.layout.world_object_file(&t.name, object.id))
        }))
      }
    }
  }

  async fn body(&self, path: Option<PathBuf>, description: Option<String>) -> Body {
    let Some(path) = path else {
      return Body {
        path:        None,
        content:     description.unwrap_or_default(),
        file_exists: false,
        mtime:       None,
      };
    };

    match self.content.load(&path).await {
      Loaded::Read { text, stat } => Body {
        path:        Some(path),
        content:     text,
        file_exists: true,
        mtime:       Some(stat.mtime),
      },
      Loaded::Missing => {
        tracing::debug!(path = %path.display(), "content file not found");
        placeholder(path, MISSING_FILE_PLACEHOLDER)
      }
      Loaded::Unreadable(e) => {
        tracing::error!(path = %path.display(), error = %e, "content file exists but could not be read");
        placeholder(path, UNREADABLE_FILE_PLACEHOLDER)
      }
    }
  }
}

fn placeholder(path: PathBuf, text: &str) -> Body {
  Body {
    path:        Some(path),
    content:     text.to_owned(),
    file_exists: false,
    mtime:       None,
  }
}

