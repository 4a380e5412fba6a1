//! Subcommands and their dispatch onto a [`Project`].

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::{Args, Subcommand};
use folio_core::{
  entity::{EntityKind, EntityRef},
  id::{ConnectionId, NarrativeId, TemplateId, WorldObjectId},
  template::{FieldDescriptor, TemplateQuery},
  world::Properties,
};
use folio_project::Project;
use serde::Serialize;
use serde_json::Value;

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create a new project in the project directory.
  Init,

  /// Narrative items: parts, chapters, scenes.
  #[command(subcommand)]
  Narrative(NarrativeCommand),

  /// World objects: characters, locations.
  #[command(subcommand)]
  World(WorldCommand),

  /// Described links between any two entities.
  #[command(subcommand)]
  Connection(ConnectionCommand),

  /// Templates and their custom fields.
  #[command(subcommand)]
  Template(TemplateCommand),

  /// Find entities by name, case-insensitively.
  Search {
    query:        String,
    /// Leave this entity out of the results (with `--exclude-id`).
    #[arg(long, requires = "exclude_id")]
    exclude_kind: Option<EntityKind>,
    #[arg(long, requires = "exclude_kind")]
    exclude_id:   Option<i64>,
  },

  /// Print the mtime and size of a file, relative to the project root.
  Stat { path: PathBuf },

  /// Create the missing content file of an entity.
  Touch {
    #[command(flatten)]
    entity: EntityArg,
  },
}

/// An entity on the command line: `--kind world --id 3`.
#[derive(Args, Debug, Clone, Copy)]
pub struct EntityArg {
  #[arg(long = "kind")]
  pub kind: EntityKind,
  #[arg(long = "id")]
  pub id:   i64,
}

impl From<EntityArg> for EntityRef {
  fn from(a: EntityArg) -> Self { EntityRef::new(a.kind, a.id) }
}

#[derive(Subcommand, Debug)]
pub enum NarrativeCommand {
  /// The whole tree, depth first.
  List,
  Show {
    id: i64,
  },
  Create {
    /// Kind name, e.g. "Chapter".
    #[arg(long)]
    kind:   String,
    #[arg(long)]
    parent: Option<i64>,
    name:   String,
  },
  Rename {
    id:   i64,
    name: String,
  },
  /// Reparent and/or reorder an item.
  Move {
    id:     i64,
    /// New parent; omit to make the item a root.
    #[arg(long)]
    parent: Option<i64>,
    #[arg(long, default_value_t = 0)]
    order:  i64,
  },
  Delete {
    id: i64,
  },
}

#[derive(Subcommand, Debug)]
pub enum WorldCommand {
  /// Visible world kinds.
  Kinds,
  List {
    kind_id: i64,
  },
  Show {
    id: i64,
  },
  Create {
    #[arg(long = "kind")]
    kind_id: i64,
    name:    String,
    /// `field=value`, where field is a field label or key.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set:     Vec<String>,
  },
  Rename {
    id:   i64,
    name: String,
  },
  /// Replace the name and every custom field value.
  Update {
    id:   i64,
    name: String,
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set:  Vec<String>,
  },
  Delete {
    id: i64,
  },
}

#[derive(Subcommand, Debug)]
pub enum ConnectionCommand {
  /// Connections of one entity, seen from its side.
  List {
    #[command(flatten)]
    entity: EntityArg,
  },
  Add {
    #[arg(long)]
    from_kind:   EntityKind,
    #[arg(long)]
    from_id:     i64,
    #[arg(long)]
    to_kind:     EntityKind,
    #[arg(long)]
    to_id:       i64,
    #[arg(long, default_value = "")]
    description: String,
  },
  Remove {
    id: i64,
  },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
  List {
    /// Include archived templates.
    #[arg(long)]
    all:      bool,
    #[arg(long)]
    category: Option<EntityKind>,
  },
  Show {
    id: i64,
  },
  Create {
    #[arg(long)]
    category: EntityKind,
    name:     String,
    /// Field labels, in order.
    #[arg(long = "field")]
    fields:   Vec<String>,
  },
  Rename {
    id:   i64,
    name: String,
  },
  Archive {
    id: i64,
  },
  Restore {
    id: i64,
  },
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// What a command prints: a JSON document, or nothing.
pub type Output = Option<Value>;

fn json(value: impl Serialize) -> anyhow::Result<Output> {
  Ok(Some(serde_json::to_value(value).context("failed to serialise output")?))
}

fn found<T: Serialize>(what: &str, id: i64, value: Option<T>) -> anyhow::Result<Output> {
  match value {
    Some(v) => json(v),
    None => bail!("{what} {id} not found"),
  }
}

pub async fn run(project: &Project, command: Command) -> anyhow::Result<Output> {
  match command {
    Command::Init => Ok(None),
    Command::Narrative(cmd) => narrative(project, cmd).await,
    Command::World(cmd) => world(project, cmd).await,
    Command::Connection(cmd) => connection(project, cmd).await,
    Command::Template(cmd) => template(project, cmd).await,
    Command::Search { query, exclude_kind, exclude_id } => {
      let exclude = match exclude_kind.zip(exclude_id) {
        Some((kind, id)) => project.identity_of(EntityRef::new(kind, id)).await?,
        None => None,
      };
      json(project.search_entities(&query, exclude).await?)
    }
    Command::Stat { path } => json(project.stat_file(&path).await?),
    Command::Touch { entity } => {
      let path = project.create_content_file(entity.into()).await?;
      json(path)
    }
  }
}

async fn narrative(project: &Project, cmd: NarrativeCommand) -> anyhow::Result<Output> {
  match cmd {
    NarrativeCommand::List => json(project.list_narrative_items().await?),
    NarrativeCommand::Show { id } => {
      found("narrative item", id, project.narrative_details(NarrativeId(id)).await?)
    }
    NarrativeCommand::Create { kind, parent, name } => {
      let item = project
        .create_narrative_item(parent.map(NarrativeId), &kind, &name)
        .await?;
      json(item)
    }
    NarrativeCommand::Rename { id, name } => {
      project.rename_narrative_item(NarrativeId(id), &name).await?;
      Ok(None)
    }
    NarrativeCommand::Move { id, parent, order } => {
      project
        .move_narrative_item(NarrativeId(id), parent.map(NarrativeId), order)
        .await?;
      Ok(None)
    }
    NarrativeCommand::Delete { id } => {
      project.delete_narrative_item(NarrativeId(id)).await?;
      Ok(None)
    }
  }
}

async fn world(project: &Project, cmd: WorldCommand) -> anyhow::Result<Output> {
  match cmd {
    WorldCommand::Kinds => json(project.list_world_object_kinds().await?),
    WorldCommand::List { kind_id } => json(project.list_world_objects(TemplateId(kind_id)).await?),
    WorldCommand::Show { id } => {
      found("world object", id, project.world_object_details(WorldObjectId(id)).await?)
    }
    WorldCommand::Create { kind_id, name, set } => {
      let kind_id = TemplateId(kind_id);
      let properties = properties_for(project, kind_id, &set).await?;
      json(project.create_world_object(&name, kind_id, Some(properties)).await?)
    }
    WorldCommand::Rename { id, name } => {
      project.rename_world_object(WorldObjectId(id), &name).await?;
      Ok(None)
    }
    WorldCommand::Update { id, name, set } => {
      let object = project
        .get_world_object(WorldObjectId(id))
        .await?
        .with_context(|| format!("world object {id} not found"))?;
      let properties = properties_for(project, object.template_id, &set).await?;
      project
        .update_world_object_details(WorldObjectId(id), &name, properties)
        .await?;
      Ok(None)
    }
    WorldCommand::Delete { id } => {
      project.delete_world_object(WorldObjectId(id)).await?;
      Ok(None)
    }
  }
}

async fn connection(project: &Project, cmd: ConnectionCommand) -> anyhow::Result<Output> {
  match cmd {
    ConnectionCommand::List { entity } => json(project.connections(entity.into()).await?),
    ConnectionCommand::Add { from_kind, from_id, to_kind, to_id, description } => {
      let edge = project
        .create_connection(
          EntityRef::new(from_kind, from_id),
          EntityRef::new(to_kind, to_id),
          &description,
        )
        .await?;
      json(edge)
    }
    ConnectionCommand::Remove { id } => {
      project.delete_connection(ConnectionId(id)).await?;
      Ok(None)
    }
  }
}

async fn template(project: &Project, cmd: TemplateCommand) -> anyhow::Result<Output> {
  match cmd {
    TemplateCommand::List { all, category } => {
      json(project.list_templates(TemplateQuery { include_archived: all, category }).await?)
    }
    TemplateCommand::Show { id } => found("template", id, project.get_template(TemplateId(id)).await?),
    TemplateCommand::Create { category, name, fields } => {
      json(project.create_template(&name, category, fields).await?)
    }
    TemplateCommand::Rename { id, name } => {
      project.rename_template(TemplateId(id), &name).await?;
      Ok(None)
    }
    TemplateCommand::Archive { id } => {
      project.archive_template(TemplateId(id)).await?;
      Ok(None)
    }
    TemplateCommand::Restore { id } => {
      project.restore_template(TemplateId(id)).await?;
      Ok(None)
    }
  }
}

// ─── Properties ──────────────────────────────────────────────────────────────

/// Build a property map from `FIELD=VALUE` pairs against `kind_id`'s schema.
async fn properties_for(
  project: &Project,
  kind_id: TemplateId,
  pairs: &[String],
) -> anyhow::Result<Properties> {
  let template = project
    .get_template(kind_id)
    .await?
    .with_context(|| format!("template {kind_id} not found"))?;
  parse_properties(&template.fields, pairs)
}

fn parse_properties(schema: &[FieldDescriptor], pairs: &[String]) -> anyhow::Result<Properties> {
  let mut out = Properties::new();
  for pair in pairs {
    let Some((field, value)) = pair.split_once('=') else {
      bail!("expected FIELD=VALUE, got {pair:?}");
    };
    let field = field.trim();
    let Some(descriptor) = schema
      .iter()
      .find(|d| d.key.as_str() == field || d.label.eq_ignore_ascii_case(field))
    else {
      bail!("no field named {field:?}");
    };
    out.insert(descriptor.key.clone(), value.to_owned());
  }
  Ok(out)
}
