//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! The template field schema and world object properties are stored as JSON.
//! Both are decoded leniently: a malformed blob is logged and degrades to an
//! empty schema or to "no properties", never to a failed read.

use folio_core::{
  entity::{EntityKind, EntityRef, ResolvedEntity},
  id::{EntityId, NarrativeId, TemplateId, WorldObjectId},
  narrative::{NarrativeItem, NarrativeNode},
  template::{FieldDescriptor, FieldKey, Template},
  world::{Properties, WorldObject},
};

use crate::{Error, Result};

// ─── EntityKind ──────────────────────────────────────────────────────────────

pub fn encode_kind(k: EntityKind) -> &'static str { k.as_str() }

pub fn decode_kind(s: &str) -> Result<EntityKind> { Ok(s.parse()?) }

// ─── Field schema ────────────────────────────────────────────────────────────

pub fn encode_fields(fields: &[FieldDescriptor]) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn decode_fields(template_id: i64, s: &str) -> Vec<FieldDescriptor> {
  match serde_json::from_str(s) {
    Ok(fields) => fields,
    Err(e) => {
      tracing::warn!(template_id, error = %e, "malformed field schema; treating as empty");
      Vec::new()
    }
  }
}

// ─── Properties ──────────────────────────────────────────────────────────────

pub fn encode_properties(props: &Properties) -> Result<String> {
  Ok(serde_json::to_string(props)?)
}

/// Decode a properties blob. Non-string scalars are kept in their JSON text
/// form and `null` becomes an empty string; anything that is not a JSON
/// object yields `None`.
pub fn decode_properties(object_id: i64, s: &str) -> Option<Properties> {
  let value: serde_json::Value = match serde_json::from_str(s) {
    Ok(v) => v,
    Err(e) => {
      tracing::warn!(object_id, error = %e, "malformed properties; ignoring custom fields");
      return None;
    }
  };

  let serde_json::Value::Object(map) = value else {
    tracing::warn!(object_id, "properties are not a JSON object; ignoring custom fields");
    return None;
  };

  Some(
    map
      .into_iter()
      .map(|(k, v)| {
        let v = match v {
          serde_json::Value::String(s) => s,
          serde_json::Value::Null => String::new(),
          other => other.to_string(),
        };
        (FieldKey(k), v)
      })
      .collect(),
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const TEMPLATE_COLUMNS: &str = "id, name, category, fields_schema, is_visible";

/// Raw values read directly from an `entity_templates` row.
pub struct RawTemplate {
  pub id:            i64,
  pub name:          String,
  pub category:      String,
  pub fields_schema: String,
  pub is_visible:    bool,
}

impl RawTemplate {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      category:      row.get(2)?,
      fields_schema: row.get(3)?,
      is_visible:    row.get(4)?,
    })
  }

  pub fn into_template(self) -> Result<Template> {
    Ok(Template {
      id:         TemplateId(self.id),
      category:   decode_kind(&self.category)?,
      fields:     decode_fields(self.id, &self.fields_schema),
      name:       self.name,
      is_visible: self.is_visible,
    })
  }
}

pub const NARRATIVE_COLUMNS: &str =
  "id, name, template_id, parent_id, sort_order, file_path, description";

pub fn narrative_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NarrativeItem> {
  Ok(NarrativeItem {
    id:          NarrativeId(row.get(0)?),
    name:        row.get(1)?,
    template_id: TemplateId(row.get(2)?),
    parent_id:   row.get::<_, Option<i64>>(3)?.map(NarrativeId),
    sort_order:  row.get(4)?,
    file_path:   row.get(5)?,
    description: row.get(6)?,
  })
}

pub fn narrative_node_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NarrativeNode> {
  Ok(NarrativeNode {
    id:         NarrativeId(row.get(0)?),
    name:       row.get(1)?,
    parent_id:  row.get::<_, Option<i64>>(2)?.map(NarrativeId),
    sort_order: row.get(3)?,
    kind:       row.get(4)?,
  })
}

pub const WORLD_COLUMNS: &str = "id, name, template_id, properties, description";

/// Raw values read directly from a `world_objects` row.
pub struct RawWorldObject {
  pub id:          i64,
  pub name:        String,
  pub template_id: i64,
  pub properties:  String,
  pub description: Option<String>,
}

impl RawWorldObject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      template_id: row.get(2)?,
      properties:  row.get(3)?,
      description: row.get(4)?,
    })
  }

  pub fn into_world_object(self) -> WorldObject {
    WorldObject {
      id:          WorldObjectId(self.id),
      properties:  decode_properties(self.id, &self.properties),
      name:        self.name,
      template_id: TemplateId(self.template_id),
      description: self.description,
    }
  }
}

/// Raw `all_entities` row: exactly one owner column is set.
pub struct RawIdentity {
  pub id:              i64,
  pub narrative_id:    Option<i64>,
  pub world_object_id: Option<i64>,
}

impl RawIdentity {
  pub fn into_resolved(self) -> Result<ResolvedEntity> {
    let entity = match (self.narrative_id, self.world_object_id) {
      (Some(n), None) => EntityRef::Narrative(NarrativeId(n)),
      (None, Some(w)) => EntityRef::World(WorldObjectId(w)),
      _ => {
        return Err(Error::Corrupt(format!(
          "identity {} must point to exactly one record",
          self.id
        )));
      }
    };
    Ok(ResolvedEntity { entity_id: EntityId(self.id), entity })
  }
}

/// `?, ?, ?` for `n` positional parameters.
pub fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }
