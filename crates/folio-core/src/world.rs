//! World objects — the non-hierarchical catalog (characters, locations, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  id::{TemplateId, WorldObjectId},
  template::{FieldDescriptor, FieldKey},
};

/// Custom-field values keyed by internal field key.
pub type Properties = BTreeMap<FieldKey, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObject {
  pub id:          WorldObjectId,
  pub name:        String,
  pub template_id: TemplateId,
  /// `None` when the stored properties blob could not be decoded.
  pub properties:  Option<Properties>,
  pub description: Option<String>,
}

/// Parameters for creating a world object.
#[derive(Debug, Clone)]
pub struct NewWorldObject {
  pub name:        String,
  pub template_id: TemplateId,
  pub properties:  Properties,
}

/// Entry of a per-kind world object listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldObjectSummary {
  pub id:          WorldObjectId,
  pub name:        String,
  pub template_id: TemplateId,
}

// ─── Custom fields ───────────────────────────────────────────────────────────

/// A schema entry paired with its value; derived at read time, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
  pub key:   FieldKey,
  pub label: String,
  pub value: String,
}

/// Pair a template schema with an object's properties.
///
/// Output follows schema order. A field missing from `properties` gets an
/// empty value; keys present in `properties` but not in the schema are not
/// shown. Undecodable properties (`None`) yield no fields at all.
pub fn custom_fields(
  schema: &[FieldDescriptor],
  properties: Option<&Properties>,
) -> Vec<CustomField> {
  let Some(properties) = properties else {
    return Vec::new();
  };
  schema
    .iter()
    .map(|field| CustomField {
      key:   field.key.clone(),
      label: field.label.clone(),
      value: properties.get(&field.key).cloned().unwrap_or_default(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn field(key: &str, label: &str) -> FieldDescriptor {
    FieldDescriptor { key: key.into(), label: label.into() }
  }

  #[test]
  fn pairs_schema_with_properties() {
    let schema = [field("f1", "Age")];
    let props = Properties::from([("f1".into(), "30".to_owned())]);

    let fields = custom_fields(&schema, Some(&props));
    assert_eq!(fields, vec![CustomField {
      key:   "f1".into(),
      label: "Age".into(),
      value: "30".into(),
    }]);
  }

  #[test]
  fn missing_value_is_empty_and_extra_keys_are_ignored() {
    let schema = [field("f1", "Age"), field("f2", "Eyes")];
    let props = Properties::from([
      ("f2".into(), "green".to_owned()),
      ("stale".into(), "x".to_owned()),
    ]);

    let fields = custom_fields(&schema, Some(&props));
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].value, "");
    assert_eq!(fields[1].value, "green");
  }

  #[test]
  fn undecodable_properties_yield_no_fields() {
    let schema = [field("f1", "Age")];
    assert!(custom_fields(&schema, None).is_empty());
  }
}
