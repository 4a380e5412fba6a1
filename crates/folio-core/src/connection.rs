//! Connections — described edges between two entity identities.
//!
//! An edge is stored with a fixed source/target pair but carries no direction
//! in meaning: seen from either endpoint, the other endpoint is "the other
//! side".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  entity::{EntityRef, EntitySummary, ResolvedEntity},
  id::{ConnectionId, EntityId},
  store::ProjectStore,
};

/// An edge exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
  pub id:          ConnectionId,
  pub description: String,
  pub source:      EntityId,
  pub target:      EntityId,
}

impl Connection {
  /// The endpoint that is not `me`. For a self-connection that is `me` again.
  pub fn other_side(&self, me: EntityId) -> EntityId {
    if self.source == me { self.target } else { self.source }
  }
}

/// An edge seen from one endpoint, with the other endpoint resolved to a
/// presentable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionView {
  pub id:          ConnectionId,
  pub description: String,
  pub other:       EntitySummary,
}

/// Turn raw edges touching `me` into views.
///
/// `resolved` maps other-side identities to their owners and `names` maps
/// owners to display names. Edges whose other side is missing from either
/// (an orphaned identity or a vanished record) are dropped silently; they are
/// a consistency anomaly, not a request failure.
pub fn assemble_views(
  me: EntityId,
  edges: Vec<Connection>,
  resolved: &[ResolvedEntity],
  names: &HashMap<EntityRef, String>,
) -> Vec<ConnectionView> {
  let owners: HashMap<EntityId, EntityRef> =
    resolved.iter().map(|r| (r.entity_id, r.entity)).collect();

  edges
    .into_iter()
    .filter_map(|edge| {
      let other_id = edge.other_side(me);
      let entity = *owners.get(&other_id)?;
      let name = names.get(&entity)?.clone();
      Some(ConnectionView {
        id:          edge.id,
        description: edge.description,
        other:       EntitySummary { entity, name, entity_id: other_id },
      })
    })
    .collect()
}

/// All connections of `entity`, each resolved to a presentable other side.
///
/// Costs a fixed number of store round trips however many edges there are:
/// identity lookup, edge fetch, one bulk identity resolution and one batched
/// name lookup. An entity without an identity has no connections.
pub async fn load_views<S: ProjectStore>(
  store: &S,
  entity: EntityRef,
) -> Result<Vec<ConnectionView>, S::Error> {
  let Some(me) = store.find_identity(entity).await? else {
    return Ok(Vec::new());
  };

  let edges = store.edges_of(me).await?;
  if edges.is_empty() {
    return Ok(Vec::new());
  }

  let mut others: Vec<EntityId> = edges.iter().map(|e| e.other_side(me)).collect();
  others.sort();
  others.dedup();

  let resolved = store.resolve_identities(others).await?;
  let names = store
    .entity_names(resolved.iter().map(|r| r.entity).collect())
    .await?;

  Ok(assemble_views(me, edges, &resolved, &names))
}
