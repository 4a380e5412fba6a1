//! Narrative items — the part/chapter/scene forest.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::id::{NarrativeId, TemplateId};

/// A node of the narrative forest as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeItem {
  pub id:          NarrativeId,
  pub name:        String,
  pub template_id: TemplateId,
  pub parent_id:   Option<NarrativeId>,
  pub sort_order:  i64,
  /// Path relative to the project root.
  pub file_path:   Option<String>,
  /// Inline text used only when the item has no file path.
  pub description: Option<String>,
}

/// Parameters for creating a narrative item.
#[derive(Debug, Clone)]
pub struct NewNarrativeItem {
  pub name:        String,
  pub template_id: TemplateId,
  pub parent_id:   Option<NarrativeId>,
  pub file_path:   Option<String>,
}

/// A narrative item as listed for the tree: carries its kind's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeNode {
  pub id:         NarrativeId,
  pub name:       String,
  pub parent_id:  Option<NarrativeId>,
  pub sort_order: i64,
  /// Name of the item's template ("Chapter", "Scene", ...).
  pub kind:       String,
}

/// A [`NarrativeNode`] placed in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeEntry {
  #[serde(flatten)]
  pub node:  NarrativeNode,
  /// Zero for roots.
  pub depth: usize,
}

/// Order `nodes` depth-first: every node is followed by its subtree, and
/// siblings are ordered by `sort_order`, ties by id (insertion order).
///
/// Nodes whose parent is not in `nodes` are treated as roots. Nodes caught in
/// a parent cycle are never reachable from a root and are dropped.
pub fn flatten_forest(nodes: Vec<NarrativeNode>) -> Vec<NarrativeEntry> {
  let present: HashSet<NarrativeId> = nodes.iter().map(|n| n.id).collect();

  let mut children: HashMap<Option<NarrativeId>, Vec<NarrativeNode>> =
    HashMap::new();
  for node in nodes {
    let parent = node.parent_id.filter(|p| present.contains(p));
    children.entry(parent).or_default().push(node);
  }
  for siblings in children.values_mut() {
    siblings.sort_by_key(|n| (n.sort_order, n.id));
  }

  let mut out = Vec::with_capacity(present.len());
  let mut stack: Vec<(NarrativeNode, usize)> = children
    .remove(&None)
    .unwrap_or_default()
    .into_iter()
    .rev()
    .map(|n| (n, 0))
    .collect();

  while let Some((node, depth)) = stack.pop() {
    if let Some(kids) = children.remove(&Some(node.id)) {
      stack.extend(kids.into_iter().rev().map(|k| (k, depth + 1)));
    }
    out.push(NarrativeEntry { node, depth });
  }

  out
}
