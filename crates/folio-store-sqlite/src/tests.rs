//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use folio_core::{
  Error as CoreError,
  connection::load_views,
  entity::{EntityKind, EntityRef},
  id::{ConnectionId, EntityId, NarrativeId, TemplateId, WorldObjectId},
  narrative::{NarrativeItem, NewNarrativeItem, flatten_forest},
  store::ProjectStore,
  template::{FieldKey, NewTemplate, Template, TemplateQuery},
  world::{NewWorldObject, Properties, WorldObject, custom_fields},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn template(s: &SqliteStore, name: &str, category: EntityKind, labels: &[&str]) -> Template {
  s.create_template(NewTemplate::new(name, category, labels.iter().copied()))
    .await
    .unwrap()
}

async fn narrative(
  s: &SqliteStore,
  tmpl: TemplateId,
  name: &str,
  parent: Option<NarrativeId>,
) -> NarrativeItem {
  s.create_narrative_item(NewNarrativeItem {
    name:        name.into(),
    template_id: tmpl,
    parent_id:   parent,
    file_path:   None,
  })
  .await
  .unwrap()
}

async fn world(s: &SqliteStore, tmpl: TemplateId, name: &str, props: Properties) -> WorldObject {
  s.create_world_object(NewWorldObject {
    name:        name.into(),
    template_id: tmpl,
    properties:  props,
  })
  .await
  .unwrap()
}

fn core_err(e: &Error) -> &CoreError {
  e.as_core().unwrap_or_else(|| panic!("expected a domain error, got {e}"))
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("project.sqlite");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    template(&s, "Character", EntityKind::World, &["Age"]).await;
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let all = s.list_templates(TemplateQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].fields[0].label, "Age");
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn creating_records_creates_identities() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;

  let ch1 = narrative(&s, chap.id, "Ch1", None).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;

  let n_id = s.find_identity(ch1.id.into()).await.unwrap().unwrap();
  let w_id = s.find_identity(alice.id.into()).await.unwrap().unwrap();
  assert_ne!(n_id, w_id);

  let resolved = s.resolve_identities(vec![n_id, w_id, EntityId(999)]).await.unwrap();
  assert_eq!(resolved.len(), 2);
  let owner_of = |id| resolved.iter().find(|r| r.entity_id == id).map(|r| r.entity);
  assert_eq!(owner_of(n_id), Some(EntityRef::Narrative(ch1.id)));
  assert_eq!(owner_of(w_id), Some(EntityRef::World(alice.id)));
}

#[tokio::test]
async fn empty_bulk_lookups_return_empty() {
  let s = store().await;
  assert!(s.resolve_identities(vec![]).await.unwrap().is_empty());
  assert!(s.entity_names(vec![]).await.unwrap().is_empty());
}

#[tokio::test]
async fn identity_must_have_exactly_one_owner() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  narrative(&s, chap.id, "Ch1", None).await;
  world(&s, chr.id, "Alice", Properties::new()).await;

  let neither = s
    .execute_raw("INSERT INTO all_entities (narrative_id, world_object_id) VALUES (NULL, NULL)")
    .await;
  assert!(neither.is_err());

  // Free both records' identities so only the owner check can object.
  s.execute_raw("DELETE FROM all_entities").await.unwrap();
  let both = s
    .execute_raw("INSERT INTO all_entities (narrative_id, world_object_id) VALUES (1, 1)")
    .await;
  assert!(both.is_err());

  let one = s
    .execute_raw("INSERT INTO all_entities (narrative_id, world_object_id) VALUES (1, NULL)")
    .await;
  assert_eq!(one.unwrap(), 1);
}

#[tokio::test]
async fn deleting_a_record_deletes_its_identity() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;
  let id = s.find_identity(alice.id.into()).await.unwrap().unwrap();

  let deleted = s.delete_world_object(alice.id).await.unwrap();
  assert_eq!(deleted.map(|o| o.name), Some("Alice".to_owned()));

  assert!(s.find_identity(alice.id.into()).await.unwrap().is_none());
  assert!(s.resolve_identities(vec![id]).await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let a = world(&s, chr.id, "A", Properties::new()).await;
  let a_identity = s.find_identity(a.id.into()).await.unwrap().unwrap();
  s.delete_world_object(a.id).await.unwrap();

  let b = world(&s, chr.id, "B", Properties::new()).await;
  let b_identity = s.find_identity(b.id.into()).await.unwrap().unwrap();
  assert!(b.id > a.id);
  assert!(b_identity > a_identity);
}

// ─── Templates ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn rename_template_keeps_field_keys() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &["Age", "Role"]).await;
  let keys: Vec<FieldKey> = chr.fields.iter().map(|f| f.key.clone()).collect();

  s.rename_template(chr.id, "Person".into()).await.unwrap();

  let fetched = s.get_template(chr.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Person");
  let after: Vec<FieldKey> = fetched.fields.iter().map(|f| f.key.clone()).collect();
  assert_eq!(after, keys);
}

#[tokio::test]
async fn rename_missing_template_fails() {
  let s = store().await;
  let err = s.rename_template(TemplateId(42), "X".into()).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::TemplateNotFound(TemplateId(42))));
}

#[tokio::test]
async fn empty_template_name_rejected() {
  let s = store().await;
  let err = s
    .create_template(NewTemplate::new("  ", EntityKind::World, ["Age"]))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::EmptyName(_)));
}

#[tokio::test]
async fn template_names_must_be_one_path_component() {
  let s = store().await;
  let err = s
    .create_template(NewTemplate::new("../etc", EntityKind::World, ["Age"]))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::InvalidTemplateName(_)));

  let hero = template(&s, " Hero ", EntityKind::World, &[]).await;
  assert_eq!(hero.name, " Hero ");
  let err = s.rename_template(hero.id, "..".into()).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::InvalidTemplateName(_)));
  assert_eq!(s.get_template(hero.id).await.unwrap().unwrap().name, " Hero ");
}

#[tokio::test]
async fn archive_refused_while_in_use() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  world(&s, chr.id, "Alice", Properties::new()).await;

  let err = s.archive_template(chr.id).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::TemplateInUse { count: 1, .. }));
  assert!(s.get_template(chr.id).await.unwrap().unwrap().is_visible);
}

#[tokio::test]
async fn archive_and_restore_unused_template() {
  let s = store().await;
  let loc = template(&s, "Location", EntityKind::World, &[]).await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;

  s.archive_template(loc.id).await.unwrap();

  let visible = s.list_templates(TemplateQuery::default()).await.unwrap();
  assert_eq!(visible.iter().map(|t| t.id).collect::<Vec<_>>(), vec![chr.id]);
  let kinds: Vec<_> = s
    .list_world_object_kinds()
    .await
    .unwrap()
    .into_iter()
    .map(|k| (k.id, k.is_visible))
    .collect();
  assert_eq!(kinds, vec![(chr.id, true), (loc.id, false)]);

  let all = s
    .list_templates(TemplateQuery { include_archived: true, category: None })
    .await
    .unwrap();
  assert_eq!(all.len(), 2);

  s.restore_template(loc.id).await.unwrap();
  assert!(s.get_template(loc.id).await.unwrap().unwrap().is_visible);
}

#[tokio::test]
async fn list_templates_by_category() {
  let s = store().await;
  template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  template(&s, "Character", EntityKind::World, &[]).await;

  let narrative_only = s
    .list_templates(TemplateQuery { include_archived: false, category: Some(EntityKind::Narrative) })
    .await
    .unwrap();
  assert_eq!(narrative_only.len(), 1);
  assert_eq!(narrative_only[0].name, "Chapter");
}

#[tokio::test]
async fn world_kinds_sorted_by_name() {
  let s = store().await;
  template(&s, "Location", EntityKind::World, &[]).await;
  template(&s, "Character", EntityKind::World, &[]).await;
  template(&s, "Scene", EntityKind::Narrative, &[]).await;

  let names: Vec<String> = s
    .list_world_object_kinds()
    .await
    .unwrap()
    .into_iter()
    .map(|k| k.name)
    .collect();
  assert_eq!(names, vec!["Character", "Location"]);
}

#[tokio::test]
async fn find_template_prefers_visible() {
  let s = store().await;
  let old = template(&s, "Character", EntityKind::World, &[]).await;
  s.archive_template(old.id).await.unwrap();
  let new = template(&s, "Character", EntityKind::World, &[]).await;

  let found = s.find_template("Character".into(), EntityKind::World).await.unwrap();
  assert_eq!(found.map(|t| t.id), Some(new.id));
  assert!(
    s.find_template("Character".into(), EntityKind::Narrative)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn malformed_field_schema_reads_as_empty() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &["Age"]).await;
  s.execute_raw("UPDATE entity_templates SET fields_schema = 'not json'")
    .await
    .unwrap();

  let fetched = s.get_template(chr.id).await.unwrap().unwrap();
  assert!(fetched.fields.is_empty());
}

// ─── Narrative items ─────────────────────────────────────────────────────────

#[tokio::test]
async fn siblings_get_increasing_sort_order() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let part = narrative(&s, chap.id, "Part", None).await;
  let a = narrative(&s, chap.id, "A", Some(part.id)).await;
  let b = narrative(&s, chap.id, "B", Some(part.id)).await;
  let root2 = narrative(&s, chap.id, "Root2", None).await;

  assert_eq!(part.sort_order, 0);
  assert_eq!(a.sort_order, 0);
  assert_eq!(b.sort_order, 1);
  assert_eq!(root2.sort_order, 1);

  let entries = flatten_forest(s.list_narrative_nodes().await.unwrap());
  let shape: Vec<(&str, usize, &str)> =
    entries.iter().map(|e| (e.node.name.as_str(), e.depth, e.node.kind.as_str())).collect();
  assert_eq!(shape, vec![
    ("Part", 0, "Chapter"),
    ("A", 1, "Chapter"),
    ("B", 1, "Chapter"),
    ("Root2", 0, "Chapter"),
  ]);
}

#[tokio::test]
async fn narrative_item_requires_narrative_template() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;

  let err = s
    .create_narrative_item(NewNarrativeItem {
      name:        "Ch1".into(),
      template_id: chr.id,
      parent_id:   None,
      file_path:   None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::CategoryMismatch { .. }));
  assert!(s.list_narrative_nodes().await.unwrap().is_empty());
}

#[tokio::test]
async fn narrative_item_with_missing_parent_fails() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let err = s
    .create_narrative_item(NewNarrativeItem {
      name:        "Orphan".into(),
      template_id: chap.id,
      parent_id:   Some(NarrativeId(77)),
      file_path:   None,
    })
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NarrativeNotFound(NarrativeId(77))));
}

#[tokio::test]
async fn delete_with_children_is_refused_without_changes() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let parent = narrative(&s, chap.id, "Part", None).await;
  narrative(&s, chap.id, "Scene", Some(parent.id)).await;

  let err = s.delete_narrative_item(parent.id).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::HasChildren { count: 1, .. }));

  assert!(s.get_narrative_item(parent.id).await.unwrap().is_some());
  assert!(s.find_identity(parent.id.into()).await.unwrap().is_some());
  assert_eq!(s.list_narrative_nodes().await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_missing_item_returns_none() {
  let s = store().await;
  assert!(s.delete_narrative_item(NarrativeId(5)).await.unwrap().is_none());
  assert!(s.delete_world_object(WorldObjectId(5)).await.unwrap().is_none());
}

#[tokio::test]
async fn rename_missing_item_is_a_no_op() {
  let s = store().await;
  assert!(!s.rename_narrative_item(NarrativeId(9), "X".into()).await.unwrap());
}

#[tokio::test]
async fn move_rejects_cycles() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let top = narrative(&s, chap.id, "Top", None).await;
  let mid = narrative(&s, chap.id, "Mid", Some(top.id)).await;
  let leaf = narrative(&s, chap.id, "Leaf", Some(mid.id)).await;

  let err = s.move_narrative_item(top.id, Some(leaf.id), 0).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NarrativeCycle { .. }));
  let err = s.move_narrative_item(top.id, Some(top.id), 0).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NarrativeCycle { .. }));

  s.move_narrative_item(leaf.id, None, 5).await.unwrap();
  let moved = s.get_narrative_item(leaf.id).await.unwrap().unwrap();
  assert_eq!(moved.parent_id, None);
  assert_eq!(moved.sort_order, 5);
}

// ─── World objects ───────────────────────────────────────────────────────────

#[tokio::test]
async fn world_object_properties_round_trip_into_custom_fields() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &["Age", "Role"]).await;
  let age = chr.fields[0].key.clone();

  let alice = world(&s, chr.id, "Alice", BTreeMap::from([(age.clone(), "30".to_owned())])).await;
  let fetched = s.get_world_object(alice.id).await.unwrap().unwrap();

  let fields = custom_fields(&chr.fields, fetched.properties.as_ref());
  assert_eq!(fields.len(), 2);
  assert_eq!((fields[0].label.as_str(), fields[0].value.as_str()), ("Age", "30"));
  assert_eq!((fields[1].label.as_str(), fields[1].value.as_str()), ("Role", ""));
}

#[tokio::test]
async fn update_without_properties_keeps_them() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &["Age"]).await;
  let age = chr.fields[0].key.clone();
  let alice = world(&s, chr.id, "Alice", BTreeMap::from([(age.clone(), "30".to_owned())])).await;

  assert!(s.update_world_object(alice.id, "Alicia".into(), None).await.unwrap());
  let fetched = s.get_world_object(alice.id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Alicia");
  assert_eq!(fetched.properties.unwrap().get(&age).map(String::as_str), Some("30"));

  let replaced = BTreeMap::from([(age.clone(), "31".to_owned())]);
  assert!(s.update_world_object(alice.id, "Alicia".into(), Some(replaced)).await.unwrap());
  let fetched = s.get_world_object(alice.id).await.unwrap().unwrap();
  assert_eq!(fetched.properties.unwrap().get(&age).map(String::as_str), Some("31"));

  assert!(!s.update_world_object(WorldObjectId(99), "X".into(), None).await.unwrap());
}

#[tokio::test]
async fn malformed_properties_yield_no_custom_fields() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &["Age"]).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;
  s.execute_raw("UPDATE world_objects SET properties = '[1, 2'")
    .await
    .unwrap();

  let fetched = s.get_world_object(alice.id).await.unwrap().unwrap();
  assert!(fetched.properties.is_none());
  assert!(custom_fields(&chr.fields, fetched.properties.as_ref()).is_empty());
}

#[tokio::test]
async fn world_objects_listed_by_name() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let loc = template(&s, "Location", EntityKind::World, &[]).await;
  world(&s, chr.id, "Zed", Properties::new()).await;
  world(&s, chr.id, "Alice", Properties::new()).await;
  world(&s, loc.id, "Harbor", Properties::new()).await;

  let names: Vec<String> = s
    .list_world_objects(chr.id)
    .await
    .unwrap()
    .into_iter()
    .map(|o| o.name)
    .collect();
  assert_eq!(names, vec!["Alice", "Zed"]);
}

// ─── Connections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn connection_visible_from_both_sides() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let ch1 = narrative(&s, chap.id, "Ch1", None).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;

  s.create_connection(ch1.id.into(), alice.id.into(), "appears in".into())
    .await
    .unwrap();

  let from_chapter = load_views(&s, ch1.id.into()).await.unwrap();
  assert_eq!(from_chapter.len(), 1);
  assert_eq!(from_chapter[0].other.name, "Alice");
  assert_eq!(from_chapter[0].other.entity, EntityRef::World(alice.id));
  assert_eq!(from_chapter[0].description, "appears in");

  let from_alice = load_views(&s, alice.id.into()).await.unwrap();
  assert_eq!(from_alice.len(), 1);
  assert_eq!(from_alice[0].other.name, "Ch1");
}

#[tokio::test]
async fn connection_to_missing_entity_fails() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;

  let ghost = EntityRef::Narrative(NarrativeId(404));
  let err = s
    .create_connection(alice.id.into(), ghost, String::new())
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::MissingEntity(e) if *e == ghost));
}

#[tokio::test]
async fn edges_to_deleted_entities_are_skipped() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;
  let bob = world(&s, chr.id, "Bob", Properties::new()).await;
  let carol = world(&s, chr.id, "Carol", Properties::new()).await;

  s.create_connection(alice.id.into(), bob.id.into(), "knows".into()).await.unwrap();
  s.create_connection(carol.id.into(), alice.id.into(), "knows".into()).await.unwrap();
  s.delete_world_object(bob.id).await.unwrap();

  let me = s.find_identity(alice.id.into()).await.unwrap().unwrap();
  assert_eq!(s.edges_of(me).await.unwrap().len(), 2);

  let views = load_views(&s, alice.id.into()).await.unwrap();
  assert_eq!(views.len(), 1);
  assert_eq!(views[0].other.name, "Carol");
}

#[tokio::test]
async fn self_connection_is_allowed() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let alice = world(&s, chr.id, "Alice", Properties::new()).await;

  s.create_connection(alice.id.into(), alice.id.into(), "alter ego".into())
    .await
    .unwrap();
  let views = load_views(&s, alice.id.into()).await.unwrap();
  assert_eq!(views.len(), 1);
  assert_eq!(views[0].other.entity, EntityRef::World(alice.id));
}

#[tokio::test]
async fn delete_connection_returns_edge() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let a = world(&s, chr.id, "A", Properties::new()).await;
  let b = world(&s, chr.id, "B", Properties::new()).await;
  let edge = s.create_connection(a.id.into(), b.id.into(), "x".into()).await.unwrap();

  let removed = s.delete_connection(edge.id).await.unwrap();
  assert_eq!(removed, Some(edge));
  assert!(load_views(&s, a.id.into()).await.unwrap().is_empty());
  assert!(s.delete_connection(ConnectionId(123)).await.unwrap().is_none());
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_is_case_insensitive_and_skips_excluded() {
  let s = store().await;
  let chap = template(&s, "Chapter", EntityKind::Narrative, &[]).await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  let ch = narrative(&s, chap.id, "Alice's Chapter", None).await;
  let alice = world(&s, chr.id, "ALICE", Properties::new()).await;
  world(&s, chr.id, "Bob", Properties::new()).await;

  let hits = s.search_entities("alice".into(), None).await.unwrap();
  let found: Vec<EntityRef> = hits.iter().map(|h| h.entity).collect();
  assert_eq!(found, vec![EntityRef::Narrative(ch.id), EntityRef::World(alice.id)]);

  let me = s.find_identity(alice.id.into()).await.unwrap();
  let hits = s.search_entities("alice".into(), me).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Alice's Chapter");
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  world(&s, chr.id, "100% Human", Properties::new()).await;
  world(&s, chr.id, "Plain", Properties::new()).await;

  let hits = s.search_entities("%".into(), None).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "100% Human");
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let s = store().await;
  let chr = template(&s, "Character", EntityKind::World, &[]).await;
  world(&s, chr.id, "Élodie", Properties::new()).await;

  let hits = s.search_entities("élo".into(), None).await.unwrap();
  assert_eq!(hits.len(), 1);
}
