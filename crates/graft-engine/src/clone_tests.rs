use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::clone::CloneEngine;
use crate::error::EngineError;
use crate::schema::Schema;
use crate::store::{NodeId, RelationValue, Store};
use crate::value::Value;

fn family_schema() -> Schema {
    let mut schema = Schema::builder();
    schema
        .ty("Person")
        .attr("name")
        .attr("secret")
        .one("parent")
        .one("partner")
        .many("children")
        .mapped_by("parent")
        .many("pets");
    schema.ty("Pet").attr("name");
    schema.build()
}

fn person(store: &mut Store, name: &str) -> NodeId {
    let ty = store.schema().type_id("Person").unwrap();
    let node = store.alloc(ty);
    store.set_attr(node, "name", name).unwrap();
    node
}

#[test]
fn no_patterns_clones_only_the_root() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    store
        .set_relation(root, "children", RelationValue::List(vec![child]))
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine.clone_node(&mut store, root, &[]).unwrap();

    assert_ne!(clone, root);
    assert_eq!(store.attr(clone, "name").unwrap(), Value::Str("root".into()));
    assert_eq!(store.relation(clone, "children").unwrap(), None);
}

#[test]
fn pattern_clones_the_matched_relations() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let a = person(&mut store, "a");
    let b = person(&mut store, "b");
    store
        .set_relation(root, "children", RelationValue::List(vec![a, b]))
        .unwrap();
    store
        .set_relation(a, "children", RelationValue::List(vec![b]))
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine.clone_node(&mut store, root, &["children"]).unwrap();

    let Some(RelationValue::List(kids)) = store.relation(clone, "children").unwrap() else {
        panic!("children should be a cloned list");
    };
    let kids = kids.clone();
    assert_eq!(kids.len(), 2);
    assert!(!kids.contains(&a) && !kids.contains(&b));
    assert_eq!(store.attr(kids[0], "name").unwrap(), Value::Str("a".into()));
    // one level deep only: the cloned child's own children stay unset
    assert_eq!(store.relation(kids[0], "children").unwrap(), None);
}

#[test]
fn inverse_path_points_back_at_the_clone() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    store
        .set_relation(root, "children", RelationValue::List(vec![child]))
        .unwrap();
    store
        .set_relation(child, "parent", RelationValue::One(root))
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine.clone_node(&mut store, root, &["children"]).unwrap();

    let Some(RelationValue::List(kids)) = store.relation(clone, "children").unwrap() else {
        panic!("children should be a cloned list");
    };
    let child_clone = kids[0];
    assert_eq!(
        store.relation(child_clone, "parent").unwrap(),
        Some(&RelationValue::One(clone))
    );
}

#[test]
fn multi_segment_inverse_path_is_walked_hop_by_hop() {
    let mut schema = Schema::builder();
    schema.ty("Order").many("lines").mapped_by("head.order");
    schema.ty("Line").one("head");
    schema.ty("Head").one("order");
    let schema = schema.build();
    let order_ty = schema.type_id("Order").unwrap();
    let line_ty = schema.type_id("Line").unwrap();
    let head_ty = schema.type_id("Head").unwrap();
    let mut store = Store::new(schema);
    let order = store.alloc(order_ty);
    let line = store.alloc(line_ty);
    let head = store.alloc(head_ty);
    store
        .set_relation(order, "lines", RelationValue::List(vec![line]))
        .unwrap();
    store
        .set_relation(line, "head", RelationValue::One(head))
        .unwrap();
    store
        .set_relation(head, "order", RelationValue::One(order))
        .unwrap();

    let engine = CloneEngine::new();
    let order_clone = engine.clone_node(&mut store, order, &["lines"]).unwrap();

    let Some(RelationValue::List(lines)) = store.relation(order_clone, "lines").unwrap() else {
        panic!("lines should be a cloned list");
    };
    let line_clone = lines[0];
    let Some(RelationValue::One(head_clone)) = store.relation(line_clone, "head").unwrap() else {
        panic!("head should be cloned along the inverse path");
    };
    let head_clone = *head_clone;
    assert_ne!(head_clone, head);
    assert_eq!(
        store.relation(head_clone, "order").unwrap(),
        Some(&RelationValue::One(order_clone))
    );
}

#[test]
fn cycles_terminate_and_fold_onto_the_same_clones() {
    let mut store = Store::new(family_schema());
    let a = person(&mut store, "a");
    let b = person(&mut store, "b");
    store
        .set_relation(a, "partner", RelationValue::One(b))
        .unwrap();
    store
        .set_relation(b, "partner", RelationValue::One(a))
        .unwrap();
    let before = store.len();

    let engine = CloneEngine::new();
    let a_clone = engine.clone_node(&mut store, a, &["partner+"]).unwrap();

    // exactly one clone per original, despite the cycle
    assert_eq!(store.len(), before + 2);
    let Some(RelationValue::One(b_clone)) = store.relation(a_clone, "partner").unwrap() else {
        panic!("partner should be cloned");
    };
    let b_clone = *b_clone;
    assert_ne!(b_clone, b);
    assert_eq!(
        store.relation(b_clone, "partner").unwrap(),
        Some(&RelationValue::One(a_clone))
    );
}

#[test]
fn roots_cloned_together_share_descendant_clones() {
    let mut store = Store::new(family_schema());
    let first = person(&mut store, "first");
    let second = person(&mut store, "second");
    let shared = person(&mut store, "shared");
    store
        .set_relation(first, "children", RelationValue::List(vec![shared]))
        .unwrap();
    store
        .set_relation(second, "children", RelationValue::List(vec![shared]))
        .unwrap();

    let engine = CloneEngine::new();
    let clones = engine
        .clone_nodes(&mut store, &[first, second], &["children"])
        .unwrap();

    let child_of = |clone: NodeId, store: &Store| match store.relation(clone, "children").unwrap() {
        Some(RelationValue::List(kids)) => kids[0],
        other => panic!("unexpected children value: {other:?}"),
    };
    let shared_clone = child_of(clones[0], &store);
    assert_ne!(shared_clone, shared);
    assert_eq!(shared_clone, child_of(clones[1], &store));
}

#[test]
fn duplicate_patterns_cause_no_second_clone() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    store
        .set_relation(root, "children", RelationValue::List(vec![child]))
        .unwrap();
    let before = store.len();

    let engine = CloneEngine::new();
    engine
        .clone_node(&mut store, root, &["children", "children", "children$"])
        .unwrap();

    assert_eq!(store.len(), before + 2);
}

#[test]
fn filtered_attrs_stay_at_their_zero_value() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    store.set_attr(root, "secret", "hunter2").unwrap();

    let engine = CloneEngine::new();
    let filter = |_store: &Store, _node: NodeId, property: &str| property != "secret";
    let clone = engine
        .clone_node_filtered(&mut store, root, &[], &filter)
        .unwrap();

    assert_eq!(store.attr(clone, "name").unwrap(), Value::Str("root".into()));
    assert_eq!(store.attr(clone, "secret").unwrap(), Value::Null);
}

#[test]
fn filtered_relations_are_not_followed() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    let pet_ty = store.schema().type_id("Pet").unwrap();
    let rex = store.alloc(pet_ty);
    store
        .set_relation(root, "children", RelationValue::List(vec![child]))
        .unwrap();
    store
        .set_relation(root, "pets", RelationValue::List(vec![rex]))
        .unwrap();

    let engine = CloneEngine::new();
    let filter = |_store: &Store, _node: NodeId, property: &str| property != "pets";
    let clone = engine
        .clone_node_filtered(&mut store, root, &["children|pets"], &filter)
        .unwrap();

    assert!(store.relation(clone, "children").unwrap().is_some());
    assert_eq!(store.relation(clone, "pets").unwrap(), None);
}

#[test]
fn terminator_still_clones_what_it_walks() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    store
        .set_relation(root, "children", RelationValue::List(vec![child]))
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine.clone_node(&mut store, root, &["children$"]).unwrap();

    let Some(RelationValue::List(kids)) = store.relation(clone, "children").unwrap() else {
        panic!("children should be cloned despite the terminator");
    };
    assert_ne!(kids[0], child);
}

#[test]
fn wildcard_clones_every_matching_relation() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    let pet_ty = store.schema().type_id("Pet").unwrap();
    let rex = store.alloc(pet_ty);
    store
        .set_relation(root, "children", RelationValue::List(vec![child]))
        .unwrap();
    store
        .set_relation(root, "pets", RelationValue::List(vec![rex]))
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine.clone_node(&mut store, root, &["*"]).unwrap();

    assert!(store.relation(clone, "children").unwrap().is_some());
    assert!(store.relation(clone, "pets").unwrap().is_some());
}

#[test]
fn collection_shapes_are_preserved() {
    let mut schema = Schema::builder();
    schema
        .ty("Bag")
        .many("ordered")
        .many("unique")
        .many("sorted");
    schema.ty("Item");
    let schema = schema.build();
    let bag_ty = schema.type_id("Bag").unwrap();
    let item_ty = schema.type_id("Item").unwrap();
    let mut store = Store::new(schema);
    let bag = store.alloc(bag_ty);
    let x = store.alloc(item_ty);
    let y = store.alloc(item_ty);
    store
        .set_relation(bag, "ordered", RelationValue::List(vec![y, x]))
        .unwrap();
    store
        .set_relation(bag, "unique", RelationValue::Set(IndexSet::from_iter([x, y])))
        .unwrap();
    store
        .set_relation(
            bag,
            "sorted",
            RelationValue::SortedSet(std::collections::BTreeSet::from_iter([x, y])),
        )
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine
        .clone_node(&mut store, bag, &["ordered|unique|sorted"])
        .unwrap();

    assert!(matches!(
        store.relation(clone, "ordered").unwrap(),
        Some(RelationValue::List(_))
    ));
    assert!(matches!(
        store.relation(clone, "unique").unwrap(),
        Some(RelationValue::Set(_))
    ));
    assert!(matches!(
        store.relation(clone, "sorted").unwrap(),
        Some(RelationValue::SortedSet(_))
    ));
}

#[test]
fn map_relations_clone_keys_and_values() {
    let mut schema = Schema::builder();
    schema.ty("Registry").map("entries").map("sorted");
    schema.ty("Label").attr("text");
    let schema = schema.build();
    let registry_ty = schema.type_id("Registry").unwrap();
    let label_ty = schema.type_id("Label").unwrap();
    let mut store = Store::new(schema);
    let registry = store.alloc(registry_ty);
    let key = store.alloc(label_ty);
    let value = store.alloc(label_ty);
    store.set_attr(key, "text", "k").unwrap();
    store.set_attr(value, "text", "v").unwrap();
    store
        .set_relation(
            registry,
            "entries",
            RelationValue::Map(IndexMap::from_iter([(key, value)])),
        )
        .unwrap();
    store
        .set_relation(
            registry,
            "sorted",
            RelationValue::SortedMap(BTreeMap::from_iter([(key, value)])),
        )
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine
        .clone_node(&mut store, registry, &["entries|sorted"])
        .unwrap();

    let Some(RelationValue::Map(entries)) = store.relation(clone, "entries").unwrap() else {
        panic!("entries should stay a map");
    };
    let (&key_clone, &value_clone) = entries.iter().next().unwrap();
    assert_ne!(key_clone, key);
    assert_ne!(value_clone, value);
    assert_eq!(store.attr(key_clone, "text").unwrap(), Value::Str("k".into()));
    assert_eq!(store.attr(value_clone, "text").unwrap(), Value::Str("v".into()));
    // sorted map shares the same key/value clones and keeps its shape
    let Some(RelationValue::SortedMap(sorted)) = store.relation(clone, "sorted").unwrap() else {
        panic!("sorted should stay a sorted map");
    };
    assert_eq!(sorted.get(&key_clone), Some(&value_clone));
}

#[test]
fn opaque_values_are_aliased_not_cloned() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let blob = store.alloc_opaque();
    store
        .set_relation(root, "partner", RelationValue::One(blob))
        .unwrap();

    let engine = CloneEngine::new();
    let clone = engine.clone_node(&mut store, root, &["partner"]).unwrap();

    assert_eq!(
        store.relation(clone, "partner").unwrap(),
        Some(&RelationValue::One(blob))
    );
}

#[test]
fn non_instantiable_type_fails_the_clone() {
    let mut schema = Schema::builder();
    schema.ty("Singleton").non_instantiable();
    let schema = schema.build();
    let ty = schema.type_id("Singleton").unwrap();
    let mut store = Store::new(schema);
    let node = store.alloc(ty);

    let engine = CloneEngine::new();
    let err = engine.clone_node(&mut store, node, &[]).unwrap_err();
    insta::assert_snapshot!(err, @"type `Singleton` cannot be instantiated");
}

#[test]
fn declared_shape_mismatch_fails_the_clone() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");
    let child = person(&mut store, "child");
    // declared One, stored as a list
    store
        .set_relation(root, "partner", RelationValue::List(vec![child]))
        .unwrap();

    let engine = CloneEngine::new();
    let err = engine.clone_node(&mut store, root, &["partner"]).unwrap_err();
    assert_eq!(
        err,
        EngineError::UnsupportedShape {
            type_name: "Person".into(),
            property: "partner".into(),
        }
    );
}

#[test]
fn pattern_errors_surface_through_the_engine() {
    let mut store = Store::new(family_schema());
    let root = person(&mut store, "root");

    let engine = CloneEngine::new();
    let err = engine.clone_node(&mut store, root, &["(children"]).unwrap_err();
    assert!(matches!(err, EngineError::Pattern(_)));
}

#[test]
fn copy_transfers_shared_attrs_shallowly() {
    let mut schema = Schema::builder();
    schema.ty("Source").attr("name").attr("extra").one("link");
    schema.ty("Target").attr("name");
    let schema = schema.build();
    let source_ty = schema.type_id("Source").unwrap();
    let target_ty = schema.type_id("Target").unwrap();
    let mut store = Store::new(schema);
    let source = store.alloc(source_ty);
    let target = store.alloc(target_ty);
    store.set_attr(source, "name", "copied").unwrap();
    store.set_attr(source, "extra", "dropped").unwrap();

    let engine = CloneEngine::new();
    engine.copy(&mut store, source, target).unwrap();

    assert_eq!(
        store.attr(target, "name").unwrap(),
        Value::Str("copied".into())
    );
    // attrs the target does not declare are skipped, relations untouched
    assert!(store.attr(target, "extra").is_err());
}

#[test]
fn copy_from_an_opaque_source_is_a_no_op() {
    let mut store = Store::new(family_schema());
    let target = person(&mut store, "kept");
    let blob = store.alloc_opaque();

    let engine = CloneEngine::new();
    engine.copy(&mut store, blob, target).unwrap();

    assert_eq!(store.attr(target, "name").unwrap(), Value::Str("kept".into()));
}
