use std::cmp::Ordering;

use avrolite::prelude::*;
use avrolite::{Error, Schema, TypeTag, Value, ValueCursor};
use proptest::prelude::*;
use serde_json::json;

fn inventory_schema() -> Schema {
    Schema::parse_str(
        r#"{"type": "record", "name": "Inventory", "fields": [
            {"name": "site", "type": "string"},
            {"name": "stock", "type": {"type": "map", "values": "long"}},
            {"name": "history", "type": {"type": "array", "items": "int"}},
            {"name": "note", "type": ["null", "string", "long"]}
        ]}"#,
    )
    .unwrap()
}

fn counts_schema() -> Schema {
    Schema::parse_str(r#"{"type": "map", "values": "int"}"#).unwrap()
}

#[test]
fn test_iterate_map_entries_in_insertion_order() {
    let v = Value::from_literal(&counts_schema(), &json!({"b": 2, "a": 1, "c": 3})).unwrap();
    let seen: Vec<(usize, String, i32)> = v
        .iter()
        .unwrap()
        .map(|e| (e.position, e.key.unwrap().to_string(), e.value.get_int().unwrap()))
        .collect();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].0, 1);
    assert_eq!(seen[2].0, 3);
    let mut keys: Vec<&str> = seen.iter().map(|(_, k, _)| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["a", "b", "c"]);
    assert_eq!(v.iter().unwrap().len(), 3);
}

#[test]
fn test_cursor_sees_growth() {
    let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#).unwrap();
    let mut v = Value::from_literal(&schema, &json!([1])).unwrap();
    let mut cursor = ValueCursor::new(&v).unwrap();
    let mut visited = Vec::new();
    while let Some(entry) = cursor.next_mut(&mut v).unwrap() {
        let mut value = entry.value;
        let n = value.get_int().unwrap();
        visited.push(n);
        value.set_int(n * 10).unwrap();
        if n < 3 {
            v.append().unwrap().set_int(n + 1).unwrap();
        }
    }
    assert_eq!(visited, vec![1, 2, 3]);
    assert_eq!(v.to_json(), json!([10, 20, 30]));
    assert_eq!(cursor.position(), 4);
}

#[test]
fn test_positions_are_one_based() {
    let v = Value::from_literal(&inventory_schema(), &json!({
        "site": "north",
        "stock": {},
        "history": [4, 5],
        "note": null
    }))
    .unwrap();
    let (site, name) = v.get_by_index(1).unwrap();
    assert_eq!(site.get_string().unwrap(), "north");
    // records report no key, only maps do
    assert_eq!(name, None);
    assert_eq!(v.get_by_name("note").unwrap().1, 4);

    let (history, _) = v.get_by_name("history").unwrap();
    assert_eq!(history.get_by_index(2).unwrap().0.get_int().unwrap(), 5);
    assert!(matches!(
        history.get_by_index(0),
        Err(Error::IndexOutOfBounds { position: 0, size: 2 })
    ));
    assert!(matches!(
        history.get_by_index(3),
        Err(Error::IndexOutOfBounds { position: 3, size: 2 })
    ));
    assert!(matches!(v.get_by_index(5), Err(Error::IndexOutOfBounds { .. })));
    assert!(matches!(v.get_by_name("missing"), Err(Error::NoSuchField(_))));
}

#[test]
fn test_map_add_existing_key_resets_entry() {
    let mut v = Value::from_literal(&counts_schema(), &json!({"x": 5, "y": 6})).unwrap();
    let slot = v.add("x").unwrap();
    assert_eq!(slot.view().get_int().unwrap(), 0);
    assert_eq!(v.size().unwrap(), 2);
    v.add("x").unwrap().set_int(9).unwrap();
    assert_eq!(v.get_by_name("x").unwrap().0.get_int().unwrap(), 9);
    assert_eq!(v.get_by_name("y").unwrap().0.get_int().unwrap(), 6);
}

#[test]
fn test_reset_returns_to_empty() {
    let schema = inventory_schema();
    let mut v = Value::from_literal(&schema, &json!({
        "site": "s",
        "stock": {"bolts": 10},
        "history": [1, 2, 3],
        "note": {"long": 4}
    }))
    .unwrap();
    v.reset();
    assert_eq!(v, Value::new(&schema));
    v.reset();
    assert_eq!(v, Value::new(&schema));
    let (note, _) = v.get_by_name("note").unwrap();
    assert_eq!(note.discriminant().unwrap(), None);
    assert!(matches!(note.current_branch(), Err(Error::EmptyUnion)));
}

#[test]
fn test_union_branch_selection() {
    let mut v = Value::new(&inventory_schema());
    let (mut note, _) = v.get_by_name_mut("note").unwrap();
    note.set_branch("long").unwrap().set_long(8).unwrap();
    assert_eq!(note.discriminant().unwrap(), Some(2));
    assert_eq!(note.current_branch().unwrap().type_tag(), TypeTag::Long);

    // switching branches starts from an empty branch value
    note.set_discriminant(1).unwrap();
    assert_eq!(note.current_branch().unwrap().get_string().unwrap(), "");
    assert!(matches!(note.set_branch("double"), Err(Error::NoSuchBranch(_))));
    assert!(matches!(note.set_discriminant(3), Err(Error::NoSuchBranch(_))));
}

#[test]
fn test_copy_between_equal_schemas() {
    let source = Value::from_literal(&counts_schema(), &json!({"k": 1})).unwrap();
    // parsed separately, so the arenas differ
    let mut dest = Value::new(&counts_schema());
    dest.copy_from(&source).unwrap();
    assert_eq!(dest, source);

    let mut other = Value::new(&Schema::parse_str(r#"{"type": "map", "values": "long"}"#).unwrap());
    assert!(matches!(other.copy_from(&source), Err(Error::SchemaMismatch(_))));
}

#[test]
fn test_scalar_setters_check_types() {
    let mut v = Value::new(&Schema::int());
    assert!(matches!(v.set_long(1), Err(Error::TypeMismatch { .. })));
    assert!(matches!(v.get_string(), Err(Error::TypeMismatch { .. })));
    let fixed = Schema::parse_str(r#"{"type": "fixed", "name": "F", "size": 2}"#).unwrap();
    let mut f = Value::new(&fixed);
    assert!(matches!(f.set_fixed(&[1, 2, 3]), Err(Error::OutOfRange(_))));
    f.set_fixed(&[1, 2]).unwrap();
    assert_eq!(f.get_fixed().unwrap(), &[1, 2]);
}

#[test]
fn test_ordering() {
    let schema = Schema::parse_str(r#"{"type": "array", "items": "int"}"#).unwrap();
    let a = Value::from_literal(&schema, &json!([1, 2])).unwrap();
    let b = Value::from_literal(&schema, &json!([1, 3])).unwrap();
    let c = Value::from_literal(&schema, &json!([1, 2])).unwrap();
    assert_eq!(a.compare(&b), Ordering::Less);
    assert_eq!(b.compare(&a), Ordering::Greater);
    assert_eq!(a.compare(&c), Ordering::Equal);
    assert!(a.equal(&c));
    assert_eq!(a.hash(), c.hash());

    let x = Value::from_literal(&Schema::double(), &json!(0.0)).unwrap();
    let y = Value::from_literal(&Schema::double(), &json!(-0.0)).unwrap();
    assert!(x.equal(&y));
    assert_eq!(x.hash(), y.hash());
}

#[test]
fn test_literal_round_trip() {
    let literal = json!({
        "site": "depot",
        "stock": {"nuts": 3, "bolts": -2},
        "history": [7, 8, 9],
        "note": {"string": "check"}
    });
    let v = Value::from_literal(&inventory_schema(), &literal).unwrap();
    assert_eq!(v.to_json(), literal);

    let mut w = Value::new(&inventory_schema());
    w.populate(&v.to_json()).unwrap();
    assert_eq!(w, v);

    assert!(matches!(
        Value::from_literal(&inventory_schema(), &json!({"nope": 1})),
        Err(Error::NoSuchField(_))
    ));
    assert!(matches!(
        Value::from_literal(&inventory_schema(), &json!({"note": {"string": "a", "long": 1}})),
        Err(Error::MalformedLiteral(_))
    ));
}

proptest! {
    #[test]
    fn prop_equal_maps_hash_equal(entries in prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..16)) {
        let schema = counts_schema();
        let mut forward = Value::new(&schema);
        let mut backward = Value::new(&schema);
        for (k, n) in entries.iter() {
            forward.add(k).unwrap().set_int(*n).unwrap();
        }
        for (k, n) in entries.iter().rev() {
            backward.add(k).unwrap().set_int(*n).unwrap();
        }
        prop_assert!(forward.equal(&backward));
        prop_assert_eq!(forward.compare(&backward), Ordering::Equal);
        prop_assert_eq!(forward.hash(), backward.hash());
    }

    #[test]
    fn prop_compare_is_antisymmetric(a in prop::collection::vec(any::<i64>(), 0..6), b in prop::collection::vec(any::<i64>(), 0..6)) {
        let schema = Schema::parse_str(r#"{"type": "array", "items": "long"}"#).unwrap();
        let va = Value::from_literal(&schema, &json!(a)).unwrap();
        let vb = Value::from_literal(&schema, &json!(b)).unwrap();
        prop_assert_eq!(va.compare(&vb), vb.compare(&va).reverse());
        prop_assert_eq!(va.equal(&vb), a == b);
    }
}
