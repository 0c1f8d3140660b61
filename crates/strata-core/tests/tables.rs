mod fixtures;

use fixtures::*;
use pretty_assertions::assert_eq;
use std_util::prelude::*;
use strata_core::schema::app::{EntityDef, PropertyDef};
use strata_core::schema::db::{DefaultSqlTypeMapping, Table, Tables};
use strata_core::stmt::ValueType;

fn names(table: &Table) -> Vec<String> {
    table.columns.iter().map(|c| c.name.reference()).collect()
}

fn refs(ids: &[strata_core::schema::SqlIdentifier]) -> Vec<String> {
    ids.iter().map(|c| c.reference()).collect()
}

#[test]
fn nested_lists_expand_back_references() {
    let ctx = context(three_levels());
    let tables = Tables::from_context(&ctx, ["Root"], &DefaultSqlTypeMapping).unwrap();

    let order: Vec<_> = tables.iter().map(|t| t.name.reference()).collect();
    assert_eq!(order, ["root", "child", "grand_child"]);

    let root = assert_some!(tables.get("root"));
    assert_eq!(names(root), ["id"]);
    assert_eq!(refs(&root.primary_key), ["id"]);
    assert!(root.columns[0].identity);
    assert!(!root.columns[0].nullable);
    assert_empty!(root.foreign_keys);

    let child = assert_some!(tables.get("child"));
    assert_eq!(names(child), ["root", "root_key", "name"]);
    assert_eq!(refs(&child.primary_key), ["root", "root_key"]);
    assert_eq!(child.column("root").unwrap().ty, "BIGINT");
    assert_eq!(child.column("root_key").unwrap().ty, "INT");
    assert!(child.column("name").unwrap().nullable);

    let fk = &child.foreign_keys[0];
    assert_eq!(fk.name, "root_id_fk");
    assert_eq!(refs(&fk.columns), ["root"]);
    assert_eq!(fk.referenced_table.reference(), "root");
    assert_eq!(refs(&fk.referenced_columns), ["id"]);

    let grand = assert_some!(tables.get("grand_child"));
    assert_eq!(names(grand), ["root", "root_key", "child_key", "name"]);
    assert_eq!(refs(&grand.primary_key), ["root", "root_key", "child_key"]);

    let fk = &grand.foreign_keys[0];
    assert_eq!(fk.name, "child_root_root_key_fk");
    assert_eq!(refs(&fk.columns), ["root", "root_key"]);
    assert_eq!(fk.referenced_table.reference(), "child");
    assert_eq!(refs(&fk.referenced_columns), ["root", "root_key"]);
}

#[test]
fn composite_parent_keys_expand_per_column() {
    let ctx = context(vec![
        EntityDef::new("Parent")
            .property(PropertyDef::embedded("id", "ParentKey", "").as_id())
            .property(PropertyDef::list("items", "Item")),
        EntityDef::new("ParentKey")
            .property(PropertyDef::simple("tenant", ValueType::String))
            .property(PropertyDef::simple("number", ValueType::I64)),
        EntityDef::new("Item").property(PropertyDef::simple("label", ValueType::String)),
    ]);

    let tables = Tables::from_context(&ctx, ["Parent"], &DefaultSqlTypeMapping).unwrap();

    let parent = assert_some!(tables.get("parent"));
    assert_eq!(names(parent), ["tenant", "number"]);
    assert_eq!(refs(&parent.primary_key), ["tenant", "number"]);
    assert!(parent.columns.iter().all(|c| c.identity && !c.nullable));

    let item = assert_some!(tables.get("item"));
    assert_eq!(
        names(item),
        ["parent_tenant", "parent_number", "parent_key", "label"]
    );

    let fk = &item.foreign_keys[0];
    assert_eq!(fk.name, "parent_tenant_number_fk");
    assert_eq!(refs(&fk.columns), ["parent_tenant", "parent_number"]);
    assert_eq!(refs(&fk.referenced_columns), ["tenant", "number"]);
}

#[test]
fn set_elements_without_id_have_no_primary_key() {
    let ctx = context(vec![
        EntityDef::new("Post")
            .property(PropertyDef::id("id", ValueType::Uuid))
            .property(PropertyDef::set("tags", "Tag")),
        EntityDef::new("Tag").property(PropertyDef::simple("name", ValueType::String)),
    ]);

    let tables = Tables::from_context(&ctx, ["Post"], &DefaultSqlTypeMapping).unwrap();
    let tag = assert_some!(tables.get("tag"));

    assert_eq!(names(tag), ["post", "name"]);
    assert_eq!(tag.column("post").unwrap().ty, "UUID");
    assert_empty!(tag.primary_key);
    assert_eq!(tag.foreign_keys[0].name, "post_id_fk");
}

#[test]
fn missing_identifier_up_the_chain_fails() {
    let ctx = context(vec![
        EntityDef::new("Root").property(PropertyDef::list("children", "Child")),
        EntityDef::new("Child").property(PropertyDef::simple("name", ValueType::String)),
    ]);

    let err = assert_err!(
        Tables::from_context(&ctx, ["Root"], &DefaultSqlTypeMapping),
        is_invalid_schema
    );
    assert!(err.to_string().contains("no identifier found up the chain"));
}

#[test]
fn tables_reached_twice_are_merged() {
    let ctx = context(dummy_entity());
    let tables = Tables::from_context(&ctx, ["DummyEntity"], &DefaultSqlTypeMapping).unwrap();

    // `Second` is reached as a to-one, a list element, a map value and below
    // `WithId`; every back-reference ends up in the one table
    let second = assert_some!(tables.get("second"));
    assert_eq!(
        names(second),
        ["dummy_entity", "value", "dummy_entity_key", "with_id"]
    );
    assert_unique!(tables.iter().map(|t| t.name.reference()).collect::<Vec<_>>());
}
