#![allow(dead_code)]

use strata_core::schema::app::{EntityDef, PropertyDef};
use strata_core::schema::MappingContext;
use strata_core::stmt::ValueType;

/// An aggregate exercising every kind of relation:
///
/// ```text
/// DummyEntity (id)
/// ├── second: Second            to-one, no id
/// │   └── third: Third
/// ├── second_list: [Second]     list, no id
/// │   ├── third: Third
/// │   └── third2: Third         embedded
/// ├── with_id: WithId           to-one with id
/// │   └── second: Second
/// ├── by_key: {String: Second}  map
/// └── embedded: EmbeddedThing   embedded, prefix `prnt_`
///     └── child: EmbeddedChild  embedded, prefix `chld_`
/// ```
pub fn dummy_entity() -> Vec<EntityDef> {
    vec![
        EntityDef::new("DummyEntity")
            .property(PropertyDef::id("entity_id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::entity("second", "Second"))
            .property(PropertyDef::list("second_list", "Second"))
            .property(PropertyDef::entity("with_id", "WithId"))
            .property(PropertyDef::map("by_key", ValueType::String, "Second"))
            .property(PropertyDef::embedded("embedded", "EmbeddedThing", "prnt_")),
        EntityDef::new("Second")
            .property(PropertyDef::entity("third", "Third"))
            .property(PropertyDef::embedded("third2", "Third", "")),
        EntityDef::new("Third").property(PropertyDef::simple("value", ValueType::String)),
        EntityDef::new("WithId")
            .property(PropertyDef::id("with_id_id", ValueType::I64))
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::entity("second", "Second")),
        EntityDef::new("EmbeddedThing")
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::embedded("child", "EmbeddedChild", "chld_")),
        EntityDef::new("EmbeddedChild").property(PropertyDef::simple("name", ValueType::String)),
    ]
}

/// Root → list of children → list of grandchildren, none of the nested
/// levels having ids.
pub fn three_levels() -> Vec<EntityDef> {
    vec![
        EntityDef::new("Root")
            .property(PropertyDef::id("id", ValueType::I64))
            .property(PropertyDef::list("children", "Child")),
        EntityDef::new("Child")
            .property(PropertyDef::simple("name", ValueType::String))
            .property(PropertyDef::list("grand_children", "GrandChild")),
        EntityDef::new("GrandChild").property(PropertyDef::simple("name", ValueType::String)),
    ]
}

pub fn context(defs: Vec<EntityDef>) -> MappingContext {
    let mut builder = MappingContext::builder();
    for def in defs {
        builder.register(def);
    }
    builder.build().unwrap()
}
