//! Per-type definitions, as produced by the derive layer and registered with
//! a [`MappingContext`](super::MappingContext).

mod entity;
pub use entity::EntityDef;

mod property;
pub use property::{CollectionKind, OnEmpty, PropertyDef, PropertyKind};
