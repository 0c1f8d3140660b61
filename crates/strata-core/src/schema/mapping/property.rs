use super::Settings;
use crate::schema::app::{CollectionKind, OnEmpty, PropertyDef, PropertyKind};
use crate::schema::SqlIdentifier;
use crate::stmt::ValueType;

/// A property of a [`PersistentEntity`](super::PersistentEntity) with its
/// column name resolved.
#[derive(Debug)]
pub struct PersistentProperty {
    name: String,

    /// Name of the declaring entity
    owner: String,

    kind: PropertyKind,

    column: SqlIdentifier,

    id: bool,
    version: bool,
    read_only: bool,
    insert_only: bool,
    nullable: bool,

    reverse_column: Option<SqlIdentifier>,
    key_column: Option<SqlIdentifier>,
    sequence: Option<SqlIdentifier>,
}

impl PersistentProperty {
    pub(crate) fn new(owner: &str, def: &PropertyDef, settings: &Settings) -> Self {
        let column = match &def.column {
            Some(column) => settings.explicit(column),
            None => settings.derived(settings.naming.column_name(&def.name)),
        };

        Self {
            name: def.name.clone(),
            owner: owner.to_string(),
            kind: def.kind.clone(),
            column,
            id: def.id,
            version: def.version,
            read_only: def.read_only,
            insert_only: def.insert_only,
            nullable: def.nullable && !def.id,
            reverse_column: def.reverse_column.as_deref().map(|n| settings.explicit(n)),
            key_column: def.key_column.as_deref().map(|n| settings.explicit(n)),
            sequence: def.sequence.as_deref().map(|n| settings.explicit(n)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Column name, before any embedded prefix is applied.
    pub fn column_name(&self) -> &SqlIdentifier {
        &self.column
    }

    /// The column type of a simple property.
    pub fn value_type(&self) -> Option<&ValueType> {
        match &self.kind {
            PropertyKind::Simple(ty) => Some(ty),
            _ => None,
        }
    }

    /// Name of the entity this property references.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Simple(_) => None,
            PropertyKind::Embedded { target, .. }
            | PropertyKind::Entity { target }
            | PropertyKind::Collection { target, .. }
            | PropertyKind::Map { target, .. } => Some(target),
        }
    }

    /// The property holds one or more entities or an embedded value.
    pub fn is_entity(&self) -> bool {
        !matches!(self.kind, PropertyKind::Simple(_))
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, PropertyKind::Embedded { .. })
    }

    pub fn is_collection_like(&self) -> bool {
        matches!(self.kind, PropertyKind::Collection { .. })
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, PropertyKind::Map { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::Collection {
                kind: CollectionKind::List,
                ..
            }
        )
    }

    /// Lists and maps need a column holding the index or key.
    pub fn is_qualified(&self) -> bool {
        self.is_list() || self.is_map()
    }

    pub fn is_id(&self) -> bool {
        self.id
    }

    pub fn is_version(&self) -> bool {
        self.version
    }

    pub fn is_writable(&self) -> bool {
        !self.read_only
    }

    pub fn is_insert_only(&self) -> bool {
        self.insert_only
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Type of the index or key column of a qualified property.
    pub fn qualifier_type(&self) -> Option<ValueType> {
        match &self.kind {
            PropertyKind::Collection {
                kind: CollectionKind::List,
                ..
            } => Some(ValueType::I32),
            PropertyKind::Map { key, .. } => Some(key.clone()),
            _ => None,
        }
    }

    /// Prefix prepended to the columns of an embedded value.
    pub fn embedded_prefix(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Embedded { prefix, .. } => Some(prefix),
            _ => None,
        }
    }

    pub fn on_empty(&self) -> OnEmpty {
        match &self.kind {
            PropertyKind::Embedded { on_empty, .. } => *on_empty,
            _ => OnEmpty::UseNull,
        }
    }

    /// Explicit back-reference column, if one was declared.
    pub fn reverse_column_override(&self) -> Option<&SqlIdentifier> {
        self.reverse_column.as_ref()
    }

    /// Explicit key column, if one was declared.
    pub fn key_column_override(&self) -> Option<&SqlIdentifier> {
        self.key_column.as_ref()
    }

    pub fn sequence(&self) -> Option<&SqlIdentifier> {
        self.sequence.as_ref()
    }
}
