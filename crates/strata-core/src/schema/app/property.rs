use crate::stmt::ValueType;

#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,

    /// The property is the identifier of its entity
    pub id: bool,

    /// The property carries the optimistic locking version
    pub version: bool,

    /// Never written by inserts or updates
    pub read_only: bool,

    /// Written by inserts, never by updates
    pub insert_only: bool,

    pub nullable: bool,

    /// Explicit column name
    pub column: Option<String>,

    /// Explicit name of the back-reference column in the target table
    pub reverse_column: Option<String>,

    /// Explicit name of the list index / map key column
    pub key_column: Option<String>,

    /// Sequence that generates identifier values
    pub sequence: Option<String>,
}

/// The closed set of property shapes the mapping layer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// A single column
    Simple(ValueType),

    /// Value object whose properties are flattened into the owner's table
    Embedded {
        target: String,
        prefix: String,
        on_empty: OnEmpty,
    },

    /// To-one reference to an entity stored in its own table
    Entity { target: String },

    /// To-many reference
    Collection {
        target: String,
        kind: CollectionKind,
    },

    /// Keyed to-many reference
    Map { key: ValueType, target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Set,
}

/// What an embedded property reads as when all of its columns are `NULL`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OnEmpty {
    #[default]
    UseNull,
    UseEmpty,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            id: false,
            version: false,
            read_only: false,
            insert_only: false,
            nullable: true,
            column: None,
            reverse_column: None,
            key_column: None,
            sequence: None,
        }
    }

    pub fn simple(name: impl Into<String>, ty: ValueType) -> Self {
        Self::new(name, PropertyKind::Simple(ty))
    }

    /// A simple identifier property.
    pub fn id(name: impl Into<String>, ty: ValueType) -> Self {
        let mut def = Self::simple(name, ty);
        def.id = true;
        def.nullable = false;
        def
    }

    pub fn version(name: impl Into<String>, ty: ValueType) -> Self {
        let mut def = Self::simple(name, ty);
        def.version = true;
        def
    }

    pub fn embedded(
        name: impl Into<String>,
        target: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            PropertyKind::Embedded {
                target: target.into(),
                prefix: prefix.into(),
                on_empty: OnEmpty::UseNull,
            },
        )
    }

    pub fn entity(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            PropertyKind::Entity {
                target: target.into(),
            },
        )
    }

    pub fn list(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            PropertyKind::Collection {
                target: target.into(),
                kind: CollectionKind::List,
            },
        )
    }

    pub fn set(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            PropertyKind::Collection {
                target: target.into(),
                kind: CollectionKind::Set,
            },
        )
    }

    pub fn map(name: impl Into<String>, key: ValueType, target: impl Into<String>) -> Self {
        Self::new(
            name,
            PropertyKind::Map {
                key,
                target: target.into(),
            },
        )
    }

    /// Marks the property as the identifier. Combined with an embedded kind
    /// this declares a composite key.
    pub fn as_id(mut self) -> Self {
        self.id = true;
        self.nullable = false;
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn reverse_column(mut self, column: impl Into<String>) -> Self {
        self.reverse_column = Some(column.into());
        self
    }

    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn insert_only(mut self) -> Self {
        self.insert_only = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn on_empty(mut self, on_empty: OnEmpty) -> Self {
        if let PropertyKind::Embedded { on_empty: slot, .. } = &mut self.kind {
            *slot = on_empty;
        }
        self
    }

    /// The entity this property points at, if any.
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Simple(_) => None,
            PropertyKind::Embedded { target, .. }
            | PropertyKind::Entity { target }
            | PropertyKind::Collection { target, .. }
            | PropertyKind::Map { target, .. } => Some(target),
        }
    }
}
