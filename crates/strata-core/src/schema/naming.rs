use heck::ToSnakeCase;
use std::fmt;

/// Derives default table and column names.
///
/// Every method has a default. Explicit names on an entity or property
/// definition always win over the strategy.
pub trait NamingStrategy: fmt::Debug + Send + Sync + 'static {
    /// Schema for tables that don't name one.
    fn schema(&self) -> Option<String> {
        None
    }

    fn table_name(&self, entity_name: &str) -> String {
        entity_name.to_snake_case()
    }

    fn column_name(&self, property_name: &str) -> String {
        property_name.to_snake_case()
    }

    /// Column in a child table pointing back at the owning table.
    fn reverse_column_name(&self, owner_table: &str) -> String {
        owner_table.to_string()
    }

    /// Column holding a list index or map key, derived from the
    /// back-reference column of the same relation.
    fn key_column(&self, reverse_column: &str) -> String {
        format!("{reverse_column}_key")
    }
}

/// Snake-cases entity and property names.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNamingStrategy;

impl NamingStrategy for DefaultNamingStrategy {}

/// Which owner name feeds the default back-reference column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyNaming {
    /// Use the owner's table name, including an explicit override.
    #[default]
    ApplyRenaming,

    /// Use the name the naming strategy derives for the owner, ignoring any
    /// explicit table name.
    IgnoreRenaming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_are_snake_case() {
        let naming = DefaultNamingStrategy;
        assert_eq!(naming.table_name("DummyEntity"), "dummy_entity");
        assert_eq!(naming.column_name("entityId"), "entity_id");
        assert_eq!(naming.column_name("entity_id"), "entity_id");
        assert_eq!(naming.reverse_column_name("dummy_entity"), "dummy_entity");
        assert_eq!(naming.key_column("dummy_entity"), "dummy_entity_key");
    }
}
