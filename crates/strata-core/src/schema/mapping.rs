//! Resolved metadata: entities and properties with their table and column
//! names, owned and cached by a [`MappingContext`].

mod context;
pub use context::{Builder, MappingContext};
pub(crate) use context::ContextInner;

mod entity;
pub use entity::PersistentEntity;

mod property;
pub use property::PersistentProperty;

mod settings;
pub use settings::Settings;
