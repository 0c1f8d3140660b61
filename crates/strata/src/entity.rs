use strata_core::schema::app::EntityDef;
use strata_core::schema::mapping::Builder;
use strata_core::stmt::Record;
use strata_core::Result;

/// A user type mapped to an aggregate root.
///
/// The template works on [`Record`]s; this trait converts between them and
/// the user's struct.
pub trait Entity: Sized {
    /// Name the entity is registered under in the mapping context
    const NAME: &'static str;

    /// The definition of this entity followed by those of every entity and
    /// embeddable it references.
    fn definition() -> Vec<EntityDef>;

    /// Load an instance from a record read by the template.
    fn load(record: Record) -> Result<Self>;

    fn store(&self) -> Record;

    fn register(builder: &mut Builder) -> &mut Builder {
        for def in Self::definition() {
            builder.register(def);
        }
        builder
    }
}
