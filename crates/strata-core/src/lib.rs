mod error;
pub use error::{Error, IntoError};

pub mod schema;
pub use schema::MappingContext;

pub mod stmt;

/// A Result type alias that uses Strata's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
