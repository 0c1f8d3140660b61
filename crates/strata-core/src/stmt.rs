mod identifier;
pub use identifier::{Identifier, IdentifierPart};

mod object;
pub use object::{Object, Record};

mod row;
pub use row::RowDocument;

mod ty;
pub use ty::ValueType;

mod value;
pub use value::Value;
