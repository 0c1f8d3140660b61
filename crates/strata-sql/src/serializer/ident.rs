use super::{Formatter, ToSql};

use strata_core::schema::SqlIdentifier;

/// An identifier rendered with the dialect's quoting and letter casing.
pub(super) struct Ident<'a>(pub(super) &'a SqlIdentifier);

impl ToSql for Ident<'_> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let rendered = self
            .0
            .to_sql(f.serializer.dialect.identifier_processing());
        f.dst.push_str(&rendered);
    }
}

impl ToSql for &SqlIdentifier {
    fn to_sql(self, f: &mut Formatter<'_>) {
        fmt!(f, Ident(self));
    }
}
