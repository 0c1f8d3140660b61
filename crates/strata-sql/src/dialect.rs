use strata_core::schema::{IdentifierProcessing, LetterCasing, Quoting, SqlIdentifier};
use strata_core::{Error, Result};

/// The SQL differences between supported databases.
///
/// A dialect is a plain value; statements are rendered once into an
/// [`Sql`](crate::Sql) template and only the leaves (identifiers, bind
/// markers, paging, locking) depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    flavor: Flavor,
    identifiers: IdentifierProcessing,
    bind_markers: BindMarkers,
    escaper: Escaper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Postgresql,
    Mysql,
    Sqlite,
    H2,
}

/// How bound parameters appear in the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMarkers {
    /// `:name`
    Named,

    /// `$1`, `$2`, ...
    Dollar,

    /// `?`
    Anonymous,

    /// `?1`, `?2`, ...
    Numbered,
}

/// Requested row lock for a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Read,
    Write,
}

/// Escapes LIKE wildcards in user supplied values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escaper {
    escape: char,

    /// Whether the database needs an explicit `ESCAPE` clause to honor the
    /// escape character
    explicit: bool,
}

impl Dialect {
    pub const fn postgres() -> Dialect {
        Dialect {
            flavor: Flavor::Postgresql,
            identifiers: IdentifierProcessing::new(Quoting::ANSI, LetterCasing::LowerCase),
            bind_markers: BindMarkers::Dollar,
            escaper: Escaper::DEFAULT,
        }
    }

    pub const fn mysql() -> Dialect {
        Dialect {
            flavor: Flavor::Mysql,
            identifiers: IdentifierProcessing::new(Quoting::BACKTICK, LetterCasing::LowerCase),
            bind_markers: BindMarkers::Anonymous,
            escaper: Escaper::DEFAULT,
        }
    }

    pub const fn sqlite() -> Dialect {
        Dialect {
            flavor: Flavor::Sqlite,
            identifiers: IdentifierProcessing::new(Quoting::ANSI, LetterCasing::AsIs),
            bind_markers: BindMarkers::Numbered,
            escaper: Escaper {
                escape: '\\',
                explicit: true,
            },
        }
    }

    pub const fn h2() -> Dialect {
        Dialect {
            flavor: Flavor::H2,
            identifiers: IdentifierProcessing::ANSI,
            bind_markers: BindMarkers::Anonymous,
            escaper: Escaper::DEFAULT,
        }
    }

    /// Returns a copy of this dialect using `markers` for bind parameters.
    pub const fn with_bind_markers(mut self, markers: BindMarkers) -> Dialect {
        self.bind_markers = markers;
        self
    }

    pub fn identifier_processing(&self) -> &IdentifierProcessing {
        &self.identifiers
    }

    pub fn bind_markers(&self) -> BindMarkers {
        self.bind_markers
    }

    pub fn escaper(&self) -> &Escaper {
        &self.escaper
    }

    pub fn is_mysql(&self) -> bool {
        self.flavor == Flavor::Mysql
    }

    pub fn is_sqlite(&self) -> bool {
        self.flavor == Flavor::Sqlite
    }

    /// Whether `NULLS FIRST` / `NULLS LAST` may follow an ORDER BY item.
    pub fn supports_null_ordering(&self) -> bool {
        !self.is_mysql()
    }

    /// The clause placed after ORDER BY to page through results, or `None`
    /// when neither a limit nor an offset is requested.
    pub fn limit_clause(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (self.flavor, limit, offset) {
            (_, None, None) => None,
            (Flavor::Mysql, Some(limit), None) => Some(format!("LIMIT {limit}")),
            (Flavor::Mysql, limit, Some(offset)) => {
                Some(format!("LIMIT {offset}, {}", limit.unwrap_or(u64::MAX)))
            }
            (Flavor::Sqlite, None, Some(offset)) => Some(format!("LIMIT -1 OFFSET {offset}")),
            (_, Some(limit), None) => Some(format!("LIMIT {limit}")),
            (_, None, Some(offset)) => Some(format!("OFFSET {offset}")),
            (_, Some(limit), Some(offset)) => Some(format!("LIMIT {limit} OFFSET {offset}")),
        }
    }

    /// The row locking clause, `None` if the database has no such clause.
    pub fn lock_clause(&self, mode: LockMode) -> Option<&'static str> {
        match (self.flavor, mode) {
            (Flavor::Sqlite, _) => None,
            (_, LockMode::Write) => Some("FOR UPDATE"),
            (Flavor::Mysql, LockMode::Read) => Some("LOCK IN SHARE MODE"),
            (Flavor::H2, LockMode::Read) => Some("FOR UPDATE"),
            (Flavor::Postgresql, LockMode::Read) => Some("FOR SHARE"),
        }
    }

    /// What follows `INSERT INTO table` when no column is inserted.
    pub fn empty_insert(&self) -> &'static str {
        match self.flavor {
            Flavor::Mysql => "VALUES ()",
            _ => "DEFAULT VALUES",
        }
    }

    /// A query returning the next value of `sequence`.
    pub fn sequence_query(&self, sequence: &SqlIdentifier) -> Result<String> {
        let name = sequence.to_sql(&self.identifiers);
        match self.flavor {
            Flavor::Postgresql => Ok(format!("SELECT nextval('{}')", name.replace('\'', "''"))),
            Flavor::H2 => Ok(format!("SELECT NEXT VALUE FOR {name}")),
            Flavor::Mysql | Flavor::Sqlite => Err(Error::unsupported_feature(format!(
                "{:?} does not support sequences",
                self.flavor
            ))),
        }
    }
}

impl Escaper {
    /// Backslash escaping, honored without an `ESCAPE` clause.
    pub const DEFAULT: Escaper = Escaper {
        escape: '\\',
        explicit: false,
    };

    pub fn escape_character(&self) -> char {
        self.escape
    }

    /// `Some(c)` when LIKE must be followed by `ESCAPE 'c'`.
    pub fn escape_clause(&self) -> Option<char> {
        self.explicit.then_some(self.escape)
    }

    /// Prefixes `%`, `_` and the escape character itself with the escape
    /// character.
    pub fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            if c == '%' || c == '_' || c == self.escape {
                out.push(self.escape);
            }
            out.push(c);
        }
        out
    }
}
