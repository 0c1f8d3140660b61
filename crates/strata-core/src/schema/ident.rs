use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// A possibly qualified SQL name (table, column, schema, alias).
///
/// Each part remembers how it was produced. Quoted parts are rendered
/// verbatim inside quotes and never re-cased. Derived parts come from a
/// naming strategy: the dialect's letter casing is applied at render time and
/// they are quoted only if the mapping context forces quoting. Equality only
/// looks at the resolved name and whether it ends up quoted, so
/// `unquoted("X") == derived("X", false)`.
#[derive(Clone)]
pub struct SqlIdentifier {
    parts: Vec<Part>,
}

#[derive(Debug, Clone)]
enum Part {
    Quoted(String),
    Unquoted(String),
    Derived { name: String, quoted: bool },
}

/// How a dialect renders identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierProcessing {
    pub quoting: Quoting,
    pub letter_casing: LetterCasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoting {
    prefix: &'static str,
    suffix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterCasing {
    UpperCase,
    LowerCase,
    #[default]
    AsIs,
}

impl SqlIdentifier {
    /// A case-sensitive identifier that is always quoted.
    pub fn quoted(name: impl Into<String>) -> Self {
        Self::single(Part::Quoted(name.into()))
    }

    /// An identifier rendered exactly as given.
    pub fn unquoted(name: impl Into<String>) -> Self {
        Self::single(Part::Unquoted(name.into()))
    }

    /// An identifier produced by a naming strategy. Letter casing is applied
    /// when rendering; `quoted` decides whether it is then quoted.
    pub fn derived(name: impl Into<String>, quoted: bool) -> Self {
        Self::single(Part::Derived {
            name: name.into(),
            quoted,
        })
    }

    /// Joins identifiers into one qualified name, e.g. `schema.table` from
    /// `schema` and `[table]`.
    pub fn composite(first: SqlIdentifier, rest: impl IntoIterator<Item = SqlIdentifier>) -> Self {
        let mut parts = first.parts;
        parts.extend(rest.into_iter().flat_map(|id| id.parts));
        Self { parts }
    }

    fn single(part: Part) -> Self {
        Self { parts: vec![part] }
    }

    pub fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }

    /// The individual parts, each as a single-part identifier.
    pub fn parts(&self) -> impl Iterator<Item = SqlIdentifier> + '_ {
        self.parts.iter().cloned().map(Self::single)
    }

    /// The last part: the table of `schema.table`.
    pub fn last(&self) -> SqlIdentifier {
        // Constructors guarantee at least one part
        Self::single(self.parts[self.parts.len() - 1].clone())
    }

    /// The logical, unquoted name used for lookups. Qualified names are
    /// joined with `.`.
    pub fn reference(&self) -> String {
        let mut names = self.parts.iter().map(Part::name);
        let mut out = names.next().unwrap_or_default().to_string();
        for name in names {
            out.push('.');
            out.push_str(name);
        }
        out
    }

    /// Renders the identifier for a dialect.
    pub fn to_sql(&self, processing: &IdentifierProcessing) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            part.render(processing, &mut out);
        }
        out
    }

    /// Returns a new identifier with `f` applied to the name of the last part.
    /// The kind of the part is preserved.
    pub fn transform(&self, f: impl FnOnce(&str) -> String) -> Self {
        let mut parts = self.parts.clone();
        let last = parts.len() - 1;
        parts[last] = match &parts[last] {
            Part::Quoted(name) => Part::Quoted(f(name)),
            Part::Unquoted(name) => Part::Unquoted(f(name)),
            Part::Derived { name, quoted } => Part::Derived {
                name: f(name),
                quoted: *quoted,
            },
        };
        Self { parts }
    }
}

impl Part {
    fn name(&self) -> &str {
        match self {
            Part::Quoted(name) | Part::Unquoted(name) | Part::Derived { name, .. } => name,
        }
    }

    fn is_quoted(&self) -> bool {
        match self {
            Part::Quoted(_) => true,
            Part::Unquoted(_) => false,
            Part::Derived { quoted, .. } => *quoted,
        }
    }

    fn render(&self, processing: &IdentifierProcessing, dst: &mut String) {
        match self {
            Part::Quoted(name) => processing.quoting.apply(name, dst),
            Part::Unquoted(name) => dst.push_str(name),
            Part::Derived { name, quoted } => {
                let name = processing.letter_casing.apply(name);
                if *quoted {
                    processing.quoting.apply(&name, dst);
                } else {
                    dst.push_str(&name);
                }
            }
        }
    }
}

impl PartialEq for SqlIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.name() == b.name() && a.is_quoted() == b.is_quoted())
    }
}

impl Eq for SqlIdentifier {}

impl Hash for SqlIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for part in &self.parts {
            part.name().hash(state);
            part.is_quoted().hash(state);
        }
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference())
    }
}

impl fmt::Debug for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SqlIdentifier({})", self.to_sql(&IdentifierProcessing::ANSI))
    }
}

impl IdentifierProcessing {
    /// Double-quoted, upper-case folding.
    pub const ANSI: Self = Self::new(Quoting::ANSI, LetterCasing::UpperCase);

    /// No quoting, no case changes.
    pub const NONE: Self = Self::new(Quoting::NONE, LetterCasing::AsIs);

    pub const fn new(quoting: Quoting, letter_casing: LetterCasing) -> Self {
        Self {
            quoting,
            letter_casing,
        }
    }
}

impl Quoting {
    pub const ANSI: Self = Self::new("\"", "\"");
    pub const BACKTICK: Self = Self::new("`", "`");
    pub const NONE: Self = Self::new("", "");

    pub const fn new(prefix: &'static str, suffix: &'static str) -> Self {
        Self { prefix, suffix }
    }

    fn apply(&self, name: &str, dst: &mut String) {
        dst.push_str(self.prefix);
        dst.push_str(name);
        dst.push_str(self.suffix);
    }
}

impl LetterCasing {
    pub fn apply(&self, name: &str) -> String {
        match self {
            LetterCasing::UpperCase => name.to_uppercase(),
            LetterCasing::LowerCase => name.to_lowercase(),
            LetterCasing::AsIs => name.to_string(),
        }
    }
}
