use crate::schema::{ForeignKeyNaming, NamingStrategy, SqlIdentifier};
use crate::{Error, Result};

use std::{collections::HashMap, sync::Arc};

/// Mapping-wide naming configuration, fixed when the context is built.
#[derive(Debug, Clone)]
pub struct Settings {
    pub naming: Arc<dyn NamingStrategy>,

    /// Quote derived identifiers when rendering
    pub force_quote: bool,

    pub foreign_key_naming: ForeignKeyNaming,

    pub default_schema: Option<String>,

    /// Variables for `${key}` placeholders in explicit names
    pub expressions: HashMap<String, String>,
}

impl Settings {
    /// Identifier for a name spelled out by the user.
    pub fn explicit(&self, name: &str) -> SqlIdentifier {
        if self.force_quote {
            SqlIdentifier::quoted(name)
        } else {
            SqlIdentifier::unquoted(name)
        }
    }

    /// Identifier for a name produced by the naming strategy.
    pub fn derived(&self, name: impl Into<String>) -> SqlIdentifier {
        SqlIdentifier::derived(name, self.force_quote)
    }

    /// Substitutes `${key}` placeholders in `template`.
    pub fn resolve(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let tail = &rest[start + 2..];
            let Some(end) = tail.find('}') else {
                return Err(Error::invalid_schema(format!(
                    "unterminated expression in `{template}`"
                )));
            };
            let key = tail[..end].trim();
            let Some(value) = self.expressions.get(key) else {
                return Err(Error::invalid_schema(format!(
                    "unknown expression variable `{key}` in `{template}`"
                )));
            };
            out.push_str(value);
            rest = &tail[end + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naming: Arc::new(crate::schema::DefaultNamingStrategy),
            force_quote: true,
            foreign_key_naming: ForeignKeyNaming::default(),
            default_schema: None,
            expressions: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_placeholders() {
        let mut settings = Settings::default();
        settings
            .expressions
            .insert("tenant".to_string(), "acme".to_string());

        assert_eq!(settings.resolve("${tenant}_orders").unwrap(), "acme_orders");
        assert_eq!(settings.resolve("plain").unwrap(), "plain");
        assert!(settings
            .resolve("${missing}_orders")
            .unwrap_err()
            .is_invalid_schema());
        assert!(settings.resolve("${tenant").unwrap_err().is_invalid_schema());
    }
}
