use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, SchemaError};

/// A named string-format predicate.
pub type FormatCheck = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Named format predicates injected into schema compilation.
#[derive(Clone, Default)]
pub struct Formats {
    checks: BTreeMap<String, FormatCheck>,
}

impl Formats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under a format name.
    pub fn register<F>(&mut self, name: &str, check: F) -> Result<()>
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        if self.checks.contains_key(name) {
            return Err(SchemaError::DuplicateFormat(name.to_string()));
        }
        self.checks.insert(name.to_string(), Arc::new(check));
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &FormatCheck)> {
        self.checks.iter()
    }
}

impl fmt::Debug for Formats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_predicate_runs() {
        let mut formats = Formats::new();
        formats.register("lowercase", |v| v.chars().all(|c| c.is_ascii_lowercase())).unwrap();

        let (name, check) = formats.iter().next().unwrap();
        assert_eq!(name, "lowercase");
        assert!(check("abc"));
        assert!(!check("aBc"));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut formats = Formats::new();
        formats.register("x", |_| true).unwrap();
        assert!(matches!(
            formats.register("x", |_| false),
            Err(SchemaError::DuplicateFormat(_))
        ));
        assert_eq!(formats.names().collect::<Vec<_>>(), vec!["x"]);
    }
}
