//! `${namespace.key}` placeholder substitution.
//!
//! Templates appear in matcher patterns (`"@helpers/${from.elementName}"`)
//! and in custom messages. Values are organised in namespaces (`from`,
//! `target`, `file`, `dependency`, `report`) which may nest; nested entries
//! are addressed with dot-joined keys. Keys of the `from` namespace are also
//! reachable unprefixed for compatibility with older configurations.

/// A template value: plain text or a nested namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// Leaf value.
    Text(String),
    /// Nested namespace.
    Nested(TemplateVars),
}

/// Ordered namespace of template values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    entries: Vec<(String, TemplateValue)>,
}

/// What to do with placeholders that have no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unmatched {
    /// Leave `${...}` verbatim.
    #[default]
    Keep,
    /// Delete the whole `${...}` token.
    Remove,
}

impl TemplateVars {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to a text value, replacing any previous value in place.
    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key.into(), TemplateValue::Text(value.into()));
    }

    /// Sets `key` to a nested namespace, replacing any previous value in place.
    pub fn insert_nested(&mut self, key: impl Into<String>, vars: TemplateVars) {
        self.insert(key.into(), TemplateValue::Nested(vars));
    }

    /// Builder-style [`Self::insert_text`].
    #[must_use]
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_text(key, value);
        self
    }

    /// Builder-style [`Self::insert_nested`].
    #[must_use]
    pub fn with_nested(mut self, key: impl Into<String>, vars: TemplateVars) -> Self {
        self.insert_nested(key, vars);
        self
    }

    fn insert(&mut self, key: String, value: TemplateValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a top-level entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens nested namespaces into dot-joined keys.
    ///
    /// `{foo: {bar: "x"}, baz: "y"}` becomes `[("foo.bar", "x"), ("baz", "y")]`.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut flat = Vec::new();
        flatten_into(self, None, &mut flat);
        flat
    }

    /// Flat lookup table including the unprefixed `from` keys.
    fn lookup_table(&self) -> Vec<(String, String)> {
        let mut merged = TemplateVars::new();
        if let Some(TemplateValue::Nested(from)) = self.get("from") {
            for (key, value) in &from.entries {
                merged.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in &self.entries {
            merged.insert(key.clone(), value.clone());
        }
        merged.flatten()
    }
}

fn flatten_into(vars: &TemplateVars, prefix: Option<&str>, out: &mut Vec<(String, String)>) {
    for (key, value) in &vars.entries {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            TemplateValue::Text(text) => match out.iter_mut().find(|(k, _)| *k == full_key) {
                Some(entry) => entry.1.clone_from(text),
                None => out.push((full_key, text.clone())),
            },
            TemplateValue::Nested(nested) => flatten_into(nested, Some(&full_key), out),
        }
    }
}

/// Resolves placeholders in `template`, keeping unresolved ones verbatim.
#[must_use]
pub fn substitute(template: &str, vars: &TemplateVars) -> String {
    substitute_with(template, vars, Unmatched::Keep)
}

/// Resolves placeholders in every template of `templates`.
#[must_use]
pub fn substitute_all<S: AsRef<str>>(
    templates: &[S],
    vars: &TemplateVars,
    unmatched: Unmatched,
) -> Vec<String> {
    let table = vars.lookup_table();
    templates
        .iter()
        .map(|t| replace_placeholders(t.as_ref(), &table, unmatched))
        .collect()
}

/// Resolves placeholders in `template` with explicit handling of unresolved ones.
#[must_use]
pub fn substitute_with(template: &str, vars: &TemplateVars, unmatched: Unmatched) -> String {
    if !has_placeholder(template) {
        return template.to_string();
    }
    replace_placeholders(template, &vars.lookup_table(), unmatched)
}

/// Returns true if `text` contains a `${...}` token.
#[must_use]
pub fn has_placeholder(text: &str) -> bool {
    text.find("${")
        .is_some_and(|start| text[start + 2..].contains('}'))
}

fn replace_placeholders(template: &str, table: &[(String, String)], unmatched: Unmatched) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let key = &rest[start + 2..start + 2 + len];
        let token = &rest[start..start + 3 + len];
        match table.iter().find(|(k, _)| k == key) {
            Some((_, value)) if !key.is_empty() => out.push_str(value),
            _ => {
                if unmatched == Unmatched::Keep {
                    out.push_str(token);
                }
            }
        }
        rest = &rest[start + 3 + len..];
    }

    out.push_str(rest);
    out
}
