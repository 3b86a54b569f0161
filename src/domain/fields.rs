use std::collections::HashMap;

use serde_json::{Map, Value};

/// Bidirectional mapping between human-readable field names and tracker field ids.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    name_to_id: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
}

impl FieldCatalog {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut catalog = Self::default();
        for (id, name) in entries {
            // Several fields may share a display name; the first listed wins.
            catalog
                .name_to_id
                .entry(name.clone())
                .or_insert_with(|| id.clone());
            catalog.id_to_name.insert(id, name);
        }
        catalog
    }

    /// Unknown names are assumed to already be ids (e.g. `labels`, `summary`).
    pub fn id_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.name_to_id.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn name_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.id_to_name.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn resolve(&self, named: &Map<String, Value>) -> ResolvedFields {
        let entries = named
            .iter()
            .map(|(name, value)| ResolvedField {
                name: name.clone(),
                id: self.id_for(name).to_string(),
                value: value.clone(),
            })
            .collect();
        ResolvedFields { entries }
    }

    pub fn field_count(&self) -> usize {
        self.id_to_name.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    pub name: String,
    pub id: String,
    pub value: Value,
}

/// A field update carrying both the caller's names and the tracker's ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFields {
    entries: Vec<ResolvedField>,
}

impl ResolvedFields {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_id(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|field| (field.id.clone(), field.value.clone()))
            .collect()
    }

    pub fn by_name(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog() -> FieldCatalog {
        FieldCatalog::new([
            ("labels".to_string(), "Labels".to_string()),
            (
                "customfield_10400".to_string(),
                "SPO: E-mail Body".to_string(),
            ),
        ])
    }

    #[test]
    fn translates_in_both_directions() {
        let catalog = catalog();
        assert_eq!(catalog.id_for("SPO: E-mail Body"), "customfield_10400");
        assert_eq!(catalog.name_for("customfield_10400"), "SPO: E-mail Body");
        assert_eq!(catalog.id_for("Labels"), "labels");
    }

    #[test]
    fn unknown_names_pass_through() {
        let catalog = catalog();
        assert_eq!(catalog.id_for("summary"), "summary");
        assert_eq!(catalog.name_for("customfield_99999"), "customfield_99999");
    }

    #[test]
    fn resolves_updates_keeping_names() {
        let mut named = Map::new();
        named.insert("Labels".to_string(), json!(["spo-automation-handled"]));
        let resolved = catalog().resolve(&named);

        assert_eq!(
            Value::Object(resolved.by_id()),
            json!({ "labels": ["spo-automation-handled"] })
        );
        assert_eq!(
            Value::Object(resolved.by_name()),
            json!({ "Labels": ["spo-automation-handled"] })
        );
    }
}
