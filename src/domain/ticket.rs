use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::fields::FieldCatalog;

pub const EMAIL_BODY_FIELD: &str = "SPO: E-mail Body";
pub const HANDLED_LABEL: &str = "spo-automation-handled";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Assignee {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    pub key: String,
    pub id: String,
    pub labels: Vec<String>,
    pub assignee: Option<Assignee>,
    fields: Map<String, Value>,
    catalog: Arc<FieldCatalog>,
}

impl Ticket {
    /// Builds a ticket from raw fields keyed by tracker field id.
    pub fn new(
        key: impl Into<String>,
        id: impl Into<String>,
        mut fields: Map<String, Value>,
        catalog: Arc<FieldCatalog>,
    ) -> Self {
        let labels = fields
            .remove("labels")
            .and_then(|value| serde_json::from_value::<Vec<String>>(value).ok())
            .unwrap_or_default();
        let assignee = fields
            .remove("assignee")
            .and_then(|value| serde_json::from_value::<Assignee>(value).ok());

        Self {
            key: key.into(),
            id: id.into(),
            labels,
            assignee,
            fields,
            catalog,
        }
    }

    /// Looks up a field by its human-readable name. Null values count as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .get(self.catalog.id_for(name))
            .filter(|value| !value.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }

    /// Adds `label` locally; returns `false` when it was already present.
    pub fn add_label(&mut self, label: &str) -> bool {
        if self.has_label(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn is_assigned_to(&self, account: &str) -> bool {
        self.assignee
            .as_ref()
            .is_some_and(|assignee| assignee.name == account)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}
