use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The only claim encoding understood here.
pub const FIELDS_V1: &str = "FieldsV1";

/// One `metadata.managedFields` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedFieldsEntry {
    pub manager: String,
    pub operation: String,
    pub api_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_type: Option<String>,
    #[serde(rename = "fieldsV1", skip_serializing_if = "Option::is_none")]
    pub fields_v1: Option<Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subresource: String,
}

impl ManagedFieldsEntry {
    pub fn new(manager: impl Into<String>, fields_v1: Value) -> Self {
        Self {
            manager: manager.into(),
            operation: "Apply".to_string(),
            fields_type: Some(FIELDS_V1.to_string()),
            fields_v1: Some(fields_v1),
            ..Self::default()
        }
    }

    pub fn with_subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = subresource.into();
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// The claim tree, if this entry carries one in a supported encoding.
    pub fn claims(&self) -> Option<&Map<String, Value>> {
        match self.fields_type.as_deref() {
            None | Some(FIELDS_V1) => {}
            Some(other) => {
                tracing::warn!(
                    manager = %self.manager,
                    fields_type = other,
                    "skipping entry with unsupported fieldsType"
                );
                return None;
            }
        }
        self.fields_v1.as_ref()?.as_object()
    }
}

/// Read the managed-field entries of a live object.
///
/// A missing or `null` list is empty.
///
/// # Errors
///
/// `MalformedManagedFields` if the list is present but not a list of entries.
pub fn entries_from_live(live: &Value) -> Result<Vec<ManagedFieldsEntry>> {
    match live.pointer("/metadata/managedFields") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => {
            Vec::<ManagedFieldsEntry>::deserialize(list).map_err(Error::MalformedManagedFields)
        }
    }
}

/// Deep-merge the claims of every `manager` entry into one claim tree.
///
/// Entries are merged in order and later leaves win. Entries recorded against
/// a subresource are left out. Merging is idempotent: repeating an entry does
/// not change the result.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use ssa_drift::ownership::{merge_claims, ManagedFieldsEntry};
///
/// let entries = vec![
///     ManagedFieldsEntry::new("me", json!({"f:spec": {"f:replicas": {}}})),
///     ManagedFieldsEntry::new("hpa", json!({"f:spec": {"f:paused": {}}})),
///     ManagedFieldsEntry::new("me", json!({"f:spec": {"f:template": {}}})),
/// ];
/// let merged = merge_claims(&entries, "me");
/// assert_eq!(
///     serde_json::Value::Object(merged),
///     json!({"f:spec": {"f:replicas": {}, "f:template": {}}})
/// );
/// ```
pub fn merge_claims(entries: &[ManagedFieldsEntry], manager: &str) -> Map<String, Value> {
    let mut merged = Map::new();
    for entry in entries.iter().filter(|e| e.manager == manager) {
        if !entry.subresource.is_empty() {
            tracing::debug!(
                manager,
                subresource = %entry.subresource,
                "not merging subresource claims"
            );
            continue;
        }
        if let Some(claims) = entry.claims() {
            deep_merge(&mut merged, claims);
        }
    }
    merged
}

fn deep_merge(into: &mut Map<String, Value>, from: &Map<String, Value>) {
    for (key, incoming) in from {
        match (into.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(inner)) => deep_merge(existing, inner),
            _ => {
                into.insert(key.clone(), incoming.clone());
            }
        }
    }
}
