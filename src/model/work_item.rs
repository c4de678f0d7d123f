use serde::Deserialize;
use serde_json::{Map, Value};

/// A work item as returned by the tracking service, fields untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkItem {
    pub id: u64,
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Present only when the item was fetched with `$expand=relations`.
    #[serde(default)]
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relation {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub url: String,
}

/// Fields-only fetch used for resolving children.
#[derive(Debug, Deserialize)]
pub struct FieldsResponse {
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResponse {
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemReference {
    pub id: u64,
}
