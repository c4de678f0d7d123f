use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::util::fields::{normalize_key_results, value_text};

/// The canonical document every renderer and the schema check operate on.
///
/// Field order here is the serialized key order. Loading is lenient: nulls
/// and wrong-typed values fall back to defaults so unvalidated input still
/// renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OkrDocument {
    #[serde(default, deserialize_with = "list_from_any")]
    pub objectives: Vec<Objective>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objective {
    #[serde(deserialize_with = "id_from_any")]
    pub id: u64,
    #[serde(deserialize_with = "text_from_any")]
    pub title: String,
    #[serde(deserialize_with = "text_from_any")]
    pub state: String,
    #[serde(deserialize_with = "text_from_any")]
    pub objective: String,
    #[serde(deserialize_with = "key_results_from_any")]
    pub key_results: Vec<String>,
    #[serde(deserialize_with = "text_from_any")]
    pub method_of_measure: String,
    #[serde(deserialize_with = "text_from_any")]
    pub objective_outcome: String,
    #[serde(deserialize_with = "text_from_any")]
    pub link: String,
    #[serde(deserialize_with = "list_from_any")]
    pub hypotheses: Vec<Hypothesis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hypothesis {
    #[serde(deserialize_with = "id_from_any")]
    pub id: u64,
    #[serde(deserialize_with = "text_from_any")]
    pub title: String,
    #[serde(deserialize_with = "text_from_any")]
    pub state: String,
    #[serde(deserialize_with = "text_from_any")]
    pub hypothesis: String,
    #[serde(deserialize_with = "text_from_any")]
    pub hypothesis_context: String,
    #[serde(deserialize_with = "text_from_any")]
    pub link: String,
    #[serde(deserialize_with = "text_from_any")]
    pub method_of_measuring_hypothesis: String,
    #[serde(deserialize_with = "text_from_any")]
    pub hypothesis_outcome: String,
}

impl OkrDocument {
    /// Collapse a loaded JSON value into the canonical shape.
    ///
    /// Accepts `{"objectives": [...]}` or a bare array of objectives.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Array(items) => Ok(OkrDocument {
                objectives: list_from_values(items)?,
            }),
            other => serde_json::from_value(other),
        }
    }

    pub fn hypothesis_count(&self) -> usize {
        self.objectives.iter().map(|o| o.hypotheses.len()).sum()
    }
}

fn key_results_from_any<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_key_results(Some(&value)))
}

fn text_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !matches!(value, Value::Null | Value::String(_) | Value::Number(_) | Value::Bool(_)) {
        tracing::warn!(%value, "expected text, using empty string");
    }
    Ok(value_text(&value).unwrap_or_default())
}

fn id_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let id = match &value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(id.unwrap_or_else(|| {
        tracing::warn!(%value, "expected a work item id, using 0");
        0
    }))
}

/// Null or a non-array reads as empty; non-object entries are dropped.
fn list_from_any<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => list_from_values(items).map_err(D::Error::custom),
        Value::Null => Ok(Vec::new()),
        other => {
            tracing::warn!(value = %other, "expected a list, using an empty one");
            Ok(Vec::new())
        }
    }
}

fn list_from_values<T: DeserializeOwned>(items: Vec<Value>) -> serde_json::Result<Vec<T>> {
    items
        .into_iter()
        .filter(|item| {
            let keep = item.is_object();
            if !keep {
                tracing::warn!(value = %item, "skipping entry that is not an object");
            }
            keep
        })
        .map(serde_json::from_value)
        .collect()
}
