use serde_json::{Map, Value};

use crate::error::{ChildFetchError, UpstreamQueryError};
use crate::model::okr::{Hypothesis, Objective, OkrDocument};
use crate::model::work_item::{RawWorkItem, Relation};
use crate::providers::WorkItemSource;
use crate::util::fields::{
    child_id_from_url, field_id, field_text_or, normalize_key_results, FORWARD_HIERARCHY,
};

/// Build the canonical document from raw objectives.
///
/// Children are resolved one at a time through `source`. A child that
/// answers with an error status or times out is logged and left out, and the
/// objective is still emitted. Any other failure aborts normalization.
pub async fn normalize(
    raw_objectives: Vec<RawWorkItem>,
    source: &dyn WorkItemSource,
    link_builder: &(dyn Fn(u64) -> String + Sync),
) -> Result<OkrDocument, UpstreamQueryError> {
    let mut objectives = Vec::with_capacity(raw_objectives.len());
    for raw in raw_objectives {
        let mut objective = objective_from_fields(raw.id, &raw.fields, link_builder);

        let child_ids = child_ids(&raw.relations);
        tracing::debug!(objective = objective.id, ?child_ids, "relations scanned");

        for cid in child_ids {
            match fetch_hypothesis(source, cid, link_builder).await {
                Ok(hypothesis) => objective.hypotheses.push(hypothesis),
                Err(e) if e.source.is_recoverable() => {
                    tracing::error!("{:#}", anyhow::Error::from(e));
                }
                Err(e) => return Err(e.source),
            }
        }
        objectives.push(objective);
    }
    Ok(OkrDocument { objectives })
}

/// Child ids from forward-hierarchy relations, in relation order.
pub fn child_ids(relations: &[Relation]) -> Vec<u64> {
    relations
        .iter()
        .filter(|rel| rel.rel == FORWARD_HIERARCHY)
        .filter_map(|rel| child_id_from_url(&rel.url))
        .collect()
}

fn objective_from_fields(
    id: u64,
    fields: &Map<String, Value>,
    link_builder: &(dyn Fn(u64) -> String + Sync),
) -> Objective {
    let id = field_id(fields).unwrap_or(id);
    Objective {
        id,
        title: field_text_or(fields, "System.Title", "Untitled"),
        state: field_text_or(fields, "System.State", ""),
        objective: field_text_or(fields, "Custom.Objective", ""),
        key_results: normalize_key_results(fields.get("Custom.KeyResults")),
        method_of_measure: field_text_or(fields, "Custom.MethodOfMeasure", ""),
        objective_outcome: field_text_or(fields, "Custom.ObjectiveOutcome", ""),
        link: link_builder(id),
        hypotheses: Vec::new(),
    }
}

async fn fetch_hypothesis(
    source: &dyn WorkItemSource,
    cid: u64,
    link_builder: &(dyn Fn(u64) -> String + Sync),
) -> Result<Hypothesis, ChildFetchError> {
    let fields = source
        .fetch_fields(cid)
        .await
        .map_err(|source| ChildFetchError { id: cid, source })?;
    Ok(hypothesis_from_fields(cid, &fields, link_builder))
}

fn hypothesis_from_fields(
    cid: u64,
    fields: &Map<String, Value>,
    link_builder: &(dyn Fn(u64) -> String + Sync),
) -> Hypothesis {
    let id = field_id(fields).unwrap_or(cid);
    Hypothesis {
        id,
        title: field_text_or(fields, "System.Title", ""),
        state: field_text_or(fields, "System.State", ""),
        hypothesis: field_text_or(fields, "Custom.Hypothesis", ""),
        hypothesis_context: field_text_or(fields, "Custom.HypothesisContext", ""),
        link: link_builder(id),
        method_of_measuring_hypothesis: field_text_or(
            fields,
            "Custom.MethodOfMeasuringHypothesis",
            "",
        ),
        hypothesis_outcome: field_text_or(fields, "Custom.HypothesisOutcome", ""),
    }
}
