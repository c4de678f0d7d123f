use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::WorkItemSource;
use crate::error::UpstreamQueryError;
use crate::model::work_item::{FieldsResponse, RawWorkItem, WiqlResponse};

const API_VERSION: &str = "7.0";
const OBJECTIVES_WIQL: &str = "SELECT [System.Id] FROM WorkItems WHERE [System.WorkItemType] = 'Objective' ORDER BY [System.Id]";

/// Azure DevOps work-item REST client. One per run.
pub struct AzureDevOpsClient {
    project_url: String,
    auth_header: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AzureDevOpsClient {
    pub fn new(
        base_url: &str,
        organization: &str,
        project: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, UpstreamQueryError> {
        // PATs go in as basic auth with an empty user name.
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| UpstreamQueryError::Transport {
                operation: "build HTTP client".into(),
                source,
            })?;
        Ok(Self {
            project_url: format!(
                "{}/{}/{}",
                base_url.trim_end_matches('/'),
                urlencoding::encode(organization),
                urlencoding::encode(project)
            ),
            auth_header: format!("Basic {encoded}"),
            timeout,
            client,
        })
    }

    /// Browser URL for editing a work item.
    pub fn edit_link(&self, id: u64) -> String {
        format!("{}/_workitems/edit/{id}", self.project_url)
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, UpstreamQueryError> {
        let resp = request
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(operation, e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| self.request_error(operation, e))?;

        if !status.is_success() {
            return Err(UpstreamQueryError::Status {
                operation: operation.to_string(),
                status,
                body,
            });
        }
        Ok(body)
    }

    fn request_error(&self, operation: &str, source: reqwest::Error) -> UpstreamQueryError {
        if source.is_timeout() {
            UpstreamQueryError::Timeout {
                operation: operation.to_string(),
                timeout: self.timeout,
            }
        } else {
            UpstreamQueryError::Transport {
                operation: operation.to_string(),
                source,
            }
        }
    }

    async fn get_work_item<T: DeserializeOwned>(
        &self,
        id: u64,
        expand_relations: bool,
    ) -> Result<T, UpstreamQueryError> {
        let operation = format!("fetch work item {id}");
        let url = format!("{}/_apis/wit/workitems/{id}", self.project_url);
        let mut request = self.client.get(&url).query(&[("api-version", API_VERSION)]);
        if expand_relations {
            request = request.query(&[("$expand", "relations")]);
        }
        tracing::debug!(%url, expand_relations, "GET work item");
        let body = self.send(&operation, request).await?;
        decode(&operation, body)
    }
}

fn decode<T: DeserializeOwned>(operation: &str, body: String) -> Result<T, UpstreamQueryError> {
    serde_json::from_str(&body).map_err(|source| UpstreamQueryError::Decode {
        operation: operation.to_string(),
        body,
        source,
    })
}

#[async_trait]
impl WorkItemSource for AzureDevOpsClient {
    fn name(&self) -> &str {
        "Azure DevOps"
    }

    async fn list_objective_ids(&self) -> Result<Vec<u64>, UpstreamQueryError> {
        let operation = "Azure DevOps WIQL query";
        let url = format!("{}/_apis/wit/wiql", self.project_url);
        let request = self
            .client
            .post(&url)
            .query(&[("api-version", API_VERSION)])
            .json(&json!({ "query": OBJECTIVES_WIQL }));

        let body = self.send(operation, request).await?;
        let wiql: WiqlResponse = decode(operation, body)?;
        Ok(wiql.work_items.into_iter().map(|w| w.id).collect())
    }

    async fn fetch_with_relations(&self, id: u64) -> Result<RawWorkItem, UpstreamQueryError> {
        self.get_work_item(id, true).await
    }

    async fn fetch_fields(&self, id: u64) -> Result<Map<String, Value>, UpstreamQueryError> {
        let resp: FieldsResponse = self.get_work_item(id, false).await?;
        Ok(resp.fields)
    }
}
