//! REST gateway for queries and record updates.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::fields::SObject;
use super::session::CrmSession;
use crate::utilities::errors::{RelayError, RelayResult};

/// The two CRM operations the relay performs.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Run a SOQL query and return the raw result set.
    async fn query(&self, session: &CrmSession, soql: &str) -> RelayResult<Value>;

    /// Update one record and return the acknowledgement.
    async fn update(
        &self,
        session: &CrmSession,
        object: SObject,
        id: &str,
        fields: &Map<String, Value>,
    ) -> RelayResult<Value>;
}

/// Salesforce REST API client.
pub struct SalesforceRestClient {
    api_version: String,
    client: reqwest::Client,
}

impl SalesforceRestClient {
    pub fn new(api_version: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_version: api_version.into(),
            client,
        }
    }

    fn data_url(&self, session: &CrmSession, path: &str) -> String {
        format!(
            "{}/services/data/v{}/{}",
            session.instance_url.trim_end_matches('/'),
            self.api_version,
            path
        )
    }
}

#[async_trait]
impl RecordGateway for SalesforceRestClient {
    async fn query(&self, session: &CrmSession, soql: &str) -> RelayResult<Value> {
        tracing::debug!(soql, "CRM query");

        let response = self
            .client
            .get(self.data_url(session, "query"))
            .bearer_auth(&session.access_token)
            .query(&[("q", soql)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rest_error(status.as_u16(), &body));
        }

        let result: Value = serde_json::from_str(&body)?;
        tracing::debug!(
            total_size = result.get("totalSize").and_then(|v| v.as_u64()),
            "CRM query returned"
        );
        Ok(result)
    }

    async fn update(
        &self,
        session: &CrmSession,
        object: SObject,
        id: &str,
        fields: &Map<String, Value>,
    ) -> RelayResult<Value> {
        tracing::debug!(%object, id, fields = fields.len(), "CRM update");

        let path = format!("sobjects/{}/{}", object.api_name(), id);
        let response = self
            .client
            .patch(self.data_url(session, &path))
            .bearer_auth(&session.access_token)
            .json(fields)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rest_error(status.as_u16(), &body));
        }

        Ok(update_ack(id))
    }
}

/// Acknowledgement returned for a successful update.
pub fn update_ack(id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "success": true,
        "errors": [],
    })
}

/// Map a REST error body (`[{"message", "errorCode"}]`) to a CRM error.
pub fn rest_error(status: u16, body: &str) -> RelayError {
    let details: Value =
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()));
    let first = details.as_array().and_then(|errors| errors.first());
    let message = match first {
        Some(err) => {
            let code = err.get("errorCode").and_then(|v| v.as_str()).unwrap_or("ERROR");
            let text = err.get("message").and_then(|v| v.as_str()).unwrap_or("");
            format!("{}: {}", code, text)
        }
        None => format!("request failed with status {}", status),
    };
    RelayError::Crm {
        message,
        details: Some(details),
    }
}
