//! Fixed record operations exposed by the relay.
//!
//! Each operation logs in, performs exactly one gateway call and returns the
//! raw CRM response.

use std::sync::Arc;

use serde_json::Value;

use super::client::RecordGateway;
use super::fields::{
    job_by_id_query, open_jobs_query, opportunity_discussed_query, record_ids, JobField,
    OpportunityDiscussedField, SObjectField, UpdatePayload,
};
use super::session::{CrmSession, SessionProvider};
use crate::utilities::errors::RelayResult;

/// Session bridge plus gateway, cheap to clone into handlers.
#[derive(Clone)]
pub struct RecordRelay {
    session: Arc<dyn SessionProvider>,
    gateway: Arc<dyn RecordGateway>,
}

impl RecordRelay {
    pub fn new(session: Arc<dyn SessionProvider>, gateway: Arc<dyn RecordGateway>) -> Self {
        Self { session, gateway }
    }

    /// Log in and return the session (used by the connectivity check).
    pub async fn login(&self) -> RelayResult<CrmSession> {
        self.session.login().await
    }

    pub async fn fetch_open_jobs(&self) -> RelayResult<Value> {
        let session = self.session.login().await?;
        self.gateway.query(&session, &open_jobs_query()).await
    }

    pub async fn fetch_job(&self) -> RelayResult<Value> {
        let session = self.session.login().await?;
        self.gateway
            .query(&session, &job_by_id_query(record_ids::JOB_ID))
            .await
    }

    pub async fn fetch_opportunity_discussed(&self) -> RelayResult<Value> {
        let session = self.session.login().await?;
        self.gateway
            .query(&session, &opportunity_discussed_query())
            .await
    }

    /// Store an answer in the job's VMS payload field.
    pub async fn update_job(&self, id: &str, answer: &str) -> RelayResult<Value> {
        let payload = UpdatePayload::new(id).set(JobField::VmsLastPayload, answer);
        self.apply(payload).await
    }

    /// Store an answer on the hardcoded opportunity-discussed record.
    pub async fn update_opportunity_discussed(&self, answer: &str) -> RelayResult<Value> {
        let payload = UpdatePayload::new(record_ids::OPPORTUNITY_DISCUSSED_ID)
            .set(OpportunityDiscussedField::InternalAnswer1, answer);
        self.apply(payload).await
    }

    async fn apply<F: SObjectField>(&self, payload: UpdatePayload<F>) -> RelayResult<Value> {
        let session = self.session.login().await?;
        self.gateway
            .update(&session, payload.object(), payload.id(), payload.fields())
            .await
    }
}
