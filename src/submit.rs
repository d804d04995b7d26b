//! Submission of the aggregated results to the remote collection endpoint.
//!
//! Transport failure is never fatal: the caller keeps the ledger and renders
//! the payload as text so nothing is lost.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::ledger::ResultRecord;
use crate::questionnaire::QuestionnaireData;

/// Wire payload. Key names must round-trip exactly for downstream analysis.
#[derive(Debug, Serialize)]
pub struct SubmissionPayload<'a> {
    #[serde(rename = "participantId")]
    pub participant_id: &'a str,
    #[serde(rename = "experimentData")]
    pub experiment_data: &'a [ResultRecord],
    #[serde(rename = "questionnaire", skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<&'a QuestionnaireData>,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to encode submission payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("submission transport failed: {0}")]
    Transport(#[from] Box<ureq::Error>),
}

/// Seam for tests; the real implementation posts JSON over HTTP.
pub trait Submitter {
    fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<(), SubmitError>;
}

pub struct HttpSubmitter {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<(), SubmitError> {
        let body = serde_json::to_value(payload)?;
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(body)
            .map_err(Box::new)?;
        info!(status = response.status(), "results submitted");
        Ok(())
    }
}

/// Pretty JSON rendering of the payload, shown to the participant/operator
/// when transport fails (and when no endpoint is configured).
pub fn render_fallback(payload: &SubmissionPayload<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}
