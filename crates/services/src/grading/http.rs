use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use assess_core::model::{AnswerSheet, AttemptId, Grade};

use crate::error::GradingError;
use crate::grading::{GradingService, SubmissionIdentity};

#[derive(Clone, Debug)]
pub struct GradingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl GradingConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("ASSESS_GRADING_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let api_key = env::var("ASSESS_GRADING_API_KEY").ok();
        Some(Self { base_url, api_key })
    }
}

/// Grading backend of the surrounding course-management app.
///
/// The submission is posted under the mode's routing name; the payload and
/// the returned grade are identical for both routes.
#[derive(Clone)]
pub struct HttpGradingClient {
    client: Client,
    config: GradingConfig,
}

impl HttpGradingClient {
    #[must_use]
    pub fn new(config: GradingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        GradingConfig::from_env().map(Self::new)
    }

    fn submission_url(&self, identity: &SubmissionIdentity) -> String {
        format!(
            "{}/{}/{}/submissions",
            self.config.base_url.trim_end_matches('/'),
            identity.mode.routing_key(),
            identity.assessment_id,
        )
    }
}

#[derive(Debug, Serialize)]
struct SubmissionRequest<'a> {
    attempt_id: AttemptId,
    answers: &'a AnswerSheet,
}

#[async_trait]
impl GradingService for HttpGradingClient {
    async fn submit(
        &self,
        identity: &SubmissionIdentity,
        answers: &AnswerSheet,
    ) -> Result<Grade, GradingError> {
        let payload = SubmissionRequest {
            attempt_id: identity.attempt_id,
            answers,
        };

        let mut request = self.client.post(self.submission_url(identity)).json(&payload);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GradingError::HttpStatus(response.status()));
        }

        Ok(response.json::<Grade>().await?)
    }
}
