use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::action_client::{Action, ActionClient};
use crate::error::ClientError;
use crate::request_state::{RequestState, RequestTracker};

/// Placeholder values substituted into the subject and body by the provider.
pub type Substitutions = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub to_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    pub subject: String,
    pub body_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<Substitutions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendTemplateRequest {
    pub to_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    pub template_id: String,
    /// Overrides the subject stored with the template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitutions: Option<Substitutions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEmailRequest {
    pub to_email: String,
}

/// Response to `send`, `send-template` and `test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_option_string_from_number")]
    pub job_id: Option<String>,
}

/// Provider identifiers arrive either as strings or as bare numbers.
fn deserialize_option_string_from_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|id| match id {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Sends transactional emails through the endpoint.
#[derive(Debug)]
pub struct EmailClient {
    client: ActionClient,
    tracker: RequestTracker,
}

impl EmailClient {
    pub fn new(client: ActionClient) -> Self {
        Self {
            client,
            tracker: RequestTracker::default(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.tracker.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error
    }

    #[tracing::instrument(
        name = "Sending an email",
        skip(self, request),
        fields(recipient = %request.to_email, subject = %request.subject)
    )]
    pub async fn send_email(&self, request: &SendEmailRequest) -> Result<SendResponse, ClientError> {
        self.perform(Action::Send, request).await
    }

    #[tracing::instrument(
        name = "Sending a template email",
        skip(self, request),
        fields(recipient = %request.to_email, template_id = %request.template_id)
    )]
    pub async fn send_template(
        &self,
        request: &SendTemplateRequest,
    ) -> Result<SendResponse, ClientError> {
        self.perform(Action::SendTemplate, request).await
    }

    #[tracing::instrument(name = "Sending a test email", skip(self))]
    pub async fn send_test(&self, to_email: &str) -> Result<SendResponse, ClientError> {
        let request = TestEmailRequest {
            to_email: to_email.to_string(),
        };
        self.perform(Action::Test, &request).await
    }

    async fn perform<B: Serialize>(
        &self,
        action: Action,
        body: &B,
    ) -> Result<SendResponse, ClientError> {
        self.tracker.start();
        let outcome = self.client.call(action, body).await;
        self.tracker.finish(&outcome);
        outcome
    }
}
