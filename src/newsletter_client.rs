use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::action_client::{Action, ActionClient};
use crate::error::ClientError;
use crate::request_state::{RequestState, RequestTracker};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Comma-separated tag list, passed through to the provider untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Overrides the list the endpoint subscribes to by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
}

impl SubscribeRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub success: bool,
    /// Accepted as a JSON number or a numeric string.
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub person_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeResponse {
    pub success: bool,
    /// Set to "Already unsubscribed" when the contact was unknown.
    #[serde(default)]
    pub message: Option<String>,
}

/// Subscribes and unsubscribes newsletter contacts.
///
/// Each instance tracks the loading and error state of its own calls.
#[derive(Debug)]
pub struct NewsletterClient {
    client: ActionClient,
    tracker: RequestTracker,
}

impl NewsletterClient {
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
        name = "Subscribing a contact",
        skip(self, request),
        fields(subscriber_email = %request.email)
    )]
    pub async fn subscribe(
        &self,
        request: &SubscribeRequest,
    ) -> Result<SubscribeResponse, ClientError> {
        self.tracker.start();
        let outcome = self.client.call(Action::Subscribe, request).await;
        self.tracker.finish(&outcome);
        outcome
    }

    #[tracing::instrument(
        name = "Unsubscribing a contact",
        skip(self, request),
        fields(subscriber_email = %request.email)
    )]
    pub async fn unsubscribe(
        &self,
        request: &UnsubscribeRequest,
    ) -> Result<UnsubscribeResponse, ClientError> {
        self.tracker.start();
        let outcome = self.client.call(Action::Unsubscribe, request).await;
        self.tracker.finish(&outcome);
        outcome
    }
}
