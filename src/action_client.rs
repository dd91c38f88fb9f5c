use std::fmt;
use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ClientError;

/// Value of the `action` query parameter the endpoint dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Subscribe,
    Unsubscribe,
    Send,
    SendTemplate,
    Test,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Subscribe => "subscribe",
            Action::Unsubscribe => "unsubscribe",
            Action::Send => "send",
            Action::SendTemplate => "send-template",
            Action::Test => "test",
        }
    }

    /// Used when a failed response carries no `error` field.
    fn fallback_error(&self) -> &'static str {
        match self {
            Action::Subscribe => "Subscribe failed",
            Action::Unsubscribe => "Unsubscribe failed",
            Action::Send => "Failed to send email",
            Action::SendTemplate => "Failed to send template email",
            Action::Test => "Test email failed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every response, successful or not.
#[derive(Deserialize, Default)]
struct Envelope {
    success: Option<bool>,
    error: Option<String>,
    code: Option<serde_json::Value>,
}

/// Posts JSON bodies to `{api_url}?action=<action>`.
#[derive(Debug, Clone)]
pub struct ActionClient {
    http_client: Client,
    api_url: Url,
}

impl ActionClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(api_url: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            api_url,
        })
    }

    pub fn parse(api_url: &str, timeout: Option<Duration>) -> Result<Self, anyhow::Error> {
        let api_url = Url::parse(api_url)
            .with_context(|| format!("{api_url} is not a valid endpoint url."))?;
        Self::new(api_url, timeout).context("Failed to build the HTTP client.")
    }

    pub fn action_url(&self, action: Action) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair("action", action.as_str());
        url
    }

    #[tracing::instrument(name = "Calling endpoint action", skip(self, body))]
    pub async fn call<B, R>(&self, action: Action, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.action_url(action))
            .json(body)
            .send()
            .await
            .context("Failed to reach the endpoint.")
            .map_err(ClientError::Transport)?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .context("Failed to read the response body.")
            .map_err(ClientError::Transport)?;
        let payload: serde_json::Value = serde_json::from_slice(&bytes)
            .context("The endpoint returned a non-JSON body.")
            .map_err(ClientError::Transport)?;

        let envelope = Envelope::deserialize(&payload).unwrap_or_default();
        if !status.is_success() || envelope.success == Some(false) {
            let message = envelope
                .error
                .unwrap_or_else(|| action.fallback_error().to_string());
            tracing::warn!(%status, error.message = %message, "Endpoint rejected the request");
            return Err(ClientError::Api {
                status,
                message,
                code: envelope.code,
            });
        }

        serde_json::from_value(payload)
            .context("The endpoint returned an unexpected response shape.")
            .map_err(ClientError::Transport)
    }
}
