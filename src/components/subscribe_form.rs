use std::sync::{Mutex, MutexGuard};

use crate::domain::NewSubscriber;
use crate::error::ClientError;
use crate::newsletter_client::{NewsletterClient, SubscribeRequest, SubscribeResponse};

use super::render_template;

const TEMPLATE: &str = include_str!("../../templates/subscribe_form.html");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl FormStatus {
    fn as_str(&self) -> &'static str {
        match self {
            FormStatus::Idle => "idle",
            FormStatus::Loading => "loading",
            FormStatus::Success => "success",
            FormStatus::Error(_) => "error",
        }
    }
}

#[derive(Debug, Default)]
struct FormInput {
    email: String,
    name: String,
    status: FormStatus,
}

/// Newsletter signup form backed by a [`NewsletterClient`].
///
/// Inputs and status sit behind a lock so the form can be rendered while a
/// submission is in flight.
#[derive(Debug)]
pub struct SubscribeForm {
    client: NewsletterClient,
    tags: Option<String>,
    input: Mutex<FormInput>,
}

impl SubscribeForm {
    pub fn new(client: NewsletterClient) -> Self {
        Self {
            client,
            tags: None,
            input: Mutex::new(FormInput::default()),
        }
    }

    /// Tags attached to every subscription made through this form.
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.lock().email = email.into();
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.lock().name = name.into();
    }

    pub fn email(&self) -> String {
        self.lock().email.clone()
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn status(&self) -> FormStatus {
        self.lock().status.clone()
    }

    pub fn client(&self) -> &NewsletterClient {
        &self.client
    }

    /// Validates the inputs locally, then subscribes. Inputs are cleared on
    /// success and kept on failure.
    pub async fn submit(&self) -> Result<SubscribeResponse, ClientError> {
        let (email, name) = {
            let input = self.lock();
            (input.email.clone(), input.name.clone())
        };

        let new_subscriber =
            match NewSubscriber::parse(email, name, self.tags.clone().unwrap_or_default()) {
                Ok(subscriber) => subscriber,
                Err(e) => {
                    tracing::debug!(error.message = %e, "Rejected subscribe form input");
                    self.lock().status = FormStatus::Error(e.clone());
                    return Err(ClientError::Validation(e));
                }
            };

        self.lock().status = FormStatus::Loading;
        let request: SubscribeRequest = new_subscriber.into();
        let outcome = self.client.subscribe(&request).await;

        let mut input = self.lock();
        let status = match &outcome {
            Ok(_) => {
                input.email.clear();
                input.name.clear();
                FormStatus::Success
            }
            Err(e) => FormStatus::Error(e.to_string()),
        };
        input.status = status;
        drop(input);
        outcome
    }

    pub fn render(&self) -> Result<String, tera::Error> {
        let input = self.lock();
        let error = match &input.status {
            FormStatus::Error(message) => message.as_str(),
            _ => "",
        };
        render_template(
            TEMPLATE,
            &[
                ("status", input.status.as_str()),
                ("email", input.email.as_str()),
                ("name", input.name.as_str()),
                ("error", error),
            ],
        )
    }

    fn lock(&self) -> MutexGuard<'_, FormInput> {
        self.input.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
