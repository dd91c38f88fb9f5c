pub mod action_client;
pub mod components;
pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod flag_store;
pub mod newsletter_client;
pub mod request_state;
pub mod telemetry;

pub use action_client::{Action, ActionClient};
pub use email_client::EmailClient;
pub use error::ClientError;
pub use newsletter_client::NewsletterClient;
