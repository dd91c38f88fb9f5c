use super::{SubscriberEmail, SubscriberName};
use crate::newsletter_client::SubscribeRequest;

/// A subscription that passed local validation and is ready to be sent.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: Option<SubscriberName>,
    pub tags: Option<String>,
}

impl NewSubscriber {
    /// Blank name and tags are treated as absent.
    pub fn parse(email: String, name: String, tags: String) -> Result<Self, String> {
        let email = SubscriberEmail::parse(email)?;
        let name = if name.trim().is_empty() {
            None
        } else {
            Some(SubscriberName::parse(name)?)
        };
        let tags = Some(tags.trim().to_string()).filter(|t| !t.is_empty());

        Ok(Self { email, name, tags })
    }
}

impl From<NewSubscriber> for SubscribeRequest {
    fn from(value: NewSubscriber) -> Self {
        SubscribeRequest {
            email: value.email.as_ref().to_string(),
            name: value.name.map(|n| n.as_ref().to_string()),
            tags: value.tags,
            list_id: None,
        }
    }
}
