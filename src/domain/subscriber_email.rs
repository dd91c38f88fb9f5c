use validator::ValidateEmail;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Trims and lower-cases the address before validating it, the same
    /// normalisation the endpoint applies on its side.
    pub fn parse(s: String) -> Result<Self, String> {
        let normalized = s.trim().to_lowercase();
        if !normalized.validate_email() {
            return Err(format!("{} is not a valid subscriber email.", s));
        };
        Ok(Self(normalized))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubscriberEmail {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubscriberEmail::parse(value)
    }
}
