use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::action_client::ActionClient;
use crate::email_client::EmailClient;
use crate::flag_store::{FileFlagStore, FlagStore};
use crate::newsletter_client::NewsletterClient;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub api: ApiSettings,
    pub storage: StorageSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    pub name: String,
    pub log_level: String,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub timeout_ms: Option<u64>,
}

impl ApiSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn client(&self) -> Result<ActionClient, anyhow::Error> {
        ActionClient::parse(&self.base_url, self.timeout())
    }

    pub fn newsletter_client(&self) -> Result<NewsletterClient, anyhow::Error> {
        Ok(NewsletterClient::new(self.client()?))
    }

    pub fn email_client(&self) -> Result<EmailClient, anyhow::Error> {
        Ok(EmailClient::new(self.client()?))
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub flag_file: PathBuf,
    pub test_flag_key: String,
}

impl StorageSettings {
    pub fn flag_store(&self) -> Arc<dyn FlagStore> {
        Arc::new(FileFlagStore::new(self.flag_file.clone()))
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "{other} is not supported environment. Try to use `local` or `production`",
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    get_configuration_from(base_path.join("configuration"))
}

/// Layers `base`, then the `APP_ENV` file (default `local`), then `APP_*`
/// environment variables.
pub fn get_configuration_from(conf_dir: PathBuf) -> Result<Settings, config::ConfigError> {
    let env: Environment = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = config::Config::builder()
        .add_source(
            config::File::with_name(&conf_dir.join("base").to_string_lossy()).required(true),
        )
        .add_source(
            config::File::with_name(&conf_dir.join(env.as_str()).to_string_lossy())
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .prefix_separator("_"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
