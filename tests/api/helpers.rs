use std::path::PathBuf;
use std::sync::Arc;

use newsletter_client::{
    EmailClient, NewsletterClient,
    configuration::{ApiSettings, StorageSettings, get_configuration_from},
    flag_store::FlagStore,
    telemetry::{get_subscriber, init_subscriber},
};
use once_cell::sync::Lazy;
use uuid::Uuid;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber).expect("Failed to init tracing");
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).expect("Failed to init tracing");
    }
});

pub struct TestApp {
    pub endpoint: MockServer,
    pub api: ApiSettings,
    pub storage: StorageSettings,
}

impl TestApp {
    pub fn newsletter_client(&self) -> NewsletterClient {
        self.api
            .newsletter_client()
            .expect("Failed to build newsletter client")
    }

    pub fn email_client(&self) -> EmailClient {
        self.api.email_client().expect("Failed to build email client")
    }

    pub fn flag_store(&self) -> Arc<dyn FlagStore> {
        self.storage.flag_store()
    }
}

/// Loads the shipped configuration and points it at a fresh mock endpoint
/// and a throwaway flag file.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let conf_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configuration");
    let mut config = get_configuration_from(conf_dir).expect("Failed to read configuration");

    let endpoint = MockServer::start().await;
    config.api.base_url = endpoint.uri();
    config.storage.flag_file = std::env::temp_dir()
        .join(Uuid::new_v4().to_string())
        .join("flags.json");

    TestApp {
        endpoint,
        api: config.api,
        storage: config.storage,
    }
}
