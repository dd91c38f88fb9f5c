use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::email_client::{EmailClient, SendResponse};
use crate::error::ClientError;
use crate::flag_store::FlagStore;

use super::render_template;

const TEMPLATE: &str = include_str!("../../templates/test_banner.html");

/// How long the banner stays up after a successful test send.
pub const HIDE_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BannerStatus {
    #[default]
    Idle,
    Loading,
    Success {
        job_id: Option<String>,
    },
    Error(String),
}

impl BannerStatus {
    fn as_str(&self) -> &'static str {
        match self {
            BannerStatus::Idle => "idle",
            BannerStatus::Loading => "loading",
            BannerStatus::Success { .. } => "success",
            BannerStatus::Error(_) => "error",
        }
    }
}

#[derive(Debug, Default)]
struct BannerInput {
    to_email: String,
    status: BannerStatus,
    flag_persisted: bool,
}

/// One-time prompt to verify email delivery with a test send.
///
/// Shown until a test send succeeds once; the success is remembered in a
/// [`FlagStore`] so the banner stays hidden on later mounts.
pub struct TestBanner {
    client: EmailClient,
    store: Arc<dyn FlagStore>,
    flag_key: String,
    visible: Arc<AtomicBool>,
    hide_delay: Duration,
    input: Mutex<BannerInput>,
}

impl TestBanner {
    /// Reads the flag once. An unreadable store counts as "never tested".
    pub fn mount(
        client: EmailClient,
        store: Arc<dyn FlagStore>,
        flag_key: impl Into<String>,
    ) -> Self {
        let flag_key = flag_key.into();
        let tested = store.is_set(&flag_key).unwrap_or_else(|e| {
            tracing::warn!(error.cause_chain = ?e, "Failed to read the test email flag");
            false
        });

        Self {
            client,
            store,
            flag_key,
            visible: Arc::new(AtomicBool::new(!tested)),
            hide_delay: HIDE_DELAY,
            input: Mutex::new(BannerInput {
                flag_persisted: tested,
                ..Default::default()
            }),
        }
    }

    pub fn with_hide_delay(mut self, hide_delay: Duration) -> Self {
        self.hide_delay = hide_delay;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn set_to_email(&self, to_email: impl Into<String>) {
        self.lock().to_email = to_email.into();
    }

    pub fn to_email(&self) -> String {
        self.lock().to_email.clone()
    }

    pub fn status(&self) -> BannerStatus {
        self.lock().status.clone()
    }

    pub fn client(&self) -> &EmailClient {
        &self.client
    }

    /// Sends a test email to the entered recipient. The first success
    /// persists the flag and hides the banner after the hide delay.
    ///
    /// The delayed hide runs on the current Tokio runtime; without one the
    /// banner hides immediately.
    pub async fn send_test(&self) -> Result<SendResponse, ClientError> {
        let to_email = {
            let mut input = self.lock();
            input.status = BannerStatus::Loading;
            input.to_email.clone()
        };
        let outcome = self.client.send_test(&to_email).await;

        let mut input = self.lock();
        match &outcome {
            Ok(response) => {
                if !input.flag_persisted {
                    match self.store.raise(&self.flag_key) {
                        Ok(()) => input.flag_persisted = true,
                        Err(e) => tracing::error!(
                            error.cause_chain = ?e,
                            "Failed to persist the test email flag"
                        ),
                    }
                }
                schedule_hide(Arc::clone(&self.visible), self.hide_delay);
                input.status = BannerStatus::Success {
                    job_id: response.job_id.clone(),
                };
            }
            Err(e) => input.status = BannerStatus::Error(e.to_string()),
        }
        drop(input);
        outcome
    }

    /// `None` once the banner is hidden.
    pub fn render(&self) -> Result<Option<String>, tera::Error> {
        if !self.is_visible() {
            return Ok(None);
        }
        let input = self.lock();
        let (job_id, error) = match &input.status {
            BannerStatus::Success { job_id } => (job_id.as_deref().unwrap_or_default(), ""),
            BannerStatus::Error(message) => ("", message.as_str()),
            _ => ("", ""),
        };
        render_template(
            TEMPLATE,
            &[
                ("status", input.status.as_str()),
                ("to_email", input.to_email.as_str()),
                ("job_id", job_id),
                ("error", error),
            ],
        )
        .map(Some)
    }

    fn lock(&self) -> MutexGuard<'_, BannerInput> {
        self.input.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn schedule_hide(visible: Arc<AtomicBool>, delay: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                visible.store(false, Ordering::SeqCst);
            });
        }
        Err(e) => {
            tracing::warn!(error.message = %e, "No runtime to delay hiding the test banner");
            visible.store(false, Ordering::SeqCst);
        }
    }
}
