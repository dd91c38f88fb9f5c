use std::error::Error;

use reqwest::StatusCode;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Failure of a single endpoint action.
#[derive(thiserror::Error)]
pub enum ClientError {
    /// The endpoint answered with a non-2xx status or `success: false`.
    #[error("{message}")]
    Api {
        status: StatusCode,
        message: String,
        code: Option<serde_json::Value>,
    },
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Transport(#[source] anyhow::Error),
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub fn error_chain_fmt(e: &impl Error, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();

    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }

    Ok(())
}
