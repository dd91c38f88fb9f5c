use std::sync::{Mutex, MutexGuard};

use crate::error::ClientError;

/// Loading and error flags of the most recent call made through a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Per-instance holder for [`RequestState`].
///
/// Overlapping calls are not serialised: each one flips the flags when it
/// starts and again when it resolves, so the call that resolves last wins.
#[derive(Debug, Default)]
pub struct RequestTracker {
    state: Mutex<RequestState>,
}

impl RequestTracker {
    pub fn snapshot(&self) -> RequestState {
        self.lock().clone()
    }

    pub fn start(&self) {
        let mut state = self.lock();
        state.is_loading = true;
        state.error = None;
    }

    pub fn finish<T>(&self, outcome: &Result<T, ClientError>) {
        let mut state = self.lock();
        state.is_loading = false;
        state.error = outcome.as_ref().err().map(ToString::to_string);
    }

    fn lock(&self) -> MutexGuard<'_, RequestState> {
        // No invariant spans the two fields, so poisoning is ignored.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
