//! The global admission semaphore (spec §5): a single `maxInFlight` ceiling
//! shared across every model call in the session, the only place
//! back-pressure is applied. Acquiring a permit is one of the three
//! suspension points that must re-check the cancel signal.

use std::sync::Arc;

use delib_gateway::CancelToken;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use delib_core::DeliberationError;

#[derive(Clone)]
pub struct AdmissionControl {
    semaphore: Arc<Semaphore>,
}

impl AdmissionControl {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Acquire one permit, racing the cancel signal. Returns
    /// `DeliberationError::Cancelled` if cancellation wins the race.
    pub async fn acquire(&self, cancel: &CancelToken) -> Result<OwnedSemaphorePermit, DeliberationError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DeliberationError::Cancelled),
            permit = self.semaphore.clone().acquire_owned() => {
                permit.map_err(|_| DeliberationError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquires_when_capacity_available() {
        let admission = AdmissionControl::new(2);
        let cancel = CancelToken::new();
        let permit = admission.acquire(&cancel).await;
        assert!(permit.is_ok());
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_acquire() {
        let admission = AdmissionControl::new(1);
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = admission.acquire(&cancel).await;
        assert!(matches!(result, Err(DeliberationError::Cancelled)));
    }
}
