use crate::{CancelErr, OrCancelExt};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct GateInner {
    generation: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
}

/// Issues request tickets; each new ticket supersedes and cancels the
/// previous one.
///
/// Clones share the same generation counter.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    inner: Arc<GateInner>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, cancelling whichever one was in flight.
    pub fn issue(&self) -> RequestTicket {
        let token = CancellationToken::new();
        let previous = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = previous {
            previous.cancel();
        }

        RequestTicket {
            generation,
            token,
            gate: Arc::clone(&self.inner),
        }
    }

    /// Cancel the in-flight request without issuing a new one.
    pub fn cancel_all(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self
            .inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }
}

/// Permission for one request to apply its result, valid until a newer
/// ticket is issued from the same gate.
#[derive(Debug)]
pub struct RequestTicket {
    generation: u64,
    token: CancellationToken,
    gate: Arc<GateInner>,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// No newer request has been issued since this one.
    pub fn is_current(&self) -> bool {
        !self.token.is_cancelled() && self.gate.generation.load(Ordering::SeqCst) == self.generation
    }

    /// Keep `value` only if this ticket is still current.
    pub fn apply<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }

    /// Run `fut` under this ticket: aborted when superseded mid-flight, and
    /// discarded when superseded right as it completes.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, CancelErr>
    where
        F: Future + Send,
        F::Output: Send,
    {
        let output = fut.or_cancel(&self.token).await?;
        self.apply(output).ok_or(CancelErr::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::sleep;

    #[test]
    fn newer_ticket_supersedes_older() {
        let gate = RequestGate::new();
        let first = gate.issue();
        assert!(first.is_current());

        let second = gate.issue();

        assert!(!first.is_current());
        assert!(first.token().is_cancelled());
        assert!(second.is_current());
        assert_eq!(first.apply("stale"), None);
        assert_eq!(second.apply("fresh"), Some("fresh"));
        assert_eq!(gate.current_generation(), second.generation());
    }

    #[test]
    fn cancel_all_invalidates_current_ticket() {
        let gate = RequestGate::new();
        let ticket = gate.issue();
        gate.cancel_all();
        assert!(!ticket.is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_request_is_dropped_when_newer_one_starts() {
        let gate = RequestGate::new();
        let slow = gate.issue();

        let handle = tokio::spawn(async move {
            slow.run(async {
                sleep(Duration::from_millis(100)).await;
                "page 1"
            })
            .await
        });

        sleep(Duration::from_millis(10)).await;
        let fast = gate.issue();
        let fresh = fast.run(async { "page 2" }).await;

        assert_eq!(fresh, Ok("page 2"));
        assert_eq!(handle.await.expect("task panicked"), Err(CancelErr::Cancelled));
    }

    #[tokio::test]
    async fn completed_result_is_discarded_if_superseded_before_apply() {
        let gate = RequestGate::new();
        let ticket = gate.issue();
        let clone = gate.clone();

        let result = ticket
            .run(async move {
                // A newer request arrives while this one is finishing.
                let _newer = clone.issue();
                1
            })
            .await;

        assert!(matches!(
            result,
            Err(CancelErr::Superseded) | Err(CancelErr::Cancelled)
        ));
    }
}
