use crate::OrCancelExt;
use crate::gate::RequestGate;
use std::time::Duration;

/// Lets a value through only once no newer value arrived for `window`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    gate: RequestGate,
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            gate: RequestGate::new(),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Wait out the quiet window. `None` means a later call superseded this
    /// one.
    pub async fn settle<T: Send>(&self, value: T) -> Option<T> {
        let ticket = self.gate.issue();
        match tokio::time::sleep(self.window).or_cancel(ticket.token()).await {
            Ok(()) => ticket.apply(value),
            Err(_) => None,
        }
    }
}
