//! Async plumbing for fetches that can be superseded.
//!
//! - [`OrCancelExt`] races a future against a `CancellationToken`
//! - [`RequestGate`] hands out generation tickets so only the newest request
//!   may apply its result
//! - [`Debouncer`] waits for input to settle before letting a value through

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod debounce;
mod gate;

pub use debounce::Debouncer;
pub use gate::{RequestGate, RequestTicket};

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Why a cancellable operation did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelErr {
    /// The token fired before the future completed
    Cancelled,
    /// The future completed, but a newer request had already been issued
    Superseded,
}

/// Extension trait for making futures cancellable.
#[async_trait]
pub trait OrCancelExt: Sized {
    type Output;

    /// Returns `Ok(output)` if the future completes first, or
    /// `Err(CancelErr::Cancelled)` if the token is cancelled.
    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr>;
}

#[async_trait]
impl<F> OrCancelExt for F
where
    F: Future + Send,
    F::Output: Send,
{
    type Output = F::Output;

    async fn or_cancel(self, token: &CancellationToken) -> Result<Self::Output, CancelErr> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(CancelErr::Cancelled),
            res = self => Ok(res),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn completes_when_token_stays_live() {
        let token = CancellationToken::new();
        let result = async { "page-1" }.or_cancel(&token).await;
        assert_eq!(Ok("page-1"), result);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_wins_the_race() {
        let token = CancellationToken::new();
        let trigger = token.clone();

        let cancel = tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = async {
            sleep(Duration::from_millis(100)).await;
            7
        }
        .or_cancel(&token)
        .await;

        cancel.await.expect("cancel task panicked");
        assert_eq!(Err(CancelErr::Cancelled), result);
    }

    #[tokio::test]
    async fn already_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();

        let result = async { 5 }.or_cancel(&token).await;

        assert_eq!(Err(CancelErr::Cancelled), result);
    }
}
