//! Paged, searchable catalog that never applies a stale response.

use crate::client::RecordFetcher;
use crate::errors::Result;
use crate::types::Page;
use holocron_async_utils::{Debouncer, RequestGate};
use std::time::Duration;

/// Wraps a fetcher so that only the most recently issued page load (or
/// settled search) yields a result. Superseded loads resolve to `Ok(None)`,
/// including ones that failed.
#[derive(Debug)]
pub struct Catalog<F> {
    fetcher: F,
    gate: RequestGate,
    debouncer: Debouncer,
}

impl<F: RecordFetcher> Catalog<F> {
    pub fn new(fetcher: F, debounce: Duration) -> Self {
        Self {
            fetcher,
            gate: RequestGate::new(),
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn load_page(&self, page: u32, search: &str) -> Result<Option<Page<F::Record>>> {
        let ticket = self.gate.issue();
        match ticket.run(self.fetcher.fetch_page(page, search)).await {
            Ok(result) => result.map(Some),
            Err(reason) => {
                tracing::debug!(
                    generation = ticket.generation(),
                    ?reason,
                    page,
                    "Dropping superseded page load"
                );
                Ok(None)
            }
        }
    }

    /// Wait for the search text to settle, then load its first page.
    pub async fn search(&self, text: &str) -> Result<Option<Page<F::Record>>> {
        let Some(text) = self.debouncer.settle(text.to_string()).await else {
            return Ok(None);
        };
        self.load_page(1, &text).await
    }
}
