//! Fixed-delay, single-retry wrapper around a [`SheetClient`].

use log::warn;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{SheetClient, SheetValues, SheetsError};
use crate::constants::LOG_QUOTA_RETRY;

/// Paces every call to the spreadsheet API and retries quota failures once.
///
/// Each call is preceded by `delay`. When the call fails with a quota error the
/// client waits `delay` again and retries exactly once; a second failure is
/// returned to the caller unchanged. There is no exponential backoff.
#[derive(Clone)]
pub struct RateLimitedClient {
    inner: Arc<dyn SheetClient>,
    delay: Duration,
}

impl RateLimitedClient {
    pub fn new(inner: Arc<dyn SheetClient>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn client_type(&self) -> &str {
        self.inner.client_type()
    }

    pub async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<String>, SheetsError> {
        self.call("list_tabs", move || self.inner.list_tabs(spreadsheet_id))
            .await
    }

    pub async fn read_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<SheetValues, SheetsError> {
        self.call("read_tab", move || self.inner.read_tab(spreadsheet_id, tab))
            .await
    }

    pub async fn write_tab(&self, spreadsheet_id: &str, tab: &str, values: &SheetValues) -> Result<(), SheetsError> {
        self.call("write_tab", move || self.inner.write_tab(spreadsheet_id, tab, values))
            .await
    }

    pub async fn clear_tab(&self, spreadsheet_id: &str, tab: &str) -> Result<(), SheetsError> {
        self.call("clear_tab", move || self.inner.clear_tab(spreadsheet_id, tab))
            .await
    }

    /// Resolve the name of a spreadsheet's first tab.
    pub async fn first_tab(&self, spreadsheet_id: &str) -> Result<String, SheetsError> {
        self.list_tabs(spreadsheet_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SheetsError::RangeParse {
                range: format!("first tab of spreadsheet {}", spreadsheet_id),
            })
    }

    async fn call<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, SheetsError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, SheetsError>>,
    {
        self.pause().await;
        match op().await {
            Err(err) if err.is_quota() => {
                warn!("{} ({}): {}", LOG_QUOTA_RETRY, operation, err);
                self.pause().await;
                op().await
            }
            result => result,
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
