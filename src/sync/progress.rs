//! Progress reporting for long-running pipelines.
//!
//! Progress events go over a bounded channel with `try_send`; when the consumer
//! lags the event is dropped and the pipeline keeps going.

use log::trace;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::constants::PROGRESS_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    #[default]
    Idle,
    ReadingMaster,
    Fetching,
    CheckingConflicts,
    Importing,
    Exporting,
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    pub stage: SyncStage,
    pub processed: usize,
    pub total: usize,
    pub current_item: Option<String>,
}

pub type ProgressSender = mpsc::Sender<SyncProgress>;

/// Create a bounded progress channel.
pub fn progress_channel() -> (ProgressSender, mpsc::Receiver<SyncProgress>) {
    mpsc::channel(PROGRESS_CHANNEL_CAPACITY)
}

/// Tracks the latest progress of one pipeline call and forwards it to an
/// optional listener.
#[derive(Debug, Default)]
pub struct ProgressReporter {
    sender: Option<ProgressSender>,
    current: SyncProgress,
}

impl ProgressReporter {
    pub fn new(sender: Option<ProgressSender>) -> Self {
        Self {
            sender,
            current: SyncProgress::default(),
        }
    }

    pub fn update(&mut self, stage: SyncStage, processed: usize, total: usize, current_item: Option<&str>) {
        self.current = SyncProgress {
            stage,
            processed,
            total,
            current_item: current_item.map(str::to_string),
        };

        if let Some(sender) = &self.sender {
            match sender.try_send(self.current.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => trace!("Progress listener lagging, event dropped"),
                // Nobody is listening anymore
                Err(TrySendError::Closed(_)) => self.sender = None,
            }
        }
    }

    /// Mark the pipeline complete and return the final progress.
    pub fn finish(&mut self, total: usize) -> SyncProgress {
        self.update(SyncStage::Complete, total, total, None);
        self.current.clone()
    }

    #[cfg(test)]
    fn current(&self) -> &SyncProgress {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_forwarded() {
        let (tx, mut rx) = progress_channel();
        let mut reporter = ProgressReporter::new(Some(tx));

        reporter.update(SyncStage::Fetching, 1, 3, Some("Austin, TX"));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.stage, SyncStage::Fetching);
        assert_eq!(event.current_item.as_deref(), Some("Austin, TX"));
    }

    #[tokio::test]
    async fn test_full_channel_drops_events_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut reporter = ProgressReporter::new(Some(tx));

        reporter.update(SyncStage::Fetching, 1, 3, None);
        reporter.update(SyncStage::Fetching, 2, 3, None);
        let final_progress = reporter.finish(3);

        assert_eq!(final_progress.stage, SyncStage::Complete);
        assert_eq!(rx.recv().await.unwrap().processed, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_listener_is_ignored() {
        let (tx, rx) = progress_channel();
        drop(rx);
        let mut reporter = ProgressReporter::new(Some(tx));
        reporter.update(SyncStage::Importing, 0, 1, None);
        assert_eq!(reporter.current().stage, SyncStage::Importing);
    }
}
