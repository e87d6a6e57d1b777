use crate::{info, success, types::Account, warning};

/// Stage boundaries of a sync run. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    FetchStarted { account: Account },
    PageFetched { account: Account, fetched: usize },
    FetchCompleted { account: Account, count: usize },
    DiffCompleted { missing: usize },
    WriteStarted { missing: usize, batches: usize },
    BatchWritten { index: usize, written: usize },
    BatchFailed { index: usize, size: usize, reason: String },
}

/// Receives [`SyncEvent`]s while a sync runs.
pub trait SyncProgress: Send + Sync {
    fn on_event(&self, event: &SyncEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl SyncProgress for NoProgress {
    fn on_event(&self, _event: &SyncEvent) {}
}

/// Prints each event through the console macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl SyncProgress for LogProgress {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::FetchStarted { account } => {
                info!("Fetching liked songs of the {} account...", account)
            }
            SyncEvent::PageFetched { .. } => {}
            SyncEvent::FetchCompleted { account, count } => {
                success!("Fetched {} liked songs from the {} account", count, account)
            }
            SyncEvent::DiffCompleted { missing } => info!("{} songs missing in target", missing),
            SyncEvent::WriteStarted { missing, batches } => {
                info!("Adding {} songs in {} batches...", missing, batches)
            }
            SyncEvent::BatchWritten { .. } => {}
            SyncEvent::BatchFailed {
                index,
                size,
                reason,
            } => warning!("Batch {} ({} songs) failed: {}", index + 1, size, reason),
        }
    }
}
