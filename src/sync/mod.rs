//! # Sync Module
//!
//! One-way copy of liked songs from a source account into a target account.
//!
//! ```text
//! fetch source ─┐
//!               ├─> diff ─> write missing in paced batches ─> SyncSummary
//! fetch target ─┘
//! ```
//!
//! Every run starts from scratch and owns all of its state. The two fetches
//! run one after the other, never concurrently.
//!
//! Failure handling is asymmetric. A page that cannot be fetched aborts the
//! run before anything is written. A batch that cannot be written only lowers
//! the `added` count of the summary.

mod diff;
mod fetch;
mod progress;
mod write;

pub use diff::missing_tracks;
pub use fetch::fetch_liked_collection;
pub use progress::{LogProgress, NoProgress, SyncEvent, SyncProgress};
pub use write::{batch_count, write_in_batches};

use crate::{
    config::SyncSettings,
    error::SyncError,
    spotify::LikedTracksApi,
    types::{Account, LikedCollection, SyncPlan, SyncSummary},
};

pub const SYNC_COMPLETED: &str = "Sync complete!";

static NO_PROGRESS: NoProgress = NoProgress;

/// Runs syncs against one [`LikedTracksApi`].
pub struct SyncEngine<'a, A: ?Sized> {
    api: &'a A,
    settings: SyncSettings,
    progress: &'a dyn SyncProgress,
}

impl<'a, A> SyncEngine<'a, A>
where
    A: LikedTracksApi + ?Sized,
{
    pub fn new(api: &'a A, settings: SyncSettings) -> Self {
        SyncEngine {
            api,
            settings,
            progress: &NO_PROGRESS,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn SyncProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches both collections and computes what the target is missing,
    /// without writing anything.
    pub async fn plan(&self, source_token: &str, target_token: &str) -> Result<SyncPlan, SyncError> {
        let source = self.fetch(source_token, Account::Source).await?;
        let target = self.fetch(target_token, Account::Target).await?;

        let missing = missing_tracks(&source, &target);
        self.progress.on_event(&SyncEvent::DiffCompleted {
            missing: missing.len(),
        });

        Ok(SyncPlan {
            source_count: source.len(),
            target_count: target.len(),
            missing,
        })
    }

    /// Copies every liked song of the source account that the target account
    /// lacks.
    ///
    /// `added` in the result is what the platform accepted, which is less
    /// than the number of missing songs when batches fail.
    pub async fn sync(&self, source_token: &str, target_token: &str) -> Result<SyncSummary, SyncError> {
        let plan = self.plan(source_token, target_token).await?;
        Ok(self.apply(target_token, &plan).await)
    }

    /// Writes the missing songs of `plan` into the target account.
    ///
    /// A plan without missing songs writes nothing and reports the accounts
    /// as already in sync.
    pub async fn apply(&self, target_token: &str, plan: &SyncPlan) -> SyncSummary {
        if plan.missing.is_empty() {
            return SyncSummary::already_in_sync();
        }

        let batch_size = self.settings.batch_size;
        self.progress.on_event(&SyncEvent::WriteStarted {
            missing: plan.missing.len(),
            batches: batch_count(plan.missing.len(), batch_size),
        });

        let outcomes = write_in_batches(
            self.api,
            target_token,
            &plan.missing,
            batch_size,
            self.settings.pacing,
            self.progress,
        )
        .await;
        let added: usize = outcomes.iter().map(|o| o.written).sum();

        SyncSummary {
            message: SYNC_COMPLETED.to_string(),
            added,
            source_songs: Some(plan.source_count),
            target_songs: Some(plan.target_count + added),
        }
    }

    async fn fetch(&self, token: &str, account: Account) -> Result<LikedCollection, SyncError> {
        fetch_liked_collection(self.api, token, account, self.settings.page_size, self.progress)
            .await
            .map_err(|source| SyncError::Retrieval { account, source })
    }
}
