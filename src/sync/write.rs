use std::time::Duration;

use tokio::time::sleep;

use crate::{
    spotify::LikedTracksApi,
    types::{BatchWriteOutcome, TrackId},
};

use super::progress::{SyncEvent, SyncProgress};

/// Number of save requests needed for `missing` ids.
pub fn batch_count(missing: usize, batch_size: usize) -> usize {
    missing.div_ceil(batch_size.max(1))
}

/// Saves `ids` into the target account in consecutive batches of at most
/// `batch_size`, sleeping `pacing` between two requests.
///
/// A failed batch is reported and counted as zero written; the remaining
/// batches are still attempted.
pub async fn write_in_batches<A>(
    api: &A,
    token: &str,
    ids: &[TrackId],
    batch_size: usize,
    pacing: Duration,
    progress: &dyn SyncProgress,
) -> Vec<BatchWriteOutcome>
where
    A: LikedTracksApi + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut outcomes = Vec::with_capacity(batch_count(ids.len(), batch_size));

    for (index, chunk) in ids.chunks(batch_size).enumerate() {
        if index > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        let written = match api.save_liked_batch(token, chunk).await {
            Ok(()) => {
                progress.on_event(&SyncEvent::BatchWritten {
                    index,
                    written: chunk.len(),
                });
                chunk.len()
            }
            Err(e) => {
                progress.on_event(&SyncEvent::BatchFailed {
                    index,
                    size: chunk.len(),
                    reason: e.to_string(),
                });
                0
            }
        };

        outcomes.push(BatchWriteOutcome { index, written });
    }

    outcomes
}
