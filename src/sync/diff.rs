use std::collections::HashSet;

use crate::types::TrackId;

/// Tracks of `source` that are not in `target`, in source order.
///
/// Membership is exact id equality. Duplicates inside `source` are kept as
/// they are.
pub fn missing_tracks(source: &[TrackId], target: &[TrackId]) -> Vec<TrackId> {
    let present: HashSet<&TrackId> = target.iter().collect();
    source
        .iter()
        .filter(|id| !present.contains(id))
        .cloned()
        .collect()
}
