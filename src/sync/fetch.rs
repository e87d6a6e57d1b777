use std::collections::HashSet;

use crate::{
    error::RetrievalError,
    spotify::LikedTracksApi,
    types::{Account, LikedCollection},
};

use super::progress::{SyncEvent, SyncProgress};

/// Retrieves the complete liked collection of one account by following the
/// `next` pointers until the last page.
///
/// All or nothing: the first failing page aborts the fetch and the pages
/// collected so far are dropped. A `next` pointer that was already followed
/// fails with [`RetrievalError::RepeatedPage`].
pub async fn fetch_liked_collection<A>(
    api: &A,
    token: &str,
    account: Account,
    page_size: usize,
    progress: &dyn SyncProgress,
) -> Result<LikedCollection, RetrievalError>
where
    A: LikedTracksApi + ?Sized,
{
    progress.on_event(&SyncEvent::FetchStarted { account });

    let mut collection = LikedCollection::new();
    let mut next: Option<String> = None;
    let mut visited: HashSet<String> = HashSet::new();

    loop {
        let page = api.fetch_liked_page(token, next.as_deref(), page_size).await?;
        collection.extend(page.track_ids);
        progress.on_event(&SyncEvent::PageFetched {
            account,
            fetched: collection.len(),
        });

        match page.next {
            Some(url) if !url.is_empty() => {
                if !visited.insert(url.clone()) {
                    return Err(RetrievalError::RepeatedPage { url });
                }
                next = Some(url);
            }
            _ => break,
        }
    }

    progress.on_event(&SyncEvent::FetchCompleted {
        account,
        count: collection.len(),
    });
    Ok(collection)
}
