use async_trait::async_trait;

use super::{LikedTracksApi, SpotifyClient};
use crate::{
    error::{RetrievalError, WriteChunkError},
    types::{LikedPage, SaveTracksRequest, SavedTracksResponse, TrackId},
};

impl SpotifyClient {
    fn liked_tracks_url(&self, page_size: usize) -> String {
        format!(
            "{uri}/me/tracks?limit={limit}&offset=0",
            uri = self.api_url,
            limit = page_size
        )
    }
}

#[async_trait]
impl LikedTracksApi for SpotifyClient {
    async fn fetch_liked_page(
        &self,
        token: &str,
        next: Option<&str>,
        page_size: usize,
    ) -> Result<LikedPage, RetrievalError> {
        let url = match next {
            Some(next) => next.to_string(),
            None => self.liked_tracks_url(page_size),
        };

        let response = match self.http.get(&url).bearer_auth(token).send().await {
            Ok(resp) => resp,
            Err(source) => return Err(RetrievalError::Transport { url, source }),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status { url, status });
        }

        match response.json::<SavedTracksResponse>().await {
            Ok(page) => Ok(page.into()),
            Err(e) => Err(RetrievalError::Decode {
                url,
                reason: e.to_string(),
            }),
        }
    }

    async fn save_liked_batch(&self, token: &str, ids: &[TrackId]) -> Result<(), WriteChunkError> {
        let body = SaveTracksRequest {
            ids: ids.iter().map(|id| id.as_str().to_string()).collect(),
        };

        let response = self
            .http
            .put(format!("{uri}/me/tracks", uri = self.api_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|source| WriteChunkError::Transport {
                size: ids.len(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WriteChunkError::Status {
                size: ids.len(),
                status,
            });
        }

        Ok(())
    }
}
