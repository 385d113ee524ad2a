// Favorites client
// Mirrors the server-side favorites list in a local cache so membership
// checks are instant; the cache is refreshed on load and patched locally
// after each successful add/remove.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::client::error_message;
use crate::server::favorites::Favorite;
use crate::track::Track;

#[derive(Debug, Error)]
pub enum FavoritesClientError {
    #[error("Video already in favorites")]
    Conflict,
    #[error("Video not found in favorites")]
    NotFound,
    #[error("{0}")]
    Api(String),
    #[error("favorites request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct FavoritesClient {
    http: reqwest::Client,
    base_url: String,
    cached: Vec<Favorite>,
}

impl FavoritesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        FavoritesClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            cached: Vec::new(),
        }
    }

    /// Refreshes the cache from the server.
    pub async fn load(&mut self) -> Result<&[Favorite], FavoritesClientError> {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            data: Vec<Favorite>,
        }

        let response = self
            .http
            .get(format!("{}/api/favorites", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FavoritesClientError::Api(error_message(response).await));
        }

        let body: Body = response.json().await?;
        self.cached = body.data;
        Ok(&self.cached)
    }

    pub async fn add(&mut self, track: &Track) -> Result<Favorite, FavoritesClientError> {
        #[derive(Deserialize)]
        struct Body {
            data: Favorite,
        }

        let payload = json!({
            "id": track.id,
            "title": track.title,
            "thumbnail": track.thumbnail,
            "channel": track.channel,
        });
        let response = self
            .http
            .post(format!("{}/api/favorites", self.base_url))
            .json(&payload)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(FavoritesClientError::Conflict);
        }
        if !response.status().is_success() {
            return Err(FavoritesClientError::Api(error_message(response).await));
        }

        let body: Body = response.json().await?;
        self.cached.push(body.data.clone());
        Ok(body.data)
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), FavoritesClientError> {
        let response = self
            .http
            .delete(format!("{}/api/favorites/{id}", self.base_url))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FavoritesClientError::NotFound);
        }
        if !response.status().is_success() {
            return Err(FavoritesClientError::Api(error_message(response).await));
        }

        self.cached.retain(|favorite| favorite.id != id);
        Ok(())
    }

    /// Answered from the cache; call `load` first for server truth.
    pub fn is_favorite(&self, id: &str) -> bool {
        self.cached.iter().any(|favorite| favorite.id == id)
    }

    /// Add-if-absent / remove-if-present. Returns the new membership.
    pub async fn toggle(&mut self, track: &Track) -> Result<bool, FavoritesClientError> {
        if self.is_favorite(&track.id) {
            self.remove(&track.id).await?;
            Ok(false)
        } else {
            self.add(track).await?;
            Ok(true)
        }
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.cached
    }

    pub fn favorite_by_id(&self, id: &str) -> Option<&Favorite> {
        self.cached.iter().find(|favorite| favorite.id == id)
    }
}

impl From<&Favorite> for Track {
    fn from(favorite: &Favorite) -> Self {
        Track {
            thumbnail: favorite.thumbnail.clone(),
            channel: favorite.channel.clone().unwrap_or_else(|| "Unknown".into()),
            ..Track::new(favorite.id.clone(), favorite.title.clone(), "")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn membership_checks_hit_the_cache() {
        let mut client = FavoritesClient::new("http://localhost:3000");
        client.cached.push(Favorite {
            id: "abc".into(),
            title: "A Song".into(),
            thumbnail: None,
            channel: Some("Channel".into()),
            added_at: Utc::now(),
        });

        assert!(client.is_favorite("abc"));
        assert!(!client.is_favorite("xyz"));
        assert_eq!(client.favorite_by_id("abc").unwrap().title, "A Song");
    }

    #[test]
    fn favorite_converts_to_a_playable_track() {
        let favorite = Favorite {
            id: "abc".into(),
            title: "A Song".into(),
            thumbnail: Some("thumb.jpg".into()),
            channel: None,
            added_at: Utc::now(),
        };
        let track = Track::from(&favorite);
        assert_eq!(track.id, "abc");
        assert_eq!(track.channel, "Unknown");
        assert_eq!(track.thumbnail.as_deref(), Some("thumb.jpg"));
    }
}
