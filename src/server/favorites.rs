// File-backed favorites store
// A flat JSON array of favorites, one file for the whole server. Uniqueness
// is enforced by video id: a duplicate add is an error, not a replace.
// Read-modify-write cycles are serialized behind a mutex so concurrent
// handlers cannot interleave writes.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Request body for adding a favorite. Everything is optional at the serde
/// level so presence checks produce the API's own 400 instead of a
/// deserialize rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritePayload {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("Video already in favorites")]
    Duplicate,
    #[error("Video not found in favorites")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub struct FavoritesStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(path: PathBuf) -> Self {
        FavoritesStore {
            path,
            lock: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Result<Vec<Favorite>, FavoritesError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn add(&self, id: String, title: String, thumbnail: Option<String>, channel: Option<String>) -> Result<Favorite, FavoritesError> {
        let _guard = self.lock.lock().await;
        let mut favorites = self.read().await?;

        if favorites.iter().any(|favorite| favorite.id == id) {
            return Err(FavoritesError::Duplicate);
        }

        let favorite = Favorite {
            id,
            title,
            thumbnail,
            channel,
            added_at: Utc::now(),
        };
        favorites.push(favorite.clone());
        self.write(&favorites).await?;
        Ok(favorite)
    }

    pub async fn remove(&self, id: &str) -> Result<(), FavoritesError> {
        let _guard = self.lock.lock().await;
        let favorites = self.read().await?;

        let remaining: Vec<Favorite> = favorites
            .iter()
            .filter(|favorite| favorite.id != id)
            .cloned()
            .collect();
        if remaining.len() == favorites.len() {
            return Err(FavoritesError::NotFound);
        }

        self.write(&remaining).await?;
        Ok(())
    }

    // A missing file reads as an empty list; it appears on the first write.
    async fn read(&self) -> Result<Vec<Favorite>, FavoritesError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context("failed to read favorites file")
                    .into())
            }
        };
        let favorites =
            serde_json::from_str(&data).context("failed to parse favorites file")?;
        Ok(favorites)
    }

    async fn write(&self, favorites: &[Favorite]) -> Result<(), FavoritesError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("failed to create favorites directory")?;
        }
        let json =
            serde_json::to_string_pretty(favorites).context("failed to serialize favorites")?;
        tokio::fs::write(&self.path, json)
            .await
            .context("failed to write favorites file")?;
        Ok(())
    }
}
