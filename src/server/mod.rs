// HTTP API server
// A thin router over the search collaborator and the file-backed favorites
// store. Responses mirror the browser client's expectations: successes are
// `{success, data, ...}` envelopes, failures are `{error}` with a 4xx/5xx
// status.

pub mod favorites;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::server::favorites::{Favorite, FavoritePayload, FavoritesError, FavoritesStore};
use crate::track::Track;
use crate::youtube::service::YouTubeService;

#[derive(Clone)]
pub struct AppState {
    pub youtube: Arc<YouTubeService>,
    pub favorites: Arc<FavoritesStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/video/:id", get(video_details))
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/:id", delete(remove_favorite))
        .route("/api/download/:video_id", get(download_info))
        .with_state(state)
}

/// Validation failures, conflicts, missing targets, and upstream trouble;
/// everything a handler can hand back besides a success envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ListResponse<T> {
    success: bool,
    data: Vec<T>,
    count: usize,
}

#[derive(Debug, Serialize)]
struct ItemResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadResponse {
    success: bool,
    video_id: String,
    youtube_url: String,
    message: String,
    suggestions: Vec<DownloadSuggestion>,
}

#[derive(Serialize)]
struct DownloadSuggestion {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn root() -> &'static str {
    "tubeplayer API is running. Try /api/search?q=...&max=20"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp_millis(),
    })
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    max: Option<i64>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListResponse<Track>>, ApiError> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter \"q\" is required".into()))?
        .to_string();

    let max = params.max.unwrap_or(100);
    if !(1..=100).contains(&max) {
        return Err(ApiError::BadRequest(
            "Parameter \"max\" must be between 1 and 100".into(),
        ));
    }

    match state.youtube.search_videos(&query, max as usize).await {
        Ok(videos) => Ok(Json(ListResponse {
            success: true,
            count: videos.len(),
            data: videos,
        })),
        Err(err) => {
            error!("search error: {err:#}");
            Err(ApiError::Upstream(format!("Failed to search videos: {err}")))
        }
    }
}

async fn video_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse<Track>>, ApiError> {
    match state.youtube.get_video_details(&id).await {
        Ok(video) => Ok(Json(ItemResponse {
            success: true,
            data: video,
        })),
        Err(err) => {
            error!("video details error: {err:#}");
            Err(ApiError::Upstream(format!(
                "Failed to get video details: {err}"
            )))
        }
    }
}

async fn list_favorites(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<Favorite>>, ApiError> {
    match state.favorites.list().await {
        Ok(favorites) => Ok(Json(ListResponse {
            success: true,
            count: favorites.len(),
            data: favorites,
        })),
        Err(err) => {
            error!("error reading favorites: {err:#}");
            Err(ApiError::Upstream("Failed to read favorites".into()))
        }
    }
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(payload): Json<FavoritePayload>,
) -> Result<Json<ItemResponse<Favorite>>, ApiError> {
    let id = payload.id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty());
    let title = payload
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty());
    let (Some(id), Some(title)) = (id, title) else {
        return Err(ApiError::BadRequest(
            "Video ID and title are required".into(),
        ));
    };

    match state
        .favorites
        .add(id, title, payload.thumbnail, payload.channel)
        .await
    {
        Ok(favorite) => Ok(Json(ItemResponse {
            success: true,
            data: favorite,
        })),
        Err(FavoritesError::Duplicate) => {
            Err(ApiError::Conflict("Video already in favorites".into()))
        }
        Err(err) => {
            error!("error adding favorite: {err:#}");
            Err(ApiError::Upstream("Failed to add favorite".into()))
        }
    }
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.favorites.remove(&id).await {
        Ok(()) => Ok(Json(MessageResponse {
            success: true,
            message: "Video removed from favorites".into(),
        })),
        Err(FavoritesError::NotFound) => {
            Err(ApiError::NotFound("Video not found in favorites".into()))
        }
        Err(err) => {
            error!("error removing favorite: {err:#}");
            Err(ApiError::Upstream("Failed to remove favorite".into()))
        }
    }
}

// YouTube does not allow direct downloads from the web; this hands the user
// the watch URL plus pointers at external tools, nothing more.
async fn download_info(Path(video_id): Path<String>) -> Result<Json<DownloadResponse>, ApiError> {
    let video_id = video_id.trim().to_string();
    if video_id.is_empty() {
        return Err(ApiError::BadRequest("Video ID is required".into()));
    }

    let youtube_url = format!("https://www.youtube.com/watch?v={video_id}");
    Ok(Json(DownloadResponse {
        success: true,
        video_id,
        message: "Use external tools to download".into(),
        suggestions: vec![
            DownloadSuggestion {
                name: "yt-dlp".into(),
                url: Some("https://github.com/yt-dlp/yt-dlp".into()),
                link: None,
            },
            DownloadSuggestion {
                name: "4K Video Downloader".into(),
                url: Some("https://www.4kdownload.com/".into()),
                link: None,
            },
            DownloadSuggestion {
                name: "Copy link and paste to downloader".into(),
                url: None,
                link: Some(youtube_url.clone()),
            },
        ],
        youtube_url,
    }))
}
