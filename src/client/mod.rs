// API clients
// reqwest wrappers over the server endpoints, plus the shared error-body
// shape. The server reports failures as `{error: "..."}`.

pub mod favorites;
pub mod search;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Pulls the server's error message out of a failed response, falling back
/// to the HTTP status when the body is not the expected shape.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody { error: Some(msg) }) => msg,
        _ => format!("request failed with status {status}"),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
    pub video_id: String,
    pub youtube_url: String,
    #[serde(default)]
    pub suggestions: Vec<DownloadSuggestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSuggestion {
    pub name: String,
    pub url: Option<String>,
    pub link: Option<String>,
}

/// Looks up the external-download hand-off for a video: the watch URL plus
/// tool suggestions. The app deliberately stops at handing this to the user.
pub async fn fetch_download_info(
    http: &reqwest::Client,
    base_url: &str,
    video_id: &str,
) -> Result<DownloadInfo> {
    let response = http
        .get(format!("{base_url}/api/download/{video_id}"))
        .send()
        .await
        .context("download info request failed")?;
    if !response.status().is_success() {
        return Err(anyhow!(error_message(response).await));
    }
    response
        .json()
        .await
        .context("invalid download info response")
}
