// YouTube search collaborator
// Shells out to yt-dlp for search and video lookup; each JSON document on
// stdout becomes one Track. Subprocess calls run in a blocking task so they
// never stall the async runtime.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::process::Command;
use tracing::debug;

use crate::track::Track;

pub struct YouTubeService;

impl YouTubeService {
    pub fn new() -> Self {
        YouTubeService
    }

    pub async fn search_videos(&self, query: &str, max_results: usize) -> Result<Vec<Track>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(anyhow!("search query cannot be empty"));
        }

        let tracks = tokio::task::spawn_blocking(move || search_blocking(&query, max_results))
            .await
            .context("search task panicked")??;
        debug!("search returned {} results", tracks.len());
        Ok(tracks)
    }

    pub async fn get_video_details(&self, video_id: &str) -> Result<Track> {
        let video_id = video_id.trim().to_string();
        if video_id.is_empty() {
            return Err(anyhow!("video id cannot be empty"));
        }

        tokio::task::spawn_blocking(move || video_details_blocking(&video_id))
            .await
            .context("video lookup task panicked")?
    }
}

impl Default for YouTubeService {
    fn default() -> Self {
        YouTubeService::new()
    }
}

fn search_blocking(query: &str, max_results: usize) -> Result<Vec<Track>> {
    let output = Command::new("yt-dlp")
        .arg("--dump-json")
        .arg("--skip-download")
        .arg("--no-playlist")
        .arg("--default-search")
        .arg("ytsearch")
        .arg(format!("ytsearch{max_results}:{query}"))
        .output()
        .context("failed to run yt-dlp, is it installed?")?;

    if !output.status.success() {
        return Err(anyhow!(
            "yt-dlp search failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let stdout = String::from_utf8(output.stdout).context("yt-dlp produced invalid UTF-8")?;
    let mut tracks = Vec::new();
    for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
        let json: Value =
            serde_json::from_str(line).context("failed to parse yt-dlp search output")?;
        tracks.push(track_from_json(&json));
    }
    Ok(tracks)
}

fn video_details_blocking(video_id: &str) -> Result<Track> {
    let output = Command::new("yt-dlp")
        .arg("-j")
        .arg("--no-playlist")
        .arg(format!("https://www.youtube.com/watch?v={video_id}"))
        .output()
        .context("failed to run yt-dlp, is it installed?")?;

    if !output.status.success() {
        return Err(anyhow!(
            "yt-dlp lookup failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let stdout = String::from_utf8(output.stdout).context("yt-dlp produced invalid UTF-8")?;
    let json: Value =
        serde_json::from_str(stdout.trim()).context("failed to parse yt-dlp video output")?;
    Ok(track_from_json(&json))
}

// Missing metadata degrades to "Unknown"/None rather than failing the whole
// result set; yt-dlp output is not uniform across video kinds.
fn track_from_json(json: &Value) -> Track {
    let id = json["id"].as_str().unwrap_or("").to_string();
    let duration_seconds = json["duration"].as_u64();

    Track {
        url: Some(
            json["webpage_url"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={id}")),
        ),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        thumbnail: json["thumbnail"].as_str().map(str::to_string),
        channel: json["uploader"]
            .as_str()
            .or_else(|| json["channel"].as_str())
            .unwrap_or("Unknown")
            .to_string(),
        channel_url: json["uploader_url"]
            .as_str()
            .or_else(|| json["channel_url"].as_str())
            .map(str::to_string),
        duration: duration_seconds.map(format_timestamp),
        duration_seconds,
        views: json["view_count"].as_u64(),
        description: json["description"].as_str().map(str::to_string),
        id,
    }
}

/// "M:SS" for anything under an hour, "H:MM:SS" above.
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamps_format_like_search_results() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(59), "0:59");
        assert_eq!(format_timestamp(212), "3:32");
        assert_eq!(format_timestamp(3600), "1:00:00");
        assert_eq!(format_timestamp(3725), "1:02:05");
    }

    #[test]
    fn full_metadata_maps_onto_a_track() {
        let json = json!({
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq720.jpg",
            "uploader": "RickAstleyVEVO",
            "uploader_url": "https://www.youtube.com/@RickAstleyVEVO",
            "duration": 212,
            "view_count": 1000000,
            "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "description": "The official video"
        });

        let track = track_from_json(&json);
        assert_eq!(track.id, "dQw4w9WgXcQ");
        assert_eq!(track.title, "Never Gonna Give You Up");
        assert_eq!(track.channel, "RickAstleyVEVO");
        assert_eq!(track.duration.as_deref(), Some("3:32"));
        assert_eq!(track.duration_seconds, Some(212));
        assert_eq!(track.views, Some(1000000));
    }

    #[test]
    fn sparse_metadata_degrades_instead_of_failing() {
        let track = track_from_json(&json!({ "id": "abc123" }));
        assert_eq!(track.id, "abc123");
        assert_eq!(track.title, "Unknown");
        assert_eq!(track.channel, "Unknown");
        assert!(track.duration.is_none());
        assert_eq!(
            track.url.as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }
}
