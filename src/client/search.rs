// Search client
// Talks to /api/search and window-paginates the cached result set locally.
// Each search is tagged with a monotonic token so a slow request resolving
// late cannot clobber the results of a newer one.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::client::error_message;
use crate::track::Track;

pub const ITEMS_PER_PAGE: usize = 20;

pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
    results: Vec<Track>,
    // 1-based, like the page numbers shown to the user.
    page: usize,
    latest_token: u64,
    applied_token: u64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    data: Vec<Track>,
}

impl SearchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        SearchClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            results: Vec::new(),
            page: 1,
            latest_token: 0,
            applied_token: 0,
        }
    }

    /// Runs a search and replaces the cached result set. Empty queries are
    /// rejected before any network traffic.
    pub async fn perform_search(&mut self, query: &str, max_results: usize) -> Result<&[Track]> {
        let query = query.trim();
        if query.is_empty() {
            return Err(anyhow!("search query cannot be empty"));
        }

        let token = self.begin_search();
        let response = self
            .http
            .get(format!("{}/api/search", self.base_url))
            .query(&[("q", query), ("max", &max_results.to_string())])
            .send()
            .await
            .context("search request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!(error_message(response).await));
        }

        let body: SearchBody = response.json().await.context("invalid search response")?;
        self.apply_results(token, body.data);
        Ok(&self.results)
    }

    /// Tags an in-flight search. The completion hands the token back to
    /// `apply_results`, which only accepts the most recently begun search.
    pub fn begin_search(&mut self) -> u64 {
        self.latest_token += 1;
        self.latest_token
    }

    /// Installs a completed result set and resets to the first page.
    /// Returns false (and changes nothing) for a stale completion.
    pub fn apply_results(&mut self, token: u64, results: Vec<Track>) -> bool {
        if token != self.latest_token || token <= self.applied_token {
            return false;
        }
        self.applied_token = token;
        self.results = results;
        self.page = 1;
        true
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    pub fn paginated_results(&self) -> &[Track] {
        let start = (self.page - 1) * ITEMS_PER_PAGE;
        if start >= self.results.len() {
            return &[];
        }
        let end = (start + ITEMS_PER_PAGE).min(self.results.len());
        &self.results[start..end]
    }

    pub fn total_pages(&self) -> usize {
        self.results.len().div_ceil(ITEMS_PER_PAGE)
    }

    pub fn current_page(&self) -> usize {
        self.page
    }

    /// No-op outside `1..=total_pages`, so callers can pass user input
    /// straight through.
    pub fn go_to_page(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages() {
            self.page = page;
        }
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page.saturating_sub(1));
    }

    pub fn video_by_id(&self, id: &str) -> Option<&Track> {
        self.results.iter().find(|track| track.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(format!("id-{i}"), format!("track {i}"), "channel"))
            .collect()
    }

    fn client_with(n: usize) -> SearchClient {
        let mut client = SearchClient::new("http://localhost:3000");
        let token = client.begin_search();
        client.apply_results(token, tracks(n));
        client
    }

    #[test]
    fn pagination_windows_the_cached_results() {
        let mut client = client_with(45);
        assert_eq!(client.total_pages(), 3);
        assert_eq!(client.paginated_results().len(), 20);
        assert_eq!(client.paginated_results()[0].id, "id-0");

        client.next_page();
        assert_eq!(client.paginated_results()[0].id, "id-20");

        client.go_to_page(3);
        assert_eq!(client.paginated_results().len(), 5);
        assert_eq!(client.paginated_results()[0].id, "id-40");
    }

    #[test]
    fn page_navigation_clamps_at_both_ends() {
        let mut client = client_with(45);
        client.previous_page();
        assert_eq!(client.current_page(), 1);

        client.go_to_page(3);
        client.next_page();
        assert_eq!(client.current_page(), 3);

        client.go_to_page(0);
        client.go_to_page(99);
        assert_eq!(client.current_page(), 3);
    }

    #[test]
    fn a_new_result_set_resets_to_the_first_page() {
        let mut client = client_with(45);
        client.go_to_page(3);

        let token = client.begin_search();
        assert!(client.apply_results(token, tracks(5)));
        assert_eq!(client.current_page(), 1);
        assert_eq!(client.total_pages(), 1);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut client = SearchClient::new("http://localhost:3000");

        // Two overlapping searches: the first one resolves last.
        let slow = client.begin_search();
        let fast = client.begin_search();

        assert!(client.apply_results(fast, tracks(3)));
        assert!(!client.apply_results(slow, tracks(30)));

        assert_eq!(client.results().len(), 3);
        assert_eq!(client.total_pages(), 1);
    }

    #[test]
    fn a_token_cannot_apply_twice() {
        let mut client = SearchClient::new("http://localhost:3000");
        let token = client.begin_search();
        assert!(client.apply_results(token, tracks(2)));
        assert!(!client.apply_results(token, tracks(10)));
        assert_eq!(client.results().len(), 2);
    }

    #[test]
    fn lookup_by_id_hits_the_cache() {
        let client = client_with(5);
        assert_eq!(client.video_by_id("id-3").unwrap().title, "track 3");
        assert!(client.video_by_id("missing").is_none());
    }

    #[test]
    fn empty_results_paginate_to_nothing() {
        let client = client_with(0);
        assert_eq!(client.total_pages(), 0);
        assert!(client.paginated_results().is_empty());
    }
}
