// Application controller
// The view layer's single entry point: every user action arrives as a typed
// Command and is dispatched through `handle`, which drives the queue
// controller, the API clients, and the playback adapter. The rendering
// surface only reads the accessors; it never touches the collaborators
// directly.
//
// Failures here are never fatal: they become transient status notifications
// and the rest of the app keeps working.

use tracing::warn;

use crate::client::favorites::FavoritesClient;
use crate::client::search::SearchClient;
use crate::client::{fetch_download_info, DownloadInfo};
use crate::player::adapter::{PlaybackAdapter, VideoWidget, WidgetEvent};
use crate::player::queue::QueueController;
use crate::player::store::{QueueStore, VolumeStore};
use crate::track::Track;

const DEFAULT_VOLUME: u32 = 50;
const SEARCH_MAX_RESULTS: usize = 100;

/// Everything a user can do, decoupled from whatever surface renders it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    GoToPage(usize),
    NextPage,
    PreviousPage,
    /// Append the video to the queue and start playing it immediately.
    PlayVideo(String),
    AddToQueue(String),
    PlayFromQueue(usize),
    RemoveFromQueue(usize),
    MoveTrack { from: usize, to: usize },
    ClearQueue,
    PlayPause,
    Next,
    Previous,
    ToggleShuffle,
    CycleRepeat,
    /// Progress-bar position as a percentage, 0-100.
    Seek(f64),
    SetVolume(u32),
    ToggleMute,
    ToggleFavorite(String),
    FavoriteCurrent,
    Download(String),
    DownloadCurrent,
}

/// Playback position sampled by `tick`, for the progress bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub position: f64,
    pub duration: f64,
}

pub struct App<W: VideoWidget> {
    pub queue: QueueController,
    pub search: SearchClient,
    pub favorites: FavoritesClient,
    pub player: PlaybackAdapter<W>,
    http: reqwest::Client,
    base_url: String,
    volume_store: VolumeStore,
    saved_volume: u32,
    status: String,
    progress: Progress,
}

impl<W: VideoWidget> App<W> {
    pub fn new(
        base_url: impl Into<String>,
        widget: W,
        queue_store: Box<dyn QueueStore>,
        volume_store: VolumeStore,
    ) -> Self {
        let base_url = base_url.into();
        let saved_volume = match volume_store.load() {
            Ok(volume) => volume.unwrap_or(DEFAULT_VOLUME),
            Err(err) => {
                warn!("failed to load volume preference: {err:#}");
                DEFAULT_VOLUME
            }
        };

        App {
            queue: QueueController::new(queue_store),
            search: SearchClient::new(base_url.clone()),
            favorites: FavoritesClient::new(base_url.clone()),
            player: PlaybackAdapter::new(widget),
            http: reqwest::Client::new(),
            base_url,
            volume_store,
            saved_volume,
            status: String::new(),
            progress: Progress::default(),
        }
    }

    /// Last toast-style notification.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::Search(query) => self.do_search(&query).await,
            Command::GoToPage(page) => self.search.go_to_page(page),
            Command::NextPage => self.search.next_page(),
            Command::PreviousPage => self.search.previous_page(),
            Command::PlayVideo(id) => self.play_video(&id),
            Command::AddToQueue(id) => self.add_to_queue(&id),
            Command::PlayFromQueue(index) => self.play_from_queue(index),
            Command::RemoveFromQueue(index) => {
                self.queue.remove(index);
                self.notify("Removed from queue");
            }
            Command::MoveTrack { from, to } => self.queue.move_track(from, to),
            Command::ClearQueue => {
                self.queue.clear();
                self.notify("Queue cleared");
            }
            Command::PlayPause => {
                if self.require_player() {
                    self.player.toggle_play_pause();
                }
            }
            Command::Next => {
                if self.require_player() {
                    self.advance();
                }
            }
            Command::Previous => self.step_back(),
            Command::ToggleShuffle => {
                let on = self.queue.toggle_shuffle();
                self.notify(if on { "Shuffle on" } else { "Shuffle off" });
            }
            Command::CycleRepeat => {
                let mode = self.queue.cycle_repeat_mode();
                self.notify(format!("Repeat: {}", format!("{mode:?}").to_lowercase()));
            }
            Command::Seek(percentage) => self.seek(percentage),
            Command::SetVolume(volume) => self.set_volume(volume),
            Command::ToggleMute => self.toggle_mute(),
            Command::ToggleFavorite(id) => self.toggle_favorite_by_id(&id).await,
            Command::FavoriteCurrent => {
                if let Some(track) = self.queue.current_track().cloned() {
                    self.toggle_favorite(&track).await;
                }
            }
            Command::Download(id) => self.download(&id).await,
            Command::DownloadCurrent => {
                match self.queue.current_track().map(|t| t.id.clone()) {
                    Some(id) => self.download(&id).await,
                    None => self.notify("No track is playing"),
                }
            }
        }
    }

    /// Raw widget notifications. `Ready` restores the saved volume; `Ended`
    /// auto-advances to the next track.
    pub fn widget_event(&mut self, event: WidgetEvent) {
        self.player.widget_event(event);
        match event {
            WidgetEvent::Ready => {
                let volume = self.saved_volume;
                self.player.set_volume(volume);
            }
            WidgetEvent::Ended => self.advance(),
            _ => {}
        }
    }

    /// Samples the playback position; called roughly once per second by the
    /// render loop. Reads only.
    pub fn tick(&mut self) {
        if self.player.is_playing() {
            self.progress = Progress {
                position: self.player.current_time(),
                duration: self.player.duration(),
            };
        }
    }

    async fn do_search(&mut self, query: &str) {
        if query.trim().is_empty() {
            self.notify("Please enter a search query");
            return;
        }
        let outcome = self
            .search
            .perform_search(query, SEARCH_MAX_RESULTS)
            .await
            .map(|results| results.len());
        match outcome {
            Ok(count) => self.notify(format!("Found {count} results")),
            Err(err) => self.notify(format!("Search failed: {err}")),
        }
    }

    fn play_video(&mut self, id: &str) {
        if !self.require_player() {
            return;
        }
        let Some(track) = self.find_track(id) else {
            return;
        };
        self.queue.add(track);
        let index = self.queue.len() - 1;
        if let Some(track) = self.queue.play_at(index) {
            self.start_playback(&track);
        }
    }

    fn add_to_queue(&mut self, id: &str) {
        if let Some(track) = self.find_track(id) {
            self.queue.add(track);
            self.notify("Added to queue");
        }
    }

    fn play_from_queue(&mut self, index: usize) {
        if !self.require_player() {
            return;
        }
        if let Some(track) = self.queue.play_at(index) {
            self.start_playback(&track);
        }
    }

    fn advance(&mut self) {
        match self.queue.next() {
            Some(track) => self.start_playback(&track),
            None => {
                self.notify("End of queue");
                self.player.pause();
            }
        }
    }

    fn step_back(&mut self) {
        if !self.require_player() {
            return;
        }
        if let Some(track) = self.queue.previous() {
            self.start_playback(&track);
        }
    }

    fn seek(&mut self, percentage: f64) {
        if !self.require_player() {
            return;
        }
        let duration = self.player.duration();
        self.player
            .seek_to(percentage.clamp(0.0, 100.0) / 100.0 * duration);
    }

    fn set_volume(&mut self, volume: u32) {
        let volume = volume.min(100);
        self.player.set_volume(volume);
        self.saved_volume = volume;
        if let Err(err) = self.volume_store.save(volume) {
            warn!("failed to persist volume preference: {err:#}");
        }
    }

    fn toggle_mute(&mut self) {
        if !self.require_player() {
            return;
        }
        if self.player.is_muted() {
            self.player.unmute();
            let volume = self.saved_volume;
            self.player.set_volume(volume);
        } else {
            self.player.mute();
        }
    }

    async fn toggle_favorite_by_id(&mut self, id: &str) {
        if let Some(track) = self.find_track(id) {
            self.toggle_favorite(&track).await;
        }
    }

    async fn toggle_favorite(&mut self, track: &Track) {
        match self.favorites.toggle(track).await {
            Ok(true) => self.notify("Added to favorites"),
            Ok(false) => self.notify("Removed from favorites"),
            Err(err) => self.notify(format!("Favorites update failed: {err}")),
        }
    }

    // Downloading stops at handing the user an external link: the server
    // only returns the watch URL plus tool suggestions.
    async fn download(&mut self, id: &str) {
        match fetch_download_info(&self.http, &self.base_url, id).await {
            Ok(DownloadInfo { youtube_url, .. }) => {
                if let Err(err) = open::that(&youtube_url) {
                    warn!("failed to open browser: {err}");
                    self.notify(format!("Copy this link to download: {youtube_url}"));
                } else {
                    self.notify("Opened in browser; use an external tool to download");
                }
            }
            Err(err) => self.notify(format!("Download lookup failed: {err}")),
        }
    }

    // Search results first, then the favorites cache, matching where the
    // action buttons live in the UI.
    fn find_track(&self, id: &str) -> Option<Track> {
        self.search
            .video_by_id(id)
            .cloned()
            .or_else(|| self.favorites.favorite_by_id(id).map(Track::from))
    }

    fn start_playback(&mut self, track: &Track) {
        self.player.load(&track.id);
        self.player.play();
        self.notify(format!("Now playing: {}", track.title));
    }

    /// Gate for actions that need the widget; mirrors the "player is still
    /// initializing" toast in the browser build.
    fn require_player(&mut self) -> bool {
        if self.player.is_ready() {
            true
        } else {
            self.notify("Player is still initializing, please wait");
            false
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::store::NullStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct MockWidget {
        log: Rc<RefCell<Vec<String>>>,
        muted: bool,
    }

    impl VideoWidget for MockWidget {
        fn load_video(&mut self, video_id: &str) {
            self.log.borrow_mut().push(format!("load:{video_id}"));
        }
        fn play_video(&mut self) {
            self.log.borrow_mut().push("play".into());
        }
        fn pause_video(&mut self) {
            self.log.borrow_mut().push("pause".into());
        }
        fn seek_to(&mut self, seconds: f64) {
            self.log.borrow_mut().push(format!("seek:{seconds}"));
        }
        fn set_volume(&mut self, volume: u32) {
            self.log.borrow_mut().push(format!("volume:{volume}"));
        }
        fn mute(&mut self) {
            self.muted = true;
        }
        fn unmute(&mut self) {
            self.muted = false;
        }
        fn is_muted(&self) -> bool {
            self.muted
        }
        fn current_time(&self) -> f64 {
            42.0
        }
        fn duration(&self) -> f64 {
            100.0
        }
    }

    fn app_with_widget() -> (App<MockWidget>, Rc<RefCell<Vec<String>>>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let widget = MockWidget {
            log: log.clone(),
            muted: false,
        };
        let app = App::new(
            "http://localhost:3000",
            widget,
            Box::new(NullStore),
            VolumeStore::new(dir.path().join("volume")),
        );
        (app, log, dir)
    }

    fn queue_track(app: &mut App<MockWidget>, id: &str, title: &str) {
        app.queue.add(Track::new(id, title, "channel"));
    }

    #[tokio::test]
    async fn queue_commands_refuse_to_play_before_the_widget_is_ready() {
        let (mut app, log, _dir) = app_with_widget();
        queue_track(&mut app, "abc", "A Song");

        app.handle(Command::PlayFromQueue(0)).await;
        assert!(log.borrow().is_empty());
        assert!(app.status().contains("initializing"));
    }

    #[tokio::test]
    async fn ready_restores_the_saved_volume_and_unlocks_playback() {
        let (mut app, log, _dir) = app_with_widget();
        queue_track(&mut app, "abc", "A Song");

        app.widget_event(WidgetEvent::Ready);
        assert_eq!(log.borrow().as_slice(), ["volume:50"]);

        app.handle(Command::PlayFromQueue(0)).await;
        assert_eq!(log.borrow().as_slice(), ["volume:50", "load:abc", "play"]);
        assert_eq!(app.now_playing().unwrap().id, "abc");
        assert!(app.status().contains("Now playing: A Song"));
    }

    #[tokio::test]
    async fn next_at_the_end_of_the_queue_pauses_playback() {
        let (mut app, log, _dir) = app_with_widget();
        queue_track(&mut app, "abc", "A Song");
        app.widget_event(WidgetEvent::Ready);
        app.handle(Command::PlayFromQueue(0)).await;

        app.handle(Command::Next).await;
        assert_eq!(app.status(), "End of queue");
        assert_eq!(log.borrow().last().unwrap(), "pause");
    }

    #[tokio::test]
    async fn track_ending_auto_advances_to_the_next_one() {
        let (mut app, log, _dir) = app_with_widget();
        queue_track(&mut app, "first", "First");
        queue_track(&mut app, "second", "Second");
        app.widget_event(WidgetEvent::Ready);
        app.handle(Command::PlayFromQueue(0)).await;

        app.widget_event(WidgetEvent::Ended);
        assert_eq!(app.now_playing().unwrap().id, "second");
        assert!(log.borrow().contains(&"load:second".to_string()));
    }

    #[tokio::test]
    async fn seek_translates_percentage_into_seconds() {
        let (mut app, log, _dir) = app_with_widget();
        app.widget_event(WidgetEvent::Ready);
        app.handle(Command::Seek(25.0)).await;
        assert_eq!(log.borrow().last().unwrap(), "seek:25");
    }

    #[tokio::test]
    async fn unmute_restores_the_saved_volume() {
        let (mut app, log, _dir) = app_with_widget();
        app.widget_event(WidgetEvent::Ready);

        app.handle(Command::SetVolume(80)).await;
        app.handle(Command::ToggleMute).await;
        assert!(app.player.is_muted());

        app.handle(Command::ToggleMute).await;
        assert!(!app.player.is_muted());
        assert_eq!(log.borrow().last().unwrap(), "volume:80");
    }

    #[tokio::test]
    async fn volume_preference_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("volume");
        {
            let mut app = App::new(
                "http://localhost:3000",
                MockWidget::default(),
                Box::new(NullStore),
                VolumeStore::new(store_path.clone()),
            );
            app.handle(Command::SetVolume(15)).await;
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut app = App::new(
            "http://localhost:3000",
            MockWidget {
                log: log.clone(),
                muted: false,
            },
            Box::new(NullStore),
            VolumeStore::new(store_path),
        );
        app.widget_event(WidgetEvent::Ready);
        assert_eq!(log.borrow().as_slice(), ["volume:15"]);
    }

    #[tokio::test]
    async fn tick_samples_progress_only_while_playing() {
        let (mut app, _log, _dir) = app_with_widget();
        app.widget_event(WidgetEvent::Ready);

        app.tick();
        assert_eq!(app.progress(), Progress::default());

        app.widget_event(WidgetEvent::Playing);
        app.tick();
        assert_eq!(
            app.progress(),
            Progress {
                position: 42.0,
                duration: 100.0
            }
        );
    }
}
