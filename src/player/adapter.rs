// Playback adapter
// Wraps the embeddable video widget behind a narrow trait and normalizes its
// lifecycle into not-ready -> ready -> (playing <-> paused) -> ended. Every
// control operation is a no-op until the widget reports ready.

use tracing::warn;

/// Control surface of the embedded video widget. The widget itself lives
/// outside the process (an iframe player in the browser build); this trait
/// is what the rest of the player talks to.
pub trait VideoWidget {
    fn load_video(&mut self, video_id: &str);
    fn play_video(&mut self);
    fn pause_video(&mut self);
    fn seek_to(&mut self, seconds: f64);
    /// Volume in 0-100.
    fn set_volume(&mut self, volume: u32);
    fn mute(&mut self);
    fn unmute(&mut self);
    fn is_muted(&self) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    NotReady,
    Ready,
    Playing,
    Paused,
    Buffering,
    Ended,
}

/// Raw widget lifecycle notifications, fed into `widget_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    Ready,
    Playing,
    Paused,
    Buffering,
    Ended,
}

type EndedCallback = Box<dyn FnMut()>;
type StateCallback = Box<dyn FnMut(PlaybackState)>;

pub struct PlaybackAdapter<W: VideoWidget> {
    widget: W,
    ready: bool,
    state: PlaybackState,
    current_video: Option<String>,
    on_ended: Option<EndedCallback>,
    on_state_change: Option<StateCallback>,
}

impl<W: VideoWidget> PlaybackAdapter<W> {
    pub fn new(widget: W) -> Self {
        PlaybackAdapter {
            widget,
            ready: false,
            state: PlaybackState::NotReady,
            current_video: None,
            on_ended: None,
            on_state_change: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn current_video(&self) -> Option<&str> {
        self.current_video.as_deref()
    }

    pub fn load(&mut self, video_id: &str) {
        if !self.ready {
            warn!("player not ready, ignoring load of {video_id}");
            return;
        }
        self.widget.load_video(video_id);
        self.current_video = Some(video_id.to_string());
    }

    pub fn play(&mut self) {
        if self.ready {
            self.widget.play_video();
        }
    }

    pub fn pause(&mut self) {
        if self.ready {
            self.widget.pause_video();
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if !self.ready {
            return;
        }
        if self.state == PlaybackState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn seek_to(&mut self, seconds: f64) {
        if self.ready {
            self.widget.seek_to(seconds);
        }
    }

    pub fn set_volume(&mut self, volume: u32) {
        if self.ready {
            self.widget.set_volume(volume.min(100));
        }
    }

    pub fn mute(&mut self) {
        if self.ready {
            self.widget.mute();
        }
    }

    pub fn unmute(&mut self) {
        if self.ready {
            self.widget.unmute();
        }
    }

    pub fn is_muted(&self) -> bool {
        self.ready && self.widget.is_muted()
    }

    pub fn current_time(&self) -> f64 {
        if self.ready {
            self.widget.current_time()
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> f64 {
        if self.ready {
            self.widget.duration()
        } else {
            0.0
        }
    }

    /// Runs when the track finishes. Fired before the state-change
    /// notification, matching the widget's own ordering.
    pub fn on_ended(&mut self, callback: impl FnMut() + 'static) {
        self.on_ended = Some(Box::new(callback));
    }

    pub fn on_state_change(&mut self, callback: impl FnMut(PlaybackState) + 'static) {
        self.on_state_change = Some(Box::new(callback));
    }

    pub fn widget_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Ready => {
                self.ready = true;
                self.state = PlaybackState::Ready;
            }
            WidgetEvent::Playing => {
                self.state = PlaybackState::Playing;
                self.emit(PlaybackState::Playing);
            }
            WidgetEvent::Paused => {
                self.state = PlaybackState::Paused;
                self.emit(PlaybackState::Paused);
            }
            WidgetEvent::Buffering => {
                // Transient; the playing/paused state is not disturbed.
                self.emit(PlaybackState::Buffering);
            }
            WidgetEvent::Ended => {
                self.state = PlaybackState::Ended;
                if let Some(callback) = self.on_ended.as_mut() {
                    callback();
                }
                self.emit(PlaybackState::Ended);
            }
        }
    }

    fn emit(&mut self, state: PlaybackState) {
        if let Some(callback) = self.on_state_change.as_mut() {
            callback(state);
        }
    }
}
