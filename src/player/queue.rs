// Playback queue controller
// Owns the queue order, the current position, and the shuffle/repeat modes.
//
// Every bounds violation here is a silent no-op or a `None` return, never an
// error: this state is driven by UI input, so callers check sentinels instead
// of catching anything. State is persisted fire-and-forget after each
// mutation; a failed write is logged and the in-memory state stays
// authoritative.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::player::store::QueueStore;
use crate::track::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// The fixed cycle behind the repeat button: off -> all -> one -> off.
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// The durable form of the controller state. `currentIndex` keeps the
/// browser build's `-1` sentinel on disk; in memory it is an `Option`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub queue: Vec<Track>,
    pub current_index: i64,
    pub shuffle_mode: bool,
    #[serde(default)]
    pub repeat_mode: RepeatMode,
}

impl Default for QueueSnapshot {
    fn default() -> Self {
        QueueSnapshot {
            queue: Vec::new(),
            current_index: -1,
            shuffle_mode: false,
            repeat_mode: RepeatMode::Off,
        }
    }
}

pub struct QueueController {
    queue: Vec<Track>,
    current: Option<usize>,
    shuffle_mode: bool,
    repeat_mode: RepeatMode,
    // Pre-shuffle order; non-empty only while shuffle is on.
    original_queue: Vec<Track>,
    store: Box<dyn QueueStore>,
}

impl QueueController {
    /// Restores persisted state if the store has any; a missing or corrupt
    /// snapshot just means starting empty.
    pub fn new(store: Box<dyn QueueStore>) -> Self {
        let snapshot = match store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => QueueSnapshot::default(),
            Err(err) => {
                warn!("failed to load queue snapshot: {err:#}");
                QueueSnapshot::default()
            }
        };

        let current = usize::try_from(snapshot.current_index)
            .ok()
            .filter(|&i| i < snapshot.queue.len());

        QueueController {
            queue: snapshot.queue,
            current,
            shuffle_mode: snapshot.shuffle_mode,
            repeat_mode: snapshot.repeat_mode,
            original_queue: Vec::new(),
            store,
        }
    }

    pub fn add(&mut self, track: Track) {
        self.queue.push(track);
        self.persist();
    }

    /// Removing the current slot or an earlier one shifts the pointer back a
    /// slot (to none when it was at the head). Callers re-fetch
    /// `current_track()` afterwards since the displaced pointer may now name
    /// a different track.
    pub fn remove(&mut self, index: usize) {
        if index >= self.queue.len() {
            return;
        }
        self.queue.remove(index);
        if let Some(current) = self.current {
            if current >= index {
                self.current = current.checked_sub(1);
            }
        }
        self.persist();
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
        self.persist();
    }

    pub fn play_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.queue.len() {
            return None;
        }
        self.current = Some(index);
        self.persist();
        self.queue.get(index).cloned()
    }

    /// Advances playback. `None` means either "queue is empty" or, in
    /// sequential non-repeating mode, "end of the queue" (the position is
    /// then left clamped on the last track and the caller should pause).
    pub fn next(&mut self) -> Option<Track> {
        if self.queue.is_empty() {
            return None;
        }

        if self.repeat_mode == RepeatMode::One {
            // Replay whatever slot is current; position unchanged.
            return self.current_track().cloned();
        }

        if self.shuffle_mode {
            // Uniformly random and history-free: immediate repeats are
            // possible. O(1) and stateless, which is the point.
            let index = rand::thread_rng().gen_range(0..self.queue.len());
            self.current = Some(index);
        } else {
            let next = self.current.map_or(0, |i| i + 1);
            if next >= self.queue.len() {
                if self.repeat_mode == RepeatMode::All {
                    self.current = Some(0);
                } else {
                    self.current = Some(self.queue.len() - 1);
                    return None;
                }
            } else {
                self.current = Some(next);
            }
        }

        self.persist();
        self.current_track().cloned()
    }

    /// Steps back. Unlike `next()`, this never signals end-of-queue: it
    /// wraps to the tail under repeat-all and clamps at the head otherwise,
    /// so a non-empty queue always yields a track.
    pub fn previous(&mut self) -> Option<Track> {
        if self.queue.is_empty() {
            return None;
        }

        self.current = match self.current {
            Some(i) if i > 0 => Some(i - 1),
            _ => {
                if self.repeat_mode == RepeatMode::All {
                    Some(self.queue.len() - 1)
                } else {
                    Some(0)
                }
            }
        };

        self.persist();
        self.current_track().cloned()
    }

    /// Enabling snapshots the order; disabling restores it and relocates the
    /// position to the track id that was current (falling back to the head
    /// if that track was removed while shuffled).
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle_mode = !self.shuffle_mode;

        if self.shuffle_mode {
            self.original_queue = self.queue.clone();
        } else if !self.original_queue.is_empty() {
            let current_id = self
                .current
                .and_then(|i| self.queue.get(i))
                .map(|t| t.id.clone());
            self.queue = std::mem::take(&mut self.original_queue);
            self.current = Some(match current_id {
                Some(id) => self.queue.iter().position(|t| t.id == id).unwrap_or(0),
                None => 0,
            });
        }

        self.persist();
        self.shuffle_mode
    }

    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat_mode = self.repeat_mode.cycled();
        self.persist();
        self.repeat_mode
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
        self.persist();
    }

    /// Relocates a track and keeps `current` pointing at the same logical
    /// track. No-op if either index is out of bounds.
    pub fn move_track(&mut self, from: usize, to: usize) {
        if from >= self.queue.len() || to >= self.queue.len() {
            return;
        }
        let item = self.queue.remove(from);
        self.queue.insert(to, item);

        if let Some(current) = self.current {
            if current == from {
                self.current = Some(to);
            } else if from < current && to >= current {
                self.current = Some(current - 1);
            } else if from > current && to <= current {
                self.current = Some(current + 1);
            }
        }

        self.persist();
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.queue.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn queue(&self) -> &[Track] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn shuffle_mode(&self) -> bool {
        self.shuffle_mode
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            queue: self.queue.clone(),
            current_index: self.current.map_or(-1, |i| i as i64),
            shuffle_mode: self.shuffle_mode,
            repeat_mode: self.repeat_mode,
        }
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.snapshot()) {
            warn!("failed to persist queue state: {err:#}");
        }
    }
}
