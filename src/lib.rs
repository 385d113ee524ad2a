// tubeplayer: a browser-based music player that streams from YouTube.
// The server half exposes the search/favorites/download API; the player half
// is the queue controller, playback adapter, and application controller a
// rendering surface drives through typed commands.

pub mod client;
pub mod player;
pub mod server;
pub mod track;
pub mod ui;
pub mod youtube;
