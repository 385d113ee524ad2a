// Playback core: queue controller, persistence hooks, and the adapter
// around the embedded video widget.

pub mod adapter;
pub mod queue;
pub mod store;
