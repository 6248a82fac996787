use std::sync::Arc;

use tracing::debug;

use crate::playback::{
    PlaybackController, PlayerHandle, PlayerRegistry, ProgressTracker, SegmentList,
};

/// One mounted player view: the controller driving the reel and, optionally,
/// the progress poll. Unmounting (or dropping) cancels every timer and poll
/// and releases the player slot.
pub struct PlayerView {
    registry: PlayerRegistry,
    player_id: String,
    controller: PlaybackController,
    tracker: Option<ProgressTracker>,
}

impl PlayerView {
    pub fn mount(
        registry: PlayerRegistry,
        player_id: impl Into<String>,
        segments: SegmentList,
        track_progress: bool,
    ) -> Self {
        let player_id = player_id.into();
        let controller = PlaybackController::new(registry.clone(), player_id.clone(), segments);
        let tracker = track_progress.then(|| {
            ProgressTracker::spawn(registry.clone(), player_id.clone(), controller.segments())
        });
        debug!(%player_id, track_progress, "player view mounted");

        Self {
            registry,
            player_id,
            controller,
            tracker,
        }
    }

    /// The embedded widget reports ready and hands over its handle.
    pub fn on_ready(&self, handle: Arc<dyn PlayerHandle>) {
        self.registry.register(self.player_id.clone(), handle);
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn tracker(&self) -> Option<&ProgressTracker> {
        self.tracker.as_ref()
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Tears the view down; timers, poll and player slot are released in `Drop`.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for PlayerView {
    fn drop(&mut self) {
        self.controller.teardown();
        drop(self.tracker.take());
        self.registry.unregister(&self.player_id);
        debug!(player_id = %self.player_id, "player view unmounted");
    }
}
