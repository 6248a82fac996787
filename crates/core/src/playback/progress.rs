use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::playback::{PlayerRegistry, SegmentList};

pub const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Polls the playhead and publishes which segment it is in, independent of
/// the controller's timers, so manual scrubbing is reflected too. The index
/// is only republished when it changes. The poll stops when this is dropped.
pub struct ProgressTracker {
    highlighted: watch::Receiver<Option<usize>>,
    task: JoinHandle<()>,
}

impl ProgressTracker {
    pub fn spawn(registry: PlayerRegistry, player_id: impl Into<String>, segments: Arc<SegmentList>) -> Self {
        Self::spawn_with_interval(registry, player_id, segments, PROGRESS_POLL_INTERVAL)
    }

    pub fn spawn_with_interval(
        registry: PlayerRegistry,
        player_id: impl Into<String>,
        segments: Arc<SegmentList>,
        every: Duration,
    ) -> Self {
        let player_id = player_id.into();
        let (tx, highlighted) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(player) = registry.get(&player_id) else {
                    continue;
                };
                let index = segments.active_index_at(player.current_time());
                tx.send_if_modified(|current| {
                    if *current == index {
                        return false;
                    }
                    *current = index;
                    true
                });
            }
        });

        Self { highlighted, task }
    }

    pub fn highlighted(&self) -> Option<usize> {
        *self.highlighted.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<usize>> {
        self.highlighted.clone()
    }

    /// Cancels the poll; the task is aborted in `Drop`.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
