use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, warn};

use crate::playback::{
    MAX_SEGMENT_SECONDS, PlaybackSnapshot, PlaybackState, PlayerHandle, PlayerRegistry,
    SegmentList,
};

/// No segment window can be longer than the longest well-formed segment.
const MAX_TIMER: Duration = Duration::from_secs(MAX_SEGMENT_SECONDS as u64);

/// Sequences highlight segments on one player: seek, play, wait for the
/// segment window, advance. Commands arriving in a state where they make no
/// sense, or before the player is ready, are no-ops.
///
/// Every transition runs under one lock together with cancelling or arming
/// the completion timer. A timer carries the id it was armed with and only
/// acts if that id is still the armed one, so a cancelled timer can never
/// advance the sequence.
///
/// Timers are Tokio tasks: commands must be issued from within a runtime.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Mutex<ControllerInner>>,
}

struct ControllerInner {
    this: Weak<Mutex<ControllerInner>>,
    registry: PlayerRegistry,
    player_id: String,
    segments: Arc<SegmentList>,
    state: PlaybackState,
    timer: Option<ArmedTimer>,
    next_timer_id: u64,
    state_tx: watch::Sender<PlaybackState>,
}

struct ArmedTimer {
    id: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl PlaybackController {
    pub fn new(registry: PlayerRegistry, player_id: impl Into<String>, segments: SegmentList) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::Idle);
        let player_id = player_id.into();
        let inner = Arc::new_cyclic(|this| {
            Mutex::new(ControllerInner {
                this: this.clone(),
                registry,
                player_id,
                segments: Arc::new(segments),
                state: PlaybackState::Idle,
                timer: None,
                next_timer_id: 0,
                state_tx,
            })
        });
        Self { inner }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().expect("PlaybackController poisoned")
    }

    /// Play the reel from its first segment. Only acts from `Idle`.
    pub fn start(&self) -> PlaybackState {
        self.lock().start()
    }

    /// The single user-facing control: pause when playing, resume when
    /// paused, start when idle.
    pub fn toggle(&self) -> PlaybackState {
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            PlaybackState::Playing { .. } => inner.pause(),
            PlaybackState::Paused { .. } => inner.resume(),
            PlaybackState::Idle => inner.start(),
        }
    }

    pub fn pause(&self) -> PlaybackState {
        self.lock().pause()
    }

    pub fn resume(&self) -> PlaybackState {
        self.lock().resume()
    }

    pub fn stop(&self) -> PlaybackState {
        let mut inner = self.lock();
        let player = inner.player();
        inner.halt(player.as_deref());
        inner.state
    }

    /// Jump to the first segment starting after the playhead, wrapping to the
    /// first segment. The reel keeps its playing/paused/idle mode.
    pub fn skip_to_next(&self) -> Option<usize> {
        self.lock().skip_to_next()
    }

    /// Cancel every pending timer and drop back to `Idle` without touching
    /// the player. Used when the owning view goes away.
    pub fn teardown(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.set_state(PlaybackState::Idle);
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let inner = self.lock();
        PlaybackSnapshot {
            state: inner.state,
            segment_count: inner.segments.len(),
            timer_remaining_ms: inner.timer.as_ref().map(|timer| {
                timer
                    .deadline
                    .saturating_duration_since(Instant::now())
                    .as_millis() as u64
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.lock().state_tx.subscribe()
    }

    pub fn segments(&self) -> Arc<SegmentList> {
        Arc::clone(&self.lock().segments)
    }

    pub fn player_id(&self) -> String {
        self.lock().player_id.clone()
    }
}

impl ControllerInner {
    fn player(&self) -> Option<Arc<dyn PlayerHandle>> {
        self.registry.get(&self.player_id)
    }

    fn set_state(&mut self, next: PlaybackState) {
        self.state = next;
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    fn start(&mut self) -> PlaybackState {
        if self.state != PlaybackState::Idle {
            return self.state;
        }
        if self.segments.is_empty() {
            debug!("no segments to play");
            return self.state;
        }
        let Some(player) = self.player() else {
            debug!(player_id = %self.player_id, "player not ready, ignoring start");
            return self.state;
        };
        info!(segments = self.segments.len(), "starting highlight reel");
        self.play_from(player.as_ref(), 0);
        self.state
    }

    /// Play the first well-formed segment at or after `index`; malformed
    /// entries are skipped and running off the end stops the reel.
    fn play_from(&mut self, player: &dyn PlayerHandle, mut index: usize) {
        let segments = Arc::clone(&self.segments);
        loop {
            match segments.slot(index) {
                None => {
                    debug!("reached end of highlight reel");
                    self.halt(Some(player));
                    return;
                }
                Some(Err(err)) => {
                    warn!(index, error = %err, "skipping malformed segment");
                    index += 1;
                }
                Some(Ok(segment)) => {
                    let window = segments.window(index).unwrap_or_default();
                    debug!(
                        index,
                        start = segment.start,
                        window_ms = window.as_millis() as u64,
                        "playing segment"
                    );
                    self.cancel_timer();
                    player.seek_to(segment.start, true);
                    player.play_video();
                    self.arm(window);
                    self.set_state(PlaybackState::Playing { index });
                    return;
                }
            }
        }
    }

    fn pause(&mut self) -> PlaybackState {
        let PlaybackState::Playing { index } = self.state else {
            return self.state;
        };
        let Some(player) = self.player() else {
            return self.state;
        };

        self.cancel_timer();
        let end = self.segments.end(index).unwrap_or(0.0);
        let remaining_ms = ((end - player.current_time()).max(0.0) * 1000.0).round() as u64;
        player.pause_video();
        self.set_state(PlaybackState::Paused {
            index,
            remaining_ms,
        });
        self.state
    }

    fn resume(&mut self) -> PlaybackState {
        let PlaybackState::Paused {
            index,
            remaining_ms,
        } = self.state
        else {
            return self.state;
        };
        let Some(player) = self.player() else {
            return self.state;
        };

        player.play_video();
        self.arm(Duration::from_millis(remaining_ms));
        self.set_state(PlaybackState::Playing { index });
        self.state
    }

    fn halt(&mut self, player: Option<&dyn PlayerHandle>) {
        self.cancel_timer();
        if let Some(player) = player {
            player.pause_video();
        }
        self.set_state(PlaybackState::Idle);
    }

    fn skip_to_next(&mut self) -> Option<usize> {
        let player = self.player()?;
        let index = self.segments.next_after(player.current_time())?;
        let start = self.segments.get(index)?.start;
        let window = self.segments.window(index).unwrap_or_default();

        player.seek_to(start, true);
        let state = self.state;
        match state {
            PlaybackState::Playing { .. } => {
                self.arm(window);
                self.set_state(PlaybackState::Playing { index });
            }
            PlaybackState::Paused { .. } => self.set_state(PlaybackState::Paused {
                index,
                remaining_ms: window.as_millis() as u64,
            }),
            PlaybackState::Idle => {}
        }
        Some(index)
    }

    fn arm(&mut self, after: Duration) {
        self.cancel_timer();

        self.next_timer_id = self.next_timer_id.wrapping_add(1);
        let id = self.next_timer_id;
        let after = after.min(MAX_TIMER);
        let deadline = Instant::now()
            .checked_add(after)
            .unwrap_or_else(Instant::now);
        let this = self.this.clone();

        let task = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            if let Some(inner) = this.upgrade() {
                inner
                    .lock()
                    .expect("PlaybackController poisoned")
                    .on_timer_fired(id);
            }
        });

        self.timer = Some(ArmedTimer { id, deadline, task });
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.task.abort();
        }
    }

    fn on_timer_fired(&mut self, id: u64) {
        if self.timer.as_ref().map(|timer| timer.id) != Some(id) {
            debug!(timer_id = id, "ignoring stale timer");
            return;
        }
        self.timer = None;

        let PlaybackState::Playing { index } = self.state else {
            return;
        };
        match self.player() {
            Some(player) => self.play_from(player.as_ref(), index + 1),
            None => self.halt(None),
        }
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{DEFAULT_PLAYER_ID, RawSegment, SimulatedPlayer};

    fn controller(segments: Vec<RawSegment>) -> (PlaybackController, Arc<SimulatedPlayer>) {
        let registry = PlayerRegistry::new();
        let player = Arc::new(SimulatedPlayer::new(600.0));
        registry.register(DEFAULT_PLAYER_ID, player.clone());
        let controller =
            PlaybackController::new(registry, DEFAULT_PLAYER_ID, SegmentList::new(segments));
        (controller, player)
    }

    #[tokio::test(start_paused = true)]
    async fn start_seeks_to_first_segment_and_arms_its_window() {
        let (controller, player) = controller(vec![
            RawSegment::from_start_duration(10.0, 20.0),
            RawSegment::from_start_duration(25.0, 20.0),
        ]);

        assert_eq!(controller.start(), PlaybackState::Playing { index: 0 });
        assert_eq!(player.current_time(), 10.0);
        assert_eq!(controller.snapshot().timer_remaining_ms, Some(15_000));
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_ignored_unless_idle() {
        let (controller, player) = controller(vec![RawSegment::from_start_duration(10.0, 20.0)]);
        controller.start();
        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(controller.start(), PlaybackState::Playing { index: 0 });
        assert!((player.current_time() - 14.0).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn skip_while_paused_keeps_the_reel_paused() {
        let (controller, player) = controller(vec![
            RawSegment::from_start_duration(0.0, 10.0),
            RawSegment::from_start_duration(30.0, 10.0),
        ]);
        controller.start();
        tokio::time::sleep(Duration::from_secs(2)).await;
        controller.pause();

        assert_eq!(controller.skip_to_next(), Some(1));
        assert_eq!(
            controller.state(),
            PlaybackState::Paused {
                index: 1,
                remaining_ms: 10_000
            }
        );
        assert_eq!(player.current_time(), 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_with_an_oversized_remainder_stays_usable() {
        let (controller, _player) = controller(vec![RawSegment::from_start_duration(0.0, 5.0)]);
        controller.start();
        controller.lock().set_state(PlaybackState::Paused {
            index: 0,
            remaining_ms: u64::MAX,
        });

        assert_eq!(controller.resume(), PlaybackState::Playing { index: 0 });
        let remaining = controller.snapshot().timer_remaining_ms.unwrap();
        assert!(remaining <= MAX_TIMER.as_millis() as u64);
        assert_eq!(controller.stop(), PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_last_handle_cancels_the_timer() {
        let (controller, _player) = controller(vec![RawSegment::from_start_duration(0.0, 5.0)]);
        let mut states = controller.subscribe();
        controller.start();
        states.borrow_and_update();
        drop(controller);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(states.changed().await.is_err());
    }
}
