use std::sync::Mutex;

use serde::Serialize;
use tokio::time::Instant;

/// State codes reported by the embedded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerStatus {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerStatus::Unstarted),
            0 => Some(PlayerStatus::Ended),
            1 => Some(PlayerStatus::Playing),
            2 => Some(PlayerStatus::Paused),
            3 => Some(PlayerStatus::Buffering),
            5 => Some(PlayerStatus::Cued),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PlayerStatus::Unstarted => -1,
            PlayerStatus::Ended => 0,
            PlayerStatus::Playing => 1,
            PlayerStatus::Paused => 2,
            PlayerStatus::Buffering => 3,
            PlayerStatus::Cued => 5,
        }
    }
}

/// The embedded video widget's API surface. Handles are borrowed from the
/// widget once it signals readiness; nothing here owns the player.
pub trait PlayerHandle: Send + Sync {
    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool);
    fn play_video(&self);
    fn pause_video(&self);
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn player_state(&self) -> PlayerStatus;
}

/// A player that advances a playhead against the runtime clock. Position is
/// `anchor_position + elapsed` while playing, clamped to the video duration.
pub struct SimulatedPlayer {
    duration: f64,
    inner: Mutex<SimulatedState>,
}

struct SimulatedState {
    anchor_position: f64,
    anchor_instant: Option<Instant>,
    status: PlayerStatus,
}

impl SimulatedPlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            inner: Mutex::new(SimulatedState {
                anchor_position: 0.0,
                anchor_instant: None,
                status: PlayerStatus::Unstarted,
            }),
        }
    }

    fn position(&self, state: &SimulatedState) -> f64 {
        let elapsed = state
            .anchor_instant
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (state.anchor_position + elapsed).min(self.duration)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimulatedState> {
        self.inner.lock().expect("SimulatedPlayer poisoned")
    }
}

impl PlayerHandle for SimulatedPlayer {
    fn seek_to(&self, seconds: f64, _allow_seek_ahead: bool) {
        let mut state = self.lock();
        state.anchor_position = seconds.clamp(0.0, self.duration);
        if state.anchor_instant.is_some() {
            state.anchor_instant = Some(Instant::now());
        }
    }

    fn play_video(&self) {
        let mut state = self.lock();
        if state.anchor_instant.is_none() {
            state.anchor_instant = Some(Instant::now());
        }
        state.status = PlayerStatus::Playing;
    }

    fn pause_video(&self) {
        let mut state = self.lock();
        state.anchor_position = self.position(&state);
        state.anchor_instant = None;
        state.status = PlayerStatus::Paused;
    }

    fn current_time(&self) -> f64 {
        let state = self.lock();
        self.position(&state)
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn player_state(&self) -> PlayerStatus {
        let state = self.lock();
        if state.status == PlayerStatus::Playing && self.position(&state) >= self.duration {
            PlayerStatus::Ended
        } else {
            state.status
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn status_codes_round_trip_known_values() {
        for code in [-1, 0, 1, 2, 3, 5] {
            assert_eq!(PlayerStatus::from_code(code).unwrap().code(), code);
        }
        assert_eq!(PlayerStatus::from_code(4), None);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_playhead_follows_the_clock() {
        let player = SimulatedPlayer::new(100.0);
        player.seek_to(10.0, true);
        assert_eq!(player.player_state(), PlayerStatus::Unstarted);
        assert_eq!(player.current_time(), 10.0);

        player.play_video();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!((player.current_time() - 15.0).abs() < 1e-6);

        player.pause_video();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!((player.current_time() - 15.0).abs() < 1e-6);
        assert_eq!(player.player_state(), PlayerStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn seeking_while_playing_restarts_from_new_position() {
        let player = SimulatedPlayer::new(60.0);
        player.play_video();
        tokio::time::sleep(Duration::from_secs(3)).await;
        player.seek_to(50.0, true);
        tokio::time::sleep(Duration::from_secs(20)).await;

        assert_eq!(player.current_time(), 60.0);
        assert_eq!(player.player_state(), PlayerStatus::Ended);
    }
}
