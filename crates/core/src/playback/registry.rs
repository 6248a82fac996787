use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tokio::sync::watch;
use tracing::{debug, error};

use crate::playback::PlayerHandle;

/// Id used when a page carries a single player.
pub const DEFAULT_PLAYER_ID: &str = "main";

/// Per-page map from player id to the handle its widget handed over when it
/// became ready. Cloning shares the same map.
#[derive(Clone)]
pub struct PlayerRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    players: RwLock<HashMap<String, Arc<dyn PlayerHandle>>>,
    // bumped on every register/unregister so waiters can re-check
    changes: watch::Sender<u64>,
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerRegistry {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(RegistryInner {
                players: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Ready signal: the widget hands its handle over.
    pub fn register(&self, player_id: impl Into<String>, handle: Arc<dyn PlayerHandle>) {
        let player_id = player_id.into();
        debug!(%player_id, "player ready");
        self.inner
            .players
            .write()
            .expect("PlayerRegistry poisoned")
            .insert(player_id, handle);
        self.inner.changes.send_modify(|n| *n = n.wrapping_add(1));
    }

    pub fn unregister(&self, player_id: &str) -> Option<Arc<dyn PlayerHandle>> {
        let removed = self
            .inner
            .players
            .write()
            .expect("PlayerRegistry poisoned")
            .remove(player_id);
        if removed.is_some() {
            debug!(%player_id, "player released");
            self.inner.changes.send_modify(|n| *n = n.wrapping_add(1));
        }
        removed
    }

    pub fn get(&self, player_id: &str) -> Option<Arc<dyn PlayerHandle>> {
        self.inner
            .players
            .read()
            .expect("PlayerRegistry poisoned")
            .get(player_id)
            .cloned()
    }

    pub fn is_ready(&self, player_id: &str) -> bool {
        self.get(player_id).is_some()
    }

    pub async fn wait_ready(&self, player_id: &str) -> Arc<dyn PlayerHandle> {
        let mut changes = self.inner.changes.subscribe();
        loop {
            if let Some(handle) = self.get(player_id) {
                return handle;
            }
            // the sender lives inside `self`, so this cannot fail while we wait
            let _ = changes.changed().await;
        }
    }

    /// Jump the player to `seconds` and play, as a key-moment list item does.
    /// Returns `false` when the player is not ready yet.
    pub fn seek_and_play(&self, player_id: &str, seconds: f64) -> bool {
        let Some(player) = self.get(player_id) else {
            error!(%player_id, "player not available");
            return false;
        };
        player.seek_to(seconds, true);
        player.play_video();
        true
    }
}
