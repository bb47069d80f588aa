pub mod store;

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub use store::{Snapshot, SnapshotStore, StoreError};

/// String form of a Discord user id.
pub type UserId = String;

pub type SharedActivity = Arc<Mutex<ActivityLog>>;

pub fn new_shared(log: ActivityLog) -> SharedActivity {
    Arc::new(Mutex::new(log))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactionDelta {
    Added,
    Removed,
}

impl ReactionDelta {
    fn amount(self) -> i64 {
        match self {
            Self::Added => 1,
            Self::Removed => -1,
        }
    }
}

/// Lower bound applied to reaction counts after a removal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReactionFloor {
    /// Counts may go negative when more removals than additions are seen.
    #[default]
    Unbounded,
    Zero,
}

/// What a join does when the user already has an open voice session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RejoinPolicy {
    /// Drop the unclosed interval and start a fresh session.
    #[default]
    Restart,
    /// Keep the original start time.
    Extend,
}

impl FromStr for ReactionFloor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "unbounded" => Ok(Self::Unbounded),
            "zero" | "0" => Ok(Self::Zero),
            other => Err(format!("unknown reaction floor: {other}")),
        }
    }
}

impl FromStr for RejoinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restart" => Ok(Self::Restart),
            "extend" => Ok(Self::Extend),
            other => Err(format!("unknown voice rejoin policy: {other}")),
        }
    }
}

impl std::fmt::Display for RejoinPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restart => write!(f, "restart"),
            Self::Extend => write!(f, "extend"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    pub reaction_floor: ReactionFloor,
    pub rejoin: RejoinPolicy,
}

/// Counters reported for a single user. Unknown users report all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UserStats {
    pub messages: u64,
    pub reactions: i64,
    pub voice_seconds: f64,
}

/// Per-user message, reaction and voice-time counters.
///
/// Every mutation is written through to the [`SnapshotStore`] before the
/// call returns. Open voice sessions live only in memory, so anyone who was
/// connected when the process stopped is treated as disconnected after a
/// restart until their next join.
pub struct ActivityLog {
    counters: Snapshot,
    sessions: HashMap<UserId, DateTime<Utc>>,
    store: SnapshotStore,
    policy: Policy,
}

impl ActivityLog {
    /// Load counters from `store`. A missing file starts empty; a file that
    /// exists but does not parse is an error and nothing is merged from it.
    pub fn load(store: SnapshotStore, policy: Policy) -> Result<Self, StoreError> {
        let counters = match store.load()? {
            Some(snapshot) => {
                info!(
                    path = %store.path().display(),
                    users = snapshot.user_count(),
                    "loaded activity snapshot"
                );
                snapshot
            }
            None => {
                info!(
                    path = %store.path().display(),
                    "no activity snapshot found, starting empty"
                );
                Snapshot::default()
            }
        };

        Ok(Self {
            counters,
            sessions: HashMap::new(),
            store,
            policy,
        })
    }

    /// Persist the current counters. Failures are logged and the in-memory
    /// state stays authoritative; the next successful save includes them.
    pub fn save(&self) {
        match self.store.save(&self.counters) {
            Ok(()) => debug!(path = %self.store.path().display(), "saved activity snapshot"),
            Err(e) => error!(
                path = %self.store.path().display(),
                "failed to save activity snapshot: {e}"
            ),
        }
    }

    pub fn record_message(&mut self, user_id: &str, is_bot: bool) -> bool {
        if is_bot {
            return false;
        }

        let count = self
            .counters
            .message_counts
            .entry(user_id.to_string())
            .or_insert(0);
        *count += 1;
        debug!(user_id, total = *count, "message recorded");

        self.save();
        true
    }

    pub fn record_reaction(&mut self, user_id: &str, is_bot: bool, delta: ReactionDelta) -> bool {
        if is_bot {
            return false;
        }

        let count = self
            .counters
            .reaction_counts
            .entry(user_id.to_string())
            .or_insert(0);
        *count += delta.amount();
        if self.policy.reaction_floor == ReactionFloor::Zero && *count < 0 {
            *count = 0;
        }
        debug!(user_id, ?delta, total = *count, "reaction recorded");

        self.save();
        true
    }

    /// Open a voice session. Returns `false` when nothing changed (bot
    /// account, or an existing session kept under [`RejoinPolicy::Extend`]).
    pub fn record_voice_join(&mut self, user_id: &str, is_bot: bool, now: DateTime<Utc>) -> bool {
        if is_bot {
            return false;
        }

        match self.sessions.entry(user_id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(now);
                debug!(user_id, "voice session opened");
                true
            }
            Entry::Occupied(mut open) => match self.policy.rejoin {
                RejoinPolicy::Restart => {
                    warn!(
                        user_id,
                        since = %open.get(),
                        "voice join while a session was open, restarting it"
                    );
                    open.insert(now);
                    true
                }
                RejoinPolicy::Extend => {
                    debug!(user_id, since = %open.get(), "voice join while a session was open, keeping it");
                    false
                }
            },
        }
    }

    /// Close the user's voice session and add its length to their total.
    /// Returns the seconds added, or `None` if no join was ever seen.
    pub fn record_voice_leave(
        &mut self,
        user_id: &str,
        is_bot: bool,
        now: DateTime<Utc>,
    ) -> Option<f64> {
        if is_bot {
            return None;
        }

        let Some(since) = self.sessions.remove(user_id) else {
            debug!(user_id, "voice leave without a recorded join, ignoring");
            return None;
        };

        // A clock stepping backwards yields a zero-length session.
        let elapsed = (now - since)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let total = self
            .counters
            .voice_times
            .entry(user_id.to_string())
            .or_insert(0.0);
        *total += elapsed;
        info!(user_id, elapsed, total = *total, "voice session closed");

        self.save();
        Some(elapsed)
    }

    pub fn snapshot_for(&self, user_id: &str) -> UserStats {
        UserStats {
            messages: self
                .counters
                .message_counts
                .get(user_id)
                .copied()
                .unwrap_or(0),
            reactions: self
                .counters
                .reaction_counts
                .get(user_id)
                .copied()
                .unwrap_or(0),
            voice_seconds: self
                .counters
                .voice_times
                .get(user_id)
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// Users with the most messages, highest first. Ties keep ascending id
    /// order.
    pub fn top_by_messages(&self, n: usize) -> Vec<(UserId, u64)> {
        let mut ranked: Vec<(UserId, u64)> = self
            .counters
            .message_counts
            .iter()
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }

    pub fn is_in_voice(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }

    pub fn counters(&self) -> &Snapshot {
        &self.counters
    }
}
