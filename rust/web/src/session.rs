//! Session registry: keyed tables with TTL eviction, seat ownership,
//! and the multiplayer host/join/start protocol.
//!
//! The store map is behind one lock and is the only cross-session shared
//! state. Each session's mutable table state sits behind its own async
//! mutex, so a session processes one inbound message at a time while
//! distinct sessions progress in parallel.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex as StdMutex, RwLock};
use std::time::{Duration, Instant};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use uuid::Uuid;

use felt_engine::betting::SeatId;
use felt_engine::engine::{default_players, Engine};
use felt_engine::estimator::StrengthEstimator;

use crate::messages::ServerMessage;

pub type SessionId = String;

pub const SEAT_ORDER: [&str; 5] = ["p1", "p2", "p3", "p4", "p5"];
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Outbound channel capacity per socket. A client that cannot drain
/// this many messages is dropped rather than blocking the table.
pub const SOCKET_CHANNEL_BUFFER: usize = 256;

pub type SeatSender = mpsc::Sender<ServerMessage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Single,
    Multi,
}

impl TableMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TableMode::Single => "single",
            TableMode::Multi => "multi",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("table not found")]
    TableNotFound,
    #[error("not a multiplayer table")]
    NotMultiplayer,
    #[error("table has ended")]
    TableEnded,
    #[error("table is full")]
    TableFull,
    #[error("only the host can start the table")]
    NotHost,
    #[error("game engine error: {0}")]
    Engine(String),
}

/// Mutable per-table state, guarded by the session's async mutex.
#[derive(Debug)]
pub struct TableState {
    pub engine: Engine,
    pub host_seat: SeatId,
    pub joined_players: BTreeSet<SeatId>,
    pub seat_owners: BTreeMap<SeatId, String>,
    pub human_players: BTreeSet<SeatId>,
    pub sockets: BTreeMap<SeatId, SeatSender>,
    pub started: bool,
    pub table_ended: bool,
    pub table_winners: Vec<SeatId>,
    pub awaiting_hand_continue: bool,
}

#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub mode: TableMode,
    state: Mutex<TableState>,
    last_seen: StdMutex<Instant>,
}

impl Session {
    fn new(id: SessionId, mode: TableMode, host_seat: SeatId) -> Self {
        let engine = Engine::new(default_players())
            .with_estimator(StrengthEstimator::new_with_seed(rand::random()));
        let mut joined_players = BTreeSet::new();
        if mode == TableMode::Multi {
            joined_players.insert(host_seat.clone());
        }
        Self {
            id,
            mode,
            state: Mutex::new(TableState {
                engine,
                host_seat,
                joined_players,
                seat_owners: BTreeMap::new(),
                human_players: BTreeSet::new(),
                sockets: BTreeMap::new(),
                started: false,
                table_ended: false,
                table_winners: Vec::new(),
                awaiting_hand_continue: false,
            }),
            last_seen: StdMutex::new(Instant::now()),
        }
    }

    /// Serializes all processing for this session; held across the whole
    /// handling of one inbound message including AI sub-steps.
    pub async fn lock_state(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().await
    }

    pub fn touch(&self) {
        let mut guard = self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Instant::now();
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        let guard = self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.elapsed() >= ttl
    }

    /// Binds a client channel to a seat and marks the seat
    /// human-controlled.
    pub async fn register_socket(&self, seat: &SeatId, sender: SeatSender) {
        let mut state = self.state.lock().await;
        state.sockets.insert(seat.clone(), sender);
        state.human_players.insert(seat.clone());
        self.touch();
    }

    /// Unbinds a disconnected seat. The seat itself stays joined so a
    /// reconnect resumes from the engine state.
    pub async fn remove_socket(&self, seat: &SeatId) {
        let mut state = self.state.lock().await;
        state.sockets.remove(seat);
        state.human_players.remove(seat);
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Creates a `TBL-`-prefixed multiplayer table with `p1` as host.
    pub fn create_multiplayer_table(&self, host_user_key: Option<&str>) -> Arc<Session> {
        self.cleanup_expired();
        let mut guard = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let id = loop {
            let candidate = format!(
                "TBL-{}",
                &Uuid::new_v4().simple().to_string()[..8].to_uppercase()
            );
            if !guard.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = Arc::new(Session::new(id.clone(), TableMode::Multi, "p1".to_string()));
        if let Some(key) = host_user_key {
            // Freshly created: the state mutex is uncontended.
            if let Ok(mut state) = session.state.try_lock() {
                state.seat_owners.insert("p1".to_string(), key.to_string());
            }
        }
        guard.insert(id, Arc::clone(&session));

        tracing::info!(session_id = %session.id, "multiplayer table created");
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.cleanup_expired();
        let guard = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let session = guard.get(id).cloned();
        if let Some(session) = &session {
            session.touch();
        }
        session
    }

    /// Returns the session for `id`, creating a single-mode session when
    /// absent. The boolean reports whether a new session was created.
    pub fn get_or_create(&self, id: Option<&str>, mode: TableMode) -> (Arc<Session>, bool) {
        if let Some(id) = id {
            if let Some(existing) = self.get(id) {
                return (existing, false);
            }
        }

        let id = id
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let session = Arc::new(Session::new(id.clone(), mode, "p1".to_string()));
        let mut guard = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let session = guard
            .entry(id)
            .or_insert_with(|| Arc::clone(&session))
            .clone();
        tracing::info!(session_id = %session.id, mode = session.mode.as_str(), "session created");
        (session, true)
    }

    /// Seats a user at a table. A `user_key` that already owns a seat
    /// gets the same seat back (idempotent reconnect); otherwise the
    /// lowest unoccupied seat is assigned.
    pub async fn join_multiplayer_table(
        &self,
        id: &str,
        user_key: Option<&str>,
    ) -> Result<SeatId, StoreError> {
        let session = self.get(id).ok_or(StoreError::TableNotFound)?;
        if session.mode != TableMode::Multi {
            return Err(StoreError::NotMultiplayer);
        }

        let mut state = session.lock_state().await;
        if state.table_ended {
            return Err(StoreError::TableEnded);
        }

        if let Some(key) = user_key {
            for (seat, owner) in &state.seat_owners {
                if owner == key {
                    return Ok(seat.clone());
                }
            }
        }

        for seat in SEAT_ORDER {
            if !state.joined_players.contains(seat) {
                state.joined_players.insert(seat.to_string());
                if let Some(key) = user_key {
                    state.seat_owners.insert(seat.to_string(), key.to_string());
                }
                tracing::info!(session_id = %session.id, seat, "seat joined");
                return Ok(seat.to_string());
            }
        }
        Err(StoreError::TableFull)
    }

    /// Host-only, idempotent: deals the first hand once.
    pub async fn start_multiplayer_table(
        &self,
        id: &str,
        requester: &SeatId,
    ) -> Result<Arc<Session>, StoreError> {
        let session = self.get(id).ok_or(StoreError::TableNotFound)?;
        if session.mode != TableMode::Multi {
            return Err(StoreError::NotMultiplayer);
        }

        let mut state = session.lock_state().await;
        if state.table_ended {
            return Err(StoreError::TableEnded);
        }
        if *requester != state.host_seat {
            return Err(StoreError::NotHost);
        }
        if !state.started {
            state
                .engine
                .new_hand(None, false)
                .map_err(|err| StoreError::Engine(err.to_string()))?;
            state.started = true;
            tracing::info!(session_id = %session.id, "table started");
        }
        drop(state);
        Ok(session)
    }

    pub fn touch(&self, id: &str) {
        if let Some(session) = self.get(id) {
            session.touch();
        }
    }

    /// Drops every session idle past the TTL.
    pub fn cleanup_expired(&self) {
        let mut guard = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.retain(|id, session| {
            let keep = !session.is_expired(self.ttl);
            if !keep {
                tracing::info!(session_id = %id, "session expired");
            }
            keep
        });
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        let guard = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_table_has_the_host_seated() {
        let store = SessionStore::new();
        let session = store.create_multiplayer_table(Some("key-1"));
        assert!(session.id.starts_with("TBL-"));
        assert_eq!(session.id.len(), 12);
        assert_eq!(session.mode, TableMode::Multi);

        let state = session.lock_state().await;
        assert!(state.joined_players.contains("p1"));
        assert_eq!(state.seat_owners.get("p1").map(String::as_str), Some("key-1"));
        assert!(!state.started);
    }

    #[tokio::test]
    async fn join_assigns_lowest_free_seat_and_fills_up() {
        let store = SessionStore::new();
        let session = store.create_multiplayer_table(None);

        assert_eq!(
            store.join_multiplayer_table(&session.id, None).await.unwrap(),
            "p2"
        );
        assert_eq!(
            store.join_multiplayer_table(&session.id, None).await.unwrap(),
            "p3"
        );
        assert_eq!(
            store.join_multiplayer_table(&session.id, None).await.unwrap(),
            "p4"
        );
        assert_eq!(
            store.join_multiplayer_table(&session.id, None).await.unwrap(),
            "p5"
        );
        assert_eq!(
            store.join_multiplayer_table(&session.id, None).await,
            Err(StoreError::TableFull)
        );
    }

    #[tokio::test]
    async fn join_is_idempotent_per_user_key() {
        let store = SessionStore::new();
        let session = store.create_multiplayer_table(None);

        let seat = store
            .join_multiplayer_table(&session.id, Some("alice"))
            .await
            .unwrap();
        let again = store
            .join_multiplayer_table(&session.id, Some("alice"))
            .await
            .unwrap();
        assert_eq!(seat, again);

        let other = store
            .join_multiplayer_table(&session.id, Some("bob"))
            .await
            .unwrap();
        assert_ne!(seat, other);
    }

    #[tokio::test]
    async fn join_rejects_unknown_and_single_tables() {
        let store = SessionStore::new();
        assert_eq!(
            store.join_multiplayer_table("TBL-MISSING", None).await,
            Err(StoreError::TableNotFound)
        );

        let (single, _) = store.get_or_create(Some("solo"), TableMode::Single);
        assert_eq!(
            store.join_multiplayer_table(&single.id, None).await,
            Err(StoreError::NotMultiplayer)
        );
    }

    #[tokio::test]
    async fn only_the_host_starts_and_start_is_idempotent() {
        let store = SessionStore::new();
        let session = store.create_multiplayer_table(None);
        store.join_multiplayer_table(&session.id, None).await.unwrap();

        assert_eq!(
            store
                .start_multiplayer_table(&session.id, &"p2".to_string())
                .await
                .unwrap_err(),
            StoreError::NotHost
        );

        store
            .start_multiplayer_table(&session.id, &"p1".to_string())
            .await
            .unwrap();
        let first_board = {
            let state = session.lock_state().await;
            assert!(state.started);
            state.engine.hole_cards.clone()
        };

        // Starting again must not deal a fresh hand.
        store
            .start_multiplayer_table(&session.id, &"p1".to_string())
            .await
            .unwrap();
        let state = session.lock_state().await;
        assert_eq!(state.engine.hole_cards, first_board);
    }

    #[tokio::test]
    async fn ended_tables_reject_join_and_start() {
        let store = SessionStore::new();
        let session = store.create_multiplayer_table(None);
        session.lock_state().await.table_ended = true;

        assert_eq!(
            store.join_multiplayer_table(&session.id, None).await,
            Err(StoreError::TableEnded)
        );
        assert_eq!(
            store
                .start_multiplayer_table(&session.id, &"p1".to_string())
                .await
                .unwrap_err(),
            StoreError::TableEnded
        );
    }

    #[tokio::test]
    async fn get_or_create_reuses_sessions() {
        let store = SessionStore::new();
        let (first, created) = store.get_or_create(Some("abc"), TableMode::Single);
        assert!(created);
        let (second, created) = store.get_or_create(Some("abc"), TableMode::Single);
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn expired_sessions_are_evicted() {
        let store = SessionStore::with_ttl(Duration::from_millis(10));
        let (session, _) = store.get_or_create(Some("short-lived"), TableMode::Single);
        assert_eq!(store.active_sessions().len(), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.get(&session.id).is_none());
        assert!(store.active_sessions().is_empty());
    }

    #[tokio::test]
    async fn touch_keeps_a_session_alive() {
        let store = SessionStore::with_ttl(Duration::from_millis(60));
        let (session, _) = store.get_or_create(Some("kept"), TableMode::Single);
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            store.touch(&session.id);
        }
        assert!(store.get(&session.id).is_some());
    }

    #[tokio::test]
    async fn sockets_track_human_seats() {
        let store = SessionStore::new();
        let (session, _) = store.get_or_create(Some("s"), TableMode::Single);
        let (tx, _rx) = mpsc::channel(4);
        let seat = "p1".to_string();

        session.register_socket(&seat, tx).await;
        {
            let state = session.lock_state().await;
            assert!(state.human_players.contains("p1"));
            assert!(state.sockets.contains_key("p1"));
        }

        session.remove_socket(&seat).await;
        let state = session.lock_state().await;
        assert!(!state.human_players.contains("p1"));
        assert!(state.sockets.is_empty());
    }
}
