//! Turn orchestration over the duplex client channel.
//!
//! One connection handler per socket: validate the handshake, map
//! inbound `MOVE`/`CONTINUE` messages onto the engine, drive AI seats
//! between human moves, and fan out events plus a per-viewer state
//! projection to every connected seat. All processing for a session
//! happens under its state lock, so observers see one total order.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};

use felt_ai::{bucketing, create_policy, Policy};
use felt_engine::betting::{Action, ActionKind, SeatId};
use felt_engine::engine::Engine;
use felt_engine::errors::StepError;
use felt_engine::state::{EventKind, EventMessage, Street};

use crate::config::AppConfig;
use crate::messages::{
    message_type, parse_json_payload, parse_move, ClientMessage, ErrorCode, ErrorMessage,
    ServerMessage,
};
use crate::replay::ReplayBuffer;
use crate::session::{
    SeatSender, Session, SessionStore, TableMode, TableState, SOCKET_CHANNEL_BUFFER,
};

/// Connection parameters carried in the websocket query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    pub session_id: Option<String>,
    pub player_id: Option<String>,
    pub mode: Option<String>,
}

/// First legal action in safe-preference order; the substitute when a
/// policy fails or returns something the rules reject.
fn fallback_action(engine: &Engine) -> Option<Action> {
    let legal = engine.betting.legal_actions();
    for kind in [
        ActionKind::Check,
        ActionKind::Call,
        ActionKind::Fold,
        ActionKind::Raise,
    ] {
        if legal.contains(&kind) {
            return Some(match kind {
                ActionKind::Raise => Action::raise_to(engine.betting.min_raise_to()),
                ActionKind::Check => Action::check(),
                ActionKind::Call => Action::call(),
                ActionKind::Fold => Action::fold(),
            });
        }
    }
    None
}

pub struct TurnOrchestrator {
    store: Arc<SessionStore>,
    policy: Box<dyn Policy>,
    replay: Option<ReplayBuffer>,
    config: AppConfig,
}

impl TurnOrchestrator {
    pub fn new(store: Arc<SessionStore>, config: AppConfig) -> Self {
        let policy = create_policy(
            &config.ai_mode,
            config.ai_seed,
            config.ai_strategy_path.as_deref(),
        );
        let replay = if config.replay_enabled {
            match ReplayBuffer::new(config.replay_capacity) {
                Ok(buffer) => Some(buffer),
                Err(err) => {
                    tracing::warn!(error = %err, "replay buffer disabled");
                    None
                }
            }
        } else {
            None
        };
        Self {
            store,
            policy,
            replay,
            config,
        }
    }

    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    pub fn replay(&self) -> Option<&ReplayBuffer> {
        self.replay.as_ref()
    }

    /// Owns one client connection from handshake to disconnect.
    pub async fn handle_connection(self: Arc<Self>, socket: WebSocket, query: WsQuery) {
        let (mut ws_tx, mut ws_rx) = socket.split();
        let (tx, mut rx) = mpsc::channel::<ServerMessage>(SOCKET_CHANNEL_BUFFER);

        let writer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let text = match serde_json::to_string(&message) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to serialize server message");
                        continue;
                    }
                };
                if ws_tx.send(Message::text(text)).await.is_err() {
                    break;
                }
            }
            let _ = ws_tx.close().await;
        });

        let seat: SeatId = query
            .player_id
            .clone()
            .filter(|seat| !seat.is_empty())
            .unwrap_or_else(|| "p1".to_string());

        let session = match self.handshake(&query, &seat, &tx).await {
            Some(session) => session,
            None => {
                drop(tx);
                let _ = writer.await;
                return;
            }
        };

        while let Some(incoming) = ws_rx.next().await {
            let message = match incoming {
                Ok(message) => message,
                Err(_) => break,
            };
            if message.is_close() {
                break;
            }
            let text = match message.to_str() {
                Ok(text) => text,
                Err(_) => continue, // binary frames are ignored
            };
            self.process_message(&session, &seat, text, &tx).await;
        }

        tracing::info!(session_id = %session.id, seat = %seat, "websocket disconnected");
        self.trace(&session.id, format!("DISCONNECT player={seat}"));
        session.remove_socket(&seat).await;
        drop(tx);
        let _ = writer.await;
    }

    /// Validates connection parameters and brings the session to a
    /// broadcastable state. Returns `None` after a connection-fatal
    /// error has been sent.
    async fn handshake(
        &self,
        query: &WsQuery,
        seat: &SeatId,
        tx: &SeatSender,
    ) -> Option<Arc<Session>> {
        let session_id = query
            .session_id
            .as_deref()
            .filter(|id| !id.trim().is_empty());
        let mut mode = match query.mode.as_deref() {
            Some(raw) if raw.trim().eq_ignore_ascii_case("multi") => TableMode::Multi,
            _ => TableMode::Single,
        };
        let existing = session_id.and_then(|id| self.store.get(id));
        if matches!(&existing, Some(session) if session.mode == TableMode::Multi) {
            mode = TableMode::Multi;
        }

        let (session, created) = if mode == TableMode::Multi {
            let id = match session_id {
                Some(id) => id,
                None => {
                    self.send_error(
                        tx,
                        ErrorMessage::new(
                            ErrorCode::MissingTableId,
                            "Missing table_id (session_id) for multiplayer",
                        ),
                    )
                    .await;
                    return None;
                }
            };
            let session = match existing {
                Some(session) => session,
                None => {
                    self.send_error(
                        tx,
                        ErrorMessage::with_details(
                            ErrorCode::TableNotFound,
                            "Table not found",
                            vec![format!("session_id={id}")],
                        ),
                    )
                    .await;
                    return None;
                }
            };
            if session.mode != TableMode::Multi {
                self.send_error(
                    tx,
                    ErrorMessage::new(
                        ErrorCode::InvalidTableMode,
                        "session_id does not reference a multiplayer table",
                    ),
                )
                .await;
                return None;
            }
            (session, false)
        } else {
            if let Some(id) = session_id {
                if id.to_ascii_uppercase().starts_with("TBL-") {
                    self.send_error(
                        tx,
                        ErrorMessage::with_details(
                            ErrorCode::InvalidSingleSessionId,
                            "Table-style session_id requires multiplayer mode",
                            vec![
                                format!("session_id={id}"),
                                "Use mode=multi for TBL-* ids".to_string(),
                            ],
                        ),
                    )
                    .await;
                    return None;
                }
            }
            self.store.get_or_create(session_id, TableMode::Single)
        };

        tracing::info!(session_id = %session.id, seat = %seat, created, "websocket connected");
        self.trace(
            &session.id,
            format!("CONNECT player={seat} created={created}"),
        );

        let mut state = session.lock_state().await;

        if !state.engine.players.contains(seat) {
            self.send_error(
                tx,
                ErrorMessage::with_details(
                    ErrorCode::InvalidPlayerId,
                    "Invalid player_id",
                    vec![format!("{seat} is not a valid seat")],
                ),
            )
            .await;
            return None;
        }

        if session.mode == TableMode::Multi {
            if !state.joined_players.contains(seat) {
                self.send_error(
                    tx,
                    ErrorMessage::with_details(
                        ErrorCode::SeatNotJoined,
                        "Seat is not part of this table",
                        vec![format!("{seat} has not joined table {}", session.id)],
                    ),
                )
                .await;
                return None;
            }
            if !state.started {
                self.send_error(
                    tx,
                    ErrorMessage::new(
                        ErrorCode::TableNotStarted,
                        "Host has not started this table yet",
                    ),
                )
                .await;
                return None;
            }
        }

        state.sockets.insert(seat.clone(), tx.clone());
        state.human_players.insert(seat.clone());
        session.touch();

        if session.mode == TableMode::Single && (created || !state.started) {
            if let Err(err) = state.engine.new_hand(None, false) {
                tracing::error!(session_id = %session.id, error = %err, "failed to deal first hand");
                return None;
            }
            state.started = true;
            self.trace(
                &session.id,
                format!(
                    "NEW_HAND button={} current={:?}",
                    state.engine.button_player, state.engine.betting.current_player
                ),
            );
        }

        self.broadcast_update(&session, &mut state).await;
        self.run_ai_turns(&session, &mut state).await;
        drop(state);

        Some(session)
    }

    async fn process_message(
        &self,
        session: &Arc<Session>,
        seat: &SeatId,
        raw: &str,
        tx: &SeatSender,
    ) {
        let payload = match parse_json_payload(raw) {
            Ok(payload) => payload,
            Err(detail) => {
                self.send_error(
                    tx,
                    ErrorMessage::with_details(
                        ErrorCode::InvalidJson,
                        "Invalid JSON",
                        vec![detail],
                    ),
                )
                .await;
                return;
            }
        };

        session.touch();
        let mut state = session.lock_state().await;

        if session.mode == TableMode::Multi && state.table_ended {
            self.send_error(
                tx,
                ErrorMessage::with_details(
                    ErrorCode::TableEnded,
                    "This table has ended",
                    vec!["Create a new table to continue playing".to_string()],
                ),
            )
            .await;
            return;
        }

        let message = if message_type(&payload) == "CONTINUE" {
            ClientMessage::Continue
        } else {
            match parse_move(&payload) {
                Ok(action) => ClientMessage::Move(action),
                Err(details) => {
                    self.send_error(
                        tx,
                        ErrorMessage::with_details(
                            ErrorCode::ValidationError,
                            "Invalid message",
                            details,
                        ),
                    )
                    .await;
                    return;
                }
            }
        };

        match message {
            ClientMessage::Continue => {
                self.handle_continue(session, seat, &mut state, tx).await;
            }
            ClientMessage::Move(action) => {
                self.handle_move(session, seat, action, &mut state, tx).await;
            }
        }
    }

    async fn handle_continue(
        &self,
        session: &Arc<Session>,
        seat: &SeatId,
        state: &mut TableState,
        tx: &SeatSender,
    ) {
        if !state.engine.betting.hand_over {
            self.send_error(
                tx,
                ErrorMessage::with_details(
                    ErrorCode::HandNotOver,
                    "Cannot continue yet",
                    vec!["The current hand is still in progress".to_string()],
                ),
            )
            .await;
            return;
        }
        if !state.awaiting_hand_continue {
            self.send_error(
                tx,
                ErrorMessage::new(
                    ErrorCode::HandContinueNotReady,
                    "Hand is not waiting for continue",
                ),
            )
            .await;
            return;
        }

        self.trace(&session.id, format!("HAND_CONTINUE by={seat}"));
        state.awaiting_hand_continue = false;
        if let Err(err) = state.engine.start_next_hand(None) {
            tracing::error!(session_id = %session.id, error = %err, "failed to start next hand");
            return;
        }
        self.trace(
            &session.id,
            format!(
                "NEXT_HAND_STARTED button={} current={:?}",
                state.engine.button_player, state.engine.betting.current_player
            ),
        );

        self.broadcast_new_hand(session, state).await;
        let events = state.engine.drain_events();
        self.broadcast_events(session, state, &events).await;
        self.broadcast_state(session, state).await;
        self.run_ai_turns(session, state).await;
    }

    async fn handle_move(
        &self,
        session: &Arc<Session>,
        seat: &SeatId,
        action: Action,
        state: &mut TableState,
        tx: &SeatSender,
    ) {
        let acting = state
            .engine
            .betting
            .current_player
            .clone()
            .unwrap_or_else(|| "p1".to_string());
        if acting != *seat {
            self.send_error(
                tx,
                ErrorMessage::with_details(
                    ErrorCode::NotYourTurn,
                    "Not your turn",
                    vec![format!("Current player is {acting}")],
                ),
            )
            .await;
            return;
        }

        self.trace(
            &session.id,
            format!(
                "HUMAN_MOVE player={acting} action={:?} amount={:?}",
                action.kind, action.amount
            ),
        );

        let street = state.engine.street;
        match state.engine.step(&action, &acting) {
            Ok(()) => {}
            Err(StepError::Action(err)) => {
                self.send_error(
                    tx,
                    ErrorMessage::with_details(
                        ErrorCode::InvalidAction,
                        "Invalid action",
                        vec![err.to_string()],
                    ),
                )
                .await;
                self.trace(
                    &session.id,
                    format!("HUMAN_MOVE_REJECTED player={acting} error={err}"),
                );
                return;
            }
            Err(StepError::Game(err)) => {
                tracing::error!(session_id = %session.id, error = %err, "engine failed to advance");
                self.send_error(
                    tx,
                    ErrorMessage::with_details(
                        ErrorCode::InvalidAction,
                        "Invalid action",
                        vec![err.to_string()],
                    ),
                )
                .await;
                return;
            }
        }

        let hand_ended = state.engine.betting.hand_over;
        self.record_experience(&acting, &action, street, &state.engine);
        self.broadcast_update(session, state).await;
        if !hand_ended {
            self.pause(&session.id, "human_move").await;
        }
        self.run_ai_turns(session, state).await;
    }

    /// Drives AI seats until a human is due, the hand ends, or the
    /// per-invocation action cap is hit.
    async fn run_ai_turns(&self, session: &Arc<Session>, state: &mut TableState) {
        if session.mode == TableMode::Multi && state.table_ended {
            return;
        }

        let max_actions = usize::max(10, state.engine.players.len() * 4);
        let mut actions_taken = 0;
        while !state.engine.betting.hand_over && actions_taken < max_actions {
            if self.repair_or_advance(session, state).await {
                continue;
            }

            let current = match state.engine.betting.current_player.clone() {
                Some(current) => current,
                None => break,
            };
            let mut human_controlled = state.human_players.clone();
            if session.mode == TableMode::Multi {
                human_controlled.extend(state.joined_players.iter().cloned());
            }
            if human_controlled.contains(&current) {
                break;
            }

            let observation = match state.engine.to_ai_state() {
                Ok(observation) => observation,
                Err(err) => {
                    tracing::error!(session_id = %session.id, error = %err, "no observation for AI seat");
                    break;
                }
            };
            let action = match self.policy.decide(&observation) {
                Ok(action) => action,
                Err(err) => {
                    tracing::warn!(
                        session_id = %session.id,
                        seat = %current,
                        error = %err,
                        "policy failed, substituting fallback action"
                    );
                    match fallback_action(&state.engine) {
                        Some(fallback) => fallback,
                        None => break,
                    }
                }
            };

            self.trace(
                &session.id,
                format!(
                    "AI_MOVE player={current} action={:?} amount={:?}",
                    action.kind, action.amount
                ),
            );
            let street = state.engine.street;
            let applied = match state.engine.step(&action, &current) {
                Ok(()) => action,
                Err(StepError::Action(err)) => {
                    tracing::warn!(
                        session_id = %session.id,
                        seat = %current,
                        error = %err,
                        "AI action rejected, retrying with fallback"
                    );
                    let fallback = match fallback_action(&state.engine) {
                        Some(fallback) => fallback,
                        None => break,
                    };
                    match state.engine.step(&fallback, &current) {
                        Ok(()) => fallback,
                        Err(err) => {
                            self.trace(
                                &session.id,
                                format!("AI_FALLBACK_REJECTED player={current} error={err}"),
                            );
                            break;
                        }
                    }
                }
                Err(StepError::Game(err)) => {
                    tracing::error!(session_id = %session.id, error = %err, "engine failed during AI turn");
                    break;
                }
            };

            let hand_ended = state.engine.betting.hand_over;
            self.record_experience(&current, &applied, street, &state.engine);
            self.broadcast_update(session, state).await;
            actions_taken += 1;
            if !hand_ended {
                self.pause(&session.id, "ai_move").await;
            }
        }
    }

    /// Repairs an ineligible actor (safety net; the betting state is
    /// supposed to uphold the invariant itself) or, with no actor due,
    /// advances one street of the all-in runout. Returns whether
    /// anything progressed.
    async fn repair_or_advance(&self, session: &Arc<Session>, state: &mut TableState) -> bool {
        if let Some(current) = state.engine.betting.current_player.clone() {
            let betting = &state.engine.betting;
            let eligible = betting.pending_players.contains(&current)
                && !betting.folded_players.contains(&current)
                && !betting.all_in_players.contains(&current);
            if eligible {
                return false;
            }

            let next = betting.next_player(&current).or_else(|| {
                state
                    .engine
                    .players
                    .iter()
                    .find(|candidate| {
                        betting.pending_players.contains(*candidate)
                            && !betting.folded_players.contains(*candidate)
                            && !betting.all_in_players.contains(*candidate)
                    })
                    .cloned()
            });
            tracing::warn!(
                session_id = %session.id,
                previous = %current,
                next = ?next,
                "actor invariant violated, repairing turn state"
            );
            self.trace(
                &session.id,
                format!("TURN_REPAIRED previous={current} next={next:?}"),
            );
            state.engine.betting.current_player = next.clone();
            if next.is_some() {
                let hand_ended = state.engine.betting.hand_over;
                self.broadcast_update(session, state).await;
                if !hand_ended {
                    self.pause(&session.id, "turn_repair").await;
                }
                return true;
            }
            // No eligible seat at all: fall through to the runout.
        }

        match state.engine.advance_without_actor() {
            Ok(true) => {
                self.trace(
                    &session.id,
                    format!("AUTO_PROGRESS street={:?} (no eligible actor)", state.engine.street),
                );
                let hand_ended = state.engine.betting.hand_over;
                self.broadcast_update(session, state).await;
                if !hand_ended {
                    self.pause(&session.id, "auto_progress").await;
                }
                true
            }
            Ok(false) => false,
            Err(err) => {
                tracing::error!(session_id = %session.id, error = %err, "street auto-advance failed");
                false
            }
        }
    }

    /// Drains queued events and fans out events + per-viewer state; at a
    /// hand end also audits chips and handles table termination.
    pub async fn broadcast_update(&self, session: &Arc<Session>, state: &mut TableState) {
        let hand_over = state.engine.betting.hand_over;
        let mut table_should_end = false;
        let mut funded: Vec<SeatId> = Vec::new();
        if hand_over {
            funded = state
                .engine
                .betting
                .stacks
                .iter()
                .filter(|(_, &chips)| chips > 0)
                .map(|(seat, _)| seat.clone())
                .collect();
            table_should_end = session.mode == TableMode::Multi && funded.len() <= 1;
            if !table_should_end && !state.awaiting_hand_continue {
                state.awaiting_hand_continue = true;
                self.trace(&session.id, "HAND_WAITING_FOR_CONTINUE");
            }
        }

        let events = state.engine.drain_events();
        self.broadcast_events(session, state, &events).await;
        self.broadcast_state(session, state).await;

        if hand_over {
            self.audit_chips(session, state);
            if table_should_end {
                state.awaiting_hand_continue = false;
                if !state.table_ended {
                    state.table_ended = true;
                    state.table_winners = funded.clone();
                    self.trace(
                        &session.id,
                        format!(
                            "TABLE_END winners={funded:?} stacks={:?}",
                            state.engine.betting.stacks
                        ),
                    );
                    // Give clients time to render the final hand before
                    // the table closes.
                    if self.config.hand_end_pause_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(self.config.hand_end_pause_ms))
                            .await;
                    }
                    let end_event = EventMessage {
                        event: EventKind::TableEnd,
                        data: Some(json!({
                            "winners": funded,
                            "stacks": state.engine.betting.stacks,
                        })),
                    };
                    self.broadcast_events(session, state, &[end_event]).await;
                }
                self.broadcast_state(session, state).await;
            }
        }
    }

    async fn broadcast_events(
        &self,
        session: &Arc<Session>,
        state: &mut TableState,
        events: &[EventMessage],
    ) {
        if events.is_empty() {
            return;
        }
        for event in events {
            self.trace(
                &session.id,
                format!("EVENT name={} data={:?}", event.event.as_str(), event.data),
            );
        }

        let sockets: Vec<(SeatId, SeatSender)> = state
            .sockets
            .iter()
            .map(|(seat, sender)| (seat.clone(), sender.clone()))
            .collect();
        for (seat, sender) in sockets {
            for event in events {
                if sender
                    .try_send(ServerMessage::event(event.clone()))
                    .is_err()
                {
                    self.drop_socket(session, state, &seat);
                    break;
                }
            }
        }
    }

    async fn broadcast_state(&self, session: &Arc<Session>, state: &mut TableState) {
        self.trace(
            &session.id,
            format!(
                "STATE street={:?} pot={} current={:?}",
                state.engine.street, state.engine.betting.pot, state.engine.betting.current_player
            ),
        );
        let awaiting = state.awaiting_hand_continue;
        let seats: Vec<SeatId> = state.sockets.keys().cloned().collect();
        for seat in seats {
            let mut public = state.engine.to_public_state(Some(&seat), Some(&session.id));
            public.awaiting_hand_continue = awaiting;
            let sender = match state.sockets.get(&seat) {
                Some(sender) => sender.clone(),
                None => continue,
            };
            if sender.try_send(ServerMessage::state(public)).is_err() {
                self.drop_socket(session, state, &seat);
            }
        }
    }

    /// `NEW_HAND` carries each viewer's fresh hole cards, so it is built
    /// per socket instead of broadcast verbatim.
    async fn broadcast_new_hand(&self, session: &Arc<Session>, state: &mut TableState) {
        let sockets: Vec<(SeatId, SeatSender)> = state
            .sockets
            .iter()
            .map(|(seat, sender)| (seat.clone(), sender.clone()))
            .collect();
        for (seat, sender) in sockets {
            let event = EventMessage {
                event: EventKind::NewHand,
                data: Some(json!({
                    "player_hand": state.engine.hole_cards.get(&seat).cloned().unwrap_or_default(),
                    "button": state.engine.button_player,
                    "small_blind_player": state.engine.sb_player,
                    "big_blind_player": state.engine.bb_player,
                    "current_player": state.engine.betting.current_player,
                })),
            };
            if sender.try_send(ServerMessage::event(event)).is_err() {
                self.drop_socket(session, state, &seat);
            }
        }
    }

    fn drop_socket(&self, session: &Session, state: &mut TableState, seat: &SeatId) {
        state.sockets.remove(seat);
        state.human_players.remove(seat);
        self.trace(
            &session.id,
            format!("DROP_SOCKET player={seat} reason=send_failed"),
        );
    }

    /// Chip-conservation audit at hand end. Never rolls anything back;
    /// a mismatch is logged for investigation.
    fn audit_chips(&self, session: &Session, state: &TableState) {
        let betting = &state.engine.betting;
        let total: u64 =
            betting.stacks.values().map(|&c| c as u64).sum::<u64>() + betting.pot as u64;
        let expected: u64 = state
            .engine
            .starting_stacks()
            .values()
            .map(|&c| c as u64)
            .sum();
        if total != expected {
            tracing::warn!(
                session_id = %session.id,
                total,
                expected,
                stacks = ?betting.stacks,
                "chip audit mismatch"
            );
            self.trace(
                &session.id,
                format!("CHIP_AUDIT_MISMATCH total={total} expected={expected}"),
            );
        } else {
            self.trace(&session.id, format!("CHIP_AUDIT_OK total={total}"));
        }
    }

    fn record_experience(&self, seat: &SeatId, action: &Action, street: Street, engine: &Engine) {
        let replay = match &self.replay {
            Some(replay) => replay,
            None => return,
        };
        let hole = engine.hole_cards.get(seat).cloned().unwrap_or_default();
        let history = &engine.betting.action_history;
        let prior = &history[..history.len().saturating_sub(1)];
        let infoset_id = bucketing::compute_infoset_id(
            seat,
            &hole,
            &engine.board,
            street,
            prior,
            engine.betting.pot,
            engine.betting.stack(seat),
            engine.betting.big_blind,
        );
        replay.add(json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "street": street,
            "player_to_act": seat,
            "infoset_id": infoset_id,
            "action_taken": action.kind,
            "amount": action.amount,
            "outcome": null,
        }));
    }

    async fn send_error(&self, tx: &SeatSender, error: ErrorMessage) {
        let _ = tx.send(ServerMessage::error(error)).await;
    }

    async fn pause(&self, session_id: &str, reason: &str) {
        if self.config.ai_turn_delay_ms == 0 {
            return;
        }
        self.trace(
            session_id,
            format!(
                "TURN_DELAY reason={reason} ms={}",
                self.config.ai_turn_delay_ms
            ),
        );
        tokio::time::sleep(Duration::from_millis(self.config.ai_turn_delay_ms)).await;
    }

    /// Per-session game trace, gated by `GAME_TRACE`.
    fn trace(&self, session_id: &str, message: impl AsRef<str>) {
        if self.config.game_trace {
            tracing::info!(
                target: "felt_web::game",
                session_id = %session_id,
                "{}",
                message.as_ref()
            );
        }
    }
}
