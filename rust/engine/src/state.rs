//! Streets, queued events, and the engine's outward projections: the
//! per-viewer public state, the policy observation, and the hand
//! snapshot used for rollouts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::betting::{ActionKind, ActionRecord, SeatId};
use crate::cards::Card;

/// One betting round; `Showdown` is terminal. Monotonically
/// non-decreasing within a hand.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    /// Board size this street implies.
    pub fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River | Street::Showdown => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    DealHole,
    DealFlop,
    DealTurn,
    DealRiver,
    Showdown,
    HandEnd,
    NewHand,
    TableEnd,
}

impl EventKind {
    /// The wire name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::DealHole => "DEAL_HOLE",
            EventKind::DealFlop => "DEAL_FLOP",
            EventKind::DealTurn => "DEAL_TURN",
            EventKind::DealRiver => "DEAL_RIVER",
            EventKind::Showdown => "SHOWDOWN",
            EventKind::HandEnd => "HAND_END",
            EventKind::NewHand => "NEW_HAND",
            EventKind::TableEnd => "TABLE_END",
        }
    }
}

/// A state transition queued by the engine and broadcast in order to
/// every connected seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Per-viewer projection of the table. Hole cards appear only for the
/// viewing seat until showdown or hand end, when every live hand is
/// revealed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub street: Street,
    pub pot: u32,
    pub community_cards: Vec<Card>,
    #[serde(rename = "player_hand", default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed_hands: Option<BTreeMap<SeatId, Vec<Card>>>,
    pub folded_players: Vec<SeatId>,
    pub stacks: BTreeMap<SeatId, u32>,
    pub bets: BTreeMap<SeatId, u32>,
    pub button_player: SeatId,
    pub small_blind_player: SeatId,
    pub big_blind_player: SeatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_player: Option<SeatId>,
    pub legal_actions: Vec<ActionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_call: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_raise_to: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_raise_to: Option<u32>,
    pub action_history: Vec<ActionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_strength_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_strength_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand_category_probs: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub awaiting_hand_continue: bool,
}

/// Observation handed to a policy: the acting seat's private cards plus
/// everything public, with legal actions and raise bounds precomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiState {
    pub street: Street,
    pub legal_actions: Vec<ActionKind>,
    pub min_raise_to: u32,
    pub max_raise_to: u32,
    pub to_call: u32,
    pub stacks: BTreeMap<SeatId, u32>,
    pub bets: BTreeMap<SeatId, u32>,
    pub current_player: SeatId,
    pub big_blind: u32,
    pub pot: u32,
    pub community_cards: Vec<Card>,
    pub hand: Vec<Card>,
    pub action_history: Vec<ActionRecord>,
}

/// Serializable mid-hand snapshot. [`crate::engine::Engine::load_hand`]
/// restores it; trainers clone engines through it instead of aliasing
/// live state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandSnapshot {
    pub board: Vec<Card>,
    pub hole_cards: BTreeMap<SeatId, Vec<Card>>,
    pub street: Street,
    pub stacks: BTreeMap<SeatId, u32>,
    pub bets: BTreeMap<SeatId, u32>,
    pub pot: u32,
    pub action_history: Vec<ActionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_player: Option<SeatId>,
    pub hand_over: bool,
    pub folded_players: Vec<SeatId>,
    pub all_in_players: Vec<SeatId>,
    pub pending_players: Vec<SeatId>,
}
