//! Hand lifecycle: button rotation, dealing, street progression, and
//! showdown resolution on top of [`BettingState`].

use serde_json::json;
use std::collections::BTreeMap;

use crate::betting::{Action, BettingState, SeatId};
use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::{GameError, StepError};
use crate::estimator::StrengthEstimator;
use crate::eval::{category_label, score_hand};
use crate::state::{AiState, EventKind, EventMessage, HandSnapshot, PublicState, Street};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// The full seat order of a default table.
pub fn default_players() -> Vec<SeatId> {
    ["p1", "p2", "p3", "p4", "p5"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Drives one table across hands: deals, routes actions into the betting
/// state machine, advances streets when a round settles, and resolves
/// showdowns through the evaluator. State transitions queue
/// [`EventMessage`]s which the caller drains and broadcasts.
#[derive(Debug, Clone)]
pub struct Engine {
    pub deck: Deck,
    pub board: Vec<Card>,
    pub hole_cards: BTreeMap<SeatId, Vec<Card>>,
    pub street: Street,
    pub betting: BettingState,
    pub players: Vec<SeatId>,
    pub button_index: usize,
    pub button_player: SeatId,
    pub sb_player: SeatId,
    pub bb_player: SeatId,
    pending_events: Vec<EventMessage>,
    starting_stacks: BTreeMap<SeatId, u32>,
    estimator: Option<StrengthEstimator>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(default_players())
    }
}

impl Engine {
    pub fn new(players: Vec<SeatId>) -> Self {
        let button_player = players.first().cloned().unwrap_or_default();
        let bb_player = players.get(1).cloned().unwrap_or_default();
        Self {
            deck: Deck::new_with_seed(rand::random()),
            board: Vec::with_capacity(5),
            hole_cards: BTreeMap::new(),
            street: Street::Preflop,
            betting: BettingState::default(),
            players,
            button_index: 0,
            button_player: button_player.clone(),
            sb_player: button_player,
            bb_player,
            pending_events: Vec::new(),
            starting_stacks: BTreeMap::new(),
            estimator: None,
        }
    }

    /// Enables the Monte Carlo strength annotation in public states.
    pub fn with_estimator(mut self, estimator: StrengthEstimator) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Starts a hand: optionally rotates the button, skips busted seats,
    /// derives blind positions (heads-up: the button posts the small
    /// blind and acts first preflop), shuffles a fresh seeded deck and
    /// deals two hole cards to every funded seat.
    pub fn new_hand(&mut self, seed: Option<u64>, rotate_button: bool) -> Result<(), GameError> {
        if self.players.len() < 2 || self.players.len() > 5 {
            return Err(GameError::InvalidSeatCount {
                count: self.players.len(),
            });
        }

        if rotate_button {
            self.button_index = (self.button_index + 1) % self.players.len();
        }
        self.button_index %= self.players.len();

        let mut hand_players = self.eligible_players();
        if hand_players.is_empty() {
            hand_players = self.players.clone();
        }

        self.button_player = self
            .next_eligible_from(&hand_players, self.button_index)
            .unwrap_or_else(|| hand_players[0].clone());
        let button_pos = hand_players
            .iter()
            .position(|seat| *seat == self.button_player)
            .unwrap_or(0);

        let n = hand_players.len();
        let (sb_pos, bb_pos, first_to_act) = if n == 2 {
            // Heads-up: button is the small blind and opens the preflop
            // betting.
            (button_pos, (button_pos + 1) % n, hand_players[button_pos].clone())
        } else {
            let sb = (button_pos + 1) % n;
            let bb = (button_pos + 2) % n;
            (sb, bb, hand_players[(bb + 1) % n].clone())
        };
        self.sb_player = hand_players[sb_pos].clone();
        self.bb_player = hand_players[bb_pos].clone();

        self.deck = Deck::new_with_seed(seed.unwrap_or_else(rand::random));
        self.deck.shuffle();
        self.board.clear();
        self.street = Street::Preflop;

        self.hole_cards.clear();
        for seat in self.players.clone() {
            let cards = if hand_players.contains(&seat) {
                self.deck.deal(2)?
            } else {
                Vec::new()
            };
            self.hole_cards.insert(seat, cards);
        }

        let sb_player = self.sb_player.clone();
        let bb_player = self.bb_player.clone();
        self.betting
            .start_hand(&hand_players, &sb_player, &bb_player, &first_to_act);
        self.starting_stacks = self.betting.stacks.clone();

        self.queue_event(
            EventKind::DealHole,
            json!({"street": self.street, "cards": []}),
        );
        Ok(())
    }

    pub fn start_next_hand(&mut self, seed: Option<u64>) -> Result<(), GameError> {
        self.new_hand(seed, true)
    }

    pub fn deal_flop(&mut self) -> Result<(), GameError> {
        self.deal_street(Street::Flop, 3, EventKind::DealFlop)
    }

    pub fn deal_turn(&mut self) -> Result<(), GameError> {
        self.deal_street(Street::Turn, 1, EventKind::DealTurn)
    }

    pub fn deal_river(&mut self) -> Result<(), GameError> {
        self.deal_street(Street::River, 1, EventKind::DealRiver)
    }

    fn deal_street(
        &mut self,
        street: Street,
        count: usize,
        event: EventKind,
    ) -> Result<(), GameError> {
        let dealt = self.deck.deal(count)?;
        self.board.extend_from_slice(&dealt);
        self.street = street;
        self.queue_event(event, json!({"street": street, "cards": dealt}));
        Ok(())
    }

    /// Applies a seat's action. A fold that leaves one contender pays out
    /// immediately; a settled round deals the next street or resolves the
    /// showdown.
    pub fn step(&mut self, action: &Action, seat: &SeatId) -> Result<(), StepError> {
        let result = self.betting.step(action, seat)?;

        if result.hand_over {
            if let Some(winner) = result.winner {
                self.end_hand_by_fold(&winner);
            }
            return Ok(());
        }

        if result.round_complete {
            self.advance_street()?;
        }
        Ok(())
    }

    /// Explicit runout path: when no seat is due to act (every live seat
    /// is all-in) the hand still has streets to deal. Advances exactly
    /// one street per call so callers can pace and broadcast in between.
    /// Returns whether anything advanced.
    pub fn advance_without_actor(&mut self) -> Result<bool, GameError> {
        if self.betting.hand_over
            || self.betting.current_player.is_some()
            || !self.betting.pending_players.is_empty()
        {
            return Ok(false);
        }
        match self.street {
            Street::Showdown => Ok(false),
            _ => {
                self.advance_street()?;
                Ok(true)
            }
        }
    }

    fn advance_street(&mut self) -> Result<(), GameError> {
        match self.street {
            Street::Preflop => {
                self.deal_flop()?;
                self.open_round();
            }
            Street::Flop => {
                self.deal_turn()?;
                self.open_round();
            }
            Street::Turn => {
                self.deal_river()?;
                self.open_round();
            }
            Street::River => self.resolve_showdown()?,
            Street::Showdown => {}
        }
        Ok(())
    }

    fn open_round(&mut self) {
        let first = self.first_to_act_postflop();
        self.betting.start_new_round(&first);
    }

    /// Scores every live hand against the full board; the lowest score
    /// wins and ties split the pot with the remainder going to the
    /// button.
    pub fn resolve_showdown(&mut self) -> Result<(), GameError> {
        if self.board.len() < 5 {
            return Err(GameError::BoardIncomplete {
                board_len: self.board.len(),
            });
        }

        let mut best_score = u32::MAX;
        let mut winners: Vec<SeatId> = Vec::new();
        for seat in self.betting.active_players() {
            let hole = match self.hole_cards.get(&seat) {
                Some(cards) if cards.len() == 2 => cards,
                _ => continue,
            };
            let score = score_hand(hole, &self.board);
            if score < best_score {
                best_score = score;
                winners = vec![seat];
            } else if score == best_score {
                winners.push(seat);
            }
        }
        if winners.is_empty() {
            winners = self.betting.active_players();
        }

        let pot_total = self.betting.pot;
        let category = (best_score != u32::MAX).then(|| category_label(best_score));
        let button = self.button_player.clone();
        self.betting.payout(&winners, Some(&button));
        self.street = Street::Showdown;

        let winner_field = if winners.len() == 1 {
            json!(winners[0])
        } else {
            json!(winners)
        };
        self.queue_event(
            EventKind::HandEnd,
            json!({"winner": winner_field, "hand_category": category, "pot": pot_total}),
        );
        Ok(())
    }

    fn end_hand_by_fold(&mut self, winner: &SeatId) {
        let pot_total = self.betting.pot;
        let button = self.button_player.clone();
        self.betting.payout(std::slice::from_ref(winner), Some(&button));
        self.street = Street::Showdown;
        self.queue_event(
            EventKind::HandEnd,
            json!({"winner": winner, "hand_category": null, "pot": pot_total}),
        );
    }

    pub fn drain_events(&mut self) -> Vec<EventMessage> {
        std::mem::take(&mut self.pending_events)
    }

    fn queue_event(&mut self, event: EventKind, data: serde_json::Value) {
        self.pending_events.push(EventMessage {
            event,
            data: Some(data),
        });
    }

    pub fn is_terminal(&self) -> bool {
        self.street == Street::Showdown || self.betting.hand_over
    }

    /// Chip delta for a seat since the hand started; the trainer's
    /// terminal utility.
    pub fn utility(&self, seat: &SeatId) -> i64 {
        let starting = self
            .starting_stacks
            .get(seat)
            .copied()
            .unwrap_or(self.betting.starting_stack);
        self.betting.stack(seat) as i64 - starting as i64
    }

    pub fn starting_stacks(&self) -> &BTreeMap<SeatId, u32> {
        &self.starting_stacks
    }

    /// Per-viewer projection. Only `viewer`'s hole cards are included
    /// until showdown or hand end, when every dealt-in hand is revealed.
    pub fn to_public_state(
        &mut self,
        viewer: Option<&SeatId>,
        session_id: Option<&str>,
    ) -> PublicState {
        let current = self.betting.current_player.clone();
        let (to_call, min_raise_to, max_raise_to) = match &current {
            Some(seat) => (
                Some(self.betting.to_call(seat)),
                Some(self.betting.min_raise_to()),
                Some(self.betting.max_raise_to(seat)),
            ),
            None => (None, None, None),
        };

        let hand = viewer.and_then(|seat| self.hole_cards.get(seat).cloned());
        let revealed_hands = if self.street == Street::Showdown || self.betting.hand_over {
            Some(
                self.hole_cards
                    .iter()
                    .filter(|(_, cards)| cards.len() == 2)
                    .map(|(seat, cards)| (seat.clone(), cards.clone()))
                    .collect(),
            )
        } else {
            None
        };

        let (hand_strength_label, hand_strength_pct, hand_category_probs) =
            self.viewer_strength(viewer);

        let history = &self.betting.action_history;
        let skip = history.len().saturating_sub(DEFAULT_HISTORY_LIMIT);

        PublicState {
            session_id: session_id.map(|s| s.to_string()),
            street: self.street,
            pot: self.betting.pot,
            community_cards: self.board.clone(),
            hand,
            revealed_hands,
            folded_players: self.betting.folded_players.iter().cloned().collect(),
            stacks: self.betting.stacks.clone(),
            bets: self.betting.contributions.clone(),
            button_player: self.button_player.clone(),
            small_blind_player: self.sb_player.clone(),
            big_blind_player: self.bb_player.clone(),
            current_player: current,
            legal_actions: self.betting.legal_actions(),
            to_call,
            min_raise_to,
            max_raise_to,
            action_history: history[skip..].to_vec(),
            hand_strength_label,
            hand_strength_pct,
            hand_category_probs,
            awaiting_hand_continue: false,
        }
    }

    /// Observation for the acting seat's policy.
    pub fn to_ai_state(&self) -> Result<AiState, GameError> {
        let current = self
            .betting
            .current_player
            .clone()
            .ok_or(GameError::NoCurrentActor)?;
        Ok(AiState {
            street: self.street,
            legal_actions: self.betting.legal_actions(),
            min_raise_to: self.betting.min_raise_to(),
            max_raise_to: self.betting.max_raise_to(&current),
            to_call: self.betting.to_call(&current),
            stacks: self.betting.stacks.clone(),
            bets: self.betting.contributions.clone(),
            big_blind: self.betting.big_blind,
            pot: self.betting.pot,
            community_cards: self.board.clone(),
            hand: self.hole_cards.get(&current).cloned().unwrap_or_default(),
            action_history: self.betting.action_history.clone(),
            current_player: current,
        })
    }

    pub fn snapshot(&self) -> HandSnapshot {
        HandSnapshot {
            board: self.board.clone(),
            hole_cards: self.hole_cards.clone(),
            street: self.street,
            stacks: self.betting.stacks.clone(),
            bets: self.betting.contributions.clone(),
            pot: self.betting.pot,
            action_history: self.betting.action_history.clone(),
            current_player: self.betting.current_player.clone(),
            hand_over: self.betting.hand_over,
            folded_players: self.betting.folded_players.iter().cloned().collect(),
            all_in_players: self.betting.all_in_players.iter().cloned().collect(),
            pending_players: self.betting.pending_players.iter().cloned().collect(),
        }
    }

    /// Restores a mid-hand snapshot. Seats absent from the snapshot get
    /// empty hands, starting stacks, and zero bets.
    pub fn load_hand(&mut self, snapshot: HandSnapshot) {
        self.deck = Deck::new_with_seed(rand::random());
        self.board = snapshot.board;
        self.street = snapshot.street;

        self.hole_cards = snapshot.hole_cards;
        for seat in &self.players {
            self.hole_cards.entry(seat.clone()).or_default();
        }

        let mut stacks = snapshot.stacks;
        for seat in &self.players {
            stacks
                .entry(seat.clone())
                .or_insert(self.betting.starting_stack);
        }
        self.starting_stacks = stacks.clone();
        self.betting.stacks = stacks;

        let mut bets = snapshot.bets;
        for seat in &self.players {
            bets.entry(seat.clone()).or_insert(0);
        }
        self.betting.contributions = bets;

        self.betting.players = self.players.clone();
        self.betting.pot = snapshot.pot;
        // The bet level is derived from the restored contributions; the
        // raise increment resets to its opening value.
        self.betting.current_bet = self
            .betting
            .contributions
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        self.betting.last_raise_size = self.betting.big_blind;
        self.betting.action_history = snapshot.action_history;
        self.betting.hand_over = snapshot.hand_over;
        self.betting.folded_players = snapshot.folded_players.into_iter().collect();
        self.betting.all_in_players = snapshot.all_in_players.into_iter().collect();
        self.betting.pending_players = snapshot.pending_players.into_iter().collect();
        self.betting.current_player = snapshot
            .current_player
            .filter(|seat| self.players.contains(seat))
            .or_else(|| Some(self.first_to_act_preflop()));
    }

    fn viewer_strength(
        &mut self,
        viewer: Option<&SeatId>,
    ) -> (Option<String>, Option<f64>, Option<BTreeMap<String, f64>>) {
        if self.estimator.is_none() {
            return (None, None, None);
        }
        let viewer = match viewer {
            Some(seat) => seat,
            None => return (None, None, None),
        };
        let hole = match self.hole_cards.get(viewer) {
            Some(cards) if cards.len() == 2 => cards.clone(),
            _ => return (None, None, None),
        };

        let label = if self.board.len() >= 3 {
            category_label(score_hand(&hole, &self.board)).to_string()
        } else if hole[0].rank == hole[1].rank {
            "Pocket Pair".to_string()
        } else if hole[0].suit == hole[1].suit {
            "Suited".to_string()
        } else {
            "High Card".to_string()
        };

        let opponents = self
            .betting
            .active_players()
            .iter()
            .filter(|seat| *seat != viewer)
            .count();
        let board = self.board.clone();
        let (equity, probs) = match self.estimator.as_mut() {
            Some(estimator) => estimator.estimate(&hole, &board, opponents),
            None => return (Some(label), None, None),
        };

        let round1 = |x: f64| (x * 10.0).round() / 10.0;
        let rounded: BTreeMap<String, f64> = probs
            .into_iter()
            .map(|(name, prob)| (name, round1(prob)))
            .collect();
        (Some(label), Some(round1(equity * 100.0)), Some(rounded))
    }

    fn eligible_players(&self) -> Vec<SeatId> {
        if self.betting.stacks.is_empty() {
            return self.players.clone();
        }
        self.players
            .iter()
            .filter(|seat| {
                self.betting
                    .stacks
                    .get(*seat)
                    .copied()
                    .unwrap_or(self.betting.starting_stack)
                    > 0
            })
            .cloned()
            .collect()
    }

    fn next_eligible_from(&self, eligible: &[SeatId], start_index: usize) -> Option<SeatId> {
        if eligible.is_empty() {
            return None;
        }
        let len = self.players.len();
        for offset in 0..len {
            let candidate = &self.players[(start_index + offset) % len];
            if eligible.contains(candidate) {
                return Some(candidate.clone());
            }
        }
        None
    }

    fn small_blind_index(&self) -> usize {
        if self.players.len() == 2 {
            self.button_index
        } else {
            (self.button_index + 1) % self.players.len()
        }
    }

    fn big_blind_index(&self) -> usize {
        if self.players.len() == 2 {
            (self.button_index + 1) % self.players.len()
        } else {
            (self.button_index + 2) % self.players.len()
        }
    }

    fn first_to_act_preflop(&self) -> SeatId {
        if self.players.len() == 2 {
            self.players[self.small_blind_index()].clone()
        } else {
            self.players[(self.big_blind_index() + 1) % self.players.len()].clone()
        }
    }

    fn first_to_act_postflop(&self) -> SeatId {
        let players = if self.betting.players.is_empty() {
            &self.players
        } else {
            &self.betting.players
        };
        if players.is_empty() {
            return self.button_player.clone();
        }

        let start = players
            .iter()
            .position(|seat| *seat == self.button_player)
            .map(|i| (i + 1) % players.len())
            .unwrap_or(0);
        for offset in 0..players.len() {
            let candidate = &players[(start + offset) % players.len()];
            if self.betting.folded_players.contains(candidate)
                || self.betting.all_in_players.contains(candidate)
            {
                continue;
            }
            return candidate.clone();
        }
        players[start].clone()
    }
}
