//! Per-hand betting state machine.
//!
//! Tracks blinds, per-street contributions, the pot, the acting seat and
//! the set of seats that still owe an action. Round completion is the
//! pending set draining to empty; a raise refills it with every live seat
//! that must respond. Stacks persist across hands; everything else resets
//! in [`BettingState::start_hand`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::ActionError;

/// Stable seat identifier (`p1`..`p5`); seat order is fixed at table
/// creation.
pub type SeatId = String;

pub const DEFAULT_SMALL_BLIND: u32 = 5;
pub const DEFAULT_BIG_BLIND: u32 = 10;
pub const DEFAULT_STARTING_STACK: u32 = 1000;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Check,
    Call,
    Fold,
    Raise,
}

/// A seat's move. `amount` is the raise *target* (the total contribution
/// to match after the raise) and is only present for raises.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

impl Action {
    pub fn check() -> Self {
        Action {
            kind: ActionKind::Check,
            amount: None,
        }
    }

    pub fn call() -> Self {
        Action {
            kind: ActionKind::Call,
            amount: None,
        }
    }

    pub fn fold() -> Self {
        Action {
            kind: ActionKind::Fold,
            amount: None,
        }
    }

    pub fn raise_to(amount: u32) -> Self {
        Action {
            kind: ActionKind::Raise,
            amount: Some(amount),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: SeatId,
    pub action: Action,
}

/// Outcome of one applied action.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StepResult {
    pub round_complete: bool,
    pub hand_over: bool,
    pub winner: Option<SeatId>,
}

/// Betting state for one hand. Seats in `players` are the seats dealt
/// into this hand; `stacks` may carry additional seats that are sitting
/// out after busting.
#[derive(Debug, Clone)]
pub struct BettingState {
    pub players: Vec<SeatId>,
    pub small_blind: u32,
    pub big_blind: u32,
    pub starting_stack: u32,
    pub stacks: BTreeMap<SeatId, u32>,
    pub contributions: BTreeMap<SeatId, u32>,
    pub pot: u32,
    pub current_bet: u32,
    pub last_raise_size: u32,
    pub current_player: Option<SeatId>,
    pub pending_players: BTreeSet<SeatId>,
    pub action_history: Vec<ActionRecord>,
    pub hand_over: bool,
    pub winners: Vec<SeatId>,
    pub folded_players: BTreeSet<SeatId>,
    pub all_in_players: BTreeSet<SeatId>,
}

impl Default for BettingState {
    fn default() -> Self {
        Self::new(
            DEFAULT_SMALL_BLIND,
            DEFAULT_BIG_BLIND,
            DEFAULT_STARTING_STACK,
        )
    }
}

impl BettingState {
    pub fn new(small_blind: u32, big_blind: u32, starting_stack: u32) -> Self {
        Self {
            players: Vec::new(),
            small_blind,
            big_blind,
            starting_stack,
            stacks: BTreeMap::new(),
            contributions: BTreeMap::new(),
            pot: 0,
            current_bet: 0,
            last_raise_size: big_blind,
            current_player: None,
            pending_players: BTreeSet::new(),
            action_history: Vec::new(),
            hand_over: false,
            winners: Vec::new(),
            folded_players: BTreeSet::new(),
            all_in_players: BTreeSet::new(),
        }
    }

    /// Resets per-hand state and posts blinds. Stacks persist across
    /// hands; seats seen for the first time are topped up to the starting
    /// stack. A seat whose whole stack goes in on a blind starts the hand
    /// all-in.
    pub fn start_hand(
        &mut self,
        players: &[SeatId],
        sb_player: &SeatId,
        bb_player: &SeatId,
        first_to_act: &SeatId,
    ) {
        self.players = players.to_vec();
        for seat in &self.players {
            self.stacks.entry(seat.clone()).or_insert(self.starting_stack);
        }

        self.contributions = self.stacks.keys().map(|seat| (seat.clone(), 0)).collect();
        self.pot = 0;
        self.current_bet = 0;
        self.last_raise_size = self.big_blind;
        self.pending_players.clear();
        self.action_history.clear();
        self.hand_over = false;
        self.winners.clear();
        self.folded_players.clear();
        self.all_in_players.clear();

        if self.players.len() < 2 {
            self.hand_over = true;
            self.winners = self.players.clone();
            self.current_player = None;
            return;
        }

        self.post_blind(sb_player, self.small_blind);
        self.post_blind(bb_player, self.big_blind);
        self.current_bet = self
            .players
            .iter()
            .map(|seat| self.contribution(seat))
            .max()
            .unwrap_or(0);
        self.all_in_players = self
            .players
            .iter()
            .filter(|seat| self.stack(seat) == 0)
            .cloned()
            .collect();
        self.pending_players = self
            .active_players()
            .into_iter()
            .filter(|seat| !self.all_in_players.contains(seat))
            .collect();
        self.seat_actor(first_to_act);
    }

    /// Opens a fresh betting round for the next street. Contributions and
    /// the bet level reset; folded and all-in seats stay out.
    pub fn start_new_round(&mut self, first_to_act: &SeatId) {
        for seat in self.players.clone() {
            self.contributions.insert(seat, 0);
        }
        self.current_bet = 0;
        self.last_raise_size = self.big_blind;
        self.pending_players = self
            .active_players()
            .into_iter()
            .filter(|seat| !self.all_in_players.contains(seat))
            .collect();
        self.seat_actor(first_to_act);
    }

    pub fn legal_actions(&self) -> Vec<ActionKind> {
        let seat = match (&self.current_player, self.hand_over) {
            (Some(seat), false) => seat,
            _ => return Vec::new(),
        };

        let to_call = self.to_call(seat);
        let stack = self.stack(seat);
        let mut actions = vec![ActionKind::Fold];

        if to_call == 0 {
            actions.push(ActionKind::Check);
        } else if stack > 0 {
            actions.push(ActionKind::Call);
        }

        if stack > to_call && self.contribution(seat) + stack > self.current_bet {
            actions.push(ActionKind::Raise);
        }

        actions
    }

    pub fn to_call(&self, seat: &SeatId) -> u32 {
        self.current_bet.saturating_sub(self.contribution(seat))
    }

    /// Minimum legal raise target: the current bet plus the last full
    /// raise increment, or the opening increment when nothing is bet yet.
    pub fn min_raise_to(&self) -> u32 {
        if self.current_bet == 0 {
            self.last_raise_size
        } else {
            self.current_bet + self.last_raise_size
        }
    }

    pub fn max_raise_to(&self, seat: &SeatId) -> u32 {
        self.contribution(seat) + self.stack(seat)
    }

    pub fn stack(&self, seat: &SeatId) -> u32 {
        self.stacks.get(seat).copied().unwrap_or(0)
    }

    pub fn contribution(&self, seat: &SeatId) -> u32 {
        self.contributions.get(seat).copied().unwrap_or(0)
    }

    /// Seats still contesting the hand, in seat order.
    pub fn active_players(&self) -> Vec<SeatId> {
        self.players
            .iter()
            .filter(|seat| !self.folded_players.contains(*seat))
            .cloned()
            .collect()
    }

    /// Applies one action for `seat`. On a rule violation the state is
    /// unchanged and the error describes the rejection.
    pub fn step(&mut self, action: &Action, seat: &SeatId) -> Result<StepResult, ActionError> {
        if self.hand_over {
            return Err(ActionError::HandOver);
        }
        if self.current_player.as_ref() != Some(seat) {
            return Err(ActionError::OutOfTurn { seat: seat.clone() });
        }
        if self.folded_players.contains(seat) {
            return Err(ActionError::AlreadyFolded { seat: seat.clone() });
        }

        let to_call = self.to_call(seat);
        let mut round_complete;

        match action.kind {
            ActionKind::Fold => {
                self.record_action(seat, action);
                self.folded_players.insert(seat.clone());
                self.pending_players.remove(seat);
                let active = self.active_players();
                if active.len() == 1 {
                    let winner = active[0].clone();
                    self.hand_over = true;
                    self.winners = vec![winner.clone()];
                    self.current_player = None;
                    return Ok(StepResult {
                        round_complete: false,
                        hand_over: true,
                        winner: Some(winner),
                    });
                }
                round_complete = self.pending_players.is_empty();
            }
            ActionKind::Check => {
                if to_call != 0 {
                    return Err(ActionError::CheckFacingBet);
                }
                self.record_action(seat, action);
                self.pending_players.remove(seat);
                round_complete = self.pending_players.is_empty();
            }
            ActionKind::Call => {
                if to_call == 0 {
                    return Err(ActionError::CallWithoutBet);
                }
                self.record_action(seat, action);
                let amount = to_call.min(self.stack(seat));
                self.commit_chips(seat, amount);
                if self.stack(seat) == 0 {
                    self.all_in_players.insert(seat.clone());
                }
                self.pending_players.remove(seat);
                round_complete = self.pending_players.is_empty();
            }
            ActionKind::Raise => {
                let raise_to = action.amount.ok_or(ActionError::AmountRequired)?;
                self.apply_raise(seat, raise_to)?;
                self.record_action(seat, action);
                round_complete = false;
            }
        }

        if !self.hand_over && !round_complete {
            self.current_player = self.next_player(seat);
            if self.current_player.is_none() {
                round_complete = true;
            }
        } else if round_complete {
            self.current_player = None;
        }

        Ok(StepResult {
            round_complete,
            hand_over: self.hand_over,
            winner: self.winners.first().cloned(),
        })
    }

    /// Splits the pot among `winners` (all active seats when empty, the
    /// multi-way tie case). Each winner takes the integer floor share;
    /// remainder chips go to `remainder_to`, defaulting to the first
    /// winner. Terminal: sets `hand_over`.
    pub fn payout(&mut self, winners: &[SeatId], remainder_to: Option<&SeatId>) {
        let winners = if winners.is_empty() {
            self.active_players()
        } else {
            winners.to_vec()
        };
        if winners.is_empty() {
            return;
        }

        let share = self.pot / winners.len() as u32;
        let remainder = self.pot % winners.len() as u32;
        for seat in &winners {
            *self.stacks.entry(seat.clone()).or_insert(0) += share;
        }
        if remainder > 0 {
            let recipient = remainder_to
                .filter(|seat| winners.contains(seat))
                .unwrap_or(&winners[0])
                .clone();
            *self.stacks.entry(recipient).or_insert(0) += remainder;
        }
        self.pot = 0;
        self.hand_over = true;
        self.winners = winners;
    }

    /// Next seat clockwise from `from` that still owes an action.
    pub fn next_player(&self, from: &SeatId) -> Option<SeatId> {
        let start = self.players.iter().position(|seat| seat == from)?;
        let len = self.players.len();
        for offset in 1..=len {
            let candidate = &self.players[(start + offset) % len];
            if self.folded_players.contains(candidate)
                || self.all_in_players.contains(candidate)
            {
                continue;
            }
            if self.pending_players.contains(candidate) {
                return Some(candidate.clone());
            }
        }
        None
    }

    // The actor invariant: current_player is only ever a pending, live
    // seat, or None when the round is settled.
    fn seat_actor(&mut self, preferred: &SeatId) {
        self.current_player = if self.pending_players.contains(preferred) {
            Some(preferred.clone())
        } else {
            self.next_player(preferred)
        };
    }

    fn apply_raise(&mut self, seat: &SeatId, raise_to: u32) -> Result<(), ActionError> {
        if raise_to <= self.current_bet {
            return Err(ActionError::RaiseNotIncreasing {
                amount: raise_to,
                current_bet: self.current_bet,
            });
        }

        let stack = self.stack(seat);
        let required = raise_to - self.contribution(seat);
        if required > stack {
            return Err(ActionError::RaiseExceedsStack { amount: raise_to });
        }

        let min_raise_to = self.min_raise_to();
        let all_in_short = required == stack && raise_to < min_raise_to;
        if raise_to < min_raise_to && !all_in_short {
            return Err(ActionError::RaiseBelowMinimum {
                amount: raise_to,
                minimum: min_raise_to,
            });
        }

        // A short all-in does not reopen betting, so the last full raise
        // increment stands.
        if !all_in_short {
            self.last_raise_size = raise_to - self.current_bet;
        }
        self.current_bet = raise_to;
        self.commit_chips(seat, required);
        if self.stack(seat) == 0 {
            self.all_in_players.insert(seat.clone());
        }
        self.pending_players = self
            .active_players()
            .into_iter()
            .filter(|other| other != seat && !self.all_in_players.contains(other))
            .collect();
        Ok(())
    }

    fn post_blind(&mut self, seat: &SeatId, amount: u32) {
        let posted = amount.min(self.stack(seat));
        self.commit_chips(seat, posted);
    }

    fn commit_chips(&mut self, seat: &SeatId, amount: u32) {
        debug_assert!(amount <= self.stack(seat));
        if let Some(stack) = self.stacks.get_mut(seat) {
            *stack -= amount;
        }
        *self.contributions.entry(seat.clone()).or_insert(0) += amount;
        self.pot += amount;
    }

    fn record_action(&mut self, seat: &SeatId, action: &Action) {
        self.action_history.push(ActionRecord {
            player_id: seat.clone(),
            action: action.clone(),
        });
    }
}
