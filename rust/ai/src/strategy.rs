//! Strategy-table policy: weighted action lookup over bucketed infosets.
//!
//! The table is a JSON object mapping infoset ids to action-probability
//! rows, typically exported by an offline trainer. Lookup tries the
//! detailed infoset (with the hole-card bucket) first and an abstract
//! one (without it) second; on a miss the policy degrades to the
//! uniform-random reference behavior.

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use felt_engine::betting::{Action, ActionKind};
use felt_engine::state::AiState;

use crate::bucketing::compute_infoset_id;
use crate::random::build_action;
use crate::{Policy, PolicyError};

type StrategyTable = HashMap<String, HashMap<String, f64>>;

pub struct StrategyPolicy {
    table: StrategyTable,
    rng: Mutex<ChaCha20Rng>,
}

impl StrategyPolicy {
    /// Loads a table from disk. Missing or malformed files yield an
    /// empty table, which makes every decision fall through to the
    /// uniform fallback; a strategy file must never take the table down.
    pub fn from_path(path: impl AsRef<Path>, seed: Option<u64>) -> Self {
        let table = fs::read_to_string(path.as_ref())
            .ok()
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .map(Self::parse_table)
            .unwrap_or_default();
        Self::from_table(table, seed)
    }

    pub fn from_table(table: StrategyTable, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            table,
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    pub fn empty(seed: Option<u64>) -> Self {
        Self::from_table(StrategyTable::new(), seed)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn parse_table(value: serde_json::Value) -> StrategyTable {
        let rows = match value {
            serde_json::Value::Object(rows) => rows,
            _ => return StrategyTable::new(),
        };
        let mut table = StrategyTable::new();
        for (infoset, row) in rows {
            let row = match row {
                serde_json::Value::Object(row) => row,
                _ => continue,
            };
            let parsed: HashMap<String, f64> = row
                .into_iter()
                .filter_map(|(action, prob)| prob.as_f64().map(|p| (action, p)))
                .collect();
            if !parsed.is_empty() {
                table.insert(infoset, parsed);
            }
        }
        table
    }

    /// Detailed-then-abstract lookup candidates for the acting seat.
    fn infoset_candidates(state: &AiState) -> Vec<String> {
        let stack = state
            .stacks
            .get(&state.current_player)
            .copied()
            .unwrap_or(0);
        let big_blind = if state.big_blind > 0 {
            state.big_blind
        } else {
            state.bets.values().copied().max().unwrap_or(10).max(10)
        };

        let detailed = compute_infoset_id(
            &state.current_player,
            &state.hand,
            &state.community_cards,
            state.street,
            &state.action_history,
            state.pot,
            stack,
            big_blind,
        );
        let abstract_id = compute_infoset_id(
            &state.current_player,
            &[],
            &state.community_cards,
            state.street,
            &state.action_history,
            state.pot,
            stack,
            big_blind,
        );

        let mut candidates = vec![detailed];
        if abstract_id != candidates[0] {
            candidates.push(abstract_id);
        }
        candidates
    }

    fn kind_from_name(name: &str) -> Option<ActionKind> {
        match name {
            "check" => Some(ActionKind::Check),
            "call" => Some(ActionKind::Call),
            "fold" => Some(ActionKind::Fold),
            "raise" => Some(ActionKind::Raise),
            _ => None,
        }
    }

    fn pick_from_table(&self, state: &AiState, rng: &mut ChaCha20Rng) -> Option<ActionKind> {
        if self.table.is_empty() {
            return None;
        }
        for infoset in Self::infoset_candidates(state) {
            let row = match self.table.get(&infoset) {
                Some(row) => row,
                None => continue,
            };
            let weighted: Vec<(ActionKind, f64)> = row
                .iter()
                .filter_map(|(name, &prob)| {
                    let kind = Self::kind_from_name(name)?;
                    (prob > 0.0 && state.legal_actions.contains(&kind))
                        .then_some((kind, prob))
                })
                .collect();
            if weighted.is_empty() {
                continue;
            }
            return weighted
                .choose_weighted(rng, |(_, prob)| *prob)
                .ok()
                .map(|(kind, _)| *kind);
        }
        None
    }
}

impl Policy for StrategyPolicy {
    fn decide(&self, state: &AiState) -> Result<Action, PolicyError> {
        if state.legal_actions.is_empty() {
            return Err(PolicyError::NoLegalActions);
        }
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let kind = match self.pick_from_table(state, &mut rng) {
            Some(kind) => kind,
            // Table miss: uniform over legal actions.
            None => *state
                .legal_actions
                .choose(&mut *rng)
                .ok_or(PolicyError::NoLegalActions)?,
        };
        Ok(build_action(kind, state, &mut rng))
    }

    fn name(&self) -> &str {
        "strategy"
    }
}
