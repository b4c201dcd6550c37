//! Reference policies: uniform-random and passive.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::Mutex;

use felt_engine::betting::{Action, ActionKind};
use felt_engine::state::AiState;

use crate::{Policy, PolicyError};

/// Raise target drawn uniformly from `[min_raise_to, max_raise_to]`.
/// When the stack cannot cover a full raise the only legal target is the
/// all-in maximum.
pub(crate) fn sample_raise_to(state: &AiState, rng: &mut ChaCha20Rng) -> u32 {
    if state.max_raise_to < state.min_raise_to {
        state.max_raise_to
    } else {
        rng.random_range(state.min_raise_to..=state.max_raise_to)
    }
}

pub(crate) fn build_action(kind: ActionKind, state: &AiState, rng: &mut ChaCha20Rng) -> Action {
    match kind {
        ActionKind::Check => Action::check(),
        ActionKind::Call => Action::call(),
        ActionKind::Fold => Action::fold(),
        ActionKind::Raise => Action::raise_to(sample_raise_to(state, rng)),
    }
}

/// The reference policy: every legal action is equally likely, and raise
/// targets are uniform within bounds.
pub struct RandomPolicy {
    rng: Mutex<ChaCha20Rng>,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl Policy for RandomPolicy {
    fn decide(&self, state: &AiState) -> Result<Action, PolicyError> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let kind = *state
            .legal_actions
            .choose(&mut *rng)
            .ok_or(PolicyError::NoLegalActions)?;
        Ok(build_action(kind, state, &mut rng))
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Checks when it can, calls when it must, folds only when calling is
/// impossible, and min-raises as a last resort.
pub struct PassivePolicy;

impl Policy for PassivePolicy {
    fn decide(&self, state: &AiState) -> Result<Action, PolicyError> {
        for kind in [
            ActionKind::Check,
            ActionKind::Call,
            ActionKind::Fold,
            ActionKind::Raise,
        ] {
            if !state.legal_actions.contains(&kind) {
                continue;
            }
            return Ok(match kind {
                ActionKind::Raise => Action::raise_to(state.min_raise_to),
                ActionKind::Check => Action::check(),
                ActionKind::Call => Action::call(),
                ActionKind::Fold => Action::fold(),
            });
        }
        Err(PolicyError::NoLegalActions)
    }

    fn name(&self) -> &str {
        "passive"
    }
}
