//! # felt-ai: Seat Policies
//!
//! Pluggable decision-making for AI-controlled seats. A [`Policy`] maps
//! the engine's observation (legal actions, raise bounds, game state) to
//! one [`Action`]; the orchestrator drives whichever policy the table is
//! configured with and falls back to a safe default when a policy fails.
//!
//! ## Implementations
//!
//! - [`RandomPolicy`] - the reference policy: uniform over legal
//!   actions, uniform raise sizing within bounds
//! - [`PassivePolicy`] - checks or calls whenever possible
//! - [`StrategyPolicy`] - weighted lookup in a trained strategy table
//!   keyed by bucketed infoset ids, uniform-random on miss
//!
//! ## Quick Start
//!
//! ```rust
//! use felt_ai::{create_policy, Policy};
//! use felt_engine::engine::Engine;
//!
//! let policy = create_policy("random", Some(42), None);
//!
//! let mut engine = Engine::new(vec!["p1".into(), "p2".into()]);
//! engine.new_hand(Some(7), false).expect("hand starts");
//!
//! let observation = engine.to_ai_state().expect("seat to act");
//! let action = policy.decide(&observation).expect("legal action");
//! assert!(observation.legal_actions.contains(&action.kind));
//! ```

use felt_engine::betting::Action;
use felt_engine::state::AiState;
use thiserror::Error;

pub mod bucketing;
pub mod random;
pub mod strategy;

pub use random::{PassivePolicy, RandomPolicy};
pub use strategy::StrategyPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("no legal actions available for the acting seat")]
    NoLegalActions,
}

/// Decision contract consumed by the turn orchestrator. Implementations
/// are shared across sessions, so any internal randomness must be behind
/// interior mutability.
pub trait Policy: Send + Sync {
    /// Picks an action for the acting seat described by `state`. The
    /// returned action must be drawn from `state.legal_actions`, with a
    /// raise target inside the advertised bounds.
    fn decide(&self, state: &AiState) -> Result<Action, PolicyError>;

    /// Identifier used in logs.
    fn name(&self) -> &str;
}

/// Builds the policy selected by configuration. `mode` mirrors the
/// `AI_MODE` setting (`random`, `passive`, `strategy`); unknown modes
/// fall back to the random reference policy. `strategy_path` points at a
/// JSON strategy table and is only read in strategy mode.
pub fn create_policy(mode: &str, seed: Option<u64>, strategy_path: Option<&str>) -> Box<dyn Policy> {
    match mode {
        "passive" => Box::new(PassivePolicy),
        "strategy" | "mccfr" => Box::new(match strategy_path {
            Some(path) => StrategyPolicy::from_path(path, seed),
            None => StrategyPolicy::empty(seed),
        }),
        _ => Box::new(RandomPolicy::new(seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_maps_modes_to_policies() {
        assert_eq!(create_policy("random", Some(1), None).name(), "random");
        assert_eq!(create_policy("passive", Some(1), None).name(), "passive");
        assert_eq!(create_policy("strategy", Some(1), None).name(), "strategy");
        // Unknown modes degrade to the reference policy.
        assert_eq!(create_policy("nonsense", Some(1), None).name(), "random");
    }
}
