//! # felt-engine: Multi-Seat Texas Hold'em Core
//!
//! A deterministic Texas Hold'em engine for 2-5 seats: a betting state
//! machine with all-in and side-pot accounting, a hand lifecycle driver
//! (button rotation, street progression, showdown), per-viewer state
//! projection, and a seeded Monte Carlo strength estimator for UI
//! annotation. All randomness flows through seedable ChaCha20 RNGs so
//! hands replay bit-for-bit.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation and the `"As"`/`"Td"` text form
//! - [`deck`] - Deterministic deck shuffling and dealing
//! - [`eval`] - Seven-card hand scoring (lower score wins)
//! - [`betting`] - Per-hand betting state machine
//! - [`engine`] - Hand lifecycle, events, and projections
//! - [`state`] - Streets, events, public/AI projections, snapshots
//! - [`estimator`] - Monte Carlo equity and category estimation
//! - [`errors`] - Error types for rule violations and lifecycle misuse
//!
//! ## Quick Start
//!
//! ```rust
//! use felt_engine::engine::Engine;
//! use felt_engine::state::Street;
//!
//! let mut engine = Engine::new(vec!["p1".into(), "p2".into()]);
//! engine.new_hand(Some(7), false).expect("hand starts");
//!
//! assert_eq!(engine.street, Street::Preflop);
//! assert_eq!(engine.betting.pot, 15); // 5 small blind + 10 big blind
//! ```

pub mod betting;
pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod estimator;
pub mod eval;
pub mod state;
