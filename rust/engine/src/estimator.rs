//! Monte Carlo hand-strength estimation for UI annotation.
//!
//! Rolls out random completions of the board and random opponent hole
//! cards, scoring the viewer's hand against each. Runs on its own seeded
//! RNG so enabling or disabling it never perturbs the dealing stream.

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;

use crate::cards::{full_deck, Card};
use crate::eval::{category_label, score_hand};

pub const DEFAULT_ROLLOUTS: usize = 120;

/// Category names in display order, strongest first.
pub const HAND_CATEGORY_ORDER: [&str; 9] = [
    "Straight Flush",
    "Four of a Kind",
    "Full House",
    "Flush",
    "Straight",
    "Three of a Kind",
    "Two Pair",
    "Pair",
    "High Card",
];

#[derive(Debug, Clone)]
pub struct StrengthEstimator {
    rng: ChaCha20Rng,
    rollouts: usize,
}

impl StrengthEstimator {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            rollouts: DEFAULT_ROLLOUTS,
        }
    }

    pub fn with_rollouts(mut self, rollouts: usize) -> Self {
        self.rollouts = rollouts.max(1);
        self
    }

    /// Estimated equity in [0, 1] against `opponents` random hands, plus
    /// the per-category probability (percent) of the viewer's final hand.
    /// Ties award fractional equity.
    pub fn estimate(
        &mut self,
        hole: &[Card],
        board: &[Card],
        opponents: usize,
    ) -> (f64, BTreeMap<String, f64>) {
        let mut category_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        let zero_probs = || {
            HAND_CATEGORY_ORDER
                .iter()
                .map(|name| (name.to_string(), 0.0))
                .collect::<BTreeMap<String, f64>>()
        };

        let unseen: Vec<Card> = full_deck()
            .into_iter()
            .filter(|card| !hole.contains(card) && !board.contains(card))
            .collect();
        let board_needed = 5usize.saturating_sub(board.len());
        let draw_count = board_needed + 2 * opponents;
        if draw_count > unseen.len() {
            return (0.0, zero_probs());
        }

        let mut total = 0.0;
        for _ in 0..self.rollouts {
            let drawn: Vec<Card> = unseen
                .choose_multiple(&mut self.rng, draw_count)
                .copied()
                .collect();

            let mut completed = board.to_vec();
            completed.extend_from_slice(&drawn[..board_needed]);

            let hero_score = score_hand(hole, &completed);
            *category_counts.entry(category_label(hero_score)).or_insert(0) += 1;

            if opponents == 0 {
                total += 1.0;
                continue;
            }

            let mut best = hero_score;
            let mut best_count = 1usize;
            let mut hero_best = true;
            for i in 0..opponents {
                let opp_hole = &drawn[board_needed + 2 * i..board_needed + 2 * (i + 1)];
                let opp_score = score_hand(opp_hole, &completed);
                if opp_score < best {
                    best = opp_score;
                    best_count = 1;
                    hero_best = false;
                } else if opp_score == best {
                    best_count += 1;
                }
            }
            if hero_best {
                total += 1.0 / best_count as f64;
            }
        }

        let rollouts = self.rollouts as f64;
        let mut probs = zero_probs();
        for (label, count) in category_counts {
            probs.insert(label.to_string(), (count as f64) * 100.0 / rollouts);
        }
        (total / rollouts, probs)
    }
}
