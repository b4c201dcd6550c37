//! Infoset abstraction for strategy lookup and experience records.
//!
//! A seat's local information state is compressed into a stable string
//! id: hole-card bucket x board texture x recent action pattern x pot
//! and stack buckets. Trained strategy tables are keyed by these ids.

use felt_engine::betting::{ActionKind, ActionRecord, SeatId};
use felt_engine::cards::{Card, Rank, Suit};
use felt_engine::state::Street;

fn rank_name(rank: u8) -> String {
    match rank {
        14 => "A".to_string(),
        13 => "K".to_string(),
        12 => "Q".to_string(),
        11 => "J".to_string(),
        10 => "T".to_string(),
        other => other.to_string(),
    }
}

fn street_key(street: Street) -> &'static str {
    match street {
        Street::Preflop => "PREFLOP",
        Street::Flop => "FLOP",
        Street::Turn => "TURN",
        Street::River => "RIVER",
        Street::Showdown => "SHOWDOWN",
    }
}

fn action_name(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Check => "check",
        ActionKind::Call => "call",
        ActionKind::Fold => "fold",
        ActionKind::Raise => "raise",
    }
}

/// Buckets hole cards into `PP_AA`-style pairs, `SUITED_AK` /
/// `UNSUITED_AK` high-card combos, and coarse `MID` / `LOW` groups for
/// small cards.
pub fn bucket_hole_cards(hole: &[Card]) -> String {
    if hole.len() != 2 {
        return "INVALID".to_string();
    }

    let mut high = hole[0].rank.value();
    let mut low = hole[1].rank.value();
    if high < low {
        std::mem::swap(&mut high, &mut low);
    }
    let suited = hole[0].suit == hole[1].suit;

    if high == low {
        let name = rank_name(high);
        return format!("PP_{name}{name}");
    }

    let prefix = if suited { "SUITED" } else { "UNSUITED" };
    if high >= 8 {
        let low_name = if low >= 8 { rank_name(low) } else { "LOW".to_string() };
        return format!("{prefix}_{}{low_name}", rank_name(high));
    }

    if high >= 6 {
        return format!("{prefix}_MID");
    }
    format!("{prefix}_LOW")
}

/// Buckets the board by texture: suit distribution, pairing, and high
/// cards, per street.
pub fn bucket_board(board: &[Card]) -> String {
    if board.is_empty() {
        return "PREFLOP".to_string();
    }

    let mut suit_counts = [0u8; 4];
    let mut rank_counts = [0u8; 15];
    let mut high_cards = 0;
    for card in board {
        let suit = match card.suit {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
        };
        suit_counts[suit] += 1;
        rank_counts[card.rank.value() as usize] += 1;
        if card.rank >= Rank::Ten {
            high_cards += 1;
        }
    }
    let max_suit = suit_counts.iter().copied().max().unwrap_or(0);
    let max_rank = rank_counts.iter().copied().max().unwrap_or(0);
    let paired = max_rank >= 2;

    match board.len() {
        3 => {
            let mut texture = match max_suit {
                3 => "MONOTONE".to_string(),
                2 => "TWO_TONE".to_string(),
                _ => "RAINBOW".to_string(),
            };
            if paired {
                texture.push_str("_PAIRED");
            }
            if high_cards >= 2 {
                texture.push_str("_HIGH");
            } else if high_cards == 0 {
                texture.push_str("_LOW");
            }
            format!("FLOP_{texture}")
        }
        4 => {
            let mut texture = match max_suit {
                s if s >= 3 => "FLUSH_DRAW".to_string(),
                2 => "TWO_TONE".to_string(),
                _ => "RAINBOW".to_string(),
            };
            if paired {
                texture.push_str("_PAIRED");
            }
            format!("TURN_{texture}")
        }
        5 => {
            let mut texture = match max_suit {
                s if s >= 5 => "FLUSH".to_string(),
                s if s >= 4 => "FLUSH_DRAW".to_string(),
                _ => "RAINBOW".to_string(),
            };
            if paired {
                texture.push_str("_PAIRED");
            }
            format!("RIVER_{texture}")
        }
        other => format!("BOARD_{other}"),
    }
}

/// Buckets the recent betting pattern: the last few action kinds joined
/// into a `STREET_raise_call`-style id.
pub fn bucket_betting_sequence(history: &[ActionRecord], street: Street) -> String {
    let street = street_key(street);
    if history.is_empty() {
        return format!("{street}_NO_ACTION");
    }

    let tail = &history[history.len().saturating_sub(3)..];
    let pattern: Vec<&str> = tail
        .iter()
        .map(|record| action_name(record.action.kind))
        .collect();
    format!("{street}_{}", pattern.join("_"))
}

/// Pot size relative to the big blind.
pub fn bucket_pot_size(pot: u32, big_blind: u32) -> String {
    if big_blind == 0 {
        return "POT_UNKNOWN".to_string();
    }
    let pot_in_bb = pot as f64 / big_blind as f64;
    let bucket = if pot_in_bb < 5.0 {
        "TINY"
    } else if pot_in_bb < 20.0 {
        "SMALL"
    } else if pot_in_bb < 50.0 {
        "MEDIUM"
    } else if pot_in_bb < 100.0 {
        "LARGE"
    } else {
        "HUGE"
    };
    format!("POT_{bucket}")
}

/// Remaining stack depth relative to the big blind.
pub fn bucket_stack_depth(stack: u32, big_blind: u32) -> String {
    if big_blind == 0 {
        return "STACK_UNKNOWN".to_string();
    }
    let stack_in_bb = stack as f64 / big_blind as f64;
    let bucket = if stack_in_bb > 100.0 {
        "DEEP"
    } else if stack_in_bb > 50.0 {
        "MEDIUM"
    } else if stack_in_bb > 20.0 {
        "SHALLOW"
    } else {
        "SHORT"
    };
    format!("STACK_{bucket}")
}

/// Combines every abstraction into one stable `:`-joined infoset id,
/// e.g. `p1:PREFLOP:PP_AA:PREFLOP:PREFLOP_NO_ACTION:POT_TINY:STACK_DEEP`.
#[allow(clippy::too_many_arguments)]
pub fn compute_infoset_id(
    seat: &SeatId,
    hole: &[Card],
    board: &[Card],
    street: Street,
    history: &[ActionRecord],
    pot: u32,
    stack: u32,
    big_blind: u32,
) -> String {
    let hole_bucket = if hole.is_empty() {
        "NO_HOLE".to_string()
    } else {
        bucket_hole_cards(hole)
    };
    let board_bucket = if board.is_empty() {
        "NO_BOARD".to_string()
    } else {
        bucket_board(board)
    };
    [
        seat.clone(),
        street_key(street).to_string(),
        hole_bucket,
        board_bucket,
        bucket_betting_sequence(history, street),
        bucket_pot_size(pot, big_blind),
        bucket_stack_depth(stack, big_blind),
    ]
    .join(":")
}
