use thiserror::Error;

use crate::betting::SeatId;

/// Betting-rule violations. These are user-recoverable: the offending
/// action is rejected and the hand state is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("hand is already over")]
    HandOver,
    #[error("it is not {seat}'s turn")]
    OutOfTurn { seat: SeatId },
    #[error("{seat} has already folded")]
    AlreadyFolded { seat: SeatId },
    #[error("cannot check when facing a bet")]
    CheckFacingBet,
    #[error("cannot call when there is no bet")]
    CallWithoutBet,
    #[error("amount is required for raise")]
    AmountRequired,
    #[error("raise to {amount} does not increase the current bet of {current_bet}")]
    RaiseNotIncreasing { amount: u32, current_bet: u32 },
    #[error("raise to {amount} is below the minimum of {minimum}")]
    RaiseBelowMinimum { amount: u32, minimum: u32 },
    #[error("raise to {amount} exceeds the remaining stack")]
    RaiseExceedsStack { amount: u32 },
}

/// Lifecycle misuse or resource exhaustion inside the engine. Unlike
/// [`ActionError`] these indicate a caller bug or a corrupted hand, not a
/// bad client action.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("engine supports between 2 and 5 seats, got {count}")]
    InvalidSeatCount { count: usize },
    #[error("deck exhausted: needed {needed} cards, {remaining} remaining")]
    DeckExhausted { needed: usize, remaining: usize },
    #[error("board must have 5 cards to resolve showdown, has {board_len}")]
    BoardIncomplete { board_len: usize },
    #[error("no seat is due to act")]
    NoCurrentActor,
}

/// Combined error surface of [`crate::engine::Engine::step`]: either a
/// rejected action or an engine-level failure while advancing the hand.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Game(#[from] GameError),
}
