use felt_engine::deck::Deck;
use felt_engine::errors::GameError;

#[test]
fn same_seed_same_order() {
    let mut a = Deck::new_with_seed(42);
    let mut b = Deck::new_with_seed(42);
    a.shuffle();
    b.shuffle();
    assert_eq!(a.deal(52).unwrap(), b.deal(52).unwrap());
}

#[test]
fn different_seeds_differ() {
    let mut a = Deck::new_with_seed(1);
    let mut b = Deck::new_with_seed(2);
    a.shuffle();
    b.shuffle();
    assert_ne!(a.deal(52).unwrap(), b.deal(52).unwrap());
}

#[test]
fn dealing_consumes_from_the_top() {
    let mut deck = Deck::new_with_seed(7);
    deck.shuffle();
    assert_eq!(deck.remaining(), 52);
    let first = deck.deal(2).unwrap();
    let second = deck.deal(3).unwrap();
    assert_eq!(deck.remaining(), 47);
    assert!(first.iter().all(|c| !second.contains(c)));
}

#[test]
fn over_dealing_is_an_error() {
    let mut deck = Deck::new_with_seed(7);
    deck.shuffle();
    deck.deal(50).unwrap();
    let err = deck.deal(3).unwrap_err();
    assert_eq!(
        err,
        GameError::DeckExhausted {
            needed: 3,
            remaining: 2
        }
    );
    // The failed deal leaves the deck untouched.
    assert_eq!(deck.remaining(), 2);
}

#[test]
fn reshuffle_restores_all_cards() {
    let mut deck = Deck::new_with_seed(9);
    deck.shuffle();
    deck.deal(30).unwrap();
    deck.shuffle();
    assert_eq!(deck.remaining(), 52);
}
