use felt_engine::cards::{full_deck, Card, Rank, Suit};

#[test]
fn full_deck_has_52_distinct_cards() {
    let deck = full_deck();
    assert_eq!(deck.len(), 52);
    let mut sorted = deck.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), 52);
}

#[test]
fn text_form_round_trips() {
    for card in full_deck() {
        let text = card.to_string();
        assert_eq!(text.len(), 2);
        assert_eq!(text.parse::<Card>().unwrap(), card);
    }
}

#[test]
fn known_cards_parse() {
    let ace: Card = "As".parse().unwrap();
    assert_eq!(ace.rank, Rank::Ace);
    assert_eq!(ace.suit, Suit::Spades);

    let ten: Card = "Td".parse().unwrap();
    assert_eq!(ten.rank, Rank::Ten);
    assert_eq!(ten.suit, Suit::Diamonds);
}

#[test]
fn malformed_cards_rejected() {
    assert!("".parse::<Card>().is_err());
    assert!("A".parse::<Card>().is_err());
    assert!("Asx".parse::<Card>().is_err());
    assert!("1s".parse::<Card>().is_err());
    assert!("Az".parse::<Card>().is_err());
}

#[test]
fn serde_uses_text_form() {
    let card: Card = "Kh".parse().unwrap();
    assert_eq!(serde_json::to_string(&card).unwrap(), "\"Kh\"");
    let back: Card = serde_json::from_str("\"Kh\"").unwrap();
    assert_eq!(back, card);
}
