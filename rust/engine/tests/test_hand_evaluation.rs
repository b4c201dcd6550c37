use felt_engine::cards::Card;
use felt_engine::eval::{category_label, hand_class, score_hand, HandClass};

fn cards(text: &str) -> Vec<Card> {
    text.split_whitespace()
        .map(|s| s.parse().expect("card"))
        .collect()
}

fn score(hole: &str, board: &str) -> u32 {
    score_hand(&cards(hole), &cards(board))
}

#[test]
fn categories_are_detected() {
    let board = "Qh Jh Th 2c 7d";
    assert_eq!(hand_class(score("Ah Kh", board)), HandClass::StraightFlush);

    assert_eq!(
        hand_class(score("As Ad", "Ah Ac 7d 2c 3s")),
        HandClass::FourOfAKind
    );
    assert_eq!(
        hand_class(score("Ks Kd", "Kh 2c 2d 7s 9h")),
        HandClass::FullHouse
    );
    assert_eq!(
        hand_class(score("Ah 4h", "9h Th 2h Kc 3d")),
        HandClass::Flush
    );
    assert_eq!(
        hand_class(score("8s 9d", "Tc Jh Qd 2s 3c")),
        HandClass::Straight
    );
    assert_eq!(
        hand_class(score("7s 7d", "7h 2c 9d Ks Qh")),
        HandClass::ThreeOfAKind
    );
    assert_eq!(
        hand_class(score("Js Jd", "9h 9c 2d Ks 4h")),
        HandClass::TwoPair
    );
    assert_eq!(
        hand_class(score("As Ah", "2c 7d 9h Jc Qd")),
        HandClass::Pair
    );
    assert_eq!(
        hand_class(score("As 8h", "2c 7d 9h Jc Qd")),
        HandClass::HighCard
    );
}

#[test]
fn wheel_straight_is_five_high() {
    let s = score("As 2d", "3c 4h 5s Kd 9c");
    assert_eq!(hand_class(s), HandClass::Straight);
    // A six-high straight beats the wheel.
    let six_high = score("2d 6s", "3c 4h 5s Kd 9c");
    assert!(six_high < s);
}

#[test]
fn lower_score_is_the_better_hand() {
    let board = "2c 7d 9h Jc Qd";
    let aces = score("As Ah", board);
    let kings = score("Ks Kh", board);
    let nothing = score("3s 4h", board);
    assert!(aces < kings);
    assert!(kings < nothing);
}

#[test]
fn identical_hands_tie() {
    let board = "2c 7d 9h Jc Qd";
    assert_eq!(score("As Ah", board), score("Ad Ac", board));
}

#[test]
fn kickers_break_pair_ties() {
    let board = "2c 7d 9h Jc Qd";
    let ace_kicker = score("As 9s", board);
    let king_kicker = score("Ks 9c", board);
    assert!(ace_kicker < king_kicker);
}

#[test]
fn two_pair_kicker_counts_a_third_pair() {
    // Board pairs twice; the hole pair is third. Best two pair uses the
    // higher pairs and the best remaining card as kicker.
    let s = score("3s 3d", "9h 9c Js Jd Ah");
    assert_eq!(hand_class(s), HandClass::TwoPair);
    let weaker = score("3s 3d", "9h 9c Js Jd 4h");
    assert!(s < weaker);
}

#[test]
fn labels_match_classes() {
    assert_eq!(category_label(score("As Ah", "2c 7d 9h Jc Qd")), "Pair");
    assert_eq!(
        category_label(score("Ah Kh", "Qh Jh Th 2c 7d")),
        "Straight Flush"
    );
    assert_eq!(
        category_label(score("As 8h", "2c 7d 9h Jc Qd")),
        "High Card"
    );
}

#[test]
fn full_house_prefers_higher_trips() {
    let over = score("Ks Kd", "Kh Qc Qd 2s 3h");
    let under = score("Qs 2d", "Kh Qc Qd Ks 3h");
    assert_eq!(hand_class(over), HandClass::FullHouse);
    assert_eq!(hand_class(under), HandClass::FullHouse);
    assert!(over < under);
}
