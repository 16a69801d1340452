use hilo_edge::cards::*;
use hilo_edge::error::EdgeError;
use hilo_edge::hand::Hand;
use proptest::prelude::*;
use proptest::sample::select;
use rand::rngs::StdRng;
use rand::SeedableRng;

use Rank::*;

#[test]
fn test_rank_values() {
    assert_eq!(Two.value(), 2);
    assert_eq!(Nine.value(), 9);
    assert_eq!(Ten.value(), 10);
    assert_eq!(King.value(), 10);
    assert_eq!(Ace.value(), 11);
}

#[test]
fn test_rank_parse_aliases() {
    assert_eq!("10".parse::<Rank>().unwrap(), Ten);
    assert_eq!("t".parse::<Rank>().unwrap(), Ten);
    assert_eq!("a".parse::<Rank>().unwrap(), Ace);
    assert_eq!("1".parse::<Rank>().unwrap(), Ace);
    assert_eq!("11".parse::<Rank>().unwrap(), Ace);
    assert_eq!("q".parse::<Rank>().unwrap(), Queen);
}

#[test]
fn test_rank_parse_invalid() {
    assert!(matches!("X".parse::<Rank>(), Err(EdgeError::InvalidRank(_))));
    assert!("0".parse::<Rank>().is_err());
    assert!("12".parse::<Rank>().is_err());
}

#[test]
fn test_rank_display_round_trips() {
    for rank in ALL_RANKS {
        assert_eq!(rank.to_string().parse::<Rank>().unwrap(), rank);
    }
}

#[test]
fn test_parse_ranks_forms() {
    assert_eq!(parse_ranks("A,K").unwrap(), vec![Ace, King]);
    assert_eq!(parse_ranks("8 8").unwrap(), vec![Eight, Eight]);
    assert_eq!(parse_ranks("10, 6").unwrap(), vec![Ten, Six]);
    assert_eq!(parse_ranks("T6").unwrap(), vec![Ten, Six]);
    assert!(parse_ranks("").is_err());
    assert!(parse_ranks("A,Z").is_err());
}

#[test]
fn test_shoe_composition() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut shoe = Shoe::new(2, &mut rng);
    assert_eq!(shoe.len(), 104);
    assert_eq!(shoe.total_cards(), 104);
    assert_eq!(shoe.cards_dealt(), 0);

    let mut tens = 0;
    let mut aces = 0;
    while let Some(card) = shoe.draw() {
        if card.is_ten_value() {
            tens += 1;
        }
        if card.is_ace() {
            aces += 1;
        }
    }
    assert_eq!(tens, 32);
    assert_eq!(aces, 8);
    assert!(shoe.is_empty());
    assert_eq!(shoe.draw(), None);
}

#[test]
fn test_shoe_seeded_order_is_reproducible() {
    let mut a = Shoe::new(1, &mut StdRng::seed_from_u64(9));
    let mut b = Shoe::new(1, &mut StdRng::seed_from_u64(9));
    for _ in 0..52 {
        assert_eq!(a.draw(), b.draw());
    }
}

#[test]
fn test_stacked_shoe_deals_in_order() {
    let mut shoe = Shoe::stacked(&[Ace, Two, Three]);
    assert_eq!(shoe.draw(), Some(Ace));
    assert_eq!(shoe.draw(), Some(Two));
    assert_eq!(shoe.len(), 1);
}

#[test]
fn test_remaining_decks_floor() {
    assert_eq!(remaining_decks(312), 6.0);
    assert_eq!(remaining_decks(26), 0.5);
    assert_eq!(remaining_decks(10), 0.5);
    assert_eq!(remaining_decks(0), 0.5);
}

#[test]
fn test_hand_soft_and_hard_values() {
    assert_eq!(Hand::from_cards(&[Ace, Seven]).value(), 18);
    assert!(Hand::from_cards(&[Ace, Seven]).is_soft());
    assert_eq!(Hand::from_cards(&[Ace, Seven, Nine]).value(), 17);
    assert!(!Hand::from_cards(&[Ace, Seven, Nine]).is_soft());
    assert_eq!(Hand::from_cards(&[Ace, Ace]).value(), 12);
    assert_eq!(Hand::from_cards(&[Ace, Ace, Ace, Ace]).value(), 14);
    assert_eq!(Hand::from_cards(&[King, Queen, Two]).value(), 22);
    assert!(Hand::from_cards(&[King, Queen, Two]).is_bust());
}

#[test]
fn test_hand_blackjack_needs_two_cards() {
    assert!(Hand::from_cards(&[Ace, King]).is_blackjack());
    assert!(Hand::from_cards(&[Ten, Ace]).is_blackjack());
    assert!(!Hand::from_cards(&[Seven, Seven, Seven]).is_blackjack());
}

#[test]
fn test_hand_pairs_by_value() {
    assert_eq!(Hand::from_cards(&[Eight, Eight]).pair_rank(), Some(Eight));
    assert_eq!(Hand::from_cards(&[King, Queen]).pair_rank(), Some(King));
    assert_eq!(Hand::from_cards(&[Eight, Nine]).pair_rank(), None);
    assert_eq!(Hand::from_cards(&[Eight, Eight, Two]).pair_rank(), None);
    assert!(Hand::from_cards(&[Ace, Ace]).is_pair_of_aces());
}

#[test]
fn test_hand_split() {
    let (a, b) = Hand::from_cards(&[Nine, Nine]).split().unwrap();
    assert_eq!(a.cards(), &[Nine]);
    assert_eq!(b.cards(), &[Nine]);
    assert!(Hand::from_cards(&[Nine, Ten]).split().is_none());
}

#[test]
fn test_hand_display() {
    assert_eq!(Hand::from_cards(&[Ace, Ten]).to_string(), "[A,10]");
}

proptest! {
    #[test]
    fn test_aces_demote_only_when_over_twenty_one(
        cards in prop::collection::vec(select(ALL_RANKS.to_vec()), 1..12),
    ) {
        let hand = Hand::from_cards(&cards);
        let hard: u32 = cards.iter().map(|c| if c.is_ace() { 1 } else { c.value() as u32 }).sum();
        let value = hand.value() as u32;
        if hand.is_soft() {
            prop_assert!(value <= 21);
            prop_assert_eq!(value, hard + 10);
        } else {
            prop_assert_eq!(value, hard);
            // Counting any ace as 11 would have busted.
            if cards.iter().any(|c| c.is_ace()) {
                prop_assert!(hard + 10 > 21);
            }
        }
    }
}
