//! Plays one round: deal, dealer peek, player hands (with splits), dealer
//! hand, settlement. Every card that leaves the shoe goes through the
//! counter.
//!
//! Split hands are kept on an explicit stack rather than recursing, bounded
//! by `max_splits`. Hands are still played depth-first in the same order a
//! recursive player would play them.

use serde::Serialize;

use crate::cards::{Rank, Shoe};
use crate::counting::HiLoCounter;
use crate::hand::Hand;
use crate::rules::TableRules;
use crate::strategy::{decide, Action, Allowed};

/// Cards burned through the counter when the player sits out a round.
pub const SIT_OUT_BURN: usize = 4;

/// Cards needed for the initial deal.
pub const INITIAL_DEAL: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandState {
    Blackjack,
    Busted,
    Stood,
    Doubled,
    Surrendered,
}

impl HandState {
    /// Still needs to be compared against the dealer.
    pub fn is_live(self) -> bool {
        matches!(self, HandState::Stood | HandState::Doubled)
    }
}

/// A player hand after it stopped taking cards.
#[derive(Debug, Clone, Serialize)]
pub struct PlayedHand {
    pub hand: Hand,
    pub wager: f64,
    pub split_depth: u8,
    pub state: HandState,
}

#[derive(Debug, Clone, Serialize)]
pub struct HandRecord {
    pub hand: Hand,
    pub wager: f64,
    pub state: HandState,
    pub profit: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoundOutcome {
    /// Signed, positive is a player gain.
    pub profit: f64,
    pub wagered: f64,
    pub hands: Vec<HandRecord>,
    pub dealer: Hand,
}

impl RoundOutcome {
    pub fn was_played(&self) -> bool {
        self.wagered > 0.0
    }
}

fn deal(shoe: &mut Shoe, counter: &mut HiLoCounter) -> Option<Rank> {
    let card = shoe.draw()?;
    counter.add_card(card);
    Some(card)
}

/// Burn the cards a dealt-but-unplayed round would have used. Returns how
/// many were burned.
pub fn sit_out(shoe: &mut Shoe, counter: &mut HiLoCounter) -> usize {
    let mut burned = 0;
    while burned < SIT_OUT_BURN && deal(shoe, counter).is_some() {
        burned += 1;
    }
    burned
}

/// Play a full round for `bet` units. Returns an empty outcome when the
/// shoe cannot cover the initial deal or the bet is not positive.
pub fn play_round(
    shoe: &mut Shoe,
    counter: &mut HiLoCounter,
    rules: &TableRules,
    bet: f64,
) -> RoundOutcome {
    if bet <= 0.0 || shoe.len() < INITIAL_DEAL {
        return RoundOutcome::default();
    }

    let mut player = Hand::new();
    let mut dealer = Hand::new();
    // Player, player, dealer, dealer.
    for seat in 0..INITIAL_DEAL {
        if let Some(card) = deal(shoe, counter) {
            if seat < 2 {
                player.push(card);
            } else {
                dealer.push(card);
            }
        }
    }

    let dealer_up = match dealer.first() {
        Some(card) => card,
        None => return RoundOutcome::default(),
    };

    let player_bj = player.is_blackjack();
    if dealer.is_blackjack() {
        let (state, profit) = if player_bj {
            (HandState::Blackjack, 0.0)
        } else {
            (HandState::Stood, -bet)
        };
        return RoundOutcome {
            profit,
            wagered: bet,
            hands: vec![HandRecord {
                hand: player,
                wager: bet,
                state,
                profit,
            }],
            dealer,
        };
    }
    if player_bj {
        let profit = bet * rules.blackjack_pays;
        return RoundOutcome {
            profit,
            wagered: bet,
            hands: vec![HandRecord {
                hand: player,
                wager: bet,
                state: HandState::Blackjack,
                profit,
            }],
            dealer,
        };
    }

    let played = play_player_hands(player, dealer_up, shoe, counter, rules, bet);
    if played.iter().any(|h| h.state.is_live()) {
        play_dealer(&mut dealer, shoe, counter, rules);
    }
    settle(played, dealer)
}

/// Play a non-natural player hand to completion, following splits. The
/// returned hands are in play order.
pub fn play_player_hands(
    hand: Hand,
    dealer_up: Rank,
    shoe: &mut Shoe,
    counter: &mut HiLoCounter,
    rules: &TableRules,
    bet: f64,
) -> Vec<PlayedHand> {
    let mut pending = vec![(hand, 0u8)];
    let mut finished = Vec::new();

    while let Some((hand, depth)) = pending.pop() {
        match play_single(hand, depth, dealer_up, shoe, counter, rules, bet) {
            Step::Done(played) => finished.push(played),
            Step::Split(first, second) => {
                // LIFO: the first split hand is played before the second.
                pending.push((second, depth + 1));
                pending.push((first, depth + 1));
            }
        }
    }

    finished
}

enum Step {
    Done(PlayedHand),
    Split(Hand, Hand),
}

fn play_single(
    mut hand: Hand,
    split_depth: u8,
    dealer_up: Rank,
    shoe: &mut Shoe,
    counter: &mut HiLoCounter,
    rules: &TableRules,
    bet: f64,
) -> Step {
    let mut wager = bet;
    let done = |hand: Hand, wager: f64, state: HandState| {
        Step::Done(PlayedHand {
            hand,
            wager,
            split_depth,
            state,
        })
    };

    loop {
        let total = hand.value();
        if total > 21 {
            return done(hand, wager, HandState::Busted);
        }
        if total == 21 {
            return done(hand, wager, HandState::Stood);
        }

        // Split aces get one card and stand unless resplitting is allowed.
        let split_ace = split_depth > 0 && hand.first() == Some(Rank::Ace);
        if split_ace && hand.len() >= 2 && !rules.resplit_aces {
            return done(hand, wager, HandState::Stood);
        }

        let allowed = Allowed::for_hand(
            &hand,
            !shoe.is_empty() && (split_depth == 0 || rules.double_after_split),
            (!hand.is_pair_of_aces() || rules.split_aces)
                && split_depth < rules.max_splits
                && shoe.len() >= 2,
            split_depth == 0 && rules.surrender_allowed,
        );

        match decide(&hand, dealer_up, allowed) {
            Action::Hit => match deal(shoe, counter) {
                Some(card) => hand.push(card),
                // Out of cards: stand on what we have.
                None => return done(hand, wager, HandState::Stood),
            },
            Action::Double => match deal(shoe, counter) {
                Some(card) => {
                    hand.push(card);
                    wager *= 2.0;
                    let state = if hand.is_bust() {
                        HandState::Busted
                    } else {
                        HandState::Doubled
                    };
                    return done(hand, wager, state);
                }
                None => return done(hand, wager, HandState::Stood),
            },
            Action::Split => {
                let (mut first, mut second) = match hand.clone().split() {
                    Some(pair) => pair,
                    None => return done(hand, wager, HandState::Stood),
                };
                match (deal(shoe, counter), deal(shoe, counter)) {
                    (Some(a), Some(b)) => {
                        first.push(a);
                        second.push(b);
                        return Step::Split(first, second);
                    }
                    // Unreachable while `allowed.split` requires two cards.
                    _ => return done(hand, wager, HandState::Stood),
                }
            }
            Action::Surrender => return done(hand, wager, HandState::Surrendered),
            Action::Stand => return done(hand, wager, HandState::Stood),
        }
    }
}

/// Dealer draws to 17, and on soft 17 too when `dealer_hits_soft17`. Stops
/// early if the shoe runs out.
pub fn play_dealer(
    dealer: &mut Hand,
    shoe: &mut Shoe,
    counter: &mut HiLoCounter,
    rules: &TableRules,
) {
    loop {
        let total = dealer.value();
        let hits_soft17 = total == 17 && rules.dealer_hits_soft17 && dealer.is_soft();
        if total >= 17 && !hits_soft17 {
            return;
        }
        match deal(shoe, counter) {
            Some(card) => dealer.push(card),
            None => return,
        }
    }
}

/// Signed profit of one finished hand against the final dealer hand.
pub fn hand_profit(played: &PlayedHand, dealer: &Hand) -> f64 {
    match played.state {
        HandState::Busted => -played.wager,
        HandState::Surrendered => -played.wager * 0.5,
        // Naturals are paid before player hands are played.
        HandState::Blackjack => 0.0,
        HandState::Stood | HandState::Doubled => {
            let player_total = played.hand.value();
            let dealer_total = dealer.value();
            if dealer_total > 21 || player_total > dealer_total {
                played.wager
            } else if player_total < dealer_total {
                -played.wager
            } else {
                0.0
            }
        }
    }
}

fn settle(played: Vec<PlayedHand>, dealer: Hand) -> RoundOutcome {
    let mut outcome = RoundOutcome {
        dealer,
        ..RoundOutcome::default()
    };
    for hand in played {
        let profit = hand_profit(&hand, &outcome.dealer);
        outcome.profit += profit;
        outcome.wagered += hand.wager;
        outcome.hands.push(HandRecord {
            hand: hand.hand,
            wager: hand.wager,
            state: hand.state,
            profit,
        });
    }
    outcome
}
