//! Play analysis: score every candidate card at a position, and replay
//! a recorded line scoring each position it passed through.

use bridge_cards::{Card, CardSet, Rank};

use crate::error::SolveError;
use crate::moves::{is_equivalent, playable, suit_of, suit_set, wins_over};
use crate::search::{solve_ns_tricks, PartialTrick, Position};
use crate::table::Tables;

/// Minimum rank that contributed to the best line, per suit in
/// S, H, D, C order; `None` where no rank in the suit mattered.
pub type WinRanks = [Option<Rank>; 4];

/// One candidate card at a position, with the tricks the mover's side
/// takes after playing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardScore {
    pub card: Card,
    pub tricks: u8,
    pub win_ranks: Option<WinRanks>,
}

/// One position along a played-out line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayScore {
    /// Index of the card in the history (0 = opening lead)
    pub index: usize,
    /// The card actually played
    pub card: Card,
    /// Tricks the side on play could still have taken with best play
    pub tricks: u8,
}

pub(crate) fn win_ranks_from(winners: CardSet) -> WinRanks {
    let mut out = [None; 4];
    // Output is S, H, D, C; suit indices run clubs first.
    for (slot, suit) in (0..4usize).rev().enumerate() {
        out[slot] = suit_set(winners, suit)
            .lowest()
            .map(|card| Rank::from_index((card % 13) as u8).unwrap());
    }
    out
}

/// Tricks for the mover's side given the N-S total of the position.
fn mover_tricks(ns_tricks: u8, mover: usize, num_tricks: usize) -> u8 {
    if mover & 1 == 1 {
        ns_tricks
    } else {
        num_tricks as u8 - ns_tricks
    }
}

/// Score every legal card of the player on play. Cards equivalent in
/// rank share one search; each card is still reported.
pub(crate) fn score_all_plays(
    position: &Position,
    tables: &mut Tables,
    want_win_ranks: bool,
) -> Vec<CardScore> {
    let mover = match position.partial.plays.last() {
        Some(&(seat, _)) => (seat + 1) & 3,
        None => position.leader,
    };

    let mut all_cards = position.hands[0]
        .union(position.hands[1])
        .union(position.hands[2])
        .union(position.hands[3]);
    for &(_, card) in &position.partial.plays {
        all_cards.insert_index(card);
    }

    let lead_suit = position.partial.plays.first().map(|&(_, card)| suit_of(card));
    let legal = playable(position.hands[mover], lead_suit);
    debug_assert!(!legal.is_empty());

    let mut scores = Vec::with_capacity(legal.len());
    let mut tried = CardSet::new();
    // Last searched result per suit; adjacent equivalents reuse it.
    let mut last_in_suit: [Option<(u8, Option<WinRanks>)>; 4] = [None; 4];

    for card in legal.iter() {
        let suit = suit_of(card);
        if is_equivalent(card, suit_set(tried, suit), position.hands[mover], all_cards) {
            let (tricks, win_ranks) =
                last_in_suit[suit].expect("equivalence implies a tried neighbour");
            tried.insert_index(card);
            scores.push(CardScore {
                card: Card::from_index(card as u8).unwrap(),
                tricks,
                win_ranks,
            });
            continue;
        }
        tried.insert_index(card);

        let (tricks, winners) = score_one_play(position, mover, card, tables);
        let win_ranks = want_win_ranks.then(|| win_ranks_from(winners));
        last_in_suit[suit] = Some((tricks, win_ranks));
        scores.push(CardScore {
            card: Card::from_index(card as u8).unwrap(),
            tricks,
            win_ranks,
        });
    }

    scores
}

/// Tricks for the mover's side after playing `card`, with the rank
/// winners of the proving line.
fn score_one_play(
    position: &Position,
    mover: usize,
    card: usize,
    tables: &mut Tables,
) -> (u8, CardSet) {
    let num_tricks = position.num_tricks();
    let mut hands = position.hands;
    hands[mover].remove_index(card);

    let mut plays = position.partial.plays.clone();
    plays.push((mover, card));

    if plays.len() == 4 {
        // The candidate closes the trick; resolve it and search the
        // next trick from the winner.
        let mut winning = 0;
        for i in 1..4 {
            if wins_over(plays[i].1, plays[winning].1, position.trump) {
                winning = i;
            }
        }
        let (winner_seat, winner_card) = plays[winning];

        let next = Position {
            hands,
            trump: position.trump,
            leader: winner_seat,
            partial: PartialTrick::default(),
        };
        let (sub_ns, mut winners) = solve_ns_tricks(&next, tables);
        let ns = sub_ns + ((winner_seat & 1) as u8);

        let winning_suit = suit_of(winner_card);
        let contested = plays
            .iter()
            .any(|&(_, c)| c != winner_card && suit_of(c) == winning_suit);
        if contested {
            winners.insert_index(winner_card);
        }
        (mover_tricks(ns, mover, num_tricks), winners)
    } else {
        let next = Position {
            hands,
            trump: position.trump,
            leader: position.leader,
            partial: PartialTrick { plays },
        };
        let (ns, winners) = solve_ns_tricks(&next, tables);
        (mover_tricks(ns, mover, num_tricks), winners)
    }
}

/// Solve the position in front of every card of a recorded line.
pub(crate) fn score_history(
    hands: [CardSet; 4],
    trump: Option<usize>,
    opening_leader: usize,
    history: &[Card],
    tables: &mut Tables,
) -> Result<Vec<PlayScore>, SolveError> {
    use crate::state::Replay;
    use bridge_cards::{Direction, Strain, Suit};

    let strain = match trump {
        Some(t) => Strain::Trump(Suit::from_index(t as u8).expect("suit index")),
        None => Strain::NoTrump,
    };
    let leader = Direction::from_index(opening_leader as u8).expect("seat index");
    let mut replay = Replay::new(hands, strain, leader);

    let mut out = Vec::with_capacity(history.len());
    for (index, &card) in history.iter().enumerate() {
        let mover = replay.to_move().index();
        let partial = PartialTrick {
            plays: replay
                .current_trick()
                .iter()
                .enumerate()
                .map(|(i, &c)| {
                    let seat = (replay.leader().index() + i) & 3;
                    (seat, c.index() as usize)
                })
                .collect(),
        };
        let position = Position {
            hands: replay.hands(),
            trump,
            leader: replay.leader().index(),
            partial,
        };
        let num_tricks = position.num_tricks();
        let (ns, _) = solve_ns_tricks(&position, tables);
        out.push(PlayScore {
            index,
            card,
            tricks: mover_tricks(ns, mover, num_tricks),
        });

        replay.apply(card)?;
    }
    Ok(out)
}
