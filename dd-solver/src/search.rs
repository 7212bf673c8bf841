//! The search proper: a partial-tricks alpha-beta answering "can the
//! declaring side take at least `beta` of the remaining tricks", driven
//! to the exact count by a zero-window loop.
//!
//! N-S is the maximizing side throughout; entry points convert to and
//! from declarer-relative counts. Every result carries the set of cards
//! whose rank mattered, which feeds both the transposition entries and
//! the sibling-skipping of spot cards.

use bridge_cards::CardSet;

use crate::later::later_tricks_opponent;
use crate::moves::{
    is_equivalent, order_follows, order_leads, playable, rank_of, suit_of, suit_set, wins_over,
    MoveList,
};
use crate::quick::quick_tricks;
use crate::table::{
    compress, cutoff_check, decompress, position_check, Bounds, Shape, Tables,
};

/// What one search call proves about a position
#[derive(Clone, Copy, Default)]
pub(crate) struct SearchResult {
    pub ns_tricks: u8,
    pub rank_winners: CardSet,
}

#[derive(Clone, Copy, Default)]
struct PlaySlot {
    seat: usize,
    card: usize,
    winning_depth: usize,
    ns_tricks: u8,
}

#[derive(Clone, Copy, Default)]
struct TrickSlot {
    all_cards: CardSet,
    lead_suit: usize,
    shape: Shape,
}

/// Cards already played to the trick in progress, in play order
#[derive(Clone, Debug, Default)]
pub(crate) struct PartialTrick {
    pub plays: Vec<(usize, usize)>,
}

impl PartialTrick {
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }
}

/// A validated position handed to the search: remaining hands, with the
/// partial trick's cards already removed from them.
#[derive(Clone, Debug)]
pub(crate) struct Position {
    pub hands: [CardSet; 4],
    pub trump: Option<usize>,
    pub leader: usize,
    pub partial: PartialTrick,
}

impl Position {
    pub fn num_tricks(&self) -> usize {
        self.hands.iter().map(|h| h.len()).max().unwrap_or(0)
    }
}

pub(crate) struct Search<'a> {
    hands: [CardSet; 4],
    trump: Option<usize>,
    trump_code: usize,
    num_tricks: usize,
    plays: [PlaySlot; 52],
    tricks: [TrickSlot; 13],
    tables: &'a mut Tables,
    start_depth: usize,
    nodes: u64,
}

impl<'a> Search<'a> {
    pub fn new(position: &Position, tables: &'a mut Tables) -> Self {
        let num_tricks = position.num_tricks();
        let mut plays = [PlaySlot::default(); 52];
        let mut tricks = [TrickSlot::default(); 13];

        let start_depth = if position.partial.is_empty() {
            plays[0].seat = position.leader;
            0
        } else {
            let first_card = position.partial.plays[0].1;
            tricks[0].lead_suit = suit_of(first_card);

            let mut full_hands = position.hands;
            for &(seat, card) in &position.partial.plays {
                full_hands[seat].insert_index(card);
            }
            tricks[0].all_cards = full_hands[0]
                .union(full_hands[1])
                .union(full_hands[2])
                .union(full_hands[3]);
            tricks[0].shape = Shape::from_hands(&full_hands);

            let mut winning_depth = 0;
            for (depth, &(seat, card)) in position.partial.plays.iter().enumerate() {
                plays[depth].seat = seat;
                plays[depth].card = card;
                if depth > 0
                    && wins_over(card, plays[winning_depth].card, position.trump)
                {
                    winning_depth = depth;
                }
                plays[depth].winning_depth = winning_depth;
            }

            let next = position.partial.len();
            plays[next].seat = (position.partial.plays[next - 1].0 + 1) & 3;
            next
        };

        Search {
            hands: position.hands,
            trump: position.trump,
            trump_code: position.trump.map_or(4, |t| t),
            num_tricks,
            plays,
            tricks,
            tables,
            start_depth,
            nodes: 0,
        }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Zero-window search: does N-S reach `beta` tricks?
    pub fn search(&mut self, beta: i8) -> SearchResult {
        self.search_with_cache(self.start_depth, beta)
    }

    fn search_with_cache(&mut self, depth: usize, beta: i8) -> SearchResult {
        let trick_idx = depth / 4;
        let card_in_trick = depth & 3;

        if card_in_trick != 0 {
            self.plays[depth].ns_tricks = self.plays[depth - 1].ns_tricks;
            self.plays[depth].seat = (self.plays[depth - 1].seat + 1) & 3;
            return self.evaluate_playable(depth, beta);
        }

        if depth > 0 {
            // Resolve the trick just completed.
            let winning_depth = self.plays[depth - 1].winning_depth;
            let winner = self.plays[winning_depth].seat;
            let won = (winner & 1) as u8;
            self.plays[depth].ns_tricks = self.plays[depth - 1].ns_tricks + won;
            self.plays[depth].seat = winner;
        }

        let ns_tricks = self.plays[depth].ns_tricks;
        let seat = self.plays[depth].seat;
        let remaining = self.num_tricks - trick_idx;

        if ns_tricks as i8 >= beta {
            return SearchResult {
                ns_tricks,
                rank_winners: CardSet::new(),
            };
        }
        if (ns_tricks as usize + remaining) < beta as usize {
            return SearchResult {
                ns_tricks: ns_tricks + remaining as u8,
                rank_winners: CardSet::new(),
            };
        }
        if remaining == 1 {
            return self.collect_last_trick(depth);
        }

        let all_cards = self.hands[0]
            .union(self.hands[1])
            .union(self.hands[2])
            .union(self.hands[3]);
        self.tricks[trick_idx].all_cards = all_cards;
        if depth == 0 {
            self.tricks[trick_idx].shape = Shape::from_hands(&self.hands);
        } else {
            let prev = trick_idx - 1;
            let base = prev * 4;
            let mut shape = self.tricks[prev].shape;
            shape.play_cards(
                self.plays[base].seat,
                [
                    self.plays[base].card,
                    self.plays[base + 1].card,
                    self.plays[base + 2].card,
                    self.plays[base + 3].card,
                ],
            );
            self.tricks[trick_idx].shape = shape;
        }

        // Transposition probe on the rank-compressed fingerprint.
        let images = [
            compress(self.hands[0], all_cards),
            compress(self.hands[1], all_cards),
            compress(self.hands[2], all_cards),
            compress(self.hands[3], all_cards),
        ];
        let check = position_check(&images, seat, self.trump_code)
            ^ self.tricks[trick_idx].shape.value().wrapping_mul(0x9e37_79b9_7f4a_7c15);
        if let Some((bounds, winner_image)) = self.tables.tt.probe(check) {
            let rank_winners = decompress(winner_image, all_cards);
            let lower = bounds.lower + ns_tricks as i8;
            let upper = bounds.upper + ns_tricks as i8;
            if lower >= beta {
                return SearchResult {
                    ns_tricks: lower as u8,
                    rank_winners,
                };
            }
            if upper < beta {
                return SearchResult {
                    ns_tricks: upper as u8,
                    rank_winners,
                };
            }
        }

        // Quick tricks the mover can cash now.
        let (quick, quick_winners) =
            quick_tricks(&self.hands, seat, self.trump, all_cards, remaining);
        if seat & 1 == 1 {
            if ns_tricks as usize + quick >= beta as usize {
                return SearchResult {
                    ns_tricks: (ns_tricks as usize + quick) as u8,
                    rank_winners: quick_winners,
                };
            }
        } else if (ns_tricks as usize + remaining - quick) < beta as usize {
            return SearchResult {
                ns_tricks: (ns_tricks as usize + remaining - quick) as u8,
                rank_winners: quick_winners,
            };
        }

        // Tricks the opponents must eventually come to.
        let (later, later_winners) =
            later_tricks_opponent(&self.hands, seat, self.trump, all_cards, remaining);
        if later > 0 {
            if seat & 1 == 1 {
                if (ns_tricks as usize + remaining - later) < beta as usize {
                    return SearchResult {
                        ns_tricks: (ns_tricks as usize + remaining - later) as u8,
                        rank_winners: later_winners,
                    };
                }
            } else if ns_tricks as usize + later >= beta as usize {
                return SearchResult {
                    ns_tricks: (ns_tricks as usize + later) as u8,
                    rank_winners: later_winners,
                };
            }
        }

        let result = self.evaluate_playable(depth, beta);

        // Record what this search proved, relative to the trick count.
        let relative = (result.ns_tricks - ns_tricks) as i8;
        let bounds = if (result.ns_tricks as i8) < beta {
            Bounds::new(0, relative)
        } else {
            Bounds::new(relative, remaining as i8)
        };
        let winner_image = compress(result.rank_winners.intersect(all_cards), all_cards);
        self.tables.tt.store(check, remaining as u8, bounds, winner_image);

        result
    }

    fn evaluate_playable(&mut self, depth: usize, beta: i8) -> SearchResult {
        self.nodes += 1;
        let trick_idx = depth / 4;
        let card_in_trick = depth & 3;
        let ns_tricks = self.plays[depth].ns_tricks;
        let seat = self.plays[depth].seat;
        let maximizing = seat & 1 == 1;

        let lead_suit = if card_in_trick == 0 {
            None
        } else {
            Some(self.tricks[trick_idx].lead_suit)
        };
        let playable_cards = playable(self.hands[seat], lead_suit);
        if playable_cards.is_empty() {
            return SearchResult {
                ns_tricks,
                rank_winners: CardSet::new(),
            };
        }

        let (winning_card, winning_seat) = if card_in_trick > 0 {
            let wd = self.plays[depth - 1].winning_depth;
            (self.plays[wd].card, self.plays[wd].seat)
        } else {
            (0, 0)
        };

        let all_cards = self.tricks[trick_idx].all_cards;

        // Coarse class key for the refutation-move cache.
        let (key0, mut key1) = if card_in_trick == 0 {
            (self.hands[seat].bits(), 0u64)
        } else if !suit_set(self.hands[seat], self.tricks[trick_idx].lead_suit).is_empty() {
            (
                suit_set(all_cards, self.tricks[trick_idx].lead_suit).bits(),
                1u64 << winning_card,
            )
        } else if self.trump.is_none() {
            (self.hands[seat].bits(), 1u64 << winning_seat)
        } else {
            (self.hands[seat].bits(), 1u64 << winning_card)
        };
        key1 |= 1u64 << (52 + card_in_trick);
        let cut_check = cutoff_check(key0, key1);

        let cutoff_card = self
            .tables
            .cutoff
            .lookup(cut_check, seat)
            .filter(|&c| playable_cards.has_index(c));

        let mut ordered = MoveList::new();
        let mut deferred = CardSet::new();
        match cutoff_card {
            Some(card) => {
                // Try the remembered refutation first; order the rest
                // only if it fails to cut.
                ordered.push(card);
                deferred = playable_cards;
                deferred.remove_index(card);
            }
            None => {
                ordered = self.order_moves(depth, playable_cards);
            }
        }

        let my_hand = self.hands[seat];
        let mut best: u8 = if maximizing { 0 } else { self.num_tricks as u8 };
        let mut tried = CardSet::new();
        let mut rank_winners = CardSet::new();
        let mut min_relevant_rank = [0usize; 4];

        let mut i = 0;
        while i < ordered.len() {
            let card = ordered.card(i);
            let suit = suit_of(card);

            let skip = rank_of(card) < min_relevant_rank[suit]
                || is_equivalent(card, suit_set(tried, suit), my_hand, all_cards);
            if skip {
                tried.insert_index(card);
                i += 1;
                if i == ordered.len() && !deferred.is_empty() {
                    let more = self.order_moves(depth, deferred);
                    for j in 0..more.len() {
                        ordered.push(more.card(j));
                    }
                    deferred = CardSet::new();
                }
                continue;
            }
            tried.insert_index(card);

            let branch = self.play_and_search(depth, card, beta);
            let score = branch.ns_tricks;

            if maximizing {
                best = best.max(score);
                if best as i8 >= beta {
                    if cutoff_card != Some(card) {
                        self.tables.cutoff.store(cut_check, seat, card);
                    }
                    return SearchResult {
                        ns_tricks: best,
                        rank_winners: branch.rank_winners,
                    };
                }
            } else {
                best = best.min(score);
                if (best as i8) < beta {
                    if cutoff_card != Some(card) {
                        self.tables.cutoff.store(cut_check, seat, card);
                    }
                    return SearchResult {
                        ns_tricks: best,
                        rank_winners: branch.rank_winners,
                    };
                }
            }

            rank_winners.insert_all(branch.rank_winners);

            // Ranks below the lowest rank that mattered cannot change
            // the outcome; skip those siblings.
            let suit_winners = suit_set(branch.rank_winners, suit);
            match suit_winners.lowest() {
                None => min_relevant_rank[suit] = 13,
                Some(lowest) => {
                    let bottom_rank = rank_of(lowest);
                    if rank_of(card) < bottom_rank {
                        min_relevant_rank[suit] = min_relevant_rank[suit].max(bottom_rank);
                    }
                }
            }

            i += 1;
            if i == ordered.len() && !deferred.is_empty() {
                let more = self.order_moves(depth, deferred);
                for j in 0..more.len() {
                    ordered.push(more.card(j));
                }
                deferred = CardSet::new();
            }
        }

        SearchResult {
            ns_tricks: best,
            rank_winners,
        }
    }

    fn order_moves(&self, depth: usize, cards: CardSet) -> MoveList {
        let trick_idx = depth / 4;
        let card_in_trick = depth & 3;
        let seat = self.plays[depth].seat;

        if card_in_trick == 0 {
            order_leads(
                cards,
                &self.hands,
                seat,
                self.trump,
                self.tricks[trick_idx].all_cards,
            )
        } else {
            let wd = self.plays[depth - 1].winning_depth;
            order_follows(
                cards,
                &self.hands,
                seat,
                self.trump,
                self.tricks[trick_idx].lead_suit,
                self.plays[wd].seat,
                self.plays[wd].card,
                card_in_trick,
            )
        }
    }

    fn play_and_search(&mut self, depth: usize, card: usize, beta: i8) -> SearchResult {
        let trick_idx = depth / 4;
        let card_in_trick = depth & 3;
        let seat = self.plays[depth].seat;

        self.plays[depth].card = card;
        self.hands[seat].remove_index(card);

        if card_in_trick == 0 {
            self.tricks[trick_idx].lead_suit = suit_of(card);
            self.plays[depth].winning_depth = depth;
        } else {
            let prev_wd = self.plays[depth - 1].winning_depth;
            if wins_over(card, self.plays[prev_wd].card, self.trump) {
                self.plays[depth].winning_depth = depth;
            } else {
                self.plays[depth].winning_depth = prev_wd;
            }
        }

        let mut result = self.search_with_cache(depth + 1, beta);

        // A trick just closed under this card: its winner is a rank
        // winner when the rank was actually contested.
        if card_in_trick == 3 {
            let wd = self.plays[depth].winning_depth;
            let winning_card = self.plays[wd].card;
            let winning_suit = suit_of(winning_card);
            let start = depth - 3;
            let contested = (start..=depth).any(|d| {
                d != wd && suit_of(self.plays[d].card) == winning_suit
            });
            if contested {
                result.rank_winners.insert_index(winning_card);
            }
        }

        self.hands[seat].insert_index(card);
        result
    }

    fn collect_last_trick(&self, depth: usize) -> SearchResult {
        let seat = self.plays[depth].seat;
        let ns_tricks = self.plays[depth].ns_tricks;

        let mut winning_card = self.hands[seat].highest().expect("hand has its last card");
        let mut winning_seat = seat;
        for i in 1..4 {
            let other = (seat + i) & 3;
            if let Some(card) = self.hands[other].highest() {
                if wins_over(card, winning_card, self.trump) {
                    winning_card = card;
                    winning_seat = other;
                }
            }
        }

        let ns = ns_tricks + ((winning_seat & 1) as u8);

        let winning_suit = suit_of(winning_card);
        let mut rank_winners = CardSet::new();
        let contested = (0..4).any(|i| {
            let other = (seat + i) & 3;
            self.hands[other]
                .highest()
                .map(|card| card != winning_card && suit_of(card) == winning_suit)
                .unwrap_or(false)
        });
        if contested {
            rank_winners.insert_index(winning_card);
        }

        SearchResult {
            ns_tricks: ns,
            rank_winners,
        }
    }
}

/// Opening estimate for the zero-window loop, from raw point count and
/// trump length.
fn guess_tricks(position: &Position, num_tricks: usize) -> usize {
    let hands = &position.hands;
    let ns_points = (hands[1].hcp() + hands[3].hcp()) as usize;
    let ew_points = (hands[0].hcp() + hands[2].hcp()) as usize;

    match position.trump {
        None => {
            if ns_points * 2 < ew_points {
                return 0;
            }
            if ns_points < ew_points {
                return num_tricks / 2 + 1;
            }
            num_tricks
        }
        Some(t) => {
            let lens: Vec<usize> = hands.iter().map(|h| suit_set(*h, t).len()).collect();
            let ns_max = lens[1].max(lens[3]);
            let ew_max = lens[0].max(lens[2]);
            if ns_points < ew_points
                && (ns_max < ew_max
                    || (ns_max == ew_max && lens[1] + lens[3] < lens[0] + lens[2]))
            {
                return 0;
            }
            num_tricks
        }
    }
}

/// Exact N-S tricks for a position, plus the rank winners of the final
/// proving search.
pub(crate) fn solve_ns_tricks(position: &Position, tables: &mut Tables) -> (u8, CardSet) {
    let num_tricks = position.num_tricks();
    if num_tricks == 0 {
        return (0, CardSet::new());
    }

    let mut lower = 0i8;
    let mut upper = num_tricks as i8;
    let mut ns = guess_tricks(position, num_tricks) as i8;
    let mut winners = CardSet::new();
    let mut total_nodes = 0u64;

    while lower < upper {
        let beta = if ns == lower { ns + 1 } else { ns };
        let mut search = Search::new(position, tables);
        let result = search.search(beta);
        total_nodes += search.nodes();
        ns = result.ns_tricks as i8;
        winners = result.rank_winners;
        if ns < beta {
            upper = ns;
        } else {
            lower = ns;
        }
    }

    log::debug!(
        "solved position: {} tricks for N-S in {} nodes",
        lower,
        total_nodes
    );
    (lower as u8, winners)
}
