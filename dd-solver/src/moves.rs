//! Move generation: legal plays, rank-equivalence reduction, and the
//! heuristic ordering that drives cutoffs.
//!
//! Ordering never changes results, only how fast the search refutes a
//! position; equivalence reduction collapses cards that are adjacent in
//! rank among all unplayed cards into one class.

use bridge_cards::CardSet;

/// Cards of one suit by suit index
#[inline]
pub(crate) fn suit_set(cards: CardSet, suit: usize) -> CardSet {
    CardSet::from_bits(cards.bits() & (0x1FFFu64 << (suit * 13)))
}

#[inline]
pub(crate) fn suit_of(card: usize) -> usize {
    card / 13
}

#[inline]
pub(crate) fn rank_of(card: usize) -> usize {
    card % 13
}

/// Whether `c1` beats `c2` once both are on the table (`c2` winning)
#[inline]
pub(crate) fn wins_over(c1: usize, c2: usize, trump: Option<usize>) -> bool {
    if suit_of(c1) == suit_of(c2) {
        return c1 > c2;
    }
    trump == Some(suit_of(c1))
}

/// Legal cards: follow the suit led when possible, else anything
pub(crate) fn playable(hand: CardSet, lead_suit: Option<usize>) -> CardSet {
    if let Some(suit) = lead_suit {
        let follow = suit_set(hand, suit);
        if !follow.is_empty() {
            return follow;
        }
    }
    hand
}

/// Whether `card` is interchangeable with some already-tried card: the
/// gap between them among all unplayed cards is entirely in my hand.
pub(crate) fn is_equivalent(
    card: usize,
    tried_suit: CardSet,
    my_hand: CardSet,
    all_cards: CardSet,
) -> bool {
    if tried_suit.is_empty() {
        return false;
    }
    let suit = suit_of(card);
    let all_suit = suit_set(all_cards, suit);
    let my_suit = suit_set(my_hand, suit);

    if let Some(nearest) = tried_suit.above(card).lowest() {
        let between_all = all_suit.below(nearest).above(card);
        let between_mine = my_suit.below(nearest).above(card);
        if between_all == between_mine {
            return true;
        }
    }
    if let Some(nearest) = tried_suit.below(card).highest() {
        let between_all = all_suit.above(nearest).below(card);
        let between_mine = my_suit.above(nearest).below(card);
        if between_all == between_mine {
            return true;
        }
    }
    false
}

/// Ordered moves, at most one trick's worth of cards
#[derive(Clone, Copy)]
pub(crate) struct MoveList {
    cards: [u8; 13],
    len: usize,
}

impl MoveList {
    #[inline]
    pub fn new() -> Self {
        MoveList {
            cards: [0; 13],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, card: usize) {
        self.cards[self.len] = card as u8;
        self.len += 1;
    }

    /// Append high to low
    fn push_descending(&mut self, cards: CardSet) {
        for card in cards.iter() {
            self.push(card);
        }
    }

    /// Append low to high
    fn push_ascending(&mut self, cards: CardSet) {
        for card in cards.iter_ascending() {
            self.push(card);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn card(&self, i: usize) -> usize {
        self.cards[i] as usize
    }
}

/// The top `n` cards of a suit as a set
fn top_cards(suit_cards: CardSet, n: usize) -> CardSet {
    let mut out = CardSet::new();
    for card in suit_cards.iter().take(n) {
        out.insert_index(card);
    }
    out
}

fn pair(a: usize, b: usize) -> CardSet {
    let mut out = CardSet::new();
    out.insert_index(a);
    out.insert_index(b);
    out
}

/// Order the cards for a player on lead. Finesse positions through the
/// left-hand opponent come first, then suits where the partnership owns
/// most of the top honours, plain suits, and last the leads that give
/// up a tempo (underleads of aces in suit play, trumps).
#[allow(clippy::too_many_arguments)]
pub(crate) fn order_leads(
    playable: CardSet,
    hands: &[CardSet; 4],
    seat: usize,
    trump: Option<usize>,
    all_cards: CardSet,
) -> MoveList {
    let mut ordered = MoveList::new();
    let mut remaining = playable;

    let pd_hand = hands[(seat + 2) & 3];
    let lho_hand = hands[(seat + 1) & 3];
    let rho_hand = hands[(seat + 3) & 3];
    let our_hands = hands[seat].union(pd_hand);

    let mut ruff_leads = CardSet::new();
    let mut good_leads = CardSet::new();
    let mut high_leads = CardSet::new();
    let mut normal_leads = CardSet::new();
    let mut bad_leads = CardSet::new();
    let mut trump_leads = CardSet::new();

    for suit in 0..4 {
        let my_suit = suit_set(playable, suit);
        if my_suit.is_empty() {
            continue;
        }
        let my_top = my_suit.highest().unwrap();
        let my_bottom = my_suit.lowest().unwrap();

        if trump == Some(suit) {
            trump_leads.insert_index(my_top);
            if my_suit.len() > 1 {
                trump_leads.insert_index(my_bottom);
            }
            continue;
        }

        // A suit either opponent can ruff is not worth opening.
        if let Some(t) = trump {
            if !suit_set(lho_hand, t).is_empty() && suit_set(lho_hand, suit).is_empty() {
                continue;
            }
            if !suit_set(rho_hand, t).is_empty() && suit_set(rho_hand, suit).is_empty() {
                continue;
            }
        }

        let pd_suit = suit_set(pd_hand, suit);
        let lho_suit = suit_set(lho_hand, suit);
        let rho_suit = suit_set(rho_hand, suit);
        let all_suit = suit_set(all_cards, suit);

        // Top five unplayed ranks of the suit, as absolute cards.
        let tops = top_cards(all_suit, 5);
        let mut top_iter = tops.iter();
        let a = top_iter.next().unwrap_or(my_top);
        let k = top_iter.next().unwrap_or(a);
        let q = top_iter.next().unwrap_or(k);
        let j = top_iter.next().unwrap_or(q);
        let t = top_iter.next().unwrap_or(j);

        // Finesse positions: partner's honour sits over LHO's.
        if pd_suit.len() >= 2 && lho_suit.len() >= 2 {
            let own_qj = our_hands.contains_all(pair(q, j));
            let own_jt = our_hands.contains_all(pair(j, t));
            if (pd_suit.has_index(k) && lho_suit.has_index(a))
                || (pd_suit.has_index(a) && lho_suit.has_index(k) && (pd_suit.has_index(q) || own_qj))
                || (pd_suit.has_index(k) && lho_suit.has_index(q) && (pd_suit.has_index(j) || own_jt))
            {
                good_leads.insert_index(my_top);
                if my_suit.len() > 1 {
                    good_leads.insert_index(my_bottom);
                }
                continue;
            }
        }

        // Leading from a high honour into RHO's higher one costs a trick.
        if my_suit.len() >= 2
            && rho_suit.len() >= 2
            && ((my_suit.has_index(a) && rho_suit.has_index(k))
                || (my_suit.has_index(k) && rho_suit.has_index(a) && !our_hands.has_index(q)))
        {
            if trump.is_some() {
                bad_leads.insert_index(my_top);
                if my_suit.len() > 1 {
                    bad_leads.insert_index(my_bottom);
                }
            }
            continue;
        }

        // Both opponents follow and we own most of the top honours.
        let mut akq = pair(a, k);
        akq.insert_index(q);
        if !lho_suit.is_empty()
            && !rho_suit.is_empty()
            && our_hands.intersect(akq).len() >= 2
        {
            high_leads.insert_index(my_top);
            if my_suit.len() > 1 {
                high_leads.insert_index(my_bottom);
            }
            continue;
        }

        // Partner is void with trumps left: try for a ruff.
        if let Some(t) = trump {
            if pd_suit.is_empty()
                && !lho_suit.is_empty()
                && !rho_suit.is_empty()
                && !suit_set(pd_hand, t).is_empty()
                && suit_set(pd_hand, t).len() <= suit_set(playable, t).len()
                && my_bottom != a
            {
                ruff_leads.insert_index(my_bottom);
                continue;
            }
        }

        normal_leads.insert_index(my_top);
        if my_suit.len() > 1 {
            normal_leads.insert_index(my_bottom);
        }
    }

    if trump.is_some() {
        ordered.push_descending(ruff_leads);
        remaining.remove_all(ruff_leads);
    }
    ordered.push_descending(good_leads);
    remaining.remove_all(good_leads);
    ordered.push_descending(high_leads);
    remaining.remove_all(high_leads);
    ordered.push_descending(normal_leads);
    remaining.remove_all(normal_leads);
    if trump.is_some() {
        ordered.push_descending(bad_leads);
        remaining.remove_all(bad_leads);
        ordered.push_descending(trump_leads);
        remaining.remove_all(trump_leads);
    }
    ordered.push_descending(remaining);

    ordered
}

/// Order the cards for a player following to a trick.
#[allow(clippy::too_many_arguments)]
pub(crate) fn order_follows(
    playable: CardSet,
    hands: &[CardSet; 4],
    seat: usize,
    trump: Option<usize>,
    lead_suit: usize,
    winning_seat: usize,
    winning_card: usize,
    card_in_trick: usize,
) -> MoveList {
    let mut ordered = MoveList::new();

    let pd_suit = suit_set(hands[(seat + 2) & 3], lead_suit);
    let lho_suit = suit_set(hands[(seat + 1) & 3], lead_suit);

    let trick_ending = card_in_trick == 3;
    let second_seat = card_in_trick == 1;
    let partner_winning = winning_seat == (seat + 2) & 3;

    let my_suit = suit_set(playable, lead_suit);
    if !my_suit.is_empty() {
        let my_top = my_suit.highest().unwrap();

        // Cannot beat the current winner: play low.
        if !wins_over(my_top, winning_card, trump) {
            ordered.push_ascending(playable);
            return ordered;
        }

        // Partner already holds the trick and overtaking cannot help.
        if partner_winning
            && (trick_ending
                || lho_suit.is_empty()
                || winning_card > lho_suit.highest().unwrap_or(0)
                || lho_suit.above(winning_card) == lho_suit.above(my_top))
        {
            ordered.push_ascending(playable);
            return ordered;
        }

        // Second seat: duck when partner's top card does the job.
        if second_seat && !pd_suit.is_empty() {
            let pd_top = pd_suit.highest().unwrap();
            if pd_top > winning_card {
                let combined_top = my_top.max(pd_top);
                let lho_covers = match lho_suit.highest() {
                    Some(lho_top) => {
                        lho_top > combined_top
                            && lho_suit.above(pd_top) == lho_suit.above(my_top)
                    }
                    None => true,
                };
                if lho_covers || lho_suit.highest().map_or(true, |t| pd_top > t) {
                    ordered.push_ascending(playable);
                    return ordered;
                }
            }
        }

        // Winners first; among them, the cheapest that still stands up.
        let higher = my_suit.above(winning_card);
        let lower = my_suit.minus(higher);
        let safe_low = trick_ending
            || lho_suit.is_empty()
            || higher.lowest().unwrap_or(0) > lho_suit.highest().unwrap_or(0);
        if safe_low {
            ordered.push_ascending(higher);
        } else {
            ordered.push_descending(higher);
        }
        ordered.push_ascending(lower);
        return ordered;
    }

    // Out of the led suit: ruff or discard.
    let my_trumps = match trump {
        Some(t) => suit_set(playable, t),
        None => CardSet::new(),
    };

    if let (Some(t), false) = (trump, my_trumps.is_empty()) {
        let lho_has_trumps = !suit_set(hands[(seat + 1) & 3], t).is_empty();

        let partner_holds = partner_winning
            && (trick_ending
                || (!lho_suit.is_empty() && wins_over(winning_card, lho_suit.highest().unwrap(), trump)));
        if partner_holds {
            // Let partner keep it; discard below.
        } else if suit_of(winning_card) == t {
            // Overruff if we can.
            if !partner_winning && wins_over(my_trumps.highest().unwrap(), winning_card, trump) {
                let over = my_trumps.above(winning_card);
                ordered.push_ascending(over);
                push_discards(&mut ordered, playable.minus(over), trump);
                return ordered;
            }
        } else if trick_ending || !lho_suit.is_empty() || !lho_has_trumps {
            // The smallest trump is already enough.
            let low = my_trumps.lowest().unwrap();
            ordered.push(low);
            let mut rest = playable;
            rest.remove_index(low);
            push_discards(&mut ordered, rest, trump);
            return ordered;
        } else {
            // LHO may overruff: try from the top.
            ordered.push_descending(my_trumps);
            push_discards(&mut ordered, playable.minus(my_trumps), trump);
            return ordered;
        }
    }

    push_discards(&mut ordered, playable, trump);
    ordered
}

/// Cheapest card of each side suit first, longest suits preferred, then
/// whatever is left.
fn push_discards(ordered: &mut MoveList, mut playable: CardSet, trump: Option<usize>) {
    let mut discards: [(usize, usize); 4] = [(0, 0); 4];
    let mut count = 0;

    for suit in 0..4 {
        if trump == Some(suit) {
            continue;
        }
        let suit_cards = suit_set(playable, suit);
        if let Some(bottom) = suit_cards.lowest() {
            discards[count] = (bottom, suit_cards.len());
            count += 1;
            playable.remove_index(bottom);
        }
    }

    discards[..count].sort_by(|a, b| b.1.cmp(&a.1));
    for &(card, _) in discards.iter().take(count) {
        ordered.push(card);
    }
    ordered.push_descending(playable);
}
