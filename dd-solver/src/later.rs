//! Later tricks: winners the opponents of the side to move cannot be
//! denied — top trumps, trump finesse positions, and notrump stoppers.
//! An upper bound on the moving side, checked before expanding a node.

use bridge_cards::CardSet;

use crate::moves::suit_set;

/// Consecutive top trumps the opponents of `seat` can run.
fn top_trump_tricks_opponent(
    hands: &[CardSet; 4],
    seat: usize,
    trump: usize,
    all_cards: CardSet,
) -> (usize, CardSet) {
    let lho_trumps = suit_set(hands[(seat + 1) & 3], trump);
    let rho_trumps = suit_set(hands[(seat + 3) & 3], trump);
    let all_trumps = suit_set(all_cards, trump);

    if lho_trumps == all_trumps {
        return (lho_trumps.len(), CardSet::new());
    }
    if rho_trumps == all_trumps {
        return (rho_trumps.len(), CardSet::new());
    }

    let both = lho_trumps.union(rho_trumps);
    let max_tricks = lho_trumps.len().max(rho_trumps.len());
    let mut sure = 0;
    let mut winners = CardSet::new();
    for card in all_trumps.iter() {
        if both.has_index(card) && sure < max_tricks {
            sure += 1;
            winners.insert_index(card);
        } else {
            break;
        }
    }
    (sure, winners)
}

/// Trump finesse positions that hand the opponents an eventual trump
/// trick: a guarded king behind the ace, or a thrice-guarded queen
/// behind ace-king.
fn slow_trump_tricks_opponent(
    hands: &[CardSet; 4],
    seat: usize,
    trump: usize,
    all_cards: CardSet,
    remaining: usize,
) -> (usize, CardSet) {
    let all_trumps = suit_set(all_cards, trump);
    if all_trumps.len() < 3 {
        return (0, CardSet::new());
    }

    // Seen from the defending side: "my" is the mover's LHO.
    let my_trumps = suit_set(hands[(seat + 1) & 3], trump);
    let pd_trumps = suit_set(hands[(seat + 3) & 3], trump);
    let lho_trumps = suit_set(hands[(seat + 2) & 3], trump);
    let rho_trumps = suit_set(hands[seat], trump);

    let a = all_trumps.highest().unwrap();
    let rest = all_trumps.below(a);
    let k = match rest.highest() {
        Some(k) => k,
        None => return (0, CardSet::new()),
    };
    let q = rest.below(k).highest();

    let mut ak_winners = CardSet::new();
    ak_winners.insert_index(a);
    ak_winners.insert_index(k);

    // Kx behind the ace.
    let pd_guarded_k = pd_trumps.has_index(k) && pd_trumps.len() > 1;
    let my_guarded_k = my_trumps.has_index(k) && my_trumps.len() > 1;
    if (pd_guarded_k && lho_trumps.has_index(a))
        || (my_guarded_k && rho_trumps.has_index(a) && remaining >= 3)
    {
        return (1, ak_winners);
    }

    // Qxx behind ace-king, five trumps or more out.
    if let Some(q) = q {
        if all_trumps.len() >= 5 {
            let mut akq_winners = ak_winners;
            akq_winners.insert_index(q);

            let pd_guarded_q = pd_trumps.has_index(q) && pd_trumps.len() >= 3;
            let my_guarded_q = my_trumps.has_index(q) && my_trumps.len() >= 3;
            let lho_has_ak = lho_trumps.has_index(a) && lho_trumps.has_index(k);
            let rho_has_ak = rho_trumps.has_index(a) && rho_trumps.has_index(k);

            if (pd_guarded_q && lho_has_ak)
                || (my_guarded_q && rho_has_ak && remaining >= 4)
            {
                return (1, akq_winners);
            }
        }
    }

    (0, CardSet::new())
}

/// Notrump stoppers: top cards the opponents hold in every suit the
/// mover could lead. All in one hand, they all cash; split, one is sure.
fn slow_notrump_tricks_opponent(
    hands: &[CardSet; 4],
    seat: usize,
    all_cards: CardSet,
) -> (usize, CardSet) {
    let my_hand = hands[seat];
    let my_side = my_hand.union(hands[(seat + 2) & 3]);
    let lho_hand = hands[(seat + 1) & 3];
    let rho_hand = hands[(seat + 3) & 3];

    let mut winners = CardSet::new();
    for suit in 0..4 {
        if suit_set(my_hand, suit).is_empty() {
            continue;
        }
        let all_suit = suit_set(all_cards, suit);
        let top = match all_suit.highest() {
            Some(top) => top,
            None => continue,
        };
        if my_side.has_index(top) {
            return (0, CardSet::new());
        }
        winners.insert_index(top);
    }

    if winners.is_empty() {
        return (0, CardSet::new());
    }
    if lho_hand.contains_all(winners) || rho_hand.contains_all(winners) {
        (winners.len(), winners)
    } else {
        (1, winners)
    }
}

/// Tricks the opponents of `seat` are guaranteed to come to eventually.
pub(crate) fn later_tricks_opponent(
    hands: &[CardSet; 4],
    seat: usize,
    trump: Option<usize>,
    all_cards: CardSet,
    remaining: usize,
) -> (usize, CardSet) {
    match trump {
        Some(t) if !suit_set(all_cards, t).is_empty() => {
            let (top, winners) = top_trump_tricks_opponent(hands, seat, t, all_cards);
            if top > 0 {
                (top, winners)
            } else {
                slow_trump_tricks_opponent(hands, seat, t, all_cards, remaining)
            }
        }
        _ => slow_notrump_tricks_opponent(hands, seat, all_cards),
    }
}
