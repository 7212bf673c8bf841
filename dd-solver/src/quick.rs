//! Quick tricks: cards the side to move can cash immediately, counted
//! suit by suit with cross-hand entries and trump control respected.
//! A lower bound for the moving side, so the search can stand pat or
//! cut off before expanding a node.

use bridge_cards::CardSet;

use crate::moves::suit_set;

/// Consecutive top trumps our side can run.
fn top_trump_tricks(
    my_trumps: CardSet,
    pd_trumps: CardSet,
    all_trumps: CardSet,
) -> (usize, CardSet) {
    if my_trumps == all_trumps {
        return (my_trumps.len(), CardSet::new());
    }
    if pd_trumps == all_trumps {
        return (pd_trumps.len(), CardSet::new());
    }

    let both = my_trumps.union(pd_trumps);
    let max_tricks = my_trumps.len().max(pd_trumps.len());
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

/// Cashable tricks in one side suit, accounting for blockage and the
/// need for an entry to partner.
fn suit_quick_tricks(
    my_suit: CardSet,
    my_winners: usize,
    pd_suit: CardSet,
    pd_winners: usize,
    pd_entry: &mut bool,
) -> usize {
    // My top covering partner's bottom card is an entry across.
    if !pd_suit.is_empty()
        && my_winners > 0
        && my_suit.highest().unwrap_or(0) > pd_suit.lowest().unwrap_or(51)
    {
        *pd_entry = true;
    }
    if pd_winners == 0 {
        return my_winners;
    }
    if my_winners == 0 {
        // Partner's winners need a lead from my side of the suit.
        return if !my_suit.is_empty() { pd_winners } else { 0 };
    }
    // Blocked: whoever's cards sit wholly above the other's cashes alone.
    if !pd_suit.is_empty() {
        if my_suit.highest().unwrap() < pd_suit.lowest().unwrap() {
            return pd_winners;
        }
        if my_suit.lowest().unwrap() > pd_suit.highest().unwrap() {
            return my_winners;
        }
    }
    // A partner with nothing but winners burns one unblocking.
    let adjusted_pd = if pd_winners == pd_suit.len() && pd_winners > 0 {
        pd_winners - 1
    } else {
        pd_winners
    };
    my_suit.len().min(my_winners + adjusted_pd)
}

/// Guaranteed immediate tricks for `seat`'s side, with the cards whose
/// rank carried them. Capped by the tricks actually remaining.
pub(crate) fn quick_tricks(
    hands: &[CardSet; 4],
    seat: usize,
    trump: Option<usize>,
    all_cards: CardSet,
    remaining: usize,
) -> (usize, CardSet) {
    let my_hand = hands[seat];
    let pd_hand = hands[(seat + 2) & 3];
    let lho_hand = hands[(seat + 1) & 3];
    let rho_hand = hands[(seat + 3) & 3];

    let (trump_tricks, mut winners) = match trump {
        Some(t) => top_trump_tricks(
            suit_set(my_hand, t),
            suit_set(pd_hand, t),
            suit_set(all_cards, t),
        ),
        None => (0, CardSet::new()),
    };

    let mut my_tricks = 0;
    let mut pd_tricks = 0;
    let mut pd_winner_cards = CardSet::new();
    let mut pd_entry = false;

    for suit in 0..4 {
        if trump == Some(suit) {
            continue;
        }
        let mut my_suit = suit_set(my_hand, suit);
        let mut pd_suit = suit_set(pd_hand, suit);
        let lho_suit = suit_set(lho_hand, suit);
        let rho_suit = suit_set(rho_hand, suit);
        let all_suit = suit_set(all_cards, suit);

        if my_suit.is_empty() && pd_suit.is_empty() {
            continue;
        }

        let my_max_winners = pd_suit.len().max(lho_suit.len()).max(rho_suit.len());
        let pd_max_winners = my_suit.len().max(lho_suit.len()).max(rho_suit.len());

        // An opponent with trumps ruffs the suit once void, so winners
        // past their suit length are not quick.
        if let Some(t) = trump {
            let mut cap = remaining;
            if !suit_set(lho_hand, t).is_empty() {
                cap = lho_suit.len();
            }
            if !suit_set(rho_hand, t).is_empty() {
                cap = cap.min(rho_suit.len());
            }
            while my_suit.len() > cap {
                my_suit.remove_index(my_suit.lowest().unwrap());
            }
            while pd_suit.len() > cap {
                pd_suit.remove_index(pd_suit.lowest().unwrap());
            }
        }

        // Count the run of top cards our side owns.
        let mut my_winners = 0;
        let mut pd_winners = 0;
        for card in all_suit.iter() {
            if my_suit.has_index(card) {
                my_winners += 1;
                if my_winners <= my_max_winners {
                    winners.insert_index(card);
                }
            } else if pd_suit.has_index(card) {
                pd_winners += 1;
                if pd_winners <= pd_max_winners {
                    pd_winner_cards.insert_index(card);
                }
            } else {
                break;
            }
        }

        my_tricks +=
            suit_quick_tricks(my_suit, my_winners, pd_suit, pd_winners, &mut pd_entry);
        let mut unused = false;
        pd_tricks +=
            suit_quick_tricks(pd_suit, pd_winners, my_suit, my_winners, &mut unused);
    }

    let side_tricks = if pd_entry {
        winners.insert_all(pd_winner_cards);
        my_tricks.max(pd_tricks)
    } else {
        my_tricks
    };

    (
        (trump_tricks + side_tricks).min(my_hand.len()).min(remaining),
        winners,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_cards::parse_holding;

    fn set(s: &str) -> CardSet {
        parse_holding(s).unwrap()
    }

    fn all(hands: &[CardSet; 4]) -> CardSet {
        hands[0].union(hands[1]).union(hands[2]).union(hands[3])
    }

    #[test]
    fn test_running_suit_counts() {
        // West on lead with AKQ of spades: three quick tricks in NT.
        let hands = [
            set("AKQ/-/-/-"),
            set("-/432/-/-"),
            set("JT9/-/-/-"),
            set("-/-/765/-"),
        ];
        let (tricks, winners) = quick_tricks(&hands, 0, None, all(&hands), 3);
        assert_eq!(tricks, 3);
        assert_eq!(winners, set("AKQ/-/-/-"));
    }

    #[test]
    fn test_blocked_suit() {
        // West's AK sit over East's QJ with no side entry: only West's
        // cards cash.
        let hands = [
            set("AK/-/-/-"),
            set("-/43/-/-"),
            set("QJ/-/-/-"),
            set("-/-/76/-"),
        ];
        let (tricks, _) = quick_tricks(&hands, 0, None, all(&hands), 2);
        assert_eq!(tricks, 2);
    }

    #[test]
    fn test_partner_entry_unlocks_winners() {
        // West's spade ace is an entry to partner; the side cashes
        // partner's hearts for three tricks.
        let hands = [
            set("A2/-/5/-"),
            set("-/6/43/-"),
            set("K/AK/-/-"),
            set("-/-/-/432"),
        ];
        let (tricks, _) = quick_tricks(&hands, 0, None, all(&hands), 3);
        assert_eq!(tricks, 3);
    }

    #[test]
    fn test_opponent_ruff_caps_side_suit() {
        // Clubs are trump; North is void in spades with a trump left, so
        // West's third spade winner is not quick.
        let hands = [
            set("AKQ/-/-/-"),
            set("-/43/-/2"),
            set("JT9/-/-/-"),
            set("-/2/65/-"),
        ];
        let (tricks, _) = quick_tricks(&hands, 0, Some(0), all(&hands), 3);
        assert_eq!(tricks, 0);
    }

    #[test]
    fn test_top_trumps_count() {
        // Spades trump; West holds the top two trumps.
        let hands = [
            set("AK/2/-/-"),
            set("Q32/-/-/-"),
            set("-/43/2/-"),
            set("-/-/43/-"),
        ];
        let (tricks, winners) = quick_tricks(&hands, 0, Some(3), all(&hands), 3);
        assert_eq!(tricks, 2);
        assert!(winners.contains_all(set("AK/-/-/-")));
    }
}
