//! Sets of full deals as BDDs over 104 owner-bit variables.
//!
//! Card `i` owns variables `2i` and `2i+1`; the owner of the card is
//! `2 * bit(2i+1) + bit(2i)` in W=0, N=1, E=2, S=3 order. Every DealSet
//! is intersected with the "four hands of thirteen" BDD.

use std::sync::OnceLock;

use bridge_cards::{Card, CardSet, Deal, Direction};
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::bdd::{with_store, Bdd, BddStore, DEAL_VARS};
use crate::handset::HandSet;

static FOUR_HANDS: OnceLock<Bdd> = OnceLock::new();

/// The BDD of owner assignments giving each direction exactly 13 cards.
pub(crate) fn four_hands_mask() -> Bdd {
    *FOUR_HANDS.get_or_init(|| {
        with_store(|store| {
            // states[counts] = BDD over the processed (higher) cards'
            // owner bits with exactly `counts` cards per direction.
            let mut states: FxHashMap<[u8; 4], Bdd> = FxHashMap::default();
            states.insert([0, 0, 0, 0], Bdd::TRUE);

            for card in (0..52u32).rev() {
                let lo_var = 2 * card;
                let hi_var = 2 * card + 1;

                let mut keys: FxHashMap<[u8; 4], ()> = FxHashMap::default();
                for counts in states.keys() {
                    for owner in 0..4 {
                        let mut up = *counts;
                        if up[owner] < 13 {
                            up[owner] += 1;
                            keys.insert(up, ());
                        }
                    }
                }

                let mut next = FxHashMap::default();
                for (counts, _) in keys {
                    let sub = |owner: usize| -> Bdd {
                        if counts[owner] == 0 {
                            return Bdd::FALSE;
                        }
                        let mut down = counts;
                        down[owner] -= 1;
                        states.get(&down).copied().unwrap_or(Bdd::FALSE)
                    };
                    // Low bit set: owner is N (hi clear) or S (hi set).
                    let on = store.mk(hi_var, sub(3), sub(1));
                    // Low bit clear: owner is W (hi clear) or E (hi set).
                    let off = store.mk(hi_var, sub(2), sub(0));
                    next.insert(counts, store.mk(lo_var, on, off));
                }
                states = next;
            }

            let out = states[&[13, 13, 13, 13]];
            log::debug!("four-hands mask built, {} nodes", store.size(out));
            out
        })
    })
}

/// A set of full deals
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DealSet {
    bdd: Bdd,
}

impl DealSet {
    /// Wrap a raw owner-bit predicate; the deal constraint is
    /// intersected in.
    pub fn new(bdd: Bdd) -> Self {
        DealSet {
            bdd: bdd & four_hands_mask(),
        }
    }

    /// Every deal
    pub fn all() -> Self {
        DealSet {
            bdd: four_hands_mask(),
        }
    }

    pub fn none() -> Self {
        DealSet { bdd: Bdd::FALSE }
    }

    /// Constrain one direction's hand to a HandSet. The hand predicate
    /// is walked once; each card variable becomes a two-bit owner test.
    pub fn lift(dir: Direction, hands: &HandSet) -> Self {
        let player = dir.index();
        let lifted = with_store(|store| {
            let mut memo: FxHashMap<Bdd, Bdd> = FxHashMap::default();
            lift_walk(store, hands.bdd(), player, &mut memo)
        });
        DealSet::new(lifted)
    }

    pub fn bdd(&self) -> Bdd {
        self.bdd
    }

    /// Number of deals in the set
    pub fn count(&self) -> u128 {
        self.bdd.count(DEAL_VARS)
    }

    pub fn is_empty(&self) -> bool {
        self.bdd == Bdd::FALSE
    }

    /// Draw a deal uniformly; `None` when the set is empty
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Deal> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        let k = rng.gen_range(0..total);
        let model = self.bdd.nth_model(k, DEAL_VARS);

        let mut sets = [CardSet::new(); 4];
        let mut bits = [false; DEAL_VARS as usize];
        for var in model {
            bits[var as usize] = true;
        }
        for card in 0..52usize {
            let owner = 2 * bits[2 * card + 1] as usize + bits[2 * card] as usize;
            sets[owner].insert_index(card);
        }
        Some(Deal::from_sets(sets).expect("deal mask guarantees four 13-card hands"))
    }

    /// Membership test
    pub fn contains(&self, deal: &Deal) -> bool {
        self.bdd.eval(|var| {
            let card = Card::from_index((var / 2) as u8).unwrap();
            let owner = deal.owner(card).index();
            if var % 2 == 1 {
                owner & 2 != 0
            } else {
                owner & 1 != 0
            }
        })
    }
}

fn lift_walk(
    store: &mut BddStore,
    f: Bdd,
    player: usize,
    memo: &mut FxHashMap<Bdd, Bdd>,
) -> Bdd {
    let (var, hi, lo) = match store.expand(f) {
        None => return f,
        Some(parts) => parts,
    };
    if let Some(&out) = memo.get(&f) {
        return out;
    }

    let avec = lift_walk(store, hi, player, memo);
    let sans = lift_walk(store, lo, player, memo);

    let lo_var = 2 * var;
    let hi_var = 2 * var + 1;

    // The held branch applies exactly when both owner bits match the
    // player; every other owner takes the not-held branch.
    let inner = if player & 2 != 0 {
        store.mk(hi_var, avec, sans)
    } else {
        store.mk(hi_var, sans, avec)
    };
    let out = if player & 1 != 0 {
        store.mk(lo_var, inner, sans)
    } else {
        store.mk(lo_var, sans, inner)
    };

    memo.insert(f, out);
    out
}

impl std::ops::BitAnd for DealSet {
    type Output = DealSet;

    fn bitand(self, other: DealSet) -> DealSet {
        DealSet {
            bdd: self.bdd & other.bdd,
        }
    }
}

impl std::ops::BitOr for DealSet {
    type Output = DealSet;

    fn bitor(self, other: DealSet) -> DealSet {
        DealSet {
            bdd: self.bdd | other.bdd,
        }
    }
}

impl std::ops::BitXor for DealSet {
    type Output = DealSet;

    fn bitxor(self, other: DealSet) -> DealSet {
        DealSet {
            bdd: self.bdd ^ other.bdd,
        }
    }
}

impl std::ops::Sub for DealSet {
    type Output = DealSet;

    fn sub(self, other: DealSet) -> DealSet {
        DealSet {
            bdd: self.bdd - other.bdd,
        }
    }
}

impl std::ops::Not for DealSet {
    type Output = DealSet;

    fn not(self) -> DealSet {
        DealSet::new(!self.bdd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric;
    use bridge_cards::Suit;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_total_deal_count() {
        // 52! / (13!)^4
        let expect: u128 = 53_644_737_765_488_792_839_237_440_000;
        assert_eq!(DealSet::all().count(), expect);
    }

    #[test]
    fn test_lift_and_sample() {
        let north_strong = metric::hcp().ge(20);
        let set = DealSet::lift(Direction::North, &north_strong);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let deal = set.sample(&mut rng).unwrap();
            assert!(deal.hand(Direction::North).hcp() >= 20);
        }
    }

    #[test]
    fn test_lift_contains_matches_hand_predicate() {
        let deal = Deal::parse(
            "AQJ/432/32/AT876",
            "K32/KQJ/AKQ/Q432",
            "T98/T987/J98765/-",
            "7654/A65/T4/KJ95",
        )
        .unwrap();

        // North holds 20 HCP and West 3 spades.
        let n20 = DealSet::lift(Direction::North, &metric::hcp().eq(20));
        assert!(n20.contains(&deal));
        let n21 = DealSet::lift(Direction::North, &metric::hcp().eq(21));
        assert!(!n21.contains(&deal));

        let w_spades = DealSet::lift(
            Direction::West,
            &metric::suit_length(Suit::Spades).eq(3),
        );
        assert!(w_spades.contains(&deal));
    }

    #[test]
    fn test_two_direction_intersection() {
        let set = DealSet::lift(Direction::North, &metric::hcp().ge(15))
            & DealSet::lift(Direction::South, &metric::suit_length(Suit::Hearts).ge(5));
        let mut rng = StdRng::seed_from_u64(3);
        let deal = set.sample(&mut rng).unwrap();
        assert!(deal.hand(Direction::North).hcp() >= 15);
        assert!(deal.hand(Direction::South).suit_length(Suit::Hearts) >= 5);
    }

    #[test]
    fn test_lift_count_symmetry() {
        // The same predicate lifted to different seats covers equally
        // many deals.
        let pred = metric::suit_length(Suit::Spades).ge(6);
        let n = DealSet::lift(Direction::North, &pred).count();
        let e = DealSet::lift(Direction::East, &pred).count();
        assert_eq!(n, e);
    }
}
