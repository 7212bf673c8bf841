//! Sets of 13-card hands as BDDs over the 52 card variables.

use std::sync::OnceLock;

use bridge_cards::{Card, CardSet, Hand, Rank, Suit};
use rand::Rng;

use crate::bdd::{Bdd, HAND_VARS};
use crate::error::SpecError;
use crate::metric;

static HAND_MASK: OnceLock<Bdd> = OnceLock::new();

/// The BDD of assignments with exactly 13 of the 52 card variables set.
pub(crate) fn hand_mask() -> Bdd {
    *HAND_MASK.get_or_init(|| metric::card_count().value_bdd(13))
}

/// A set of hands: a BDD intersected with the 13-card mask
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct HandSet {
    bdd: Bdd,
}

impl HandSet {
    /// Wrap a raw predicate; the 13-card constraint is intersected in.
    pub fn new(bdd: Bdd) -> Self {
        HandSet {
            bdd: bdd & hand_mask(),
        }
    }

    /// Every 13-card hand
    pub fn all() -> Self {
        HandSet { bdd: hand_mask() }
    }

    /// The empty set
    pub fn none() -> Self {
        HandSet { bdd: Bdd::FALSE }
    }

    /// Hands holding one given card
    pub fn card(card: Card) -> Self {
        HandSet::new(Bdd::var(card.index() as u32))
    }

    /// Hands holding every card of a set
    pub fn holding(cards: CardSet) -> Self {
        let mut out = Bdd::TRUE;
        for index in cards.iter_ascending() {
            out = out & Bdd::var(index as u32);
        }
        HandSet::new(out)
    }

    /// Hands whose `suit` holding is at least as good as one of the
    /// templates. A template lists ranks high to low with `x` for any
    /// card: `"Qxx"` is three-plus cards headed by the queen or better.
    /// The holding's i-th highest card must be at least the template's
    /// i-th rank, which is the same as holding at least `i+1` cards of
    /// rank `t_i` or higher for every position.
    pub fn at_least(suit: Suit, templates: &[&str]) -> Result<Self, SpecError> {
        let mut out = HandSet::none();
        for template in templates {
            out = out | Self::at_least_one(suit, template)?;
        }
        Ok(out)
    }

    fn at_least_one(suit: Suit, template: &str) -> Result<Self, SpecError> {
        // Sort strongest first so the counting characterisation applies.
        let mut ranks: Vec<Option<Rank>> = template
            .chars()
            .map(|c| {
                if c == 'x' || c == 'X' {
                    Ok(None)
                } else {
                    Rank::from_char(c).map(Some).ok_or(SpecError::BadTemplate(c))
                }
            })
            .collect::<Result<_, _>>()?;
        ranks.sort_by_key(|r| std::cmp::Reverse(r.map(|r| r as u8).unwrap_or(0)));

        let mut out = HandSet::all();
        for (i, rank) in ranks.iter().enumerate() {
            let need = (i + 1) as i32;
            let have = match rank {
                Some(rank) => metric::HandMetric::from_scores(
                    Rank::ALL
                        .iter()
                        .filter(|&&r| r >= *rank)
                        .map(|&r| (Card::new(suit, r), 1)),
                ),
                None => metric::suit_length(suit),
            };
            out = out & have.ge(need);
        }
        Ok(out)
    }

    /// The underlying BDD handle
    pub fn bdd(&self) -> Bdd {
        self.bdd
    }

    /// Number of hands in the set
    pub fn count(&self) -> u128 {
        self.bdd.count(HAND_VARS)
    }

    pub fn is_empty(&self) -> bool {
        self.bdd == Bdd::FALSE
    }

    /// Draw a hand uniformly; `None` when the set is empty
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Hand> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        let k = rng.gen_range(0..total);
        let mut cards = CardSet::new();
        for var in self.bdd.nth_model(k, HAND_VARS) {
            cards.insert_index(var as usize);
        }
        Some(Hand::from_cards(cards).expect("hand mask guarantees 13 cards"))
    }

    /// Membership test by walking the BDD along the hand's assignment
    pub fn contains(&self, hand: &Hand) -> bool {
        let cards = hand.cards();
        self.bdd.eval(|var| cards.has_index(var as usize))
    }
}

impl std::ops::BitAnd for HandSet {
    type Output = HandSet;

    fn bitand(self, other: HandSet) -> HandSet {
        HandSet {
            bdd: self.bdd & other.bdd,
        }
    }
}

impl std::ops::BitOr for HandSet {
    type Output = HandSet;

    fn bitor(self, other: HandSet) -> HandSet {
        HandSet {
            bdd: self.bdd | other.bdd,
        }
    }
}

impl std::ops::BitXor for HandSet {
    type Output = HandSet;

    fn bitxor(self, other: HandSet) -> HandSet {
        HandSet {
            bdd: self.bdd ^ other.bdd,
        }
    }
}

impl std::ops::Sub for HandSet {
    type Output = HandSet;

    fn sub(self, other: HandSet) -> HandSet {
        HandSet {
            bdd: self.bdd - other.bdd,
        }
    }
}

impl std::ops::Not for HandSet {
    type Output = HandSet;

    fn not(self) -> HandSet {
        // Complement within the hand space, not the raw boolean space.
        HandSet::new(!self.bdd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hand(s: &str) -> Hand {
        Hand::parse(s).unwrap()
    }

    #[test]
    fn test_all_and_none() {
        // 52 choose 13 hands in total.
        assert_eq!(HandSet::all().count(), 635_013_559_600);
        assert_eq!(HandSet::none().count(), 0);
        assert!(HandSet::none().sample(&mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn test_card_predicate() {
        let sk = Card::parse("SK").unwrap();
        let set = HandSet::card(sk);
        assert!(set.contains(&hand("AKQJT/5432/Q2/52")));
        assert!(!set.contains(&hand("AQJT9/5432/Q2/52")));
        // Hands holding one fixed card: 51 choose 12.
        assert_eq!(set.count(), 158_753_389_900);
    }

    #[test]
    fn test_predicate_round_trip() {
        let spades5 = metric::suit_length(Suit::Spades).ge(5);
        let hcp12 = metric::hcp().ge(12);
        let set = spades5 & hcp12;

        assert!(set.contains(&hand("AKQJT/5432/Q2/52")));
        // Only four spades.
        assert!(!set.contains(&hand("AKQJ/T5432/Q2/52")));
        // Only 10 HCP.
        assert!(!set.contains(&hand("AKQJT/5432/42/52")));
    }

    #[test]
    fn test_sampling_respects_predicate() {
        let set = metric::suit_length(Suit::Spades).ge(5) & metric::hcp().ge(12);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let h = set.sample(&mut rng).unwrap();
            assert!(h.suit_length(Suit::Spades) >= 5);
            assert!(h.hcp() >= 12);
        }
    }

    #[test]
    fn test_sampling_uniformity() {
        // Fix 11 cards; the remaining two come from the six low hearts,
        // so the set has exactly 15 hands.
        let fixed = hand("AKQJT98765432/-/-/-").cards();
        let mut eleven = CardSet::new();
        for index in fixed.iter().take(11) {
            eleven.insert_index(index);
        }
        let pool: Vec<Card> = (2u8..8)
            .map(|v| Card::new(Suit::Hearts, Rank::from_value(v).unwrap()))
            .collect();
        let mut allowed = HandSet::holding(eleven);
        // Restrict the two free slots to the pool.
        for card in (0..52).map(|i| Card::from_index(i).unwrap()) {
            if !eleven.has(card) && !pool.contains(&card) {
                allowed = allowed - HandSet::card(card);
            }
        }
        assert_eq!(allowed.count(), 15);

        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = std::collections::HashMap::new();
        let draws = 3000;
        for _ in 0..draws {
            let h = allowed.sample(&mut rng).unwrap();
            *counts.entry(h.to_string()).or_insert(0usize) += 1;
        }
        assert_eq!(counts.len(), 15);
        let expect = draws / 15;
        for (_, n) in counts {
            // Loose binomial bounds; far outside them means bias.
            assert!(n > expect / 2 && n < expect * 2);
        }
    }

    #[test]
    fn test_at_least_templates() {
        let h = hand("A763/K492/J72/Q3");
        assert!(HandSet::at_least(Suit::Spades, &["Kx"]).unwrap().contains(&h));
        assert!(!HandSet::at_least(Suit::Clubs, &["Kx"]).unwrap().contains(&h));
        assert!(HandSet::at_least(Suit::Diamonds, &["Jxx"]).unwrap().contains(&h));
        assert!(HandSet::at_least(Suit::Diamonds, &["Kx", "Jxx"])
            .unwrap()
            .contains(&h));
        // KT3 is as good as K92 but not as good as KJ2.
        let kt3 = hand("KT3/5432/543/432");
        assert!(HandSet::at_least(Suit::Spades, &["K92"]).unwrap().contains(&kt3));
        assert!(!HandSet::at_least(Suit::Spades, &["KJ2"]).unwrap().contains(&kt3));
        assert!(matches!(
            HandSet::at_least(Suit::Spades, &["K?x"]),
            Err(SpecError::BadTemplate('?'))
        ));
    }

    #[test]
    fn test_complement_stays_in_hand_space() {
        let set = metric::hcp().ge(20);
        let other = !set;
        assert_eq!(set.count() + other.count(), HandSet::all().count());
        assert_eq!(set & other, HandSet::none());
    }
}
