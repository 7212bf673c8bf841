//! Metrics: partitions of the hand space keyed by an integer score.
//!
//! A metric maps each score to the BDD of assignments achieving it; the
//! maps partition the full space, so comparisons reduce to disjunctions
//! over keys and arithmetic to convolution.

use std::collections::{BTreeMap, BTreeSet};

use bridge_cards::{Card, Rank, Suit};

use crate::bdd::{with_store, Bdd};
use crate::handset::HandSet;

/// A partition of hands by an integer score
#[derive(Clone)]
pub struct HandMetric {
    values: BTreeMap<i32, Bdd>,
}

impl HandMetric {
    pub(crate) fn from_values(values: BTreeMap<i32, Bdd>) -> Self {
        HandMetric { values }
    }

    /// Build from per-card scores by one pass over the card variables.
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = (Card, i32)>,
    {
        let mut by_var: Vec<(u32, i32)> = scores
            .into_iter()
            .filter(|(_, score)| *score != 0)
            .map(|(card, score)| (card.index() as u32, score))
            .collect();
        // Descending variable order so each step stacks a node on top.
        by_var.sort_unstable_by(|a, b| b.0.cmp(&a.0));

        let mut values: BTreeMap<i32, Bdd> = BTreeMap::new();
        values.insert(0, Bdd::TRUE);

        with_store(|store| {
            for (var, score) in by_var {
                let with: BTreeMap<i32, Bdd> =
                    values.iter().map(|(&v, &b)| (v + score, b)).collect();
                let keys: BTreeSet<i32> =
                    with.keys().chain(values.keys()).copied().collect();
                let mut next = BTreeMap::new();
                for key in keys {
                    let hi = with.get(&key).copied().unwrap_or(Bdd::FALSE);
                    let lo = values.get(&key).copied().unwrap_or(Bdd::FALSE);
                    next.insert(key, store.mk(var, hi, lo));
                }
                values = next;
            }
        });

        HandMetric { values }
    }

    /// The scores with a non-empty class
    pub fn scores(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }

    pub(crate) fn value_bdd(&self, score: i32) -> Bdd {
        self.values.get(&score).copied().unwrap_or(Bdd::FALSE)
    }

    /// Hands scoring exactly `n`
    pub fn eq(&self, n: i32) -> HandSet {
        HandSet::new(self.value_bdd(n))
    }

    /// Hands scoring anything but `n`
    pub fn ne(&self, n: i32) -> HandSet {
        HandSet::new(!self.value_bdd(n))
    }

    fn below(&self, n: i32) -> Bdd {
        let mut out = Bdd::FALSE;
        for (_, &bdd) in self.values.range(..n) {
            out = out | bdd;
        }
        out
    }

    pub fn lt(&self, n: i32) -> HandSet {
        HandSet::new(self.below(n))
    }

    pub fn le(&self, n: i32) -> HandSet {
        self.lt(n + 1)
    }

    /// The classes partition the space, so ≥ is the complement of <.
    pub fn ge(&self, n: i32) -> HandSet {
        HandSet::new(!self.below(n))
    }

    pub fn gt(&self, n: i32) -> HandSet {
        self.ge(n + 1)
    }

    fn combine(&self, other: &HandMetric, op: impl Fn(i32, i32) -> i32) -> HandMetric {
        let mut out: BTreeMap<i32, Bdd> = BTreeMap::new();
        for (&k1, &v1) in &self.values {
            for (&k2, &v2) in &other.values {
                let both = v1 & v2;
                if both == Bdd::FALSE {
                    continue;
                }
                let key = op(k1, k2);
                let entry = out.entry(key).or_insert(Bdd::FALSE);
                *entry = *entry | both;
            }
        }
        HandMetric { values: out }
    }

    /// Multiply every score by a constant
    pub fn scale(&self, factor: i32) -> HandMetric {
        let mut out: BTreeMap<i32, Bdd> = BTreeMap::new();
        for (&k, &v) in &self.values {
            let entry = out.entry(k * factor).or_insert(Bdd::FALSE);
            *entry = *entry | v;
        }
        HandMetric { values: out }
    }
}

impl<'a, 'b> std::ops::Add<&'b HandMetric> for &'a HandMetric {
    type Output = HandMetric;

    fn add(self, other: &'b HandMetric) -> HandMetric {
        self.combine(other, |a, b| a + b)
    }
}

impl<'a, 'b> std::ops::Sub<&'b HandMetric> for &'a HandMetric {
    type Output = HandMetric;

    fn sub(self, other: &'b HandMetric) -> HandMetric {
        self.combine(other, |a, b| a - b)
    }
}

fn deck() -> impl Iterator<Item = Card> {
    (0..52).map(|i| Card::from_index(i).unwrap())
}

/// Number of cards held (13 for every real hand)
pub fn card_count() -> HandMetric {
    HandMetric::from_scores(deck().map(|c| (c, 1)))
}

/// Length of one suit
pub fn suit_length(suit: Suit) -> HandMetric {
    HandMetric::from_scores(
        Rank::ALL.iter().map(move |&r| (Card::new(suit, r), 1)),
    )
}

/// High card points: A=4, K=3, Q=2, J=1
pub fn hcp() -> HandMetric {
    HandMetric::from_scores(deck().map(|c| (c, c.hcp() as i32)))
}

/// High card points within one suit
pub fn suit_hcp(suit: Suit) -> HandMetric {
    HandMetric::from_scores(
        Rank::ALL
            .iter()
            .map(move |&r| (Card::new(suit, r), r.hcp() as i32)),
    )
}

/// Royal points: A=3, K=2, Q=1
pub fn royal_points() -> HandMetric {
    HandMetric::from_scores(deck().map(|c| {
        let score = match c.rank {
            Rank::Ace => 3,
            Rank::King => 2,
            Rank::Queen => 1,
            _ => 0,
        };
        (c, score)
    }))
}

/// Controls: A=2, K=1
pub fn controls() -> HandMetric {
    HandMetric::from_scores(deck().map(|c| {
        let score = match c.rank {
            Rank::Ace => 2,
            Rank::King => 1,
            _ => 0,
        };
        (c, score)
    }))
}

/// Number of cards of one rank across the suits
pub fn rank_count(rank: Rank) -> HandMetric {
    HandMetric::from_scores(Suit::ALL.iter().map(move |&s| (Card::new(s, rank), 1)))
}

pub fn aces() -> HandMetric {
    rank_count(Rank::Ace)
}

pub fn kings() -> HandMetric {
    rank_count(Rank::King)
}

pub fn queens() -> HandMetric {
    rank_count(Rank::Queen)
}

pub fn jacks() -> HandMetric {
    rank_count(Rank::Jack)
}

pub fn tens() -> HandMetric {
    rank_count(Rank::Ten)
}

/// Number of cards among the top `n` ranks (n in 1..=5: A, AK, AKQ, ...)
pub fn top_cards(n: u8) -> HandMetric {
    assert!((1..=5).contains(&n), "top_cards takes 1..=5");
    let floor = 14 - n;
    HandMetric::from_scores(
        deck().filter(move |c| c.rank as u8 >= floor).map(|c| (c, 1)),
    )
}

/// Quick tricks doubled to stay integral:
/// AK=4, AQ=3, A or KQ=2, Kx=1, stiff K or less=0, summed over suits.
pub fn quick_tricks_x2() -> HandMetric {
    let mut out: Option<HandMetric> = None;
    for &suit in &Suit::ALL {
        let values = suit_quick_values(suit);
        let metric = HandMetric::from_values(values);
        out = Some(match out {
            None => metric,
            Some(acc) => &acc + &metric,
        });
    }
    out.unwrap()
}

fn suit_quick_values(suit: Suit) -> BTreeMap<i32, Bdd> {
    let var = |rank: Rank| Bdd::var(Card::new(suit, rank).index() as u32);
    let a = var(Rank::Ace);
    let k = var(Rank::King);
    let q = var(Rank::Queen);
    // Any card below the queen counts as cover for the king.
    let mut x = Bdd::FALSE;
    for &rank in &Rank::ALL[..Rank::Queen.index() as usize] {
        x = x | var(rank);
    }

    let mut values = BTreeMap::new();
    values.insert(4, a & k);
    values.insert(3, a & !k & q);
    values.insert(2, (a & !k & !q) | (!a & k & q));
    values.insert(1, !a & k & !q & x);
    values.insert(0, !a & k.ite(!q & !x, Bdd::TRUE));
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_cards::Hand;

    fn hand(s: &str) -> Hand {
        Hand::parse(s).unwrap()
    }

    #[test]
    fn test_hcp_classes() {
        let metric = hcp();
        let h = hand("AKQJT/5432/Q2/52");
        assert!(metric.eq(12).contains(&h));
        assert!(metric.ge(12).contains(&h));
        assert!(metric.le(12).contains(&h));
        assert!(!metric.ge(13).contains(&h));
        assert!(!metric.lt(12).contains(&h));
        assert!(metric.ne(11).contains(&h));
    }

    #[test]
    fn test_suit_length_classes() {
        let metric = suit_length(Suit::Spades);
        let h = hand("AKQJT/5432/Q2/52");
        assert!(metric.eq(5).contains(&h));
        assert!(metric.ge(5).contains(&h));
        assert!(!metric.ge(6).contains(&h));
    }

    #[test]
    fn test_partition_covers_space() {
        // The classes of a metric are disjoint and cover everything.
        let metric = controls();
        let mut union = Bdd::FALSE;
        for score in metric.scores().collect::<Vec<_>>() {
            let class = metric.value_bdd(score);
            assert_eq!(union & class, Bdd::FALSE);
            union = union | class;
        }
        assert_eq!(union, Bdd::TRUE);
    }

    #[test]
    fn test_convolution_identity() {
        // (A + B) == k  iff  some split i + j = k matches both.
        let a = hcp();
        let b = suit_hcp(Suit::Spades);
        let sum = &a + &b;
        for k in [0, 7, 15] {
            let mut split = HandSet::none();
            for i in 0..=k {
                split = split | (a.eq(i) & b.eq(k - i));
            }
            assert_eq!(sum.eq(k), split);
        }
    }

    #[test]
    fn test_metric_difference() {
        // Off-spade HCP as a difference of metrics.
        let off = &hcp() - &suit_hcp(Suit::Spades);
        let h = hand("AKQJT/5432/Q2/52");
        // 12 HCP total, 10 in spades.
        assert!(off.eq(2).contains(&h));
        assert!((&hcp() - &hcp()).eq(0).contains(&h));
    }

    #[test]
    fn test_quick_tricks() {
        let qt = quick_tricks_x2();
        // AK spades (2.0) + KQ hearts (1.0) + A diamonds (1.0) + Kx clubs (0.5)
        let h = hand("AK432/KQ32/A2/K2");
        assert!(qt.eq(9).contains(&h));
        // Stiff kings score nothing.
        let stiff = hand("K5432/5432/543/2");
        assert!(qt.eq(1).contains(&stiff));
        let nothing = hand("Q5432/5432/543/2");
        assert!(qt.eq(0).contains(&nothing));
    }

    #[test]
    fn test_top_cards() {
        let top2 = top_cards(2);
        let h = hand("AK432/KQ32/A2/K2");
        // Aces and kings: AK + K + A + K = 6.
        assert!(top2.eq(6).contains(&h));
        assert!(aces().eq(2).contains(&h));
        assert!(kings().eq(3).contains(&h));
        assert!(queens().eq(1).contains(&h));
    }
}
