//! Shape patterns: suit-length distributions as BDDs.
//!
//! A pattern is the four suit lengths in S-H-D-C order; 560 of them sum
//! to 13. One dynamic program over the card variables yields a BDD per
//! pattern, which backs both the shape language and the ordered-length
//! metrics.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::bdd::{with_store, Bdd};
use crate::error::SpecError;
use crate::handset::HandSet;
use crate::metric::HandMetric;

/// Suit lengths in S-H-D-C order
pub type Pattern = [u8; 4];

static PATTERNS: OnceLock<BTreeMap<Pattern, Bdd>> = OnceLock::new();

/// BDD per 13-card pattern, keyed S-H-D-C.
pub fn pattern_bdds() -> &'static BTreeMap<Pattern, Bdd> {
    PATTERNS.get_or_init(build_pattern_bdds)
}

fn build_pattern_bdds() -> BTreeMap<Pattern, Bdd> {
    with_store(|store| {
        // states[counts] = BDD over the processed (higher) variables with
        // exactly `counts` cards held per suit, S-H-D-C keyed.
        let mut states: FxHashMap<Pattern, Bdd> = FxHashMap::default();
        states.insert([0, 0, 0, 0], Bdd::TRUE);

        for var in (0..52u32).rev() {
            // Card index suit order is C,D,H,S; patterns are S,H,D,C.
            let slot = 3 - (var as usize / 13);

            let mut keys: FxHashSet<Pattern> = states.keys().copied().collect();
            for counts in states.keys() {
                let mut up = *counts;
                up[slot] += 1;
                if up.iter().map(|&x| x as u32).sum::<u32>() <= 13 {
                    keys.insert(up);
                }
            }

            let mut next = FxHashMap::default();
            for counts in keys {
                let hi = if counts[slot] > 0 {
                    let mut down = counts;
                    down[slot] -= 1;
                    states.get(&down).copied().unwrap_or(Bdd::FALSE)
                } else {
                    Bdd::FALSE
                };
                let lo = states.get(&counts).copied().unwrap_or(Bdd::FALSE);
                next.insert(counts, store.mk(var, hi, lo));
            }
            states = next;
        }

        let out: BTreeMap<Pattern, Bdd> = states
            .into_iter()
            .filter(|(counts, _)| counts.iter().map(|&x| x as u32).sum::<u32>() == 13)
            .collect();
        debug_assert_eq!(out.len(), 560);
        log::debug!("built {} shape pattern bdds", out.len());
        out
    })
}

/// One pattern spec position: a fixed length or `x`
type Spec = [Option<u8>; 4];

fn matching_patterns(spec: Spec) -> impl Iterator<Item = Pattern> + 'static {
    pattern_bdds().keys().copied().filter(move |pat| {
        spec.iter()
            .zip(pat.iter())
            .all(|(want, have)| want.map_or(true, |w| w == *have))
    })
}

/// All distinct permutations of a spec's four positions
fn spec_permutations(spec: Spec) -> Vec<Spec> {
    let mut out = Vec::with_capacity(24);
    let mut index = [0usize, 1, 2, 3];

    fn heap(n: usize, index: &mut [usize; 4], spec: &Spec, out: &mut Vec<Spec>) {
        if n == 1 {
            let perm = [
                spec[index[0]],
                spec[index[1]],
                spec[index[2]],
                spec[index[3]],
            ];
            if !out.contains(&perm) {
                out.push(perm);
            }
            return;
        }
        for i in 0..n {
            heap(n - 1, index, spec, out);
            if n % 2 == 0 {
                index.swap(i, n - 1);
            } else {
                index.swap(0, n - 1);
            }
        }
    }

    heap(4, &mut index, &spec, &mut out);
    out
}

#[derive(Debug, PartialEq)]
enum Token {
    Op(char),
    Any,
    Pat(Spec),
}

fn tokenize(spec: &str) -> Result<Vec<(usize, Token)>, SpecError> {
    let bytes = spec.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let c = bytes[pos] as char;
        if c.is_whitespace() {
            pos += 1;
        } else if c == '+' || c == '-' {
            out.push((pos, Token::Op(c)));
            pos += 1;
        } else if spec[pos..].starts_with("any") {
            out.push((pos, Token::Any));
            pos += 3;
        } else if c.is_ascii_digit() || c == 'x' {
            if pos + 4 > bytes.len() {
                return Err(SpecError::BadPattern { pos });
            }
            let mut pat: Spec = [None; 4];
            for (i, slot) in pat.iter_mut().enumerate() {
                let p = bytes[pos + i] as char;
                *slot = match p {
                    'x' => None,
                    '0'..='9' => Some(p as u8 - b'0'),
                    _ => return Err(SpecError::BadPattern { pos }),
                };
            }
            out.push((pos, Token::Pat(pat)));
            pos += 4;
        } else {
            let ch = spec[pos..].chars().next().unwrap_or(c);
            return Err(SpecError::UnexpectedChar { ch, pos });
        }
    }
    Ok(out)
}

/// Parse a shape spec into the set of matching hands.
///
/// `"4432"` is 4 spades, 4 hearts, 3 diamonds, 2 clubs; `"44xx"` leaves
/// the minors free; `"any 4333"` permutes the spec over the suits; `+`
/// and `-` add and remove pattern groups left to right:
/// `"44xx - 4450"` is any 4=4 major hand without 5 diamonds.
pub fn shape_set(spec: &str) -> Result<HandSet, SpecError> {
    let tokens = tokenize(spec)?;
    let mut selected: FxHashSet<Pattern> = FxHashSet::default();

    let mut sign = '+';
    let mut any = false;
    // What the next token may be: a pattern/any at the start or after an
    // operator, an operator after a pattern group.
    let mut expect_pattern = true;

    for (pos, token) in tokens {
        match token {
            Token::Op(op) => {
                if expect_pattern {
                    return Err(SpecError::UnexpectedToken { pos });
                }
                sign = op;
                any = false;
                expect_pattern = true;
            }
            Token::Any => {
                if !expect_pattern || any {
                    return Err(SpecError::UnexpectedToken { pos });
                }
                any = true;
            }
            Token::Pat(pat) => {
                if !expect_pattern {
                    return Err(SpecError::UnexpectedToken { pos });
                }
                let specs = if any {
                    spec_permutations(pat)
                } else {
                    vec![pat]
                };
                for s in specs {
                    for matched in matching_patterns(s) {
                        if sign == '+' {
                            selected.insert(matched);
                        } else {
                            selected.remove(&matched);
                        }
                    }
                }
                any = false;
                expect_pattern = false;
            }
        }
    }
    if expect_pattern {
        return Err(SpecError::UnexpectedEnd);
    }

    let mut out = Bdd::FALSE;
    for pat in &selected {
        out = out | pattern_bdds()[pat];
    }
    Ok(HandSet::new(out))
}

/// Metric of the `place`-th shortest suit length (0 = shortest suit,
/// 3 = longest suit).
pub fn ordered_length(place: usize) -> HandMetric {
    assert!(place < 4, "ordered_length place must be 0..4");
    let mut values: BTreeMap<i32, Bdd> = BTreeMap::new();
    for (pat, &bdd) in pattern_bdds() {
        let mut sorted = *pat;
        sorted.sort_unstable();
        let key = sorted[place] as i32;
        let entry = values.entry(key).or_insert(Bdd::FALSE);
        *entry = *entry | bdd;
    }
    HandMetric::from_values(values)
}

/// Length of the longest suit
pub fn longest() -> HandMetric {
    ordered_length(3)
}

/// Length of the second-longest suit
pub fn second_longest() -> HandMetric {
    ordered_length(2)
}

/// Length of the shortest suit
pub fn shortest() -> HandMetric {
    ordered_length(0)
}
