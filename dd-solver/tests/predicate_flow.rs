//! End-to-end: build a predicate, sample deals from it, feed them to
//! the solver.

use bridge_cards::{CardSet, Direction, Rank, Strain, Suit};
use dd_solver::{BoardQuery, Solver};
use deal_sets::{metric, DealSet, HandSet};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn all_spades() -> CardSet {
    let mut cards = CardSet::new();
    for &rank in &Rank::ALL {
        cards.insert(bridge_cards::Card::new(Suit::Spades, rank));
    }
    cards
}

#[test]
fn test_sampled_solid_trump_deals_are_cold() {
    // North holding all thirteen spades pins the spade contract at 13
    // tricks whatever the other hands look like.
    let north_solid = HandSet::holding(all_spades());
    let set = DealSet::lift(Direction::North, &north_solid);

    let mut rng = StdRng::seed_from_u64(2024);
    let solver = Solver::with_threads(2);
    let spades = Strain::Trump(Suit::Spades);

    let queries: Vec<BoardQuery> = (0..3)
        .map(|_| {
            let deal = set.sample(&mut rng).expect("set is non-empty");
            assert_eq!(deal.hand(Direction::North).suit_length(Suit::Spades), 13);
            BoardQuery {
                deal,
                strain: spades,
                declarer: Direction::North,
            }
        })
        .collect();

    for result in solver.solve_many_deals(&queries) {
        assert_eq!(result, Ok(13));
    }
}

// A full mixed-strength deal takes real search time; run with
// `cargo test -- --ignored` when wanted.
#[test]
#[ignore]
fn test_sampled_deal_trick_counts_are_complementary() {
    let strong = metric::hcp().ge(25);
    let set = DealSet::lift(Direction::North, &strong);
    let mut rng = StdRng::seed_from_u64(7);
    let deal = set.sample(&mut rng).expect("set is non-empty");

    let solver = Solver::new();
    let ns = solver
        .solve_deal(&deal, Strain::NoTrump, Direction::North)
        .unwrap();
    // Same contract, same opening leader, seen from the defence.
    let ew_best = solver
        .solve_many_plays(
            &[dd_solver::PlayQuery {
                remaining: deal.sets(),
                next_to_play: Direction::East,
                strain: Strain::NoTrump,
                trick_so_far: Vec::new(),
            }],
            false,
        )[0]
        .clone()
        .unwrap()
        .iter()
        .map(|s| s.tricks)
        .max()
        .unwrap();
    assert_eq!(ns + ew_best, 13);
}
