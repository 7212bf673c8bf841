//! Solver test suite: exact values on constructed endings, invariant
//! checks between the entry points, and full-deal cases.

use bridge_cards::{parse_holding, Card, CardSet, Deal, Direction, Strain};

use crate::later::later_tricks_opponent;
use crate::quick::quick_tricks;
use crate::search::{solve_ns_tricks, PartialTrick, Position};
use crate::solve::{BoardQuery, PlayQuery, Solver};
use crate::table::Tables;

fn set(s: &str) -> CardSet {
    parse_holding(s).unwrap()
}

fn card(s: &str) -> Card {
    Card::parse(s).unwrap()
}

/// Position from W, N, E, S holdings with nothing played to the trick
fn position(hands: [&str; 4], trump: Option<usize>, leader: usize) -> Position {
    Position {
        hands: [set(hands[0]), set(hands[1]), set(hands[2]), set(hands[3])],
        trump,
        leader,
        partial: PartialTrick::default(),
    }
}

fn ns_tricks(pos: &Position) -> u8 {
    let mut tables = Tables::new();
    solve_ns_tricks(pos, &mut tables).0
}

const SPADES: Option<usize> = Some(3);

#[test]
fn test_one_trick_ace_wins() {
    // North's ace takes the only trick whoever leads.
    let pos = position(["3/-/-/-", "A/-/-/-", "K/-/-/-", "2/-/-/-"], None, 0);
    assert_eq!(ns_tricks(&pos), 1);

    let pos = position(["A/-/-/-", "K/-/-/-", "3/-/-/-", "2/-/-/-"], None, 0);
    assert_eq!(ns_tricks(&pos), 0);
}

#[test]
fn test_two_tricks_both_aces() {
    let pos = position(
        ["3/3/-/-", "A/A/-/-", "K/K/-/-", "2/2/-/-"],
        None,
        0,
    );
    assert_eq!(ns_tricks(&pos), 2);
}

#[test]
fn test_four_aces_four_tricks() {
    let pos = position(
        ["3/3/3/3", "A/A/A/A", "K/K/K/K", "2/2/2/2"],
        None,
        0,
    );
    assert_eq!(ns_tricks(&pos), 4);
}

#[test]
fn test_finesse_depends_on_the_king_side() {
    // South leads toward North's AQ. With the king in front of the
    // tenace the queen scores; behind it, the king always comes to a
    // trick.
    let onside = position(["K4/4/-/-", "AQ/5/-/-", "76/6/-/-", "32/7/-/-"], None, 3);
    assert_eq!(ns_tricks(&onside), 3);

    let offside = position(["74/4/-/-", "AQ/5/-/-", "K6/6/-/-", "32/7/-/-"], None, 3);
    assert_eq!(ns_tricks(&offside), 2);
}

#[test]
fn test_ruff_beats_plain_winner() {
    // Spades trump: North ruffs the diamond ace and cashes a heart.
    let pos = position(["-/3/A/-", "A/A/-/-", "-/K/K/-", "2/2/-/-"], SPADES, 0);
    assert_eq!(ns_tricks(&pos), 2);
}

#[test]
fn test_trump_control_splits_the_tricks() {
    // West's top hearts against North's lone trump: the ruff takes one
    // trick, the other heart honour takes the other.
    let pos = position(["-/AK/-/-", "2/3/-/-", "-/54/-/-", "-/-/32/-"], SPADES, 0);
    assert_eq!(ns_tricks(&pos), 1);
}

#[test]
fn test_mid_trick_partial() {
    // West has led the spade three; North wins the ace and cashes the
    // heart ace.
    let pos = Position {
        hands: [
            set("-/3/-/-"),
            set("A/A/-/-"),
            set("K/K/-/-"),
            set("2/2/-/-"),
        ],
        trump: None,
        leader: 0,
        partial: PartialTrick {
            plays: vec![(0, card("S3").index() as usize)],
        },
    };
    assert_eq!(ns_tricks(&pos), 2);
}

#[test]
fn test_transposition_reuse_is_consistent() {
    let pos = position(
        ["K4/43/-/-", "AQ/52/-/-", "76/76/-/-", "32/98/-/-"],
        None,
        3,
    );
    let mut tables = Tables::new();
    let first = solve_ns_tricks(&pos, &mut tables).0;
    let second = solve_ns_tricks(&pos, &mut tables).0;
    assert_eq!(first, second);
}

#[test]
fn test_bound_estimators_bracket_exact_value() {
    let positions = [
        position(["K4/4/-/-", "AQ/5/-/-", "76/6/-/-", "32/7/-/-"], None, 3),
        position(["3/3/3/3", "A/A/A/A", "K/K/K/K", "2/2/2/2"], None, 0),
        position(["-/AK/-/-", "2/3/-/-", "-/54/-/-", "-/-/32/-"], SPADES, 0),
    ];
    for pos in &positions {
        let all = pos.hands[0]
            .union(pos.hands[1])
            .union(pos.hands[2])
            .union(pos.hands[3]);
        let remaining = pos.num_tricks();
        let exact = ns_tricks(pos) as usize;
        let mover = pos.leader;

        let (quick, _) = quick_tricks(&pos.hands, mover, pos.trump, all, remaining);
        let (later, _) = later_tricks_opponent(&pos.hands, mover, pos.trump, all, remaining);
        let mover_exact = if mover & 1 == 1 {
            exact
        } else {
            remaining - exact
        };
        assert!(quick <= mover_exact, "quick {} > exact {}", quick, mover_exact);
        assert!(
            mover_exact <= remaining - later,
            "exact {} above cap {}",
            mover_exact,
            remaining - later
        );
    }
}

#[test]
fn test_solve_many_plays_covers_legal_cards() {
    // Two-trick ending, North to move on a spade lead: North must
    // follow with the ace, winning both tricks.
    let solver = Solver::with_threads(2);
    let query = PlayQuery::parse(
        ["-/3/-/-", "A/A/-/-", "K/K/-/-", "2/2/-/-"],
        'N',
        'N',
        "S3",
    )
    .unwrap();
    let scores = solver.solve_many_plays(&[query], false)[0].clone().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].card, card("SA"));
    assert_eq!(scores[0].tricks, 2);
}

#[test]
fn test_solve_many_plays_max_matches_position_solve() {
    // Three-trick ending with a real choice for the leader.
    let hands = ["K4/4/-/-", "AQ/5/-/-", "76/6/-/-", "32/7/-/-"];
    let query = PlayQuery::parse(hands, 'S', 'N', "").unwrap();
    let solver = Solver::with_threads(2);
    let scores = solver.solve_many_plays(&[query], true)[0].clone().unwrap();

    // Every one of South's three cards is reported.
    assert_eq!(scores.len(), 3);
    let best = scores.iter().map(|s| s.tricks).max().unwrap();
    assert_eq!(best as u8, ns_tricks(&position(hands, None, 3)));
    // Win-rank tags are present when asked for.
    assert!(scores.iter().all(|s| s.win_ranks.is_some()));
}

#[test]
fn test_solve_many_plays_equivalents_share_scores() {
    // North's KQJ are one equivalence class; all score alike.
    let query = PlayQuery::parse(
        ["A2/4/-/-", "KQJ/-/-/-", "53/6/-/-", "-/75/2/-"],
        'N',
        'N',
        "",
    )
    .unwrap();
    let solver = Solver::with_threads(1);
    let scores = solver.solve_many_plays(&[query], false)[0].clone().unwrap();
    assert_eq!(scores.len(), 3);
    let kqj: Vec<u8> = scores
        .iter()
        .filter(|s| ["SK", "SQ", "SJ"].contains(&s.card.to_string().as_str()))
        .map(|s| s.tricks)
        .collect();
    assert_eq!(kqj.len(), 3);
    assert!(kqj.windows(2).all(|w| w[0] == w[1]));
}

fn cold_deal() -> Deal {
    // Each hand one full suit: with spades trump, North is cold for 13.
    Deal::parse(
        "-/-/-/AKQJT98765432",
        "AKQJT98765432/-/-/-",
        "-/AKQJT98765432/-/-",
        "-/-/AKQJT98765432/-",
    )
    .unwrap()
}

#[test]
fn test_cold_grand_slam() {
    let solver = Solver::with_threads(1);
    let deal = cold_deal();
    assert_eq!(
        solver
            .solve_deal(&deal, Strain::Trump(bridge_cards::Suit::Spades), Direction::North)
            .unwrap(),
        13
    );
    // The defenders' view of the same contract.
    assert_eq!(
        solver
            .solve_deal(&deal, Strain::Trump(bridge_cards::Suit::Spades), Direction::East)
            .unwrap(),
        0
    );
}

#[test]
fn test_batch_results_in_request_order() {
    let deal = cold_deal();
    let spades = Strain::Trump(bridge_cards::Suit::Spades);
    let queries = vec![
        BoardQuery {
            deal,
            strain: spades,
            declarer: Direction::North,
        },
        BoardQuery {
            deal,
            strain: spades,
            declarer: Direction::East,
        },
        BoardQuery {
            deal,
            strain: spades,
            declarer: Direction::South,
        },
    ];
    let solver = Solver::with_threads(2);
    let results = solver.solve_many_deals(&queries);
    assert_eq!(results[0], Ok(13));
    assert_eq!(results[1], Ok(0));
    assert_eq!(results[2], Ok(13));
}

#[test]
fn test_analyze_play_scores_each_position() {
    let deal = cold_deal();
    let solver = Solver::with_threads(1);
    // East leads the heart ace; South, void in hearts, discards a
    // diamond. North's solid trumps win everything either way.
    let scores = solver
        .analyze_play(
            &deal,
            Strain::Trump(bridge_cards::Suit::Spades),
            Direction::North,
            "HAD2",
        )
        .unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].index, 0);
    assert_eq!(scores[0].card, card("HA"));
    // East on lead takes nothing against the solid trump hand.
    assert_eq!(scores[0].tricks, 0);
    // South's side still takes all thirteen from its seat.
    assert_eq!(scores[1].card, card("D2"));
    assert_eq!(scores[1].tricks, 13);
}

#[test]
fn test_analyze_play_rejects_illegal_history() {
    let deal = cold_deal();
    let solver = Solver::with_threads(1);
    let result = solver.analyze_play(
        &deal,
        Strain::Trump(bridge_cards::Suit::Spades),
        Direction::North,
        "SA",
    );
    // East cannot lead a spade out of North's hand.
    assert!(matches!(result, Err(crate::SolveError::NotHeld { .. })));
}

// The 28-point deal below makes twelve tricks in notrump for North.
// Full 13-card searches are slow without optimisation; run with
// `cargo test -- --ignored` when needed.
#[test]
#[ignore]
fn test_notrump_small_slam() {
    let deal = Deal::parse(
        "AQJ/432/32/AT876",
        "K32/KQJ/AKQ/Q432",
        "T98/T987/J98765/-",
        "7654/A65/T4/KJ95",
    )
    .unwrap();
    let solver = Solver::with_threads(1);
    let tricks = solver
        .solve_deal(&deal, Strain::NoTrump, Direction::North)
        .unwrap();
    assert_eq!(tricks, 12);
}

#[test]
#[ignore]
fn test_opening_lead_analysis_matches_board_solve() {
    let deal = Deal::parse(
        "AQJ/432/32/AT876",
        "K32/KQJ/AKQ/Q432",
        "T98/T987/J98765/-",
        "7654/A65/T4/KJ95",
    )
    .unwrap();
    let solver = Solver::new();

    let sets = deal.sets();
    let hand_strings: Vec<String> =
        sets.iter().map(|s| bridge_cards::holding_string(*s)).collect();
    let query = PlayQuery::parse(
        [
            hand_strings[0].as_str(),
            hand_strings[1].as_str(),
            hand_strings[2].as_str(),
            hand_strings[3].as_str(),
        ],
        'E',
        'N',
        "",
    )
    .unwrap();
    let scores = solver.solve_many_plays(&[query], false)[0].clone().unwrap();

    // Every card in East's hand is scored.
    assert_eq!(scores.len(), 13);
    // The best lead holds declarer to the board result.
    let best = scores.iter().map(|s| s.tricks).max().unwrap();
    let declarer_tricks = solver
        .solve_deal(&deal, Strain::NoTrump, Direction::North)
        .unwrap();
    assert_eq!(best, 13 - declarer_tricks);
}
