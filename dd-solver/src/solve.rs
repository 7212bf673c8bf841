//! Public entry points: validate requests, build search positions, fan
//! batches over the pool, and marshal results back in request order.

use bridge_cards::{parse_holding, Card, CardSet, Deal, Direction, Strain};

use crate::analyse::{score_all_plays, score_history, CardScore, PlayScore};
use crate::error::SolveError;
use crate::pool::SolverPool;
use crate::search::{solve_ns_tricks, PartialTrick, Position};
use crate::table::Tables;

/// One board to solve: who declares what on this deal.
#[derive(Debug, Clone, Copy)]
pub struct BoardQuery {
    pub deal: Deal,
    pub strain: Strain,
    pub declarer: Direction,
}

impl BoardQuery {
    /// Build from text: four slash-notation hands in W, N, E, S order
    /// plus strain and declarer letters.
    pub fn parse(hands: [&str; 4], strain: char, declarer: char) -> Result<Self, SolveError> {
        let deal = Deal::parse(hands[0], hands[1], hands[2], hands[3])?;
        Ok(BoardQuery {
            deal,
            strain: Strain::from_char(strain).ok_or(SolveError::BadStrain(strain))?,
            declarer: Direction::from_char(declarer).ok_or(SolveError::BadSeat(declarer))?,
        })
    }
}

/// One mid-play position: remaining hands, whose turn it is, and the
/// cards already on the table.
#[derive(Debug, Clone)]
pub struct PlayQuery {
    /// Cards still held, in W, N, E, S order, with the trick's cards
    /// already removed
    pub remaining: [CardSet; 4],
    pub next_to_play: Direction,
    pub strain: Strain,
    /// Cards already played to the trick in progress, in play order
    pub trick_so_far: Vec<Card>,
}

impl PlayQuery {
    /// Build from text: four slash-notation holdings in W, N, E, S
    /// order, seat and strain letters, and the trick as concatenated
    /// 2-character card codes ("HJ" or "SQH7").
    pub fn parse(
        hands: [&str; 4],
        player: char,
        strain: char,
        trick: &str,
    ) -> Result<Self, SolveError> {
        let mut remaining = [CardSet::new(); 4];
        for (slot, text) in remaining.iter_mut().zip(hands.iter()) {
            *slot = parse_holding(text)?;
        }
        Ok(PlayQuery {
            remaining,
            next_to_play: Direction::from_char(player).ok_or(SolveError::BadSeat(player))?,
            strain: Strain::from_char(strain).ok_or(SolveError::BadStrain(strain))?,
            trick_so_far: parse_history(trick)?,
        })
    }

    /// Check internal consistency and lower into a search position.
    fn position(&self) -> Result<Position, SolveError> {
        if self.trick_so_far.len() > 3 {
            return Err(SolveError::BadTrick(self.trick_so_far.len()));
        }

        let mover = self.next_to_play.index();
        let trick_len = self.trick_so_far.len();
        let leader = (mover + 4 - trick_len) & 3;

        // Disjointness across hands and the trick.
        let mut seen = CardSet::new();
        for &hand in &self.remaining {
            let overlap = seen.intersect(hand);
            if let Some(index) = overlap.highest() {
                return Err(SolveError::InvalidDeal(
                    bridge_cards::DealError::DuplicateCard(
                        Card::from_index(index as u8).unwrap(),
                    ),
                ));
            }
            seen.insert_all(hand);
        }
        for &card in &self.trick_so_far {
            if seen.has(card) {
                return Err(SolveError::InvalidDeal(
                    bridge_cards::DealError::DuplicateCard(card),
                ));
            }
            seen.insert(card);
        }

        // Hands that have played this trick hold one card fewer.
        let full = self.remaining[mover].len();
        if full == 0 {
            return Err(SolveError::InvalidDeal(
                bridge_cards::DealError::WrongHandSize(0),
            ));
        }
        for offset in 0..4 {
            let seat = (leader + offset) & 3;
            let expect = if offset < trick_len { full - 1 } else { full };
            if self.remaining[seat].len() != expect {
                return Err(SolveError::InvalidDeal(
                    bridge_cards::DealError::WrongHandSize(self.remaining[seat].len()),
                ));
            }
        }

        // A discard from a hand that still holds the led suit was never
        // legal.
        if let Some(&lead) = self.trick_so_far.first() {
            for (offset, &card) in self.trick_so_far.iter().enumerate() {
                let seat = (leader + offset) & 3;
                if card.suit != lead.suit
                    && !self.remaining[seat]
                        .suit(lead.suit)
                        .is_empty()
                {
                    return Err(SolveError::MustFollow {
                        seat: Direction::from_index(seat as u8).unwrap(),
                        card,
                    });
                }
            }
        }

        let plays = self
            .trick_so_far
            .iter()
            .enumerate()
            .map(|(offset, &card)| ((leader + offset) & 3, card.index() as usize))
            .collect();

        Ok(Position {
            hands: self.remaining,
            trump: self.strain.trump().map(|s| s as usize),
            leader,
            partial: PartialTrick { plays },
        })
    }
}

/// Parse concatenated 2-character card codes.
fn parse_history(s: &str) -> Result<Vec<Card>, SolveError> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.len() % 2 != 0 {
        return Err(SolveError::BadCard(s.to_string()));
    }
    chars
        .chunks(2)
        .map(|pair| {
            let code: String = pair.iter().collect();
            Card::parse(&code).ok_or(SolveError::BadCard(code))
        })
        .collect()
}

fn board_position(deal: &Deal, strain: Strain, declarer: Direction) -> Position {
    Position {
        hands: deal.sets(),
        trump: strain.trump().map(|s| s as usize),
        // The opening lead comes from declarer's left-hand opponent.
        leader: declarer.lho().index(),
        partial: PartialTrick::default(),
    }
}

fn declarer_tricks(ns_tricks: u8, declarer: Direction, num_tricks: usize) -> u8 {
    if declarer.is_ns() {
        ns_tricks
    } else {
        num_tricks as u8 - ns_tricks
    }
}

/// The double-dummy solver with its worker pool.
pub struct Solver {
    pool: SolverPool,
}

impl Solver {
    /// One worker per logical CPU
    pub fn new() -> Self {
        Solver {
            pool: SolverPool::new(),
        }
    }

    /// A fixed worker count
    pub fn with_threads(threads: usize) -> Self {
        Solver {
            pool: SolverPool::with_threads(threads),
        }
    }

    /// Tricks the declaring side takes with best play all round, the
    /// opening lead coming from declarer's LHO.
    pub fn solve_deal(
        &self,
        deal: &Deal,
        strain: Strain,
        declarer: Direction,
    ) -> Result<u8, SolveError> {
        let position = board_position(deal, strain, declarer);
        let mut tables = Tables::new();
        let (ns, _) = solve_ns_tricks(&position, &mut tables);
        Ok(declarer_tricks(ns, declarer, position.num_tricks()))
    }

    /// Solve a batch of boards over the pool. Each slot fails or
    /// succeeds on its own; order matches the requests.
    pub fn solve_many_deals(&self, queries: &[BoardQuery]) -> Vec<Result<u8, SolveError>> {
        self.pool.run(queries, |tables, query| {
            let position = board_position(&query.deal, query.strain, query.declarer);
            let (ns, _) = solve_ns_tricks(&position, tables);
            Ok(declarer_tricks(ns, query.declarer, position.num_tricks()))
        })
    }

    /// Replay a recorded line and report, before each card, the tricks
    /// the side then on play could still have taken.
    pub fn analyze_play(
        &self,
        deal: &Deal,
        strain: Strain,
        declarer: Direction,
        history: &str,
    ) -> Result<Vec<PlayScore>, SolveError> {
        let cards = parse_history(history)?;
        let mut tables = Tables::new();
        score_history(
            deal.sets(),
            strain.trump().map(|s| s as usize),
            declarer.lho().index(),
            &cards,
            &mut tables,
        )
    }

    /// Rank every legal card at each queried position. With
    /// `want_win_ranks`, each card also reports the lowest rank per
    /// suit that its best line actually needed.
    pub fn solve_many_plays(
        &self,
        queries: &[PlayQuery],
        want_win_ranks: bool,
    ) -> Vec<Result<Vec<CardScore>, SolveError>> {
        self.pool.run(queries, |tables, query| {
            let position = query.position()?;
            Ok(score_all_plays(&position, tables, want_win_ranks))
        })
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
