//! Replayable position state: apply a card, undo it, track the trick in
//! progress and the tricks already banked. Request validation and play
//! analysis drive positions through this; the search keeps its own
//! flattened arrays.

use bridge_cards::{Card, CardSet, Direction, Strain};

use crate::error::SolveError;

/// Winner of a completed trick led by `leader`.
pub(crate) fn trick_winner(leader: Direction, cards: &[Card], trump: Strain) -> Direction {
    debug_assert_eq!(cards.len(), 4);
    let lead_suit = cards[0].suit;
    let mut best = 0;
    for i in 1..4 {
        let card = cards[i];
        let top = cards[best];
        let beats = if card.suit == top.suit {
            card.rank > top.rank
        } else {
            trump.trump() == Some(card.suit)
        };
        if beats {
            best = i;
        }
    }
    let mut winner = leader;
    for _ in 0..best {
        winner = winner.next();
    }
    winner
}

enum UndoStep {
    /// A card added to the trick in progress
    Played,
    /// The fourth card, which resolved the trick
    Completed { cards: [Card; 4], prev_leader: Direction },
}

/// A position being played out card by card
pub struct Replay {
    hands: [CardSet; 4],
    trump: Strain,
    leader: Direction,
    trick: Vec<Card>,
    /// Tricks won, indexed by side parity (0 = E-W, 1 = N-S)
    tricks_won: [u8; 2],
    undo_log: Vec<UndoStep>,
}

impl Replay {
    pub fn new(hands: [CardSet; 4], trump: Strain, leader: Direction) -> Self {
        Replay {
            hands,
            trump,
            leader,
            trick: Vec::with_capacity(4),
            tricks_won: [0, 0],
            undo_log: Vec::new(),
        }
    }

    /// The seat due to play
    pub fn to_move(&self) -> Direction {
        let mut seat = self.leader;
        for _ in 0..self.trick.len() {
            seat = seat.next();
        }
        seat
    }

    pub fn leader(&self) -> Direction {
        self.leader
    }

    pub fn trump(&self) -> Strain {
        self.trump
    }

    pub fn hand(&self, seat: Direction) -> CardSet {
        self.hands[seat.index()]
    }

    pub fn hands(&self) -> [CardSet; 4] {
        self.hands
    }

    /// Cards played to the unfinished trick, in play order
    pub fn current_trick(&self) -> &[Card] {
        &self.trick
    }

    /// Tricks banked by a seat's side
    pub fn tricks_won(&self, seat: Direction) -> u8 {
        self.tricks_won[seat.index() & 1]
    }

    /// Legal cards for the seat due to play
    pub fn playable(&self) -> CardSet {
        let hand = self.hands[self.to_move().index()];
        if let Some(lead) = self.trick.first() {
            let follow = hand.suit(lead.suit);
            if !follow.is_empty() {
                return follow;
            }
        }
        hand
    }

    /// Play a card for the seat due, resolving the trick on the fourth
    pub fn apply(&mut self, card: Card) -> Result<(), SolveError> {
        let seat = self.to_move();
        let hand = self.hands[seat.index()];
        if !hand.has(card) {
            return Err(SolveError::NotHeld { seat, card });
        }
        if let Some(lead) = self.trick.first() {
            if card.suit != lead.suit && !hand.suit(lead.suit).is_empty() {
                return Err(SolveError::MustFollow { seat, card });
            }
        }

        self.hands[seat.index()].remove(card);
        self.trick.push(card);

        if self.trick.len() == 4 {
            let cards = [self.trick[0], self.trick[1], self.trick[2], self.trick[3]];
            let winner = trick_winner(self.leader, &cards, self.trump);
            self.tricks_won[winner.index() & 1] += 1;
            self.undo_log.push(UndoStep::Completed {
                cards,
                prev_leader: self.leader,
            });
            self.leader = winner;
            self.trick.clear();
        } else {
            self.undo_log.push(UndoStep::Played);
        }
        Ok(())
    }

    /// Take back the most recent play
    pub fn undo(&mut self) {
        let step = self.undo_log.pop().expect("undo without matching apply");
        match step {
            UndoStep::Played => {
                let card = self.trick.pop().expect("trick empty on undo");
                let seat = self.to_move();
                self.hands[seat.index()].insert(card);
            }
            UndoStep::Completed { cards, prev_leader } => {
                let winner = trick_winner(prev_leader, &cards, self.trump);
                self.tricks_won[winner.index() & 1] -= 1;
                self.leader = prev_leader;
                self.trick.clear();
                self.trick.extend_from_slice(&cards[..3]);
                // to_move is now the seat that played the fourth card.
                let seat = self.to_move();
                self.hands[seat.index()].insert(cards[3]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_cards::parse_holding;

    fn set(s: &str) -> CardSet {
        parse_holding(s).unwrap()
    }

    fn card(s: &str) -> Card {
        Card::parse(s).unwrap()
    }

    #[test]
    fn test_trick_winner_follows_rank() {
        let cards = [card("S3"), card("SA"), card("SK"), card("S2")];
        assert_eq!(
            trick_winner(Direction::West, &cards, Strain::NoTrump),
            Direction::North
        );
    }

    #[test]
    fn test_trick_winner_trump_beats_lead() {
        let cards = [card("DA"), card("S2"), card("DK"), card("D3")];
        assert_eq!(
            trick_winner(
                Direction::West,
                &cards,
                Strain::Trump(bridge_cards::Suit::Spades)
            ),
            Direction::North
        );
        // Without trumps the ace of the led suit holds.
        assert_eq!(
            trick_winner(Direction::West, &cards, Strain::NoTrump),
            Direction::West
        );
    }

    #[test]
    fn test_apply_undo_round_trip() {
        let hands = [
            set("3/3/-/-"),
            set("A/A/-/-"),
            set("K/K/-/-"),
            set("2/2/-/-"),
        ];
        let mut replay = Replay::new(hands, Strain::NoTrump, Direction::West);

        assert_eq!(replay.to_move(), Direction::West);
        replay.apply(card("S3")).unwrap();
        replay.apply(card("SA")).unwrap();
        replay.apply(card("SK")).unwrap();
        assert_eq!(replay.to_move(), Direction::South);
        replay.apply(card("S2")).unwrap();

        // North's ace won; North leads with one trick banked.
        assert_eq!(replay.to_move(), Direction::North);
        assert_eq!(replay.tricks_won(Direction::North), 1);
        assert_eq!(replay.tricks_won(Direction::West), 0);

        replay.undo();
        assert_eq!(replay.to_move(), Direction::South);
        assert_eq!(replay.tricks_won(Direction::North), 0);
        assert!(replay.hand(Direction::South).has(card("S2")));

        replay.undo();
        replay.undo();
        replay.undo();
        assert_eq!(replay.to_move(), Direction::West);
        assert_eq!(replay.hands(), hands);
    }

    #[test]
    fn test_follow_suit_enforced() {
        let hands = [
            set("3/3/-/-"),
            set("A/A/-/-"),
            set("K/K/-/-"),
            set("2/2/-/-"),
        ];
        let mut replay = Replay::new(hands, Strain::NoTrump, Direction::West);
        replay.apply(card("S3")).unwrap();
        assert_eq!(
            replay.apply(card("HA")),
            Err(SolveError::MustFollow {
                seat: Direction::North,
                card: card("HA")
            })
        );
        assert_eq!(
            replay.apply(card("SQ")),
            Err(SolveError::NotHeld {
                seat: Direction::North,
                card: card("SQ")
            })
        );
    }
}
