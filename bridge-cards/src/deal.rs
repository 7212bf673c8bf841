use crate::card::Card;
use crate::cardset::CardSet;
use crate::direction::Direction;
use crate::error::DealError;
use crate::hand::Hand;
use crate::HAND_SIZE;

/// A full deal: four disjoint 13-card hands covering the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deal {
    hands: [Hand; 4],
}

impl Deal {
    /// Build from four card sets in W, N, E, S order
    pub fn from_sets(sets: [CardSet; 4]) -> Result<Self, DealError> {
        let mut seen = CardSet::new();
        for cards in sets.iter() {
            if cards.len() != HAND_SIZE {
                return Err(DealError::WrongHandSize(cards.len()));
            }
            let overlap = seen.intersect(*cards);
            if let Some(index) = overlap.highest() {
                return Err(DealError::DuplicateCard(Card::from_index(index as u8).unwrap()));
            }
            seen.insert_all(*cards);
        }
        // Four disjoint hands of 13 necessarily cover the deck.
        Ok(Deal {
            hands: [
                Hand::from_cards(sets[0])?,
                Hand::from_cards(sets[1])?,
                Hand::from_cards(sets[2])?,
                Hand::from_cards(sets[3])?,
            ],
        })
    }

    /// Build from four hands in W, N, E, S order
    pub fn new(hands: [Hand; 4]) -> Result<Self, DealError> {
        Deal::from_sets([
            hands[0].cards(),
            hands[1].cards(),
            hands[2].cards(),
            hands[3].cards(),
        ])
    }

    /// Parse four slash-notation hands in W, N, E, S order
    pub fn parse(west: &str, north: &str, east: &str, south: &str) -> Result<Self, DealError> {
        Deal::new([
            Hand::parse(west)?,
            Hand::parse(north)?,
            Hand::parse(east)?,
            Hand::parse(south)?,
        ])
    }

    #[inline]
    pub fn hand(&self, dir: Direction) -> Hand {
        self.hands[dir.index()]
    }

    /// The four hands as raw card sets in W, N, E, S order
    pub fn sets(&self) -> [CardSet; 4] {
        [
            self.hands[0].cards(),
            self.hands[1].cards(),
            self.hands[2].cards(),
            self.hands[3].cards(),
        ]
    }

    /// Which hand holds a card
    pub fn owner(&self, card: Card) -> Direction {
        for dir in Direction::ALL {
            if self.hand(dir).has(card) {
                return dir;
            }
        }
        unreachable!("a valid deal covers all 52 cards")
    }
}

impl std::ops::Index<Direction> for Deal {
    type Output = Hand;

    #[inline]
    fn index(&self, dir: Direction) -> &Hand {
        &self.hands[dir.index()]
    }
}

impl std::fmt::Display for Deal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for dir in Direction::ALL {
            writeln!(f, "{}: {}", dir.to_char(), self.hand(dir))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deal() -> Deal {
        Deal::parse(
            "AQJ/432/32/AT876",
            "K32/KQJ/AKQ/Q432",
            "T98/T987/J98765/-",
            "7654/A65/T4/KJ95",
        )
        .unwrap()
    }

    #[test]
    fn test_valid_deal() {
        let deal = sample_deal();
        let mut union = CardSet::new();
        for dir in Direction::ALL {
            assert_eq!(deal.hand(dir).cards().len(), 13);
            union.insert_all(deal.hand(dir).cards());
        }
        assert_eq!(union, CardSet::full());
    }

    #[test]
    fn test_owner() {
        let deal = sample_deal();
        assert_eq!(deal.owner(Card::parse("SA").unwrap()), Direction::West);
        assert_eq!(deal.owner(Card::parse("DA").unwrap()), Direction::North);
        assert_eq!(deal.owner(Card::parse("HA").unwrap()), Direction::South);
    }

    #[test]
    fn test_duplicate_card_rejected() {
        let result = Deal::parse(
            "AQJ/432/32/AT876",
            "K32/KQJ/AKQ/Q432",
            "T98/T987/J98765/-",
            "AQJ/432/32/AT876",
        );
        assert!(matches!(result, Err(DealError::DuplicateCard(_))));
    }

    #[test]
    fn test_wrong_size_rejected() {
        let result = Deal::parse(
            "AQJ/432/32/AT87",
            "K32/KQJ/AKQ/Q432",
            "T98/T987/J98765/-",
            "7654/A65/T4/KJ95",
        );
        assert!(matches!(result, Err(DealError::WrongHandSize(12))));
    }
}
