use crate::card::{Card, Rank, Suit};
use crate::cardset::CardSet;
use crate::error::DealError;
use crate::HAND_SIZE;

/// Parse a holding in slash notation: four rank runs in S/H/D/C order,
/// `-` or an empty run for a void ("AKQJT/5432/Q2/52"). The holding may
/// have fewer than 13 cards (a hand with plays removed).
pub fn parse_holding(s: &str) -> Result<CardSet, DealError> {
    let groups: Vec<&str> = s.split('/').collect();
    if groups.len() != 4 {
        return Err(DealError::BadHandText(s.to_string()));
    }

    let mut cards = CardSet::new();
    // Slash notation runs spades first; suit indices run clubs first.
    for (group, suit) in groups.iter().zip(Suit::ALL.iter().rev()) {
        for c in group.chars() {
            if c == '-' {
                continue;
            }
            let rank = Rank::from_char(c).ok_or(DealError::BadRank(c))?;
            let card = Card::new(*suit, rank);
            if cards.has(card) {
                return Err(DealError::RepeatedRank(card));
            }
            cards.insert(card);
        }
    }
    Ok(cards)
}

/// Format a holding in slash notation, ranks high to low within each suit
pub fn holding_string(cards: CardSet) -> String {
    let mut out = String::new();
    for (i, suit) in Suit::ALL.iter().rev().enumerate() {
        if i > 0 {
            out.push('/');
        }
        let suit_cards = cards.suit(*suit);
        if suit_cards.is_empty() {
            out.push('-');
        } else {
            for index in suit_cards.iter() {
                out.push(Rank::from_index((index % 13) as u8).unwrap().to_char());
            }
        }
    }
    out
}

/// A single player's 13 cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hand {
    cards: CardSet,
}

impl Hand {
    /// Build from a card set, which must hold exactly 13 cards
    pub fn from_cards(cards: CardSet) -> Result<Self, DealError> {
        if cards.len() != HAND_SIZE {
            return Err(DealError::WrongHandSize(cards.len()));
        }
        Ok(Hand { cards })
    }

    /// Parse slash notation ("AKQJT/5432/Q2/52"); must hold 13 cards
    pub fn parse(s: &str) -> Result<Self, DealError> {
        Hand::from_cards(parse_holding(s)?)
    }

    #[inline]
    pub fn cards(&self) -> CardSet {
        self.cards
    }

    #[inline]
    pub fn has(&self, card: Card) -> bool {
        self.cards.has(card)
    }

    pub fn suit_length(&self, suit: Suit) -> usize {
        self.cards.suit_len(suit)
    }

    /// High card points (A=4, K=3, Q=2, J=1)
    pub fn hcp(&self) -> u8 {
        self.cards.hcp()
    }

    /// Controls (A=2, K=1)
    pub fn controls(&self) -> u8 {
        self.cards
            .cards()
            .map(|c| match c.rank {
                Rank::Ace => 2,
                Rank::King => 1,
                _ => 0,
            })
            .sum()
    }

    /// Suit lengths in S-H-D-C order
    pub fn pattern(&self) -> [u8; 4] {
        [
            self.suit_length(Suit::Spades) as u8,
            self.suit_length(Suit::Hearts) as u8,
            self.suit_length(Suit::Diamonds) as u8,
            self.suit_length(Suit::Clubs) as u8,
        ]
    }

    /// Suit lengths sorted longest first
    pub fn shape(&self) -> [u8; 4] {
        let mut lengths = self.pattern();
        lengths.sort_unstable_by(|a, b| b.cmp(a));
        lengths
    }

    /// Balanced: 4-3-3-3, 4-4-3-2, or 5-3-3-2
    pub fn is_balanced(&self) -> bool {
        matches!(self.shape(), [4, 3, 3, 3] | [4, 4, 3, 2] | [5, 3, 3, 2])
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", holding_string(self.cards))
    }
}
