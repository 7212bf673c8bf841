use crate::card::Card;

/// Errors from constructing or parsing hands and deals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    /// A hand string did not have four '/'-separated suit groups
    BadHandText(String),
    /// A character was not a valid rank
    BadRank(char),
    /// The same card appeared twice within one hand string
    RepeatedRank(Card),
    /// A hand did not hold exactly 13 cards
    WrongHandSize(usize),
    /// The same card appeared in two hands of a deal
    DuplicateCard(Card),
}

impl std::fmt::Display for DealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DealError::BadHandText(s) => {
                write!(f, "hand '{}' must have four '/'-separated suits", s)
            }
            DealError::BadRank(c) => write!(f, "bad rank character '{}'", c),
            DealError::RepeatedRank(card) => write!(f, "card {} repeated within a hand", card),
            DealError::WrongHandSize(size) => {
                write!(f, "hand holds {} cards, expected 13", size)
            }
            DealError::DuplicateCard(card) => write!(f, "card {} dealt to two hands", card),
        }
    }
}

impl std::error::Error for DealError {}
