//! Value types shared by the constraint engine and the double-dummy solver.
//!
//! Cards are indexed `suit * 13 + rank` with clubs = 0 and the deuce = 0,
//! so every suit occupies a contiguous 13-bit window of a [`CardSet`].

mod card;
mod cardset;
mod deal;
mod direction;
mod error;
mod hand;

pub use card::{Card, Rank, Strain, Suit};
pub use cardset::{AscendingIter, CardSet, CardSetIter};
pub use deal::Deal;
pub use direction::Direction;
pub use error::DealError;
pub use hand::{holding_string, parse_holding, Hand};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// Number of cards dealt to each hand.
pub const HAND_SIZE: usize = 13;
