//! BDD-based constraint engine over bridge hands and deals.
//!
//! Predicates on hands (HCP ranges, shapes, held cards, suit quality)
//! are reduced ordered BDDs over the 52 card variables, sharing one
//! canonical node store. Hand predicates lift to full-deal predicates
//! over 104 owner-bit variables, and both support exact counting and
//! uniform sampling.
//!
//! ```no_run
//! use deal_sets::{metric, shape};
//! use bridge_cards::Suit;
//!
//! let opener = metric::hcp().ge(12) & metric::suit_length(Suit::Spades).ge(5);
//! let balanced = shape::shape_set("any 4333 + any 4432 + any 5332").unwrap();
//! let both = opener & balanced;
//! assert!(both.count() > 0);
//! ```

mod bdd;
mod dealset;
mod error;
mod handset;
pub mod metric;
pub mod shape;

pub use bdd::{Bdd, DEAL_VARS, HAND_VARS};
pub use dealset::DealSet;
pub use error::SpecError;
pub use handset::HandSet;
pub use metric::HandMetric;
