//! Double-dummy solver.
//!
//! Exact trick counts for bridge positions with all hands visible,
//! computed by a partial-tricks alpha-beta over a binary-searched trick
//! target, with rank-equivalence move reduction, quick- and later-trick
//! bounds, and per-worker transposition tables. Batches fan out over a
//! fixed thread pool; results come back in request order.

mod analyse;
mod error;
mod later;
mod moves;
mod pool;
mod quick;
mod search;
mod solve;
mod state;
mod table;

pub use analyse::{CardScore, PlayScore, WinRanks};
pub use error::SolveError;
pub use pool::SolverPool;
pub use solve::{BoardQuery, PlayQuery, Solver};
pub use state::Replay;

#[cfg(test)]
mod tests;
