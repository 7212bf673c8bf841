use bridge_cards::{Card, DealError, Direction};

/// Typed failures for solver requests. Validation failures abort only
/// their own slot in a batch; `Capacity` is an engine error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// The deal was malformed (missing, duplicated, or miscounted cards)
    InvalidDeal(DealError),
    /// A history or trick card is not held by the player on play
    NotHeld { seat: Direction, card: Card },
    /// A history or trick card breaks the follow-suit rule
    MustFollow { seat: Direction, card: Card },
    /// A card code in a history string did not parse
    BadCard(String),
    /// Strain letter outside {C, D, H, S, N}
    BadStrain(char),
    /// Seat letter outside {W, N, E, S}
    BadSeat(char),
    /// A trick prefix held four or more cards
    BadTrick(usize),
    /// Internal engine limit exceeded; the batch cannot continue
    Capacity,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::InvalidDeal(e) => write!(f, "invalid deal: {}", e),
            SolveError::NotHeld { seat, card } => {
                write!(f, "{} does not hold {}", seat.name(), card)
            }
            SolveError::MustFollow { seat, card } => {
                write!(f, "{} must follow suit, cannot play {}", seat.name(), card)
            }
            SolveError::BadCard(s) => write!(f, "bad card code '{}'", s),
            SolveError::BadStrain(c) => write!(f, "bad strain '{}'", c),
            SolveError::BadSeat(c) => write!(f, "bad seat '{}'", c),
            SolveError::BadTrick(n) => write!(f, "trick prefix of {} cards", n),
            SolveError::Capacity => write!(f, "engine capacity exceeded"),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::InvalidDeal(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DealError> for SolveError {
    fn from(e: DealError) -> Self {
        SolveError::InvalidDeal(e)
    }
}
