/// Errors from parsing predicate specifications (shape strings, suit
/// templates). BDD misuse is a programming bug and asserts instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Character outside the shape language at this byte position
    UnexpectedChar { ch: char, pos: usize },
    /// Token out of place (e.g. two operators in a row)
    UnexpectedToken { pos: usize },
    /// Spec ended where a pattern was required
    UnexpectedEnd,
    /// A shape pattern group was not four of [0-9x]
    BadPattern { pos: usize },
    /// A suit template held a character other than a rank or 'x'
    BadTemplate(char),
}

impl std::fmt::Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecError::UnexpectedChar { ch, pos } => {
                write!(f, "unexpected character '{}' at position {}", ch, pos + 1)
            }
            SpecError::UnexpectedToken { pos } => {
                write!(f, "token not expected at position {}", pos + 1)
            }
            SpecError::UnexpectedEnd => write!(f, "spec ended before a pattern"),
            SpecError::BadPattern { pos } => {
                write!(f, "expected four of [0-9x] at position {}", pos + 1)
            }
            SpecError::BadTemplate(c) => write!(f, "bad template character '{}'", c),
        }
    }
}

impl std::error::Error for SpecError {}
