use std::fmt;

/// Conversion failures. These are never recovered locally — the bridge
/// forwards them to the host's failure entry.
#[derive(Debug)]
pub enum ConvError {
    /// The time value is NaN, outside the host's time range, or its
    /// year does not fit the fixed four-digit ISO field.
    InvalidDate { millis: f64 },
    /// The boxed value's tag has no text rendering.
    Unrenderable { tag: i64 },
}

impl fmt::Display for ConvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvError::InvalidDate { millis } => {
                write!(f, "invalid date: {} is not a valid time value", millis)
            }
            ConvError::Unrenderable { tag } => {
                write!(f, "show: no text rendering for value tag {}", tag)
            }
        }
    }
}

impl std::error::Error for ConvError {}
