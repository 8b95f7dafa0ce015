use std::error::Error;
use std::fmt;

/// Errors that can occur when creating a histogram.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum CreationError {
    /// Lowest trackable value must be >= 1.
    LowIsZero,
    /// Lowest trackable value must be <= `i64::MAX / 2` because the
    /// highest trackable value must be at least twice the lowest.
    LowExceedsMax,
    /// Highest trackable value must be >= 2 * lowest trackable value for
    /// some internal calculations to work out. In practice, high is
    /// typically much higher than 2 * low.
    HighLessThanTwiceLow,
    /// Number of significant figures must be in the range `[1, 5]`. It is
    /// capped at 5 because 5 significant figures is already more than
    /// almost anyone needs, and memory usage scales exponentially as this
    /// increases.
    SigFigOutOfRange,
    /// Cannot represent sig_figs worth of values beyond the lowest
    /// trackable value. Decrease the significant figures, the lowest
    /// trackable value, or both.
    ///
    /// This can happen when low is very large (like 2^60) and sig_figs is
    /// 5, which would require more bits than a 63-bit value can provide.
    CannotRepresentSigFigBeyondLow,
    /// The `usize` type is too small to represent the desired
    /// configuration. Use fewer significant figures or a lower max.
    UsizeTypeTooSmall,
    /// The counts array could not be allocated.
    OutOfMemory,
}

impl fmt::Display for CreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CreationError::LowIsZero => "lowest trackable value must be >= 1",
            CreationError::LowExceedsMax => {
                "lowest trackable value must be <= i64::MAX / 2"
            }
            CreationError::HighLessThanTwiceLow => {
                "highest trackable value must be >= 2 * lowest trackable value"
            }
            CreationError::SigFigOutOfRange => {
                "number of significant figures must be between 1 and 5"
            }
            CreationError::CannotRepresentSigFigBeyondLow => {
                "cannot represent sig_figs worth of values beyond the lowest trackable value"
            }
            CreationError::UsizeTypeTooSmall => {
                "usize cannot represent the requested configuration"
            }
            CreationError::OutOfMemory => "counts array allocation failed",
        };
        f.write_str(msg)
    }
}

impl Error for CreationError {}

/// Errors that can occur while recording a value and its associated count.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum RecordError {
    /// The value is negative or too large for this histogram's range.
    /// Nothing was recorded. Configure a higher maximum value if larger
    /// values need to be representable.
    ValueOutOfRange,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::ValueOutOfRange => {
                f.write_str("value is not representable in this histogram")
            }
        }
    }
}

impl Error for RecordError {}
