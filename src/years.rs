// Year range handling: parsing the user's year input and turning an
// inclusive range into the pair of exclusion dates the downloader expects.

use std::fmt;
use thiserror::Error;

/// Oldest year accepted at the prompt.
pub const MIN_YEAR: i32 = 1900;

/// Reasons a year typed at the prompt is rejected. The `Display` text is
/// what the user sees before being asked again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YearError {
    #[error("Year cannot be empty.")]
    Empty,

    #[error("Invalid input. Please enter a valid integer for the year.")]
    NotANumber,

    #[error("Year must be between {min} and {max}.")]
    OutOfRange { min: i32, max: i32 },
}

/// Newest year accepted at the prompt: one past the current year, so
/// photos from clocks set slightly ahead are still reachable.
pub fn max_year(current_year: i32) -> i32 {
    current_year + 1
}

/// Parse a trimmed year string and check it against
/// `[MIN_YEAR, current_year + 1]`. Out-of-range values are rejected, never
/// clamped.
pub fn parse_year(input: &str, current_year: i32) -> Result<i32, YearError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(YearError::Empty);
    }
    let year: i32 = input.parse().map_err(|_| YearError::NotANumber)?;
    let max = max_year(current_year);
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(YearError::OutOfRange { min: MIN_YEAR, max });
    }
    Ok(year)
}

/// Inclusive range of years, always stored with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Build a range, swapping the bounds if they arrive reversed. The
    /// second value reports whether a swap happened.
    pub fn ordered(start: i32, end: i32) -> (Self, bool) {
        if start > end {
            (YearRange { start: end, end: start }, true)
        } else {
            (YearRange { start, end }, false)
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }

    /// Everything created before January 1st of the start year is skipped.
    pub fn skip_created_before(&self) -> String {
        format!("{}-01-01", self.start)
    }

    /// Everything created after January 1st of the year following `end` is
    /// skipped, which keeps the whole of `end` inside the range.
    pub fn skip_created_after(&self) -> String {
        format!("{}-01-01", self.end + 1)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
