use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntervalError {
    #[error("empty correction interval: start {start} is not below end {end}")]
    Empty { start: usize, end: usize },
}

/// A half-open index range `[start, end)` over a time series.
///
/// Invariant: `start < end`. Construction clamps `end` to the series length
/// and rejects ranges that come out empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionInterval {
    start: usize,
    end: usize,
}

impl CorrectionInterval {
    /// Builds an interval clamped to a series of `len` records.
    pub fn clamped(start: usize, end: usize, len: usize) -> Result<Self, IntervalError> {
        let end = end.min(len);
        let start = start.min(len);
        if start >= end {
            return Err(IntervalError::Empty { start, end });
        }
        Ok(CorrectionInterval { start, end })
    }

    /// The full extent of a series of `len` records.
    pub fn full(len: usize) -> Result<Self, IntervalError> {
        Self::clamped(0, len, len)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        false // start < end by construction
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for CorrectionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_end_to_series_length() {
        let interval = CorrectionInterval::clamped(10, 500, 100).unwrap();
        assert_eq!(interval.start(), 10);
        assert_eq!(interval.end(), 100);
        assert_eq!(interval.len(), 90);
    }

    #[test]
    fn rejects_empty_interval() {
        assert!(CorrectionInterval::clamped(5, 5, 100).is_err());
        assert!(CorrectionInterval::clamped(7, 3, 100).is_err());
        // clamping can empty an interval that started past the series
        assert!(CorrectionInterval::clamped(150, 200, 100).is_err());
    }

    #[test]
    fn contains_is_half_open() {
        let interval = CorrectionInterval::clamped(2, 5, 10).unwrap();
        assert!(interval.contains(2));
        assert!(interval.contains(4));
        assert!(!interval.contains(5));
    }
}
