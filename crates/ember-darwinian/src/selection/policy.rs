//! Selection policy: the top ⌊p × N⌋ bots (at least one) breed

use ember_common::SelectionError;

/// Absorbs float representation error such as `0.29 × 100 = 28.999…`
const WINNER_COUNT_EPSILON: f64 = 1e-9;

/// Fraction of the population retained as winners, in `(0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPressure(f64);

impl SelectionPressure {
    pub fn new(pressure: f64) -> Result<Self, SelectionError> {
        if !pressure.is_finite() || pressure <= 0.0 || pressure > 1.0 {
            return Err(SelectionError::InvalidPressure(pressure));
        }
        Ok(Self(pressure))
    }

    /// Number of winners for a population of `population` bots of which
    /// `reporting` answered the poll
    ///
    /// The fraction applies to the full population; the result is at least
    /// one and never more than the bots that answered.
    pub fn winner_count(&self, population: usize, reporting: usize) -> usize {
        let target = ((population as f64) * self.0 + WINNER_COUNT_EPSILON).floor() as usize;
        target.max(1).min(reporting)
    }
}
