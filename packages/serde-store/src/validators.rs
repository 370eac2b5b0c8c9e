//! Range and length checks used by the record models.

use flatstore_core_store::Error;

/// Numeric bounds, inclusive or exclusive at both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub inclusive: bool,
}

impl NumberRange {
    pub const fn inclusive(min: f64, max: f64) -> Self {
        NumberRange {
            min,
            max,
            inclusive: true,
        }
    }

    pub const fn exclusive(min: f64, max: f64) -> Self {
        NumberRange {
            min,
            max,
            inclusive: false,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        if self.inclusive {
            value >= self.min && value <= self.max
        } else {
            value > self.min && value < self.max
        }
    }

    pub fn check(&self, field: &str, value: f64) -> Result<(), Error> {
        if self.contains(value) {
            return Ok(());
        }

        Err(Error::validation(if self.inclusive {
            format!(
                "{} value should be from {} to {} only, got {}.",
                field, self.min, self.max, value
            )
        } else {
            format!(
                "{} value should be between {} and {} only, got {}.",
                field, self.min, self.max, value
            )
        }))
    }
}

/// Bounds on the character count of a string, both ends inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthRange {
    pub min: usize,
    pub max: usize,
}

impl LengthRange {
    pub const fn new(min: usize, max: usize) -> Self {
        LengthRange { min, max }
    }

    pub fn check(&self, field: &str, value: &str) -> Result<(), Error> {
        let len = value.chars().count();
        if len < self.min || len > self.max {
            return Err(Error::validation(format!(
                "{} length should be from {} to {} characters, got {}.",
                field, self.min, self.max, len
            )));
        }
        Ok(())
    }
}

/// Hours east of UTC. A whole day either way is out of range.
pub const UTC_OFFSET: NumberRange = NumberRange::exclusive(-24.0, 24.0);
