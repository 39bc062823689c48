//! Final grades on the 0.0 to 5.0 scale with one fractional digit.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{GRADE_MAX_TENTHS, GRADE_PASSING_TENTHS};
use crate::error::RecordsError;

/// A validated final grade, held as tenths of a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Grade(u8);

impl Grade {
    /// Build a grade from tenths of a point (`45` is `4.5`).
    pub fn from_tenths(tenths: i32) -> Result<Self, RecordsError> {
        u8::try_from(tenths)
            .ok()
            .filter(|t| i32::from(*t) <= GRADE_MAX_TENTHS)
            .map(Self)
            .ok_or_else(|| RecordsError::InvalidGrade(Decimal::new(i64::from(tenths), 1).to_string()))
    }

    /// Build a grade from a decimal; rejects values outside [0.0, 5.0] and
    /// anything with more than one significant fractional digit.
    pub fn from_decimal(value: Decimal) -> Result<Self, RecordsError> {
        let normalized = value.normalize();
        if normalized.scale() > 1 || (normalized.is_sign_negative() && !normalized.is_zero()) {
            return Err(RecordsError::InvalidGrade(value.to_string()));
        }

        let tenths = normalized
            .checked_mul(Decimal::TEN)
            .and_then(|t| t.to_i32())
            .ok_or_else(|| RecordsError::InvalidGrade(value.to_string()))?;

        Self::from_tenths(tenths).map_err(|_| RecordsError::InvalidGrade(value.to_string()))
    }

    pub fn tenths(self) -> i32 {
        i32::from(self.0)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(i64::from(self.0), 1)
    }

    /// Whether the grade reaches the usual passing mark of 3.0.
    pub fn is_passing(self) -> bool {
        self.tenths() >= GRADE_PASSING_TENTHS
    }
}

impl FromStr for Grade {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim()).map_err(|_| RecordsError::InvalidGrade(s.to_string()))?;
        Self::from_decimal(value)
    }
}

impl TryFrom<Decimal> for Grade {
    type Error = RecordsError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Grade> for Decimal {
    fn from(grade: Grade) -> Self {
        grade.to_decimal()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Mean of graded enrollments given as tenths; `None` when nothing is graded.
pub fn average_of_tenths(sum_tenths: i64, graded: u64) -> Option<Decimal> {
    if graded == 0 {
        return None;
    }
    Some(Decimal::new(sum_tenths, 1) / Decimal::from(graded))
}
