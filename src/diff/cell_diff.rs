//! Cell-level comparison logic

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::CellValue;

/// Numeric tolerance: a pair is equal when `|a-b| <= max(abs, rel * max(|a|,|b|))`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    abs: f64,
    rel: f64,
}

impl Tolerance {
    /// Create a tolerance; both bounds must be finite and non-negative
    pub fn new(abs: f64, rel: f64) -> Result<Self> {
        check_bound("abs_tol", abs)?;
        check_bound("rel_tol", rel)?;
        Ok(Self { abs, rel })
    }

    /// Zero tolerance: numbers must match exactly
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn abs(&self) -> f64 {
        self.abs
    }

    pub fn rel(&self) -> f64 {
        self.rel
    }

    /// Largest difference still treated as equal for this pair
    pub fn threshold(&self, a: f64, b: f64) -> f64 {
        self.abs.max(self.rel * a.abs().max(b.abs()))
    }

    pub fn within(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        if a == b {
            return true;
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        (a - b).abs() <= self.threshold(a, b)
    }
}

fn check_bound(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTolerance { name, value })
    }
}

/// Cell comparator applying numeric tolerance
#[derive(Debug, Clone, Copy, Default)]
pub struct CellComparator {
    tolerance: Tolerance,
}

impl CellComparator {
    /// Create a new cell comparator
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Compare two cell values for equality.
    ///
    /// Two numbers go through the tolerance check. Otherwise nulls only equal
    /// nulls and everything else is compared by its display string.
    pub fn equal(&self, a: &CellValue, b: &CellValue) -> bool {
        // Integers beyond 2^53 collapse as f64, so take the difference exactly
        if let (CellValue::Int(x), CellValue::Int(y)) = (a, b) {
            if x == y {
                return true;
            }
            let diff = x.abs_diff(*y) as f64;
            return diff <= self.tolerance.threshold(*x as f64, *y as f64);
        }

        if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            return self.tolerance.within(x, y);
        }

        match (a, b) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Null, _) | (_, CellValue::Null) => false,
            _ => a.display() == b.display(),
        }
    }
}

/// Calculate percentage change for numeric values
pub fn percentage_change(old: &CellValue, new: &CellValue) -> Option<f64> {
    let old_num = old.as_f64()?;
    let new_num = new.as_f64()?;

    if old_num == 0.0 {
        if new_num == 0.0 {
            Some(0.0)
        } else {
            None // Infinite change
        }
    } else {
        Some((new_num - old_num) / old_num * 100.0)
    }
}
