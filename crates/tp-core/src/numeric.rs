use crate::TpError;

pub type Real = f64;

/// Absolute and relative tolerance for comparing computed values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// `|a - b|` within the absolute tolerance, or within `rel` of the larger magnitude.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(value: Real, what: &'static str) -> Result<Real, TpError> {
    match value.is_finite() {
        true => Ok(value),
        false => Err(TpError::NonFinite { what, value }),
    }
}

/// Divide, reporting an exactly-zero denominator instead of producing inf/NaN.
pub fn checked_div(num: Real, den: Real, what: &'static str) -> Result<Real, TpError> {
    if den == 0.0 {
        return Err(TpError::DivideByZero { what });
    }
    ensure_finite(num / den, what)
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<Real>() / values.len() as Real)
    }
}
