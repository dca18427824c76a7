//! Scalar-or-array values.
//!
//! Operating conditions arrive either as a single value for the whole analysis
//! or as one value per measured point. `Series` keeps both shapes behind one
//! type and broadcasts scalars against arrays, so the models can be written once
//! per point and driven element-wise.

use crate::error::{TpError, TpResult};
use crate::numeric::Real;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Series {
    Scalar(Real),
    Array(Vec<Real>),
}

impl Series {
    /// Number of elements, `None` for a scalar (broadcasts to any length).
    pub fn len(&self) -> Option<usize> {
        match self {
            Series::Scalar(_) => None,
            Series::Array(v) => Some(v.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Series::Array(v) if v.is_empty())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Series::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<Real> {
        match self {
            Series::Scalar(v) => Some(*v),
            Series::Array(_) => None,
        }
    }

    /// Value at `index`, broadcasting scalars. `None` past the end of an array.
    pub fn get(&self, index: usize) -> Option<Real> {
        match self {
            Series::Scalar(v) => Some(*v),
            Series::Array(v) => v.get(index).copied(),
        }
    }

    /// All values; a scalar yields a single element.
    pub fn values(&self) -> Vec<Real> {
        match self {
            Series::Scalar(v) => vec![*v],
            Series::Array(v) => v.clone(),
        }
    }

    pub fn mean(&self) -> Option<Real> {
        match self {
            Series::Scalar(v) => Some(*v),
            Series::Array(v) => crate::numeric::mean(v),
        }
    }

    pub fn map<F>(&self, f: F) -> Series
    where
        F: Fn(Real) -> Real,
    {
        match self {
            Series::Scalar(v) => Series::Scalar(f(*v)),
            Series::Array(v) => Series::Array(v.iter().map(|x| f(*x)).collect()),
        }
    }

    /// Like [`Series::map`] for fallible element functions; stops at the first error.
    pub fn try_map<F, E>(&self, f: F) -> Result<Series, E>
    where
        F: Fn(Real) -> Result<Real, E>,
    {
        match self {
            Series::Scalar(v) => Ok(Series::Scalar(f(*v)?)),
            Series::Array(v) => Ok(Series::Array(
                v.iter().map(|x| f(*x)).collect::<Result<_, _>>()?,
            )),
        }
    }

    /// Combine two series element-wise. Two scalars stay scalar.
    pub fn zip_with<F>(&self, other: &Series, what: &'static str, f: F) -> TpResult<Series>
    where
        F: Fn(Real, Real) -> Real,
    {
        if let (Series::Scalar(a), Series::Scalar(b)) = (self, other) {
            return Ok(Series::Scalar(f(*a, *b)));
        }
        let n = broadcast_len(&[self, other], what)?;
        Ok(Series::Array(
            (0..n)
                .map(|i| f(self.at(i), other.at(i)))
                .collect(),
        ))
    }

    /// Broadcast read used once lengths were checked with [`broadcast_len`].
    pub(crate) fn at(&self, index: usize) -> Real {
        match self {
            Series::Scalar(v) => *v,
            Series::Array(v) => v[index],
        }
    }
}

/// Common length of a set of series. Scalars broadcast; all-scalar sets have length 1.
pub fn broadcast_len(series: &[&Series], what: &'static str) -> TpResult<usize> {
    let mut len: Option<usize> = None;
    for s in series {
        if let Some(n) = s.len() {
            match len {
                None => len = Some(n),
                Some(expected) if expected != n => {
                    return Err(TpError::LengthMismatch {
                        what,
                        expected,
                        found: n,
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(len.unwrap_or(1))
}

impl Default for Series {
    fn default() -> Self {
        Series::Scalar(0.0)
    }
}

impl From<Real> for Series {
    fn from(v: Real) -> Self {
        Series::Scalar(v)
    }
}

impl From<Vec<Real>> for Series {
    fn from(v: Vec<Real>) -> Self {
        Series::Array(v)
    }
}

impl From<&[Real]> for Series {
    fn from(v: &[Real]) -> Self {
        Series::Array(v.to_vec())
    }
}

impl<const N: usize> From<[Real; N]> for Series {
    fn from(v: [Real; N]) -> Self {
        Series::Array(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scalar_broadcasts_against_array() {
        let a = Series::from(2.0);
        let b = Series::from(vec![1.0, 2.0, 3.0]);
        let sum = a.zip_with(&b, "sum", |x, y| x + y).unwrap();
        assert_eq!(sum, Series::Array(vec![3.0, 4.0, 5.0]));
    }

    #[test]
    fn two_scalars_stay_scalar() {
        let sum = Series::from(1.0)
            .zip_with(&Series::from(2.0), "sum", |x, y| x + y)
            .unwrap();
        assert_eq!(sum, Series::Scalar(3.0));
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let a = Series::from(vec![1.0, 2.0]);
        let b = Series::from(vec![1.0, 2.0, 3.0]);
        let err = a.zip_with(&b, "velocities", |x, y| x + y).unwrap_err();
        assert_eq!(
            err,
            TpError::LengthMismatch {
                what: "velocities",
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn get_broadcasts_scalar() {
        let s = Series::from(4.0);
        assert_eq!(s.get(0), Some(4.0));
        assert_eq!(s.get(100), Some(4.0));
        let a = Series::from([1.0, 2.0]);
        assert_eq!(a.get(1), Some(2.0));
        assert_eq!(a.get(2), None);
    }

    #[test]
    fn all_scalar_set_has_length_one() {
        let a = Series::from(1.0);
        let b = Series::from(2.0);
        assert_eq!(broadcast_len(&[&a, &b], "x").unwrap(), 1);
    }

    proptest! {
        #[test]
        fn map_preserves_shape(values in proptest::collection::vec(-1e3f64..1e3, 0..32)) {
            let s = Series::from(values.clone());
            let doubled = s.map(|x| 2.0 * x);
            prop_assert_eq!(doubled.len(), Some(values.len()));
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(doubled.get(i), Some(2.0 * v));
            }
        }
    }
}
