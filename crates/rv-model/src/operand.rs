//! Scalar-or-vector inputs for the force and power functions.
//!
//! Broadcasting rules:
//! - scalar ⊕ scalar → scalar
//! - scalar ⊕ vector → vector (the scalar is repeated)
//! - vector ⊕ vector → vector, lengths must match

use crate::common::check_finite;
use crate::error::{ModelError, ModelResult};
use serde::Serialize;

/// Borrowed scalar or 1-D input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand<'a> {
    Scalar(f64),
    Vector(&'a [f64]),
}

impl<'a> Operand<'a> {
    /// Element count, `None` for a scalar.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => None,
            Self::Vector(v) => Some(v.len()),
        }
    }

    fn at(&self, i: usize) -> f64 {
        match self {
            Self::Scalar(x) => *x,
            Self::Vector(v) => v[i],
        }
    }

    /// Apply `f` elementwise, rejecting non-finite inputs.
    pub fn map<F>(self, what: &'static str, mut f: F) -> ModelResult<Value>
    where
        F: FnMut(f64) -> ModelResult<f64>,
    {
        match self {
            Self::Scalar(x) => Ok(Value::Scalar(f(check_finite(x, what)?)?)),
            Self::Vector(v) => v
                .iter()
                .map(|&x| f(check_finite(x, what)?))
                .collect::<ModelResult<Vec<_>>>()
                .map(Value::Vector),
        }
    }

    /// Apply `f` pairwise under the broadcasting rules.
    pub fn zip_map<F>(
        self,
        other: Operand<'_>,
        what: (&'static str, &'static str),
        mut f: F,
    ) -> ModelResult<Value>
    where
        F: FnMut(f64, f64) -> ModelResult<f64>,
    {
        let len = match (self.len(), other.len()) {
            (None, None) => {
                let a = check_finite(self.at(0), what.0)?;
                let b = check_finite(other.at(0), what.1)?;
                return Ok(Value::Scalar(f(a, b)?));
            }
            (Some(n), None) | (None, Some(n)) => n,
            (Some(n), Some(m)) if n == m => n,
            (Some(n), Some(m)) => {
                return Err(ModelError::ShapeMismatch {
                    what: "operands must have equal length or one must be scalar",
                    left: n,
                    right: m,
                });
            }
        };

        (0..len)
            .map(|i| {
                let a = check_finite(self.at(i), what.0)?;
                let b = check_finite(other.at(i), what.1)?;
                f(a, b)
            })
            .collect::<ModelResult<Vec<_>>>()
            .map(Value::Vector)
    }
}

impl From<f64> for Operand<'_> {
    fn from(x: f64) -> Self {
        Self::Scalar(x)
    }
}

impl<'a> From<&'a [f64]> for Operand<'a> {
    fn from(v: &'a [f64]) -> Self {
        Self::Vector(v)
    }
}

impl<'a> From<&'a Vec<f64>> for Operand<'a> {
    fn from(v: &'a Vec<f64>) -> Self {
        Self::Vector(v.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [f64; N]> for Operand<'a> {
    fn from(v: &'a [f64; N]) -> Self {
        Self::Vector(v.as_slice())
    }
}

/// Owned result mirroring the shape of the inputs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            Self::Vector(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(x) => std::slice::from_ref(x),
            Self::Vector(v) => v,
        }
    }

    pub fn into_vec(self) -> Vec<f64> {
        match self {
            Self::Scalar(x) => vec![x],
            Self::Vector(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: f64, b: f64) -> ModelResult<f64> {
        Ok(a + b)
    }

    #[test]
    fn scalar_scalar_stays_scalar() {
        let out = Operand::Scalar(1.0)
            .zip_map(Operand::Scalar(2.0), ("a", "b"), add).unwrap();
        assert_eq!(out, Value::Scalar(3.0));
    }

    #[test]
    fn scalar_broadcasts_against_vector() {
        let v = [1.0, 2.0, 3.0];
        let out = Operand::Scalar(10.0)
            .zip_map(Operand::from(&v), ("a", "b"), add)
            .unwrap();
        assert_eq!(out, Value::Vector(vec![11.0, 12.0, 13.0]));

        let out = Operand::from(&v)
            .zip_map(Operand::Scalar(10.0), ("a", "b"), add)
            .unwrap();
        assert_eq!(out.into_vec(), vec![11.0, 12.0, 13.0]);
    }

    #[test]
    fn mismatched_vectors_are_rejected() {
        let a = [1.0, 2.0];
        let b = [1.0, 2.0, 3.0];
        let err = Operand::from(&a)
            .zip_map(Operand::from(&b), ("a", "b"), add)
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::ShapeMismatch {
                left: 2,
                right: 3,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let v = [1.0, f64::NAN];
        let err = Operand::from(&v).map("omega", Ok).unwrap_err();
        assert_eq!(err, ModelError::InvalidArg { what: "omega" });
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Scalar(2.0).as_scalar(), Some(2.0));
        assert_eq!(Value::Scalar(2.0).as_slice(), &[2.0]);
        assert_eq!(Value::Vector(vec![]).len(), 0);
        assert!(Value::Vector(vec![]).is_empty());
    }
}
