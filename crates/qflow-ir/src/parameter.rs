//! Parameter expressions for variational circuits.
//!
//! Rotation angles are expressions over the entries of a flat trainable
//! parameter vector. `Param(k)` stands for `θ[k]`; an expression such as
//! `2·0.5·θ[3]` is what a time-evolution block produces for a Pauli term with
//! coefficient 0.5.
//!
//! Differentiation requires each angle to be affine in the parameters,
//! see [`ParameterExpression::affine`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::PI;
use std::fmt;

use crate::error::{IrError, IrResult};

/// A symbolic or concrete parameter expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// Entry `k` of the trainable parameter vector.
    Param(usize),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Subtraction.
    Sub(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Division.
    Div(Box<ParameterExpression>, Box<ParameterExpression>),
}

/// An expression of the form `Σ c_k θ_k + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    /// Non-zero coefficients, sorted by parameter index.
    pub coeffs: Vec<(usize, f64)>,
    /// Constant offset.
    pub offset: f64,
}

impl Affine {
    fn constant(offset: f64) -> Self {
        Self {
            coeffs: vec![],
            offset,
        }
    }

    fn scale(mut self, factor: f64) -> Self {
        for (_, c) in &mut self.coeffs {
            *c *= factor;
        }
        self.offset *= factor;
        self.coeffs.retain(|(_, c)| *c != 0.0);
        self
    }

    fn combine(self, other: Self, sign: f64) -> Self {
        let mut merged: BTreeMap<usize, f64> = self.coeffs.into_iter().collect();
        for (k, c) in other.coeffs {
            *merged.entry(k).or_insert(0.0) += sign * c;
        }
        Self {
            coeffs: merged.into_iter().filter(|(_, c)| *c != 0.0).collect(),
            offset: self.offset + sign * other.offset,
        }
    }

    /// True if no parameter contributes.
    pub fn is_constant(&self) -> bool {
        self.coeffs.is_empty()
    }
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Reference entry `index` of the parameter vector.
    pub fn param(index: usize) -> Self {
        ParameterExpression::Param(index)
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression depends on any trainable parameter.
    pub fn is_trainable(&self) -> bool {
        match self {
            ParameterExpression::Param(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_trainable(),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => a.is_trainable() || b.is_trainable(),
        }
    }

    /// Try to evaluate as a concrete f64 value without parameters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Param(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Sub(a, b) => Some(a.as_f64()? - b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.as_f64()?;
                if divisor == 0.0 {
                    return None;
                }
                Some(a.as_f64()? / divisor)
            }
        }
    }

    /// Evaluate against a parameter vector.
    pub fn eval(&self, params: &[f64]) -> IrResult<f64> {
        match self {
            ParameterExpression::Constant(v) => Ok(*v),
            ParameterExpression::Param(k) => {
                params
                    .get(*k)
                    .copied()
                    .ok_or(IrError::UnboundParameter {
                        index: *k,
                        available: params.len(),
                    })
            }
            ParameterExpression::Pi => Ok(PI),
            ParameterExpression::Neg(e) => Ok(-e.eval(params)?),
            ParameterExpression::Add(a, b) => Ok(a.eval(params)? + b.eval(params)?),
            ParameterExpression::Sub(a, b) => Ok(a.eval(params)? - b.eval(params)?),
            ParameterExpression::Mul(a, b) => Ok(a.eval(params)? * b.eval(params)?),
            ParameterExpression::Div(a, b) => {
                let divisor = b.eval(params)?;
                if divisor == 0.0 {
                    return Err(IrError::DivisionByZero(self.to_string()));
                }
                Ok(a.eval(params)? / divisor)
            }
        }
    }

    /// All parameter indices referenced by this expression.
    pub fn params(&self) -> BTreeSet<usize> {
        let mut set = BTreeSet::new();
        self.collect_params(&mut set);
        set
    }

    fn collect_params(&self, set: &mut BTreeSet<usize>) {
        match self {
            ParameterExpression::Constant(_) | ParameterExpression::Pi => {}
            ParameterExpression::Param(k) => {
                set.insert(*k);
            }
            ParameterExpression::Neg(e) => e.collect_params(set),
            ParameterExpression::Add(a, b)
            | ParameterExpression::Sub(a, b)
            | ParameterExpression::Mul(a, b)
            | ParameterExpression::Div(a, b) => {
                a.collect_params(set);
                b.collect_params(set);
            }
        }
    }

    /// Decompose into `Σ c_k θ_k + offset`.
    ///
    /// Returns `None` if the expression is not affine in the parameters
    /// (a product of two parameter-dependent factors, or a division by one).
    pub fn affine(&self) -> Option<Affine> {
        match self {
            ParameterExpression::Constant(v) => Some(Affine::constant(*v)),
            ParameterExpression::Pi => Some(Affine::constant(PI)),
            ParameterExpression::Param(k) => Some(Affine {
                coeffs: vec![(*k, 1.0)],
                offset: 0.0,
            }),
            ParameterExpression::Neg(e) => Some(e.affine()?.scale(-1.0)),
            ParameterExpression::Add(a, b) => Some(a.affine()?.combine(b.affine()?, 1.0)),
            ParameterExpression::Sub(a, b) => Some(a.affine()?.combine(b.affine()?, -1.0)),
            ParameterExpression::Mul(a, b) => {
                let a = a.affine()?;
                let b = b.affine()?;
                match (a.is_constant(), b.is_constant()) {
                    (true, _) => Some(b.scale(a.offset)),
                    (false, true) => Some(a.scale(b.offset)),
                    (false, false) => None,
                }
            }
            ParameterExpression::Div(a, b) => {
                let b = b.affine()?;
                if !b.is_constant() || b.offset == 0.0 {
                    return None;
                }
                Some(a.affine()?.scale(1.0 / b.offset))
            }
        }
    }

    /// Simplify the expression by evaluating constant subexpressions.
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        let fold = |a: &ParameterExpression,
                    b: &ParameterExpression,
                    op: fn(f64, f64) -> Option<f64>,
                    build: fn(Box<ParameterExpression>, Box<ParameterExpression>) -> ParameterExpression| {
            let a = a.simplify();
            let b = b.simplify();
            match (a.as_f64(), b.as_f64()) {
                (Some(av), Some(bv)) => match op(av, bv) {
                    Some(v) => ParameterExpression::Constant(v),
                    None => build(Box::new(a), Box::new(b)),
                },
                _ => build(Box::new(a), Box::new(b)),
            }
        };
        match self {
            ParameterExpression::Neg(e) => {
                let e = e.simplify();
                match e.as_f64() {
                    Some(v) => ParameterExpression::Constant(-v),
                    None => ParameterExpression::Neg(Box::new(e)),
                }
            }
            ParameterExpression::Add(a, b) => {
                fold(a, b, |x, y| Some(x + y), ParameterExpression::Add)
            }
            ParameterExpression::Sub(a, b) => {
                fold(a, b, |x, y| Some(x - y), ParameterExpression::Sub)
            }
            ParameterExpression::Mul(a, b) => {
                fold(a, b, |x, y| Some(x * y), ParameterExpression::Mul)
            }
            ParameterExpression::Div(a, b) => fold(
                a,
                b,
                |x, y| (y != 0.0).then(|| x / y),
                ParameterExpression::Div,
            ),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Param(k) => write!(f, "θ{k}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Sub(a, b) => write!(f, "({a} - {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
            ParameterExpression::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl From<i32> for ParameterExpression {
    fn from(value: i32) -> Self {
        ParameterExpression::Constant(f64::from(value))
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Sub for ParameterExpression {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        ParameterExpression::Sub(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul<ParameterExpression> for f64 {
    type Output = ParameterExpression;

    fn mul(self, rhs: ParameterExpression) -> Self::Output {
        ParameterExpression::Mul(Box::new(ParameterExpression::Constant(self)), Box::new(rhs))
    }
}

impl std::ops::Div for ParameterExpression {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        ParameterExpression::Div(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_trainable());
        assert_eq!(p.as_f64(), Some(1.5));
        assert_eq!(p.eval(&[]).unwrap(), 1.5);
    }

    #[test]
    fn test_param() {
        let p = ParameterExpression::param(2);
        assert!(p.is_trainable());
        assert_eq!(p.as_f64(), None);
        assert!(p.params().contains(&2));
        assert_eq!(p.eval(&[0.0, 0.0, 0.25]).unwrap(), 0.25);
    }

    #[test]
    fn test_unbound_param() {
        let p = ParameterExpression::param(3);
        let err = p.eval(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            IrError::UnboundParameter {
                index: 3,
                available: 1
            }
        ));
    }

    #[test]
    fn test_pi() {
        let p = ParameterExpression::pi();
        assert!(!p.is_trainable());
        assert_eq!(p.as_f64(), Some(PI));
    }

    #[test]
    fn test_arithmetic() {
        let a = ParameterExpression::constant(2.0);
        let b = ParameterExpression::constant(3.0);

        let sum = (a.clone() + b.clone()).simplify();
        assert_eq!(sum.as_f64(), Some(5.0));

        let prod = (a * b).simplify();
        assert_eq!(prod.as_f64(), Some(6.0));
    }

    #[test]
    fn test_affine_scaled_param() {
        // 2 * 0.5 * θ1 + π
        let e = 2.0 * (0.5 * ParameterExpression::param(1)) + ParameterExpression::pi();
        let affine = e.affine().unwrap();
        assert_eq!(affine.coeffs, vec![(1, 1.0)]);
        assert!((affine.offset - PI).abs() < 1e-12);
    }

    #[test]
    fn test_affine_two_params() {
        let e = ParameterExpression::param(0) - ParameterExpression::param(4) / ParameterExpression::constant(2.0);
        let affine = e.affine().unwrap();
        assert_eq!(affine.coeffs, vec![(0, 1.0), (4, -0.5)]);
    }

    #[test]
    fn test_affine_rejects_products_of_params() {
        let e = ParameterExpression::param(0) * ParameterExpression::param(1);
        assert!(e.affine().is_none());
        let d = ParameterExpression::constant(1.0) / ParameterExpression::param(0);
        assert!(d.affine().is_none());
    }

    #[test]
    fn test_affine_cancellation() {
        let e = ParameterExpression::param(0) - ParameterExpression::param(0);
        assert!(e.affine().unwrap().is_constant());
    }

    #[test]
    fn test_division_by_zero() {
        let e = ParameterExpression::param(0) / ParameterExpression::constant(0.0);
        assert!(matches!(e.eval(&[1.0]), Err(IrError::DivisionByZero(_))));
    }

    #[test]
    fn test_display() {
        let e = 2.0 * ParameterExpression::param(3);
        assert_eq!(e.to_string(), "(2 * θ3)");
    }
}
