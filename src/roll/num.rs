use super::{error::RollError, RResult};
use crate::common::*;
use std::fmt;

/// The closed result type of an evaluation: an integer, a real, or a
/// boolean. Numeric conversion truncates toward zero; booleans honor their
/// canonical text form first and coerce to 1/0 only when a number is asked
/// for.
#[derive(Debug, Copy, Clone)]
pub enum Value {
    Int(Int),
    Float(Float),
    Bool(bool),
}

impl Value {
    /// Truncates toward zero: `902.1 -> 902`, `-1.7 -> -1`.
    pub fn as_int(self) -> Int {
        match self {
            Self::Int(x) => x,
            Self::Float(x) => x.trunc() as Int,
            Self::Bool(b) => b as Int,
        }
    }

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
            Self::Bool(b) => b as Int as Float,
        }
    }

    pub fn as_bool(self) -> bool {
        match self {
            Self::Int(x) => x != 0,
            Self::Float(x) => x != 0.0,
            Self::Bool(b) => b,
        }
    }

    pub(crate) fn checked_add(self, rhs: Self) -> RResult<Self> {
        self.checked_op(rhs, Int::checked_add, |a, b| a + b)
    }

    pub(crate) fn checked_sub(self, rhs: Self) -> RResult<Self> {
        self.checked_op(rhs, Int::checked_sub, |a, b| a - b)
    }

    pub(crate) fn checked_mul(self, rhs: Self) -> RResult<Self> {
        self.checked_op(rhs, Int::checked_mul, |a, b| a * b)
    }

    pub(crate) fn checked_div(self, rhs: Self) -> RResult<Self> {
        if rhs.is_zero() {
            return Err(RollError::ZeroDivision);
        }
        self.checked_op(rhs, Int::checked_div, |a, b| a / b)
    }

    pub(crate) fn checked_rem(self, rhs: Self) -> RResult<Self> {
        if rhs.is_zero() {
            return Err(RollError::ZeroDivision);
        }
        self.checked_op(rhs, Int::checked_rem, |a, b| a % b)
    }

    pub(crate) fn checked_neg(self) -> RResult<Self> {
        match self {
            Self::Int(x) => x.checked_neg().map(Self::Int).ok_or(RollError::Overflow),
            other => Ok(Self::Float(-other.as_float())),
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Self::Int(x) => x == 0,
            Self::Float(x) => x == 0.0,
            Self::Bool(b) => !b,
        }
    }

    // Integer pairs stay integral and are overflow-checked; anything
    // involving a float widens to float arithmetic.
    fn checked_op(
        self,
        rhs: Self,
        int_op: fn(Int, Int) -> Option<Int>,
        float_op: fn(Float, Float) -> Float,
    ) -> RResult<Self> {
        match (self, rhs) {
            (Self::Float(_), _) | (_, Self::Float(_)) => {
                Ok(Self::Float(float_op(self.as_float(), rhs.as_float())))
            }
            _ => int_op(self.as_int(), rhs.as_int())
                .map(Self::Int)
                .ok_or(RollError::Overflow),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => self.as_float().eq(&other.as_float()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.as_float().partial_cmp(&other.as_float())
    }
}

impl From<Int> for Value {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<Float> for Value {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Debug::fmt(x, f),
            Self::Bool(b) => fmt::Display::fmt(b, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_toward_zero() {
        assert_eq!(Value::Float(902.1).as_int(), 902);
        assert_eq!(Value::Float(-1.7).as_int(), -1);
        assert_eq!(Value::Bool(true).as_int(), 1);
    }

    #[test]
    fn test_checked_int_arithmetic() {
        assert_eq!(
            Value::Int(12).checked_div(Value::Int(5)).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            Value::Int(Int::MAX).checked_add(Value::Int(1)),
            Err(RollError::Overflow)
        );
        assert_eq!(
            Value::Int(1).checked_div(Value::Int(0)),
            Err(RollError::ZeroDivision)
        );
    }

    #[test]
    fn test_float_widening() {
        assert_eq!(
            Value::Float(3.5).checked_rem(Value::Int(2)).unwrap(),
            Value::Float(1.5)
        );
    }
}
