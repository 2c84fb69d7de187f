use super::{error::RollError, num::Value, term::RolledTerm, RResult};
use crate::common::*;
use crate::parse::ast;
use enum_dispatch::enum_dispatch;

/// A fully rolled expression tree. Every die term has already been resolved
/// against the randomness source; evaluating the tree is pure arithmetic and
/// can be repeated without re-rolling.
#[enum_dispatch(Outcome)]
#[derive(Debug, Clone, PartialEq)]
pub enum RolledNode {
    Literal(RolledLiteral),
    Term(RolledTerm),
    Parenthetical(RolledParen),
    Unary(RolledUnary),
    Binary(RolledBinary),
    Call(RolledCall),
}

#[enum_dispatch]
pub trait Outcome {
    /// Evaluates the subtree to a single value.
    fn value(&self) -> RResult<Value>;

    /// Moves every retained slot value out of the subtree, left to right.
    /// Terms that have been taken evaluate to zero afterwards.
    fn take_rolls(&mut self, out: &mut Vec<Int>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolledLiteral(pub Int);

#[derive(Debug, Clone, PartialEq)]
pub struct RolledParen {
    pub inner: Box<RolledNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolledUnary {
    pub op: UnaryOperator,
    pub operand: Box<RolledNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolledBinary {
    pub op: BinaryOperator,
    pub lhs: Box<RolledNode>,
    pub rhs: Box<RolledNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolledCall {
    pub function: Function,
    pub args: Vec<RolledNode>,
}

impl Outcome for RolledLiteral {
    fn value(&self) -> RResult<Value> {
        Ok(Value::Int(self.0))
    }

    fn take_rolls(&mut self, _out: &mut Vec<Int>) {}
}

impl Outcome for RolledTerm {
    fn value(&self) -> RResult<Value> {
        self.total().map(Value::Int)
    }

    fn take_rolls(&mut self, out: &mut Vec<Int>) {
        out.extend(self.drain());
    }
}

impl Outcome for RolledParen {
    fn value(&self) -> RResult<Value> {
        self.inner.value()
    }

    fn take_rolls(&mut self, out: &mut Vec<Int>) {
        self.inner.take_rolls(out);
    }
}

impl Outcome for RolledUnary {
    fn value(&self) -> RResult<Value> {
        let operand = self.operand.value()?;
        match self.op {
            UnaryOperator::Pos => Ok(operand),
            UnaryOperator::Neg => operand.checked_neg(),
        }
    }

    fn take_rolls(&mut self, out: &mut Vec<Int>) {
        self.operand.take_rolls(out);
    }
}

impl Outcome for RolledBinary {
    fn value(&self) -> RResult<Value> {
        let lhs = self.lhs.value()?;
        let rhs = self.rhs.value()?;
        apply_binary(self.op, lhs, rhs)
    }

    fn take_rolls(&mut self, out: &mut Vec<Int>) {
        self.lhs.take_rolls(out);
        self.rhs.take_rolls(out);
    }
}

impl Outcome for RolledCall {
    fn value(&self) -> RResult<Value> {
        match self.function {
            Function::Min => {
                let mut best: Option<Value> = None;
                for arg in &self.args {
                    let value = arg.value()?;
                    best = Some(match best {
                        Some(current) if current <= value => current,
                        _ => value,
                    });
                }
                best.ok_or_else(|| {
                    RollError::value_error("min() requires at least one argument")
                })
            }
        }
    }

    fn take_rolls(&mut self, out: &mut Vec<Int>) {
        for arg in &mut self.args {
            arg.take_rolls(out);
        }
    }
}

/// One logical roll: the resolved tree plus the expression it came from.
/// Every projection reads this cached outcome; none of them re-draws
/// randomness. Potential bounds are computed on demand, so an expression
/// whose bounds cannot be projected (`1/(1d6-3)` spans a zero divisor)
/// still rolls and totals normally.
#[derive(Debug, Clone, PartialEq)]
pub struct Rolled {
    root: RolledNode,
    expression: ast::Expression,
}

impl Rolled {
    pub(crate) fn new(root: RolledNode, expression: ast::Expression) -> Self {
        Self { root, expression }
    }

    pub fn total(&self) -> RResult<Value> {
        self.root.value()
    }

    pub(crate) fn root(&self) -> &RolledNode {
        &self.root
    }

    /// The kept individual rolls, left to right. Consuming: a second call
    /// returns an empty vector and later totals are zero.
    pub fn take_rolls(&mut self) -> Vec<Int> {
        let mut out = Vec::new();
        self.root.take_rolls(&mut out);
        out
    }

    pub fn potential_minimum(&self) -> RResult<Int> {
        self.expression.potential_minimum()
    }

    pub fn potential_maximum(&self) -> RResult<Int> {
        self.expression.potential_maximum()
    }

    pub fn is_relational(&self) -> bool {
        self.expression.has_relational()
    }

    pub fn as_bool(&self) -> RResult<bool> {
        self.as_bool_with_threshold(0.5)
    }

    /// Relational rolls evaluate relationally. Anything else is true when
    /// the outcome landed at or below `threshold` of its achievable range:
    /// `(sum - (min - 1)) / (max - (min - 1)) <= threshold`.
    pub fn as_bool_with_threshold(&self, threshold: Float) -> RResult<bool> {
        if self.is_relational() {
            return Ok(self.total()?.as_bool());
        }
        let minimum = self.potential_minimum()?;
        let maximum = self.potential_maximum()?;
        let sum = self.total()?.as_int();
        let span = (maximum as i64 - minimum as i64 + 1).max(1);
        let offset = sum as i64 - minimum as i64 + 1;
        Ok(offset as Float / span as Float <= threshold)
    }

    /// Renders the roll with each die term written as its addend list:
    /// no rolls yield `0`, one yields its value, several a parenthesized
    /// `(v1 + v2 + ...)`. Surrounding arithmetic is preserved.
    pub fn to_sum_expression(&self) -> String {
        super::stringify::sum_expression(&self.root)
    }

    /// Renders the roll with each non-relational subtree collapsed to its
    /// evaluated total, leaving relational structure intact.
    pub fn to_total_expression(&self) -> RResult<String> {
        super::stringify::total_expression(&self.root)
    }
}

pub(crate) fn apply_binary(op: BinaryOperator, lhs: Value, rhs: Value) -> RResult<Value> {
    use BinaryOperator::*;
    Ok(match op {
        Add => lhs.checked_add(rhs)?,
        Sub => lhs.checked_sub(rhs)?,
        Mul => lhs.checked_mul(rhs)?,
        Div => lhs.checked_div(rhs)?,
        Rem => lhs.checked_rem(rhs)?,
        Lt => Value::Bool(lhs < rhs),
        Gt => Value::Bool(lhs > rhs),
        Le => Value::Bool(lhs <= rhs),
        Ge => Value::Bool(lhs >= rhs),
        Eq => Value::Bool(lhs == rhs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(x: Int) -> RolledNode {
        RolledNode::Literal(RolledLiteral(x))
    }

    fn bin(op: BinaryOperator, lhs: RolledNode, rhs: RolledNode) -> RolledNode {
        RolledNode::Binary(RolledBinary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    #[test]
    fn test_arithmetic_tree() {
        // (3 * 4) / 5 truncates toward zero.
        let tree = bin(
            BinaryOperator::Div,
            bin(BinaryOperator::Mul, lit(3), lit(4)),
            lit(5),
        );
        assert_eq!(tree.value().unwrap(), Value::Int(2));
    }

    #[test]
    fn test_comparison_yields_bool() {
        let tree = bin(BinaryOperator::Ge, lit(4), lit(4));
        assert_eq!(tree.value().unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_zero_division() {
        let tree = bin(BinaryOperator::Div, lit(1), lit(0));
        assert!(matches!(tree.value(), Err(RollError::ZeroDivision)));
    }

    #[test]
    fn test_negation_overflow() {
        let tree = RolledNode::Unary(RolledUnary {
            op: UnaryOperator::Neg,
            operand: Box::new(lit(Int::MIN)),
        });
        assert!(matches!(tree.value(), Err(RollError::Overflow)));
    }

    #[test]
    fn test_min_call() {
        let tree = RolledNode::Call(RolledCall {
            function: Function::Min,
            args: vec![lit(4), lit(2), lit(7)],
        });
        assert_eq!(tree.value().unwrap(), Value::Int(2));
    }
}
