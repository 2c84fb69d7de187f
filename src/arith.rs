//! Arithmetic evaluation of roll-free expressions: the standard operators,
//! the relational operators, and the built-in `min`.

use crate::common::*;
use crate::parse::{self, ast, visit::AstVisitor};
use crate::roll::{tree, RResult, RollError, Value};

/// Evaluates an expression that no longer contains dice. A remaining die
/// term fails with `UnresolvedRoll`: `d` must be resolved by the roll layer
/// before arithmetic evaluation ever sees it.
pub fn evaluate(expression: &ast::Expression) -> RResult<Value> {
    if expression.has_roll() {
        return Err(RollError::UnresolvedRoll);
    }
    Evaluator.visit(expression)
}

/// Parses and evaluates, wrapping any failure in an error that names the
/// offending expression text.
pub fn evaluate_str(s: &str) -> RResult<Value> {
    let expression = parse::parse(s).map_err(|e| RollError::from(e).in_expression(s))?;
    evaluate(&expression).map_err(|e| e.in_expression(s))
}

pub fn is_valid(s: &str) -> bool {
    evaluate_str(s).is_ok()
}

struct Evaluator;

impl AstVisitor for Evaluator {
    type Output = RResult<Value>;

    fn visit_literal(&mut self, x: &Int) -> Self::Output {
        Ok(Value::Int(*x))
    }

    fn visit_die_term(&mut self, _term: &ast::DieTerm) -> Self::Output {
        Err(RollError::UnresolvedRoll)
    }

    fn visit_parenthetical(&mut self, p: &ast::Node) -> Self::Output {
        self.visit(p)
    }

    fn visit_unary(&mut self, op: &UnaryOperator, r: &ast::Node) -> Self::Output {
        let operand = self.visit(r)?;
        match op {
            UnaryOperator::Pos => Ok(operand),
            UnaryOperator::Neg => operand.checked_neg(),
        }
    }

    fn visit_binary(&mut self, l: &ast::Node, op: &BinaryOperator, r: &ast::Node) -> Self::Output {
        let lhs = self.visit(l)?;
        let rhs = self.visit(r)?;
        tree::apply_binary(*op, lhs, rhs)
    }

    fn visit_call(&mut self, func: &Function, args: &[ast::Node]) -> Self::Output {
        match func {
            Function::Min => {
                let mut best: Option<Value> = None;
                for arg in args {
                    let value = self.visit(arg)?;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic_truncates() {
        assert_eq!(evaluate_str("1+2-(3*4/5)%6").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_relational_yields_bool() {
        assert_eq!(evaluate_str("2 < 3").unwrap(), Value::Bool(true));
        assert_eq!(evaluate_str("1+1 = 3").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_min_builtin() {
        assert_eq!(evaluate_str("min(3, 1+1)").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_unresolved_roll_is_rejected() {
        let expression = parse::parse("2d6+1").unwrap();
        assert!(matches!(
            evaluate(&expression),
            Err(RollError::UnresolvedRoll)
        ));
    }

    #[test]
    fn test_failures_name_the_expression() {
        match evaluate_str("1/0").unwrap_err() {
            RollError::Evaluation { expression, source } => {
                assert_eq!(expression, "1/0");
                assert_eq!(*source, RollError::ZeroDivision);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("1+2*3"));
        assert!(!is_valid("1 +"));
        assert!(!is_valid("2d6"));
    }
}
