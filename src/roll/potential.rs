use super::{
    error::RollError,
    term::{contributing_slots, slot_maximum, slot_minimum},
    RResult,
};
use crate::common::*;
use crate::parse::{ast, visit::AstVisitor};

impl ast::Expression {
    /// Lowest value this expression can evaluate to.
    pub fn potential_minimum(&self) -> RResult<Int> {
        Bounds.visit(self).map(|(lo, _)| lo)
    }

    /// Highest value this expression can evaluate to. Exploding terms are
    /// bounded by the explode supremum factor.
    pub fn potential_maximum(&self) -> RResult<Int> {
        Bounds.visit(self).map(|(_, hi)| hi)
    }

    /// Expected value of the expression, ignoring explosions and transform
    /// rules.
    pub fn potential_average(&self) -> RResult<Float> {
        Average.visit(self)
    }
}

/// Interval analysis over the unresolved tree. Nested quantity and size
/// expressions contribute their own intervals, so `(1d2)d3` spans 1 to 6.
struct Bounds;

type Interval = (Int, Int);

fn checked(x: Int, y: Int, op: fn(Int, Int) -> Option<Int>) -> RResult<Int> {
    op(x, y).ok_or(RollError::Overflow)
}

/// Min and max over the four corner combinations, for operators that are
/// monotone in each argument.
fn corners(
    (llo, lhi): Interval,
    (rlo, rhi): Interval,
    op: fn(Int, Int) -> Option<Int>,
) -> RResult<Interval> {
    let mut lo = Int::MAX;
    let mut hi = Int::MIN;
    for &l in &[llo, lhi] {
        for &r in &[rlo, rhi] {
            let v = op(l, r).ok_or(RollError::Overflow)?;
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    Ok((lo, hi))
}

fn guard_zero((rlo, rhi): Interval) -> RResult<()> {
    if rlo == 0 || rhi == 0 || (rlo < 0 && rhi > 0) {
        return Err(RollError::ZeroDivision);
    }
    Ok(())
}

/// Remainder is not monotone, so corner sampling would exclude achievable
/// outcomes (`1d6 % 4` reaches both 0 and 3). The remainder takes the
/// dividend's sign and `|a % b| <= min(|a|, |b| - 1)`.
fn rem_interval(lhs: Interval, rhs: Interval) -> RResult<Interval> {
    guard_zero(rhs)?;
    let (llo, lhi) = lhs;
    let (rlo, rhi) = rhs;
    if llo == lhi && rlo == rhi {
        let v = llo.checked_rem(rlo).ok_or(RollError::Overflow)?;
        return Ok((v, v));
    }
    let min_mag = rlo.unsigned_abs().min(rhi.unsigned_abs());
    let max_mag = rlo.unsigned_abs().max(rhi.unsigned_abs());
    // A nonnegative dividend below every divisor magnitude passes through.
    if llo >= 0 && (lhi as u32) < min_mag {
        return Ok(lhs);
    }
    let m = (max_mag - 1) as Int;
    let lo = if llo >= 0 { 0 } else { (-m).max(llo) };
    let hi = if lhi <= 0 { 0 } else { m.min(lhi) };
    Ok((lo, hi))
}

fn relation_interval(op: BinaryOperator, l: Interval, r: Interval) -> Interval {
    use BinaryOperator::*;
    let (llo, lhi) = l;
    let (rlo, rhi) = r;
    let (always, never) = match op {
        Lt => (lhi < rlo, llo >= rhi),
        Gt => (llo > rhi, lhi <= rlo),
        Le => (lhi <= rlo, llo > rhi),
        Ge => (llo >= rhi, lhi < rlo),
        Eq => (llo == lhi && rlo == rhi && llo == rlo, lhi < rlo || rhi < llo),
        _ => unreachable!(),
    };
    if always {
        (1, 1)
    } else if never {
        (0, 0)
    } else {
        (0, 1)
    }
}

impl AstVisitor for Bounds {
    type Output = RResult<Interval>;

    fn visit_literal(&mut self, x: &Int) -> Self::Output {
        Ok((*x, *x))
    }

    fn visit_die_term(&mut self, term: &ast::DieTerm) -> Self::Output {
        let (qlo, qhi) = self.visit(&*term.quantity)?;
        let (slo, shi) = self.visit(&*term.size)?;
        let (qlo, qhi) = (qlo.max(0), qhi.max(0));
        let (slo, shi) = (slo.max(0), shi.max(0));

        let lo = checked(
            contributing_slots(qlo, term.keep),
            slot_minimum(slo, &term.transforms),
            Int::checked_mul,
        )?;
        let hi = checked(
            contributing_slots(qhi, term.keep),
            slot_maximum(shi, term.explode)?,
            Int::checked_mul,
        )?;
        Ok((lo, hi))
    }

    fn visit_parenthetical(&mut self, p: &ast::Node) -> Self::Output {
        self.visit(p)
    }

    fn visit_unary(&mut self, op: &UnaryOperator, r: &ast::Node) -> Self::Output {
        let (lo, hi) = self.visit(r)?;
        match op {
            UnaryOperator::Pos => Ok((lo, hi)),
            UnaryOperator::Neg => Ok((
                hi.checked_neg().ok_or(RollError::Overflow)?,
                lo.checked_neg().ok_or(RollError::Overflow)?,
            )),
        }
    }

    fn visit_binary(&mut self, l: &ast::Node, op: &BinaryOperator, r: &ast::Node) -> Self::Output {
        let lhs = self.visit(l)?;
        let rhs = self.visit(r)?;
        use BinaryOperator::*;
        match op {
            Add => Ok((
                checked(lhs.0, rhs.0, Int::checked_add)?,
                checked(lhs.1, rhs.1, Int::checked_add)?,
            )),
            Sub => Ok((
                checked(lhs.0, rhs.1, Int::checked_sub)?,
                checked(lhs.1, rhs.0, Int::checked_sub)?,
            )),
            Mul => corners(lhs, rhs, Int::checked_mul),
            Div => {
                guard_zero(rhs)?;
                corners(lhs, rhs, Int::checked_div)
            }
            Rem => rem_interval(lhs, rhs),
            Lt | Gt | Le | Ge | Eq => Ok(relation_interval(*op, lhs, rhs)),
        }
    }

    fn visit_call(&mut self, func: &Function, args: &[ast::Node]) -> Self::Output {
        match func {
            Function::Min => {
                if args.is_empty() {
                    return Err(RollError::value_error(
                        "min() requires at least one argument",
                    ));
                }
                let mut lo = Int::MAX;
                let mut hi = Int::MAX;
                for arg in args {
                    let (alo, ahi) = self.visit(arg)?;
                    lo = lo.min(alo);
                    hi = hi.min(ahi);
                }
                Ok((lo, hi))
            }
        }
    }
}

/// Expected-value analysis. Each retained slot contributes the mean face,
/// `(1 + size) / 2`.
struct Average;

impl AstVisitor for Average {
    type Output = RResult<Float>;

    fn visit_literal(&mut self, x: &Int) -> Self::Output {
        Ok(*x as Float)
    }

    fn visit_die_term(&mut self, term: &ast::DieTerm) -> Self::Output {
        let quantity = self.visit(&*term.quantity)?.max(0.0);
        let size = self.visit(&*term.size)?.max(0.0);
        let slots = match term.keep {
            Some(k) => quantity.min(k as Float),
            None => quantity,
        };
        Ok((1.0 + size) / 2.0 * slots)
    }

    fn visit_parenthetical(&mut self, p: &ast::Node) -> Self::Output {
        self.visit(p)
    }

    fn visit_unary(&mut self, op: &UnaryOperator, r: &ast::Node) -> Self::Output {
        let operand = self.visit(r)?;
        match op {
            UnaryOperator::Pos => Ok(operand),
            UnaryOperator::Neg => Ok(-operand),
        }
    }

    fn visit_binary(&mut self, l: &ast::Node, op: &BinaryOperator, r: &ast::Node) -> Self::Output {
        let lhs = self.visit(l)?;
        let rhs = self.visit(r)?;
        use BinaryOperator::*;
        Ok(match op {
            Add => lhs + rhs,
            Sub => lhs - rhs,
            Mul => lhs * rhs,
            Div => {
                if rhs == 0.0 {
                    return Err(RollError::ZeroDivision);
                }
                lhs / rhs
            }
            Rem => {
                if rhs == 0.0 {
                    return Err(RollError::ZeroDivision);
                }
                lhs % rhs
            }
            Lt => bool_avg(lhs < rhs),
            Gt => bool_avg(lhs > rhs),
            Le => bool_avg(lhs <= rhs),
            Ge => bool_avg(lhs >= rhs),
            Eq => bool_avg((lhs - rhs).abs() < Float::EPSILON),
        })
    }

    fn visit_call(&mut self, func: &Function, args: &[ast::Node]) -> Self::Output {
        match func {
            Function::Min => {
                let mut best: Option<Float> = None;
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

fn bool_avg(b: bool) -> Float {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn bounds(input: &str) -> (Int, Int) {
        let expression = parse(input).unwrap();
        (
            expression.potential_minimum().unwrap(),
            expression.potential_maximum().unwrap(),
        )
    }

    #[test]
    fn test_plain_term() {
        assert_eq!(bounds("2d6+3"), (5, 15));
    }

    #[test]
    fn test_explode_widens_maximum() {
        assert_eq!(bounds("7d8!"), (7, 560));
    }

    #[test]
    fn test_nested_quantity() {
        assert_eq!(bounds("(1d2)d3"), (1, 6));
    }

    #[test]
    fn test_chained_terms_with_keep() {
        assert_eq!(bounds("6d5d4k3d2k1"), (1, 2));
    }

    #[test]
    fn test_negation_swaps_bounds() {
        assert_eq!(bounds("0-2d6"), (-12, -2));
        assert_eq!(bounds("-(2d6)"), (-12, -2));
    }

    #[test]
    fn test_transform_raises_minimum() {
        assert_eq!(bounds("3d6t1:2"), (6, 18));
        assert_eq!(bounds("3d6t1"), (18, 18));
    }

    #[test]
    fn test_arithmetic_is_exact_without_dice() {
        assert_eq!(bounds("1+2-(3*4/5)%6"), (1, 1));
    }

    #[test]
    fn test_min_call_bounds() {
        assert_eq!(bounds("min(1d4, 3)"), (1, 3));
    }

    #[test]
    fn test_relational_bounds() {
        assert_eq!(bounds("1d6 > 0"), (1, 1));
        // 6 is the highest face, so exceeding 6 is impossible.
        assert_eq!(bounds("1d6 > 5"), (0, 1));
        assert_eq!(bounds("1d6 > 6"), (0, 0));
        assert_eq!(bounds("1d6 > 100"), (0, 0));
    }

    #[test]
    fn test_remainder_bounds_cover_all_outcomes() {
        assert_eq!(bounds("1d6 % 4"), (0, 3));
        assert_eq!(bounds("(0-1d6) % 4"), (-3, 0));
        assert_eq!(bounds("1d3 % 10"), (1, 3));
    }

    #[test]
    fn test_rolled_remainders_stay_within_bounds() {
        use crate::roll::ctx::{Limits, RollContext};
        use crate::roll::source::StepSource;

        let expression = parse("1d6 % 4").unwrap();
        let lo = expression.potential_minimum().unwrap();
        let hi = expression.potential_maximum().unwrap();
        for seed in 0..6 {
            let mut ctx = RollContext::new(Limits::default(), StepSource::new(seed, 1));
            let total = ctx.roll(&expression).unwrap().total().unwrap();
            let total = total.as_int();
            assert!(
                (lo..=hi).contains(&total),
                "{} outside [{}, {}]",
                total,
                lo,
                hi
            );
        }
    }

    #[test]
    fn test_average() {
        let avg = |s: &str| parse(s).unwrap().potential_average().unwrap();
        assert!((avg("2d6+3") - 10.0).abs() < 1e-9);
        assert!((avg("4d6k2") - 7.0).abs() < 1e-9);
        assert!((avg("1d6/2") - 1.75).abs() < 1e-9);
    }
}
