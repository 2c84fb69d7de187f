use super::{
    error::RollError,
    source::UniformSource,
    term::RolledTerm,
    tree::{
        Outcome, Rolled, RolledBinary, RolledCall, RolledLiteral, RolledNode, RolledParen,
        RolledUnary,
    },
    RResult,
};
use crate::common::*;
use crate::parse::{ast, visit::AstVisitor};

/// Guard rails applied while resolving a roll. They bound the work a single
/// evaluation may do, not the values it may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest quantity a single die term may resolve to.
    pub max_quantity: u64,
    /// Largest size a single die may resolve to.
    pub max_die_size: u64,
    /// Cap on individual draws across one evaluation, explosions included.
    /// `None` disables the cap.
    pub max_rolls: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_quantity: 1_000_000,
            max_die_size: 1_000_000,
            max_rolls: Some(5_000_000),
        }
    }
}

/// Carries the randomness source and limits through an evaluation. All
/// randomness flows through the context; nothing else in the crate draws.
pub struct RollContext<R> {
    limits: Limits,
    source: R,
    rolls: u64,
}

impl<R: UniformSource> RollContext<R> {
    pub fn new(limits: Limits, source: R) -> Self {
        Self {
            limits,
            source,
            rolls: 0,
        }
    }

    pub fn with_source(source: R) -> Self {
        Self::new(Limits::default(), source)
    }

    /// Resolves every die term in the expression against the source,
    /// producing an outcome that evaluates without further randomness. The
    /// draw counter covers one call; it resets on the next.
    pub fn roll(&mut self, expression: &ast::Expression) -> RResult<Rolled> {
        self.rolls = 0;
        let root = self.visit(expression)?;
        Ok(Rolled::new(root, expression.clone()))
    }

    /// One draw from a die of `size` faces, in `1..=size`. A die of no faces
    /// yields zero without consuming the source.
    pub(crate) fn draw(&mut self, size: Int) -> RResult<Int> {
        if size <= 0 {
            return Ok(0);
        }
        self.count_roll()?;
        Ok(self.source.next(size as UInt) as Int + 1)
    }

    fn count_roll(&mut self) -> RResult<()> {
        self.rolls += 1;
        if let Some(max) = self.limits.max_rolls {
            if self.rolls > max {
                return Err(RollError::LimitExceeded("rolls", self.rolls, max));
            }
        }
        Ok(())
    }

    /// Resolves a quantity or size operand, which may itself contain die
    /// terms. Resolution draws are counted but the intermediate outcome is
    /// consumed here; it does not appear in the final tree.
    fn resolve(&mut self, node: &ast::Node, what: &'static str, max: u64) -> RResult<Int> {
        let rolled = self.visit(node)?;
        let value = rolled.value()?.as_int();
        if value < 0 {
            return Err(RollError::value_error(format!(
                "negative {}: {}",
                what, value
            )));
        }
        if value as u64 > max {
            return Err(RollError::LimitExceeded(what, value as u64, max));
        }
        Ok(value)
    }
}

impl<R: UniformSource> AstVisitor for RollContext<R> {
    type Output = RResult<RolledNode>;

    fn visit_literal(&mut self, x: &Int) -> Self::Output {
        Ok(RolledNode::Literal(RolledLiteral(*x)))
    }

    fn visit_die_term(&mut self, term: &ast::DieTerm) -> Self::Output {
        let quantity = self.resolve(&term.quantity, "quantity", self.limits.max_quantity)?;
        let size = self.resolve(&term.size, "die size", self.limits.max_die_size)?;
        RolledTerm::roll_new(self, quantity, size, term).map(RolledNode::Term)
    }

    fn visit_parenthetical(&mut self, p: &ast::Node) -> Self::Output {
        Ok(RolledNode::Parenthetical(RolledParen {
            inner: Box::new(self.visit(p)?),
        }))
    }

    fn visit_unary(&mut self, op: &UnaryOperator, r: &ast::Node) -> Self::Output {
        Ok(RolledNode::Unary(RolledUnary {
            op: *op,
            operand: Box::new(self.visit(r)?),
        }))
    }

    fn visit_binary(&mut self, l: &ast::Node, op: &BinaryOperator, r: &ast::Node) -> Self::Output {
        Ok(RolledNode::Binary(RolledBinary {
            op: *op,
            lhs: Box::new(self.visit(l)?),
            rhs: Box::new(self.visit(r)?),
        }))
    }

    fn visit_call(&mut self, func: &Function, args: &[ast::Node]) -> Self::Output {
        let args = args
            .iter()
            .map(|arg| self.visit(arg))
            .collect::<RResult<Vec<_>>>()?;
        Ok(RolledNode::Call(RolledCall {
            function: *func,
            args,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::roll::num::Value;
    use crate::roll::source::StepSource;

    fn roll(input: &str, limits: Limits, source: StepSource) -> RResult<Rolled> {
        let expression = parse(input).unwrap();
        RollContext::new(limits, source).roll(&expression)
    }

    #[test]
    fn test_simple_roll() {
        // Draws cycle 1, 2, 3 on a d6.
        let rolled = roll("3d6", Limits::default(), StepSource::new(0, 1)).unwrap();
        assert_eq!(rolled.total().unwrap(), Value::Int(6));
    }

    #[test]
    fn test_nested_quantity() {
        // The d2 resolves to 2, so two d5 slots follow.
        let rolled = roll("(1d2)d5", Limits::default(), StepSource::new(1, 1)).unwrap();
        match rolled.root() {
            RolledNode::Term(term) => {
                assert_eq!(term.quantity, 2);
                assert_eq!(term.size, 5);
            }
            other => panic!("expected a term, got {:?}", other),
        }
        assert_eq!(rolled.total().unwrap(), Value::Int(7));
    }

    #[test]
    fn test_nested_size() {
        let rolled = roll("1d(2d3)", Limits::default(), StepSource::new(0, 1)).unwrap();
        match rolled.root() {
            // 2d3 draws 1 and 2, so this is a d3.
            RolledNode::Term(term) => assert_eq!(term.size, 3),
            other => panic!("expected a term, got {:?}", other),
        }
    }

    #[test]
    fn test_overflow_surfaces() {
        // The drawn values sum past the i32 range; the overflow is
        // reported when totalled, never wrapped.
        let rolled = roll("100000d100000", Limits::default(), StepSource::new(50_000, 1)).unwrap();
        assert!(matches!(rolled.total(), Err(RollError::Overflow)));
    }

    #[test]
    fn test_bool_coercion_compares_against_the_range() {
        // A 1 sits in the lower half of 1..=6; a 6 does not.
        let low = roll("1d6", Limits::default(), StepSource::new(0, 1)).unwrap();
        assert!(low.as_bool().unwrap());
        let high = roll("1d6", Limits::default(), StepSource::new(5, 1)).unwrap();
        assert!(!high.as_bool().unwrap());
    }

    #[test]
    fn test_unprojectable_bounds_still_roll() {
        // The divisor interval spans zero, so the bounds cannot be
        // projected, but the concrete draw divides cleanly.
        let rolled = roll("1/(1d6-3)", Limits::default(), StepSource::new(0, 1)).unwrap();
        assert_eq!(rolled.total().unwrap().as_int(), 0);
        assert!(matches!(
            rolled.potential_minimum(),
            Err(RollError::ZeroDivision)
        ));
    }

    #[test]
    fn test_quantity_limit() {
        let limits = Limits {
            max_quantity: 10,
            ..Limits::default()
        };
        let err = roll("11d6", limits, StepSource::new(0, 1)).unwrap_err();
        assert!(matches!(err, RollError::LimitExceeded("quantity", 11, 10)));
    }

    #[test]
    fn test_die_size_limit() {
        let limits = Limits {
            max_die_size: 100,
            ..Limits::default()
        };
        let err = roll("1d101", limits, StepSource::new(0, 1)).unwrap_err();
        assert!(matches!(err, RollError::LimitExceeded("die size", 101, 100)));
    }

    #[test]
    fn test_negative_operand_rejected() {
        let err = roll("2d(0-3)", Limits::default(), StepSource::new(0, 1)).unwrap_err();
        assert!(matches!(err, RollError::Value(_)));
    }

    #[test]
    fn test_roll_counter_resets_between_evaluations() {
        let limits = Limits {
            max_rolls: Some(10),
            ..Limits::default()
        };
        let expression = parse("6d6").unwrap();
        let mut ctx = RollContext::new(limits, StepSource::new(0, 1));
        assert!(ctx.roll(&expression).is_ok());
        assert!(ctx.roll(&expression).is_ok());
    }

    #[test]
    fn test_roll_limit_spans_nested_resolution() {
        let limits = Limits {
            max_rolls: Some(3),
            ..Limits::default()
        };
        // Resolving the quantity costs a draw, leaving too few for the term.
        let err = roll("(1d2)d5+3d5", limits, StepSource::new(1, 1)).unwrap_err();
        assert!(matches!(err, RollError::LimitExceeded("rolls", ..)));
    }
}
