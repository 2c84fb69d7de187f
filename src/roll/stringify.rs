use super::{
    term::RolledTerm,
    tree::{Outcome, RolledBinary, RolledCall, RolledLiteral, RolledNode, RolledParen, RolledUnary},
    visit::RolledVisitor,
    RResult,
};

/// Renders a rolled tree with each die term written as its addend list.
pub(crate) fn sum_expression(node: &RolledNode) -> String {
    SumExpression.visit(node)
}

/// Renders a rolled tree with each maximal non-relational subtree collapsed
/// to its evaluated total. Relational operators stay in the text so the
/// caller sees the comparison that was made.
pub(crate) fn total_expression(node: &RolledNode) -> RResult<String> {
    TotalExpression.collapse(node)
}

struct SumExpression;

impl RolledVisitor for SumExpression {
    type Output = String;

    fn visit_literal(&mut self, x: &RolledLiteral) -> String {
        x.0.to_string()
    }

    fn visit_term(&mut self, term: &RolledTerm) -> String {
        let values: Vec<String> = term.values().map(|v| v.to_string()).collect();
        match values.len() {
            0 => "0".to_owned(),
            1 => values.into_iter().next().unwrap(),
            _ => format!("({})", values.join(" + ")),
        }
    }

    fn visit_parenthetical(&mut self, p: &RolledParen) -> String {
        format!("({})", self.visit(&p.inner))
    }

    fn visit_unary(&mut self, u: &RolledUnary) -> String {
        format!("{}{}", u.op, self.visit(&u.operand))
    }

    fn visit_binary(&mut self, b: &RolledBinary) -> String {
        format!("{} {} {}", self.visit(&b.lhs), b.op, self.visit(&b.rhs))
    }

    fn visit_call(&mut self, c: &RolledCall) -> String {
        let args: Vec<String> = c.args.iter().map(|arg| self.visit(arg)).collect();
        format!("min({})", args.join(", "))
    }
}

fn has_relational(node: &RolledNode) -> bool {
    match node {
        RolledNode::Literal(_) | RolledNode::Term(_) => false,
        RolledNode::Parenthetical(p) => has_relational(&p.inner),
        RolledNode::Unary(u) => has_relational(&u.operand),
        RolledNode::Binary(b) => {
            b.op.is_relational() || has_relational(&b.lhs) || has_relational(&b.rhs)
        }
        RolledNode::Call(c) => c.args.iter().any(has_relational),
    }
}

struct TotalExpression;

impl TotalExpression {
    fn collapse(&mut self, node: &RolledNode) -> RResult<String> {
        if has_relational(node) {
            self.visit(node)
        } else {
            Ok(node.value()?.to_string())
        }
    }
}

impl RolledVisitor for TotalExpression {
    type Output = RResult<String>;

    fn visit_literal(&mut self, x: &RolledLiteral) -> Self::Output {
        Ok(x.0.to_string())
    }

    fn visit_term(&mut self, term: &RolledTerm) -> Self::Output {
        Ok(term.total()?.to_string())
    }

    fn visit_parenthetical(&mut self, p: &RolledParen) -> Self::Output {
        Ok(format!("({})", self.collapse(&p.inner)?))
    }

    fn visit_unary(&mut self, u: &RolledUnary) -> Self::Output {
        Ok(format!("{}{}", u.op, self.collapse(&u.operand)?))
    }

    fn visit_binary(&mut self, b: &RolledBinary) -> Self::Output {
        Ok(format!(
            "{} {} {}",
            self.collapse(&b.lhs)?,
            b.op,
            self.collapse(&b.rhs)?
        ))
    }

    fn visit_call(&mut self, c: &RolledCall) -> Self::Output {
        let args = c
            .args
            .iter()
            .map(|arg| self.collapse(arg))
            .collect::<RResult<Vec<_>>>()?;
        Ok(format!("min({})", args.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::roll::ctx::{Limits, RollContext};
    use crate::roll::source::StepSource;
    use crate::roll::tree::Rolled;

    fn roll(input: &str) -> Rolled {
        let expression = parse(input).unwrap();
        RollContext::new(Limits::default(), StepSource::new(0, 1))
            .roll(&expression)
            .unwrap()
    }

    #[test]
    fn test_sum_expression() {
        assert_eq!(roll("3d6+2").to_sum_expression(), "(1 + 2 + 3) + 2");
        assert_eq!(roll("1d6").to_sum_expression(), "1");
        assert_eq!(roll("0d6+1").to_sum_expression(), "0 + 1");
    }

    #[test]
    fn test_sum_expression_preserves_arithmetic() {
        assert_eq!(roll("(1+2)*3").to_sum_expression(), "(1 + 2) * 3");
    }

    #[test]
    fn test_total_expression_collapses_sides() {
        // 3d6 draws 1, 2, 3.
        assert_eq!(roll("3d6+2 > 10").to_total_expression().unwrap(), "8 > 10");
    }

    #[test]
    fn test_total_expression_without_relation() {
        assert_eq!(roll("3d6+2").to_total_expression().unwrap(), "8");
    }

    #[test]
    fn test_sum_expression_after_drain_shows_empty_terms() {
        let mut rolled = roll("3d6+2");
        rolled.take_rolls();
        assert_eq!(rolled.to_sum_expression(), "0 + 2");
    }
}
