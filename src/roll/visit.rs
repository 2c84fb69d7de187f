use super::term::RolledTerm;
use super::tree::{
    RolledBinary, RolledCall, RolledLiteral, RolledNode, RolledParen, RolledUnary,
};

pub trait RolledVisitor {
    type Output;

    fn visit(&mut self, node: &RolledNode) -> Self::Output {
        node.accept(self)
    }

    fn visit_literal(&mut self, x: &RolledLiteral) -> Self::Output;

    fn visit_term(&mut self, term: &RolledTerm) -> Self::Output;

    fn visit_parenthetical(&mut self, p: &RolledParen) -> Self::Output;

    fn visit_unary(&mut self, u: &RolledUnary) -> Self::Output;

    fn visit_binary(&mut self, b: &RolledBinary) -> Self::Output;

    fn visit_call(&mut self, c: &RolledCall) -> Self::Output;
}

pub trait AcceptRolled<V: RolledVisitor + ?Sized> {
    fn accept(&self, v: &mut V) -> V::Output;
}

impl<V: RolledVisitor + ?Sized> AcceptRolled<V> for RolledNode {
    fn accept(&self, v: &mut V) -> V::Output {
        match self {
            Self::Literal(x) => v.visit_literal(x),
            Self::Term(term) => v.visit_term(term),
            Self::Parenthetical(p) => v.visit_parenthetical(p),
            Self::Unary(u) => v.visit_unary(u),
            Self::Binary(b) => v.visit_binary(b),
            Self::Call(c) => v.visit_call(c),
        }
    }
}
