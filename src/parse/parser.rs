use super::{ast::*, lexer::*};
use crate::common::*;
use logos_iter::LogosIter;
use std::fmt;
use std::ops::Range;

type PResult<T = Node> = Result<T, ParseError>;

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub slice: String,
}

#[derive(Debug, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: Option<TokenKind>,
        expected: Vec<TokenKind>,
    },
    UnexpectedString {
        expected: Vec<TokenKind>,
    },
    TrailingInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token: found {:?}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedString { expected } => {
                write!(f, "expected ")?;
                fmt_expected(expected, f)
            }
            Self::TrailingInput => {
                write!(f, "unexpected trailing input after a complete expression")
            }
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let len = expected.len();

    if expected.is_empty() {
        Ok(())
    } else if len == 1 {
        f.write_str(expected[0].as_str())
    } else if len == 2 {
        write!(f, "{} or {}", expected[0].as_str(), expected[1].as_str())
    } else {
        for exp in &expected[..len - 1] {
            write!(f, "{}, ", exp.as_str())?;
        }
        write!(f, "or {}", expected[len - 1].as_str())
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { lexer: lexer(s) }
    }

    pub fn parse(mut self) -> Result<Expression, ParseError> {
        let roll = self.parse_node()?;
        if self.lexer.peek().is_some() {
            return self.error(ParseErrorKind::TrailingInput);
        }
        Ok(Expression::new(roll))
    }

    fn advance(&mut self) -> Option<TokenKind> {
        self.lexer.next()
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn matches_any(&mut self, options: &[TokenKind]) -> bool {
        self.lexer
            .peek()
            .map_or(false, |peeked| options.contains(peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.matches(expected) {
            self.lexer.next();
            Ok(())
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    fn consume_integer(&mut self) -> PResult<Int> {
        match self.lexer.peek() {
            Some(&TokenKind::Integer(x)) => {
                self.lexer.next();
                Ok(x)
            }
            _ => self.unexpected_token(vec![TokenKind::Integer(0)]),
        }
    }

    fn error<T>(&mut self, kind: ParseErrorKind) -> PResult<T> {
        Err(ParseError {
            kind,
            span: self.lexer.span(),
            slice: self.lexer.slice().to_string(),
        })
    }

    fn unexpected_token<T>(&mut self, expected: Vec<TokenKind>) -> PResult<T> {
        let found = self.lexer.next();
        if matches!(found, Some(TokenKind::Error)) {
            self.error(ParseErrorKind::UnexpectedString { expected })
        } else {
            self.error(ParseErrorKind::UnexpectedToken { found, expected })
        }
    }

    fn parse_node(&mut self) -> PResult {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult {
        let mut lhs = self.parse_addition()?;

        while self.matches_any(TokenKind::COMPARISON_OPS) {
            let op = self.binary_op();
            let rhs = self.parse_addition()?;

            lhs = Node::Binary(Box::new(lhs), op, Box::new(rhs));
        }

        Ok(lhs)
    }

    fn parse_addition(&mut self) -> PResult {
        let mut lhs = self.parse_multiplication()?;

        while self.matches_any(TokenKind::ADDITION_OPS) {
            let op = self.binary_op();
            let rhs = self.parse_multiplication()?;

            lhs = Node::Binary(Box::new(lhs), op, Box::new(rhs));
        }

        Ok(lhs)
    }

    // Subtraction and division associate left, so this builds the tree in a
    // loop instead of recursing into the same level on the right.
    fn parse_multiplication(&mut self) -> PResult {
        let mut lhs = self.parse_unary_prefix()?;

        loop {
            if self.matches_any(TokenKind::MULTIPLICATION_OPS) {
                let op = self.binary_op();
                let rhs = self.parse_unary_prefix()?;
                lhs = Node::Binary(Box::new(lhs), op, Box::new(rhs));
            } else if self.matches(TokenKind::LeftParen) {
                // Adjacent parenthetical groups imply multiplication.
                let rhs = self.parse_unary_prefix()?;
                lhs = Node::Binary(Box::new(lhs), BinaryOperator::Mul, Box::new(rhs));
            } else {
                break;
            }
        }

        Ok(lhs)
    }

    fn binary_op(&mut self) -> BinaryOperator {
        let token = self.advance().expect("operator token was peeked");
        token.as_binary_op().expect("token is a binary operator")
    }

    fn parse_unary_prefix(&mut self) -> PResult {
        if self.matches_any(TokenKind::UNARY_OPS) {
            let token = self.advance().expect("operator token was peeked");
            let op = token.as_unary_op().expect("token is a unary operator");
            let rhs = self.parse_unary_prefix()?;

            Ok(Node::Unary(op, Box::new(rhs)))
        } else {
            self.parse_dice()
        }
    }

    // A die chain associates left: `6d5d4k3` is `(6d5)d4k3`, the previous
    // term becoming the quantity of the next.
    fn parse_dice(&mut self) -> PResult {
        let mut node = if self.matches(TokenKind::Die) {
            // Quantity defaults to 1 when omitted.
            Node::Literal(1)
        } else {
            self.parse_atom()?
        };

        while self.matches(TokenKind::Die) {
            self.advance();
            let size = self.parse_operand()?;
            let mut term = DieTerm::new(node, size);
            self.parse_modifiers(&mut term)?;
            node = Node::DieTerm(term);
        }

        Ok(node)
    }

    // Quantity/size operand: a plain integer or a parenthetical
    // sub-expression (which may itself contain rolls).
    fn parse_operand(&mut self) -> PResult {
        match self.lexer.peek() {
            Some(TokenKind::Integer(_)) => Ok(Node::Literal(self.consume_integer()?)),
            Some(TokenKind::LeftParen) => self.parse_parenthetical(),
            _ => self.unexpected_token(vec![TokenKind::Integer(0), TokenKind::LeftParen]),
        }
    }

    fn parse_modifiers(&mut self, term: &mut DieTerm) -> PResult<()> {
        while self.matches_any(TokenKind::MODIFIERS) {
            match self.advance().expect("modifier token was peeked") {
                TokenKind::Bang => term.explode = Explode::Default,
                TokenKind::Explode => term.explode = Explode::Specific(self.consume_integer()?),
                TokenKind::Transform => {
                    let from = self.consume_integer()?;
                    let rule = if self.matches(TokenKind::Colon) {
                        self.advance();
                        Transform::Mapped(from, self.consume_integer()?)
                    } else {
                        Transform::Single(from)
                    };
                    term.transforms.push(rule);
                }
                TokenKind::Keep => term.keep = Some(self.consume_integer()? as UInt),
                _ => unreachable!(),
            }
        }
        Ok(())
    }

    fn parse_atom(&mut self) -> PResult {
        match self.lexer.peek() {
            Some(TokenKind::Integer(_)) => Ok(Node::Literal(self.consume_integer()?)),
            Some(TokenKind::LeftParen) => self.parse_parenthetical(),
            Some(TokenKind::Min) => self.parse_call(),
            _ => self.unexpected_token(vec![
                TokenKind::LeftParen,
                TokenKind::Integer(0),
                TokenKind::Die,
            ]),
        }
    }

    fn parse_parenthetical(&mut self) -> PResult {
        self.consume(TokenKind::LeftParen)?;
        let inner = self.parse_node()?;
        self.consume(TokenKind::RightParen)?;
        Ok(Node::Parenthetical(Box::new(inner)))
    }

    fn parse_call(&mut self) -> PResult {
        self.consume(TokenKind::Min)?;
        self.consume(TokenKind::LeftParen)?;

        let mut args = vec![self.parse_node()?];
        while self.matches(TokenKind::Comma) {
            self.advance();
            args.push(self.parse_node()?);
        }
        self.consume(TokenKind::RightParen)?;

        Ok(Node::Call(Function::Min, args))
    }
}
