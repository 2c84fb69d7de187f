use crate::common::*;
use logos::{Lexer as LogosLexer, Logos};
use logos_iter::{LogosIter, PeekableLexer};
use std::fmt;

pub type Lexer<'a> = PeekableLexer<'a, LogosLexer<'a, TokenKind>, TokenKind>;

pub fn lexer(s: &str) -> Lexer {
    TokenKind::lexer(s).peekable_lexer()
}

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+", |lex| lex.slice().parse())]
    Integer(Int),

    #[token("d")]
    Die,
    #[token("!")]
    Bang,
    #[token("e")]
    Explode,
    #[token("t")]
    Transform,
    #[token("k")]
    Keep,
    #[token(":")]
    Colon,

    #[token("min")]
    Min,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("=")]
    Equal,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub const UNARY_OPS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const COMPARISON_OPS: &'static [Self] = &[
        Self::LessThan,
        Self::GreaterThan,
        Self::LessEqual,
        Self::GreaterEqual,
        Self::Equal,
    ];

    pub const ADDITION_OPS: &'static [Self] = &[Self::Plus, Self::Minus];

    pub const MULTIPLICATION_OPS: &'static [Self] = &[Self::Star, Self::Slash, Self::Percent];

    pub const MODIFIERS: &'static [Self] =
        &[Self::Bang, Self::Explode, Self::Transform, Self::Keep];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer(_) => "<integer>",
            Die => "'d'",
            Bang => "'!'",
            Explode => "'e'",
            Transform => "'t'",
            Keep => "'k'",
            Colon => "':'",
            Min => "'min'",
            LeftParen => "'('",
            RightParen => "')'",
            Comma => "','",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            LessThan => "'<'",
            GreaterThan => "'>'",
            Equal => "'='",
            Error => "<error>",
        }
    }

    pub fn as_unary_op(&self) -> Option<UnaryOperator> {
        use UnaryOperator::*;
        Some(match self {
            Self::Plus => Pos,
            Self::Minus => Neg,
            _ => return None,
        })
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            Self::Percent => Rem,
            Self::LessThan => Lt,
            Self::GreaterThan => Gt,
            Self::LessEqual => Le,
            Self::GreaterEqual => Ge,
            Self::Equal => Eq,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(s: &str) -> Vec<TokenKind> {
        TokenKind::lexer(s).collect()
    }

    #[test]
    fn test_lex_die_term() {
        use TokenKind::*;
        assert_eq!(
            lex("3d6k2"),
            vec![Integer(3), Die, Integer(6), Keep, Integer(2)]
        );
        assert_eq!(lex("7d8!"), vec![Integer(7), Die, Integer(8), Bang]);
        assert_eq!(
            lex("d20 e 19"),
            vec![Die, Integer(20), Explode, Integer(19)]
        );
        assert_eq!(
            lex("3d6t1:2"),
            vec![Integer(3), Die, Integer(6), Transform, Integer(1), Colon, Integer(2)]
        );
    }

    #[test]
    fn test_lex_relational_and_min() {
        use TokenKind::*;
        assert_eq!(
            lex("min(1,2)>=3"),
            vec![Min, LeftParen, Integer(1), Comma, Integer(2), RightParen, GreaterEqual, Integer(3)]
        );
    }

    #[test]
    fn test_lex_error() {
        assert!(lex("3d6 cheese").contains(&TokenKind::Error));
    }
}
