//! Token-level classification of raw input, shared by the evaluation and
//! template layers. These checks never allocate an expression tree unless
//! full parsing is required anyway.

use crate::parse::{self, TokenKind};
use logos::Logos;

/// How strictly the surrounding text is held to the roll grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The whole input must lex cleanly. Used for standalone expressions,
    /// where stray text means the input is not a roll at all.
    Strict,
    /// Unrecognized characters are skipped over. Used for text already known
    /// to contain roll syntax, such as template interiors.
    Lenient,
}

/// True iff the input contains a die term: a `d` followed by an integer or
/// an opening parenthesis.
pub fn contains_roll(s: &str, boundary: Boundary) -> bool {
    let mut pending_die = false;
    for token in TokenKind::lexer(s) {
        if token == TokenKind::Error {
            match boundary {
                Boundary::Strict => return false,
                Boundary::Lenient => {
                    pending_die = false;
                    continue;
                }
            }
        }
        if pending_die && matches!(token, TokenKind::Integer(_) | TokenKind::LeftParen) {
            return true;
        }
        pending_die = token == TokenKind::Die;
    }
    false
}

/// True iff the input parses and contains no die term, so it can be handed
/// to arithmetic evaluation directly.
pub fn is_arithmetic(s: &str) -> bool {
    parse::parse(s).map_or(false, |e| !e.has_roll())
}

/// True iff a relational operator is present, marking a boolean expression.
pub fn is_relational(s: &str) -> bool {
    TokenKind::lexer(s).any(|token| {
        token
            .as_binary_op()
            .map_or(false, |op| op.is_relational())
    })
}
