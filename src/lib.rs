//! Dice-notation compiler and evaluator.
//!
//! Expressions such as `3d6+2`, `4d6k3`, `7d8!`, `(1d2)d5`, and `3d6t1:2k5`
//! are lexed, parsed into a tree, and resolved against an explicit
//! randomness source. A rolled outcome exposes its total, its individual
//! rolls, its theoretical bounds, and a boolean projection; the [`synth`]
//! module solves the inverse problem of building an expression for a target
//! range.
//!
//! ```
//! let rolled = dicemill::roll_str("3d6+2")?;
//! let total = rolled.total()?.as_int();
//! assert!((5..=20).contains(&total));
//! # Ok::<(), dicemill::RollError>(())
//! ```

pub mod arith;
pub mod common;
pub mod grammar;
pub mod parse;
pub mod roll;
pub mod synth;
pub mod template;

pub use common::{BinaryOperator, Explode, Function, Transform, UnaryOperator};
pub use parse::{parse, ParseError, ParseErrorKind};
pub use roll::{Limits, RResult, RollContext, RollError, Rolled, UniformSource, Value};
pub use synth::Synthesizer;

/// Parses and rolls `input` with thread-local randomness and default limits.
pub fn roll_str(input: &str) -> RResult<Rolled> {
    let expression = parse::parse(input)?;
    RollContext::with_source(rand::thread_rng()).roll(&expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d6_observes_both_bounds() {
        let expression = parse("d6").unwrap();
        let mut ctx = RollContext::with_source(rand::thread_rng());
        let (mut saw_low, mut saw_high) = (false, false);
        for _ in 0..1_000_000 {
            let total = ctx.roll(&expression).unwrap().total().unwrap().as_int();
            assert!((1..=6).contains(&total));
            saw_low |= total == 1;
            saw_high |= total == 6;
            if saw_low && saw_high {
                break;
            }
        }
        assert!(saw_low && saw_high);
    }

    #[test]
    fn test_roll_str_stays_in_range() {
        for _ in 0..100 {
            let rolled = roll_str("2d4+1").unwrap();
            let total = rolled.total().unwrap().as_int();
            assert!((3..=9).contains(&total));
        }
    }

    #[test]
    fn test_projections_share_one_outcome() {
        let mut rolled = roll_str("4d6k3").unwrap();
        let total = rolled.total().unwrap().as_int();
        let rolls = rolled.take_rolls();
        assert_eq!(rolls.len(), 3);
        assert_eq!(rolls.iter().sum::<i32>(), total);
        // The outcome is one-shot.
        assert!(rolled.take_rolls().is_empty());
        assert_eq!(rolled.total().unwrap().as_int(), 0);
    }
}
