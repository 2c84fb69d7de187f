//! The inverse problem: given a target numeric range, search combinations of
//! standard die sizes for an expression whose achievable range best
//! approximates it.

use crate::common::*;
use crate::roll::{RResult, RollError};
use std::fmt;

/// Standard die sizes tried by the search, smallest first.
pub const DEFAULT_PALETTE: [Int; 9] = [2, 3, 4, 6, 8, 10, 12, 20, 100];

/// One candidate standard-die term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollPrototype {
    pub quantity: Int,
    pub die: Int,
}

impl fmt::Display for RollPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.quantity, self.die)
    }
}

/// An ordered set of prototypes plus an additive constant. Die sizes within
/// one collection are pairwise distinct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RollCollection {
    dice: Vec<RollPrototype>,
    adjustment: Int,
}

impl RollCollection {
    pub fn lower(&self) -> Int {
        self.lower_raw() as Int + self.adjustment
    }

    pub fn upper(&self) -> Int {
        self.upper_raw() as Int + self.adjustment
    }

    pub fn total_quantity(&self) -> Int {
        self.lower_raw() as Int
    }

    pub fn adjustment(&self) -> Int {
        self.adjustment
    }

    pub fn dice(&self) -> &[RollPrototype] {
        &self.dice
    }

    /// Sum of quantities, before adjustment. Each die contributes its
    /// quantity to the achievable minimum.
    fn lower_raw(&self) -> i64 {
        self.dice.iter().map(|p| p.quantity as i64).sum()
    }

    fn upper_raw(&self) -> i64 {
        self.dice
            .iter()
            .map(|p| p.quantity as i64 * p.die as i64)
            .sum()
    }

    fn contains_die(&self, die: Int) -> bool {
        self.dice.iter().any(|p| p.die == die)
    }

    fn with(&self, prototype: RollPrototype) -> Self {
        let mut dice = self.dice.clone();
        dice.push(prototype);
        Self {
            dice,
            adjustment: self.adjustment,
        }
    }

    /// Renders the collection as roll notation: `QdD` terms joined by `+`,
    /// the adjustment appended as a signed literal when non-zero. An empty
    /// collection is just its constant.
    pub fn build(&self) -> String {
        if self.dice.is_empty() {
            return self.adjustment.to_string();
        }
        let mut out = String::new();
        for (i, prototype) in self.dice.iter().enumerate() {
            if i > 0 {
                out.push('+');
            }
            out.push_str(&prototype.to_string());
        }
        if self.adjustment > 0 {
            out.push('+');
        }
        if self.adjustment != 0 {
            out.push_str(&self.adjustment.to_string());
        }
        out
    }
}

/// Candidate ordering: span deviation first, then term count, total
/// quantity, and adjustment magnitude.
type Rank = (i64, usize, i64, i64);

pub struct Synthesizer {
    palette: Vec<Int>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl Synthesizer {
    pub fn new(palette: Vec<Int>) -> Self {
        Self { palette }
    }

    /// Builds an expression whose achievable range approximates
    /// `[lower, upper]` as closely as the palette allows, never overshooting
    /// `upper` before adjustment.
    pub fn synthesize(&self, lower: Int, upper: Int) -> RResult<String> {
        self.synthesize_offset(lower, upper, 0)
    }

    /// Like [`synthesize`](Self::synthesize), but for a caller already
    /// holding a constant `offset`: the search targets
    /// `[lower - offset, upper - offset]` and the rendered expression
    /// excludes the offset.
    pub fn synthesize_offset(&self, lower: Int, upper: Int, offset: Int) -> RResult<String> {
        if lower > upper {
            return Err(RollError::value_error(format!(
                "inverted range: {}..{}",
                lower, upper
            )));
        }
        let lower = lower.checked_sub(offset).ok_or(RollError::Overflow)?;
        let upper = upper.checked_sub(offset).ok_or(RollError::Overflow)?;

        let mut best: Option<(Rank, RollCollection)> = None;
        self.search(RollCollection::default(), lower as i64, upper as i64, &mut best);
        let (_, collection) = best.ok_or_else(|| RollError::value_error("empty search space"))?;
        Ok(collection.build())
    }

    fn search(
        &self,
        collection: RollCollection,
        lower: i64,
        upper: i64,
        best: &mut Option<(Rank, RollCollection)>,
    ) {
        let needed_lower = lower - collection.lower_raw();
        let needed_upper = upper - collection.upper_raw();
        if needed_lower >= needed_upper {
            accept(collection, lower, upper, best);
            return;
        }

        let cap = needed_upper - needed_lower + 1;
        let mut advanced = false;
        for &die in &self.palette {
            if collection.contains_die(die) {
                continue;
            }
            let base = cap / die as i64;
            for quantity in [base, base + 1] {
                if quantity < 1 {
                    continue;
                }
                let quantity: Int = match quantity.try_into() {
                    Ok(q) => q,
                    Err(_) => continue,
                };
                let derived = collection.with(RollPrototype { quantity, die });
                // Overshoot is disallowed; undershoot is iterated further.
                if derived.upper_raw() > upper {
                    continue;
                }
                advanced = true;
                self.search(derived, lower, upper, best);
            }
        }

        // No die advances this branch; its current span is still a
        // candidate, carrying whatever deficit remains.
        if !advanced {
            accept(collection, lower, upper, best);
        }
    }
}

fn accept(
    mut collection: RollCollection,
    lower: i64,
    upper: i64,
    best: &mut Option<(Rank, RollCollection)>,
) {
    let adjustment = lower - collection.lower_raw();
    collection.adjustment = match adjustment.try_into() {
        Ok(a) => a,
        Err(_) => return,
    };
    let deviation = (upper - (collection.upper_raw() + adjustment)).abs();
    let rank = (
        deviation,
        collection.dice.len(),
        collection.lower_raw(),
        adjustment.abs(),
    );
    if best.as_ref().map_or(true, |(existing, _)| rank < *existing) {
        *best = Some((rank, collection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn round_trip(lower: Int, upper: Int) -> String {
        let built = Synthesizer::default().synthesize(lower, upper).unwrap();
        let expression = parse(&built).unwrap();
        assert_eq!(expression.potential_minimum().unwrap(), lower, "{}", built);
        assert_eq!(expression.potential_maximum().unwrap(), upper, "{}", built);
        built
    }

    #[test]
    fn test_synthesize_five_to_twenty() {
        assert_eq!(round_trip(5, 20), "3d6+2");
    }

    #[test]
    fn test_round_trips() {
        assert_eq!(round_trip(1, 6), "1d6");
        assert_eq!(round_trip(2, 5), "1d4+1");
        assert_eq!(round_trip(10, 100), "10d10");
        round_trip(3, 4);
        round_trip(1, 100);
        round_trip(4, 17);
    }

    #[test]
    fn test_constant_range() {
        assert_eq!(Synthesizer::default().synthesize(7, 7).unwrap(), "7");
        assert_eq!(Synthesizer::default().synthesize(0, 0).unwrap(), "0");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = Synthesizer::default().synthesize(5, 4).unwrap_err();
        assert!(matches!(err, RollError::Value(_)));
    }

    #[test]
    fn test_offset_shifts_the_target() {
        // The caller already holds a +2; the expression covers [5, 20] and
        // the caller's constant brings it to [7, 22].
        let built = Synthesizer::default().synthesize_offset(7, 22, 2).unwrap();
        assert_eq!(built, "3d6+2");
    }

    #[test]
    fn test_collection_build() {
        let collection = RollCollection {
            dice: vec![
                RollPrototype { quantity: 2, die: 8 },
                RollPrototype { quantity: 1, die: 4 },
            ],
            adjustment: -3,
        };
        assert_eq!(collection.build(), "2d8+1d4-3");
        assert_eq!(collection.lower(), 0);
        assert_eq!(collection.upper(), 17);
    }
}
