use super::{ctx::RollContext, error::RollError, source::UniformSource, RResult};
use crate::common::*;
use crate::parse::ast;
use vec1::vec1;

/// Potential maximum of an exploding die is modeled as a fixed multiple of
/// its size. True explosion is unbounded; this is a deliberately
/// conservative, deterministic stand-in for "very large but bounded", a
/// modeling choice rather than a probabilistic guarantee.
pub const EXPLODE_SUPREMUM_FACTOR: Int = 10;

/// One die term after rolling: the resolved quantity/size, the modifiers
/// that were applied, and the retained slots.
#[derive(Debug, Clone, PartialEq)]
pub struct RolledTerm {
    pub quantity: Int,
    pub size: Int,
    pub explode: Explode,
    pub transforms: Vec<Transform>,
    pub keep: Option<UInt>,
    slots: Vec<Slot>,
}

/// One slot of a rolled term: its individual draws (explosions append) and
/// its final post-transform value.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub draws: NonEmpty<Int>,
    pub value: Int,
}

impl Slot {
    fn roll_new<R: UniformSource>(
        ctx: &mut RollContext<R>,
        size: Int,
        explode: Explode,
    ) -> RResult<Self> {
        let first = ctx.draw(size)?;
        let mut slot = Self {
            draws: vec1![first],
            value: first,
        };

        // Explosions accumulate into the slot's running total. The loop is
        // iterative and every draw is counted, so an adversarial source ends
        // in LimitExceeded instead of unbounded recursion.
        let mut last = first;
        while explode_applies(explode, size, last) {
            last = ctx.draw(size)?;
            slot.draws.push(last);
            slot.value = slot.value.checked_add(last).ok_or(RollError::Overflow)?;
        }

        Ok(slot)
    }

    pub fn exploded(&self) -> bool {
        self.draws.len() > 1
    }
}

fn explode_applies(explode: Explode, size: Int, drawn: Int) -> bool {
    match explode {
        Explode::None => false,
        Explode::Default => size > 0 && drawn == size,
        Explode::Specific(threshold) => size > 0 && drawn >= threshold,
    }
}

impl RolledTerm {
    pub(crate) fn roll_new<R: UniformSource>(
        ctx: &mut RollContext<R>,
        quantity: Int,
        size: Int,
        term: &ast::DieTerm,
    ) -> RResult<Self> {
        let mut slots = Vec::with_capacity(quantity as usize);
        for _ in 0..quantity {
            slots.push(Slot::roll_new(ctx, size, term.explode)?);
        }

        for slot in &mut slots {
            for rule in &term.transforms {
                slot.value = rule.apply(slot.value, size);
            }
        }

        if let Some(k) = term.keep {
            slots.sort_unstable_by(|a, b| b.value.cmp(&a.value));
            slots.truncate(k as usize);
        }

        Ok(Self {
            quantity,
            size,
            explode: term.explode,
            transforms: term.transforms.clone(),
            keep: term.keep,
            slots,
        })
    }

    /// Retained slot values, in outcome order.
    pub fn values(&self) -> impl Iterator<Item = Int> + '_ {
        self.slots.iter().map(|s| s.value)
    }

    /// Checked sum of the retained slots. Zero once the outcome has been
    /// drained.
    pub fn total(&self) -> RResult<Int> {
        self.values()
            .try_fold(0 as Int, |a, b| a.checked_add(b).ok_or(RollError::Overflow))
    }

    /// Consumes the outcome: the retained values are moved out and any later
    /// query of this term sees an empty sequence (total zero). Projections
    /// of one logical roll therefore never re-draw randomness.
    pub(crate) fn drain(&mut self) -> Vec<Int> {
        self.slots.drain(..).map(|s| s.value).collect()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

/// Per-slot minimum: the transform chain applied to the lowest face. A rule
/// that maps 1 away from 1 raises it to the mapped value.
pub(crate) fn slot_minimum(size: Int, transforms: &[Transform]) -> Int {
    let mut value = if size > 0 { 1 } else { 0 };
    for rule in transforms {
        value = rule.apply(value, size);
    }
    value
}

/// Per-slot maximum: the die size, scaled by the explode supremum factor
/// when the term explodes.
pub(crate) fn slot_maximum(size: Int, explode: Explode) -> RResult<Int> {
    match explode {
        Explode::None => Ok(size),
        _ => size
            .checked_mul(EXPLODE_SUPREMUM_FACTOR)
            .ok_or(RollError::Overflow),
    }
}

/// Number of slots that contribute to sum/min/max/average.
pub(crate) fn contributing_slots(quantity: Int, keep: Option<UInt>) -> Int {
    match keep {
        Some(k) => quantity.min(k as Int),
        None => quantity,
    }
}
