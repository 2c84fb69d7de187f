use crate::common::UInt;
use rand::Rng;

/// The randomness capability consumed by the evaluator: a uniform integer
/// in `[0, exclusive_upper)`. Thread safety is the implementor's concern;
/// the evaluator itself holds no shared state.
pub trait UniformSource {
    fn next(&mut self, exclusive_upper: UInt) -> UInt;
}

impl<R: Rng> UniformSource for R {
    fn next(&mut self, exclusive_upper: UInt) -> UInt {
        self.gen_range(0..exclusive_upper)
    }
}

#[cfg(test)]
pub(crate) use step::StepSource;

#[cfg(test)]
mod step {
    use super::*;

    /// Deterministic source cycling `initial, initial + step, ...` modulo
    /// whatever bound it is asked for.
    pub(crate) struct StepSource {
        current: UInt,
        step: UInt,
    }

    impl StepSource {
        pub fn new(initial: UInt, step: UInt) -> Self {
            Self {
                current: initial,
                step,
            }
        }
    }

    impl UniformSource for StepSource {
        fn next(&mut self, exclusive_upper: UInt) -> UInt {
            let ret = self.current % exclusive_upper;
            self.current = self.current.wrapping_add(self.step);
            ret
        }
    }
}
