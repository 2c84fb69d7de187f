pub mod ctx;
mod error;
mod num;
mod potential;
pub mod source;
mod stringify;
pub mod term;
pub mod tree;
pub mod visit;

pub use ctx::{Limits, RollContext};
pub use error::RollError;
pub use num::Value;
pub use source::UniformSource;
pub use term::{RolledTerm, Slot, EXPLODE_SUPREMUM_FACTOR};
pub use tree::{Outcome, Rolled, RolledNode};

pub type RResult<T> = Result<T, RollError>;
