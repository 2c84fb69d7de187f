use std::fmt::{self, Write};
pub use vec1::vec1;

/// The integer type all results are guaranteed correct for.
pub type Int = i32;
pub type UInt = u32;
pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Pos,
    Neg,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Pos => '+',
            Self::Neg => '-',
        };
        f.write_char(c)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
}

impl BinaryOperator {
    /// Relational operators produce booleans and mark a boolean expression.
    pub const fn is_relational(&self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge | Self::Eq)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "=",
        };
        f.write_str(s)
    }
}

/// Built-in functions the evaluator understands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Function {
    Min,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => f.write_str("min"),
        }
    }
}

/// Explode mode of a die term.
///
/// `Default` re-rolls on the maximum face; `Specific(t)` re-rolls on any
/// value `>= t`. Additional draws accumulate into the originating slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Explode {
    None,
    Default,
    Specific(Int),
}

impl fmt::Display for Explode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Default => f.write_char('!'),
            Self::Specific(t) => write!(f, "e{}", t),
        }
    }
}

/// A single transform rule, applied per slot in declaration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Transform {
    /// `t v`: a slot totalling `v` becomes the die's maximum face value.
    Single(Int),
    /// `t from:to`: a slot equal to `from` becomes `to`.
    Mapped(Int, Int),
}

impl Transform {
    /// Applies this rule to one slot value. `face_max` is the die's maximum
    /// face, the replacement target of `Single`.
    pub fn apply(&self, value: Int, face_max: Int) -> Int {
        match *self {
            Self::Single(v) if value == v => face_max,
            Self::Mapped(from, to) if value == from => to,
            _ => value,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => write!(f, "t{}", v),
            Self::Mapped(from, to) => write!(f, "t{}:{}", from, to),
        }
    }
}
