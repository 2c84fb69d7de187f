use crate::common::*;
use std::fmt;

/// A parsed roll expression, immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub(crate) roll: Node,
}

impl Expression {
    pub(crate) fn new(roll: Node) -> Self {
        Self { roll }
    }

    pub fn root(&self) -> &Node {
        &self.roll
    }

    /// True iff the expression contains at least one die term.
    pub fn has_roll(&self) -> bool {
        self.roll.has_roll()
    }

    /// True iff a relational operator appears anywhere in the tree,
    /// marking the expression as boolean.
    pub fn has_relational(&self) -> bool {
        self.roll.has_relational()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.roll, f)
    }
}

impl std::str::FromStr for Expression {
    type Err = super::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(Int),
    DieTerm(DieTerm),
    Parenthetical(Box<Node>),
    Unary(UnaryOperator, Box<Node>),
    Binary(Box<Node>, BinaryOperator, Box<Node>),
    Call(Function, Vec<Node>),
}

impl Node {
    pub fn has_roll(&self) -> bool {
        match self {
            Self::Literal(_) => false,
            Self::DieTerm(_) => true,
            Self::Parenthetical(x) => x.has_roll(),
            Self::Unary(_, x) => x.has_roll(),
            Self::Binary(l, _, r) => l.has_roll() || r.has_roll(),
            Self::Call(_, args) => args.iter().any(Node::has_roll),
        }
    }

    pub fn has_relational(&self) -> bool {
        match self {
            Self::Literal(_) | Self::DieTerm(_) => false,
            Self::Parenthetical(x) => x.has_relational(),
            Self::Unary(_, x) => x.has_relational(),
            Self::Binary(l, op, r) => {
                op.is_relational() || l.has_relational() || r.has_relational()
            }
            Self::Call(_, args) => args.iter().any(Node::has_relational),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(x) => fmt::Display::fmt(x, f),
            Self::DieTerm(term) => fmt::Display::fmt(term, f),
            Self::Parenthetical(x) => write!(f, "({})", x),
            Self::Unary(op, x) => write!(f, "{}{}", op, x),
            Self::Binary(l, op, r) => write!(f, "{} {} {}", l, op, r),
            Self::Call(func, args) => {
                write!(f, "{}(", func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(arg, f)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One `quantity d size [modifiers]` token. Quantity and size may be
/// arbitrary sub-expressions (nested parenthetical rolls included); they are
/// resolved to plain integers before the term rolls.
#[derive(Debug, Clone, PartialEq)]
pub struct DieTerm {
    pub quantity: Box<Node>,
    pub size: Box<Node>,
    pub explode: Explode,
    pub transforms: Vec<Transform>,
    pub keep: Option<UInt>,
}

impl DieTerm {
    pub fn new(quantity: Node, size: Node) -> Self {
        Self {
            quantity: Box::new(quantity),
            size: Box::new(size),
            explode: Explode::None,
            transforms: Vec::new(),
            keep: None,
        }
    }
}

impl fmt::Display for DieTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}{}", self.quantity, self.size, self.explode)?;
        for rule in &self.transforms {
            fmt::Display::fmt(rule, f)?;
        }
        if let Some(k) = self.keep {
            write!(f, "k{}", k)?;
        }
        Ok(())
    }
}
