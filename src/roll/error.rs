use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RollError {
    #[error("{0}")]
    Parse(#[from] crate::parse::ParseError),
    #[error("{0} {1} exceeds the configured ceiling of {2}")]
    LimitExceeded(&'static str, u64, u64),
    #[error("integer overflow during evaluation")]
    Overflow,
    #[error("cannot divide or take modulus by zero")]
    ZeroDivision,
    #[error("expression still contains an unresolved roll; resolve dice before arithmetic evaluation")]
    UnresolvedRoll,
    #[error("failed to evaluate {expression:?}")]
    Evaluation {
        expression: String,
        #[source]
        source: Box<RollError>,
    },
    #[error("{0}")]
    Value(String),
}

impl RollError {
    pub fn value_error(msg: impl ToString) -> Self {
        Self::Value(msg.to_string())
    }

    pub(crate) fn in_expression(self, expression: &str) -> Self {
        Self::Evaluation {
            expression: expression.to_string(),
            source: Box::new(self),
        }
    }
}
