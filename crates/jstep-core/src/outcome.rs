//! Terminal outcomes
//!
//! The label of each outcome is printed as the single result line of a run
//! and parsed back by the analysis driver, so labels never change.

use std::fmt;
use std::str::FromStr;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    /// The entry method returned
    Ok,
    /// Integer division or remainder by zero
    DivideByZero,
    /// An `AssertionError` was constructed
    AssertionError,
    /// Array index outside its bounds
    IndexOutOfBounds,
    /// Null receiver, null field access, or a thrown null
    NullPointer,
    /// An exception unwound the entry frame
    UncaughtException,
    /// The step ceiling was reached first
    StepLimitExceeded,
}

impl Outcome {
    /// Every outcome, in report order
    pub const ALL: [Outcome; 7] = [
        Self::Ok,
        Self::DivideByZero,
        Self::AssertionError,
        Self::IndexOutOfBounds,
        Self::NullPointer,
        Self::UncaughtException,
        Self::StepLimitExceeded,
    ];

    /// Stable output label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::DivideByZero => "divide by zero",
            Self::AssertionError => "assertion error",
            Self::IndexOutOfBounds => "out of bounds",
            Self::NullPointer => "null pointer",
            Self::UncaughtException => "uncaught exception",
            Self::StepLimitExceeded => "*",
        }
    }

    /// Parse a label, ignoring surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|o| o.label() == label)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown outcome label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outcome label `{0}`")]
pub struct UnknownOutcome(pub String);

impl FromStr for Outcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownOutcome(s.to_string()))
    }
}
