use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The numeric input a money operation is validating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Value,
    Multiplier,
    Divisor,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value => write!(f, "Value"),
            Operand::Multiplier => write!(f, "Multiplier"),
            Operand::Divisor => write!(f, "Divisor"),
        }
    }
}

impl Operand {
    /// Read this operand out of an untyped JSON value.
    ///
    /// Anything that is not a JSON number is rejected with `NotANumber`.
    pub fn read(self, value: &serde_json::Value) -> Result<f64, MoneyError> {
        value.as_f64().ok_or(MoneyError::NotANumber(self))
    }
}

/// Failures of the `Money` value object.
///
/// The `Display` text of every variant is the message surfaced to callers,
/// so it must stay stable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    #[error("{0} must be a number")]
    NotANumber(Operand),

    #[error("{0} must be a finite number")]
    NotFinite(Operand),

    #[error("{0} cannot be negative")]
    Negative(Operand),

    #[error("Divisor must be positive")]
    DivisorNotPositive,

    #[error("Result cannot be negative")]
    NegativeResult,

    #[error("Value exceeds the maximum safe amount")]
    ValueTooLarge,

    #[error("Result exceeds the maximum safe amount")]
    ResultTooLarge,
}

/// One or more human-readable validation failures.
///
/// Never empty: the only constructors take at least one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn single(message: impl Into<String>) -> Self {
        ValidationErrors(vec![message.into()])
    }

    /// Returns `None` when there is nothing to report
    pub fn from_messages(messages: Vec<String>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(ValidationErrors(messages))
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    /// True if any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|message| message.contains(needle))
    }

    pub fn merge(mut self, other: ValidationErrors) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<MoneyError> for ValidationErrors {
    fn from(error: MoneyError) -> Self {
        ValidationErrors::single(error.to_string())
    }
}

/// Accumulates field failures so a constructor can report all of them at once
#[derive(Debug, Default)]
pub struct ErrorCollector {
    messages: Vec<String>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record `message` unless `condition` holds
    pub fn check(&mut self, condition: bool, message: impl Into<String>) {
        if !condition {
            self.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        match ValidationErrors::from_messages(self.messages) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}
