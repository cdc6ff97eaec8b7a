//! Money value object
//!
//! A non-negative amount of Brazilian Reais held as an integer number of
//! cents. Every constructor and fallible operation validates its input and
//! returns a `Result`; arithmetic never mutates, it hands back a new value.
//!
//! Rounding is always `f64::round` (half away from zero) and is applied to the
//! result of the arithmetic, never to the operands.

use crate::domain::errors::{MoneyError, Operand};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest cent amount an `f64` represents exactly (2^53 - 1)
pub const MAX_SAFE_CENTS: u64 = 9_007_199_254_740_991;

const CURRENCY_SYMBOL: &str = "R$";
const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';
const NO_BREAK_SPACE: char = '\u{a0}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    value_in_cents: u64,
}

/// Response shape of a `Money`: `{ valueInCents, valueInMonetary, formatted }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableMoney {
    pub value_in_cents: u64,
    pub value_in_monetary: f64,
    pub formatted: String,
}

impl Money {
    pub const ZERO: Money = Money { value_in_cents: 0 };

    /// Create from an amount of cents, rounding to the nearest whole cent
    ///
    /// # Errors
    /// `NotFinite` for NaN or infinite input, `Negative` below zero,
    /// `ValueTooLarge` above `MAX_SAFE_CENTS`.
    pub fn create_from_cents(value: f64) -> Result<Self, MoneyError> {
        let value = non_negative(value, Operand::Value)?;
        from_rounded(value.round(), MoneyError::ValueTooLarge)
    }

    /// Create from a decimal amount of Reais (`100.5` is 10050 cents)
    pub fn create_from_monetary(value: f64) -> Result<Self, MoneyError> {
        let cents = non_negative((value * 100.0).round(), Operand::Value)?;
        from_rounded(cents, MoneyError::ValueTooLarge)
    }

    pub const fn zero() -> Self {
        Money::ZERO
    }

    /// Rebuild from a serialized form such as `{ "valueInCents": 10050 }`.
    ///
    /// Only `valueInCents` is read; the derived fields of the response shape
    /// are ignored.
    pub fn create_from_serialized(serialized: &serde_json::Value) -> Result<Self, MoneyError> {
        let cents = Operand::Value.read(
            serialized
                .get("valueInCents")
                .unwrap_or(&serde_json::Value::Null),
        )?;
        Self::create_from_cents(cents)
    }

    pub fn value_in_cents(&self) -> u64 {
        self.value_in_cents
    }

    pub fn value_in_monetary(&self) -> f64 {
        self.value_in_cents as f64 / 100.0
    }

    /// Saturates at `MAX_SAFE_CENTS`, so the sum always stays a valid `Money`
    pub fn add(&self, other: Money) -> Money {
        Money {
            value_in_cents: self
                .value_in_cents
                .saturating_add(other.value_in_cents)
                .min(MAX_SAFE_CENTS),
        }
    }

    /// Like `add`, but fails with `ResultTooLarge` instead of saturating
    pub fn checked_add(&self, other: Money) -> Result<Money, MoneyError> {
        self.value_in_cents
            .checked_add(other.value_in_cents)
            .filter(|sum| *sum <= MAX_SAFE_CENTS)
            .map(|value_in_cents| Money { value_in_cents })
            .ok_or(MoneyError::ResultTooLarge)
    }

    pub fn subtract(&self, other: Money) -> Result<Money, MoneyError> {
        self.value_in_cents
            .checked_sub(other.value_in_cents)
            .map(|value_in_cents| Money { value_in_cents })
            .ok_or(MoneyError::NegativeResult)
    }

    pub fn multiply(&self, multiplier: f64) -> Result<Money, MoneyError> {
        let multiplier = non_negative(multiplier, Operand::Multiplier)?;
        from_rounded(
            (self.value_in_cents as f64 * multiplier).round(),
            MoneyError::ResultTooLarge,
        )
    }

    pub fn divide(&self, divisor: f64) -> Result<Money, MoneyError> {
        if !divisor.is_finite() {
            return Err(MoneyError::NotFinite(Operand::Divisor));
        }
        if divisor <= 0.0 {
            return Err(MoneyError::DivisorNotPositive);
        }
        from_rounded(
            (self.value_in_cents as f64 / divisor).round(),
            MoneyError::ResultTooLarge,
        )
    }

    pub fn is_greater_than(&self, other: Money) -> bool {
        self.value_in_cents > other.value_in_cents
    }

    pub fn is_less_than(&self, other: Money) -> bool {
        self.value_in_cents < other.value_in_cents
    }

    pub fn is_equal_to(&self, other: Money) -> bool {
        self.value_in_cents == other.value_in_cents
    }

    pub fn is_zero(&self) -> bool {
        self.value_in_cents == 0
    }

    /// Share of `total` this amount represents, in percent.
    /// `None` when `total` is zero.
    pub fn percentage_of(&self, total: Money) -> Option<f64> {
        if total.is_zero() {
            return None;
        }
        Some(self.value_in_cents as f64 / total.value_in_cents as f64 * 100.0)
    }

    /// pt-BR currency text, e.g. `R$ 1.234,56` (no-break space after the symbol)
    pub fn format_currency(&self) -> String {
        format!(
            "{}{}{}{}{:02}",
            CURRENCY_SYMBOL,
            NO_BREAK_SPACE,
            group_thousands(self.value_in_cents / 100),
            DECIMAL_SEPARATOR,
            self.value_in_cents % 100
        )
    }

    pub fn format_cents(&self) -> String {
        format!("{} centavos", self.value_in_cents)
    }

    pub fn to_serializable(&self) -> SerializableMoney {
        SerializableMoney {
            value_in_cents: self.value_in_cents,
            value_in_monetary: self.value_in_monetary(),
            formatted: self.format_currency(),
        }
    }

    pub fn to_display_string(&self) -> String {
        self.format_currency()
    }
}

fn non_negative(value: f64, operand: Operand) -> Result<f64, MoneyError> {
    if !value.is_finite() {
        return Err(MoneyError::NotFinite(operand));
    }
    if value < 0.0 {
        return Err(MoneyError::Negative(operand));
    }
    Ok(value)
}

// `cents` is already rounded, finite and non-negative
fn from_rounded(cents: f64, too_large: MoneyError) -> Result<Money, MoneyError> {
    if cents > MAX_SAFE_CENTS as f64 {
        return Err(too_large);
    }
    Ok(Money {
        value_in_cents: cents as u64,
    })
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(digit);
    }
    grouped
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_currency())
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Money::add(&self, other)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |total, money| total + money)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_serializable().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Money::create_from_serialized(&raw).map_err(serde::de::Error::custom)
    }
}
