use std::{fmt::Display, str::FromStr};

use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "USD";

//--------------------------------------        Money          ---------------------------------------------------------
/// A fiat amount held as an integer number of cents.
///
/// Amounts travel to payment gateways as two-decimal strings (e.g. `"191.90"`), which is also what `Display` and
/// `Serialize` produce.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct Money(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a currency amount: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Multiplies the amount by `quantity` and takes `percent_off` percent off the result, rounding half away from
    /// zero to the nearest cent.
    pub fn discounted(self, quantity: i64, percent_off: i64) -> Self {
        // hundredths of a cent
        let gross = self.0 * quantity * (100 - percent_off);
        let rounded = if gross >= 0 { (gross + 50) / 100 } else { (gross - 50) / 100 };
        Self(rounded)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let (negative, digits) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let mut parts = digits.split('.');
        let whole = parts
            .next()
            .filter(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| MoneyConversionError(s.to_string()))?
            .parse::<i64>()
            .map_err(|e| MoneyConversionError(format!("{s}. {e}")))?;
        let cents = match parts.next() {
            None => 0,
            Some(frac) if frac.len() == 1 && frac.chars().all(|c| c.is_ascii_digit()) => {
                frac.parse::<i64>().map_err(|e| MoneyConversionError(format!("{s}. {e}")))? * 10
            },
            Some(frac) if frac.len() == 2 && frac.chars().all(|c| c.is_ascii_digit()) => {
                frac.parse::<i64>().map_err(|e| MoneyConversionError(format!("{s}. {e}")))?
            },
            Some(_) => return Err(MoneyConversionError(format!("{s} must have at most two decimal places"))),
        };
        if parts.next().is_some() {
            return Err(MoneyConversionError(s.to_string()));
        }
        let total = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .ok_or_else(|| MoneyConversionError(format!("{s} is too large")))?;
        Ok(Self(if negative { -total } else { total }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal amount as a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse::<Money>().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        v.checked_mul(100).map(Money).ok_or_else(|| E::custom(format!("{v} is too large")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v).map_err(E::custom).and_then(|v| self.visit_i64(v))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom(format!("{v} is not a valid amount")));
        }
        Ok(Money((v * 100.0).round() as i64))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
