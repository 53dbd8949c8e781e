use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Signed Rupiah amount represented as **integer minor units**.
///
/// The Rupiah has no fractional part in everyday use, so one minor unit is
/// `Rp1`. Every balance, allocation and transaction amount in the engine is an
/// `i64` of minor units; this type only adds formatting and parsing on top.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(1_500_000);
/// assert_eq!(amount.minor(), 1_500_000);
/// assert_eq!(amount.to_string(), "Rp1.500.000");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as thousands separators and an
/// optional `Rp` prefix):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("150000".parse::<Money>().unwrap().minor(), 150_000);
/// assert_eq!("Rp 50.000".parse::<Money>().unwrap().minor(), 50_000);
/// assert!("12.34".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}Rp{grouped}")
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a Rupiah amount.
    ///
    /// Accepts an optional leading `+`/`-`, an optional `Rp` prefix and `.` or
    /// `,` as thousands separators. Separators must split the digits into
    /// groups of three, so `12.34` is rejected instead of being read as a
    /// decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        let rest = rest
            .strip_prefix("Rp")
            .or_else(|| rest.strip_prefix("rp"))
            .unwrap_or(rest)
            .trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let groups: Vec<&str> = rest.split(['.', ',']).collect();
        let (head, tail) = groups.split_first().ok_or_else(invalid)?;
        if head.is_empty() || !head.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !tail.is_empty() && head.len() > 3 {
            return Err(invalid());
        }
        for group in tail {
            if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
        }

        let digits: String = groups.concat();
        let total: i64 = digits.parse().map_err(|_| overflow())?;

        let signed = if sign < 0 {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Money(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Money::new(0).to_string(), "Rp0");
        assert_eq!(Money::new(999).to_string(), "Rp999");
        assert_eq!(Money::new(1_000).to_string(), "Rp1.000");
        assert_eq!(Money::new(50_000).to_string(), "Rp50.000");
        assert_eq!(Money::new(1_000_000).to_string(), "Rp1.000.000");
        assert_eq!(Money::new(-150_000).to_string(), "-Rp150.000");
    }

    #[test]
    fn parse_accepts_separators_and_prefix() {
        assert_eq!("150000".parse::<Money>().unwrap().minor(), 150_000);
        assert_eq!("150.000".parse::<Money>().unwrap().minor(), 150_000);
        assert_eq!("1,000,000".parse::<Money>().unwrap().minor(), 1_000_000);
        assert_eq!("Rp 50.000".parse::<Money>().unwrap().minor(), 50_000);
        assert_eq!("Rp1.500.000".parse::<Money>().unwrap().minor(), 1_500_000);
        assert_eq!("-2.500".parse::<Money>().unwrap().minor(), -2_500);
        assert_eq!("  +7 ".parse::<Money>().unwrap().minor(), 7);
    }

    #[test]
    fn parse_rejects_decimals_and_garbage() {
        assert!("12.34".parse::<Money>().is_err());
        assert!("1.0000".parse::<Money>().is_err());
        assert!("1234.000".parse::<Money>().is_err());
        assert!("Rp".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn checked_ops_stop_at_i64_bounds() {
        assert_eq!(
            Money::new(i64::MAX).checked_sub(Money::new(1)),
            Some(Money::new(i64::MAX - 1))
        );
        assert_eq!(Money::new(i64::MAX).checked_add(Money::new(1)), None);
        assert_eq!(Money::new(-i64::MAX).checked_sub(Money::new(2)), None);
    }

    #[test]
    fn display_parse_agree() {
        let amount = Money::new(2_345_678);
        assert_eq!(amount.to_string().parse::<Money>().unwrap(), amount);
    }
}
