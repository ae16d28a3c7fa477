use std::{fmt, str::FromStr};

use crate::EngineError;

/// Largest storable amount: 10 digits with 2 decimals (`99999999.99`).
const MAX_CENTS: i64 = 99_999_999_99;

/// Non-negative money amount represented as **integer cents**.
///
/// Prices, modifier surcharges and order totals all use this type so the
/// engine never touches floating point. The API exchanges amounts as decimal
/// strings (`"12.50"`), which is exactly what [`Display`] and [`FromStr`]
/// produce and accept.
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("10.5".parse::<Money>().unwrap().to_string(), "10.50");
/// assert!("12.345".parse::<Money>().is_err());
/// assert!("-1".parse::<Money>().is_err());
/// ```
///
/// [`Display`]: fmt::Display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates an amount from integer cents, rejecting negative or oversized
    /// values.
    pub fn from_cents(cents: i64) -> Result<Self, EngineError> {
        if cents < 0 {
            return Err(EngineError::invalid(
                "amount",
                "Ensure this value is greater than or equal to 0.",
            ));
        }
        if cents > MAX_CENTS {
            return Err(EngineError::invalid(
                "amount",
                "Ensure that there are no more than 10 digits in total.",
            ));
        }
        Ok(Self(cents))
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Re-labels a parse error with the name of the field it came from.
    pub fn parse_field(value: &str, field: &str) -> Result<Self, EngineError> {
        value.parse::<Money>().map_err(|err| match err {
            EngineError::Validation(errors) => {
                let mut relabeled = crate::FieldErrors::new();
                for message in errors.into_inner().into_values().flatten() {
                    relabeled.push(field, message);
                }
                EngineError::Validation(relabeled)
            }
            other => other,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects negative, empty or invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::invalid("amount", "A valid number is required.");

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        if trimmed.starts_with('-') {
            return Err(EngineError::invalid(
                "amount",
                "Ensure this value is greater than or equal to 0.",
            ));
        }
        let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let cents_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_str.parse().map_err(|_| {
            EngineError::invalid(
                "amount",
                "Ensure that there are no more than 10 digits in total.",
            )
        })?;

        let cents: i64 = match cents_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                match frac.len() {
                    1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
                    2 => frac.parse::<i64>().map_err(|_| invalid())?,
                    _ => {
                        return Err(EngineError::invalid(
                            "amount",
                            "Ensure that there are no more than 2 decimal places.",
                        ));
                    }
                }
            }
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Money::from_cents(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_two_decimals() {
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_cents(1).unwrap().to_string(), "0.01");
        assert_eq!(Money::from_cents(1050).unwrap().to_string(), "10.50");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("10,50".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!("+1.00".parse::<Money>().unwrap().cents(), 100);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().cents(), 230);
    }

    #[test]
    fn parse_rejects_negative_and_precision() {
        assert!("-0.01".parse::<Money>().is_err());
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("100000000.00".parse::<Money>().is_err());
        assert_eq!("99999999.99".parse::<Money>().unwrap().cents(), MAX_CENTS);
    }

    #[test]
    fn parse_field_relabels_errors() {
        let err = Money::parse_field("-3", "price").unwrap_err();
        let EngineError::Validation(fields) = err else {
            panic!("expected a validation error");
        };
        assert!(fields.contains("price"));
        assert!(!fields.contains("amount"));
    }
}
