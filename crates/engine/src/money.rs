use std::{fmt, str::FromStr};

use crate::EngineError;

/// Parses user-typed money or quantity input into a finite `f64`.
///
/// Amounts are plain floating point numbers, the same representation the
/// stored documents use. This type only exists to give user input a single
/// parsing and formatting rule.
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("10".parse::<Amount>().unwrap().value(), 10.0);
/// assert_eq!("10,5".parse::<Amount>().unwrap().value(), 10.5);
/// assert_eq!(Amount::new(12.3).to_string(), "12.30");
/// assert!("abc".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Amount(f64);

impl Amount {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` if the amount is a finite number strictly above zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`. Rejects empty input, thousands separators and non-finite
    /// values (`inf`, `NaN`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {}", s.trim()));

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let normalized = trimmed.replace(',', ".");
        let digits = normalized.trim_start_matches(['+', '-']);
        if digits.is_empty()
            || digits.matches('.').count() > 1
            || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        {
            return Err(invalid());
        }

        let value: f64 = normalized.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(Amount(value))
    }
}

/// Formats a raw amount with two decimals.
#[must_use]
pub fn format_amount(value: f64) -> String {
    Amount(value).to_string()
}
