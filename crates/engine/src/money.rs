use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Number of fractional digits every amount is kept at.
const SCALE: u32 = 2;

/// Largest number of integer digits an amount may have (`DECIMAL(20,2)`).
const MAX_INTEGER_DIGITS: usize = 18;

/// Signed money amount backed by an exact decimal.
///
/// Use this type for **all** monetary values in the engine (balances, goals,
/// transaction amounts). Values always carry exactly two fractional digits,
/// so applying and reversing a transaction restores a balance bit for bit.
///
/// The value is signed:
/// - positive = income / increase
/// - negative = expense / decrease
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::from_cents(12_34);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap(), Money::from_cents(1000));
/// assert_eq!("10,5".parse::<Money>().unwrap(), Money::from_cents(1050));
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, SCALE));

    /// Wraps a decimal, rejecting values with more than two fractional digits
    /// or more than 18 integer digits.
    pub fn new(value: Decimal) -> ResultEngine<Self> {
        if value.normalize().scale() > SCALE {
            return Err(EngineError::Validation("too many decimals".to_string()));
        }
        if !Self::in_range(value) {
            return Err(too_large());
        }
        Ok(Self::normalized(value))
    }

    /// Creates an amount from integer cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self::normalized(Decimal::new(cents, SCALE))
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Checked addition (returns `None` when the sum leaves the amount range).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_add(rhs.0)
            .filter(|sum| Self::in_range(*sum))
            .map(Self::normalized)
    }

    /// Checked subtraction (returns `None` when the result leaves the amount
    /// range).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0
            .checked_sub(rhs.0)
            .filter(|diff| Self::in_range(*diff))
            .map(Self::normalized)
    }

    #[must_use]
    pub fn abs(self) -> Money {
        Self::normalized(self.0.abs())
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        !self.0.is_zero() && self.0.is_sign_negative()
    }

    /// Canonical text stored in the database (`"10.50"`).
    pub(crate) fn to_db(self) -> String {
        self.0.to_string()
    }

    /// Reads an amount previously written with [`Money::to_db`].
    pub(crate) fn from_db(value: &str, label: &str) -> ResultEngine<Self> {
        let decimal = Decimal::from_str(value.trim())
            .map_err(|_| EngineError::Validation(format!("invalid stored {label}: {value}")))?;
        Ok(Self::normalized(decimal))
    }

    fn in_range(value: Decimal) -> bool {
        value.abs().trunc().to_string().len() <= MAX_INTEGER_DIGITS
    }

    fn normalized(mut value: Decimal) -> Self {
        if value.is_zero() {
            value = Decimal::ZERO;
        }
        value.rescale(SCALE);
        Self(value)
    }
}

pub(crate) fn too_large() -> EngineError {
    EngineError::Validation("amount too large".to_string())
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = EngineError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money::normalized(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money::normalized(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money::normalized(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, value| acc + value)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - max 18 integer digits, leading zeros aside
    /// - digits only, no exponent or digit grouping
    /// - rejects empty strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::Validation("empty amount".to_string());
        let invalid = || EngineError::Validation("amount must be numeric".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped.trim_start())
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped.trim_start())
        } else {
            (false, trimmed)
        };
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units = parts.next().ok_or_else(invalid)?;
        let fraction = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(invalid());
        }
        if units.is_empty() || !units.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > SCALE as usize {
            return Err(EngineError::Validation("too many decimals".to_string()));
        }
        if units.trim_start_matches('0').len() > MAX_INTEGER_DIGITS {
            return Err(too_large());
        }

        let decimal =
            Decimal::from_str(&format!("{units}.{fraction:0<2}")).map_err(|_| too_large())?;

        Ok(Money::normalized(if negative { -decimal } else { decimal }))
    }
}
