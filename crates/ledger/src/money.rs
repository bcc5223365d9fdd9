use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Number;

use crate::LedgerError;

/// Signed money amount represented as **integer cents**.
///
/// Every amount in the ledger (entry totals, deposits, session payments) uses
/// this type, so sums never drift the way floats would.
///
/// On disk the value is written as a plain JSON number in whole units
/// (`50`, `12.5`) and read back rounded to the cent.
///
/// # Examples
///
/// ```rust
/// use ledger::Money;
///
/// let amount = Money::new(12_50);
/// assert_eq!(amount.cents(), 1250);
/// assert_eq!(amount.to_string(), "$12.50");
/// assert_eq!(Money::new(50_00).to_string(), "$50");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator, rounds to
/// the nearest cent):
///
/// ```rust
/// use ledger::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("$10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert_eq!("12.345".parse::<Money>().unwrap().cents(), 1235);
/// assert!("twelve".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest magnitude accepted from text: ten trillion units. Fractional
    /// amounts up to this size still survive the JSON number round trip.
    pub const MAX_CENTS: i64 = 1_000_000_000_000_000;

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parses form input, falling back to zero for anything that is not a
    /// number (empty fields included).
    #[must_use]
    pub fn coerce(input: &str) -> Self {
        input.parse().unwrap_or(Self::ZERO)
    }

    /// Like [`Money::coerce`], but negative amounts also collapse to zero.
    #[must_use]
    pub fn coerce_non_negative(input: &str) -> Self {
        let amount = Self::coerce(input);
        if amount.is_negative() { Self::ZERO } else { amount }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        if cents == 0 {
            write!(f, "{sign}${units}")
        } else {
            write!(f, "{sign}${units}.{cents:02}")
        }
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    /// Parses a decimal string into cents, rounding half away from zero.
    ///
    /// Accepts an optional leading `+`/`-`, an optional `$` after the sign,
    /// `,` thousands groups (`1,000`), a single `,` as decimal separator
    /// (`10,5`), a leading `.` (`.5`) and an exponent (`1e2`).
    ///
    /// Rejects empty or non-numeric strings and magnitudes above
    /// [`Money::MAX_CENTS`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || LedgerError::InvalidAmount("empty amount".to_string());
        let invalid = || LedgerError::InvalidAmount(format!("invalid amount: {s}"));
        let overflow = || LedgerError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim_start();
        let rest = rest.strip_prefix('$').unwrap_or(rest).trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let normalized = normalize_separators(rest);
        let (mantissa, exponent) = match normalized.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => {
                (mantissa, exponent.parse::<i32>().map_err(|_| invalid())?)
            }
            None => (normalized.as_str(), 0),
        };

        let (units, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if units.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !units.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let cents = round_to_cents(units, fraction, exponent)
            .filter(|cents| *cents <= Self::MAX_CENTS)
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// Rewrites `,` so the rest of the parser only sees `.` decimals.
///
/// Commas in the integer part forming groups of three are thousands
/// separators; a single other comma is the decimal separator. Anything else
/// is left as is and fails the digit check.
fn normalize_separators(raw: &str) -> String {
    let split = raw.find(['.', 'e', 'E']).unwrap_or(raw.len());
    let (head, tail) = raw.split_at(split);
    if !head.contains(',') {
        return raw.to_string();
    }

    let groups: Vec<&str> = head.split(',').collect();
    let grouped = (1..=3).contains(&groups[0].len()) && groups[1..].iter().all(|g| g.len() == 3);
    if grouped {
        format!("{}{tail}", groups.concat())
    } else if groups.len() == 2 && tail.is_empty() {
        head.replace(',', ".")
    } else {
        raw.to_string()
    }
}

/// Exact decimal to cents conversion of `units.fraction × 10^exponent`.
///
/// `None` when the result does not fit in an `i64`.
fn round_to_cents(units: &str, fraction: &str, exponent: i32) -> Option<i64> {
    let joined = format!("{units}{fraction}");
    let digits = joined.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }

    let shift = i64::from(exponent) + 2 - i64::try_from(fraction.len()).ok()?;
    if shift >= 0 {
        let scale = 10_i64.checked_pow(u32::try_from(shift).ok()?)?;
        return digits.parse::<i64>().ok()?.checked_mul(scale);
    }

    let keep = i64::try_from(digits.len()).ok()? + shift;
    if keep < 0 {
        return Some(0);
    }
    let (whole, dropped) = digits.split_at(usize::try_from(keep).ok()?);
    let whole = if whole.is_empty() {
        0
    } else {
        whole.parse::<i64>().ok()?
    };
    let round_up = dropped.as_bytes().first().is_some_and(|digit| *digit >= b'5');
    whole.checked_add(i64::from(round_up))
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.0 as f64 / 100.0)
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    /// Whole units are read as integers; fractional ones go back through the
    /// decimal parser on their shortest text form, so no float math is
    /// involved.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = Number::deserialize(deserializer)?;
        if let Some(units) = number.as_i64() {
            return units
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| de::Error::custom(format!("amount out of range: {number}")));
        }
        if number.is_u64() {
            return Err(de::Error::custom(format!("amount out of range: {number}")));
        }
        number.to_string().parse().map_err(de::Error::custom)
    }
}
