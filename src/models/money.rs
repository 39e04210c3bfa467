//! Monetary amounts
//!
//! Amounts are held as integer cents and exchanged as decimal strings with
//! two places (`"150.00"`). Numbers are accepted on input as well, since
//! hand-written clients tend to send `150.5` instead of `"150.50"`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Amount of money in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// Error parsing an amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest amount an expense may carry: ten digits, two of them decimal
    pub const MAX_EXPENSE: Money = Money(99_999_999_99);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Within `0..=MAX_EXPENSE`
    pub fn is_valid_expense(&self) -> bool {
        (0..=Self::MAX_EXPENSE.0).contains(&self.0)
    }

    /// Value as a float, for charts and averages
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Nearest amount to a float (used for JSON numbers)
    pub fn from_f64(value: f64) -> Result<Self, MoneyError> {
        if !value.is_finite() || value.abs() > (i64::MAX / 100) as f64 {
            return Err(MoneyError::OutOfRange(value.to_string()));
        }
        Ok(Money((value * 100.0).round() as i64))
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyError::Empty);
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(MoneyError::NotANumber(s.to_string()));
        }
        if frac.len() > 2 {
            return Err(MoneyError::TooPrecise(s.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| MoneyError::OutOfRange(s.to_string()))?
        };
        let frac: i64 = format!("{:0<2}", frac)
            .parse()
            .map_err(|_| MoneyError::NotANumber(s.to_string()))?;

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| MoneyError::OutOfRange(s.to_string()))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl<'de> Visitor<'de> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a decimal amount as a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                v.checked_mul(100)
                    .map(Money)
                    .ok_or_else(|| E::custom(MoneyError::OutOfRange(v.to_string())))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map_err(|_| E::custom(MoneyError::OutOfRange(v.to_string())))
                    .and_then(|v| self.visit_i64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Money::from_f64(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("150".parse::<Money>().unwrap(), Money::from_cents(15000));
        assert_eq!("150.5".parse::<Money>().unwrap(), Money::from_cents(15050));
        assert_eq!("0.05".parse::<Money>().unwrap(), Money::from_cents(5));
        assert_eq!(".5".parse::<Money>().unwrap(), Money::from_cents(50));
        assert_eq!("-3.20".parse::<Money>().unwrap(), Money::from_cents(-320));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Money>().unwrap_err(), MoneyError::Empty);
        assert!(matches!("abc".parse::<Money>(), Err(MoneyError::NotANumber(_))));
        assert!(matches!("1.234".parse::<Money>(), Err(MoneyError::TooPrecise(_))));
        assert!(matches!("1.2.3".parse::<Money>(), Err(MoneyError::NotANumber(_))));
        assert!(matches!(".".parse::<Money>(), Err(MoneyError::NotANumber(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(15000).to_string(), "150.00");
        assert_eq!(Money::from_cents(8550).to_string(), "85.50");
        assert_eq!(Money::from_cents(-7).to_string(), "-0.07");
    }

    #[test]
    fn test_json_accepts_strings_and_numbers() {
        let from_str: Money = serde_json::from_str(r#""85.50""#).unwrap();
        let from_float: Money = serde_json::from_str("85.5").unwrap();
        let from_int: Money = serde_json::from_str("85").unwrap();
        assert_eq!(from_str, Money::from_cents(8550));
        assert_eq!(from_float, Money::from_cents(8550));
        assert_eq!(from_int, Money::from_cents(8500));
        assert_eq!(serde_json::to_string(&from_str).unwrap(), r#""85.50""#);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_cents(100), Money::from_cents(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total, Money::from_cents(350));
    }

    #[test]
    fn test_sum_saturates() {
        let huge: Money = "90000000000000000.00".parse().unwrap();
        let total: Money = [huge, huge].iter().sum();
        assert_eq!(total, Money::from_cents(i64::MAX));

        let mut running = Money::from_cents(i64::MAX - 1);
        running += Money::from_cents(5);
        assert_eq!(running.cents(), i64::MAX);
    }

    #[test]
    fn test_expense_range() {
        assert!(Money::ZERO.is_valid_expense());
        assert!("99999999.99".parse::<Money>().unwrap().is_valid_expense());
        assert!(!"100000000.00".parse::<Money>().unwrap().is_valid_expense());
        assert!(!"-0.01".parse::<Money>().unwrap().is_valid_expense());
    }
}
