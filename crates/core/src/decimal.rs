//! Exact fixed-point decimal values.
//!
//! A `Decimal` is an unscaled `i128` together with a base-10 scale, so
//! `Decimal::new(12345, 2)` is `123.45`. Equality and hashing work on the
//! normalized form, which makes `1.50 == 1.5`.

use crate::error::{Error, Result};
use crate::types::DataType;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Largest scale accepted by the parser.
pub const MAX_SCALE: u32 = 28;

/// An exact decimal number.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Decimal {
    unscaled: i128,
    scale: u32,
}

impl Decimal {
    /// Creates a decimal from an unscaled value and a scale.
    pub fn new(unscaled: i128, scale: u32) -> Self {
        Self { unscaled, scale }
    }

    /// Returns the unscaled value.
    #[inline]
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// Returns the scale (digits after the decimal point).
    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns the same value with trailing fractional zeros removed.
    pub fn normalized(&self) -> Self {
        let mut unscaled = self.unscaled;
        let mut scale = self.scale;
        while scale > 0 && unscaled % 10 == 0 {
            unscaled /= 10;
            scale -= 1;
        }
        Self { unscaled, scale }
    }

    /// Returns true if the value has no fractional part.
    pub fn is_integral(&self) -> bool {
        self.normalized().scale == 0
    }

    /// Converts to `i64` when the value is integral and in range.
    pub fn to_i64(&self) -> Option<i64> {
        let n = self.normalized();
        if n.scale != 0 {
            return None;
        }
        i64::try_from(n.unscaled).ok()
    }

    /// Converts to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        // Going through the textual form avoids compounding rounding errors.
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Creates a decimal from a finite `f64` using its shortest representation.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::conversion(value.to_string(), DataType::Decimal));
        }
        value.to_string().parse()
    }

    /// Rescales the unscaled value to `scale`, if it fits.
    fn rescaled(&self, scale: u32) -> Option<i128> {
        if scale < self.scale {
            return None;
        }
        10i128
            .checked_pow(scale - self.scale)
            .and_then(|factor| self.unscaled.checked_mul(factor))
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Self::new(v as i128, 0)
    }
}

impl From<i32> for Decimal {
    fn from(v: i32) -> Self {
        Self::new(v as i128, 0)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalized();
        n.unscaled.hash(state);
        n.scale.hash(state);
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        match (self.rescaled(scale), other.rescaled(scale)) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self
                .to_f64()
                .partial_cmp(&other.to_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let digits = self.unscaled.unsigned_abs().to_string();
        if self.scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int, frac)
        } else {
            write!(f, "{}0.{:0>width$}", sign, digits, width = scale)
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let err = || Error::conversion(s, DataType::Decimal);
        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int, frac) = match body.split_once('.') {
            Some((int, frac)) => (int, frac),
            None => (body, ""),
        };
        if int.is_empty() && frac.is_empty() {
            return Err(err());
        }
        if !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let scale = u32::try_from(frac.len()).map_err(|_| err())?;
        if scale > MAX_SCALE {
            return Err(err());
        }
        let mut unscaled: i128 = 0;
        for c in int.chars().chain(frac.chars()) {
            let digit = (c as u8 - b'0') as i128;
            unscaled = unscaled
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(err)?;
        }
        if negative {
            unscaled = -unscaled;
        }
        Ok(Self { unscaled, scale })
    }
}

impl From<Decimal> for String {
    fn from(d: Decimal) -> Self {
        d.to_string()
    }
}

impl TryFrom<String> for Decimal {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}
