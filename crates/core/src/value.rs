//! Value type definitions for row set cells.
//!
//! This module defines the `Value` enum which represents any value that can be held
//! in a cached column, together with the explicit conversion rules used by the
//! typed getters.

use crate::decimal::Decimal;
use crate::error::{Error, Result};
use crate::types::DataType;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

/// A value that can be stored in a row set cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point; non-finite values serialize as strings
    Float64(#[serde(with = "float_repr")] f64),
    /// Exact decimal
    Decimal(Decimal),
    /// UTF-8 string
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// DateTime stored as Unix timestamp in milliseconds
    DateTime(i64),
}

impl Value {
    /// Returns the data type of this value, or None if it's Null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Decimal(_) => Some(DataType::Decimal),
            Value::String(_) => Some(DataType::String),
            Value::Bytes(_) => Some(DataType::Bytes),
            Value::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i32 value if this is an Int32, None otherwise.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the i64 value if this is an Int64, None otherwise.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the f64 value if this is a Float64, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the decimal if this is a Decimal, None otherwise.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns a reference to the bytes if this is Bytes, None otherwise.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns the datetime timestamp if this is a DateTime, None otherwise.
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts this value to `target` following the row set conversion rules.
    ///
    /// `Null` converts to `Null` for every target. Narrowing integer conversions,
    /// non-integral floats to integers and unparsable strings fail.
    pub fn convert_to(&self, target: DataType) -> Result<Value> {
        if self.is_null() || self.data_type() == Some(target) {
            return Ok(self.clone());
        }
        let fail = || Error::conversion(self.to_string(), target);
        let converted = match (self, target) {
            (Value::Bytes(_), _) => return Err(fail()),
            (_, DataType::String) => Value::String(self.to_string()),
            (Value::String(s), DataType::Boolean) => match s.trim() {
                "true" | "TRUE" | "1" => Value::Boolean(true),
                "false" | "FALSE" | "0" => Value::Boolean(false),
                _ => return Err(fail()),
            },
            (Value::String(s), DataType::Decimal) => Value::Decimal(s.parse()?),
            (Value::String(s), DataType::Float64) => {
                Value::Float64(s.trim().parse().map_err(|_| fail())?)
            }
            (Value::String(s), _) => {
                let d: Decimal = s.parse().map_err(|_| fail())?;
                Value::Decimal(d).convert_to(target)?
            }
            (_, DataType::Int32) => {
                let v = self.integral().ok_or_else(fail)?;
                Value::Int32(i32::try_from(v).map_err(|_| fail())?)
            }
            (_, DataType::Int64) => Value::Int64(self.integral().ok_or_else(fail)?),
            (_, DataType::DateTime) => Value::DateTime(self.integral().ok_or_else(fail)?),
            (Value::Int32(v), DataType::Float64) => Value::Float64(*v as f64),
            (Value::Int64(v), DataType::Float64) => Value::Float64(*v as f64),
            (Value::Decimal(d), DataType::Float64) => Value::Float64(d.to_f64()),
            (Value::Int32(v), DataType::Decimal) => Value::Decimal(Decimal::from(*v)),
            (Value::Int64(v), DataType::Decimal) => Value::Decimal(Decimal::from(*v)),
            (Value::Float64(v), DataType::Decimal) => Value::Decimal(Decimal::from_f64(*v)?),
            _ => return Err(fail()),
        };
        Ok(converted)
    }

    /// Returns the integral value of numeric and temporal values, if exact.
    fn integral(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) | Value::DateTime(v) => Some(*v),
            Value::Decimal(d) => d.to_i64(),
            Value::Float64(f) if f.fract() == 0.0 && f.is_finite() => {
                if *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Returns a hashable key for equality matching across numeric types.
    ///
    /// Nulls never match anything, so they have no key. Exact integral numbers
    /// all map to `Int64` so that `Int32(1)` and `Decimal(1.0)` meet.
    pub fn match_key(&self) -> Option<Value> {
        match self {
            Value::Null => None,
            Value::Int32(_) | Value::Int64(_) | Value::Decimal(_) | Value::Float64(_) => {
                match self.integral() {
                    Some(v) => Some(Value::Int64(v)),
                    None => match self {
                        Value::Decimal(d) => Some(Value::Float64(d.to_f64())),
                        _ => Some(self.clone()),
                    },
                }
            }
            _ => Some(self.clone()),
        }
    }

    /// Null-safe equality used for join matching: nulls never match.
    pub fn matches(&self, other: &Value) -> bool {
        match (self.match_key(), other.match_key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) | Value::DateTime(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Bytes(v) => {
                write!(f, "0x")?;
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int32(i) => i.hash(state),
            Value::Int64(i) | Value::DateTime(i) => i.hash(state),
            Value::Float64(f) => canonical_bits(*f).hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::String(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => {
                // Handle NaN: treat NaN as greater than all other values
                match (a.is_nan(), b.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                }
            }
            // Mixed numeric kinds never compare equal, so ties fall back to
            // the type order.
            (Value::Int32(a), Value::Int64(b)) => (*a as i64)
                .cmp(b)
                .then_with(|| self.type_order().cmp(&other.type_order())),
            (Value::Int64(a), Value::Int32(b)) => a
                .cmp(&(*b as i64))
                .then_with(|| self.type_order().cmp(&other.type_order())),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.approx_f64(), b.approx_f64());
                let by_value = match (x.is_nan(), y.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                };
                by_value.then_with(|| a.type_order().cmp(&b.type_order()))
            }
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            // Different types: order by type discriminant
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl Value {
    fn is_numeric(&self) -> bool {
        self.data_type().map(|t| t.is_numeric()).unwrap_or(false)
    }

    fn approx_f64(&self) -> f64 {
        match self {
            Value::Int32(v) => *v as f64,
            Value::Int64(v) => *v as f64,
            Value::Float64(v) => *v,
            Value::Decimal(d) => d.to_f64(),
            _ => f64::NAN,
        }
    }

    /// Returns a type ordering value for comparing different types.
    fn type_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int32(_) => 2,
            Value::Int64(_) => 3,
            Value::Float64(_) => 4,
            Value::Decimal(_) => 5,
            Value::String(_) => 6,
            Value::Bytes(_) => 7,
            Value::DateTime(_) => 8,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Bit pattern that agrees with `PartialEq`: one NaN, one zero.
fn canonical_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0f64.to_bits()
    } else {
        f.to_bits()
    }
}

/// JSON has no NaN or infinities; those travel as strings.
mod float_repr {
    use core::fmt;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_str("-Infinity")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }

    struct FloatVisitor;

    impl Visitor<'_> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"NaN\", \"Infinity\", \"-Infinity\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_check() {
        assert_eq!(Value::Int64(42).data_type(), Some(DataType::Int64));
        assert_eq!(
            Value::Decimal(Decimal::new(1, 0)).data_type(),
            Some(DataType::Decimal)
        );
        assert_eq!(Value::Null.data_type(), None);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Int32(42).as_i32(), Some(42));
        assert_eq!(Value::Int64(100).as_i64(), Some(100));
        assert_eq!(Value::Float64(3.5).as_f64(), Some(3.5));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::DateTime(1234567890).as_datetime(), Some(1234567890));
        assert_eq!(Value::Bytes(vec![1, 2, 3]).as_bytes(), Some(&[1, 2, 3][..]));
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Int32(42), Value::Int32(42));
        assert_ne!(Value::Int32(42), Value::Int64(42));
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(
            Value::Decimal(Decimal::new(150, 2)),
            Value::Decimal(Decimal::new(15, 1))
        );
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Int32(1) < Value::Int32(2));
        assert!(Value::Int32(1) < Value::Float64(1.5));
        assert!(Value::Decimal(Decimal::new(25, 1)) > Value::Int64(2));
        assert!(Value::Null < Value::Int32(0));
    }

    #[test]
    fn test_convert_widening_and_narrowing() {
        assert_eq!(
            Value::Int32(7).convert_to(DataType::Int64).unwrap(),
            Value::Int64(7)
        );
        assert_eq!(
            Value::Int64(7).convert_to(DataType::Int32).unwrap(),
            Value::Int32(7)
        );
        assert!(Value::Int64(i64::MAX).convert_to(DataType::Int32).is_err());
        assert!(Value::Float64(1.5).convert_to(DataType::Int64).is_err());
        assert_eq!(
            Value::Float64(3.0).convert_to(DataType::Int64).unwrap(),
            Value::Int64(3)
        );
    }

    #[test]
    fn test_convert_strings() {
        assert_eq!(
            Value::String("12".into()).convert_to(DataType::Int32).unwrap(),
            Value::Int32(12)
        );
        assert_eq!(
            Value::String("1.25".into())
                .convert_to(DataType::Decimal)
                .unwrap(),
            Value::Decimal(Decimal::new(125, 2))
        );
        assert_eq!(
            Value::Int64(5).convert_to(DataType::String).unwrap(),
            Value::String("5".into())
        );
        assert!(Value::String("x".into()).convert_to(DataType::Int64).is_err());
        assert_eq!(
            Value::String("true".into())
                .convert_to(DataType::Boolean)
                .unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_convert_null_and_bytes() {
        assert_eq!(Value::Null.convert_to(DataType::Int32).unwrap(), Value::Null);
        assert!(Value::Bytes(vec![1]).convert_to(DataType::String).is_err());
        assert!(Value::Bytes(vec![1]).convert_to(DataType::Bytes).is_ok());
        assert!(Value::Boolean(true).convert_to(DataType::Int32).is_err());
    }

    #[test]
    fn test_match_key_is_null_safe_and_cross_numeric() {
        assert!(!Value::Null.matches(&Value::Null));
        assert!(Value::Int32(3).matches(&Value::Int64(3)));
        assert!(Value::Decimal(Decimal::new(30, 1)).matches(&Value::Int32(3)));
        assert!(!Value::Int32(3).matches(&Value::String("3".into())));
        assert!(Value::String("a".into()).matches(&Value::String("a".into())));
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i32.into();
        assert_eq!(v.as_i32(), Some(42));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let v: Value = None::<i32>.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_value_serde_tagged() {
        let json = serde_json::to_string(&Value::Int32(5)).unwrap();
        assert_eq!(json, r#"{"type":"Int32","value":5}"#);
        let back: Value = serde_json::from_str(r#"{"type":"Null"}"#).unwrap();
        assert!(back.is_null());
    }

    #[test]
    fn test_value_serde_non_finite_floats() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -2.5] {
            let json = serde_json::to_string(&Value::Float64(f)).unwrap();
            let back: Value = serde_json::from_str(&json).unwrap();
            assert_eq!(back, Value::Float64(f));
        }
        let json = serde_json::to_string(&Value::Float64(f64::NAN)).unwrap();
        assert_eq!(json, r#"{"type":"Float64","value":"NaN"}"#);
        let whole: Value = serde_json::from_str(r#"{"type":"Float64","value":3}"#).unwrap();
        assert_eq!(whole, Value::Float64(3.0));
        assert!(serde_json::from_str::<Value>(r#"{"type":"Float64","value":"x"}"#).is_err());
    }

    #[test]
    fn test_ordering_agrees_with_equality() {
        let pairs = [
            (Value::Int32(1), Value::Int64(1)),
            (Value::Int64(2), Value::Float64(2.0)),
            (Value::Decimal(Decimal::new(1, 0)), Value::Int32(1)),
            (Value::Float64(0.0), Value::Float64(-0.0)),
            (Value::Float64(f64::NAN), Value::Float64(-f64::NAN)),
        ];
        for (a, b) in pairs {
            assert_eq!(a == b, a.cmp(&b) == Ordering::Equal, "{:?} vs {:?}", a, b);
            assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }
        assert!(Value::Int32(1) < Value::Int64(1));
        assert!(Value::Int64(1) < Value::Int32(2));
    }

    #[test]
    fn test_equal_floats_hash_alike() {
        use std::collections::hash_map::DefaultHasher;
        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&Value::Float64(0.0)), hash(&Value::Float64(-0.0)));
        assert_eq!(
            hash(&Value::Float64(f64::NAN)),
            hash(&Value::Float64(-f64::NAN))
        );
    }
}
