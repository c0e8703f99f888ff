// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::{fmt::Display, ops::Mul};

use num::integer::gcd;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Type to represent values of type `RATIONAL`
///
/// A zero denominator is kept as is. Cameras write `0/0` for "not applicable"
/// and consumers must be able to tell it apart from a real zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

/// Type to represent values of type `SRATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }

  pub fn to_f64(&self) -> Option<f64> {
    if self.d == 0 { None } else { Some(self.n as f64 / self.d as f64) }
  }

  pub fn is_not_applicable(&self) -> bool {
    self.d == 0
  }

  pub fn is_zero(&self) -> bool {
    self.n == 0 && self.d != 0
  }

  pub fn reciprocal(&self) -> Self {
    Self::new(self.d, self.n)
  }

  /// Reduce by the greatest common divisor. `x/0` stays untouched.
  pub fn simplified(&self) -> Self {
    if self.d == 0 {
      return *self;
    }
    let div = gcd(self.n, self.d);
    Self::new(self.n / div, self.d / div)
  }
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }

  pub fn to_f64(&self) -> Option<f64> {
    if self.d == 0 { None } else { Some(self.n as f64 / self.d as f64) }
  }

  pub fn is_not_applicable(&self) -> bool {
    self.d == 0
  }

  pub fn is_zero(&self) -> bool {
    self.n == 0 && self.d != 0
  }

  pub fn reciprocal(&self) -> Self {
    Self::new(self.d, self.n)
  }

  pub fn simplified(&self) -> Self {
    if self.d == 0 {
      return *self;
    }
    let div = gcd(self.n, self.d);
    // Keep the sign on the numerator
    let sign = if self.d < 0 { -1 } else { 1 };
    Self::new(sign * self.n / div, sign * self.d / div)
  }
}

impl Mul for Rational {
  type Output = Rational;

  fn mul(self, rhs: Self) -> Self::Output {
    Rational::new(self.n.wrapping_mul(rhs.n), self.d.wrapping_mul(rhs.d))
  }
}

impl Mul for SRational {
  type Output = SRational;

  fn mul(self, rhs: Self) -> Self::Output {
    SRational::new(self.n.wrapping_mul(rhs.n), self.d.wrapping_mul(rhs.d))
  }
}

macro_rules! rational_serde {
  ($t:ty, $int:ty, $name:expr) => {
    impl Serialize for $t {
      fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
      where
        S: Serializer,
      {
        serializer.serialize_str(&format!("{}/{}", self.n, self.d))
      }
    }

    impl<'de> Deserialize<'de> for $t {
      fn deserialize<D>(deserializer: D) -> std::result::Result<$t, D::Error>
      where
        D: Deserializer<'de>,
      {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        let values: Vec<&str> = s.split('/').collect();
        if values.len() != 2 {
          Err(D::Error::custom(format!("Invalid {} value: {}", $name, s)))
        } else {
          Ok(<$t>::new(
            values[0].parse::<$int>().map_err(D::Error::custom)?,
            values[1].parse::<$int>().map_err(D::Error::custom)?,
          ))
        }
      }
    }
  };
}

rational_serde!(Rational, u32, "rational");
rational_serde!(SRational, i32, "srational");

/// Variant selector used by strict lookups, see [`crate::Directory::get_as`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
  Byte,
  SByte,
  Short,
  SShort,
  Long,
  SLong,
  Long8,
  SLong8,
  Float,
  Double,
  Rational,
  SRational,
  Undefined,
  Ascii,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  /// 8-bit unsigned integer
  Byte(Vec<u8>),
  /// 8-bit signed integer
  SByte(Vec<i8>),
  /// 16-bit unsigned integer
  Short(Vec<u16>),
  /// 16-bit signed integer
  SShort(Vec<i16>),
  /// 32-bit unsigned integer
  Long(Vec<u32>),
  /// 32-bit signed integer
  SLong(Vec<i32>),
  /// 64-bit unsigned integer
  Long8(Vec<u64>),
  /// 64-bit signed integer
  SLong8(Vec<i64>),
  /// 32-bit IEEE floating point
  Float(Vec<f32>),
  /// 64-bit IEEE floating point
  Double(Vec<f64>),
  /// Fraction stored as two 32-bit unsigned integers
  Rational(Vec<Rational>),
  /// Fraction stored as two 32-bit signed integers
  SRational(Vec<SRational>),
  /// 8-bit byte that may contain anything, depending on the field
  Undefined(Vec<u8>),
  /// Text
  Ascii(String),
}

impl Value {
  pub fn kind(&self) -> ValueKind {
    match self {
      Self::Byte(_) => ValueKind::Byte,
      Self::SByte(_) => ValueKind::SByte,
      Self::Short(_) => ValueKind::Short,
      Self::SShort(_) => ValueKind::SShort,
      Self::Long(_) => ValueKind::Long,
      Self::SLong(_) => ValueKind::SLong,
      Self::Long8(_) => ValueKind::Long8,
      Self::SLong8(_) => ValueKind::SLong8,
      Self::Float(_) => ValueKind::Float,
      Self::Double(_) => ValueKind::Double,
      Self::Rational(_) => ValueKind::Rational,
      Self::SRational(_) => ValueKind::SRational,
      Self::Undefined(_) => ValueKind::Undefined,
      Self::Ascii(_) => ValueKind::Ascii,
    }
  }

  pub fn count(&self) -> usize {
    match self {
      Self::Byte(v) => v.len(),
      Self::SByte(v) => v.len(),
      Self::Short(v) => v.len(),
      Self::SShort(v) => v.len(),
      Self::Long(v) => v.len(),
      Self::SLong(v) => v.len(),
      Self::Long8(v) => v.len(),
      Self::SLong8(v) => v.len(),
      Self::Float(v) => v.len(),
      Self::Double(v) => v.len(),
      Self::Rational(v) => v.len(),
      Self::SRational(v) => v.len(),
      Self::Undefined(v) => v.len(),
      Self::Ascii(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.count() == 0
  }

  /// True for the integer array variants.
  pub fn is_integer(&self) -> bool {
    matches!(
      self,
      Self::Byte(_) | Self::SByte(_) | Self::Short(_) | Self::SShort(_) | Self::Long(_) | Self::SLong(_) | Self::Long8(_) | Self::SLong8(_) | Self::Undefined(_)
    )
  }

  /// Integer element at `idx`, widened to `i64`.
  pub fn get_i64(&self, idx: usize) -> Option<i64> {
    match self {
      Value::Byte(v) | Value::Undefined(v) => v.get(idx).map(|v| *v as i64),
      Value::SByte(v) => v.get(idx).map(|v| *v as i64),
      Value::Short(v) => v.get(idx).map(|v| *v as i64),
      Value::SShort(v) => v.get(idx).map(|v| *v as i64),
      Value::Long(v) => v.get(idx).map(|v| *v as i64),
      Value::SLong(v) => v.get(idx).map(|v| *v as i64),
      Value::Long8(v) => v.get(idx).and_then(|v| i64::try_from(*v).ok()),
      Value::SLong8(v) => v.get(idx).copied(),
      _ => None,
    }
  }

  /// Numeric element at `idx` as `f64`. Rationals with zero denominator yield `None`.
  pub fn get_f64(&self, idx: usize) -> Option<f64> {
    match self {
      Value::Float(v) => v.get(idx).map(|v| *v as f64),
      Value::Double(v) => v.get(idx).copied(),
      Value::Rational(v) => v.get(idx).and_then(Rational::to_f64),
      Value::SRational(v) => v.get(idx).and_then(SRational::to_f64),
      Value::Long8(v) => v.get(idx).map(|v| *v as f64),
      Value::Ascii(_) => None,
      _ => self.get_i64(idx).map(|v| v as f64),
    }
  }

  /// Single element at `idx`, keeping the variant.
  pub fn element(&self, idx: usize) -> Option<Value> {
    match self {
      Self::Byte(v) => v.get(idx).map(|v| Self::Byte(vec![*v])),
      Self::SByte(v) => v.get(idx).map(|v| Self::SByte(vec![*v])),
      Self::Short(v) => v.get(idx).map(|v| Self::Short(vec![*v])),
      Self::SShort(v) => v.get(idx).map(|v| Self::SShort(vec![*v])),
      Self::Long(v) => v.get(idx).map(|v| Self::Long(vec![*v])),
      Self::SLong(v) => v.get(idx).map(|v| Self::SLong(vec![*v])),
      Self::Long8(v) => v.get(idx).map(|v| Self::Long8(vec![*v])),
      Self::SLong8(v) => v.get(idx).map(|v| Self::SLong8(vec![*v])),
      Self::Float(v) => v.get(idx).map(|v| Self::Float(vec![*v])),
      Self::Double(v) => v.get(idx).map(|v| Self::Double(vec![*v])),
      Self::Rational(v) => v.get(idx).map(|v| Self::Rational(vec![*v])),
      Self::SRational(v) => v.get(idx).map(|v| Self::SRational(vec![*v])),
      Self::Undefined(v) => v.get(idx).map(|v| Self::Undefined(vec![*v])),
      Self::Ascii(_) => None,
    }
  }

  pub fn as_string(&self) -> Option<&str> {
    match self {
      Self::Ascii(v) => Some(v.as_str()),
      _ => None,
    }
  }

  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      Self::Byte(v) | Self::Undefined(v) => Some(v.as_slice()),
      _ => None,
    }
  }

  pub fn visual_rep(&self, limit: usize) -> String {
    fn join<T: Display>(v: &[T], limit: usize) -> String {
      v.iter().take(limit).map(|a| format!("{}", a)).collect::<Vec<String>>().join(" ")
    }
    match self {
      Value::Byte(v) | Value::Undefined(v) => v.iter().take(limit).map(|a| format!("{:X}", a)).collect::<Vec<String>>().join(" "),
      Value::SByte(v) => join(v, limit),
      Value::Short(v) => join(v, limit),
      Value::SShort(v) => join(v, limit),
      Value::Long(v) => join(v, limit),
      Value::SLong(v) => join(v, limit),
      Value::Long8(v) => join(v, limit),
      Value::SLong8(v) => join(v, limit),
      Value::Float(v) => join(v, limit),
      Value::Double(v) => join(v, limit),
      Value::Rational(v) => join(v, limit),
      Value::SRational(v) => join(v, limit),
      Value::Ascii(v) => v.clone(),
    }
  }

  pub fn value_type_name(&self) -> &'static str {
    match self {
      Self::Byte(_) => "BYTE",
      Self::SByte(_) => "SBYTE",
      Self::Short(_) => "SHORT",
      Self::SShort(_) => "SSHORT",
      Self::Long(_) => "LONG",
      Self::SLong(_) => "SLONG",
      Self::Long8(_) => "LONG8",
      Self::SLong8(_) => "SLONG8",
      Self::Float(_) => "FLOAT",
      Self::Double(_) => "DOUBLE",
      Self::Rational(_) => "RATIONAL",
      Self::SRational(_) => "SRATIONAL",
      Self::Undefined(_) => "UNDEF",
      Self::Ascii(_) => "ASCII",
    }
  }
}

macro_rules! value_from {
  ($t:ty, $variant:ident) => {
    impl From<$t> for Value {
      fn from(value: $t) -> Self {
        Value::$variant(vec![value])
      }
    }

    impl From<&[$t]> for Value {
      fn from(value: &[$t]) -> Self {
        Value::$variant(value.into())
      }
    }

    impl From<Vec<$t>> for Value {
      fn from(value: Vec<$t>) -> Self {
        Value::$variant(value)
      }
    }

    impl<const N: usize> From<[$t; N]> for Value {
      fn from(value: [$t; N]) -> Self {
        Value::$variant(value.into())
      }
    }
  };
}

value_from!(u8, Byte);
value_from!(i8, SByte);
value_from!(u16, Short);
value_from!(i16, SShort);
value_from!(u32, Long);
value_from!(i32, SLong);
value_from!(u64, Long8);
value_from!(i64, SLong8);
value_from!(f32, Float);
value_from!(f64, Double);
value_from!(Rational, Rational);
value_from!(SRational, SRational);

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Ascii(value.into())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Ascii(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rational_zero_denominator_is_kept() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let na = Rational::new(0, 0);
    assert!(na.is_not_applicable());
    assert!(!na.is_zero());
    assert_eq!(na.to_f64(), None);
    assert_eq!(na.simplified(), na);
    assert_eq!(Rational::new(5, 0).simplified(), Rational::new(5, 0));
    Ok(())
  }

  #[test]
  fn rational_arithmetic() -> std::result::Result<(), Box<dyn std::error::Error>> {
    assert_eq!(Rational::new(10, 40).simplified(), Rational::new(1, 4));
    assert_eq!((Rational::new(1, 2) * Rational::new(3, 4)), Rational::new(3, 8));
    assert_eq!(Rational::new(1, 250).reciprocal().to_f64(), Some(250.0));
    assert_eq!(SRational::new(6, -8).simplified(), SRational::new(-3, 4));
    assert_eq!(SRational::new(-1, 3).to_f64().map(|v| (v * 3.0).round()), Some(-1.0));
    Ok(())
  }

  #[test]
  fn rational_serde_string_form() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let yaml = serde_yaml::to_string(&Rational::new(1, 3))?;
    assert!(yaml.contains("1/3"));
    let back: SRational = serde_yaml::from_str("\"-7/2\"")?;
    assert_eq!(back, SRational::new(-7, 2));
    Ok(())
  }

  #[test]
  fn element_keeps_variant() {
    let v = Value::SShort(vec![-3, 4]);
    assert_eq!(v.element(0), Some(Value::SShort(vec![-3])));
    assert_eq!(v.element(2), None);
    assert_eq!(v.get_i64(1), Some(4));
    assert_eq!(Value::Rational(vec![Rational::new(1, 0)]).get_f64(0), None);
    assert_eq!(Value::from("abc").get_i64(0), None);
    assert_eq!(v.kind(), ValueKind::SShort);
  }
}
