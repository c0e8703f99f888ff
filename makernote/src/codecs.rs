// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Stateless numeric conversions for raw maker note values.
//!
//! All functions return full precision values. Rounding is only done by the
//! formatting helpers at the bottom of this module.
//!
//! Where each codec is applied:
//!
//! * `decode_modulo_ev`: Canon ShotInfo and CameraSettings EV codes
//! * `decode_bit_flags`: Canon CameraSettings flash bits
//! * `iso_from_apex`, `shutter_from_apex`: Olympus camera settings words
//! * `fnumber_from_root_code`: Olympus Equipment IFD aperture codes
//! * `min_max_triple`: Olympus CameraSettings IFD `[value, min, max]` settings
//! * `sony_*`: conversions of the Sony ciphered records
//! * `ev_from_ratio`: program shift arrays `[a, b, c, ..]`. None of the Canon,
//!   Olympus or Sony records decoded here carry one, callers apply it to the
//!   raw array of other maker notes
//! * `round_significant`: `format_fnumber`

use std::f64::consts::SQRT_2;
use std::fmt::Display;

use itertools::Itertools;

/// Label(s) for one bit of a flag word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BitFlag {
  pub bit: u8,
  /// Label if the bit is clear
  pub low: Option<&'static str>,
  /// Label if the bit is set
  pub high: Option<&'static str>,
}

impl BitFlag {
  /// Flag that is only reported when set.
  pub const fn set(bit: u8, label: &'static str) -> Self {
    Self {
      bit,
      low: None,
      high: Some(label),
    }
  }

  pub const fn either(bit: u8, low: &'static str, high: &'static str) -> Self {
    Self {
      bit,
      low: Some(low),
      high: Some(high),
    }
  }
}

/// Labels for all bits of `value`, in bit order.
///
/// Every bit is tested on its own as `(value >> bit) & 1`.
pub fn decode_bit_flags(value: u64, flags: &[BitFlag]) -> Vec<&'static str> {
  flags
    .iter()
    .filter(|flag| flag.bit < 64)
    .sorted_by_key(|flag| flag.bit)
    .filter_map(|flag| if (value >> flag.bit) & 1 == 1 { flag.high } else { flag.low })
    .collect()
}

/// Decode an EV value stored in 1/32 steps.
///
/// Thirds of a stop do not fall on a 1/32 step, cameras store them as
/// 0x0c (1/3) and 0x14 (2/3).
pub fn decode_modulo_ev(val: i32) -> f64 {
  let sign = if val < 0 { -1.0 } else { 1.0 };
  let val = (val as i64).abs();
  let frac = val & 0x1f;
  let base = val & !0x1f;
  let frac = match frac {
    0x0c => 32.0 / 3.0,
    0x14 => 64.0 / 3.0,
    f => f as f64,
  };
  sign * (base as f64 + frac) / 32.0
}

/// A value together with its valid range
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MinMax {
  pub value: i32,
  pub min: i32,
  pub max: i32,
}

impl Display for MinMax {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} (min {}, max {})", self.value, self.min, self.max)
  }
}

/// Interpret `[value, min, max]`.
pub fn min_max_triple(values: &[i32]) -> Option<MinMax> {
  match values {
    [value, min, max, ..] => Some(MinMax {
      value: *value,
      min: *min,
      max: *max,
    }),
    _ => None,
  }
}

/// F-number from a code in 1/256 steps of half stops: `sqrt(2)^(code/256)`
pub fn fnumber_from_root_code(code: f64) -> f64 {
  SQRT_2.powf(code / 256.0)
}

/// ISO from an APEX film speed value in 1/8 steps
pub fn iso_from_apex(code: f64) -> f64 {
  2_f64.powf(code / 8.0 - 1.0) * 3.125
}

/// Exposure time in seconds from an APEX time value in 1/8 steps
pub fn shutter_from_apex(code: f64) -> f64 {
  2_f64.powf((49.0 - code) / 8.0)
}

/// Sony exposure time in seconds, `0` means not set
pub fn sony_exposure_time(code: f64) -> f64 {
  if code == 0.0 { 0.0 } else { 2_f64.powf(16.0 - code / 256.0) }
}

pub fn sony_fnumber(code: f64) -> f64 {
  2_f64.powf((code / 256.0 - 16.0) / 2.0)
}

/// Sony min/max aperture from an 8-bit code
pub fn sony_aperture(code: f64) -> f64 {
  2_f64.powf((code / 8.0 - 1.06) / 2.0)
}

/// EV from `[a, b, c, ..]` as `a * b / c`.
///
/// Returns `None` for less than three values or `c == 0`.
pub fn ev_from_ratio(values: &[i32]) -> Option<f64> {
  match values {
    [_, _, 0, ..] => None,
    [a, b, c, ..] => Some(*a as f64 * *b as f64 / *c as f64),
    _ => None,
  }
}

/// Round half away from zero to `digits` significant digits.
pub fn round_significant(value: f64, digits: u32) -> f64 {
  if value == 0.0 || !value.is_finite() || digits == 0 {
    return value;
  }
  let magnitude = value.abs().log10().floor() as i32;
  let scale = 10_f64.powi(digits as i32 - 1 - magnitude);
  (value * scale).round() / scale
}

/// Format an f-number with two significant digits, e.g. `f/5.7` or `f/11`.
pub fn format_fnumber(fnumber: f64) -> String {
  format!("f/{}", round_significant(fnumber, 2))
}

/// Format an EV value with up to two decimals, e.g. `-8.75 EV` or `0.0 EV`.
pub fn format_ev(ev: f64) -> String {
  let mut rounded = (ev * 100.0).round() / 100.0;
  if rounded == 0.0 {
    rounded = 0.0; // no "-0.0"
  }
  let mut s = format!("{:.2}", rounded);
  while s.ends_with('0') {
    s.pop();
  }
  if s.ends_with('.') {
    s.push('0');
  }
  format!("{} EV", s)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
  }

  #[test]
  fn modulo_ev() {
    assert_eq!(decode_modulo_ev(0x00), 0.0);
    assert_close(decode_modulo_ev(0x0c), 1.0 / 3.0);
    assert_eq!(decode_modulo_ev(0x10), 0.5);
    assert_close(decode_modulo_ev(0x14), 2.0 / 3.0);
    assert_eq!(decode_modulo_ev(0x20), 1.0);
    assert_eq!(decode_modulo_ev(-0x10), -0.5);
    assert_close(decode_modulo_ev(-0x2c), -4.0 / 3.0);
    assert_close(decode_modulo_ev(0x4c), 2.0 + 1.0 / 3.0);
    assert_eq!(decode_modulo_ev(i32::MIN), -(1_i64 << 31) as f64 / 32.0);
  }

  const LABELS: [BitFlag; 6] = [
    BitFlag::set(0, "Manual"),
    BitFlag::set(1, "TTL"),
    BitFlag::set(2, "A-TTL"),
    BitFlag::set(3, "E-TTL"),
    BitFlag::set(4, "FP sync enabled"),
    BitFlag::set(5, "2nd-curtain sync used"),
  ];

  #[test]
  fn bit_flags_only_report_set_bits() {
    assert_eq!(decode_bit_flags(0b101, &LABELS), vec!["Manual", "A-TTL"]);
    assert_eq!(decode_bit_flags(0, &LABELS), Vec::<&str>::new());
    assert_eq!(decode_bit_flags(0b100_0000, &LABELS), Vec::<&str>::new());
  }

  #[test]
  fn bit_flags_low_and_high_labels() {
    let flags = [BitFlag::either(3, "Off", "On"), BitFlag::either(0, "Single", "Continuous")];
    assert_eq!(decode_bit_flags(0b1000, &flags), vec!["Single", "On"]);
    assert_eq!(decode_bit_flags(0b0001, &flags), vec!["Continuous", "Off"]);
  }

  #[test]
  fn min_max() {
    let mm = min_max_triple(&[0, -4, 4]);
    assert_eq!(mm, Some(MinMax { value: 0, min: -4, max: 4 }));
    assert_eq!(mm.map(|v| v.to_string()), Some("0 (min -4, max 4)".to_string()));
    assert_eq!(min_max_triple(&[1, 2]), None);
  }

  #[test]
  fn power_law() {
    assert_close(fnumber_from_root_code(0.0), 1.0);
    assert_close(fnumber_from_root_code(256.0 * 5.0), 5.6568);
    assert_close(iso_from_apex(48.0), 100.0);
    assert_close(shutter_from_apex(49.0), 1.0);
    assert_close(shutter_from_apex(57.0), 0.5);
    assert_eq!(sony_exposure_time(0.0), 0.0);
    assert_close(sony_exposure_time(16.0 * 256.0), 1.0);
    assert_close(sony_fnumber(16.0 * 256.0 + 5.0 * 256.0), 5.6568);
    assert_close(sony_aperture(8.0 * 1.06), 1.0);
  }

  #[test]
  fn program_shift() {
    assert_eq!(ev_from_ratio(&[0, 1, 3, 0]).map(format_ev), Some("0.0 EV".to_string()));
    assert_eq!(ev_from_ratio(&[-105, 1, 12, 0]).map(format_ev), Some("-8.75 EV".to_string()));
    assert_eq!(ev_from_ratio(&[5, 1, 0, 0]), None);
    assert_eq!(ev_from_ratio(&[5, 1]), None);
    assert_eq!(format_ev(1.0 / 3.0), "0.33 EV");
    assert_eq!(format_ev(0.5), "0.5 EV");
  }

  #[test]
  fn significant_digits() {
    assert_eq!(round_significant(2.25, 2), 2.3);
    assert_eq!(round_significant(-2.25, 2), -2.3);
    assert_close(round_significant(fnumber_from_root_code(256.0 * 5.0), 2), 5.7);
    assert_eq!(round_significant(0.0, 3), 0.0);
    assert_eq!(format_fnumber(fnumber_from_root_code(256.0 * 5.0)), "f/5.7");
    assert_eq!(format_fnumber(11.3), "f/11");
    assert_eq!(format_fnumber(2.0), "f/2");
  }
}
