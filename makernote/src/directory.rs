// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::collections::BTreeMap;

use log::warn;
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
  tags::{Block, TagId},
  value::{Rational, SRational, Value, ValueKind},
};

/// Decoded maker note values, keyed by tag id, plus a log of decode errors.
///
/// A directory is filled by one decoder call and is read-only afterwards.
/// Getters never fail, a missing entry or a variant that does not fit the
/// requested type yields `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
  entries: BTreeMap<TagId, Value>,
  errors: Vec<String>,
}

impl Directory {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store a value, replacing any previous value of the same tag.
  pub fn set<T: Into<TagId>>(&mut self, tag: T, value: Value) {
    self.entries.insert(tag.into(), value);
  }

  pub fn add_error<S: Into<String>>(&mut self, msg: S) {
    let msg = msg.into();
    warn!("Makernote decode error: {}", msg);
    self.errors.push(msg);
  }

  /// Per-field failure, only kept in the error log when `record` is set.
  pub(crate) fn add_field_error<S: Into<String>>(&mut self, msg: S, record: bool) {
    if record {
      self.add_error(msg);
    } else {
      warn!("Makernote field skipped: {}", msg.into());
    }
  }

  pub fn errors(&self) -> &[String] {
    &self.errors
  }

  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  /// Remove all synthetic tags of `block`.
  pub fn clear_block(&mut self, block: Block) {
    self.entries.retain(|tag, _| tag.block() != Some(block));
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains<T: Into<TagId>>(&self, tag: T) -> bool {
    self.entries.contains_key(&tag.into())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&TagId, &Value)> {
    self.entries.iter()
  }

  /// Entries of one block in local index order.
  pub fn block_entries(&self, block: Block) -> impl Iterator<Item = (u16, &Value)> {
    self.entries.iter().filter_map(move |(tag, value)| match tag {
      TagId::Field(b, idx) if *b == block => Some((*idx, value)),
      _ => None,
    })
  }

  /// Entries with flattened numeric ids, ordered by that id.
  pub fn raw_entries(&self) -> BTreeMap<u32, &Value> {
    self.entries.iter().map(|(tag, value)| (tag.raw(), value)).collect()
  }

  pub fn get<T: Into<TagId>>(&self, tag: T) -> Option<&Value> {
    self.entries.get(&tag.into())
  }

  /// Strict lookup, only returns the value if it is stored as `kind`.
  pub fn get_as<T: Into<TagId>>(&self, tag: T, kind: ValueKind) -> Option<&Value> {
    self.get(tag).filter(|value| value.kind() == kind)
  }

  pub fn get_i64<T: Into<TagId>>(&self, tag: T) -> Option<i64> {
    self.get(tag).and_then(|v| v.get_i64(0))
  }

  pub fn get_i32<T: Into<TagId>>(&self, tag: T) -> Option<i32> {
    self.get_i64(tag).and_then(|v| i32::try_from(v).ok())
  }

  /// First element as `i16`. `Short` values are reinterpreted, cameras write
  /// signed fields as SHORT.
  pub fn get_i16<T: Into<TagId>>(&self, tag: T) -> Option<i16> {
    match self.get(tag) {
      Some(Value::Short(v)) => v.first().map(|v| *v as i16),
      Some(value) => value.get_i64(0).and_then(|v| i16::try_from(v).ok()),
      None => None,
    }
  }

  pub fn get_u32<T: Into<TagId>>(&self, tag: T) -> Option<u32> {
    self.get_i64(tag).and_then(|v| u32::try_from(v).ok())
  }

  pub fn get_f64<T: Into<TagId>>(&self, tag: T) -> Option<f64> {
    self.get(tag).and_then(|v| v.get_f64(0))
  }

  pub fn get_rational<T: Into<TagId>>(&self, tag: T) -> Option<Rational> {
    match self.get(tag) {
      Some(Value::Rational(v)) => v.first().copied(),
      _ => None,
    }
  }

  pub fn get_srational<T: Into<TagId>>(&self, tag: T) -> Option<SRational> {
    match self.get(tag) {
      Some(Value::SRational(v)) => v.first().copied(),
      _ => None,
    }
  }

  /// All elements of an integer value, `None` if any element does not fit.
  pub fn get_i32_array<T: Into<TagId>>(&self, tag: T) -> Option<Vec<i32>> {
    let value = self.get(tag).filter(|v| v.is_integer())?;
    (0..value.count()).map(|i| value.get_i64(i).and_then(|v| i32::try_from(v).ok())).collect()
  }

  pub fn get_i16_array<T: Into<TagId>>(&self, tag: T) -> Option<Vec<i16>> {
    match self.get(tag) {
      Some(Value::SShort(v)) => Some(v.clone()),
      _ => None,
    }
  }

  pub fn get_bytes<T: Into<TagId>>(&self, tag: T) -> Option<&[u8]> {
    self.get(tag).and_then(Value::as_bytes)
  }

  pub fn get_string<T: Into<TagId>>(&self, tag: T) -> Option<&str> {
    self.get(tag).and_then(Value::as_string)
  }
}

impl Serialize for Directory {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let mut state = serializer.serialize_struct("Directory", 2)?;
    state.serialize_field("entries", &self.raw_entries())?;
    state.serialize_field("errors", &self.errors)?;
    state.end()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_overwrites() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut dir = Directory::new();
    dir.set(0x10_u16, Value::Short(vec![1]));
    dir.set(0x10_u16, Value::Ascii("EOS".into()));
    assert_eq!(dir.len(), 1);
    assert_eq!(dir.get_string(0x10_u16), Some("EOS"));
    assert_eq!(dir.get_i32(0x10_u16), None);
    Ok(())
  }

  #[test]
  fn getters_return_none_on_variant_mismatch() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut dir = Directory::new();
    let tag = Block::CanonShotInfo.field(2);
    dir.set(tag, Value::Short(vec![160]));
    assert_eq!(dir.get_as(tag, ValueKind::Short), Some(&Value::Short(vec![160])));
    assert_eq!(dir.get_as(tag, ValueKind::SShort), None);
    assert_eq!(dir.get_i32(tag), Some(160));
    assert_eq!(dir.get_f64(tag), Some(160.0));
    assert_eq!(dir.get_rational(tag), None);
    assert_eq!(dir.get_bytes(tag), None);
    assert_eq!(dir.get_i32(Block::CanonShotInfo.field(3)), None);
    Ok(())
  }

  #[test]
  fn out_of_range_integers_are_absent() {
    let mut dir = Directory::new();
    dir.set(1_u16, Value::Long(vec![u32::MAX]));
    dir.set(2_u16, Value::SLong(vec![-1]));
    assert_eq!(dir.get_i32(1_u16), None);
    assert_eq!(dir.get_u32(1_u16), Some(u32::MAX));
    assert_eq!(dir.get_u32(2_u16), None);
    assert_eq!(dir.get_i32_array(1_u16), None);
  }

  #[test]
  fn short_reads_back_signed() {
    let mut dir = Directory::new();
    dir.set(1_u16, Value::Short(vec![0xfff4]));
    dir.set(2_u16, Value::SShort(vec![-32]));
    dir.set(3_u16, Value::Long(vec![0x1_0000]));
    dir.set(4_u16, Value::Ascii("x".into()));
    assert_eq!(dir.get_i16(1_u16), Some(-12));
    assert_eq!(dir.get_i32(1_u16), Some(0xfff4));
    assert_eq!(dir.get_i16(2_u16), Some(-32));
    assert_eq!(dir.get_i16(3_u16), None);
    assert_eq!(dir.get_i16(4_u16), None);
  }

  #[test]
  fn errors_keep_order() {
    crate::init_test_logger();
    let mut dir = Directory::new();
    dir.add_error("first");
    dir.add_error(String::from("second"));
    assert_eq!(dir.errors(), &["first".to_string(), "second".to_string()]);
    assert!(dir.is_empty());
  }

  #[test]
  fn clear_block_only_touches_block() {
    let mut dir = Directory::new();
    dir.set(Block::CanonFocalLength.field(0), Value::Short(vec![1]));
    dir.set(Block::CanonFocalLength.field(1), Value::Short(vec![50]));
    dir.set(Block::CanonShotInfo.field(1), Value::Short(vec![0]));
    dir.set(0x0002_u16, Value::Short(vec![1, 50]));
    dir.clear_block(Block::CanonFocalLength);
    assert_eq!(dir.len(), 2);
    assert_eq!(dir.block_entries(Block::CanonFocalLength).count(), 0);
  }

  #[test]
  fn serializes_raw_ids() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut dir = Directory::new();
    dir.set(Block::CanonAfInfo.field(0), Value::Short(vec![9]));
    dir.add_error("broken");
    let yaml = serde_yaml::to_string(&dir)?;
    assert!(yaml.contains("53760"), "{}", yaml); // 0xD200
    assert!(yaml.contains("broken"));
    Ok(())
  }
}
