// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Split flat records into one synthetic tag per index.

use log::debug;

use crate::{
  bits::Endian,
  directory::Directory,
  tags::{Block, TagId},
  value::Value,
};

/// Element kind a record is expected to arrive in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SplitKind {
  /// 16/32-bit integer array, one tag per element
  Integer,
  /// Byte array holding big-endian 32-bit signed words, one tag per word
  BigEndianWords,
}

impl SplitKind {
  pub fn accepts(self, value: &Value) -> bool {
    match self {
      Self::Integer => matches!(value, Value::Short(_) | Value::SShort(_) | Value::Long(_) | Value::SLong(_)),
      Self::BigEndianWords => matches!(value, Value::Byte(_) | Value::Undefined(_)),
    }
  }
}

/// Split `value` into `block`, one tag per element.
///
/// Previous fields of the block are dropped first, so the last split wins.
/// A value of another kind is not an error: it is stored unsplit under
/// `source_tag`. Elements past the span of `block` would take ids of the
/// next block, they are dropped with one recorded error. Returns the number
/// of synthetic tags written.
pub fn split_array(dir: &mut Directory, source_tag: u16, block: Block, value: Value, kind: SplitKind) -> usize {
  if !kind.accepts(&value) {
    debug!(
      "Tag {:#06x}: {} is not a {:?} record, storing unsplit",
      source_tag,
      value.value_type_name(),
      kind
    );
    dir.set(TagId::Entry(source_tag), value);
    return 0;
  }

  dir.clear_block(block);
  let bytes = value.as_bytes().unwrap_or_default();
  let available = match kind {
    SplitKind::Integer => value.count(),
    SplitKind::BigEndianWords => bytes.len() / 4,
  };
  let written = available.min(block.span() as usize);
  if written < available {
    dir.add_error(format!(
      "Tag {:#06x}: {} elements exceed {:?} span of {}, {} dropped",
      source_tag,
      available,
      block,
      written,
      available - written
    ));
  }
  match kind {
    SplitKind::Integer => split_elements(dir, block, &value, written),
    SplitKind::BigEndianWords => split_words(dir, block, bytes, written),
  }
  debug!("Tag {:#06x}: split into {} fields of {:?}", source_tag, written, block);
  written
}

// `count` never exceeds the block span, so indices fit `u16`
fn split_elements(dir: &mut Directory, block: Block, value: &Value, count: usize) {
  for i in 0..count {
    if let Some(element) = value.element(i) {
      dir.set(block.field(i as u16), element);
    }
  }
}

fn split_words(dir: &mut Directory, block: Block, bytes: &[u8], count: usize) {
  for i in 0..count {
    // count is bounded by the buffer length
    if let Ok(word) = Endian::Big.read_i32(bytes, i * 4) {
      dir.set(block.field(i as u16), Value::SLong(vec![word]));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_one_tag_per_element() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut dir = Directory::new();
    let input = vec![0_u16, 2, 0, 4, 1, 0, 0, 3];
    let n = split_array(&mut dir, 0x0001, Block::CanonCameraSettings, Value::Short(input.clone()), SplitKind::Integer);
    assert_eq!(n, input.len());
    assert_eq!(dir.len(), input.len());
    for (i, v) in input.iter().enumerate() {
      assert_eq!(dir.get(Block::CanonCameraSettings.field(i as u16)), Some(&Value::Short(vec![*v])));
    }
    assert!(!dir.contains(0x0001_u16));
    Ok(())
  }

  #[test]
  fn second_split_replaces_first() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut dir = Directory::new();
    split_array(&mut dir, 0x0004, Block::CanonShotInfo, Value::SShort(vec![1, 2, 3, 4]), SplitKind::Integer);
    split_array(&mut dir, 0x0004, Block::CanonShotInfo, Value::SShort(vec![9, 8]), SplitKind::Integer);
    assert_eq!(dir.block_entries(Block::CanonShotInfo).count(), 2);
    assert_eq!(dir.get_i32(Block::CanonShotInfo.field(0)), Some(9));
    assert_eq!(dir.get_i32(Block::CanonShotInfo.field(1)), Some(8));
    assert!(!dir.contains(Block::CanonShotInfo.field(2)));
    Ok(())
  }

  #[test]
  fn unexpected_kind_is_stored_unsplit() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut dir = Directory::new();
    let value = Value::Ascii("not an array".into());
    let n = split_array(&mut dir, 0x0002, Block::CanonFocalLength, value.clone(), SplitKind::Integer);
    assert_eq!(n, 0);
    assert_eq!(dir.get(0x0002_u16), Some(&value));
    assert_eq!(dir.block_entries(Block::CanonFocalLength).count(), 0);
    assert!(dir.errors().is_empty());

    let longs = Value::Long(vec![1, 2]);
    split_array(&mut dir, 0x0001, Block::OlympusCameraSettings, longs.clone(), SplitKind::BigEndianWords);
    assert_eq!(dir.get(0x0001_u16), Some(&longs));
    Ok(())
  }

  #[test]
  fn elements_past_block_span_are_dropped() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut dir = Directory::new();
    dir.set(Block::CanonFocalLength.field(0), Value::Short(vec![2]));
    dir.set(Block::CanonFocalLength.field(1), Value::Short(vec![50]));
    let input: Vec<u16> = (0..300).collect();
    let n = split_array(&mut dir, 0x0001, Block::CanonCameraSettings, Value::Short(input), SplitKind::Integer);
    assert_eq!(n, 256);
    assert_eq!(dir.block_entries(Block::CanonCameraSettings).count(), 256);
    assert_eq!(dir.get_i32(Block::CanonCameraSettings.field(255)), Some(255));
    assert_eq!(dir.get_i32(Block::CanonFocalLength.field(0)), Some(2));
    assert_eq!(dir.errors().len(), 1);
    // no two entries share a flat id
    assert_eq!(dir.raw_entries().len(), dir.len());
    Ok(())
  }

  #[test]
  fn big_endian_words() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut dir = Directory::new();
    let bytes = vec![0, 0, 0, 1, 0xff, 0xff, 0xff, 0xfe, 0, 0, 1, 0, 0xaa];
    let n = split_array(&mut dir, 0x0003, Block::OlympusCameraSettings, Value::Undefined(bytes), SplitKind::BigEndianWords);
    assert_eq!(n, 3);
    assert_eq!(dir.get_i32(Block::OlympusCameraSettings.field(0)), Some(1));
    assert_eq!(dir.get_i32(Block::OlympusCameraSettings.field(1)), Some(-2));
    assert_eq!(dir.get_i32(Block::OlympusCameraSettings.field(2)), Some(256));
    assert!(!dir.contains(Block::OlympusCameraSettings.field(3)));
    Ok(())
  }
}
