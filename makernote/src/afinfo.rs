// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Decoder for self-describing records where the width of some fields
//! depends on a count stored in the first element (Canon AF info style).

use log::debug;

use crate::{
  MakernoteError, Result,
  directory::Directory,
  params::DecodeParams,
  tags::Block,
  value::Value,
};

/// Width of a bulk field, derived from the leading count.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BulkWidth {
  /// One element per counted item
  PerItem,
  /// One bit per counted item, packed into 16-bit words
  BitsPerItem16,
}

impl BulkWidth {
  pub fn resolve(self, count: usize) -> usize {
    match self {
      Self::PerItem => count,
      Self::BitsPerItem16 => count.div_ceil(16),
    }
  }
}

/// Field order of a variable record.
///
/// Fields not listed in `bulk` are scalars taking one element each.
#[derive(Debug)]
pub struct VariableLayout {
  pub block: Block,
  pub bulk: &'static [(u16, BulkWidth)],
}

impl VariableLayout {
  fn bulk_width(&self, field: u16) -> Option<BulkWidth> {
    self.bulk.iter().find(|(idx, _)| *idx == field).map(|(_, width)| *width)
  }
}

/// Walk `record` from left to right and store each field under `layout.block`.
///
/// Element 0 is the item count. Bulk fields are narrowed to `i16` and stored
/// as one `SShort` array. A bulk field that would run past the end is not
/// written, but its elements still count as consumed. The field counter moves
/// by one per field, independent of the field width. Elements left once the
/// counter reaches the span of the block are dropped with one error.
pub fn decode_variable_record(dir: &mut Directory, layout: &VariableLayout, record: &Value, params: &DecodeParams) {
  let len = record.count();
  let count = match leading_count(record) {
    Ok(count) => count,
    Err(err @ MakernoteError::MalformedCount(_)) => {
      dir.add_field_error(format!("{:?}: {}", layout.block, err), params.record_field_errors);
      0
    }
    Err(err) => {
      dir.add_error(format!("{:?}: {}", layout.block, err));
      return;
    }
  };
  debug!("{:?}: {} items in record of {} elements", layout.block, count, len);

  let mut i: usize = 0;
  let mut field: u32 = 0;
  while i < len {
    if field >= layout.block.span() {
      dir.add_error(format!(
        "{:?}: {} elements left after the last field {} of the block",
        layout.block,
        len - i,
        field - 1
      ));
      break;
    }
    let tag = layout.block.field(field as u16);
    match layout.bulk_width(field as u16) {
      Some(width) => {
        let width = width.resolve(count);
        match copy_narrowed(record, i, width) {
          Ok(values) => dir.set(tag, Value::SShort(values)),
          Err(err) => dir.add_field_error(format!("{:?} field {}: {}", layout.block, field, err), params.record_field_errors),
        }
        i = i.saturating_add(width);
      }
      None => {
        if let Some(element) = record.element(i) {
          dir.set(tag, element);
        }
        i += 1;
      }
    }
    field += 1;
  }
}

fn leading_count(record: &Value) -> Result<usize> {
  if !record.is_integer() {
    return Err(MakernoteError::UnexpectedType(format!("{} record has no item count", record.value_type_name())));
  }
  let raw = record
    .get_i64(0)
    .ok_or_else(|| MakernoteError::InsufficientData("record too short for item count".into()))?;
  usize::try_from(raw).map_err(|_| MakernoteError::MalformedCount(format!("negative item count {}", raw)))
}

fn copy_narrowed(record: &Value, start: usize, width: usize) -> Result<Vec<i16>> {
  let end = start
    .checked_add(width)
    .filter(|end| *end <= record.count())
    .ok_or_else(|| MakernoteError::MalformedCount(format!("{} elements at index {} exceed record of {}", width, start, record.count())))?;
  (start..end)
    .map(|idx| {
      record
        .get_i64(idx)
        .map(|v| v as i16)
        .ok_or_else(|| MakernoteError::InsufficientData(format!("no element at index {}", idx)))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  const LAYOUT: VariableLayout = VariableLayout {
    block: Block::CanonAfInfo,
    bulk: &[(8, BulkWidth::PerItem), (9, BulkWidth::PerItem), (10, BulkWidth::BitsPerItem16)],
  };

  fn header(points: u16) -> Vec<u16> {
    vec![points, points, 5472, 3648, 5472, 3648, 97, 98]
  }

  #[test]
  fn five_points() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut data = header(5);
    data.extend_from_slice(&[0xfff0, 0xfff8, 0, 8, 16]); // x
    data.extend_from_slice(&[3, 2, 1, 0, 0xffff]); // y
    data.push(0b10101); // in focus
    data.push(2); // primary point
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::Short(data), &DecodeParams::default());

    assert_eq!(dir.get_i16_array(Block::CanonAfInfo.field(8)), Some(vec![-16, -8, 0, 8, 16]));
    assert_eq!(dir.get_i16_array(Block::CanonAfInfo.field(9)), Some(vec![3, 2, 1, 0, -1]));
    assert_eq!(dir.get_i16_array(Block::CanonAfInfo.field(10)), Some(vec![0b10101]));
    assert_eq!(dir.get_i32(Block::CanonAfInfo.field(11)), Some(2));
    assert_eq!(dir.get_i32(Block::CanonAfInfo.field(2)), Some(5472));
    assert_eq!(dir.block_entries(Block::CanonAfInfo).count(), 12);
    assert!(dir.errors().is_empty());
    Ok(())
  }

  #[test]
  fn points_in_focus_width_rounds_up() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let points = 19;
    let mut data = header(points);
    data.extend(std::iter::repeat_n(1, points as usize * 2));
    data.extend_from_slice(&[0xffff, 0x0007]);
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::Short(data), &DecodeParams::default());
    assert_eq!(dir.get_i16_array(Block::CanonAfInfo.field(10)), Some(vec![-1, 7]));
    assert_eq!(BulkWidth::BitsPerItem16.resolve(16), 1);
    assert_eq!(BulkWidth::BitsPerItem16.resolve(17), 2);
    assert_eq!(BulkWidth::BitsPerItem16.resolve(0), 0);
    Ok(())
  }

  #[test]
  fn truncated_bulk_field_is_skipped() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut data = header(5);
    data.extend_from_slice(&[1, 2, 3, 4, 5]); // x
    data.extend_from_slice(&[1, 2, 3]); // y, truncated
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::Short(data), &DecodeParams::default());
    assert!(dir.contains(Block::CanonAfInfo.field(8)));
    assert!(!dir.contains(Block::CanonAfInfo.field(9)));
    assert!(!dir.contains(Block::CanonAfInfo.field(10)));
    assert_eq!(dir.errors().len(), 1);
    Ok(())
  }

  #[test]
  fn oversized_count_consumes_rest() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // 40 items claimed, but only 2 elements follow the header
    let data: Vec<i32> = vec![40, 0, 0, 0, 0, 0, 0, 0, 1, 2];
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::SLong(data), &DecodeParams::default());
    assert_eq!(dir.block_entries(Block::CanonAfInfo).count(), 8);
    assert_eq!(dir.errors().len(), 1);

    // A zero count makes all bulk fields empty and keeps the scalars aligned.
    let data: Vec<i32> = vec![0, 0, 0, 0, 0, 0, 0, 0, 42, 43];
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::SLong(data), &DecodeParams::default());
    assert_eq!(dir.get_i16_array(Block::CanonAfInfo.field(8)), Some(vec![]));
    assert_eq!(dir.get_i16_array(Block::CanonAfInfo.field(10)), Some(vec![]));
    assert_eq!(dir.get_i32(Block::CanonAfInfo.field(11)), Some(42));
    assert_eq!(dir.get_i32(Block::CanonAfInfo.field(12)), Some(43));
    Ok(())
  }

  #[test]
  fn fields_past_block_span_are_dropped() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    // zero items, so every field is one element wide
    let mut data = vec![0_u16; 300];
    data[249] = 7; // field 252, three empty bulk fields before it
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::Short(data), &DecodeParams::default());
    assert_eq!(dir.block_entries(Block::CanonAfInfo).count(), 256);
    assert_eq!(dir.get_i32(Block::CanonAfInfo.field(252)), Some(7));
    assert_eq!(dir.errors().len(), 1);
    assert_eq!(dir.raw_entries().len(), dir.len());
    Ok(())
  }

  #[test]
  fn empty_and_malformed_records() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::Short(vec![]), &DecodeParams::default());
    assert!(dir.is_empty());
    assert_eq!(dir.errors().len(), 1);

    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::SShort(vec![-3, 1, 2]), &DecodeParams::default());
    assert_eq!(dir.get_i32(Block::CanonAfInfo.field(0)), Some(-3));
    assert_eq!(dir.block_entries(Block::CanonAfInfo).count(), 3);
    assert_eq!(dir.errors().len(), 1);

    let quiet = DecodeParams {
      record_field_errors: false,
      ..Default::default()
    };
    let mut dir = Directory::new();
    decode_variable_record(&mut dir, &LAYOUT, &Value::Short(vec![9, 0, 0, 0, 0, 0, 0, 0, 1]), &quiet);
    assert!(dir.errors().is_empty());
    Ok(())
  }
}
