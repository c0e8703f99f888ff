// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Enciphered fixed-offset records.
//!
//! Sony obfuscates several maker note blocks (0x2010, 0x900b, 0x9050, 0x940x)
//! with a simple substitution cipher. The formula is `c = (b*b*b) % 249`, where
//! `c` is the enciphered byte. Bytes with values 249-255 are not translated.
//! Once deciphered, every field lives at a fixed byte offset.

use log::debug;

use crate::{
  MakernoteError, Result,
  bits::{Endian, window},
  codecs,
  directory::Directory,
  params::DecodeParams,
  tags::Block,
  value::Value,
};

const fn encipher_table() -> [u8; 256] {
  let mut tbl = [0; 256];
  let mut i = 0;
  while i < tbl.len() {
    tbl[i] = if i >= 249 { i as u8 } else { (i * i * i % 249) as u8 };
    i += 1;
  }
  tbl
}

const fn decipher_table() -> [u8; 256] {
  let enc = encipher_table();
  let mut tbl = [0; 256];
  let mut i = 0;
  while i < tbl.len() {
    tbl[enc[i] as usize] = i as u8;
    i += 1;
  }
  tbl
}

const ENCIPHER_TABLE: [u8; 256] = encipher_table();
const DECIPHER_TABLE: [u8; 256] = decipher_table();

pub fn encipher_in_place(data: &mut [u8]) {
  data.iter_mut().for_each(|v| *v = ENCIPHER_TABLE[*v as usize]);
}

pub fn decipher_in_place(data: &mut [u8]) {
  data.iter_mut().for_each(|v| *v = DECIPHER_TABLE[*v as usize]);
}

pub fn decipher(data: &[u8]) -> Vec<u8> {
  let mut buf = Vec::from(data);
  decipher_in_place(&mut buf);
  buf
}

pub fn encipher(data: &[u8]) -> Vec<u8> {
  let mut buf = Vec::from(data);
  encipher_in_place(&mut buf);
  buf
}

/// Storage format of a fixed field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldFormat {
  U8,
  I8,
  U16,
  I16,
  U32,
  I32,
}

impl FieldFormat {
  pub fn width(self) -> usize {
    match self {
      Self::U8 | Self::I8 => 1,
      Self::U16 | Self::I16 => 2,
      Self::U32 | Self::I32 => 4,
    }
  }
}

/// Conversion applied to a raw field before it is stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Conversion {
  None,
  SonyExposureTime,
  SonyFNumber,
  SonyAperture,
  /// Zero based counters that are presented one based
  PlusOne,
}

/// One field of a fixed record: local tag (equal to its byte offset), format
/// and element count.
#[derive(Debug, Copy, Clone)]
pub struct FieldSpec {
  pub tag: u16,
  pub format: FieldFormat,
  pub count: usize,
  pub conversion: Conversion,
}

impl FieldSpec {
  pub const fn new(tag: u16, format: FieldFormat) -> Self {
    Self {
      tag,
      format,
      count: 1,
      conversion: Conversion::None,
    }
  }

  pub const fn array(tag: u16, format: FieldFormat, count: usize) -> Self {
    Self {
      tag,
      format,
      count,
      conversion: Conversion::None,
    }
  }

  pub const fn converted(tag: u16, format: FieldFormat, conversion: Conversion) -> Self {
    Self {
      tag,
      format,
      count: 1,
      conversion,
    }
  }

  pub fn offset(&self) -> usize {
    self.tag as usize
  }
}

#[derive(Debug)]
pub struct FixedLayout {
  pub block: Block,
  pub fields: &'static [FieldSpec],
}

/// Decipher `data` once and store every field of `layout` that fits.
///
/// Fields running past the end are skipped one by one, each with an error.
/// Returns the number of fields written.
pub fn decode_ciphered_record(dir: &mut Directory, layout: &FixedLayout, data: &[u8], endian: Endian, params: &DecodeParams) -> usize {
  let plain = decipher(data);
  debug!("{:?}: deciphered {} bytes", layout.block, plain.len());
  let mut written = 0;
  for field in layout.fields {
    match read_field(&plain, field, endian) {
      Ok(value) => {
        dir.set(layout.block.field(field.tag), value);
        written += 1;
      }
      Err(err) => dir.add_field_error(format!("{:?} field {:#06x}: {}", layout.block, field.tag, err), params.record_field_errors),
    }
  }
  written
}

fn read_field(buf: &[u8], field: &FieldSpec, endian: Endian) -> Result<Value> {
  let len = field
    .count
    .checked_mul(field.format.width())
    .ok_or_else(|| MakernoteError::General(format!("field size overflow for {} elements", field.count)))?;
  // check whole field before reading any element
  window(buf, field.offset(), len)?;
  let pos = |i: usize| field.offset() + i * field.format.width();

  let raw = match field.format {
    FieldFormat::U8 => Value::Byte((0..field.count).map(|i| endian.read_u8(buf, pos(i))).collect::<Result<_>>()?),
    FieldFormat::I8 => Value::SByte((0..field.count).map(|i| endian.read_i8(buf, pos(i))).collect::<Result<_>>()?),
    FieldFormat::U16 => Value::Short((0..field.count).map(|i| endian.read_u16(buf, pos(i))).collect::<Result<_>>()?),
    FieldFormat::I16 => Value::SShort((0..field.count).map(|i| endian.read_i16(buf, pos(i))).collect::<Result<_>>()?),
    FieldFormat::U32 => Value::Long((0..field.count).map(|i| endian.read_u32(buf, pos(i))).collect::<Result<_>>()?),
    FieldFormat::I32 => Value::SLong((0..field.count).map(|i| endian.read_i32(buf, pos(i))).collect::<Result<_>>()?),
  };
  convert(raw, field.conversion)
}

fn convert(raw: Value, conversion: Conversion) -> Result<Value> {
  Ok(match conversion {
    Conversion::None => raw,
    Conversion::SonyExposureTime => Value::Double(vec![codecs::sony_exposure_time(code(&raw)?)]),
    Conversion::SonyFNumber => Value::Double(vec![codecs::sony_fnumber(code(&raw)?)]),
    Conversion::SonyAperture => Value::Double(vec![codecs::sony_aperture(code(&raw)?)]),
    Conversion::PlusOne => match raw {
      Value::Long(v) => Value::Long8(v.into_iter().map(|x| x as u64 + 1).collect()),
      Value::SLong(v) => Value::SLong8(v.into_iter().map(|x| x as i64 + 1).collect()),
      other => Value::SLong8(
        (0..other.count())
          .map(|i| other.get_i64(i).map(|x| x + 1).ok_or_else(|| MakernoteError::UnexpectedType(other.value_type_name().into())))
          .collect::<Result<_>>()?,
      ),
    },
  })
}

fn code(raw: &Value) -> Result<f64> {
  raw
    .get_f64(0)
    .ok_or_else(|| MakernoteError::UnexpectedType(format!("{} field can not be converted", raw.value_type_name())))
}
