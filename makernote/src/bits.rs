// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::{MakernoteError, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endian {
  Big,
  #[default]
  Little,
}

impl Endian {
  #[inline]
  pub fn read_u8(&self, buf: &[u8], offset: usize) -> Result<u8> {
    Ok(window(buf, offset, 1)?[0])
  }

  #[inline]
  pub fn read_i8(&self, buf: &[u8], offset: usize) -> Result<i8> {
    Ok(window(buf, offset, 1)?[0] as i8)
  }

  #[inline]
  pub fn read_u16(&self, buf: &[u8], offset: usize) -> Result<u16> {
    let buf = window(buf, offset, 2)?;
    Ok(match *self {
      Self::Big => BigEndian::read_u16(buf),
      Self::Little => LittleEndian::read_u16(buf),
    })
  }

  #[inline]
  pub fn read_i16(&self, buf: &[u8], offset: usize) -> Result<i16> {
    let buf = window(buf, offset, 2)?;
    Ok(match *self {
      Self::Big => BigEndian::read_i16(buf),
      Self::Little => LittleEndian::read_i16(buf),
    })
  }

  #[inline]
  pub fn read_u32(&self, buf: &[u8], offset: usize) -> Result<u32> {
    let buf = window(buf, offset, 4)?;
    Ok(match *self {
      Self::Big => BigEndian::read_u32(buf),
      Self::Little => LittleEndian::read_u32(buf),
    })
  }

  #[inline]
  pub fn read_i32(&self, buf: &[u8], offset: usize) -> Result<i32> {
    let buf = window(buf, offset, 4)?;
    Ok(match *self {
      Self::Big => BigEndian::read_i32(buf),
      Self::Little => LittleEndian::read_i32(buf),
    })
  }
}

/// Borrow `len` bytes at `offset`, or fail if the slice is too short.
pub fn window(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
  offset
    .checked_add(len)
    .and_then(|end| buf.get(offset..end))
    .ok_or_else(|| MakernoteError::InsufficientData(format!("{} bytes at offset {:#x} exceed buffer of {} bytes", len, offset, buf.len())))
}
