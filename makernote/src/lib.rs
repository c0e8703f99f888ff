// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Decoder for vendor specific maker note records.
//!
//! Camera makers store private sub-records inside the Exif maker note. Some of
//! them are plain arrays where every index has a fixed meaning, some describe
//! their own layout by a count in the first element and some are obfuscated by
//! a byte substitution cipher. This crate turns such records (already extracted
//! by a TIFF reader) into a flat [`Directory`] of typed values.
//!
//! # Example
//! ```rust
//! use makernote::{decode_makernote, DecodeParams, Endian, Manufacturer, Value};
//! use makernote::canon::{AfInfoField, CanonMakernoteTag};
//!
//! let entries: Vec<(u16, Value)> = vec![(CanonMakernoteTag::AfInfo.into(), Value::Short(vec![2, 2, 640, 480, 640, 480, 60, 60, 10, 20, 30, 40, 1]))];
//! let dir = decode_makernote(Manufacturer::Canon, Endian::Little, entries, &DecodeParams::default());
//! assert_eq!(dir.get_i16_array(AfInfoField::AfAreaXPositions), Some(vec![10, 20]));
//! assert!(dir.errors().is_empty());
//! ```

#![deny(unstable_features)]

use thiserror::Error;

pub mod afinfo;
pub mod bits;
pub mod canon;
pub mod cipher;
pub mod codecs;
pub mod directory;
mod envparams;
pub mod olympus;
pub mod params;
pub mod registry;
pub mod sony;
pub mod splitter;
pub mod tags;
pub mod value;

pub use bits::Endian;
pub use directory::Directory;
pub use params::DecodeParams;
pub use registry::{decode_batch, decode_makernote, MakernoteHandler, Manufacturer};
pub use tags::{Block, TagId};
pub use value::{Rational, SRational, Value, ValueKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MakernoteError {
  /// A read would exceed the record bounds
  #[error("Insufficient data: {}", _0)]
  InsufficientData(String),

  /// A count field implies a layout that can not be satisfied
  #[error("Malformed count: {}", _0)]
  MalformedCount(String),

  #[error("Unexpected element type: {}", _0)]
  UnexpectedType(String),

  #[error("{}", _0)]
  General(String),
}

pub type Result<T> = std::result::Result<T, MakernoteError>;

impl From<&str> for MakernoteError {
  fn from(str: &str) -> Self {
    Self::General(str.into())
  }
}

impl From<String> for MakernoteError {
  fn from(str: String) -> Self {
    Self::General(str)
  }
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}
