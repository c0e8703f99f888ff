// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::fmt::Display;

/// Record blocks that are split into synthetic tags.
///
/// The discriminant is the numeric tag space offset of the block. It is only
/// used when a tag id has to be flattened into a number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, enumn::N)]
#[repr(u32)]
pub enum Block {
  CanonCameraSettings = 0xC100,
  CanonFocalLength = 0xC200,
  CanonShotInfo = 0xC400,
  CanonPanorama = 0xC500,
  CanonAfInfo = 0xD200,
  OlympusCameraSettings = 0xF000,
  SonyTag9050 = 0x9050_0000,
  SonyTag9400 = 0x9400_0000,
  SonyTag9402 = 0x9402_0000,
}

impl Block {
  pub fn offset(self) -> u32 {
    self as u32
  }

  /// Number of local indices reserved for this block.
  pub fn span(self) -> u32 {
    match self {
      Self::CanonCameraSettings | Self::CanonFocalLength | Self::CanonShotInfo | Self::CanonPanorama | Self::CanonAfInfo => 0x100,
      Self::OlympusCameraSettings => 0x1000,
      Self::SonyTag9050 | Self::SonyTag9400 | Self::SonyTag9402 => 0x1_0000,
    }
  }

  pub fn field(self, index: u16) -> TagId {
    TagId::Field(self, index)
  }

  /// Split a numeric id into local index if it falls into this block.
  pub fn local_index(self, raw: u32) -> Option<u16> {
    raw
      .checked_sub(self.offset())
      .filter(|idx| *idx < self.span())
      .and_then(|idx| u16::try_from(idx).ok())
  }
}

/// Key of a [`crate::Directory`] entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagId {
  /// Maker note IFD entry, stored as read
  Entry(u16),
  /// Synthetic tag at a local index inside a record block
  Field(Block, u16),
}

impl TagId {
  /// Flattened numeric id, `OFFSET + index` for synthetic tags.
  pub fn raw(&self) -> u32 {
    match *self {
      Self::Entry(tag) => tag as u32,
      Self::Field(block, idx) => block.offset() + idx as u32,
    }
  }

  pub fn block(&self) -> Option<Block> {
    match *self {
      Self::Entry(_) => None,
      Self::Field(block, _) => Some(block),
    }
  }
}

impl From<u16> for TagId {
  fn from(tag: u16) -> Self {
    Self::Entry(tag)
  }
}

impl Display for TagId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Entry(tag) => write!(f, "{:#06x}", tag),
      Self::Field(block, idx) => write!(f, "{:?}[{}] ({:#x})", block, idx, self.raw()),
    }
  }
}

/// Implements `From<Tag> for u16` for enums of IFD tags and
/// `From<Tag> for TagId` for the `Entry` namespace.
macro_rules! tiff_tag_enum {
  ($e:ident) => {
    impl From<$e> for u16 {
      fn from(tag: $e) -> u16 {
        tag as u16
      }
    }

    impl From<$e> for $crate::tags::TagId {
      fn from(tag: $e) -> $crate::tags::TagId {
        $crate::tags::TagId::Entry(tag as u16)
      }
    }

    impl TryFrom<u16> for $e {
      type Error = String;

      fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        Self::n(value).ok_or(format!("Unable to convert tag: {}, not defined in enum", value))
      }
    }
  };
}

/// Same as `tiff_tag_enum` but for local indices of a record block.
macro_rules! block_field_enum {
  ($e:ident, $block:expr) => {
    impl From<$e> for $crate::tags::TagId {
      fn from(field: $e) -> $crate::tags::TagId {
        $crate::tags::TagId::Field($block, field as u16)
      }
    }

    impl $e {
      pub fn index(self) -> usize {
        self as usize
      }
    }
  };
}

pub(crate) use block_field_enum;
pub(crate) use tiff_tag_enum;
