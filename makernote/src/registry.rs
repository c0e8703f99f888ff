// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
  bits::Endian,
  canon::CanonHandler,
  directory::Directory,
  olympus::OlympusHandler,
  params::DecodeParams,
  sony::SonyHandler,
  tags::{Block, TagId},
  value::Value,
};

/// Vendor specific handling of maker note IFD entries.
pub trait MakernoteHandler: Send + Sync {
  fn manufacturer(&self) -> Manufacturer;

  /// Record blocks this handler may write to
  fn blocks(&self) -> &'static [Block];

  /// Store one maker note IFD entry. Known record tags are split or decoded
  /// into synthetic tags, everything else is stored as read.
  fn store_entry(&self, dir: &mut Directory, tag: u16, value: Value, endian: Endian, params: &DecodeParams);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Manufacturer {
  Canon,
  Olympus,
  Sony,
}

static CANON: CanonHandler = CanonHandler;
static OLYMPUS: OlympusHandler = OlympusHandler;
static SONY: SonyHandler = SonyHandler;

impl Manufacturer {
  /// Detect the manufacturer from the Exif `Make` string.
  pub fn from_make(make: &str) -> Option<Self> {
    let make = make.trim().to_uppercase();
    if make.starts_with("CANON") {
      Some(Self::Canon)
    } else if make.starts_with("OLYMPUS") || make.starts_with("OM DIGITAL") {
      Some(Self::Olympus)
    } else if make.starts_with("SONY") {
      Some(Self::Sony)
    } else {
      None
    }
  }

  pub fn handler(self) -> &'static dyn MakernoteHandler {
    match self {
      Self::Canon => &CANON,
      Self::Olympus => &OLYMPUS,
      Self::Sony => &SONY,
    }
  }

  /// Map a flattened numeric id back to a tag id of this manufacturer.
  pub fn resolve_raw(self, raw: u32) -> Option<TagId> {
    self
      .handler()
      .blocks()
      .iter()
      .find_map(|block| block.local_index(raw).map(|idx| block.field(idx)))
      .or_else(|| u16::try_from(raw).ok().map(TagId::Entry))
  }
}

/// Decode all entries of one maker note IFD.
///
/// Entries are applied in order, a later entry for the same tag or block
/// replaces the earlier one. Decoding never fails, problems end up in
/// [`Directory::errors`].
pub fn decode_makernote<I>(manufacturer: Manufacturer, endian: Endian, entries: I, params: &DecodeParams) -> Directory
where
  I: IntoIterator<Item = (u16, Value)>,
{
  let handler = manufacturer.handler();
  let mut dir = Directory::new();
  for (tag, value) in entries {
    handler.store_entry(&mut dir, tag, value, endian, params);
  }
  debug!("{:?} maker note: {} entries, {} errors", manufacturer, dir.len(), dir.errors().len());
  dir
}

/// Decode many maker notes of the same manufacturer in parallel.
pub fn decode_batch(manufacturer: Manufacturer, endian: Endian, makernotes: &[Vec<(u16, Value)>], params: &DecodeParams) -> Vec<Directory> {
  info!("Decoding {} {:?} maker notes", makernotes.len(), manufacturer);
  makernotes
    .par_iter()
    .map(|entries| decode_makernote(manufacturer, endian, entries.iter().cloned(), params))
    .collect()
}
