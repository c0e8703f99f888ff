// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::collections::BTreeMap;

use makernote::{Directory, Value};
use serde::Deserialize;

/// Serialized form of a [`Directory`]
#[derive(Debug, Deserialize)]
pub(crate) struct Snapshot {
  pub entries: BTreeMap<u32, Value>,
  pub errors: Vec<String>,
}

pub(crate) fn snapshot(dir: &Directory) -> anyhow::Result<Snapshot> {
  let yaml = serde_yaml::to_string(dir)?;
  Ok(serde_yaml::from_str(&yaml)?)
}

pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

/// Big-endian word record as stored in old Olympus maker notes
pub(crate) fn be_words(values: &[i32]) -> Vec<u8> {
  values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Canon AF info record with `points` AF points on a single row
pub(crate) fn canon_af_info(points: u16, in_focus: &[u16]) -> Vec<u16> {
  let mut data = vec![points, points, 6000, 4000, 6000, 4000, 80, 80];
  data.extend((0..points).map(|p| p * 100));
  data.extend(std::iter::repeat_n(0, points as usize));
  let mut words = vec![0_u16; (points as usize).div_ceil(16)];
  for p in in_focus {
    words[*p as usize / 16] |= 1 << (p % 16);
  }
  data.extend(words);
  data.push(in_focus.first().copied().unwrap_or_default());
  data
}
