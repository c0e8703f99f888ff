// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use serde::{Deserialize, Serialize};

use crate::envparams;

/// Options for one decode call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeParams {
  /// Also store an array under its own IFD tag after it was split
  pub keep_source_arrays: bool,
  /// Record per-field failures in the directory error log
  pub record_field_errors: bool,
}

impl Default for DecodeParams {
  fn default() -> Self {
    Self {
      keep_source_arrays: false,
      record_field_errors: true,
    }
  }
}

impl DecodeParams {
  /// Defaults, overridden by `MAKERNOTE_*` environment variables.
  pub fn from_env() -> Self {
    let mut params = Self::default();
    if let Some(keep) = envparams::makernote_keep_source_arrays() {
      params.keep_source_arrays = keep;
    }
    if let Some(quiet) = envparams::makernote_quiet_field_errors() {
      params.record_field_errors = !quiet;
    }
    params
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialize_partial() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let params: DecodeParams = serde_yaml::from_str("keep_source_arrays: true")?;
    assert!(params.keep_source_arrays);
    assert!(params.record_field_errors);
    Ok(())
  }
}
