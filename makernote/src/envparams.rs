// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::warn;

fn env_flag(name: &str) -> Option<bool> {
  match std::env::var(name).map(|val| val.parse::<u32>()) {
    Ok(Ok(value)) => Some(value == 1),
    Ok(Err(_)) => {
      warn!("Invalid value for {}", name);
      None
    }
    Err(_) => None,
  }
}

pub(crate) fn makernote_keep_source_arrays() -> Option<bool> {
  env_flag("MAKERNOTE_KEEP_SOURCE_ARRAYS")
}

pub(crate) fn makernote_quiet_field_errors() -> Option<bool> {
  env_flag("MAKERNOTE_QUIET_FIELD_ERRORS")
}
