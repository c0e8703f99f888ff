// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::debug;

use crate::{
  afinfo::{BulkWidth, VariableLayout, decode_variable_record},
  bits::Endian,
  codecs::{BitFlag, decode_bit_flags, decode_modulo_ev},
  directory::Directory,
  params::DecodeParams,
  registry::{MakernoteHandler, Manufacturer},
  splitter::{SplitKind, split_array},
  tags::{Block, TagId},
  value::Value,
};

crate::tags::tiff_tag_enum!(CanonMakernoteTag);

/// Canon maker note IFD tags
#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum CanonMakernoteTag {
  CameraSettings = 0x0001,
  FocalLength = 0x0002,
  FlashInfo = 0x0003,
  ShotInfo = 0x0004,
  Panorama = 0x0005,
  ImageType = 0x0006,
  FirmwareVersion = 0x0007,
  FileNumber = 0x0008,
  OwnerName = 0x0009,
  SerialNumber = 0x000c,
  CameraInfo = 0x000d,
  CustomFunctions = 0x000f,
  ModelId = 0x0010,
  AfInfo = 0x0012,
  ColorData = 0x4001,
}

impl CanonMakernoteTag {
  /// Record block an array tag is split into
  pub fn block(self) -> Option<Block> {
    match self {
      Self::CameraSettings => Some(Block::CanonCameraSettings),
      Self::FocalLength => Some(Block::CanonFocalLength),
      Self::ShotInfo => Some(Block::CanonShotInfo),
      Self::Panorama => Some(Block::CanonPanorama),
      Self::AfInfo => Some(Block::CanonAfInfo),
      _ => None,
    }
  }
}

crate::tags::block_field_enum!(CameraSettingsField, Block::CanonCameraSettings);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum CameraSettingsField {
  MacroMode = 1,
  SelfTimer = 2,
  Quality = 3,
  FlashMode = 4,
  ContinuousDrive = 5,
  FocusMode = 7,
  RecordMode = 9,
  ImageSize = 10,
  EasyMode = 11,
  DigitalZoom = 12,
  Contrast = 13,
  Saturation = 14,
  Sharpness = 15,
  CameraIso = 16,
  MeteringMode = 17,
  FocusRange = 18,
  AfPoint = 19,
  ExposureMode = 20,
  LensType = 22,
  MaxFocalLength = 23,
  MinFocalLength = 24,
  FocalUnits = 25,
  MaxAperture = 26,
  MinAperture = 27,
  FlashActivity = 28,
  FlashBits = 29,
  FocusContinuous = 32,
  AeSetting = 33,
  ImageStabilization = 34,
  DisplayAperture = 35,
  ZoomSourceWidth = 36,
  ZoomTargetWidth = 37,
  SpotMeteringMode = 39,
  PhotoEffect = 40,
  ManualFlashOutput = 41,
  ColorTone = 42,
  SrawQuality = 46,
}

crate::tags::block_field_enum!(FocalLengthField, Block::CanonFocalLength);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum FocalLengthField {
  FocalType = 0,
  FocalLength = 1,
  FocalPlaneXSize = 2,
  FocalPlaneYSize = 3,
}

crate::tags::block_field_enum!(ShotInfoField, Block::CanonShotInfo);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum ShotInfoField {
  AutoIso = 1,
  BaseIso = 2,
  MeasuredEv = 3,
  TargetAperture = 4,
  TargetExposureTime = 5,
  ExposureCompensation = 6,
  WhiteBalance = 7,
  SlowShutter = 8,
  SequenceNumber = 9,
  OpticalZoomCode = 10,
  CameraTemperature = 12,
  FlashGuideNumber = 13,
  AfPointsInFocus = 14,
  FlashExposureComp = 15,
  AutoExposureBracketing = 16,
  AebBracketValue = 17,
  ControlMode = 18,
  FocusDistanceUpper = 19,
  FocusDistanceLower = 20,
  FNumber = 21,
  ExposureTime = 22,
  MeasuredEv2 = 23,
  BulbDuration = 24,
  CameraType = 26,
  AutoRotate = 27,
  NdFilter = 28,
  SelfTimer2 = 29,
  FlashOutput = 33,
}

crate::tags::block_field_enum!(PanoramaField, Block::CanonPanorama);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum PanoramaField {
  PanoramaFrameNumber = 2,
  PanoramaDirection = 5,
}

crate::tags::block_field_enum!(AfInfoField, Block::CanonAfInfo);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum AfInfoField {
  NumAfPoints = 0,
  ValidAfPoints = 1,
  CanonImageWidth = 2,
  CanonImageHeight = 3,
  AfImageWidth = 4,
  AfImageHeight = 5,
  AfAreaWidth = 6,
  AfAreaHeight = 7,
  AfAreaXPositions = 8,
  AfAreaYPositions = 9,
  AfPointsInFocus = 10,
  PrimaryAfPoint1 = 11,
  PrimaryAfPoint2 = 12,
}

pub const AF_INFO_LAYOUT: VariableLayout = VariableLayout {
  block: Block::CanonAfInfo,
  bulk: &[
    (AfInfoField::AfAreaXPositions as u16, BulkWidth::PerItem),
    (AfInfoField::AfAreaYPositions as u16, BulkWidth::PerItem),
    (AfInfoField::AfPointsInFocus as u16, BulkWidth::BitsPerItem16),
  ],
};

/// Flash details, camera settings index 29
pub const FLASH_BITS: [BitFlag; 9] = [
  BitFlag::set(0, "Manual"),
  BitFlag::set(1, "TTL"),
  BitFlag::set(2, "A-TTL"),
  BitFlag::set(3, "E-TTL"),
  BitFlag::set(4, "FP sync enabled"),
  BitFlag::set(7, "2nd-curtain sync used"),
  BitFlag::set(11, "FP sync used"),
  BitFlag::set(13, "Built-in"),
  BitFlag::set(14, "External"),
];

const BLOCKS: [Block; 5] = [
  Block::CanonCameraSettings,
  Block::CanonFocalLength,
  Block::CanonShotInfo,
  Block::CanonPanorama,
  Block::CanonAfInfo,
];

#[derive(Debug, Default)]
pub struct CanonHandler;

impl MakernoteHandler for CanonHandler {
  fn manufacturer(&self) -> Manufacturer {
    Manufacturer::Canon
  }

  fn blocks(&self) -> &'static [Block] {
    &BLOCKS
  }

  fn store_entry(&self, dir: &mut Directory, tag: u16, value: Value, _endian: Endian, params: &DecodeParams) {
    let block = CanonMakernoteTag::n(tag).and_then(CanonMakernoteTag::block);
    match block {
      Some(block) if SplitKind::Integer.accepts(&value) => {
        if params.keep_source_arrays {
          dir.set(TagId::Entry(tag), value.clone());
        }
        if block == Block::CanonAfInfo {
          decode_variable_record(dir, &AF_INFO_LAYOUT, &value, params);
        } else {
          split_array(dir, tag, block, value, SplitKind::Integer);
        }
      }
      _ => {
        debug!("Canon tag {:#06x} stored as {}: {}", tag, value.value_type_name(), value.visual_rep(8));
        dir.set(TagId::Entry(tag), value);
      }
    }
  }
}

// ShotInfo and CameraSettings are written as SHORT, the EV fields below are
// signed 16-bit and read through `get_i16`.

/// Aperture value from a Canon EV code, `None` for unset (`<= 0`) codes.
fn aperture_from_ev(code: i32) -> Option<f64> {
  (code > 0).then(|| 2_f64.powf(decode_modulo_ev(code) / 2.0))
}

/// Exposure time in seconds from a Canon EV code
fn exposure_time_from_ev(code: i32) -> Option<f64> {
  (code != 0).then(|| 2_f64.powf(-decode_modulo_ev(code)))
}

pub fn exposure_compensation(dir: &Directory) -> Option<f64> {
  dir.get_i16(ShotInfoField::ExposureCompensation).map(i32::from).map(decode_modulo_ev)
}

pub fn flash_exposure_compensation(dir: &Directory) -> Option<f64> {
  dir.get_i16(ShotInfoField::FlashExposureComp).map(i32::from).map(decode_modulo_ev)
}

pub fn fnumber(dir: &Directory) -> Option<f64> {
  dir.get_i16(ShotInfoField::FNumber).map(i32::from).and_then(aperture_from_ev)
}

pub fn target_aperture(dir: &Directory) -> Option<f64> {
  dir.get_i16(ShotInfoField::TargetAperture).map(i32::from).and_then(aperture_from_ev)
}

pub fn exposure_time(dir: &Directory) -> Option<f64> {
  dir.get_i16(ShotInfoField::ExposureTime).map(i32::from).and_then(exposure_time_from_ev)
}

pub fn target_exposure_time(dir: &Directory) -> Option<f64> {
  dir.get_i16(ShotInfoField::TargetExposureTime).map(i32::from).and_then(exposure_time_from_ev)
}

pub fn base_iso(dir: &Directory) -> Option<f64> {
  dir
    .get_i32(ShotInfoField::BaseIso)
    .filter(|v| *v != 0)
    .map(|v| 2_f64.powf(v as f64 / 32.0) * 100.0 / 32.0)
}

pub fn max_aperture(dir: &Directory) -> Option<f64> {
  dir.get_i16(CameraSettingsField::MaxAperture).map(i32::from).and_then(aperture_from_ev)
}

pub fn min_aperture(dir: &Directory) -> Option<f64> {
  dir.get_i16(CameraSettingsField::MinAperture).map(i32::from).and_then(aperture_from_ev)
}

/// Lens focal range in mm as `(min, max)`
pub fn focal_range(dir: &Directory) -> Option<(f64, f64)> {
  let units = match dir.get_i32(CameraSettingsField::FocalUnits) {
    Some(u) if u > 0 => u as f64,
    _ => 1.0,
  };
  let min = dir.get_i32(CameraSettingsField::MinFocalLength)?;
  let max = dir.get_i32(CameraSettingsField::MaxFocalLength)?;
  Some((min as f64 / units, max as f64 / units))
}

pub fn flash_details(dir: &Directory) -> Option<Vec<&'static str>> {
  let bits = dir.get_i32(CameraSettingsField::FlashBits)?;
  Some(decode_bit_flags(bits as u16 as u64, &FLASH_BITS))
}

/// Indices of AF points marked as in focus, one bit per point.
pub fn af_points_in_focus(dir: &Directory) -> Option<Vec<usize>> {
  let points = usize::try_from(dir.get_i32(AfInfoField::NumAfPoints)?).ok()?;
  let words = dir.get_i16_array(AfInfoField::AfPointsInFocus)?;
  Some(
    (0..points)
      .filter(|p| words.get(p / 16).is_some_and(|word| (*word as u16 >> (p % 16)) & 1 == 1))
      .collect(),
  )
}
