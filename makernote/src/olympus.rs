// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Olympus (and Minolta style) maker notes.
//!
//! The old camera settings records are byte arrays holding big-endian
//! 32-bit words, regardless of the byte order of the maker note IFD.

use log::debug;

use crate::{
  bits::Endian,
  codecs::{MinMax, fnumber_from_root_code, iso_from_apex, min_max_triple, shutter_from_apex},
  directory::Directory,
  params::DecodeParams,
  registry::{MakernoteHandler, Manufacturer},
  splitter::{SplitKind, split_array},
  tags::{Block, TagId},
  value::Value,
};

crate::tags::tiff_tag_enum!(OlympusMakernoteTag);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum OlympusMakernoteTag {
  CameraSettings1 = 0x0001,
  CameraSettings2 = 0x0003,
  CompressedImageSize = 0x0040,
  MinoltaThumbnailOffset1 = 0x0081,
  MinoltaThumbnailOffset2 = 0x0088,
  MinoltaThumbnailLength = 0x0089,
  ColorMode = 0x0101,
  ImageQuality1 = 0x0102,
  ImageQuality2 = 0x0103,
  SpecialMode = 0x0200,
  JpegQuality = 0x0201,
  Macro = 0x0202,
  BwMode = 0x0203,
  DigitalZoom = 0x0204,
  FocalPlaneDiagonal = 0x0205,
  LensDistortionParams = 0x0206,
  CameraType = 0x0207,
  PictInfo = 0x0208,
  CameraId = 0x0209,
  ImageWidth = 0x020b,
  ImageHeight = 0x020c,
  OriginalManufacturerModel = 0x020d,
  PreviewImage = 0x0280,
  EquipmentIfd = 0x2010,
  CameraSettingsIfd = 0x2020,
  RawDevelopmentIfd = 0x2030,
  ImageProcessingIfd = 0x2040,
  FocusInfoIfd = 0x2050,
}

impl OlympusMakernoteTag {
  pub fn block(self) -> Option<Block> {
    match self {
      Self::CameraSettings1 | Self::CameraSettings2 => Some(Block::OlympusCameraSettings),
      _ => None,
    }
  }
}

crate::tags::block_field_enum!(CameraSettingsField, Block::OlympusCameraSettings);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum CameraSettingsField {
  ExposureMode = 1,
  FlashMode = 2,
  WhiteBalance = 3,
  ImageSize = 4,
  ImageQuality = 5,
  ShootingMode = 6,
  MeteringMode = 7,
  ApexFilmSpeedValue = 8,
  ApexShutterSpeedTimeValue = 9,
  ApexApertureValue = 10,
  MacroMode = 11,
  DigitalZoom = 12,
  ExposureCompensation = 13,
  BracketStep = 14,
  IntervalLength = 16,
  IntervalNumber = 17,
  FocalLength = 18,
  FocusDistance = 19,
  FlashFired = 20,
  Date = 21,
  Time = 22,
  MaxApertureAtFocalLength = 23,
  FileNumberMemory = 26,
  LastFileNumber = 27,
  WhiteBalanceRed = 28,
  WhiteBalanceGreen = 29,
  WhiteBalanceBlue = 30,
  Saturation = 31,
  Contrast = 32,
  Sharpness = 33,
  SubjectProgram = 34,
  FlashCompensation = 35,
  IsoSetting = 36,
  CameraModel = 37,
  IntervalMode = 38,
  FolderName = 39,
  ColorMode = 40,
  ColorFilter = 41,
  BlackAndWhiteFilter = 42,
  InternalFlash = 43,
  ApexBrightnessValue = 44,
  SpotFocusPointX = 45,
  SpotFocusPointY = 46,
  WideFocusZone = 47,
  FocusMode = 48,
  FocusArea = 49,
  DecSwitchPosition = 50,
}

crate::tags::tiff_tag_enum!(OlympusEquipmentTag);

/// Tags of the Equipment sub-IFD (0x2010). The sub-IFD has its own tag space
/// and is decoded into a separate `Directory`.
#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum OlympusEquipmentTag {
  EquipmentVersion = 0x0000,
  CameraType2 = 0x0100,
  SerialNumber = 0x0101,
  InternalSerialNumber = 0x0102,
  FocalPlaneDiagonal = 0x0103,
  LensType = 0x0201,
  LensSerialNumber = 0x0202,
  LensModel = 0x0203,
  LensFirmwareVersion = 0x0204,
  MaxApertureAtMinFocal = 0x0205,
  MaxApertureAtMaxFocal = 0x0206,
  MinFocalLength = 0x0207,
  MaxFocalLength = 0x0208,
  MaxAperture = 0x020a,
  LensProperties = 0x020b,
  Extender = 0x0301,
  FlashType = 0x1000,
}

crate::tags::tiff_tag_enum!(OlympusCameraSettingsTag);

/// Tags of the CameraSettings sub-IFD (0x2020), decoded into its own `Directory`.
#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum OlympusCameraSettingsTag {
  CameraSettingsVersion = 0x0000,
  ExposureMode = 0x0200,
  MeteringMode = 0x0202,
  ExposureShift = 0x0203,
  FocusMode = 0x0301,
  WhiteBalance2 = 0x0500,
  WhiteBalanceTemperature = 0x0501,
  CustomSaturation = 0x0503,
  ContrastSetting = 0x0505,
  SharpnessSetting = 0x0506,
  ColorSpace = 0x0507,
  NoiseReduction = 0x050a,
  PictureMode = 0x0520,
  PictureModeSaturation = 0x0521,
  PictureModeContrast = 0x0523,
  PictureModeSharpness = 0x0524,
}

const BLOCKS: [Block; 1] = [Block::OlympusCameraSettings];

#[derive(Debug, Default)]
pub struct OlympusHandler;

impl MakernoteHandler for OlympusHandler {
  fn manufacturer(&self) -> Manufacturer {
    Manufacturer::Olympus
  }

  fn blocks(&self) -> &'static [Block] {
    &BLOCKS
  }

  fn store_entry(&self, dir: &mut Directory, tag: u16, value: Value, _endian: Endian, params: &DecodeParams) {
    match OlympusMakernoteTag::n(tag).and_then(OlympusMakernoteTag::block) {
      Some(block) if SplitKind::BigEndianWords.accepts(&value) => {
        if params.keep_source_arrays {
          dir.set(TagId::Entry(tag), value.clone());
        }
        split_array(dir, tag, block, value, SplitKind::BigEndianWords);
      }
      _ => {
        debug!("Olympus tag {:#06x} stored as {}: {}", tag, value.value_type_name(), value.visual_rep(8));
        dir.set(TagId::Entry(tag), value);
      }
    }
  }
}

fn setting(dir: &Directory, field: CameraSettingsField) -> Option<f64> {
  dir.get_i32(field).map(f64::from)
}

pub fn iso(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::ApexFilmSpeedValue).map(iso_from_apex)
}

pub fn exposure_time(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::ApexShutterSpeedTimeValue).map(shutter_from_apex)
}

pub fn fnumber(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::ApexApertureValue).map(|v| 2_f64.powf((v - 8.0) / 16.0))
}

pub fn max_aperture(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::MaxApertureAtFocalLength).map(|v| 2_f64.powf((v - 8.0) / 16.0))
}

/// Exposure compensation in EV, stored in thirds starting at -2 EV
pub fn exposure_compensation(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::ExposureCompensation).map(|v| v / 3.0 - 2.0)
}

pub fn flash_compensation(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::FlashCompensation).map(|v| (v - 6.0) / 3.0)
}

/// Focal length in mm
pub fn focal_length(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::FocalLength).map(|v| v / 256.0)
}

/// Focus distance in m, `0` for infinity
pub fn focus_distance(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::FocusDistance).map(|v| v / 1000.0)
}

pub fn brightness(dir: &Directory) -> Option<f64> {
  setting(dir, CameraSettingsField::ApexBrightnessValue).map(|v| v / 8.0 - 6.0)
}

fn root_coded_fnumber(dir: &Directory, tag: OlympusEquipmentTag) -> Option<f64> {
  dir.get_f64(tag).filter(|code| *code > 0.0).map(fnumber_from_root_code)
}

/// Widest aperture at the short end of the lens, from an Equipment sub-IFD
pub fn lens_max_aperture_at_min_focal(dir: &Directory) -> Option<f64> {
  root_coded_fnumber(dir, OlympusEquipmentTag::MaxApertureAtMinFocal)
}

pub fn lens_max_aperture_at_max_focal(dir: &Directory) -> Option<f64> {
  root_coded_fnumber(dir, OlympusEquipmentTag::MaxApertureAtMaxFocal)
}

pub fn lens_max_aperture(dir: &Directory) -> Option<f64> {
  root_coded_fnumber(dir, OlympusEquipmentTag::MaxAperture)
}

fn setting_range(dir: &Directory, tag: OlympusCameraSettingsTag) -> Option<MinMax> {
  dir.get_i32_array(tag).as_deref().and_then(min_max_triple)
}

/// Contrast as `[value, min, max]`, from a CameraSettings sub-IFD
pub fn contrast_setting(dir: &Directory) -> Option<MinMax> {
  setting_range(dir, OlympusCameraSettingsTag::ContrastSetting)
}

pub fn sharpness_setting(dir: &Directory) -> Option<MinMax> {
  setting_range(dir, OlympusCameraSettingsTag::SharpnessSetting)
}

pub fn saturation_setting(dir: &Directory) -> Option<MinMax> {
  setting_range(dir, OlympusCameraSettingsTag::CustomSaturation)
}
