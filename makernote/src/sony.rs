// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::collections::HashMap;

use lazy_static::lazy_static;
use log::debug;

use crate::{
  bits::Endian,
  cipher::{Conversion, FieldFormat, FieldSpec, FixedLayout, decode_ciphered_record},
  directory::Directory,
  params::DecodeParams,
  registry::{MakernoteHandler, Manufacturer},
  tags::{Block, TagId},
  value::Value,
};

crate::tags::tiff_tag_enum!(SonyMakernoteTag);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum SonyMakernoteTag {
  CameraInfo = 0x0010,
  FocusInfo = 0x0020,
  ImageQuality = 0x0102,
  FlashExposureComp = 0x0104,
  TeleConverter = 0x0105,
  WhiteBalanceFineTune = 0x0112,
  LensSpec = 0x0114,
  Tag2010 = 0x2010,
  Tag900b = 0x900b,
  Tag9050 = 0x9050,
  Tag9400 = 0x9400,
  Tag9401 = 0x9401,
  Tag9402 = 0x9402,
  Tag9403 = 0x9403,
  Tag9404 = 0x9404,
  Tag9405 = 0x9405,
  Tag940c = 0x940c,
  LensType = 0xb027,
}

crate::tags::block_field_enum!(Tag9050Field, Block::SonyTag9050);

/// Fields of the enciphered 0x9050 record, the value is the byte offset.
#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum Tag9050Field {
  MaxAperture = 0x0000,
  MinAperture = 0x0001,
  Shutter = 0x0020,
  FlashStatus = 0x0031,
  ShutterCount = 0x0032,
  SonyExposureTime = 0x003a,
  SonyFNumber = 0x003c,
  ReleaseMode2 = 0x003f,
  InternalSerialNumber = 0x007c,
  LensMount = 0x0105,
  LensFormat = 0x0106,
  LensType2 = 0x0107,
  LensType = 0x0109,
  ShutterCount2 = 0x019f,
}

crate::tags::block_field_enum!(Tag9400Field, Block::SonyTag9400);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum Tag9400Field {
  SequenceImageNumber = 0x0008,
  SequenceFileNumber = 0x000c,
  ReleaseMode2 = 0x0010,
  ShotNumberSincePowerUp = 0x001a,
  SequenceLength = 0x0022,
  CameraOrientation = 0x0028,
  Quality2 = 0x0029,
  ModelReleaseYear = 0x0053,
}

crate::tags::block_field_enum!(Tag9402Field, Block::SonyTag9402);

#[derive(Debug, Copy, Clone, PartialEq, enumn::N)]
#[repr(u16)]
pub enum Tag9402Field {
  AmbientTemperature = 0x0004,
  FocusMode = 0x0016,
  AfAreaMode = 0x0017,
  FocusPosition2 = 0x002d,
}

const TAG_9050_FIELDS: [FieldSpec; 14] = [
  FieldSpec::converted(Tag9050Field::MaxAperture as u16, FieldFormat::U8, Conversion::SonyAperture),
  FieldSpec::converted(Tag9050Field::MinAperture as u16, FieldFormat::U8, Conversion::SonyAperture),
  FieldSpec::array(Tag9050Field::Shutter as u16, FieldFormat::U16, 3),
  FieldSpec::new(Tag9050Field::FlashStatus as u16, FieldFormat::U8),
  FieldSpec::new(Tag9050Field::ShutterCount as u16, FieldFormat::U32),
  FieldSpec::converted(Tag9050Field::SonyExposureTime as u16, FieldFormat::U16, Conversion::SonyExposureTime),
  FieldSpec::converted(Tag9050Field::SonyFNumber as u16, FieldFormat::U16, Conversion::SonyFNumber),
  FieldSpec::new(Tag9050Field::ReleaseMode2 as u16, FieldFormat::U8),
  FieldSpec::array(Tag9050Field::InternalSerialNumber as u16, FieldFormat::U8, 4),
  FieldSpec::new(Tag9050Field::LensMount as u16, FieldFormat::U8),
  FieldSpec::new(Tag9050Field::LensFormat as u16, FieldFormat::U8),
  FieldSpec::new(Tag9050Field::LensType2 as u16, FieldFormat::U16),
  FieldSpec::new(Tag9050Field::LensType as u16, FieldFormat::U16),
  FieldSpec::new(Tag9050Field::ShutterCount2 as u16, FieldFormat::U32),
];

const TAG_9400_FIELDS: [FieldSpec; 8] = [
  FieldSpec::converted(Tag9400Field::SequenceImageNumber as u16, FieldFormat::U32, Conversion::PlusOne),
  FieldSpec::converted(Tag9400Field::SequenceFileNumber as u16, FieldFormat::U32, Conversion::PlusOne),
  FieldSpec::new(Tag9400Field::ReleaseMode2 as u16, FieldFormat::U8),
  FieldSpec::new(Tag9400Field::ShotNumberSincePowerUp as u16, FieldFormat::U32),
  FieldSpec::new(Tag9400Field::SequenceLength as u16, FieldFormat::U8),
  FieldSpec::new(Tag9400Field::CameraOrientation as u16, FieldFormat::U8),
  FieldSpec::new(Tag9400Field::Quality2 as u16, FieldFormat::U8),
  FieldSpec::new(Tag9400Field::ModelReleaseYear as u16, FieldFormat::U8),
];

const TAG_9402_FIELDS: [FieldSpec; 4] = [
  FieldSpec::new(Tag9402Field::AmbientTemperature as u16, FieldFormat::I8),
  FieldSpec::new(Tag9402Field::FocusMode as u16, FieldFormat::U8),
  FieldSpec::new(Tag9402Field::AfAreaMode as u16, FieldFormat::U8),
  FieldSpec::new(Tag9402Field::FocusPosition2 as u16, FieldFormat::U8),
];

pub static TAG_9050_LAYOUT: FixedLayout = FixedLayout {
  block: Block::SonyTag9050,
  fields: &TAG_9050_FIELDS,
};

pub static TAG_9400_LAYOUT: FixedLayout = FixedLayout {
  block: Block::SonyTag9400,
  fields: &TAG_9400_FIELDS,
};

pub static TAG_9402_LAYOUT: FixedLayout = FixedLayout {
  block: Block::SonyTag9402,
  fields: &TAG_9402_FIELDS,
};

lazy_static! {
  /// Enciphered records with a known layout, by maker note tag
  static ref LAYOUTS: HashMap<u16, &'static FixedLayout> = {
    let mut m = HashMap::new();
    m.insert(SonyMakernoteTag::Tag9050 as u16, &TAG_9050_LAYOUT);
    m.insert(SonyMakernoteTag::Tag9400 as u16, &TAG_9400_LAYOUT);
    m.insert(SonyMakernoteTag::Tag9402 as u16, &TAG_9402_LAYOUT);
    m
  };
}

pub fn layout(tag: u16) -> Option<&'static FixedLayout> {
  LAYOUTS.get(&tag).copied()
}

const BLOCKS: [Block; 3] = [Block::SonyTag9050, Block::SonyTag9400, Block::SonyTag9402];

#[derive(Debug, Default)]
pub struct SonyHandler;

impl MakernoteHandler for SonyHandler {
  fn manufacturer(&self) -> Manufacturer {
    Manufacturer::Sony
  }

  fn blocks(&self) -> &'static [Block] {
    &BLOCKS
  }

  fn store_entry(&self, dir: &mut Directory, tag: u16, value: Value, endian: Endian, params: &DecodeParams) {
    if let (Some(layout), Some(data)) = (layout(tag), value.as_bytes()) {
      let written = decode_ciphered_record(dir, layout, data, endian, params);
      debug!("Sony tag {:#06x}: {} of {} fields decoded", tag, written, layout.fields.len());
      if !params.keep_source_arrays {
        return;
      }
    }
    dir.set(TagId::Entry(tag), value);
  }
}

/// Exposure time in seconds, `None` if not set
pub fn exposure_time(dir: &Directory) -> Option<f64> {
  dir.get_f64(Tag9050Field::SonyExposureTime).filter(|v| *v > 0.0)
}

pub fn fnumber(dir: &Directory) -> Option<f64> {
  dir.get_f64(Tag9050Field::SonyFNumber)
}

pub fn shutter_count(dir: &Directory) -> Option<u32> {
  dir.get_u32(Tag9050Field::ShutterCount)
}

/// Ambient temperature in degrees Celsius
pub fn ambient_temperature(dir: &Directory) -> Option<i32> {
  dir.get_i32(Tag9402Field::AmbientTemperature)
}

pub fn sequence_image_number(dir: &Directory) -> Option<i64> {
  dir.get_i64(Tag9400Field::SequenceImageNumber)
}
