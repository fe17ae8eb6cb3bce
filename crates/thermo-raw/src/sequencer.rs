//! SequencerRow and AutoSamplerInfo — fixed-size injection metadata read
//! during the opener traversal, between the FileHeader and RawFileInfo.
//!
//! Neither record is part of the scan data path; they exist so the opener
//! can advance the cursor to the correct offset for RawFileInfo. Most fields
//! carry no semantic meaning beyond "bytes to skip", so they decode into
//! `_unknown*` fields rather than being renamed to invented labels.

use crate::io_utils::BinaryReader;
use crate::version::FileVersion;
use crate::RawError;

const MAX_STRING_LEN: i32 = 1 << 20;

/// Fixed-size injection preamble embedded in SequencerRow.
#[derive(Debug, Clone)]
pub struct InjectionData {
    pub row_number: u32,
    pub vial: String,
    pub injection_volume: f64,
    pub sample_weight: f64,
    pub sample_volume: f64,
    pub internal_standard_amount: f64,
    pub dilution_factor: f64,
}

impl InjectionData {
    fn parse(reader: &mut BinaryReader) -> Result<Self, RawError> {
        let _unknown1 = reader.read_u32()?;
        let row_number = reader.read_u32()?;
        let _unknown2 = reader.read_u32()?;
        let vial = reader.read_utf16_fixed(12)?; // [6]u16
        let injection_volume = reader.read_f64()?;
        let sample_weight = reader.read_f64()?;
        let sample_volume = reader.read_f64()?;
        let internal_standard_amount = reader.read_f64()?;
        let dilution_factor = reader.read_f64()?;
        Ok(Self {
            row_number,
            vial,
            injection_volume,
            sample_weight,
            sample_volume,
            internal_standard_amount,
            dilution_factor,
        })
    }
}

/// Sample-sequence row: injection scalars plus a run of free-text fields.
/// The text fields beyond `path` carry no documented meaning; they are
/// consumed to advance the cursor and discarded.
#[derive(Debug, Clone)]
pub struct SequencerRow {
    pub injection: InjectionData,
    pub id: String,
    pub comment: String,
    pub instrument_method: String,
    pub processing_method: String,
    pub filename: String,
    pub path: String,
}

impl SequencerRow {
    pub fn parse(reader: &mut BinaryReader, version: FileVersion) -> Result<Self, RawError> {
        let injection = InjectionData::parse(reader)?;

        let _unknown1 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let _unknown2 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let id = reader.read_pascal_string(MAX_STRING_LEN)?;
        let comment = reader.read_pascal_string(MAX_STRING_LEN)?;
        let _userlabel1 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let _userlabel2 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let _userlabel3 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let _userlabel4 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let _userlabel5 = reader.read_pascal_string(MAX_STRING_LEN)?;
        let instrument_method = reader.read_pascal_string(MAX_STRING_LEN)?;
        let processing_method = reader.read_pascal_string(MAX_STRING_LEN)?;
        let filename = reader.read_pascal_string(MAX_STRING_LEN)?;
        let path = reader.read_pascal_string(MAX_STRING_LEN)?;

        if version.raw() >= 57 {
            let _vial = reader.read_pascal_string(MAX_STRING_LEN)?;
            let _unknown3 = reader.read_pascal_string(MAX_STRING_LEN)?;
            let _unknown4 = reader.read_pascal_string(MAX_STRING_LEN)?;
            let _unknown5 = reader.read_u32()?;
        }
        if version.raw() >= 60 {
            for _ in 0..15 {
                reader.read_pascal_string(MAX_STRING_LEN)?;
            }
        }

        Ok(Self {
            injection,
            id,
            comment,
            instrument_method,
            processing_method,
            filename,
            path,
        })
    }
}

/// Autosampler tray metadata: a fixed preamble and a trailing free-text tag.
#[derive(Debug, Clone)]
pub struct AutoSamplerInfo {
    pub number_of_wells: u32,
    pub text: String,
}

impl AutoSamplerInfo {
    pub fn parse(reader: &mut BinaryReader) -> Result<Self, RawError> {
        let _unknown1 = reader.read_u32()?;
        let _unknown2 = reader.read_u32()?;
        let number_of_wells = reader.read_u32()?;
        let _unknown3 = reader.read_u32()?;
        let _unknown4 = reader.read_u32()?;
        let _unknown5 = reader.read_u32()?;
        let text = reader.read_pascal_string(MAX_STRING_LEN)?;
        Ok(Self {
            number_of_wells,
            text,
        })
    }
}
