//! ScanEvent parsing and frequency-to-m/z calibration.
//!
//! Each ScanEvent carries a version-branched fixed preamble, a list of
//! precursor Reactions, and a calibration block of `(n_param, A, B, C)`.
//! The preamble's byte layout does not change meaning across versions, only
//! its length: byte 6 is always ms_level, byte 40 is always the analyzer
//! type, and so on.

use crate::io_utils::BinaryReader;
use crate::types::{Activation, Analyzer};
use crate::version::FileVersion;
use crate::RawError;
use serde::{Deserialize, Serialize};

const MAX_REASONABLE_COUNT: u32 = 10_000;
const MAX_STRING_LEN: i32 = 1 << 20;

/// Precursor fragmentation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub precursor_mz: f64,
    pub unknown: f64,
    pub collision_energy: f64,
    pub collision_energy_valid: u32,
    pub unknown2: u32,
}

impl Reaction {
    pub fn activation(&self) -> Activation {
        Activation::from_collision_energy_valid(self.collision_energy_valid)
    }

    fn parse(reader: &mut BinaryReader, version: FileVersion) -> Result<Self, RawError> {
        let size = version.reaction_size();
        let start = reader.position();

        let precursor_mz = reader.read_f64()?;
        let unknown = reader.read_f64()?;
        let collision_energy = reader.read_f64()?;
        let collision_energy_valid = reader.read_u32()?;
        let unknown2 = reader.read_u32()?;

        reader.set_position(start + size as u64);

        Ok(Self {
            precursor_mz,
            unknown,
            collision_energy,
            collision_energy_valid,
            unknown2,
        })
    }
}

/// A fully decoded ScanEvent: preamble bytes plus reactions plus calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    preamble: Vec<u8>,
    pub reactions: Vec<Reaction>,
    pub n_param: u32,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ScanEvent {
    /// `ms_level` lives at preamble byte 6 in every version.
    pub fn ms_level(&self) -> u8 {
        self.preamble.get(6).copied().unwrap_or(0)
    }

    /// `polarity` lives at preamble byte 4: 0 = negative, 1 = positive.
    pub fn polarity_positive(&self) -> bool {
        self.preamble.get(4).copied() == Some(1)
    }

    /// `scan_mode` lives at preamble byte 5: 0 = centroid, 1 = profile.
    pub fn is_profile(&self) -> bool {
        self.preamble.get(5).copied() == Some(1)
    }

    /// Whether this is a dependent (DDA) scan; preamble byte 10 at v≥66.
    pub fn dependent(&self) -> bool {
        self.preamble.get(10).copied() == Some(1)
    }

    pub fn analyzer(&self) -> Analyzer {
        Analyzer::from_byte(self.preamble.get(40).copied().unwrap_or(255))
    }

    pub fn activation(&self) -> Activation {
        self.reactions
            .last()
            .map(|r| r.activation())
            .unwrap_or(Activation::Undefined)
    }

    pub fn precursor_mzs(&self) -> Vec<f64> {
        self.reactions.iter().map(|r| r.precursor_mz).collect()
    }

    /// Convert a raw abscissa value (frequency-like) to m/z per the
    /// polynomial calibration carried by this event.
    pub fn convert(&self, v: f64) -> f64 {
        match self.n_param {
            4 => self.a + self.b / v + self.c / (v * v),
            5 | 7 => self.a + self.b / (v * v) + self.c / (v * v * v * v),
            _ => v,
        }
    }
}

fn read_doubles_array(reader: &mut BinaryReader) -> Result<Vec<f64>, RawError> {
    let count = reader.read_u32()?;
    if count > MAX_REASONABLE_COUNT {
        return Err(RawError::MalformedFile(format!(
            "unreasonable doubles array count: {}",
            count
        )));
    }
    reader.read_f64_array(count as usize)
}

fn read_mass_range_array(reader: &mut BinaryReader) -> Result<Vec<(f64, f64)>, RawError> {
    let count = reader.read_u32()?;
    if count > MAX_REASONABLE_COUNT {
        return Err(RawError::MalformedFile(format!(
            "unreasonable mass range count: {}",
            count
        )));
    }
    let mut ranges = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let low = reader.read_f64()?;
        let high = reader.read_f64()?;
        ranges.push((low, high));
    }
    Ok(ranges)
}

/// Parse one ScanEvent starting at `offset`. Returns the event and the
/// offset immediately following it (events are variable-size and must be
/// decoded sequentially).
pub fn parse_scan_event(
    data: &[u8],
    offset: u64,
    version: FileVersion,
) -> Result<(ScanEvent, u64), RawError> {
    let preamble_size = version.scan_event_preamble_size();
    let mut reader = BinaryReader::at_offset(data, offset);

    let preamble = reader.read_bytes(preamble_size)?;

    let n_precursors = reader.read_u32()?;
    if n_precursors > 100 {
        return Err(RawError::MalformedFile(format!(
            "scan event has unreasonable n_precursors: {}",
            n_precursors
        )));
    }
    let mut reactions = Vec::with_capacity(n_precursors as usize);
    for _ in 0..n_precursors {
        reactions.push(Reaction::parse(&mut reader, version)?);
    }

    let _mass_ranges = read_mass_range_array(&mut reader)?;
    let conversion_params = read_doubles_array(&mut reader)?;
    let _source_fragmentations = read_doubles_array(&mut reader)?;
    let _source_fragmentation_mass_ranges = read_mass_range_array(&mut reader)?;

    if version.scan_event_has_name() {
        reader.read_pascal_string(MAX_STRING_LEN)?;
    }

    let n_param = conversion_params.len() as u32;
    let a = conversion_params.first().copied().unwrap_or(0.0);
    let b = conversion_params.get(1).copied().unwrap_or(0.0);
    let c = conversion_params.get(2).copied().unwrap_or(0.0);

    Ok((
        ScanEvent {
            preamble,
            reactions,
            n_param,
            a,
            b,
            c,
        },
        reader.position(),
    ))
}

/// Parse all unique scan events from the scan trailer stream. The stream
/// holds exactly `n_scans` variable-size events starting at
/// `scan_trailer_addr + 4`.
pub fn parse_scan_events(
    data: &[u8],
    start: u64,
    n_scans: u32,
    version: FileVersion,
) -> Result<Vec<ScanEvent>, RawError> {
    let mut events = Vec::with_capacity(n_scans as usize);
    let mut offset = start;
    for _ in 0..n_scans {
        let (event, end) = parse_scan_event(data, offset, version)?;
        offset = end;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_preamble(size: usize, ms_level: u8, analyzer: u8, profile: bool) -> Vec<u8> {
        let mut p = vec![0u8; size];
        p[4] = 1; // positive
        p[5] = if profile { 1 } else { 0 };
        p[6] = ms_level;
        p[40] = analyzer;
        p
    }

    fn build_event_bytes(
        preamble_size: usize,
        version: FileVersion,
        n_param_values: &[f64],
    ) -> Vec<u8> {
        let mut buf = build_preamble(preamble_size, 2, 4, true);
        buf.extend_from_slice(&1u32.to_le_bytes()); // n_precursors
        buf.extend_from_slice(&445.12f64.to_le_bytes());
        buf.extend_from_slice(&0.0f64.to_le_bytes());
        buf.extend_from_slice(&35.0f64.to_le_bytes());
        buf.extend_from_slice(&0b1010u32.to_le_bytes()); // valid + HCD(5)
        buf.extend_from_slice(&0u32.to_le_bytes());
        let rxn_size = version.reaction_size();
        let written = 8 + 8 + 8 + 4 + 4;
        if rxn_size > written {
            buf.extend(std::iter::repeat(0u8).take(rxn_size - written));
        }
        buf.extend_from_slice(&0u32.to_le_bytes()); // mass_ranges count
        buf.extend_from_slice(&(n_param_values.len() as u32).to_le_bytes());
        for v in n_param_values {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf.extend_from_slice(&0u32.to_le_bytes()); // source_fragmentations
        buf.extend_from_slice(&0u32.to_le_bytes()); // source_fragmentation_mass_ranges
        buf
    }

    #[test]
    fn parses_preamble_scalars() {
        let version = FileVersion(57);
        let preamble_size = version.scan_event_preamble_size();
        let buf = build_event_bytes(preamble_size, version, &[1.0, 2.0, 3.0, 4.0]);
        let (event, end) = parse_scan_event(&buf, 0, version).unwrap();
        assert_eq!(event.ms_level(), 2);
        assert!(event.polarity_positive());
        assert!(event.is_profile());
        assert_eq!(event.analyzer(), Analyzer::Ftms);
        assert_eq!(event.n_param, 4);
        assert_eq!(event.precursor_mzs(), vec![445.12]);
        assert_eq!(end, buf.len() as u64);
    }

    #[test]
    fn convert_identity_for_zero_params() {
        let event = ScanEvent {
            preamble: vec![0; 80],
            reactions: vec![],
            n_param: 0,
            a: 0.0,
            b: 0.0,
            c: 0.0,
        };
        assert_eq!(event.convert(123.456), 123.456);
    }

    #[test]
    fn convert_n4_formula() {
        let event = ScanEvent {
            preamble: vec![0; 80],
            reactions: vec![],
            n_param: 4,
            a: 1.0,
            b: 2.0,
            c: 3.0,
        };
        let v = 10.0;
        let expected = 1.0 + 2.0 / v + 3.0 / (v * v);
        assert_eq!(event.convert(v), expected);
    }

    #[test]
    fn convert_n7_formula() {
        let event = ScanEvent {
            preamble: vec![0; 80],
            reactions: vec![],
            n_param: 7,
            a: 1.0,
            b: 2.0,
            c: 3.0,
        };
        let v = 10.0;
        let expected = 1.0 + 2.0 / (v * v) + 3.0 / (v * v * v * v);
        assert_eq!(event.convert(v), expected);
    }

    #[test]
    fn convert_n5_uses_same_formula_as_n7() {
        let mut event5 = ScanEvent {
            preamble: vec![0; 80],
            reactions: vec![],
            n_param: 5,
            a: 1.0,
            b: 2.0,
            c: 3.0,
        };
        let event7 = ScanEvent {
            n_param: 7,
            ..event5.clone()
        };
        assert_eq!(event5.convert(10.0), event7.convert(10.0));
        event5.n_param = 5;
    }
}
