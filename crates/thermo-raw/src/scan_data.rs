//! ScanDataPacket decoding and spectrum composition.
//!
//! A packet is a 40-byte header followed by an optional profile stream, an
//! optional centroid peak list, and three auxiliary streams the core does
//! not interpret (peak descriptors, an unknown f32 stream, a triplet f32
//! stream) but still has to skip correctly to stay aligned, were a caller to
//! read past this packet.

use crate::io_utils::BinaryReader;
use crate::scan_event::ScanEvent;
use crate::types::{Peak, Spectrum};
use crate::RawError;

const MAX_REASONABLE_CHUNKS: u32 = 1_000_000;
const MAX_REASONABLE_BINS: u32 = 200_000_000;
const MAX_REASONABLE_PEAKS: u32 = 10_000_000;

/// Fixed 40-byte packet header.
#[derive(Debug, Clone, Copy)]
pub struct PacketHeader {
    pub profile_size: u32,
    pub peaklist_size: u32,
    pub layout: u32,
    pub descriptor_list_size: u32,
    pub unknown_stream_size: u32,
    pub triplet_stream_size: u32,
    pub low_mz: f32,
    pub high_mz: f32,
}

impl PacketHeader {
    pub const SIZE: usize = 40;

    fn parse(reader: &mut BinaryReader) -> Result<Self, RawError> {
        let _unknown1 = reader.read_u32()?;
        let profile_size = reader.read_u32()?;
        let peaklist_size = reader.read_u32()?;
        let layout = reader.read_u32()?;
        let descriptor_list_size = reader.read_u32()?;
        let unknown_stream_size = reader.read_u32()?;
        let triplet_stream_size = reader.read_u32()?;
        let _unknown2 = reader.read_u32()?;
        let low_mz = reader.read_f32()?;
        let high_mz = reader.read_f32()?;
        Ok(Self {
            profile_size,
            peaklist_size,
            layout,
            descriptor_list_size,
            unknown_stream_size,
            triplet_stream_size,
            low_mz,
            high_mz,
        })
    }
}

struct ProfileChunk {
    first_bin: u32,
    fudge: f32,
    signal: Vec<f32>,
}

struct Profile {
    first_value: f64,
    step: f64,
    chunks: Vec<ProfileChunk>,
}

fn parse_profile(reader: &mut BinaryReader, layout: u32) -> Result<Profile, RawError> {
    let first_value = reader.read_f64()?;
    let step = reader.read_f64()?;
    let n_chunks = reader.read_u32()?;
    let _total_n_bins = reader.read_u32()?;

    if n_chunks > MAX_REASONABLE_CHUNKS {
        return Err(RawError::MalformedFile(format!(
            "profile n_chunks unreasonably large: {}",
            n_chunks
        )));
    }

    let mut chunks = Vec::with_capacity(n_chunks as usize);
    for _ in 0..n_chunks {
        let first_bin = reader.read_u32()?;
        let nbins = reader.read_u32()?;
        if nbins > MAX_REASONABLE_BINS {
            return Err(RawError::MalformedFile(format!(
                "profile chunk nbins unreasonably large: {}",
                nbins
            )));
        }
        let fudge = if layout > 0 { reader.read_f32()? } else { 0.0 };
        let mut signal = Vec::with_capacity(nbins as usize);
        for _ in 0..nbins {
            signal.push(reader.read_f32()?);
        }
        chunks.push(ProfileChunk {
            first_bin,
            fudge,
            signal,
        });
    }

    Ok(Profile {
        first_value,
        step,
        chunks,
    })
}

struct PeakListEntry {
    mz: f32,
    abundance: f32,
}

fn parse_peaklist(reader: &mut BinaryReader) -> Result<Vec<PeakListEntry>, RawError> {
    let count = reader.read_u32()?;
    if count > MAX_REASONABLE_PEAKS {
        return Err(RawError::MalformedFile(format!(
            "peak list count unreasonably large: {}",
            count
        )));
    }
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mz = reader.read_f32()?;
        let abundance = reader.read_f32()?;
        entries.push(PeakListEntry { mz, abundance });
    }
    Ok(entries)
}

/// Decode the ScanDataPacket at `offset` and compose its Spectrum, applying
/// the matching ScanEvent's calibration to profile abscissae.
pub fn decode_spectrum(data: &[u8], offset: u64, scan_event: &ScanEvent) -> Result<Spectrum, RawError> {
    let mut reader = BinaryReader::at_offset(data, offset);
    let header = PacketHeader::parse(&mut reader)?;

    let profile = if header.profile_size > 0 {
        Some(parse_profile(&mut reader, header.layout)?)
    } else {
        None
    };

    let peaklist = if header.peaklist_size > 0 {
        Some(parse_peaklist(&mut reader)?)
    } else {
        None
    };

    let mut spectrum: Spectrum = Vec::new();

    if let Some(profile) = profile {
        for chunk in &profile.chunks {
            for (j, &signal) in chunk.signal.iter().enumerate() {
                let raw_x = profile.first_value + (chunk.first_bin as f64 + j as f64) * profile.step;
                let mz = scan_event.convert(raw_x) + chunk.fudge as f64;
                spectrum.push(Peak {
                    mz,
                    intensity: signal,
                });
            }
        }
    } else if let Some(peaklist) = peaklist {
        for entry in peaklist {
            spectrum.push(Peak {
                mz: entry.mz as f64,
                intensity: entry.abundance,
            });
        }
    }

    spectrum.sort_by(|a, b| a.mz.total_cmp(&b.mz));

    Ok(spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_event::parse_scan_event;
    use crate::version::FileVersion;

    fn identity_scan_event() -> ScanEvent {
        let version = FileVersion(57);
        let preamble_size = version.scan_event_preamble_size();
        let mut buf = vec![0u8; preamble_size];
        buf.extend_from_slice(&0u32.to_le_bytes()); // n_precursors
        buf.extend_from_slice(&0u32.to_le_bytes()); // mass_ranges
        buf.extend_from_slice(&0u32.to_le_bytes()); // conversion_params (n_param=0)
        buf.extend_from_slice(&0u32.to_le_bytes()); // source_fragmentations
        buf.extend_from_slice(&0u32.to_le_bytes()); // source_fragmentation_mass_ranges
        parse_scan_event(&buf, 0, version).unwrap().0
    }

    fn build_packet_with_profile(layout: u32, first_value: f64, step: f64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes()); // profile_size (nonzero marker)
        buf.extend_from_slice(&0u32.to_le_bytes()); // peaklist_size
        buf.extend_from_slice(&layout.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0f32.to_le_bytes());
        buf.extend_from_slice(&0f32.to_le_bytes());

        buf.extend_from_slice(&first_value.to_le_bytes());
        buf.extend_from_slice(&step.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes()); // n_chunks
        buf.extend_from_slice(&3u32.to_le_bytes()); // total_n_bins
        buf.extend_from_slice(&0u32.to_le_bytes()); // first_bin
        buf.extend_from_slice(&3u32.to_le_bytes()); // nbins
        if layout > 0 {
            buf.extend_from_slice(&0.5f32.to_le_bytes()); // fudge
        }
        for v in [10.0f32, 20.0, 30.0] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[test]
    fn profile_without_fudge_is_sorted_ascending() {
        let event = identity_scan_event();
        let buf = build_packet_with_profile(0, 100.0, 1.0);
        let spectrum = decode_spectrum(&buf, 0, &event).unwrap();
        assert_eq!(spectrum.len(), 3);
        assert_eq!(spectrum[0].mz, 100.0);
        assert_eq!(spectrum[2].mz, 102.0);
        assert_eq!(spectrum[0].intensity, 10.0);
    }

    #[test]
    fn profile_with_layout_adds_fudge() {
        let event = identity_scan_event();
        let buf = build_packet_with_profile(1, 100.0, 1.0);
        let spectrum = decode_spectrum(&buf, 0, &event).unwrap();
        assert_eq!(spectrum[0].mz, 100.5);
    }

    #[test]
    fn empty_packet_yields_empty_spectrum() {
        let event = identity_scan_event();
        let mut buf = Vec::new();
        for _ in 0..8 {
            buf.extend_from_slice(&0u32.to_le_bytes());
        }
        buf.extend_from_slice(&0f32.to_le_bytes());
        buf.extend_from_slice(&0f32.to_le_bytes());
        let spectrum = decode_spectrum(&buf, 0, &event).unwrap();
        assert!(spectrum.is_empty());
    }
}
