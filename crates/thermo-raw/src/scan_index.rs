//! ScanIndex parsing — the dense per-scan offset table.
//!
//! Entry size is fixed per version: 72 bytes below v64, 80 at v64, 88 at
//! v≥65. Widening to a canonical u64 offset happens inline during parsing;
//! there is no stride-detection fallback, the version is authoritative.

use crate::io_utils::BinaryReader;
use crate::version::FileVersion;
use crate::RawError;

/// A single entry in the scan index.
#[derive(Debug, Clone, Copy)]
pub struct ScanIndexEntry {
    /// Offset into the data stream, file-relative once the opener adds `data_addr`.
    pub offset: u64,
    pub data_packet_size: u32,
    pub retention_time: f64,
    pub scan_event_ordinal: u16,
    pub segment: u16,
    pub low_mz: f64,
    pub high_mz: f64,
    pub total_ion_current: f64,
    pub base_peak_intensity: f64,
    pub base_peak_mz: f64,
}

/// Parse the entire scan index. `offset` is the absolute address of the
/// scan index within the file; there are exactly `n_scans` entries.
pub fn parse_scan_index(
    data: &[u8],
    offset: u64,
    version: FileVersion,
    n_scans: u32,
) -> Result<Vec<ScanIndexEntry>, RawError> {
    let entry_size = version.scan_index_entry_size();
    let has_64bit_offset = entry_size >= 80;
    let mut reader = BinaryReader::at_offset(data, offset);
    let mut entries = Vec::with_capacity(n_scans as usize);

    for _ in 0..n_scans {
        let entry_start = reader.position();

        let offset_or_size = reader.read_u32()?;
        let _trailer_offset = reader.read_i32()?;
        let scan_event_ordinal = reader.read_u16()?;
        let segment = reader.read_u16()?;
        let _scan_number = reader.read_i32()?;
        let _packet_type = reader.read_u32()?;
        let _number_packets = reader.read_i32()?;
        let retention_time = reader.read_f64()?;
        let total_ion_current = reader.read_f64()?;
        let base_peak_intensity = reader.read_f64()?;
        let base_peak_mz = reader.read_f64()?;
        let low_mz = reader.read_f64()?;
        let high_mz = reader.read_f64()?;

        let (scan_offset, data_packet_size) = if has_64bit_offset {
            let offset_64 = reader.read_u64()?;
            if entry_size >= 88 {
                let _cycle_number = reader.read_i32()?;
                let _padding = reader.read_u32()?;
                (offset_64, offset_or_size)
            } else {
                (offset_64, 0u32)
            }
        } else {
            (offset_or_size as u64, 0u32)
        };

        reader.set_position(entry_start + entry_size as u64);

        entries.push(ScanIndexEntry {
            offset: scan_offset,
            data_packet_size,
            retention_time,
            scan_event_ordinal,
            segment,
            low_mz,
            high_mz,
            total_ion_current,
            base_peak_intensity,
            base_peak_mz,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_entry_72(offset: u32, rt: f64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&offset.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // scan_event_ordinal
        buf.extend_from_slice(&0u16.to_le_bytes()); // segment
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&1i32.to_le_bytes());
        buf.extend_from_slice(&rt.to_le_bytes());
        buf.extend_from_slice(&1000.0f64.to_le_bytes()); // tic
        buf.extend_from_slice(&500.0f64.to_le_bytes()); // base_peak_intensity
        buf.extend_from_slice(&445.12f64.to_le_bytes()); // base_peak_mz
        buf.extend_from_slice(&100.0f64.to_le_bytes()); // low_mz
        buf.extend_from_slice(&2000.0f64.to_le_bytes()); // high_mz
        buf
    }

    #[test]
    fn parses_72_byte_entries_below_v64() {
        let mut buf = build_entry_72(0x1000, 0.5);
        buf.extend(build_entry_72(0x2000, 1.0));
        let entries = parse_scan_index(&buf, 0, FileVersion(57), 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].offset, 0x1000);
        assert_eq!(entries[0].retention_time, 0.5);
        assert_eq!(entries[1].offset, 0x2000);
    }

    #[test]
    fn parses_88_byte_entries_v65() {
        let version = FileVersion(65);
        let mut buf = build_entry_72(999, 0.1); // offset_or_size becomes data_packet_size
        buf.extend_from_slice(&0x5000u64.to_le_bytes()); // 64-bit offset
        buf.extend_from_slice(&3i32.to_le_bytes()); // cycle_number
        buf.extend_from_slice(&0u32.to_le_bytes()); // padding
        let entries = parse_scan_index(&buf, 0, version, 1).unwrap();
        assert_eq!(entries[0].offset, 0x5000);
        assert_eq!(entries[0].data_packet_size, 999);
    }
}
