//! CIndex parsing — the per-record index for chromatography (non-MS)
//! controllers: UV, analog, and similar.
//!
//! Mirrors ScanIndexEntry's shape at a smaller byte budget, with the same
//! offset-widening rule. `chromatography()` does not read through this
//! index: it reads CDataPacket records directly and sequentially from
//! `data_addr`; this index exists for parity with the format's own record
//! set and for tools that need per-record offsets into the controller's
//! data stream.

use crate::io_utils::BinaryReader;
use crate::version::FileVersion;
use crate::RawError;

/// A single entry in a chromatography controller's index.
#[derive(Debug, Clone, Copy)]
pub struct CIndexEntry {
    pub offset: u64,
    pub retention_time: f64,
}

pub fn parse_c_index(
    data: &[u8],
    offset: u64,
    version: FileVersion,
    n_records: u32,
) -> Result<Vec<CIndexEntry>, RawError> {
    let entry_size = version.c_index_entry_size();
    let has_64bit_offset = version.raw() >= 64;
    let mut reader = BinaryReader::at_offset(data, offset);
    let mut entries = Vec::with_capacity(n_records as usize);

    for _ in 0..n_records {
        let entry_start = reader.position();

        let offset32 = reader.read_u32()?;
        let _trailer_offset = reader.read_i32()?;
        let _scan_type_index = reader.read_u32()?;
        let _scan_number = reader.read_i32()?;
        let _packet_type = reader.read_u32()?;
        let _number_packets = reader.read_i32()?;
        let retention_time = reader.read_f64()?;

        let entry_offset = if has_64bit_offset {
            reader.set_position(entry_start + 56);
            reader.read_u64()?
        } else {
            offset32 as u64
        };

        reader.set_position(entry_start + entry_size as u64);

        entries.push(CIndexEntry {
            offset: entry_offset,
            retention_time,
        });
    }

    Ok(entries)
}
