//! RunHeader parsing — the primary per-controller index structure.
//!
//! Carries SampleInfo (scan range, time/mass range) plus the addresses of
//! the ScanIndex, data stream, and scan trailer (ScanEvent array). Layout is
//! deterministic: version decides which address width is on disk, there is
//! no scanning for a self-referential marker.

use crate::io_utils::BinaryReader;
use crate::version::FileVersion;
use crate::RawError;

const MAX_STRING_LEN: i32 = 1 << 20;

/// Parsed RunHeader.
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub first_scan: u32,
    pub last_scan: u32,
    pub start_time: f64,
    pub end_time: f64,
    pub low_mass: f64,
    pub high_mass: f64,
    pub max_ion_current: f64,
    pub scan_index_addr: u64,
    pub data_addr: u64,
    pub scan_trailer_addr: u64,
    pub scan_params_addr: u64,
    pub device_name: String,
    pub model: String,
    pub serial_number: String,
    pub software_version: String,
    pub start_offset: u64,
    pub end_offset: u64,
}

impl RunHeader {
    pub fn parse(data: &[u8], offset: u64, version: FileVersion) -> Result<Self, RawError> {
        let mut reader = BinaryReader::at_offset(data, offset);

        let _revision_and_pad = reader.read_u32()?;
        let _dataset_id = reader.read_u32()?;
        let first_scan = reader.read_u32()?;
        let last_scan = reader.read_u32()?;
        let _inst_log_length = reader.read_u32()?;
        let _error_log_length = reader.read_u32()?;
        let _file_flag = reader.read_u32()?;

        let scan_index_addr_32 = reader.read_u32()?;
        let data_addr_32 = reader.read_u32()?;
        let inst_log_addr_32 = reader.read_u32()?;
        let error_log_addr_32 = reader.read_u32()?;
        let _max_packet_and_pad = reader.read_u32()?;

        let max_ion_current = reader.read_f64()?;
        let low_mass = reader.read_f64()?;
        let high_mass = reader.read_f64()?;
        let start_time = reader.read_f64()?;
        let end_time = reader.read_f64()?;

        let _sample_tag1 = reader.read_utf16_fixed(88)?;
        let _sample_tag2 = reader.read_utf16_fixed(40)?;
        let _sample_tag3 = reader.read_utf16_fixed(320)?;

        for _ in 0..13 {
            reader.skip(520)?; // 260 UTF-16 code units per filename field
        }

        let _unknown_double1 = reader.read_f64()?;
        let _unknown_double2 = reader.read_f64()?;

        let scan_trailer_addr_32 = reader.read_u32()?;
        let scan_params_addr_32 = reader.read_u32()?;
        let _unknown1 = reader.read_u32()?;
        let _unknown2 = reader.read_u32()?;
        let _unknown3 = reader.read_u32()?;

        let (scan_index_addr, data_addr, scan_trailer_addr, scan_params_addr);

        if version.raw() >= 64 {
            let _scan_index_addr_64 = reader.read_u64()?;
            let _data_addr_64 = reader.read_u64()?;
            let _inst_log_addr_64 = reader.read_u64()?;
            let _error_log_addr_64 = reader.read_u64()?;
            let _unknown4 = reader.read_u64()?;
            let scan_trailer_addr_64 = reader.read_u64()?;
            let scan_params_addr_64 = reader.read_u64()?;
            let _unknown5 = reader.read_u32()?;
            let _unknown6 = reader.read_u32()?;
            let _own_addr_64 = reader.read_u64()?;
            for _ in 0..24 {
                reader.read_u32()?;
            }

            scan_index_addr = _scan_index_addr_64;
            data_addr = _data_addr_64;
            scan_trailer_addr = scan_trailer_addr_64;
            scan_params_addr = scan_params_addr_64;
        } else {
            scan_index_addr = scan_index_addr_32 as u64;
            data_addr = data_addr_32 as u64;
            scan_trailer_addr = scan_trailer_addr_32 as u64;
            scan_params_addr = scan_params_addr_32 as u64;
            let _ = (inst_log_addr_32, error_log_addr_32);
        }

        let _unknown_tail = reader.read_u64()?;
        let _unknown_tail2 = reader.read_u32()?;

        let device_name = reader.read_pascal_string(MAX_STRING_LEN)?;
        let model = reader.read_pascal_string(MAX_STRING_LEN)?;
        let serial_number = reader.read_pascal_string(MAX_STRING_LEN)?;
        let software_version = reader.read_pascal_string(MAX_STRING_LEN)?;
        for _ in 0..4 {
            reader.read_pascal_string(MAX_STRING_LEN)?;
        }

        Ok(Self {
            first_scan,
            last_scan,
            start_time,
            end_time,
            low_mass,
            high_mass,
            max_ion_current,
            scan_index_addr,
            data_addr,
            scan_trailer_addr,
            scan_params_addr,
            device_name,
            model,
            serial_number,
            software_version,
            start_offset: offset,
            end_offset: reader.position(),
        })
    }

    pub fn n_scans(&self) -> u32 {
        self.last_scan.saturating_sub(self.first_scan) + 1
    }
}
