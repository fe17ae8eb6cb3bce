//! RawFileInfo / InfoPreamble parsing.
//!
//! Carries the acquisition timestamp and the list of RunHeader addresses,
//! one per controller (MS, UV, analog, ...). The on-disk preamble reserves a
//! fixed byte budget for a 32-bit controller table (pre-v64) and, at v64+,
//! an additional 64-bit table; only the table matching the file's address
//! width is actually populated, the other is reserved padding.

use crate::io_utils::BinaryReader;
use crate::version::FileVersion;
use crate::RawError;

const MAX_STRING_LEN: i32 = 1 << 20;

/// Parsed RawFileInfo: acquisition timestamp plus per-controller RunHeader addresses.
#[derive(Debug, Clone)]
pub struct RawFileInfo {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub millisecond: u16,
    pub n_controllers: u32,
    /// Absolute RunHeader address for each controller, in declaration order.
    pub run_header_addrs: Vec<u64>,
    /// Five user-label headings plus one trailing heading.
    pub headings: Vec<String>,
    pub end_offset: u64,
}

impl RawFileInfo {
    pub fn parse(data: &[u8], offset: u64, version: FileVersion) -> Result<Self, RawError> {
        let mut reader = BinaryReader::at_offset(data, offset);

        let _method_file_present = reader.read_u32()?;

        let year = reader.read_u16()?;
        let month = reader.read_u16()?;
        let _weekday = reader.read_u16()?;
        let day = reader.read_u16()?;
        let hour = reader.read_u16()?;
        let minute = reader.read_u16()?;
        let second = reader.read_u16()?;
        let millisecond = reader.read_u16()?;

        let _is_in_acquisition = reader.read_u32()?;
        let _data_addr_32 = reader.read_u32()?;
        let n_controllers = reader.read_u32()?;
        let _n_controllers_dup = reader.read_u32()?;
        let _unknown1 = reader.read_u32()?;
        let _unknown2 = reader.read_u32()?;

        let mut run_header_addrs: Vec<u64> = Vec::with_capacity(n_controllers as usize);

        if version.raw() < 64 {
            for _ in 0..n_controllers {
                let addr32 = reader.read_u32()?;
                let _unknown_a = reader.read_u32()?;
                let _unknown_b = reader.read_u32()?;
                run_header_addrs.push(addr32 as u64);
            }
            let padding = version.info_preamble_32bit_padding() as i64 - 12 * n_controllers as i64;
            if padding > 0 {
                reader.skip(padding as usize)?;
            }
        } else {
            reader.skip(764)?;
        }

        if version.raw() >= 64 {
            let _data_addr = reader.read_u64()?;
            let _unknown3 = reader.read_u64()?;

            run_header_addrs.clear();
            for _ in 0..n_controllers {
                let addr = reader.read_u64()?;
                let _unknown_c = reader.read_u64()?;
                run_header_addrs.push(addr);
            }
            let padding = version.info_preamble_64bit_padding(n_controllers);
            if padding > 0 {
                reader.skip(padding as usize)?;
            }
        }

        let mut headings = Vec::with_capacity(6);
        for _ in 0..5 {
            headings.push(reader.read_pascal_string(MAX_STRING_LEN)?);
        }
        headings.push(reader.read_pascal_string(MAX_STRING_LEN)?);

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            n_controllers,
            run_header_addrs,
            headings,
            end_offset: reader.position(),
        })
    }

    pub fn acquisition_date(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pascal(s: &str) -> Vec<u8> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let mut buf = (units.len() as i32).to_le_bytes().to_vec();
        for u in units {
            buf.extend_from_slice(&u.to_le_bytes());
        }
        buf
    }

    fn build_common_preamble(n_controllers: u32, year: u16) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u32.to_le_bytes()); // method_file_present
        buf.extend_from_slice(&year.to_le_bytes());
        buf.extend_from_slice(&7u16.to_le_bytes()); // month
        buf.extend_from_slice(&0u16.to_le_bytes()); // weekday
        buf.extend_from_slice(&15u16.to_le_bytes()); // day
        buf.extend_from_slice(&10u16.to_le_bytes()); // hour
        buf.extend_from_slice(&30u16.to_le_bytes()); // minute
        buf.extend_from_slice(&0u16.to_le_bytes()); // second
        buf.extend_from_slice(&0u16.to_le_bytes()); // millisecond
        buf.extend_from_slice(&0u32.to_le_bytes()); // is_in_acquisition
        buf.extend_from_slice(&0u32.to_le_bytes()); // data_addr_32
        buf.extend_from_slice(&n_controllers.to_le_bytes());
        buf.extend_from_slice(&n_controllers.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf
    }

    #[test]
    fn parses_v57_32bit_controller_table() {
        let version = FileVersion(57);
        let n_controllers = 1u32;
        let mut buf = build_common_preamble(n_controllers, 2020);

        buf.extend_from_slice(&0x1000u32.to_le_bytes()); // run_header_addr_32
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        let padding = version.info_preamble_32bit_padding() as i64 - 12 * n_controllers as i64;
        buf.extend(std::iter::repeat(0u8).take(padding as usize));

        for s in ["a", "b", "c", "d", "e", "computer"] {
            buf.extend(pascal(s));
        }

        let info = RawFileInfo::parse(&buf, 0, version).unwrap();
        assert_eq!(info.year, 2020);
        assert_eq!(info.n_controllers, 1);
        assert_eq!(info.run_header_addrs, vec![0x1000]);
        assert_eq!(info.headings.last().unwrap(), "computer");
        assert_eq!(info.end_offset, buf.len() as u64);
    }

    #[test]
    fn parses_v66_64bit_controller_table() {
        let version = FileVersion(66);
        let n_controllers = 2u32;
        let mut buf = build_common_preamble(n_controllers, 2022);

        buf.extend(std::iter::repeat(0u8).take(764)); // reserved 32-bit slot

        buf.extend_from_slice(&0u64.to_le_bytes()); // data_addr
        buf.extend_from_slice(&0u64.to_le_bytes()); // unknown
        buf.extend_from_slice(&0x2000u64.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&0x3000u64.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        let padding = version.info_preamble_64bit_padding(n_controllers);
        buf.extend(std::iter::repeat(0u8).take(padding as usize));

        for s in ["", "", "", "", "", ""] {
            buf.extend(pascal(s));
        }

        let info = RawFileInfo::parse(&buf, 0, version).unwrap();
        assert_eq!(info.run_header_addrs, vec![0x2000, 0x3000]);
        assert_eq!(info.end_offset, buf.len() as u64);
    }
}
