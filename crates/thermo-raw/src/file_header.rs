//! FileHeader parsing — the first, fixed-size structure in the Finnigan
//! data stream.
//!
//! Fixed 1356 bytes: magic u16, signature (9 x u16 UTF-16), four u32
//! unknowns, the version u32, two AuditTag blocks (112 bytes each), one u32
//! unknown, 60 reserved bytes, and a 514-code-unit UTF-16 tag.

use crate::io_utils::BinaryReader;
use crate::version::FINNIGAN_MAGIC;
use crate::RawError;

pub const FILE_HEADER_SIZE: usize = 1356;

/// Parsed Finnigan file header.
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub magic: u16,
    pub signature: String,
    pub version: u32,
    pub creation_time: u64,
    pub creation_user: String,
    pub modification_time: u64,
    pub modification_user: String,
    pub tag: String,
}

/// Audit tag: timestamp + two user tags (112 bytes total).
struct AuditTag {
    time: u64,
    tag1: String,
    tag2: String,
}

impl AuditTag {
    fn parse(reader: &mut BinaryReader) -> Result<Self, RawError> {
        let time = reader.read_u64()?;
        let tag1 = reader.read_utf16_fixed(50)?;
        let tag2 = reader.read_utf16_fixed(50)?;
        let _unknown = reader.read_u32()?;
        Ok(Self { time, tag1, tag2 })
    }
}

impl FileHeader {
    /// Parse the FileHeader from the beginning of the data stream.
    pub fn parse(data: &[u8]) -> Result<Self, RawError> {
        let mut reader = BinaryReader::new(data);

        let magic = reader.read_u16()?;
        if magic != FINNIGAN_MAGIC {
            return Err(RawError::MalformedFile(format!(
                "expected Finnigan magic 0x{:04X}, found 0x{:04X}",
                FINNIGAN_MAGIC, magic
            )));
        }

        let signature = reader.read_utf16_fixed(18)?;
        let _unknown1 = reader.read_u32()?;
        let _unknown2 = reader.read_u32()?;
        let _unknown3 = reader.read_u32()?;
        let _unknown4 = reader.read_u32()?;
        let version = reader.read_u32()?;

        let audit_start = AuditTag::parse(&mut reader)?;
        let audit_end = AuditTag::parse(&mut reader)?;

        let _unknown5 = reader.read_u32()?;
        reader.skip(60)?;

        let tag = reader.read_utf16_fixed(1028)?;

        Ok(Self {
            magic,
            signature,
            version,
            creation_time: audit_start.time,
            creation_user: audit_start.tag1,
            modification_time: audit_end.time,
            modification_user: audit_end.tag2,
            tag,
        })
    }
}

/// Convert a Windows FILETIME (100-ns ticks since 1601-01-01 UTC) to an ISO
/// 8601 UTC date-time string.
pub fn filetime_to_string(filetime: u64) -> String {
    const FILETIME_UNIX_DIFF: u64 = 116_444_736_000_000_000;
    if filetime < FILETIME_UNIX_DIFF {
        return "unknown".to_string();
    }
    let unix_100ns = filetime - FILETIME_UNIX_DIFF;
    let unix_secs = unix_100ns / 10_000_000;

    let days = unix_secs / 86400;
    let remaining = unix_secs % 86400;
    let hours = remaining / 3600;
    let minutes = (remaining % 3600) / 60;
    let seconds = remaining % 60;

    let (year, month, day) = days_to_ymd(days);

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year, month, day, hours, minutes, seconds
    )
}

fn days_to_ymd(mut days: u64) -> (u64, u64, u64) {
    let mut year = 1970;
    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }
    let leap = is_leap_year(year);
    let month_days: [u64; 12] = if leap {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };
    let mut month = 1;
    for &md in &month_days {
        if days < md {
            break;
        }
        days -= md;
        month += 1;
    }
    (year, month, days + 1)
}

fn is_leap_year(year: u64) -> bool {
    (year.is_multiple_of(4) && !year.is_multiple_of(100)) || year.is_multiple_of(400)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_header_bytes(version: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&FINNIGAN_MAGIC.to_le_bytes());
        buf.extend(std::iter::repeat(0u8).take(18)); // signature
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&version.to_le_bytes());
        buf.extend(std::iter::repeat(0u8).take(112)); // audit_start
        buf.extend(std::iter::repeat(0u8).take(112)); // audit_end
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend(std::iter::repeat(0u8).take(60));
        buf.extend(std::iter::repeat(0u8).take(1028));
        buf
    }

    #[test]
    fn parses_version_and_is_exactly_the_documented_size() {
        let bytes = build_header_bytes(66);
        assert_eq!(bytes.len(), FILE_HEADER_SIZE);
        let header = FileHeader::parse(&bytes).unwrap();
        assert_eq!(header.version, 66);
        assert_eq!(header.magic, FINNIGAN_MAGIC);
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = build_header_bytes(66);
        bytes[0] = 0;
        bytes[1] = 0;
        assert!(matches!(
            FileHeader::parse(&bytes),
            Err(RawError::MalformedFile(_))
        ));
    }

    #[test]
    fn filetime_zero_is_unknown() {
        assert_eq!(filetime_to_string(0), "unknown");
    }

    #[test]
    fn filetime_epoch_roundtrip() {
        // 1601-01-01 + FILETIME_UNIX_DIFF ticks = 1970-01-01T00:00:00Z
        assert_eq!(
            filetime_to_string(116_444_736_000_000_000),
            "1970-01-01T00:00:00Z"
        );
    }
}
