//! Byte-Range Source: the seekable abstraction the opener and scan accessor
//! read through, backed either by a memory-mapped file or a fully-buffered
//! in-memory image.
//!
//! Both variants expose the file as a contiguous `&[u8]`: the memory-mapped
//! variant lets the OS page data in on demand (the practical Rust realization
//! of "file-backed, seek per access" without re-threading every record codec
//! through `Read + Seek`), and the owned variant reads the whole file up
//! front for platforms where per-page-fault latency dominates.

use crate::RawError;
use std::ops::Deref;
use std::path::Path;

/// The file's bytes, either memory-mapped or fully read into a `Vec`.
pub enum ByteSource {
    Mapped(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl ByteSource {
    pub fn open_mapped(path: impl AsRef<Path>) -> Result<Self, RawError> {
        let file = std::fs::File::open(path.as_ref())?;
        // Safety: the caller must not mutate the file out from under the
        // mapping while this RawFile is open; this is the standard caveat of
        // memmap2's file-backed mappings.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Ok(ByteSource::Mapped(mmap))
    }

    pub fn open_owned(path: impl AsRef<Path>) -> Result<Self, RawError> {
        Ok(ByteSource::Owned(std::fs::read(path.as_ref())?))
    }

    pub fn len(&self) -> u64 {
        self.deref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slice `[begin, end)`, failing with `IoError` if the range runs past EOF.
    pub fn slice(&self, begin: u64, end: u64) -> Result<&[u8], RawError> {
        let data = self.deref();
        if end > data.len() as u64 || begin > end {
            return Err(RawError::IoError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "requested range {}..{} exceeds file length {}",
                    begin,
                    end,
                    data.len()
                ),
            )));
        }
        Ok(&data[begin as usize..end as usize])
    }
}

impl Deref for ByteSource {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        match self {
            ByteSource::Mapped(m) => m,
            ByteSource::Owned(v) => v,
        }
    }
}
