//! RawFile — the opener, index builder, and scan accessor.
//!
//! `open` performs one deterministic traversal (FileHeader -> SequencerRow ->
//! AutoSamplerInfo -> RawFileInfo -> MS RunHeader selection), then eagerly
//! decodes the scan event array and the scan index; both are immutable for
//! the handle's lifetime. ScanDataPackets are read and composed into spectra
//! on demand through `SpectrumHandle`, never cached by the core.

use crate::file_header::{FileHeader, FILE_HEADER_SIZE};
use crate::io_utils::BinaryReader;
use crate::run_header::RunHeader;
use crate::raw_file_info::RawFileInfo;
use crate::scan_data;
use crate::scan_event::{parse_scan_events, ScanEvent};
use crate::scan_index::{parse_scan_index, ScanIndexEntry};
use crate::sequencer::{AutoSamplerInfo, SequencerRow};
use crate::source::ByteSource;
use crate::types::{Activation, Analyzer, Peak, Spectrum};
use crate::version::FileVersion;
use crate::RawError;
use std::path::Path;

/// Construction options for [`RawFile::open_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Read the whole file into memory up front instead of memory-mapping it.
    pub in_memory: bool,
}

/// An opened Thermo RAW file: byte source, MS run header, and the eagerly
/// decoded scan event and scan index arrays.
pub struct RawFile {
    source: Option<ByteSource>,
    version: FileVersion,
    run_header: RunHeader,
    info: RawFileInfo,
    scan_events: Vec<ScanEvent>,
    scan_index: Vec<ScanIndexEntry>,
}

/// One point of a chromatography controller's data stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromatographyPoint {
    pub time: f64,
    pub value: f64,
}

/// One point of an extracted-ion chromatogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XicPoint {
    pub retention_time: f64,
    pub intensity: f32,
}

impl RawFile {
    /// Open `path` with default options (memory-mapped, not fully buffered).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RawError> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Open `path` backed by a memory map. Equivalent to `open_with` with
    /// `in_memory: false`; kept as a named convenience.
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self, RawError> {
        Self::open_with(path, OpenOptions { in_memory: false })
    }

    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self, RawError> {
        let source = if options.in_memory {
            ByteSource::open_owned(path)?
        } else {
            ByteSource::open_mapped(path)?
        };
        Self::from_source(source)
    }

    fn from_source(source: ByteSource) -> Result<Self, RawError> {
        let data: &[u8] = &source;

        let header = FileHeader::parse(data)?;
        let version = FileVersion(header.version);
        log::debug!("finnigan file header parsed, version {}", version);

        let mut reader = BinaryReader::at_offset(data, FILE_HEADER_SIZE as u64);
        SequencerRow::parse(&mut reader, version)?;
        AutoSamplerInfo::parse(&mut reader)?;
        let info_offset = reader.position();
        let info = RawFileInfo::parse(data, info_offset, version)?;

        let mut ms_run_header = None;
        for &addr in &info.run_header_addrs {
            let candidate = RunHeader::parse(data, addr, version)?;
            if candidate.scan_trailer_addr != 0 {
                log::debug!("selected MS run header at offset {}", addr);
                ms_run_header = Some(candidate);
                break;
            }
        }
        let run_header = ms_run_header.ok_or(RawError::NoMsRunHeader)?;

        let n_scans = run_header.n_scans();

        let scan_events = parse_scan_events(
            data,
            run_header.scan_trailer_addr + 4,
            n_scans,
            version,
        )?;

        let mut scan_index = parse_scan_index(data, run_header.scan_index_addr, version, n_scans)?;
        for entry in &mut scan_index {
            entry.offset += run_header.data_addr;
        }

        Ok(Self {
            source: Some(source),
            version,
            run_header,
            info,
            scan_events,
            scan_index,
        })
    }

    fn data(&self) -> Result<&[u8], RawError> {
        self.source.as_deref().ok_or(RawError::ClosedReader)
    }

    pub fn version(&self) -> FileVersion {
        self.version
    }

    pub fn first_scan(&self) -> u32 {
        self.run_header.first_scan
    }

    pub fn last_scan(&self) -> u32 {
        self.run_header.last_scan
    }

    pub fn start_time(&self) -> f64 {
        self.run_header.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.run_header.end_time
    }

    pub fn low_mass(&self) -> f64 {
        self.run_header.low_mass
    }

    pub fn high_mass(&self) -> f64 {
        self.run_header.high_mass
    }

    pub fn device_name(&self) -> &str {
        &self.run_header.device_name
    }

    pub fn model(&self) -> &str {
        &self.run_header.model
    }

    pub fn acquisition_date(&self) -> String {
        self.info.acquisition_date()
    }

    pub fn scan_index(&self) -> &[ScanIndexEntry] {
        &self.scan_index
    }

    pub fn scan_events(&self) -> &[ScanEvent] {
        &self.scan_events
    }

    pub fn scan_count(&self) -> usize {
        self.scan_index.len()
    }

    /// Fetch scan `n` (1-based). Fails with `OutOfRange` outside `[1, scan_count()]`.
    pub fn scan(&self, n: u32) -> Result<Scan<'_>, RawError> {
        self.data()?;
        let count = self.scan_count() as u32;
        if n < 1 || n > count {
            return Err(RawError::OutOfRange { scan: n, count });
        }
        let idx = (n - 1) as usize;
        let entry = &self.scan_index[idx];
        // Events and index entries are decoded one-for-one in scan order; the
        // scan_event_ordinal field is carried on the entry but not used for
        // lookup, matching the reference reader's positional pairing.
        let event = &self.scan_events[idx];

        Ok(Scan {
            ms_level: event.ms_level(),
            analyzer: event.analyzer(),
            activation: event.activation(),
            retention_time_minutes: entry.retention_time,
            precursor_mzs: event.precursor_mzs(),
            handle: SpectrumHandle {
                raw: self,
                offset: entry.offset,
                event,
            },
        })
    }

    /// Yield scans in stored (ascending scan-number) order. Restartable.
    pub fn all_scans(&self) -> impl Iterator<Item = Result<Scan<'_>, RawError>> + '_ {
        (1..=self.scan_count() as u32).map(move |n| self.scan(n))
    }

    /// Decode a range of scans concurrently via rayon. Sugar over repeated
    /// `scan()` calls; does not change single-scan semantics.
    pub fn scans_parallel(&self, range: std::ops::Range<u32>) -> Result<Vec<Scan<'_>>, RawError> {
        use rayon::prelude::*;
        range.into_par_iter().map(|n| self.scan(n)).collect()
    }

    /// Read a non-MS controller's chromatography stream: flat 16-byte
    /// `{value, time}` records starting at that controller's `data_addr`.
    /// Fails with `WrongController` if `controller_index` is out of range or
    /// names the MS controller (`scan_trailer_addr != 0`).
    pub fn chromatography(
        &self,
        controller_index: usize,
    ) -> Result<Vec<ChromatographyPoint>, RawError> {
        let data = self.data()?;
        let addr = *self
            .info
            .run_header_addrs
            .get(controller_index)
            .ok_or(RawError::WrongController(controller_index))?;
        let header = RunHeader::parse(data, addr, self.version)?;
        if header.scan_trailer_addr != 0 {
            return Err(RawError::WrongController(controller_index));
        }

        let n = header.n_scans();
        let mut reader = BinaryReader::at_offset(data, header.data_addr);
        let mut points = Vec::with_capacity(n as usize);
        for _ in 0..n {
            let value = reader.read_f64()?;
            let time = reader.read_f64()?;
            points.push(ChromatographyPoint { time, value });
        }
        Ok(points)
    }

    /// Extracted-ion chromatogram: for every MS1 scan, the max-intensity peak
    /// within `mz * (1 ± tolerance_ppm * 1e-6)`, or 0.0 if none falls inside.
    pub fn xic(&self, mz: f64, tolerance_ppm: f64) -> Result<Vec<XicPoint>, RawError> {
        let tol = mz * tolerance_ppm * 1e-6;
        let (low, high) = (mz - tol, mz + tol);
        let mut points = Vec::with_capacity(self.scan_count());
        for scan in self.all_scans() {
            let scan = scan?;
            if scan.ms_level != 1 {
                continue;
            }
            let intensity = scan
                .spectrum()?
                .iter()
                .filter(|p| p.mz >= low && p.mz <= high)
                .map(|p| p.intensity)
                .fold(0.0f32, f32::max);
            points.push(XicPoint {
                retention_time: scan.retention_time_minutes,
                intensity,
            });
        }
        Ok(points)
    }

    /// Release the byte source. All subsequent operations fail with `ClosedReader`.
    pub fn close(&mut self) {
        self.source = None;
    }
}

/// A deferred, uncached resolver for one scan's spectrum. Borrows the owning
/// `RawFile`; cannot outlive it. Resolving re-reads and re-composes on every
/// call.
pub struct SpectrumHandle<'r> {
    raw: &'r RawFile,
    offset: u64,
    event: &'r ScanEvent,
}

impl<'r> SpectrumHandle<'r> {
    pub fn peaks(&self) -> Result<Spectrum, RawError> {
        let data = self.raw.data()?;
        scan_data::decode_spectrum(data, self.offset, self.event)
    }
}

/// One acquisition event: cheap metadata populated eagerly, the spectrum
/// resolved lazily through `spectrum()`.
pub struct Scan<'r> {
    pub ms_level: u8,
    pub analyzer: Analyzer,
    pub activation: Activation,
    pub retention_time_minutes: f64,
    pub precursor_mzs: Vec<f64>,
    handle: SpectrumHandle<'r>,
}

impl<'r> Scan<'r> {
    /// Resolve the spectrum. Uncached: repeated calls re-read and re-compose.
    pub fn spectrum(&self) -> Result<Spectrum, RawError> {
        self.handle.peaks()
    }

    /// The single highest-intensity peak in the resolved spectrum.
    pub fn base_peak(&self) -> Result<Option<Peak>, RawError> {
        Ok(self
            .spectrum()?
            .into_iter()
            .max_by(|a, b| a.intensity.total_cmp(&b.intensity)))
    }
}
