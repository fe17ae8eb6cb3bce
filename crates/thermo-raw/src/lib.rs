//! Pure Rust Thermo RAW file reader.
//!
//! This crate reads Thermo Scientific RAW mass spectrometry data files
//! without any Thermo DLLs. It supports:
//!
//! - File metadata and run header extraction
//! - Scan data reading (profile and centroid packets) with frequency-to-m/z
//!   calibration applied per scan event
//! - Chromatography controller streams (UV, analog, ...) and extracted-ion
//!   chromatograms
//! - Parallel scan decoding via rayon
//!
//! # Example
//!
//! ```no_run
//! use thermo_raw::RawFile;
//!
//! let raw = RawFile::open("sample.raw").unwrap();
//! println!("scans: {}", raw.scan_count());
//!
//! let scan = raw.scan(1).unwrap();
//! let spectrum = scan.spectrum().unwrap();
//! println!("peaks: {}", spectrum.len());
//! ```

pub mod c_index;
pub mod error;
pub mod file_header;
pub mod io_utils;
pub mod raw_file;
pub mod raw_file_info;
pub mod run_header;
pub mod scan_data;
pub mod scan_event;
pub mod scan_index;
pub mod sequencer;
pub mod source;
pub mod types;
pub mod version;

pub use error::RawError;
pub use raw_file::{ChromatographyPoint, OpenOptions, RawFile, Scan, SpectrumHandle, XicPoint};
pub use types::*;
