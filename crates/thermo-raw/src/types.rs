//! The format-independent data model exposed to callers: `Peak`, `Spectrum`,
//! `Scan`, `Analyzer`, `Activation`.

use serde::{Deserialize, Serialize};

/// A single (m/z, intensity) pair. `intensity` is expected non-negative but
/// this is not enforced; `mz` is strictly positive in valid data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub mz: f64,
    pub intensity: f32,
}

/// An ordered sequence of peaks, sorted non-decreasingly by m/z at the point
/// it is returned from the core.
pub type Spectrum = Vec<Peak>;

/// Detector technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Analyzer {
    Itms,
    Tqms,
    Sqms,
    Tofms,
    Ftms,
    Sector,
    Undefined,
}

impl Analyzer {
    pub(crate) fn from_byte(b: u8) -> Self {
        match b {
            0 => Analyzer::Itms,
            1 => Analyzer::Tqms,
            2 => Analyzer::Sqms,
            3 => Analyzer::Tofms,
            4 => Analyzer::Ftms,
            5 => Analyzer::Sector,
            _ => Analyzer::Undefined,
        }
    }
}

impl std::fmt::Display for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Analyzer::Itms => write!(f, "ITMS"),
            Analyzer::Tqms => write!(f, "TQMS"),
            Analyzer::Sqms => write!(f, "SQMS"),
            Analyzer::Tofms => write!(f, "TOFMS"),
            Analyzer::Ftms => write!(f, "FTMS"),
            Analyzer::Sector => write!(f, "Sector"),
            Analyzer::Undefined => write!(f, "Undefined"),
        }
    }
}

/// Fragmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Cid,
    Mpd,
    Ecd,
    Pqd,
    Etd,
    Hcd,
    Sa,
    Ptr,
    Netd,
    Nptr,
    Uvpd,
    Eid,
    Undefined,
}

impl Activation {
    /// Derive the activation type from a Reaction's `collision_energy_valid` field:
    /// bit 0 is the valid flag, bits 1-8 carry the activation type enum.
    pub(crate) fn from_collision_energy_valid(raw: u32) -> Self {
        if raw & 1 == 0 {
            return Activation::Undefined;
        }
        match (raw >> 1) & 0xFF {
            0 => Activation::Cid,
            1 => Activation::Mpd,
            2 => Activation::Ecd,
            3 => Activation::Pqd,
            4 => Activation::Etd,
            5 => Activation::Hcd,
            7 => Activation::Sa,
            8 => Activation::Ptr,
            9 => Activation::Netd,
            10 => Activation::Nptr,
            11 => Activation::Uvpd,
            12 => Activation::Eid,
            _ => Activation::Undefined,
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activation::Cid => write!(f, "CID"),
            Activation::Mpd => write!(f, "MPD"),
            Activation::Ecd => write!(f, "ECD"),
            Activation::Pqd => write!(f, "PQD"),
            Activation::Etd => write!(f, "ETD"),
            Activation::Hcd => write!(f, "HCD"),
            Activation::Sa => write!(f, "SA"),
            Activation::Ptr => write!(f, "PTR"),
            Activation::Netd => write!(f, "NETD"),
            Activation::Nptr => write!(f, "NPTR"),
            Activation::Uvpd => write!(f, "UVPD"),
            Activation::Eid => write!(f, "EID"),
            Activation::Undefined => write!(f, "Undefined"),
        }
    }
}
