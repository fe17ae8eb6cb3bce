use thiserror::Error;

/// Errors produced by the reader. Every fallible operation in this crate
/// returns one of these; nothing here aborts the process.
#[derive(Error, Debug)]
pub enum RawError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("malformed file: {0}")]
    MalformedFile(String),

    #[error("no run header with a non-zero scan trailer address was found")]
    NoMsRunHeader,

    #[error("controller {0} is not a valid chromatography controller index")]
    WrongController(usize),

    #[error("scan {scan} out of range 1..={count}")]
    OutOfRange { scan: u32, count: u32 },

    #[error("unsupported RAW file version: {0}")]
    UnsupportedVersion(u32),

    #[error("operation attempted on a closed reader")]
    ClosedReader,
}
