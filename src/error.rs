use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine and its file readers.
///
/// Geometry never fails: degenerate sections evaluate to zero. The only
/// engine failure is a roughness table with no leftmost n.
#[derive(Debug, Error)]
pub enum Error {
    /// The leftmost station-sorted roughness row has no finite n.
    #[error("leftmost roughness row (station {station:?}) must define a Manning's n value")]
    MissingInitialRoughness { station: Option<f64> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record that parsed but carries unusable values.
    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),
}
