//! The crate's error type.

/// Errors raised while reading a Parquet file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParquetError {
    /// The file does not conform to the Parquet binary layout: a bad magic
    /// number, a truncated footer or page, a malformed varint, a page whose
    /// value count disagrees with its header, a dictionary index out of
    /// range, or a definition/repetition level out of range.
    OutOfSpec(String),
    /// Everything else: unsupported encodings/codecs, projection errors,
    /// type mismatches on a typed getter, decompression failures, I/O
    /// failures, and cursor cancellation.
    General(String),
}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParquetError::OutOfSpec(message) => write!(fmt, "out of spec: {}", message),
            ParquetError::General(message) => write!(fmt, "{}", message),
        }
    }
}

impl std::error::Error for ParquetError {}

impl From<std::io::Error> for ParquetError {
    fn from(e: std::io::Error) -> ParquetError {
        ParquetError::General(format!("underlying IO error: {}", e))
    }
}

/// A specialized `Result` for Parquet errors.
pub type Result<T> = std::result::Result<T, ParquetError>;

macro_rules! general_err {
    ($fmt:expr) => ($crate::error::ParquetError::General($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::ParquetError::General(format!($fmt, $($args),*)));
}

macro_rules! oos_err {
    ($fmt:expr) => ($crate::error::ParquetError::OutOfSpec($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => ($crate::error::ParquetError::OutOfSpec(format!($fmt, $($args),*)));
}

pub(crate) use general_err;
pub(crate) use oos_err;
