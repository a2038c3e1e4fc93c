//! Error types of the coders and their configuration.
use thiserror::Error;

/// The error kind after unsuccessful coding of an LZW stream.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LzwError {
    /// The input contained a code that has not been assigned yet.
    ///
    /// Only the decoder reports this. The stream does not originate from an encoder with the same
    /// configuration, or it was corrupted.
    #[error("invalid code in LZW stream")]
    InvalidCode,
    /// The input contained a byte outside of the configured alphabet.
    #[error("byte outside of the configured alphabet")]
    InvalidByte,
}

/// A rejected [`Configuration`](../struct.Configuration.html).
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("code width of {width} bits is not within 1..=16")]
    CodeWidth { width: u8 },
    #[error("alphabet of {size} literals is not within 1..=256")]
    AlphabetSize { size: u16 },
    #[error("a table of {table_size} codes can not hold {alphabet_size} literals")]
    TableTooSmall {
        table_size: usize,
        alphabet_size: u16,
    },
}

#[cfg(feature = "std")]
impl From<LzwError> for std::io::Error {
    fn from(err: LzwError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}
