//! # LZW dictionary coder
//!
//! This crate provides an [`Encoder`] that turns a byte stream into a sequence of integer code
//! words and a [`Decoder`] that turns such a sequence back into bytes. Codes are not packed into
//! a bitstream; each one is a plain [`Code`] value and the io adapters write them as decimal text,
//! one per line.
//!
//! The code table starts out with one literal code per byte of the alphabet (code `i` is byte
//! `i`) and learns one `(prefix, byte)` pair for every emitted code until it holds
//! `1 << code_width` entries. A full table is never reset, the coder merely stops learning.
//!
//! Exemplary use of the encoder:
//!
//! ```
//! use lzwords::encode::Encoder;
//! let data = b"ABAB";
//!
//! let mut encoder = Encoder::new();
//! let codes: Vec<_> = encoder.codes(data.iter().copied()).collect::<Result<_, _>>().unwrap();
//! assert_eq!(codes, [u16::from(b'A'), u16::from(b'B'), 256]);
//! ```
//!
//! [`Encoder`]: encode/struct.Encoder.html
//! [`Decoder`]: decode/struct.Decoder.html
//! [`Code`]: type.Code.html
#![forbid(unsafe_code)]

/// The widest supported code, all codes fit into a `u16`.
pub const MAX_CODESIZE: u8 = 16;
/// The code width used when none is configured.
pub const DEFAULT_CODESIZE: u8 = 12;
/// The number of literal codes when none is configured, one for each byte value.
pub const DEFAULT_ALPHABET: u16 = 256;

/// Alias for a LZW code point
pub type Code = u16;

pub mod error;
pub mod table;
pub mod encode;
pub mod decode;

pub use crate::error::{ConfigError, LzwError};

/// The sizes of a code table.
///
/// Both encoder and decoder must use the same configuration, nothing in the code stream records
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Configuration {
    code_width: u8,
    alphabet_size: u16,
}

/// The result of a coding operation on a pair of buffer.
#[must_use = "Contains a status with potential error information"]
#[derive(Debug)]
pub struct StreamResult {
    /// The number of items consumed from the input buffer, bytes or codes.
    pub consumed_in: usize,
    /// The number of items written into the output buffer, codes or bytes.
    pub consumed_out: usize,
    /// The status after returning from the write call.
    pub status: Result<LzwStatus, LzwError>,
}

/// The result of coding a whole reader into a writer.
#[cfg(feature = "std")]
#[must_use = "Contains a status with potential error information"]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The possible error that occurred.
    ///
    /// Note that when writing into streams it is not in general possible to recover from an
    /// error.
    pub status: std::io::Result<()>,
}

/// The status after successful coding of some input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LzwStatus {
    /// Everything went well.
    Ok,
    /// No bytes were read or written and no internal state advanced.
    ///
    /// If this is returned but your application can not provide more input data then the input
    /// was not marked as finished with `finish`.
    NoProgress,
    /// The input was finished and everything pending has been written.
    Done,
}

impl Configuration {
    /// A configuration with the given code width and one literal code per byte value.
    pub fn new(code_width: u8) -> Result<Self, ConfigError> {
        Self::with_alphabet(code_width, DEFAULT_ALPHABET)
    }

    /// A configuration with a reduced alphabet.
    ///
    /// Only bytes below `alphabet_size` may then be encoded.
    pub fn with_alphabet(code_width: u8, alphabet_size: u16) -> Result<Self, ConfigError> {
        if code_width == 0 || code_width > MAX_CODESIZE {
            return Err(ConfigError::CodeWidth { width: code_width });
        }

        if alphabet_size == 0 || alphabet_size > DEFAULT_ALPHABET {
            return Err(ConfigError::AlphabetSize { size: alphabet_size });
        }

        let table_size = 1usize << code_width;
        if table_size < usize::from(alphabet_size) {
            return Err(ConfigError::TableTooSmall {
                table_size,
                alphabet_size,
            });
        }

        Ok(Configuration {
            code_width,
            alphabet_size,
        })
    }

    /// The number of bits needed for every code.
    pub fn code_width(&self) -> u8 {
        self.code_width
    }

    /// The number of pre-seeded literal codes.
    pub fn alphabet_size(&self) -> u16 {
        self.alphabet_size
    }

    /// The maximum number of entries, literals included.
    pub fn table_size(&self) -> usize {
        1 << self.code_width
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            code_width: DEFAULT_CODESIZE,
            alphabet_size: DEFAULT_ALPHABET,
        }
    }
}

/// Compress a byte slice with the default configuration.
pub fn compress(data: &[u8]) -> Vec<Code> {
    let mut encoder = encode::Encoder::new();
    let mut out = vec![0; data.len() + 1];
    encoder.finish();
    let result = encoder.encode_bytes(data, &mut out);
    // Every byte produces at most one code plus the final flush, nothing is out of the alphabet.
    debug_assert!(matches!(result.status, Ok(LzwStatus::Done)));
    out.truncate(result.consumed_out);
    out
}

/// Decompress a code sequence produced with the default configuration.
pub fn decompress(codes: &[Code]) -> Result<Vec<u8>, LzwError> {
    let mut decoder = decode::Decoder::new();
    decoder.finish();
    decoder.decode_vec(codes)
}
