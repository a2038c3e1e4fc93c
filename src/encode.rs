//! A module for all encoding needs.
use crate::error::LzwError;
use crate::table::Table;
use crate::{Code, Configuration, LzwStatus, StreamResult};

#[cfg(feature = "std")]
use crate::AllResult;
#[cfg(feature = "std")]
use std::io::{self, BufRead, Write};

/// The number of codes buffered by the reader adapters before they are written.
#[cfg(feature = "std")]
const STREAM_BUF_SIZE: usize = 1 << 16;

/// The state for encoding bytes into LZW codes.
///
/// Every input byte is resolved, matched or extended or emitted, before the next one is looked
/// at. A code is emitted for every byte that does not extend the current match, and once more for
/// the pending match when the input is finished.
pub struct Encoder {
    state: Box<EncodeState>,
}

/// An encoding stream sink.
///
/// Writes each code as a decimal number on its own line. See [`Encoder::into_stream`] on how to
/// create this type.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

/// An async encoding sink.
///
/// See [`Encoder::into_async`] on how to create this type.
///
/// [`Encoder::into_async`]: struct.Encoder.html#method.into_async
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

/// A lazy sequence of codes for a sequence of bytes.
///
/// See [`Encoder::codes`] on how to create this type.
///
/// [`Encoder::codes`]: struct.Encoder.html#method.codes
pub struct Codes<'d, I> {
    encoder: &'d mut Encoder,
    bytes: I,
    failed: bool,
}

struct EncodeState {
    /// The configured sizes of the table.
    config: Configuration,
    /// The table of learned codes.
    table: Table,
    /// The code of the longest match of the currently read bytes, if any byte was read.
    current: Option<Code>,
    /// If the input was marked as complete.
    has_ended: bool,
    /// If the pending code was written after the end of input.
    flushed: bool,
}

impl Encoder {
    /// Create a new encoder with a 12-bit table over all byte values.
    pub fn new() -> Self {
        Self::with_config(Configuration::default())
    }

    /// Create a new encoder with the specified table sizes.
    pub fn with_config(config: Configuration) -> Self {
        Encoder {
            state: Box::new(EncodeState::new(config)),
        }
    }

    /// The configuration this encoder was created with.
    pub fn config(&self) -> Configuration {
        self.state.config
    }

    /// The code that will be assigned to the next learned pair.
    pub fn next_code(&self) -> usize {
        self.state.table.next_code()
    }

    /// If the table is full and the encoder no longer learns.
    pub fn is_saturated(&self) -> bool {
        self.state.table.is_full()
    }

    /// The table learned so far.
    pub fn table(&self) -> &Table {
        &self.state.table
    }

    /// Encode some bytes from `inp` into codes in `out`.
    ///
    /// A byte that completes a code is only consumed when `out` has room for that code, so the
    /// output buffer may be arbitrarily small. Bytes outside the configured alphabet are rejected
    /// with [`LzwError::InvalidByte`] and not consumed.
    ///
    /// See [`into_stream`] for high-level functions (this interface is only available with the
    /// `std` feature) and [`finish`] for marking the input data as complete.
    ///
    /// [`LzwError::InvalidByte`]: ../error/enum.LzwError.html#variant.InvalidByte
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut [Code]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Construct an encoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Construct an encoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&mut self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            encoder: self,
            writer,
        }
    }

    /// Lazily encode a sequence of bytes.
    ///
    /// Each code is yielded as soon as it is decided. When `bytes` runs out the encoder is marked
    /// as finished and the pending match is yielded as the last code.
    pub fn codes<I: IntoIterator<Item = u8>>(&mut self, bytes: I) -> Codes<'_, I::IntoIter> {
        Codes {
            encoder: self,
            bytes: bytes.into_iter(),
            failed: false,
        }
    }

    /// Mark the encoding as finished.
    ///
    /// In following calls to `encode_bytes` the encoder will write the pending code after
    /// encoding all of `inp`. Once that code is written the encoder reports `Done` and consumes no
    /// further input.
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

#[cfg(feature = "std")]
impl<W: Write> IntoStream<'_, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not write the pending code after all data has
    /// been processed, more data may extend it.
    pub fn encode(&mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, false)
    }

    /// Encode data from a reader and write the final pending code.
    pub fn encode_all(mut self, read: impl BufRead) -> AllResult {
        self.encode_part(read, true)
    }

    fn encode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { encoder, writer } = self;
        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let mut text = Vec::new();
        let once = move || {
            let data = read.fill_buf()?;

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    return Ok(Progress::Done);
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            *read_bytes += result.consumed_in;
            read.consume(result.consumed_in);

            // Codes of consumed bytes are written even when the status is an error.
            text.clear();
            format_codes(&mut text, &outbuf[..result.consumed_out])?;
            writer.write_all(&text)?;
            *write_bytes += text.len();

            let done = result.status.map_err(io::Error::from)?;

            match done {
                LzwStatus::Done => Ok(Progress::Done),
                LzwStatus::NoProgress => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "No more data but the encoder could not make progress",
                )),
                LzwStatus::Ok => Ok(Progress::Ok),
            }
        };

        let status = core::iter::repeat_with(once)
            // scan+fuse can be replaced with map_while
            .scan((), |(), result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .fuse()
            .collect();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + Unpin> IntoAsync<'_, W> {
    /// Encode data from an async reader.
    ///
    /// This will drain the supplied reader. It will not write the pending code after all data has
    /// been processed.
    pub async fn encode(&mut self, read: impl futures::io::AsyncBufRead + Unpin) -> AllResult {
        self.encode_part(read, false).await
    }

    /// Encode data from an async reader and write the final pending code.
    pub async fn encode_all(
        mut self,
        read: impl futures::io::AsyncBufRead + Unpin,
    ) -> AllResult {
        self.encode_part(read, true).await
    }

    async fn encode_part(
        &mut self,
        mut read: impl futures::io::AsyncBufRead + Unpin,
        finish: bool,
    ) -> AllResult {
        use futures::io::{AsyncBufReadExt, AsyncWriteExt};

        let IntoAsync { encoder, writer } = self;
        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let mut text = Vec::new();
        let status = loop {
            let data = match read.fill_buf().await {
                Ok(data) => data,
                Err(err) => break Err(err),
            };

            if data.is_empty() {
                if finish {
                    encoder.finish();
                } else {
                    break Ok(());
                }
            }

            let result = encoder.encode_bytes(data, &mut outbuf[..]);
            bytes_read += result.consumed_in;
            read.consume_unpin(result.consumed_in);

            text.clear();
            if let Err(err) = format_codes(&mut text, &outbuf[..result.consumed_out]) {
                break Err(err);
            }
            if let Err(err) = writer.write_all(&text).await {
                break Err(err);
            }
            bytes_written += text.len();

            let done = match result.status {
                Ok(done) => done,
                Err(err) => break Err(err.into()),
            };

            match done {
                LzwStatus::Done => break writer.flush().await,
                LzwStatus::NoProgress => {
                    break Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "No more data but the encoder could not make progress",
                    ))
                }
                LzwStatus::Ok => {}
            }
        };

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

impl<I: Iterator<Item = u8>> Iterator for Codes<'_, I> {
    type Item = Result<Code, LzwError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut code = [0; 1];
        loop {
            let result = match self.bytes.next() {
                Some(byte) => self.encoder.encode_bytes(&[byte], &mut code),
                None => {
                    self.encoder.finish();
                    let result = self.encoder.encode_bytes(&[], &mut code);
                    return match result.status {
                        Err(err) => {
                            self.failed = true;
                            Some(Err(err))
                        }
                        Ok(_) if result.consumed_out == 1 => Some(Ok(code[0])),
                        Ok(_) => None,
                    };
                }
            };

            if let Err(err) = result.status {
                self.failed = true;
                return Some(Err(err));
            }

            if result.consumed_out == 1 {
                return Some(Ok(code[0]));
            }
        }
    }
}

impl EncodeState {
    fn new(config: Configuration) -> Self {
        EncodeState {
            config,
            table: Table::new(&config),
            current: None,
            has_ended: false,
            flushed: false,
        }
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [Code]) -> StreamResult {
        let c_in = inp.len();
        let c_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        if self.flushed {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Ok(LzwStatus::Done),
            };
        }

        while let Some((&byte, rest)) = inp.split_first() {
            if u16::from(byte) >= self.config.alphabet_size() {
                status = Err(LzwError::InvalidByte);
                break;
            }

            let prefix = match self.current {
                // The first byte only seeds the match.
                None => {
                    self.current = Some(Code::from(byte));
                    inp = rest;
                    continue;
                }
                Some(prefix) => prefix,
            };

            if let Some(code) = self.table.find(prefix, byte) {
                self.current = Some(code);
                inp = rest;
                continue;
            }

            if out.is_empty() {
                break;
            }

            let (slot, tail) = core::mem::take(&mut out).split_at_mut(1);
            slot[0] = prefix;
            out = tail;

            self.learn(prefix, byte);
            self.current = Some(Code::from(byte));
            inp = rest;
        }

        if inp.is_empty() && self.has_ended && status.is_ok() {
            match self.current {
                None => self.flushed = true,
                Some(code) if !out.is_empty() => {
                    let (slot, tail) = core::mem::take(&mut out).split_at_mut(1);
                    slot[0] = code;
                    out = tail;
                    self.flushed = true;
                }
                Some(_) => {}
            }

            if self.flushed {
                status = Ok(LzwStatus::Done);
            }
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        if let Ok(LzwStatus::Ok) = status {
            if consumed_in == 0 && consumed_out == 0 {
                status = Ok(LzwStatus::NoProgress);
            }
        }

        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    fn learn(&mut self, prefix: Code, byte: u8) {
        if self.table.insert(prefix, byte).is_some() && self.table.is_full() {
            log::debug!(
                "code table saturated at {} codes, no further pairs are learned",
                self.table.table_size()
            );
        }
    }
}

/// Write codes as decimal text, one per line.
#[cfg(feature = "std")]
fn format_codes(text: &mut Vec<u8>, codes: &[Code]) -> io::Result<()> {
    for code in codes {
        writeln!(text, "{}", code)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::table::Entry;
    use crate::{Code, Configuration, LzwError, LzwStatus};

    fn encode_all(encoder: &mut Encoder, data: &[u8]) -> Vec<Code> {
        encoder.codes(data.iter().copied()).collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn empty_input_has_no_codes() {
        let mut encoder = Encoder::new();
        let mut out = [0; 4];
        encoder.finish();
        let result = encoder.encode_bytes(&[], &mut out);
        assert_eq!(result.consumed_out, 0);
        assert_eq!(result.status, Ok(LzwStatus::Done));
    }

    #[test]
    fn single_byte_is_its_literal() {
        for byte in [0u8, 1, b'A', 255].iter().copied() {
            let mut encoder = Encoder::new();
            assert_eq!(encode_all(&mut encoder, &[byte]), [Code::from(byte)]);
        }
    }

    #[test]
    fn learns_pairs_in_order() {
        let mut encoder = Encoder::new();
        let codes = encode_all(&mut encoder, b"ABAB");
        assert_eq!(codes, [65, 66, 256]);
        assert_eq!(encoder.next_code(), 258);

        // The trailing `A` no longer extends `AB` and is flushed on its own.
        let mut encoder = Encoder::new();
        let codes = encode_all(&mut encoder, b"ABABA");
        assert_eq!(codes, [65, 66, 256, 65]);
        assert_eq!(encoder.next_code(), 259);
    }

    #[test]
    fn pending_code_waits_for_finish() {
        let mut encoder = Encoder::new();
        let mut out = [0; 8];
        let result = encoder.encode_bytes(b"ABAB", &mut out);
        assert_eq!(result.consumed_in, 4);
        assert_eq!(&out[..result.consumed_out], &[65, 66]);
        assert_eq!(result.status, Ok(LzwStatus::Ok));

        let result = encoder.encode_bytes(&[], &mut out);
        assert_eq!(result.status, Ok(LzwStatus::NoProgress));

        encoder.finish();
        let result = encoder.encode_bytes(&[], &mut out);
        assert_eq!(&out[..result.consumed_out], &[256]);
        assert_eq!(result.status, Ok(LzwStatus::Done));

        let result = encoder.encode_bytes(b"more", &mut out);
        assert_eq!(result.consumed_in, 0);
        assert_eq!(result.status, Ok(LzwStatus::Done));
    }

    #[test]
    fn full_output_stops_before_miss() {
        let mut encoder = Encoder::new();
        let mut out = [0; 1];
        let result = encoder.encode_bytes(b"ABC", &mut out);
        // `A` seeds, `B` emits `A`, `C` would emit `B` without room.
        assert_eq!(result.consumed_in, 2);
        assert_eq!(out, [65]);

        let result = encoder.encode_bytes(b"C", &mut out);
        assert_eq!(result.consumed_in, 1);
        assert_eq!(out, [66]);
    }

    #[test]
    fn invalid_input_rejected() {
        let config = Configuration::with_alphabet(4, 4).unwrap();
        let input = [0, 1, 4 /* invalid */, 0];
        let mut target = [0; 16];
        let mut encoder = Encoder::with_config(config);

        encoder.finish();
        let result = encoder.encode_bytes(&input, &mut target);
        assert_eq!(result.status, Err(LzwError::InvalidByte));
        assert_eq!(result.consumed_in, 2);
        assert_eq!(&target[..result.consumed_out], &[0]);
    }

    #[test]
    fn codes_stop_after_error() {
        let config = Configuration::with_alphabet(4, 2).unwrap();
        let mut encoder = Encoder::with_config(config);
        let mut codes = encoder.codes(vec![0, 1, 2, 0]);
        assert_eq!(codes.next(), Some(Ok(0)));
        assert_eq!(codes.next(), Some(Err(LzwError::InvalidByte)));
        assert_eq!(codes.next(), None);
    }

    #[test]
    fn saturation_keeps_matching() {
        // Two literals and room for two learned pairs.
        let config = Configuration::with_alphabet(2, 2).unwrap();
        let mut encoder = Encoder::with_config(config);
        let codes = encode_all(&mut encoder, &[0, 1, 0, 1, 0, 1, 1, 1]);
        // 0|1 -> 2=(0,1), 1|0 -> 3=(1,0), table full.
        // 01 matches 2, 2|0 misses: emit 2. 01 matches 2, 2|1 misses: emit 2.
        // 1|1 misses: emit 1. Flush 1.
        assert_eq!(codes, [0, 1, 2, 2, 1, 1]);
        assert!(encoder.is_saturated());
        assert_eq!(encoder.next_code(), 4);
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_writes_decimal_lines() {
        let mut encoder = Encoder::new();
        let mut text = vec![];
        let result = encoder.into_stream(&mut text).encode_all(&b"ABAB"[..]);
        result.status.unwrap();
        assert_eq!(result.bytes_read, 4);
        assert_eq!(result.bytes_written, text.len());
        assert_eq!(text, b"65\n66\n256\n");
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_writes_codes_before_invalid_byte() {
        let config = Configuration::with_alphabet(4, 4).unwrap();
        let mut encoder = Encoder::with_config(config);
        let mut text = vec![];
        let result = encoder.into_stream(&mut text).encode_all(&[0u8, 1, 2, 9][..]);
        let err = result.status.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
        assert_eq!(result.bytes_read, 3);
        assert_eq!(text, b"0\n1\n");
        assert_eq!(result.bytes_written, text.len());
    }

    #[test]
    fn accessors_follow_the_table() {
        let config = Configuration::new(9).unwrap();
        let mut encoder = Encoder::with_config(config);
        assert_eq!(encoder.config(), config);
        assert_eq!(encoder.table().table_size(), 512);

        let _ = encode_all(&mut encoder, b"ABAB");
        let table = encoder.table();
        assert_eq!(table.next_code(), encoder.next_code());
        assert_eq!(table.entry(256), Some(Entry::Pair { prefix: 65, byte: b'B' }));
        assert_eq!(table.entry(257), Some(Entry::Pair { prefix: 66, byte: b'A' }));
        assert_eq!(table.entries().len(), 258);
        assert_eq!(table.entries()[65], Entry::Literal(65));
    }

    #[cfg(feature = "std")]
    #[test]
    fn stream_without_finish_keeps_pending() {
        let mut encoder = Encoder::new();
        let mut text = vec![];
        encoder.into_stream(&mut text).encode(&b"AB"[..]).status.unwrap();
        assert_eq!(text, b"65\n");
        encoder.into_stream(&mut text).encode_all(&b"C"[..]).status.unwrap();
        assert_eq!(text, b"65\n66\n67\n");
    }
}
