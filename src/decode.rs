//! A module for all decoding needs.
use crate::error::LzwError;
use crate::{Code, Configuration, LzwStatus, StreamResult};

#[cfg(feature = "std")]
use crate::AllResult;
#[cfg(feature = "std")]
use std::io::{self, BufRead, Write};

/// The number of codes parsed from text before they are decoded.
#[cfg(feature = "std")]
const CODE_CHUNK: usize = 1 << 12;
#[cfg(feature = "std")]
const STREAM_BUF_SIZE: usize = 1 << 16;

/// The state for decoding a sequence of LZW codes back into bytes.
///
/// The decoder learns the same pairs as the encoder did, one for every code after the first,
/// until its table is full.
pub struct Decoder {
    state: Box<DecodeState>,
}

/// A decoding stream sink.
///
/// Reads codes as decimal numbers, one per line. See [`Decoder::into_stream`] on how to create
/// this type.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
#[cfg(feature = "std")]
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

#[derive(Clone, Copy)]
struct Link {
    prefix: Code,
    byte: u8,
}

struct DecodeState {
    /// The configured sizes of the table.
    config: Configuration,

    /// The table of decoded codes.
    table: Table,

    /// The expansion of the last code that was not yet written.
    buffer: Buffer,

    /// The previously decoded code.
    last: Option<Code>,

    /// If the input was marked as complete.
    has_ended: bool,
}

struct Buffer {
    bytes: Vec<u8>,
    read_mark: usize,
}

struct Table {
    inner: Vec<Link>,
    depths: Vec<u32>,
    table_size: usize,
}

impl Decoder {
    /// Create a new decoder with a 12-bit table over all byte values.
    pub fn new() -> Self {
        Self::with_config(Configuration::default())
    }

    /// Create a new decoder with the specified table sizes.
    ///
    /// This must match the configuration of the encoder that produced the codes.
    pub fn with_config(config: Configuration) -> Self {
        Decoder {
            state: Box::new(DecodeState::new(config)),
        }
    }

    /// The configuration this decoder was created with.
    pub fn config(&self) -> Configuration {
        self.state.config
    }

    /// The code that will be assigned to the next learned pair.
    pub fn next_code(&self) -> usize {
        self.state.table.inner.len()
    }

    /// Decode some codes from `inp` into bytes in `out`.
    ///
    /// Bytes of a code that do not fit into `out` are kept and written by the next call.
    pub fn decode_codes(&mut self, inp: &[Code], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Decode all of `inp` into a vector.
    pub fn decode_vec(&mut self, mut inp: &[Code]) -> Result<Vec<u8>, LzwError> {
        let mut decoded = Vec::with_capacity(inp.len());
        let mut outbuf = [0; 1 << 10];
        loop {
            let result = self.decode_codes(inp, &mut outbuf);
            inp = &inp[result.consumed_in..];
            decoded.extend_from_slice(&outbuf[..result.consumed_out]);
            match result.status? {
                LzwStatus::Ok => {}
                LzwStatus::NoProgress | LzwStatus::Done => break,
            }
        }
        Ok(decoded)
    }

    /// Construct a decoder into a writer.
    #[cfg(feature = "std")]
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Mark the code sequence as complete.
    ///
    /// Once all codes are consumed and their bytes written the decoder reports `Done`.
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

#[cfg(feature = "std")]
impl<W: Write> IntoStream<'_, W> {
    /// Decode codes from a reader.
    ///
    /// Blank lines are skipped; any other line must hold exactly one decimal code.
    pub fn decode(&mut self, read: impl BufRead) -> AllResult {
        self.decode_part(read, false)
    }

    /// Decode codes from a reader and mark the sequence as complete.
    pub fn decode_all(mut self, read: impl BufRead) -> AllResult {
        self.decode_part(read, true)
    }

    fn decode_part(&mut self, mut read: impl BufRead, finish: bool) -> AllResult {
        let IntoStream { decoder, writer } = self;
        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut line = String::new();
        let mut codes = Vec::with_capacity(CODE_CHUNK);
        let mut outbuf = vec![0; STREAM_BUF_SIZE];
        let once = move || -> io::Result<Progress> {
            codes.clear();
            while codes.len() < CODE_CHUNK {
                line.clear();
                let len = read.read_line(&mut line)?;
                if len == 0 {
                    break;
                }

                *read_bytes += len;
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }

                let code = text.parse::<Code>().map_err(|err| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid code {:?}: {}", text, err),
                    )
                })?;
                codes.push(code);
            }

            let exhausted = codes.len() < CODE_CHUNK;
            if exhausted && finish {
                decoder.finish();
            }

            let mut inp = &codes[..];
            loop {
                let result = decoder.decode_codes(inp, &mut outbuf[..]);
                inp = &inp[result.consumed_in..];
                writer.write_all(&outbuf[..result.consumed_out])?;
                *write_bytes += result.consumed_out;

                match result.status.map_err(io::Error::from)? {
                    LzwStatus::Ok => {}
                    LzwStatus::NoProgress => break,
                    LzwStatus::Done => return Ok(Progress::Done),
                }
            }

            if exhausted {
                Ok(Progress::Done)
            } else {
                Ok(Progress::Ok)
            }
        };

        let status = core::iter::repeat_with(once)
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

impl DecodeState {
    fn new(config: Configuration) -> Self {
        DecodeState {
            config,
            table: Table::new(&config),
            buffer: Buffer::new(),
            last: None,
            has_ended: false,
        }
    }

    fn advance(&mut self, mut inp: &[Code], mut out: &mut [u8]) -> StreamResult {
        let o_in = inp.len();
        let o_out = out.len();
        let mut status = Ok(LzwStatus::Ok);

        loop {
            let remain = self.buffer.buffer();
            let count = remain.len().min(out.len());
            let (into, tail) = core::mem::take(&mut out).split_at_mut(count);
            into.copy_from_slice(&remain[..count]);
            self.buffer.consume(count);
            out = tail;

            if !self.buffer.buffer().is_empty() {
                break;
            }

            let (&code, rest) = match inp.split_first() {
                Some(split) => split,
                None => break,
            };

            match self.last {
                // The first code has nothing to extend and teaches nothing.
                None => {
                    if code >= self.config.alphabet_size() {
                        log::trace!("first code {} is not a literal", code);
                        status = Err(LzwError::InvalidCode);
                        break;
                    }
                    self.buffer.reconstruct(&self.table, code);
                }
                Some(prev) => {
                    let next = self.table.inner.len();
                    if usize::from(code) < next {
                        self.buffer.reconstruct(&self.table, code);
                    } else if usize::from(code) == next && !self.table.is_full() {
                        // The code is the one being learned now: the previous string and its own
                        // first byte.
                        self.buffer.reconstruct(&self.table, prev);
                        self.buffer.repeat_first();
                    } else {
                        log::trace!("code {} is beyond the next code {}", code, next);
                        status = Err(LzwError::InvalidCode);
                        break;
                    }

                    if !self.table.is_full() {
                        self.table.derive(prev, self.buffer.first());
                    }
                }
            }

            self.last = Some(code);
            inp = rest;
        }

        if inp.is_empty() && self.has_ended && self.buffer.buffer().is_empty() && status.is_ok() {
            status = Ok(LzwStatus::Done);
        }

        let consumed_in = o_in - inp.len();
        let consumed_out = o_out - out.len();
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
}

impl Buffer {
    fn new() -> Self {
        Buffer {
            bytes: Vec::new(),
            read_mark: 0,
        }
    }

    /// Replace the buffer with the expansion of `code`.
    fn reconstruct(&mut self, table: &Table, code: Code) {
        let depth = table.depths[usize::from(code)] as usize;
        self.bytes.clear();
        self.bytes.resize(depth, 0);
        self.read_mark = 0;

        let mut code_iter = code;
        for ch in self.bytes.iter_mut().rev() {
            let link = table.inner[usize::from(code_iter)];
            *ch = link.byte;
            code_iter = link.prefix;
        }
    }

    fn repeat_first(&mut self) {
        let first = self.first();
        self.bytes.push(first);
    }

    fn first(&self) -> u8 {
        self.bytes[0]
    }

    fn buffer(&self) -> &[u8] {
        &self.bytes[self.read_mark..]
    }

    fn consume(&mut self, amt: usize) {
        self.read_mark += amt;
    }
}

impl Table {
    fn new(config: &Configuration) -> Self {
        let table_size = config.table_size();
        let mut inner = Vec::with_capacity(table_size);
        let mut depths = Vec::with_capacity(table_size);
        for ch in 0..config.alphabet_size() {
            inner.push(Link::base(ch as u8));
            depths.push(1);
        }

        Table {
            inner,
            depths,
            table_size,
        }
    }

    fn is_full(&self) -> bool {
        self.inner.len() >= self.table_size
    }

    fn derive(&mut self, prev: Code, byte: u8) {
        let depth = self.depths[usize::from(prev)] + 1;
        self.inner.push(Link { prefix: prev, byte });
        self.depths.push(depth);
    }
}

impl Link {
    fn base(byte: u8) -> Self {
        Link { prefix: 0, byte }
    }
}
