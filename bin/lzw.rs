#![forbid(unsafe_code)]
use std::io::Write;
use std::path::PathBuf;
use std::{env, ffi, fs, io, process};

use lzwords::{decode::Decoder, encode::Encoder, Configuration};

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError| explain());
        run_coding(flags)
    })
}

fn run_coding(flags: Flags) -> Result<(), io::Error> {
    let operation = flags.operation.unwrap_or_else(explain);
    let config = Configuration::with_alphabet(flags.code_width, flags.alphabet_size)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    // Both ends are opened before any coding starts.
    let input: Box<dyn io::BufRead> = match flags.input {
        Input::File(file) => {
            let data = fs::File::open(&file).map_err(|err| {
                io::Error::new(err.kind(), format!("Cannot open {}: {}", file.display(), err))
            })?;
            Box::new(io::BufReader::with_capacity(1 << 20, data))
        }
        Input::Stdin => Box::new(io::BufReader::with_capacity(1 << 20, io::stdin())),
    };

    let mut output: Box<dyn io::Write> = match flags.output {
        Some(file) => {
            let data = fs::File::create(&file).map_err(|err| {
                io::Error::new(err.kind(), format!("Cannot create {}: {}", file.display(), err))
            })?;
            Box::new(io::BufWriter::new(data))
        }
        None => Box::new(io::BufWriter::new(io::stdout())),
    };

    match operation {
        Operation::Encode => {
            let mut encoder = Encoder::with_config(config);
            encoder.into_stream(&mut output).encode_all(input).status?;
        }
        Operation::Decode => {
            let mut decoder = Decoder::with_config(config);
            decoder.into_stream(&mut output).decode_all(input).status?;
        }
    }

    output.flush()
}

struct Flags {
    input: Input,
    output: Option<PathBuf>,
    operation: Option<Operation>,
    code_width: u8,
    alphabet_size: u16,
}

struct ParamError;

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

#[derive(Debug)]
enum Operation {
    Encode,
    Decode,
}

fn explain<T>() -> T {
    println!(
        "Usage: lzw [-e|-d] [-w bits] [-a size] [-o output] <file>\n\
        Arguments:\n\
        -e\t operation encode, bytes to decimal codes\n\
        -d\t operation decode, decimal codes to bytes\n\
        -w\t code width in bits (default 12)\n\
        -a\t number of literal codes (default 256)\n\
        -o\t output file, stdout when missing\n\
        <file>\tfilepath or '-' for stdin"
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            output: None,
            operation: None,
            code_width: lzwords::DEFAULT_CODESIZE,
            alphabet_size: lzwords::DEFAULT_ALPHABET,
        }
    }
}

fn command() -> clap::Command<'static> {
    clap::Command::new("lzwords")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress bytes into LZW codes and back")
        .arg(
            clap::Arg::new("decode")
                .short('d')
                .long("decode")
                .takes_value(false),
        )
        .arg(
            clap::Arg::new("encode")
                .short('e')
                .long("encode")
                .takes_value(false),
        )
        .group(
            clap::ArgGroup::new("operation")
                .args(&["decode", "encode"])
                .multiple(false)
                .required(true),
        )
        .arg(
            clap::Arg::new("code_width")
                .short('w')
                .long("code-width")
                .takes_value(true)
                .value_parser(clap::value_parser!(u8).range(1..=16)),
        )
        .arg(
            clap::Arg::new("alphabet_size")
                .short('a')
                .long("alphabet-size")
                .takes_value(true)
                .value_parser(clap::value_parser!(u16).range(1..=256)),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command().get_matches_from(args.by_ref());

        if matches.contains_id("decode") {
            flags.operation = Some(Operation::Decode);
        } else if matches.contains_id("encode") {
            flags.operation = Some(Operation::Encode);
        }

        if let Some(&width) = matches.get_one::<u8>("code_width") {
            flags.code_width = width;
        }

        if let Some(&size) = matches.get_one::<u16>("alphabet_size") {
            flags.alphabet_size = size;
        }

        flags.output = matches.get_one::<PathBuf>("output").cloned();

        match matches.get_one::<PathBuf>("file") {
            None => flags.input = Input::Stdin,
            Some(p) if *p == PathBuf::from("-") => flags.input = Input::Stdin,
            Some(p) => flags.input = Input::File(p.clone()),
        }

        Ok(flags)
    }
}

enum CodingResult {
    Ok,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<(), io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
