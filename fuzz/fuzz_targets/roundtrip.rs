#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwords::{decode, encode, Configuration};

fuzz_target!(|data: &[u8]| {
    // The first byte picks the code width, the rest is the payload.
    let (width, data) = match data.split_first() {
        Some((&width, data)) => (8 + width % 9, data),
        None => return,
    };
    let config = Configuration::new(width).unwrap();

    let mut encoder = encode::Encoder::with_config(config);
    let mut buffer = Vec::with_capacity(4 * data.len() + 8);
    let result = encoder.into_stream(&mut buffer).encode_all(data);
    assert!(result.status.is_ok(), "{:?}", result.status);

    let mut decoder = decode::Decoder::with_config(config);
    let mut compare = vec![];
    let result = decoder.into_stream(&mut compare).decode_all(buffer.as_slice());
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(data, compare.as_slice());
});
