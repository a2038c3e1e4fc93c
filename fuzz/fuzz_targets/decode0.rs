#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw_data: &[u8]| {
    let codes: Vec<u16> = raw_data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) % 4200)
        .collect();
    let mut decoder = lzwords::decode::Decoder::new();
    decoder.finish();
    let _ = decoder.decode_vec(&codes);
});
