//! Properties of the code sequence, checked against a plain table scan.

use lzwords::{compress, decode::Decoder, encode::Encoder, Code, Configuration};
use proptest::prelude::*;

/// The compressor written out with a linear search over all learned pairs.
fn reference(data: &[u8], config: Configuration) -> Vec<Code> {
    let alphabet = usize::from(config.alphabet_size());
    let mut pairs: Vec<(Code, u8)> = vec![];
    let mut codes = vec![];

    let (&first, rest) = match data.split_first() {
        None => return codes,
        Some(split) => split,
    };

    let mut prefix = Code::from(first);
    for &c in rest {
        match pairs.iter().position(|&pair| pair == (prefix, c)) {
            Some(idx) => prefix = (alphabet + idx) as Code,
            None => {
                codes.push(prefix);
                if alphabet + pairs.len() < config.table_size() {
                    pairs.push((prefix, c));
                }
                prefix = Code::from(c);
            }
        }
    }

    codes.push(prefix);
    codes
}

fn encode_with(data: &[u8], config: Configuration) -> (Vec<Code>, Encoder) {
    let mut encoder = Encoder::with_config(config);
    let codes = encoder
        .codes(data.iter().copied())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    (codes, encoder)
}

/// Byte strings over a small alphabet so that pairs repeat often.
fn repetitive() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..2000)
}

#[test]
fn empty_input_law() {
    assert_eq!(compress(&[]), Vec::<Code>::new());
}

#[test]
fn single_byte_law() {
    for byte in 0..=255u8 {
        assert_eq!(compress(&[byte]), [Code::from(byte)]);
    }
}

#[test]
fn learning_law() {
    let (a, b) = (Code::from(b'A'), Code::from(b'B'));
    let (codes, encoder) = encode_with(b"ABAB", Configuration::default());
    assert_eq!(codes, [a, b, 256]);
    assert_eq!(encoder.next_code(), 258);
}

#[test]
fn no_repeats_law() {
    let data: Vec<u8> = (0..=255u8).collect();
    let codes = compress(&data);
    assert_eq!(codes.len(), data.len());
    assert!(codes.iter().all(|&code| code < 256));
}

#[test]
fn saturation_law() {
    let config = Configuration::new(9).unwrap();
    let mut encoder = Encoder::with_config(config);
    let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 13 + i / 97) as u8).collect();

    let mut saturated_at = None;
    let mut out = [0; 1];
    for (idx, &byte) in data.iter().enumerate() {
        let before = encoder.next_code();
        let result = encoder.encode_bytes(&[byte], &mut out);
        assert_eq!(result.consumed_in, 1);
        if saturated_at.is_some() {
            assert_eq!(encoder.next_code(), before);
            assert!(encoder.is_saturated());
        } else if encoder.is_saturated() {
            saturated_at = Some(idx);
        }
        assert!(encoder.next_code() <= 512);
    }

    assert!(saturated_at.is_some());
    assert_eq!(encoder.next_code(), 512);
}

proptest! {
    #[test]
    fn prop_matches_linear_scan(data in prop::collection::vec(any::<u8>(), 0..3000), width in 8u8..=10) {
        let config = Configuration::new(width).unwrap();
        let (codes, _) = encode_with(&data, config);
        prop_assert_eq!(codes, reference(&data, config));
    }

    #[test]
    fn prop_small_alphabet_matches_linear_scan(data in repetitive(), width in 2u8..=9) {
        let config = Configuration::with_alphabet(width, 4).unwrap();
        let (codes, encoder) = encode_with(&data, config);
        prop_assert!(encoder.next_code() <= config.table_size());
        prop_assert!(codes.iter().all(|&code| usize::from(code) < config.table_size()));
        prop_assert_eq!(codes, reference(&data, config));
    }

    #[test]
    fn prop_deterministic(data in repetitive()) {
        prop_assert_eq!(compress(&data), compress(&data));
    }

    #[test]
    fn prop_at_most_one_code_per_byte(data in prop::collection::vec(any::<u8>(), 1..3000)) {
        let codes = compress(&data);
        prop_assert!(!codes.is_empty());
        prop_assert!(codes.len() <= data.len());
    }

    #[test]
    fn prop_roundtrip(data in repetitive(), width in 2u8..=12) {
        let config = Configuration::with_alphabet(width, 4).unwrap();
        let (codes, _) = encode_with(&data, config);

        let mut decoder = Decoder::with_config(config);
        decoder.finish();
        prop_assert_eq!(decoder.decode_vec(&codes).unwrap(), data);
    }
}
