#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwords::{encode::Encoder, Code, Configuration};

fuzz_target!(|raw_data: &[u8]| {
    // A 9-bit table saturates quickly, so both learning and saturated matching are covered.
    let config = Configuration::new(9).unwrap();

    let reference = {
        let mut pairs: Vec<(Code, u8)> = vec![];
        let mut codes = vec![];
        let mut prefix = None;
        for &c in raw_data {
            prefix = Some(match prefix {
                None => Code::from(c),
                Some(prefix) => match pairs.iter().position(|&pair| pair == (prefix, c)) {
                    Some(idx) => (256 + idx) as Code,
                    None => {
                        codes.push(prefix);
                        if 256 + pairs.len() < config.table_size() {
                            pairs.push((prefix, c));
                        }
                        Code::from(c)
                    }
                },
            });
        }
        codes.extend(prefix);
        codes
    };

    let mut encoder = Encoder::with_config(config);
    let new = encoder
        .codes(raw_data.iter().copied())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(reference, new);
});
