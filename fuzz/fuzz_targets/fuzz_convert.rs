#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng; // faster than StdRng
use rand::{Rng, RngCore, SeedableRng};
use wideconv::{DecoderOptions, MalformedKind, REPLACEMENT, WideDecoder, convert_reporting};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    // One SmallRng per thread, seeded once from the host OS
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Byte patterns that steer the decoder into its interesting states.
static EDGE_TABLE: &[&[u8]] = &[
    b"\x80",             // orphan continuation
    b"\xBF",             // orphan continuation
    b"\xC3",             // 2-byte lead
    b"\xE2\x82",         // truncated 3-byte
    b"\xF0\x9F\x98",     // truncated 4-byte
    b"\xF0\x9F\x98\x80", // supplementary code point
    b"\xF8",             // invalid lead
    b"\xFF",             // invalid lead
    b"\xC3\xA9",         // U+00E9
    b"\xE2\x82\xAC",     // U+20AC
];

/// Helper: borrow the thread-local RNG and run a closure with it.
fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x03);

        // split-seed
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;

        while prefix < size.max(HEADER + 1) && prefix < max_size {
            let limit = max_size - prefix;

            prefix += append_edge(&mut data[prefix..], limit);
            prefix += append_text(&mut data[prefix..], size, limit);
        }

        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Append one edge-case byte pattern to `buf` if it fits in `limit`.
fn append_edge(buf: &mut [u8], limit: usize) -> usize {
    let edge = with_rng(|rng| EDGE_TABLE[rng.random_range(0..EDGE_TABLE.len())]);
    if edge.len() > limit {
        return 0;
    }
    buf[..edge.len()].copy_from_slice(edge);
    edge.len()
}

/// Append a run of valid UTF-8 text, truncated to `limit` bytes.
fn append_text(buf: &mut [u8], size: usize, limit: usize) -> usize {
    let text = loop {
        let s = with_rng(|rng| rng.random_range(1..size.max(2) * 2).min(limit.max(1)));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(text) = String::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break text;
        }
    };

    let len = text.len().min(limit);
    buf[..len].copy_from_slice(&text.as_bytes()[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fn convert(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as usize;
    let data = &data[HEADER..];

    let options = DecoderOptions {
        flag_abandoned_sequences: flags & 1 != 0,
        replacement: if flags & 2 != 0 { u16::from(b'?') } else { REPLACEMENT },
    };

    let conversion = convert_reporting(data, options);
    let wide = &conversion.wide;

    assert!(wide.len() <= data.len(), "output longer than input");
    assert_eq!(wide.as_slice_with_nul().last(), Some(&0));
    assert_eq!(wide.as_slice_with_nul().len(), wide.len() + 1);
    for pair in conversion.malformations.windows(2) {
        assert!(pair[0].offset <= pair[1].offset, "reports out of order");
    }
    if let Some(last) = conversion.malformations.last() {
        assert!(last.offset <= data.len());
        if last.kind == MalformedKind::TruncatedAtEnd {
            assert_eq!(last.offset, data.len());
        }
    }
    if !options.flag_abandoned_sequences {
        assert!(
            conversion
                .malformations
                .iter()
                .all(|m| m.kind != MalformedKind::Abandoned)
        );
    }

    // Chunked decoding must agree with the one-shot conversion.
    let mut decoder = WideDecoder::new(options);
    let mut out = Vec::with_capacity(data.len());
    let mut rest = data;
    while !rest.is_empty() {
        let size = split_seed % rest.len() + 1;
        let (chunk, tail) = rest.split_at(size);
        decoder.decode_into(chunk, &mut out);
        rest = tail;
    }
    decoder.finish().push_to(&mut out);
    assert_eq!(out.as_slice(), wide.as_slice());
}

fuzz_target!(|data: &[u8]| convert(data));
