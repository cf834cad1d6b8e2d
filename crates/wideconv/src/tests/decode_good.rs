use alloc::{string::String, vec::Vec};

use rstest::rstest;

use crate::{WideDecoder, convert, convert_cstr};

#[rstest]
#[case::ascii(b"hello", &[0x68, 0x65, 0x6C, 0x6C, 0x6F])]
#[case::nul_byte(b"a\0b", &[0x61, 0x00, 0x62])]
#[case::two_byte_e_acute(&[0xC3, 0xA9], &[0x00E9])]
#[case::two_byte_lowest(&[0xC2, 0x80], &[0x0080])]
#[case::two_byte_highest(&[0xDF, 0xBF], &[0x07FF])]
#[case::three_byte_euro(&[0xE2, 0x82, 0xAC], &[0x20AC])]
#[case::three_byte_highest(&[0xEF, 0xBF, 0xBF], &[0xFFFF])]
#[case::mixed(&[b'C', b':', b'\\', 0xE6, 0x97, 0xA5, b'.', b'm', b'p', b'3'], &[0x43, 0x3A, 0x5C, 0x65E5, 0x2E, 0x6D, 0x70, 0x33])]
fn decodes_valid_input(#[case] input: &[u8], #[case] expected: &[u16]) {
    let wide = convert(input);
    assert_eq!(wide.as_slice(), expected);
    assert_eq!(wide.len(), expected.len());
    assert_eq!(wide.as_slice_with_nul().last(), Some(&0));
}

#[test]
fn bmp_text_matches_std_utf16() {
    let text = "Ünïcödé pâth / 日本語 / Ελληνικά / ﬁ";
    let expected: Vec<u16> = text.encode_utf16().collect();
    assert_eq!(convert(text.as_bytes()).as_slice(), expected.as_slice());
}

#[test]
fn round_trips_through_lossy_string() {
    let text = "C:\\Songs\\Sabaton - Каролинский марш\\audio.mp3";
    assert_eq!(convert(text.as_bytes()).to_string_lossy(), String::from(text));
}

/// Four-byte sequences keep only the low 16 bits of the code point.
#[rstest]
#[case::grinning_face("😀", 0xF600)] // U+1F600
#[case::g_clef("𝄞", 0xD11E)] // U+1D11E
#[case::highest_scalar("\u{10FFFF}", 0xFFFF)]
fn truncates_supplementary_code_points(#[case] text: &str, #[case] unit: u16) {
    assert_eq!(convert(text.as_bytes()).as_slice(), &[unit]);
}

#[test]
fn ascii_fast_path_matches_byte_steps() {
    let input = b"abc\xC3\xA9def\xE2\x82\xACghi";
    let mut stepped = Vec::new();
    let mut decoder = WideDecoder::default();
    for &byte in input {
        decoder.step(byte).push_to(&mut stepped);
    }
    decoder.finish().push_to(&mut stepped);
    assert_eq!(convert(input).as_slice(), stepped.as_slice());
}

#[test]
fn cstr_and_slice_agree() {
    let c = c"na\xC3\xAFve";
    assert_eq!(convert_cstr(c), convert(c.to_bytes()));
}
