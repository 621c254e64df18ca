use guarded_csprng::driver::render::{byte_count, chars_per_line, hex_line, CHARS_PER_BYTE};
use proptest::collection::vec;
use proptest::prelude::*;

#[test]
fn test_hex_line_examples() {
    assert_eq!(hex_line(&[0x00, 0xFF, 0x0A]), "00 FF 0A ");
    assert_eq!(hex_line(&[0xDE, 0xAD, 0xBE, 0xEF]), "DE AD BE EF ");
}

#[test]
fn test_byte_count_rounds_down() {
    // 20 characters hold 6 whole bytes per line
    assert_eq!(byte_count(20, 4), 24);
    assert_eq!(byte_count(2, 4), 0);
    assert_eq!(byte_count(21, 1), 7);
}

proptest! {
    #[test]
    fn hex_line_keeps_order_and_width(bytes in vec(any::<u8>(), 0..256)) {
        let line = hex_line(&bytes);
        prop_assert_eq!(line.len(), bytes.len() * CHARS_PER_BYTE);

        for (cell, byte) in line.as_bytes().chunks(CHARS_PER_BYTE).zip(&bytes) {
            let digits = std::str::from_utf8(&cell[..2]).unwrap();
            prop_assert_eq!(digits, format!("{:02X}", byte));
            prop_assert_eq!(cell[2], b' ');
        }
    }

    #[test]
    fn chars_per_line_fits_viewport(viewport in 0.0f32..5000.0, glyph in 0.0f32..64.0) {
        let chars = chars_per_line(Some(viewport), Some(glyph), 21);
        prop_assert!(chars > 0);

        let whole_viewport = viewport.floor() as usize;
        let whole_glyph = glyph.floor() as usize;
        if whole_glyph == 0 || whole_viewport < whole_glyph {
            prop_assert_eq!(chars, 21);
        } else {
            prop_assert_eq!(chars, whole_viewport / whole_glyph);
            prop_assert!(chars * whole_glyph <= whole_viewport);
        }
    }
}
