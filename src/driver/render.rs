// Display sizing and hex rendering

use std::fmt::Write;

/// Characters each rendered byte occupies: two hex digits and a space
pub const CHARS_PER_BYTE: usize = 3;

/// Whole characters that fit on one line.
///
/// Both widths are floored before dividing, so a partial character never
/// overflows the line. Missing geometry, a character narrower than one pixel,
/// or a zero result all fall back to `fallback`.
pub fn chars_per_line(viewport_px: Option<f32>, char_px: Option<f32>, fallback: usize) -> usize {
    let viewport = viewport_px.map_or(0, whole_pixels);
    let glyph = char_px.map_or(0, whole_pixels);
    if glyph == 0 {
        return fallback;
    }
    match viewport / glyph {
        0 => fallback,
        chars => chars,
    }
}

/// Bytes needed to fill `lines` lines of `chars_per_line` characters
pub fn byte_count(chars_per_line: usize, lines: usize) -> usize {
    (chars_per_line / CHARS_PER_BYTE).saturating_mul(lines)
}

/// Render each byte as two uppercase hex digits followed by a space
pub fn hex_line(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * CHARS_PER_BYTE);
    for byte in bytes {
        // Writing into a String cannot fail.
        let _ = write!(out, "{:02X} ", byte);
    }
    out
}

fn whole_pixels(px: f32) -> usize {
    if px.is_finite() && px > 0.0 {
        px.floor() as usize
    } else {
        0
    }
}
