//! Built-in 5x7 bitmap digits, used when no scalable font can be loaded.

use image::{Rgba, RgbaImage};

use super::face::{blend, Extent, Typeface};

const ROWS: usize = 7;
const SPACING: u32 = 1;

/// Glyph rows, most significant of the low `width` bits is the leftmost column.
struct Glyph {
    width: u32,
    rows: [u8; ROWS],
}

const DIGITS: [Glyph; 10] = [
    Glyph { width: 5, rows: [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110] },
    Glyph { width: 5, rows: [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110] },
    Glyph { width: 5, rows: [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111] },
    Glyph { width: 5, rows: [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110] },
    Glyph { width: 5, rows: [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010] },
    Glyph { width: 5, rows: [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110] },
    Glyph { width: 5, rows: [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110] },
    Glyph { width: 5, rows: [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000] },
    Glyph { width: 5, rows: [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110] },
    Glyph { width: 5, rows: [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100] },
];

const COLON: Glyph = Glyph { width: 1, rows: [0, 0, 1, 0, 1, 0, 0] };
const BLANK: Glyph = Glyph { width: 3, rows: [0; ROWS] };

fn glyph_for(c: char) -> &'static Glyph {
    match c {
        '0'..='9' => &DIGITS[c as usize - '0' as usize],
        ':' => &COLON,
        _ => &BLANK,
    }
}

/// Fixed-size face. The requested size is ignored.
pub struct BuiltinFace;

impl Typeface for BuiltinFace {
    fn name(&self) -> &str {
        "builtin-5x7"
    }

    fn is_scalable(&self) -> bool {
        false
    }

    fn measure(&self, text: &str, _size: f32) -> Extent {
        let count = text.chars().count() as u32;
        if count == 0 {
            return Extent::default();
        }
        let width: u32 = text.chars().map(|c| glyph_for(c).width).sum();
        Extent {
            width: width + SPACING * (count - 1),
            height: ROWS as u32,
        }
    }

    fn draw(&self, image: &mut RgbaImage, text: &str, _size: f32, left: i32, top: i32, color: Rgba<u8>) {
        let mut pen = left;
        for c in text.chars() {
            let glyph = glyph_for(c);
            for (row, bits) in glyph.rows.iter().enumerate() {
                for col in 0..glyph.width {
                    if (*bits >> (glyph.width - 1 - col)) & 1 == 1 {
                        blend(image, pen + col as i32, top + row as i32, color, 1.0);
                    }
                }
            }
            pen += (glyph.width + SPACING) as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_ignores_size() {
        let face = BuiltinFace;
        let small = face.measure("12:59", 4.0);
        let large = face.measure("12:59", 400.0);
        assert_eq!(small, large);
        // 4 digits, a colon and 4 gaps
        assert_eq!(small, Extent { width: 4 * 5 + 1 + 4, height: 7 });
    }

    #[test]
    fn test_draw_stays_inside_measured_box() {
        let face = BuiltinFace;
        let extent = face.measure("1:05", 0.0);
        let mut img = RgbaImage::new(extent.width + 4, extent.height + 4);
        face.draw(&mut img, "1:05", 0.0, 2, 2, Rgba([255, 255, 255, 255]));

        let mut painted = 0;
        for (x, y, px) in img.enumerate_pixels() {
            if px[3] > 0 {
                painted += 1;
                assert!(x >= 2 && x < 2 + extent.width, "x={} out of ink box", x);
                assert!(y >= 2 && y < 2 + extent.height, "y={} out of ink box", y);
            }
        }
        assert!(painted > 0);
    }

    #[test]
    fn test_colon_pixels() {
        let face = BuiltinFace;
        let mut img = RgbaImage::new(1, 7);
        face.draw(&mut img, ":", 0.0, 0, 0, Rgba([255, 255, 255, 255]));
        let lit: Vec<u32> = (0..7).filter(|&y| img.get_pixel(0, y)[3] == 255).collect();
        assert_eq!(lit, vec![2, 4]);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(BuiltinFace.measure("", 10.0), Extent::default());
    }
}
