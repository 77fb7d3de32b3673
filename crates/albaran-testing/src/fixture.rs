//! Binary fixtures.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

/// A small PNG (`width` x `height`, dark strokes on white) for signature tests.
pub fn signature_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        if x == y || x + 1 == y {
            Rgb([20, 20, 20])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .expect("encode fixture png");
    out.into_inner()
}
