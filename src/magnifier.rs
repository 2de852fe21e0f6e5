use image::{Rgb, RgbImage};

/// Pixels taken on each side of the sample point.
pub const CROP_RADIUS: u32 = 10;
/// Nearest-neighbor scale factor.
pub const ZOOM: u32 = 3;
/// Side length of the magnified patch: a (2r+1) crop scaled by [`ZOOM`].
pub const SIZE: u32 = (CROP_RADIUS * 2 + 1) * ZOOM;

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Magnified view around `(cx, cy)`: a 21x21 crop centered on the sample
/// point, upscaled x3 without interpolation so pixel edges stay hard, with
/// a 1-px crosshair through the center. Crop cells outside the image are
/// black. The output is always [`SIZE`]x[`SIZE`].
pub fn magnify(display: &RgbImage, cx: u32, cy: u32) -> RgbImage {
    let center = SIZE / 2;
    RgbImage::from_fn(SIZE, SIZE, |ox, oy| {
        if ox == center || oy == center {
            return BLACK;
        }
        let sx = cx as i64 - CROP_RADIUS as i64 + (ox / ZOOM) as i64;
        let sy = cy as i64 - CROP_RADIUS as i64 + (oy / ZOOM) as i64;
        if sx < 0 || sy < 0 || sx >= display.width() as i64 || sy >= display.height() as i64 {
            BLACK
        } else {
            *display.get_pixel(sx as u32, sy as u32)
        }
    })
}
