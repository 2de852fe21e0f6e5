use anyhow::{anyhow, bail, Result};
use palette::{FromColor, IntoColor, Lab, Srgb};

/// sRGB color value as it appears in image pixels. Everything the picker
/// hands around (samples, swatches, the selection) is one of these; hex and
/// CIELAB are derived views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` in any case, with or without the `#`, ignoring
    /// surrounding whitespace.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 {
            bail!("invalid hex color {hex:?}: expected 6 hex digits");
        }
        let packed = u32::from_str_radix(digits, 16)
            .map_err(|_| anyhow!("invalid hex color {hex:?}: non-hex digit"))?;
        Ok(Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        })
    }

    /// Lowercase `#rrggbb` form, the only serialization the picker emits.
    pub fn to_hex(self) -> String {
        self.to_string()
    }

    /// CIELAB view, the space the palette clustering runs in.
    pub fn to_lab(self) -> Lab {
        let rgb: Srgb<f32> = Srgb::new(self.r, self.g, self.b).into_format();
        rgb.into_color()
    }

    /// Back from CIELAB. Out-of-gamut results are clamped into sRGB.
    pub fn from_lab(lab: Lab) -> Self {
        let rgb = Srgb::from_color(lab);
        Self {
            r: quantize(rgb.red),
            g: quantize(rgb.green),
            b: quantize(rgb.blue),
        }
    }

    /// WCAG 2.0 relative luminance, for choosing readable label text on top
    /// of a swatch.
    pub fn relative_luminance(self) -> f32 {
        let [r, g, b] = [self.r, self.g, self.b].map(linearize);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// Squared RGB distance. Cheap metric for "closest actual pixel"
    /// lookups; no perceptual claims.
    pub fn distance_sq(self, other: Color) -> u32 {
        let d = |a: u8, b: u8| {
            let d = i32::from(a) - i32::from(b);
            (d * d) as u32
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

fn quantize(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn linearize(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<image::Rgb<u8>> for Color {
    fn from(p: image::Rgb<u8>) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_in_any_accepted_shape() {
        for input in ["#ff8800", "ff8800", "#FF8800", "  #Ff8800\n"] {
            let color = Color::from_hex(input).unwrap();
            assert_eq!(color, Color::new(255, 136, 0), "input {input:?}");
        }
    }

    #[test]
    fn formats_lowercase_with_hash() {
        assert_eq!(Color::new(255, 136, 0).to_hex(), "#ff8800");
        assert_eq!(Color::new(0, 0, 0).to_hex(), "#000000");
        assert_eq!(Color::new(10, 11, 12).to_hex(), "#0a0b0c");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Color::from_hex("fff").is_err());
        assert!(Color::from_hex("#ff88001").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert!(Color::from_hex("#gghhii").is_err());
        assert!(Color::from_hex("#12 456").is_err());
    }

    #[test]
    fn lab_round_trip_stays_within_one_step() {
        let samples = [
            Color::new(0, 0, 0),
            Color::new(255, 255, 255),
            Color::new(210, 96, 48),
            Color::new(1, 254, 128),
            Color::new(40, 40, 41),
        ];
        for original in samples {
            let recovered = Color::from_lab(original.to_lab());
            for (a, b) in [
                (original.r, recovered.r),
                (original.g, recovered.g),
                (original.b, recovered.b),
            ] {
                assert!(
                    (i16::from(a) - i16::from(b)).unsigned_abs() <= 1,
                    "{original:?} came back as {recovered:?}"
                );
            }
        }
    }

    #[test]
    fn luminance_spans_black_to_white() {
        assert!(Color::new(0, 0, 0).relative_luminance() < 0.001);
        assert!((Color::new(255, 255, 255).relative_luminance() - 1.0).abs() < 0.001);
        let mid = Color::new(128, 128, 128).relative_luminance();
        assert!(mid > 0.1 && mid < 0.5, "mid gray luminance {mid}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Color::new(240, 32, 16);
        let b = Color::new(16, 32, 240);
        assert_eq!(a.distance_sq(a), 0);
        assert_eq!(a.distance_sq(b), b.distance_sq(a));
        assert_eq!(Color::new(0, 0, 0).distance_sq(Color::new(1, 1, 1)), 3);
    }

    #[test]
    fn display_renders_hex_form() {
        let color = Color::new(18, 52, 86);
        assert_eq!(format!("{color}"), "#123456");
        assert_eq!(color.to_hex(), format!("{color}"));
    }

    #[test]
    fn converts_from_image_pixel() {
        assert_eq!(Color::from(image::Rgb([1u8, 2, 3])), Color::new(1, 2, 3));
    }
}
