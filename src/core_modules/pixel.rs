// THEORY:
// The `pixel` module is the most fundamental unit of the detector. It is a
// "dumb" data container for a single RGB sample plus the single-pixel metrics
// every higher layer consumes — the classifier reads HSV/HSL/Lab/LCH and WCAG
// luminance, the color-space table reads channel spread and means, and the
// frame pipeline reads the per-space encodings derived from these.
//
// Key architectural principles:
// 1.  **Single-sample scope**: Nothing in here looks at neighbors, history, or
//     thresholds. Anything that needs a second pixel or shared state belongs
//     in the classifier, sampler, or pipeline modules.
// 2.  **Gamma awareness**: WCAG relative luminance and Lab require linear
//     light. The sRGB → linear conversion goes through a 256-entry `OnceLock`
//     LUT so the hot path is a table lookup, never a `powf` per pixel.
// 3.  **Validated construction**: Samples arriving from outside the crate are
//     arbitrary integers; `from_values` is the single total validator that
//     turns them into a `ColorSample` or an `InvalidSample` error.

pub mod pixel {
    use crate::error::{Error, Result};
    use std::sync::OnceLock;

    pub type Channel = u8;
    pub type Hue = f32;
    pub type Saturation = f32;
    pub type Value = f32;
    pub type Lightness = f32;
    pub type Luminance = f64;
    pub type Chromaticness = f32;

    // sRGB byte -> linear-light normalized value.
    static SRGB_TO_LINEAR_LUT: OnceLock<[f64; 256]> = OnceLock::new();

    fn srgb_to_linear(channel: Channel) -> f64 {
        let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
            let mut table = [0.0f64; 256];
            let mut i = 0usize;
            while i < 256 {
                let srgb = i as f64 / 255.0;
                table[i] = if srgb <= 0.04045 {
                    srgb / 12.92
                } else {
                    ((srgb + 0.055) / 1.055).powf(2.4)
                };
                i += 1;
            }
            table
        });
        table[channel as usize]
    }

    /// An immutable RGB sample, one byte per channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColorSample {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl ColorSample {
        pub const BLACK: ColorSample = ColorSample::new(0, 0, 0);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        /// Validates an arbitrary integer slice into a sample. This is the
        /// boundary where untrusted classification input enters the crate:
        /// wrong arity or any channel outside [0, 255] is rejected.
        pub fn from_values(values: &[i64]) -> Result<Self> {
            if values.len() != 3 || values.iter().any(|v| !(0..=255).contains(v)) {
                return Err(Error::InvalidSample(values.to_vec()));
            }
            Ok(Self::new(values[0] as u8, values[1] as u8, values[2] as u8))
        }

        pub fn channels(&self) -> [Channel; 3] {
            [self.red, self.green, self.blue]
        }

        pub fn max_channel(&self) -> Channel {
            self.red.max(self.green).max(self.blue)
        }

        pub fn min_channel(&self) -> Channel {
            self.red.min(self.green).min(self.blue)
        }

        /// Mean brightness across the three channels (0.0-255.0).
        pub fn mean(&self) -> f32 {
            (self.red as f32 + self.green as f32 + self.blue as f32) / 3.0
        }

        /// Largest absolute deviation of any channel from the mean. Zero for
        /// perfect grays; the achromatic test compares this against a
        /// brightness-adaptive threshold.
        pub fn channel_deviation(&self) -> f32 {
            let mean = self.mean();
            (self.red as f32 - mean)
                .abs()
                .max((self.green as f32 - mean).abs())
                .max((self.blue as f32 - mean).abs())
        }

        /// Spread between the strongest and weakest channel (0-255).
        pub fn channel_spread(&self) -> u8 {
            self.max_channel() - self.min_channel()
        }

        /// "Chromaticness" = (max - min) / max, or 0 when max is 0. A cheap
        /// proxy for how far the sample sits from the gray axis.
        pub fn chromaticness(&self) -> Chromaticness {
            let max = self.max_channel() as f32;
            if max == 0.0 {
                return 0.0;
            }
            (max - self.min_channel() as f32) / max
        }

        /// Hue angle in degrees [0, 360).
        pub fn hue(&self) -> Hue {
            let r = self.red as f32 / 255.0;
            let g = self.green as f32 / 255.0;
            let b = self.blue as f32 / 255.0;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            let chroma = max - min;

            if chroma <= 1e-6 {
                return 0.0;
            }

            let (base, sector) = if max == r {
                (g - b, 0.0)
            } else if max == g {
                (b - r, 2.0)
            } else {
                (r - g, 4.0)
            };

            let mut degrees = (base / chroma + sector) * 60.0;
            if degrees < 0.0 {
                degrees += 360.0;
            }
            degrees
        }

        /// HSV triple: hue in degrees, saturation and value in [0, 1].
        pub fn hsv(&self) -> (Hue, Saturation, Value) {
            let max = self.max_channel() as f32 / 255.0;
            let saturation = if max <= 1e-6 {
                0.0
            } else {
                (max - self.min_channel() as f32 / 255.0) / max
            };
            (self.hue(), saturation, max)
        }

        /// HSL triple: hue in degrees, saturation and lightness in [0, 1].
        pub fn hsl(&self) -> (Hue, Saturation, Lightness) {
            let max = self.max_channel() as f32 / 255.0;
            let min = self.min_channel() as f32 / 255.0;
            let lightness = (max + min) * 0.5;
            let denominator = 1.0 - (2.0 * lightness - 1.0).abs();
            let saturation = if denominator <= 1e-6 {
                0.0
            } else {
                (max - min) / denominator
            };
            (self.hue(), saturation, lightness)
        }

        /// WCAG relative luminance in [0, 1], computed in linear light.
        pub fn relative_luminance(&self) -> Luminance {
            0.2126 * srgb_to_linear(self.red)
                + 0.7152 * srgb_to_linear(self.green)
                + 0.0722 * srgb_to_linear(self.blue)
        }

        /// CIE XYZ (D65), each component normalized so white is (0.9505, 1.0,
        /// 1.089). Computed from linear RGB.
        pub fn xyz(&self) -> (f64, f64, f64) {
            let r = srgb_to_linear(self.red);
            let g = srgb_to_linear(self.green);
            let b = srgb_to_linear(self.blue);
            (
                0.4124564 * r + 0.3575761 * g + 0.1804375 * b,
                0.2126729 * r + 0.7151522 * g + 0.0721750 * b,
                0.0193339 * r + 0.1191920 * g + 0.9503041 * b,
            )
        }

        /// CIE L*a*b* (D65): L in [0, 100], a and b roughly [-128, 127].
        pub fn lab(&self) -> (f64, f64, f64) {
            const XN: f64 = 0.95047;
            const YN: f64 = 1.0;
            const ZN: f64 = 1.08883;

            fn f(t: f64) -> f64 {
                if t > 0.008856 {
                    t.cbrt()
                } else {
                    7.787 * t + 16.0 / 116.0
                }
            }

            let (x, y, z) = self.xyz();
            let fx = f(x / XN);
            let fy = f(y / YN);
            let fz = f(z / ZN);
            (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
        }

        /// LCH (cylindrical Lab): lightness, chroma, hue angle in degrees.
        pub fn lch(&self) -> (f64, f64, f64) {
            let (l, a, b) = self.lab();
            let chroma = (a * a + b * b).sqrt();
            let mut hue = b.atan2(a).to_degrees();
            if hue < 0.0 {
                hue += 360.0;
            }
            (l, chroma, hue)
        }
    }

    impl From<[u8; 3]> for ColorSample {
        fn from(channels: [u8; 3]) -> Self {
            Self::new(channels[0], channels[1], channels[2])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn from_values_accepts_valid_triples() {
        let sample = ColorSample::from_values(&[255, 128, 0]).unwrap();
        assert_eq!(sample, ColorSample::new(255, 128, 0));
    }

    #[test]
    fn from_values_rejects_out_of_range_and_wrong_arity() {
        assert!(ColorSample::from_values(&[256, 0, 0]).is_err());
        assert!(ColorSample::from_values(&[-1, 0, 0]).is_err());
        assert!(ColorSample::from_values(&[10, 10]).is_err());
        assert!(ColorSample::from_values(&[10, 10, 10, 10]).is_err());
    }

    #[test]
    fn hue_of_primaries() {
        assert_eq!(ColorSample::new(255, 0, 0).hue(), 0.0);
        assert_eq!(ColorSample::new(0, 255, 0).hue(), 120.0);
        assert_eq!(ColorSample::new(0, 0, 255).hue(), 240.0);
    }

    #[test]
    fn luminance_extremes() {
        assert_eq!(ColorSample::BLACK.relative_luminance(), 0.0);
        let white = ColorSample::new(255, 255, 255).relative_luminance();
        assert!((white - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gray_samples_have_no_chroma() {
        let gray = ColorSample::new(120, 120, 120);
        assert_eq!(gray.chromaticness(), 0.0);
        assert_eq!(gray.channel_deviation(), 0.0);
        let (_, saturation, _) = gray.hsv();
        assert_eq!(saturation, 0.0);
        let (_, chroma, _) = gray.lch();
        assert!(chroma < 0.5);
    }

    #[test]
    fn saturated_red_metrics() {
        let red = ColorSample::new(255, 0, 0);
        let (hue, saturation, value) = red.hsv();
        assert_eq!(hue, 0.0);
        assert_eq!(saturation, 1.0);
        assert_eq!(value, 1.0);
        assert_eq!(red.chromaticness(), 1.0);
        let (l, a, _) = red.lab();
        assert!(l > 50.0 && l < 56.0);
        assert!(a > 75.0);
    }
}
