// THEORY:
// This module owns everything the mask stage needs to know about color
// spaces: the closed set of supported encodings, the per-pixel conversion
// into each encoding, and the static calibration table mapping a coarse
// color category to inclusive threshold ranges in each space.
//
// Key architectural principles:
// 1.  **Closed enumeration**: `ColorSpaceId` is total. Parsing an unknown
//     name is an error the caller turns into a no-op; there is no partially
//     supported space.
// 2.  **8-bit wrapped encodings**: every converted channel fits a byte so one
//     `ThresholdRange` shape serves all six spaces. Hue uses the halved
//     0-179 convention; L*a*b* is scaled/offset into 0-255.
// 3.  **Calibration constants, not derivation**: the bounds table is fixed
//     empirical data. RED in the hue-wrap spaces (HSV, HLS) is two disjoint
//     ranges whose union covers the wraparound at 0/179.

use crate::core_modules::classifier::CoarseColor;
use crate::core_modules::pixel::pixel::ColorSample;
use crate::error::{Error, Result};

/// The six supported threshold encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpaceId {
    Bgr,
    Gray,
    Hls,
    Hsv,
    Lab,
    Xyz,
}

impl ColorSpaceId {
    /// Total validator for external space names. Unrecognized names are
    /// rejected; the caller keeps its previous selection.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BGR" => Ok(ColorSpaceId::Bgr),
            "GRAY" => Ok(ColorSpaceId::Gray),
            "HLS" => Ok(ColorSpaceId::Hls),
            "HSV" => Ok(ColorSpaceId::Hsv),
            "LAB" => Ok(ColorSpaceId::Lab),
            "XYZ" => Ok(ColorSpaceId::Xyz),
            _ => Err(Error::UnsupportedColorSpace(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorSpaceId::Bgr => "BGR",
            ColorSpaceId::Gray => "GRAY",
            ColorSpaceId::Hls => "HLS",
            ColorSpaceId::Hsv => "HSV",
            ColorSpaceId::Lab => "Lab",
            ColorSpaceId::Xyz => "XYZ",
        }
    }
}

/// One inclusive lower/upper bound pair in a space's native byte encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ThresholdRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Inclusive per-channel membership test.
    pub fn contains(&self, pixel: [u8; 3]) -> bool {
        (0..3).all(|i| self.lower[i] <= pixel[i] && pixel[i] <= self.upper[i])
    }
}

/// An ordered set of ranges tested with logical OR.
pub type ThresholdSet = Vec<ThresholdRange>;

/// Converts an RGB sample into `space`'s byte encoding.
pub fn convert_pixel(space: ColorSpaceId, sample: ColorSample) -> [u8; 3] {
    match space {
        ColorSpaceId::Bgr => [sample.blue, sample.green, sample.red],
        ColorSpaceId::Gray => {
            // Rec. 601 luma, replicated across all three slots.
            let luma = (0.299 * sample.red as f32
                + 0.587 * sample.green as f32
                + 0.114 * sample.blue as f32)
                .round()
                .clamp(0.0, 255.0) as u8;
            [luma, luma, luma]
        }
        ColorSpaceId::Hsv => {
            let (hue, saturation, value) = sample.hsv();
            [
                (hue / 2.0).round().min(179.0) as u8,
                (saturation * 255.0).round() as u8,
                (value * 255.0).round() as u8,
            ]
        }
        ColorSpaceId::Hls => {
            let (hue, saturation, lightness) = sample.hsl();
            [
                (hue / 2.0).round().min(179.0) as u8,
                (lightness * 255.0).round() as u8,
                (saturation * 255.0).round() as u8,
            ]
        }
        ColorSpaceId::Lab => {
            let (l, a, b) = sample.lab();
            [
                (l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8,
                (a + 128.0).round().clamp(0.0, 255.0) as u8,
                (b + 128.0).round().clamp(0.0, 255.0) as u8,
            ]
        }
        ColorSpaceId::Xyz => {
            let (x, y, z) = sample.xyz();
            [
                (x * 255.0).round().clamp(0.0, 255.0) as u8,
                (y * 255.0).round().clamp(0.0, 255.0) as u8,
                (z * 255.0).round().clamp(0.0, 255.0) as u8,
            ]
        }
    }
}

/// Calibration table: inclusive bounds for each coarse category in each
/// space. These values are empirical contracts; they are not derived at
/// runtime.
pub fn bounds(space: ColorSpaceId, category: CoarseColor) -> ThresholdSet {
    use CoarseColor::*;
    match space {
        ColorSpaceId::Hsv => match category {
            // Hue wraps at 0/179, so red needs two disjoint ranges.
            Red => vec![
                ThresholdRange::new([0, 70, 50], [10, 255, 255]),
                ThresholdRange::new([170, 70, 50], [179, 255, 255]),
            ],
            Orange => vec![ThresholdRange::new([11, 70, 50], [25, 255, 255])],
            Yellow => vec![ThresholdRange::new([26, 70, 50], [34, 255, 255])],
            Green => vec![ThresholdRange::new([35, 70, 50], [85, 255, 255])],
            Cyan => vec![ThresholdRange::new([86, 70, 50], [100, 255, 255])],
            Blue => vec![ThresholdRange::new([101, 70, 50], [130, 255, 255])],
            Purple => vec![ThresholdRange::new([131, 60, 40], [169, 255, 255])],
            Black => vec![ThresholdRange::new([0, 0, 0], [179, 255, 45])],
            White => vec![ThresholdRange::new([0, 0, 200], [179, 40, 255])],
            Gray => vec![ThresholdRange::new([0, 0, 46], [179, 40, 199])],
        },
        ColorSpaceId::Hls => match category {
            Red => vec![
                ThresholdRange::new([0, 40, 70], [10, 220, 255]),
                ThresholdRange::new([170, 40, 70], [179, 220, 255]),
            ],
            Orange => vec![ThresholdRange::new([11, 40, 70], [25, 220, 255])],
            Yellow => vec![ThresholdRange::new([26, 40, 70], [34, 220, 255])],
            Green => vec![ThresholdRange::new([35, 40, 70], [85, 220, 255])],
            Cyan => vec![ThresholdRange::new([86, 40, 70], [100, 220, 255])],
            Blue => vec![ThresholdRange::new([101, 40, 70], [130, 220, 255])],
            Purple => vec![ThresholdRange::new([131, 40, 60], [169, 220, 255])],
            Black => vec![ThresholdRange::new([0, 0, 0], [179, 45, 255])],
            White => vec![ThresholdRange::new([0, 201, 0], [179, 255, 255])],
            Gray => vec![ThresholdRange::new([0, 46, 0], [179, 200, 40])],
        },
        ColorSpaceId::Bgr => match category {
            Red => vec![ThresholdRange::new([0, 0, 120], [80, 70, 255])],
            Orange => vec![ThresholdRange::new([0, 60, 150], [80, 140, 255])],
            Yellow => vec![ThresholdRange::new([0, 150, 150], [100, 255, 255])],
            Green => vec![ThresholdRange::new([0, 100, 0], [100, 255, 100])],
            Cyan => vec![ThresholdRange::new([150, 150, 0], [255, 255, 100])],
            Blue => vec![ThresholdRange::new([120, 0, 0], [255, 80, 80])],
            Purple => vec![ThresholdRange::new([120, 0, 80], [255, 100, 200])],
            Black => vec![ThresholdRange::new([0, 0, 0], [50, 50, 50])],
            White => vec![ThresholdRange::new([200, 200, 200], [255, 255, 255])],
            Gray => vec![ThresholdRange::new([60, 60, 60], [199, 199, 199])],
        },
        ColorSpaceId::Gray => match category {
            // Chromatic categories fall back to their typical luma band.
            Red => vec![ThresholdRange::new([30, 30, 30], [100, 100, 100])],
            Orange => vec![ThresholdRange::new([80, 80, 80], [160, 160, 160])],
            Yellow => vec![ThresholdRange::new([150, 150, 150], [230, 230, 230])],
            Green => vec![ThresholdRange::new([60, 60, 60], [140, 140, 140])],
            Cyan => vec![ThresholdRange::new([100, 100, 100], [180, 180, 180])],
            Blue => vec![ThresholdRange::new([30, 30, 30], [110, 110, 110])],
            Purple => vec![ThresholdRange::new([40, 40, 40], [120, 120, 120])],
            Black => vec![ThresholdRange::new([0, 0, 0], [50, 50, 50])],
            White => vec![ThresholdRange::new([200, 200, 200], [255, 255, 255])],
            Gray => vec![ThresholdRange::new([51, 51, 51], [199, 199, 199])],
        },
        ColorSpaceId::Lab => match category {
            Red => vec![ThresholdRange::new([20, 150, 130], [200, 255, 200])],
            Orange => vec![ThresholdRange::new([50, 140, 150], [220, 180, 220])],
            Yellow => vec![ThresholdRange::new([80, 110, 160], [240, 150, 255])],
            Green => vec![ThresholdRange::new([30, 0, 110], [220, 110, 200])],
            Cyan => vec![ThresholdRange::new([60, 0, 60], [230, 110, 127])],
            Blue => vec![ThresholdRange::new([20, 110, 0], [200, 170, 100])],
            Purple => vec![ThresholdRange::new([20, 140, 60], [200, 210, 120])],
            Black => vec![ThresholdRange::new([0, 0, 0], [45, 255, 255])],
            White => vec![ThresholdRange::new([220, 118, 118], [255, 138, 138])],
            Gray => vec![ThresholdRange::new([46, 118, 118], [219, 138, 138])],
        },
        ColorSpaceId::Xyz => match category {
            Red => vec![ThresholdRange::new([60, 30, 0], [200, 110, 60])],
            Orange => vec![ThresholdRange::new([90, 70, 10], [230, 180, 80])],
            Yellow => vec![ThresholdRange::new([140, 150, 20], [255, 255, 110])],
            Green => vec![ThresholdRange::new([40, 80, 20], [160, 230, 110])],
            Cyan => vec![ThresholdRange::new([90, 140, 140], [220, 255, 255])],
            Blue => vec![ThresholdRange::new([40, 20, 120], [160, 110, 255])],
            Purple => vec![ThresholdRange::new([60, 30, 100], [200, 120, 255])],
            Black => vec![ThresholdRange::new([0, 0, 0], [40, 40, 40])],
            White => vec![ThresholdRange::new([200, 210, 200], [255, 255, 255])],
            Gray => vec![ThresholdRange::new([41, 41, 41], [199, 209, 199])],
        },
    }
}

/// Heuristic nearest-category lookup for a sampled color. The neutral branch
/// (channel spread < 30) runs before the saturated branch regardless of the
/// target space; GRAY space uses dedicated mean-brightness bands.
pub fn closest_category(sample: ColorSample, space: ColorSpaceId) -> CoarseColor {
    let mean = sample.mean();

    if space == ColorSpaceId::Gray {
        return if mean > 220.0 {
            CoarseColor::White
        } else if mean > 170.0 {
            CoarseColor::Gray // light gray band
        } else if mean > 100.0 {
            CoarseColor::Gray // medium gray band
        } else if mean > 50.0 {
            CoarseColor::Gray // dark gray band
        } else {
            CoarseColor::Black
        };
    }

    if sample.channel_spread() < 30 {
        return if mean > 220.0 {
            CoarseColor::White
        } else if mean < 50.0 {
            CoarseColor::Black
        } else {
            CoarseColor::Gray
        };
    }

    let r = sample.red as f32;
    let g = sample.green as f32;
    let b = sample.blue as f32;

    if sample.red >= sample.green && sample.red >= sample.blue {
        if g > b + 30.0 && g > r * 0.5 {
            if g > r * 0.75 {
                CoarseColor::Yellow
            } else {
                CoarseColor::Orange
            }
        } else if b > g + 30.0 && b > r * 0.5 {
            CoarseColor::Purple
        } else {
            CoarseColor::Red
        }
    } else if sample.green >= sample.red && sample.green >= sample.blue {
        if b > r && b > g * 0.7 {
            CoarseColor::Cyan
        } else {
            CoarseColor::Green
        }
    } else if g > b * 0.65 {
        CoarseColor::Cyan
    } else if r > b * 0.6 {
        CoarseColor::Purple
    } else {
        CoarseColor::Blue
    }
}

/// Packs one triple into a single integer: `r<<16 | g<<8 | b`.
fn pack_triple(triple: [u8; 3]) -> u32 {
    ((triple[0] as u32) << 16) | ((triple[1] as u32) << 8) | triple[2] as u32
}

fn unpack_triple(packed: u32) -> [u8; 3] {
    [
        ((packed >> 16) & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
    ]
}

/// Serializes a bound pair to the compact packed-integer text encoding.
pub fn rgb_bounds_to_string(lower: [u8; 3], upper: [u8; 3]) -> String {
    format!("{}:{}", pack_triple(lower), pack_triple(upper))
}

/// Parses the packed-integer text encoding back into a bound pair. Total:
/// malformed text yields `None`. Lossless for all values in [0, 255]³.
pub fn string_bounds_to_rgb(encoded: &str) -> Option<ThresholdRange> {
    let (lower_text, upper_text) = encoded.split_once(':')?;
    let lower: u32 = lower_text.parse().ok()?;
    let upper: u32 = upper_text.parse().ok()?;
    if lower > 0xff_ff_ff || upper > 0xff_ff_ff {
        return None;
    }
    Some(ThresholdRange::new(
        unpack_triple(lower),
        unpack_triple(upper),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_total() {
        assert_eq!(ColorSpaceId::from_name("hsv").unwrap(), ColorSpaceId::Hsv);
        assert_eq!(ColorSpaceId::from_name("Lab").unwrap(), ColorSpaceId::Lab);
        assert!(ColorSpaceId::from_name("YUV").is_err());
        assert!(ColorSpaceId::from_name("").is_err());
    }

    #[test]
    fn hsv_conversion_of_primaries() {
        let red = convert_pixel(ColorSpaceId::Hsv, ColorSample::new(255, 0, 0));
        assert_eq!(red, [0, 255, 255]);
        let green = convert_pixel(ColorSpaceId::Hsv, ColorSample::new(0, 255, 0));
        assert_eq!(green, [60, 255, 255]);
        let blue = convert_pixel(ColorSpaceId::Hsv, ColorSample::new(0, 0, 255));
        assert_eq!(blue, [120, 255, 255]);
    }

    #[test]
    fn gray_conversion_replicates_luma() {
        let converted = convert_pixel(ColorSpaceId::Gray, ColorSample::new(200, 200, 200));
        assert_eq!(converted, [200, 200, 200]);
        let [a, b, c] = convert_pixel(ColorSpaceId::Gray, ColorSample::new(10, 200, 60));
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn bgr_swaps_channels() {
        assert_eq!(
            convert_pixel(ColorSpaceId::Bgr, ColorSample::new(1, 2, 3)),
            [3, 2, 1]
        );
    }

    #[test]
    fn red_is_two_disjoint_ranges_in_hue_wrap_spaces() {
        for space in [ColorSpaceId::Hsv, ColorSpaceId::Hls] {
            let set = bounds(space, CoarseColor::Red);
            assert_eq!(set.len(), 2);
            assert_eq!((set[0].lower[0], set[0].upper[0]), (0, 10));
            assert_eq!((set[1].lower[0], set[1].upper[0]), (170, 179));
            // The two hue intervals must not overlap.
            assert!(set[0].upper[0] < set[1].lower[0]);
        }
    }

    #[test]
    fn red_mask_matches_both_sides_of_the_hue_wrap() {
        let set = bounds(ColorSpaceId::Hsv, CoarseColor::Red);
        let low_side = [5u8, 200, 200];
        let high_side = [175u8, 200, 200];
        assert!(set.iter().any(|range| range.contains(low_side)));
        assert!(set.iter().any(|range| range.contains(high_side)));
        let out_of_band = [90u8, 200, 200];
        assert!(!set.iter().any(|range| range.contains(out_of_band)));
    }

    #[test]
    fn every_space_category_pair_has_bounds() {
        use CoarseColor::*;
        let spaces = [
            ColorSpaceId::Bgr,
            ColorSpaceId::Gray,
            ColorSpaceId::Hls,
            ColorSpaceId::Hsv,
            ColorSpaceId::Lab,
            ColorSpaceId::Xyz,
        ];
        let categories = [
            Red, Orange, Yellow, Green, Cyan, Blue, Purple, Black, White, Gray,
        ];
        for space in spaces {
            for category in categories {
                let set = bounds(space, category);
                assert!(!set.is_empty());
                for range in set {
                    for i in 0..3 {
                        assert!(range.lower[i] <= range.upper[i]);
                    }
                }
            }
        }
    }

    #[test]
    fn packed_bounds_round_trip() {
        let cases = [
            ([0, 0, 0], [255, 255, 255]),
            ([0, 0, 1], [1, 0, 0]),
            ([170, 70, 50], [179, 255, 255]),
            ([12, 200, 34], [99, 201, 255]),
        ];
        for (lower, upper) in cases {
            let encoded = rgb_bounds_to_string(lower, upper);
            let decoded = string_bounds_to_rgb(&encoded).unwrap();
            assert_eq!(decoded.lower, lower);
            assert_eq!(decoded.upper, upper);
        }
    }

    #[test]
    fn malformed_bounds_strings_are_rejected() {
        assert!(string_bounds_to_rgb("").is_none());
        assert!(string_bounds_to_rgb("123").is_none());
        assert!(string_bounds_to_rgb("a:b").is_none());
        assert!(string_bounds_to_rgb("16777216:0").is_none());
    }

    #[test]
    fn closest_category_neutral_branch_runs_first() {
        // Low spread wins even for a technically warm-tinted sample.
        assert_eq!(
            closest_category(ColorSample::new(130, 120, 115), ColorSpaceId::Hsv),
            CoarseColor::Gray
        );
        assert_eq!(
            closest_category(ColorSample::new(240, 235, 230), ColorSpaceId::Hsv),
            CoarseColor::White
        );
        assert_eq!(
            closest_category(ColorSample::new(20, 25, 30), ColorSpaceId::Hsv),
            CoarseColor::Black
        );
    }

    #[test]
    fn closest_category_gray_space_bands() {
        assert_eq!(
            closest_category(ColorSample::new(230, 230, 230), ColorSpaceId::Gray),
            CoarseColor::White
        );
        assert_eq!(
            closest_category(ColorSample::new(120, 120, 120), ColorSpaceId::Gray),
            CoarseColor::Gray
        );
        assert_eq!(
            closest_category(ColorSample::new(30, 30, 30), ColorSpaceId::Gray),
            CoarseColor::Black
        );
        // The gray-space branch ignores hue entirely.
        assert_eq!(
            closest_category(ColorSample::new(200, 40, 40), ColorSpaceId::Gray),
            CoarseColor::Gray
        );
    }

    #[test]
    fn closest_category_saturated_branch() {
        assert_eq!(
            closest_category(ColorSample::new(220, 40, 30), ColorSpaceId::Hsv),
            CoarseColor::Red
        );
        assert_eq!(
            closest_category(ColorSample::new(230, 140, 20), ColorSpaceId::Hsv),
            CoarseColor::Orange
        );
        assert_eq!(
            closest_category(ColorSample::new(230, 220, 30), ColorSpaceId::Hsv),
            CoarseColor::Yellow
        );
        assert_eq!(
            closest_category(ColorSample::new(30, 200, 40), ColorSpaceId::Hsv),
            CoarseColor::Green
        );
        assert_eq!(
            closest_category(ColorSample::new(30, 40, 220), ColorSpaceId::Hsv),
            CoarseColor::Blue
        );
        assert_eq!(
            closest_category(ColorSample::new(30, 200, 210), ColorSpaceId::Hsv),
            CoarseColor::Cyan
        );
    }
}
