// THEORY:
// The classifier turns one RGB sample into a human-meaningful color name plus
// a confidence score. It is a pure function: identical input always produces
// identical output, and it touches no shared state.
//
// The decision procedure is a fixed five-stage cascade:
// 1.  Achromatic test — brightness-adaptive channel-deviation check; grays,
//     blacks, and whites short-circuit into luminance bands.
// 2.  Chromatic classification — the hue circle is partitioned into nine
//     named sectors, each with its own ratio/luminance rules picking one of
//     ~50 detailed categories.
// 3.  Dark overrides — very dark samples get re-examined (dark yellows read
//     as olive, dark oranges as brown, near-gray darks as gray).
// 4.  Desaturation — washed-out samples collapse toward gray bands or pick
//     up a `Muted` prefix, decided by LCH chroma.
// 5.  Simplification — the detailed category maps many-to-one onto a coarse
//     bucket (RED, ORANGE, ..., GRAY).
//
// Every numeric constant below is calibrated behavior, not a tuning
// suggestion. The rules look arbitrary because perception is; do not fold
// branches together for elegance.

use crate::core_modules::pixel::pixel::{ColorSample, Luminance};
use crate::error::Result;

/// Classification mode. `Gray` collapses every non-achromatic sample to its
/// nearest gray band by luminance, bypassing hue classification entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyMode {
    Color,
    Gray,
}

/// The detailed category vocabulary (~50 values). Produced by stages 1-4,
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailedColor {
    // Reds and pinks.
    Red,
    DarkRed,
    PureRed,
    LightRed,
    Pink,
    HotPink,
    DeepPink,
    Magenta,
    DarkMagenta,
    // Oranges and browns.
    Orange,
    DarkOrange,
    LightOrange,
    Brown,
    DarkBrown,
    // Yellows.
    Yellow,
    DarkYellow,
    LightYellow,
    Gold,
    Olive,
    // Greens.
    Green,
    DarkGreen,
    LightGreen,
    ForestGreen,
    Lime,
    // Cyans.
    Cyan,
    DarkCyan,
    LightCyan,
    Teal,
    // Blues.
    Blue,
    DarkBlue,
    LightBlue,
    SkyBlue,
    Navy,
    // Purples.
    Purple,
    DarkPurple,
    Violet,
    Lavender,
    Indigo,
    // Achromatic bands, darkest to lightest.
    Black,
    VeryDarkGray,
    DarkGray,
    MediumDarkGray,
    MediumGray,
    LightGray,
    VeryLightGray,
    White,
    // Desaturated chromatic families.
    MutedRed,
    MutedOrange,
    MutedYellow,
    MutedGreen,
    MutedCyan,
    MutedBlue,
    MutedPurple,
}

/// The coarse buckets the detailed vocabulary simplifies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoarseColor {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Black,
    White,
    Gray,
}

impl CoarseColor {
    pub fn name(&self) -> &'static str {
        match self {
            CoarseColor::Red => "RED",
            CoarseColor::Orange => "ORANGE",
            CoarseColor::Yellow => "YELLOW",
            CoarseColor::Green => "GREEN",
            CoarseColor::Cyan => "CYAN",
            CoarseColor::Blue => "BLUE",
            CoarseColor::Purple => "PURPLE",
            CoarseColor::Black => "BLACK",
            CoarseColor::White => "WHITE",
            CoarseColor::Gray => "GRAY",
        }
    }
}

/// Full classifier output for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub detailed: DetailedColor,
    pub coarse: CoarseColor,
    /// Heuristic confidence in [0, 0.99].
    pub confidence: f32,
    pub is_dark: bool,
    pub is_light: bool,
    pub is_desaturated: bool,
}

const DARK_LUMINANCE: Luminance = 0.15;
const LIGHT_LUMINANCE: Luminance = 0.80;
const DESATURATED: f32 = 0.15;
/// LCH chroma below which a desaturated sample reads as gray rather than a
/// muted color.
const MUTED_CHROMA_FLOOR: f64 = 12.0;

/// Validates raw integer input, then classifies. This is the external entry
/// point for untrusted channel data.
pub fn classify_values(values: &[i64], mode: ClassifyMode) -> Result<Classification> {
    Ok(classify(ColorSample::from_values(values)?, mode))
}

/// Classifies a sample. Pure and deterministic.
pub fn classify(sample: ColorSample, mode: ClassifyMode) -> Classification {
    let (hue, saturation, value) = sample.hsv();
    let (_, _, lightness) = sample.hsl();
    let luminance = sample.relative_luminance();
    let chromaticness = sample.chromaticness();
    let (_, lch_chroma, _) = sample.lch();

    let is_dark = luminance < DARK_LUMINANCE;
    let is_light = luminance > LIGHT_LUMINANCE;
    let is_desaturated = saturation < DESATURATED;

    let achromatic = is_achromatic(sample, saturation, chromaticness);

    let mut detailed = if achromatic {
        gray_band(luminance)
    } else if mode == ClassifyMode::Gray {
        // GRAY mode: every chromatic sample snaps to its luminance band.
        gray_band(luminance)
    } else {
        classify_sector(sample, hue, saturation, value, lightness, luminance)
    };

    if !achromatic && mode == ClassifyMode::Color {
        if is_dark {
            detailed = dark_override(detailed, saturation, luminance);
        }
        if is_desaturated && !is_achromatic_category(detailed) {
            detailed = desaturate(detailed, lch_chroma, luminance);
        }
    }

    Classification {
        detailed,
        coarse: simplify(detailed),
        confidence: confidence(sample, hue, saturation),
        is_dark,
        is_light,
        is_desaturated,
    }
}

/// Stage 1: is this sample effectively gray? The deviation threshold adapts
/// to brightness: darker samples tolerate less channel spread (8), bright
/// ones more (12), everything else 10.
fn is_achromatic(sample: ColorSample, saturation: f32, chromaticness: f32) -> bool {
    let mean = sample.mean();
    let deviation_threshold = if mean < 50.0 {
        8.0
    } else if mean > 200.0 {
        12.0
    } else {
        10.0
    };

    sample.channel_deviation() <= deviation_threshold
        && (saturation < 0.15 || chromaticness < 0.10)
}

/// Luminance-banded achromatic sub-classification. Band edges are contracts.
pub fn gray_band(luminance: Luminance) -> DetailedColor {
    if luminance < 0.02 {
        DetailedColor::Black
    } else if luminance < 0.15 {
        DetailedColor::VeryDarkGray
    } else if luminance < 0.30 {
        DetailedColor::DarkGray
    } else if luminance < 0.50 {
        DetailedColor::MediumDarkGray
    } else if luminance < 0.65 {
        DetailedColor::MediumGray
    } else if luminance < 0.80 {
        DetailedColor::LightGray
    } else if luminance < 0.95 {
        DetailedColor::VeryLightGray
    } else {
        DetailedColor::White
    }
}

/// Stage 2: per-sector chromatic rules. Ratios use the +1 denominators so a
/// zero channel never divides out.
fn classify_sector(
    sample: ColorSample,
    hue: f32,
    saturation: f32,
    value: f32,
    lightness: f32,
    luminance: Luminance,
) -> DetailedColor {
    let r = sample.red as f32;
    let g = sample.green as f32;
    let b = sample.blue as f32;
    let rg = r / (g + 1.0);
    let rb = r / (b + 1.0);

    match hue {
        h if h < 15.0 => {
            if rg > 1.8 && rb > 1.5 && g < 80.0 && r > 200.0 {
                DetailedColor::PureRed
            } else if luminance < 0.10 {
                DetailedColor::DarkRed
            } else if lightness > 0.70 {
                DetailedColor::LightRed
            } else {
                DetailedColor::Red
            }
        }
        h if h < 40.0 => {
            if luminance < 0.10 && rg < 1.4 {
                DetailedColor::Brown
            } else if luminance < 0.10 {
                DetailedColor::DarkBrown
            } else if luminance < 0.22 {
                DetailedColor::DarkOrange
            } else if lightness > 0.75 {
                DetailedColor::LightOrange
            } else {
                DetailedColor::Orange
            }
        }
        h if h < 70.0 => {
            if luminance < 0.18 {
                DetailedColor::Olive
            } else if lightness > 0.80 {
                DetailedColor::LightYellow
            } else if luminance < 0.35 {
                DetailedColor::DarkYellow
            } else if saturation > 0.80 && value < 0.85 {
                DetailedColor::Gold
            } else {
                DetailedColor::Yellow
            }
        }
        h if h < 150.0 => {
            if luminance < 0.08 {
                DetailedColor::DarkGreen
            } else if h < 90.0 && saturation > 0.80 && value > 0.80 {
                DetailedColor::Lime
            } else if luminance < 0.18 {
                DetailedColor::ForestGreen
            } else if lightness > 0.75 {
                DetailedColor::LightGreen
            } else {
                DetailedColor::Green
            }
        }
        h if h < 200.0 => {
            if luminance < 0.12 {
                DetailedColor::DarkCyan
            } else if saturation < 0.65 && value < 0.75 {
                DetailedColor::Teal
            } else if lightness > 0.80 {
                DetailedColor::LightCyan
            } else {
                DetailedColor::Cyan
            }
        }
        h if h < 260.0 => {
            if luminance < 0.06 {
                DetailedColor::Navy
            } else if luminance < 0.15 {
                DetailedColor::DarkBlue
            } else if lightness > 0.72 {
                DetailedColor::LightBlue
            } else if h < 225.0 && lightness > 0.55 {
                DetailedColor::SkyBlue
            } else {
                DetailedColor::Blue
            }
        }
        h if h < 310.0 => {
            if luminance < 0.08 {
                DetailedColor::DarkPurple
            } else if h < 275.0 {
                DetailedColor::Indigo
            } else if lightness > 0.75 {
                DetailedColor::Lavender
            } else if h >= 295.0 {
                DetailedColor::Violet
            } else {
                DetailedColor::Purple
            }
        }
        h if h < 330.0 => {
            if luminance < 0.12 {
                DetailedColor::DarkMagenta
            } else {
                DetailedColor::Magenta
            }
        }
        _ => {
            if luminance < 0.10 {
                DetailedColor::DarkRed
            } else if lightness > 0.70 {
                DetailedColor::Pink
            } else if saturation > 0.70 && value > 0.85 {
                DetailedColor::HotPink
            } else if lightness > 0.55 {
                DetailedColor::DeepPink
            } else {
                DetailedColor::Red
            }
        }
    }
}

/// Stage 3: dark-specific overrides for chromatic results.
fn dark_override(
    detailed: DetailedColor,
    saturation: f32,
    luminance: Luminance,
) -> DetailedColor {
    if saturation < 0.25 && luminance < 0.15 {
        return DetailedColor::VeryDarkGray;
    }
    match detailed {
        DetailedColor::Yellow
        | DetailedColor::DarkYellow
        | DetailedColor::LightYellow
        | DetailedColor::Gold => DetailedColor::Olive,
        DetailedColor::Orange | DetailedColor::DarkOrange | DetailedColor::LightOrange => {
            DetailedColor::Brown
        }
        other => other,
    }
}

/// Stage 4: desaturated samples either collapse to a gray band (when LCH
/// chroma is below the floor) or keep their family with a `Muted` prefix.
fn desaturate(
    detailed: DetailedColor,
    lch_chroma: f64,
    luminance: Luminance,
) -> DetailedColor {
    if lch_chroma < MUTED_CHROMA_FLOOR {
        return gray_band(luminance);
    }
    match simplify(detailed) {
        CoarseColor::Red => DetailedColor::MutedRed,
        CoarseColor::Orange => DetailedColor::MutedOrange,
        CoarseColor::Yellow => DetailedColor::MutedYellow,
        CoarseColor::Green => DetailedColor::MutedGreen,
        CoarseColor::Cyan => DetailedColor::MutedCyan,
        CoarseColor::Blue => DetailedColor::MutedBlue,
        CoarseColor::Purple => DetailedColor::MutedPurple,
        _ => detailed,
    }
}

fn is_achromatic_category(detailed: DetailedColor) -> bool {
    matches!(
        detailed,
        DetailedColor::Black
            | DetailedColor::VeryDarkGray
            | DetailedColor::DarkGray
            | DetailedColor::MediumDarkGray
            | DetailedColor::MediumGray
            | DetailedColor::LightGray
            | DetailedColor::VeryLightGray
            | DetailedColor::White
    )
}

/// Stage 5: the fixed many-to-one simplification table.
pub fn simplify(detailed: DetailedColor) -> CoarseColor {
    use DetailedColor::*;
    match detailed {
        Red | DarkRed | PureRed | LightRed | Pink | HotPink | DeepPink => CoarseColor::Red,
        Magenta | DarkMagenta => CoarseColor::Purple,
        Orange | DarkOrange | LightOrange | Brown | DarkBrown => CoarseColor::Orange,
        Yellow | DarkYellow | LightYellow | Gold | Olive => CoarseColor::Yellow,
        Green | DarkGreen | LightGreen | ForestGreen | Lime => CoarseColor::Green,
        Cyan | DarkCyan | LightCyan | Teal => CoarseColor::Cyan,
        Blue | DarkBlue | LightBlue | SkyBlue | Navy => CoarseColor::Blue,
        Purple | DarkPurple | Violet | Lavender | Indigo => CoarseColor::Purple,
        Black => CoarseColor::Black,
        White => CoarseColor::White,
        VeryDarkGray | DarkGray | MediumDarkGray | MediumGray | LightGray | VeryLightGray => {
            CoarseColor::Gray
        }
        MutedRed | MutedOrange | MutedYellow | MutedGreen | MutedCyan | MutedBlue
        | MutedPurple => CoarseColor::Gray,
    }
}

/// Confidence: base 0.5, +0.3×saturation, +0.15 when the max/min channel
/// ratio exceeds 2.0, +0.1 when the hue sits strictly inside the middle of a
/// 60° sector. Capped at 0.99.
fn confidence(sample: ColorSample, hue: f32, saturation: f32) -> f32 {
    let mut score = 0.5 + 0.3 * saturation;

    let min = sample.min_channel().max(1) as f32;
    if sample.max_channel() as f32 / min > 2.0 {
        score += 0.15;
    }

    let sector_position = hue % 60.0;
    if sector_position > 15.0 && sector_position < 45.0 {
        score += 0.1;
    }

    score.min(0.99)
}
