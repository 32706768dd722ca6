// THEORY:
// The sample extractor turns a tap coordinate into a single representative
// color: it averages every in-bounds pixel inside a disk around the tap on
// the full-resolution frame, cancelling single-pixel sensor noise the same
// way regional averaging does elsewhere in the pipeline. A tap that lands
// entirely outside the frame produces `EmptySample`; the caller substitutes
// pure black rather than failing the frame.

use crate::core_modules::pixel::pixel::ColorSample;
use crate::error::{Error, Result};

/// Averages RGB over a disk of `radius` pixels centered at (`center_x`,
/// `center_y`). `data` is a packed row-major RGB buffer. Only in-bounds
/// pixels contribute.
pub fn sample_disk(
    data: &[u8],
    width: u32,
    height: u32,
    center_x: i64,
    center_y: i64,
    radius: u32,
) -> Result<ColorSample> {
    let radius = radius as i64;
    let radius_sq = radius * radius;

    let mut sum_r = 0u64;
    let mut sum_g = 0u64;
    let mut sum_b = 0u64;
    let mut count = 0u64;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius_sq {
                continue;
            }
            let x = center_x + dx;
            let y = center_y + dy;
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                continue;
            }
            let offset = ((y as u64 * width as u64 + x as u64) * 3) as usize;
            if offset + 2 >= data.len() {
                continue;
            }
            sum_r += data[offset] as u64;
            sum_g += data[offset + 1] as u64;
            sum_b += data[offset + 2] as u64;
            count += 1;
        }
    }

    if count == 0 {
        return Err(Error::EmptySample);
    }

    Ok(ColorSample::new(
        (sum_r / count) as u8,
        (sum_g / count) as u8,
        (sum_b / count) as u8,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        data
    }

    #[test]
    fn uniform_disk_returns_exact_color() {
        let data = solid_frame(64, 64, [210, 90, 15]);
        let sample = sample_disk(&data, 64, 64, 32, 32, 10).unwrap();
        assert_eq!(sample, ColorSample::new(210, 90, 15));
    }

    #[test]
    fn edge_tap_uses_only_in_bounds_pixels() {
        let data = solid_frame(32, 32, [50, 100, 150]);
        let sample = sample_disk(&data, 32, 32, 0, 0, 10).unwrap();
        assert_eq!(sample, ColorSample::new(50, 100, 150));
    }

    #[test]
    fn fully_out_of_bounds_tap_is_empty() {
        let data = solid_frame(16, 16, [255, 255, 255]);
        let result = sample_disk(&data, 16, 16, -100, -100, 5);
        assert!(matches!(result, Err(Error::EmptySample)));
    }
}
