// THEORY:
// The `pipeline` module is the per-frame algorithm, invoked synchronously once
// per incoming camera frame. Stages, in order: integer downsample, conversion
// into the active color space, union threshold mask, connected-component
// extraction, area filter/sort/truncate, coordinate scale-back, and finally
// consumption of any pending tap against the full-resolution buffer.
//
// Key architectural principles:
// 1.  **Per-frame containment**: any failure inside a frame degrades to an
//     empty detection list. Nothing here may panic across the API or leak an
//     error into the control context.
// 2.  **Never block on the control side**: thresholds are read as a snapshot;
//     an empty set means the control context has not derived one yet and the
//     hardcoded fallback range is used instead.
// 3.  **No buffers survive a frame**: every intermediate (downsampled pixels,
//     converted pixels, mask, visited grid) is created and dropped within
//     `process_frame`. Each frame is independent; there is no queue, backlog,
//     or retry.

use crate::core_modules::color_space::{self, ThresholdRange};
use crate::core_modules::pixel::pixel::ColorSample;
use crate::core_modules::region_detector::{self, Region};
use crate::core_modules::sampler;
use crate::error::{Error, Result};
use crate::state::TrackingState;
use std::sync::Arc;

/// Used when the threshold set has not been derived yet. Matches the default
/// orange target in the default HSV space.
const FALLBACK_RANGE: ThresholdRange = ThresholdRange {
    lower: [11, 70, 50],
    upper: [25, 255, 255],
};

/// Channel order of an incoming frame buffer. The pipeline consumes RGB;
/// anything else must be converted by the camera backend first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Yuv,
}

/// One frame as delivered by the camera backend: packed interleaved
/// channels, 3 bytes per pixel, row-major.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

/// An axis-aligned detection box in original-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Per-frame output: boxes sorted ascending by region area, truncated to
/// `max_object_count`. Regenerated every frame, never persisted.
pub type DetectionResult = Vec<BoundingBox>;

/// Configuration for the frame pipeline, allowing for tunable behavior.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Integer downsample factor applied to both dimensions.
    pub downsample_factor: u32,
    /// Minimum region area, in downsampled pixels, to keep a detection.
    pub min_region_area: usize,
    /// Maximum region area, in downsampled pixels. `None` is unbounded.
    pub max_region_area: Option<usize>,
    /// Hard cap on the number of reported boxes per frame.
    pub max_object_count: usize,
    /// Radius, in full-resolution pixels, of the tap sampling disk.
    pub tap_sample_radius: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            downsample_factor: 4,
            min_region_area: 100,
            max_region_area: Some(5000),
            max_object_count: 50,
            tap_sample_radius: 10,
        }
    }
}

/// The per-frame detector. Reads the shared tracking state, never writes it
/// except to consume a pending tap.
pub struct FramePipeline {
    config: PipelineConfig,
    state: Arc<TrackingState>,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig, state: Arc<TrackingState>) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes one frame. Infallible from the caller's perspective: a
    /// malformed frame logs a warning and yields an empty result.
    pub fn process_frame(&self, frame: &FrameBuffer) -> DetectionResult {
        match self.detect(frame) {
            Ok(boxes) => boxes,
            Err(error) => {
                log::warn!("frame skipped: {error}");
                Vec::new()
            }
        }
    }

    fn detect(&self, frame: &FrameBuffer) -> Result<DetectionResult> {
        self.validate(frame)?;

        let factor = self.config.downsample_factor.max(1);
        let ds_width = frame.width / factor;
        let ds_height = frame.height / factor;
        if ds_width == 0 || ds_height == 0 {
            return Err(Error::FrameDecodeFailure(format!(
                "frame {}x{} too small for downsample factor {factor}",
                frame.width, frame.height
            )));
        }

        let downsampled = downsample(frame, factor, ds_width, ds_height);

        let space = self.state.color_space();
        let converted: Vec<[u8; 3]> = downsampled
            .iter()
            .map(|&sample| color_space::convert_pixel(space, sample))
            .collect();

        let thresholds = self.state.thresholds();
        let mask = if thresholds.is_empty() {
            region_detector::build_mask(&converted, &[FALLBACK_RANGE])
        } else {
            region_detector::build_mask(&converted, &thresholds)
        };

        let mut regions: Vec<Region> = region_detector::find_regions(&mask, ds_width, ds_height)
            .into_iter()
            .filter(|region| {
                region.area >= self.config.min_region_area
                    && self
                        .config
                        .max_region_area
                        .map_or(true, |max| region.area <= max)
            })
            .collect();

        regions.sort_by_key(|region| region.area);
        regions.truncate(self.config.max_object_count);

        let boxes = regions
            .iter()
            .map(|region| BoundingBox {
                x: region.min_x * factor,
                y: region.min_y * factor,
                width: (region.max_x - region.min_x + 1) * factor,
                height: (region.max_y - region.min_y + 1) * factor,
            })
            .collect();

        self.consume_pending_tap(frame);

        Ok(boxes)
    }

    fn validate(&self, frame: &FrameBuffer) -> Result<()> {
        if frame.layout != PixelLayout::Rgb {
            return Err(Error::FrameDecodeFailure(format!(
                "unsupported pixel layout {:?}; backend must deliver RGB",
                frame.layout
            )));
        }
        if frame.width == 0 || frame.height == 0 {
            return Err(Error::FrameDecodeFailure("zero-sized frame".to_string()));
        }
        let expected = frame.width as usize * frame.height as usize * 3;
        if frame.data.len() != expected {
            return Err(Error::FrameDecodeFailure(format!(
                "buffer length {} does not match {}x{}x3",
                frame.data.len(),
                frame.width,
                frame.height
            )));
        }
        Ok(())
    }

    /// Consumes a pending tap against the full-resolution frame: the new
    /// target color is the disk average around the tap, or pure black when
    /// the disk has no in-bounds pixels.
    fn consume_pending_tap(&self, frame: &FrameBuffer) {
        let Some(tap) = self.state.take_pending_tap() else {
            return;
        };

        let sample = match sampler::sample_disk(
            &frame.data,
            frame.width,
            frame.height,
            tap.x,
            tap.y,
            self.config.tap_sample_radius,
        ) {
            Ok(sample) => sample,
            Err(_) => ColorSample::BLACK,
        };

        log::debug!(
            "tap at ({}, {}) sampled ({}, {}, {})",
            tap.x,
            tap.y,
            sample.red,
            sample.green,
            sample.blue
        );
        self.state.set_target_color(sample);
    }
}

/// Block-averaged integer downsample: each output pixel is the mean of its
/// `factor`×`factor` source block.
fn downsample(frame: &FrameBuffer, factor: u32, ds_width: u32, ds_height: u32) -> Vec<ColorSample> {
    let mut out = Vec::with_capacity((ds_width * ds_height) as usize);
    let stride = frame.width as usize * 3;

    for block_y in 0..ds_height {
        for block_x in 0..ds_width {
            let mut sum = [0u64; 3];
            for dy in 0..factor {
                let row = (block_y * factor + dy) as usize * stride;
                for dx in 0..factor {
                    let offset = row + (block_x * factor + dx) as usize * 3;
                    sum[0] += frame.data[offset] as u64;
                    sum[1] += frame.data[offset + 1] as u64;
                    sum[2] += frame.data[offset + 2] as u64;
                }
            }
            let count = (factor * factor) as u64;
            out.push(ColorSample::new(
                (sum[0] / count) as u8,
                (sum[1] / count) as u8,
                (sum[2] / count) as u8,
            ));
        }
    }

    out
}
