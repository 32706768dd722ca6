// THEORY:
// This file is the main entry point for the `chroma_track` library crate.
// It exposes the high-level surface external consumers need — the frame
// pipeline, the detection session, the shared tracking state, and the
// classifier vocabulary — while keeping the internal `core_modules`
// machinery encapsulated behind a small set of re-exports.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod state;

pub use core_modules::classifier::{
    classify, classify_values, Classification, ClassifyMode, CoarseColor, DetailedColor,
};
pub use core_modules::color_space::{ColorSpaceId, ThresholdRange, ThresholdSet};
pub use core_modules::pixel::pixel::ColorSample;
pub use error::{Error, Result};
pub use pipeline::{
    BoundingBox, DetectionResult, FrameBuffer, FramePipeline, PipelineConfig, PixelLayout,
};
pub use session::DetectionSession;
pub use state::{TapPoint, TrackingState};
