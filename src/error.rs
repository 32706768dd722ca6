// THEORY:
// Every failure the detector can produce is containable: a bad classification
// input aborts that call, a bad frame yields an empty detection result, and a
// bad state mutation is a no-op. Nothing in this crate is allowed to take the
// process down. This module defines the closed taxonomy those rules operate on.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A classification input was not an RGB triple in [0, 255].
    #[error("invalid color sample: expected 3 channels in [0, 255], got {0:?}")]
    InvalidSample(Vec<i64>),

    /// A requested color space is not one of the six supported encodings.
    /// The previous selection stays in effect.
    #[error("unsupported color space: {0:?}")]
    UnsupportedColorSpace(String),

    /// The current frame buffer is unusable. The frame is skipped and the
    /// detection result for it is empty; nothing propagates further.
    #[error("frame decode failure: {0}")]
    FrameDecodeFailure(String),

    /// A tap-sample disk contained zero in-bounds pixels. Callers fall back
    /// to pure black instead of surfacing this.
    #[error("tap sample region contained no in-bounds pixels")]
    EmptySample,
}
