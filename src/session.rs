// THEORY:
// `DetectionSession` owns the lifecycle glue between the two execution
// contexts. The frame-processing context calls `process_frame` synchronously;
// the control context lives in a spawned tokio task that re-reconciles the
// derived threshold set every `POLL_INTERVAL`, catching any selection change
// that raced past an immediate re-derivation.
//
// Lifecycle rules:
// - `activate` resets the shared state to defaults and starts the poller.
// - `deactivate` aborts the poller and clears transient state (pending tap);
//   the color-space and target-color selections persist until the next
//   activation resets them.
// - A deactivated session refuses frames: the producer gets an empty result
//   instead of stale detections.

use crate::pipeline::{DetectionResult, FrameBuffer, FramePipeline, PipelineConfig};
use crate::state::{TapPoint, TrackingState};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spacing of the control-side threshold reconciliation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

pub struct DetectionSession {
    state: Arc<TrackingState>,
    pipeline: FramePipeline,
    poller: Option<JoinHandle<()>>,
}

impl DetectionSession {
    pub fn new(config: PipelineConfig) -> Self {
        let state = Arc::new(TrackingState::new());
        let pipeline = FramePipeline::new(config, state.clone());
        Self {
            state,
            pipeline,
            poller: None,
        }
    }

    /// Shared-state handle for control surfaces and diagnostics.
    pub fn state(&self) -> Arc<TrackingState> {
        self.state.clone()
    }

    pub fn is_active(&self) -> bool {
        self.poller.is_some()
    }

    /// Enters the detection screen: defaults restored, poller running.
    /// Must be called from within a tokio runtime.
    pub fn activate(&mut self) {
        if self.poller.is_some() {
            return;
        }
        self.state.reset_to_defaults();

        let state = self.state.clone();
        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            // The immediate first tick would duplicate the reset-time
            // derivation; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                state.refresh_thresholds();
            }
        }));
        log::debug!("detection session activated");
    }

    /// Leaves the detection screen: poller cancelled, transient state
    /// cleared. Frames arriving afterwards yield empty results.
    pub fn deactivate(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
        self.state.teardown();
        log::debug!("detection session deactivated");
    }

    /// Producer-side entry point, one call per camera frame.
    pub fn process_frame(&self, frame: &FrameBuffer) -> DetectionResult {
        if !self.is_active() {
            return Vec::new();
        }
        self.pipeline.process_frame(frame)
    }

    /// Control-side color-space request. Unknown names leave the prior
    /// selection in effect.
    pub fn request_color_space(&self, name: &str) -> crate::error::Result<()> {
        self.state.request_color_space(name)
    }

    /// Control-side tap request, in original-frame pixel coordinates. The
    /// next processed frame consumes it.
    pub fn request_tap(&self, x: i64, y: i64) {
        self.state.set_pending_tap(TapPoint { x, y });
    }
}

impl Drop for DetectionSession {
    fn drop(&mut self) {
        // Best effort cancellation on drop.
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_space::ColorSpaceId;
    use crate::pipeline::PixelLayout;
    use crate::state::DEFAULT_TARGET_COLOR;

    fn solid_frame(width: u32, height: u32, color: [u8; 3]) -> FrameBuffer {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        FrameBuffer {
            data,
            width,
            height,
            layout: PixelLayout::Rgb,
        }
    }

    #[tokio::test]
    async fn inactive_session_refuses_frames() {
        let session = DetectionSession::new(PipelineConfig::default());
        let frame = solid_frame(64, 64, [230, 120, 30]);
        assert!(session.process_frame(&frame).is_empty());
    }

    #[tokio::test]
    async fn activation_resets_state_and_starts_the_poller() {
        let mut session = DetectionSession::new(PipelineConfig::default());
        session.state().request_color_space("Lab").unwrap();
        session.request_tap(5, 5);

        session.activate();
        assert!(session.is_active());
        assert_eq!(session.state().color_space(), ColorSpaceId::Hsv);
        assert_eq!(session.state().target_color(), DEFAULT_TARGET_COLOR);
        assert_eq!(session.state().take_pending_tap(), None);

        session.deactivate();
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn deactivation_clears_pending_tap_but_keeps_selection() {
        let mut session = DetectionSession::new(PipelineConfig::default());
        session.activate();
        session.request_color_space("XYZ").unwrap();
        session.request_tap(10, 10);

        session.deactivate();
        assert_eq!(session.state().take_pending_tap(), None);
        // Selection persists until the next activation resets it.
        assert_eq!(session.state().color_space(), ColorSpaceId::Xyz);
    }

    #[tokio::test]
    async fn active_session_detects_regions() {
        let mut session = DetectionSession::new(PipelineConfig::default());
        session.activate();

        let mut frame = solid_frame(256, 128, [0, 0, 0]);
        for y in 24..120u32 {
            for x in 40..220u32 {
                let offset = ((y * 256 + x) * 3) as usize;
                frame.data[offset..offset + 3].copy_from_slice(&[230, 120, 30]);
            }
        }

        let boxes = session.process_frame(&frame);
        assert_eq!(boxes.len(), 1);

        session.deactivate();
        assert!(session.process_frame(&frame).is_empty());
    }

    #[tokio::test]
    async fn reactivation_is_idempotent() {
        let mut session = DetectionSession::new(PipelineConfig::default());
        session.activate();
        session.activate();
        assert!(session.is_active());
        session.deactivate();
        session.deactivate();
        assert!(!session.is_active());
    }
}
