// THEORY:
// `TrackingState` is the only bridge between the two execution contexts: the
// frame-processing context reads it on every frame, the control context
// writes it from taps and the periodic poller. It is modeled as a register
// per field rather than one big locked struct, so a reader can never observe
// a torn value and a writer never blocks frame processing for long.
//
// Key architectural principles:
// 1.  **Throttled writes**: each named field accepts at most one update per
//     `WRITE_THROTTLE` interval, and an update equal to the current value is
//     dropped. Suppression is silent — it is flow control, not an error.
// 2.  **Derived thresholds**: the threshold set is never written directly
//     from outside; it is recomputed from (color space, target color)
//     whenever either changes, and replaced atomically or not at all.
// 3.  **Never blocking the producer**: every lock here is held only for a
//     clone or a swap. The frame pipeline falls back to a hardcoded range
//     when the set is empty rather than waiting for the control context.

use crate::core_modules::color_space::{self, ColorSpaceId, ThresholdSet};
use crate::core_modules::pixel::pixel::ColorSample;
use crate::error::Result;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum spacing between accepted writes to one field.
pub const WRITE_THROTTLE: Duration = Duration::from_millis(50);

/// The target color a fresh session starts with.
pub const DEFAULT_TARGET_COLOR: ColorSample = ColorSample::new(230, 120, 30);

pub const DEFAULT_COLOR_SPACE: ColorSpaceId = ColorSpaceId::Hsv;

/// A tap coordinate in original-frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapPoint {
    pub x: i64,
    pub y: i64,
}

/// A single-value register with write throttling and equal-value suppression.
struct ThrottledCell<T> {
    inner: Mutex<(T, Option<Instant>)>,
}

impl<T: Clone + PartialEq> ThrottledCell<T> {
    fn new(value: T) -> Self {
        Self {
            inner: Mutex::new((value, None)),
        }
    }

    fn get(&self) -> T {
        self.inner.lock().unwrap().0.clone()
    }

    /// Returns true when the write was applied.
    fn set(&self, value: T) -> bool {
        let mut guard = self.inner.lock().unwrap();
        if guard.0 == value {
            return false;
        }
        if let Some(last) = guard.1 {
            if last.elapsed() < WRITE_THROTTLE {
                return false;
            }
        }
        *guard = (value, Some(Instant::now()));
        true
    }

    /// Unthrottled replacement, used only by session reset.
    fn force(&self, value: T) {
        *self.inner.lock().unwrap() = (value, None);
    }
}

/// Cross-thread shared state for one detection session.
pub struct TrackingState {
    color_space: ThrottledCell<ColorSpaceId>,
    target_color: ThrottledCell<ColorSample>,
    thresholds: Mutex<ThresholdSet>,
    pending_tap: Mutex<Option<TapPoint>>,
}

impl TrackingState {
    pub fn new() -> Self {
        let state = Self {
            color_space: ThrottledCell::new(DEFAULT_COLOR_SPACE),
            target_color: ThrottledCell::new(DEFAULT_TARGET_COLOR),
            thresholds: Mutex::new(Vec::new()),
            pending_tap: Mutex::new(None),
        };
        state.refresh_thresholds();
        state
    }

    pub fn color_space(&self) -> ColorSpaceId {
        self.color_space.get()
    }

    /// Applies a new color space, re-deriving thresholds on success. Returns
    /// false when the throttle or equal-value suppression dropped the write.
    pub fn set_color_space(&self, space: ColorSpaceId) -> bool {
        let applied = self.color_space.set(space);
        if applied {
            self.refresh_thresholds();
        }
        applied
    }

    /// Name-based variant for external control surfaces. An unrecognized
    /// name is an error and the prior space stays in effect.
    pub fn request_color_space(&self, name: &str) -> Result<()> {
        let space = match ColorSpaceId::from_name(name) {
            Ok(space) => space,
            Err(error) => {
                log::warn!("color space request rejected: {error}");
                return Err(error);
            }
        };
        self.set_color_space(space);
        Ok(())
    }

    pub fn target_color(&self) -> ColorSample {
        self.target_color.get()
    }

    /// Applies a new target color, re-deriving thresholds on success.
    pub fn set_target_color(&self, color: ColorSample) -> bool {
        let applied = self.target_color.set(color);
        if applied {
            self.refresh_thresholds();
        }
        applied
    }

    /// Snapshot of the current derived threshold set.
    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds.lock().unwrap().clone()
    }

    /// Recomputes the threshold set from the current (space, target color)
    /// pair and swaps it in whole. The periodic poller calls this to
    /// reconcile any selection change; it is idempotent.
    pub fn refresh_thresholds(&self) {
        let space = self.color_space.get();
        let target = self.target_color.get();
        let category = color_space::closest_category(target, space);
        let derived = color_space::bounds(space, category);

        let mut guard = self.thresholds.lock().unwrap();
        if *guard != derived {
            log::debug!(
                "thresholds re-derived: space={} category={} ranges={}",
                space.name(),
                category.name(),
                derived.len()
            );
            *guard = derived;
        }
    }

    pub fn set_pending_tap(&self, tap: TapPoint) {
        *self.pending_tap.lock().unwrap() = Some(tap);
    }

    /// Consumes the pending tap, if any. The frame pipeline calls this once
    /// per frame.
    pub fn take_pending_tap(&self) -> Option<TapPoint> {
        self.pending_tap.lock().unwrap().take()
    }

    /// Re-activation entry point: default space and target, thresholds
    /// re-derived, pending tap cleared. Bypasses the write throttle.
    pub fn reset_to_defaults(&self) {
        self.color_space.force(DEFAULT_COLOR_SPACE);
        self.target_color.force(DEFAULT_TARGET_COLOR);
        self.refresh_thresholds();
        *self.pending_tap.lock().unwrap() = None;
    }

    /// Deactivation teardown: transient state only. Space and target color
    /// persist until the next explicit reset.
    pub fn teardown(&self) {
        *self.pending_tap.lock().unwrap() = None;
    }
}

impl Default for TrackingState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::classifier::CoarseColor;
    use std::thread::sleep;

    #[test]
    fn defaults_derive_orange_hsv_thresholds() {
        let state = TrackingState::new();
        assert_eq!(state.color_space(), ColorSpaceId::Hsv);
        assert_eq!(state.target_color(), DEFAULT_TARGET_COLOR);
        let expected =
            color_space::bounds(ColorSpaceId::Hsv, CoarseColor::Orange);
        assert_eq!(state.thresholds(), expected);
    }

    #[test]
    fn writes_within_the_throttle_window_are_dropped() {
        let state = TrackingState::new();

        assert!(state.set_color_space(ColorSpaceId::Lab));
        // Second distinct write inside 50 ms: suppressed, first one holds.
        assert!(!state.set_color_space(ColorSpaceId::Xyz));
        assert_eq!(state.color_space(), ColorSpaceId::Lab);

        sleep(WRITE_THROTTLE + Duration::from_millis(10));
        assert!(state.set_color_space(ColorSpaceId::Xyz));
        assert_eq!(state.color_space(), ColorSpaceId::Xyz);
    }

    #[test]
    fn equal_value_writes_are_dropped_without_consuming_the_window() {
        let state = TrackingState::new();
        assert!(!state.set_color_space(DEFAULT_COLOR_SPACE));
        // The no-op above must not have started a throttle window.
        assert!(state.set_color_space(ColorSpaceId::Bgr));
    }

    #[test]
    fn color_space_change_rederives_thresholds() {
        let state = TrackingState::new();
        state.set_color_space(ColorSpaceId::Bgr);
        let expected =
            color_space::bounds(ColorSpaceId::Bgr, CoarseColor::Orange);
        assert_eq!(state.thresholds(), expected);
    }

    #[test]
    fn unsupported_space_is_a_no_op_error() {
        let state = TrackingState::new();
        assert!(state.request_color_space("YUV").is_err());
        assert_eq!(state.color_space(), ColorSpaceId::Hsv);
    }

    #[test]
    fn pending_tap_is_consumed_once() {
        let state = TrackingState::new();
        state.set_pending_tap(TapPoint { x: 12, y: 34 });
        assert_eq!(state.take_pending_tap(), Some(TapPoint { x: 12, y: 34 }));
        assert_eq!(state.take_pending_tap(), None);
    }

    #[test]
    fn reset_restores_defaults_and_clears_tap() {
        let state = TrackingState::new();
        state.set_color_space(ColorSpaceId::Lab);
        state.set_pending_tap(TapPoint { x: 1, y: 1 });

        state.reset_to_defaults();
        assert_eq!(state.color_space(), ColorSpaceId::Hsv);
        assert_eq!(state.target_color(), DEFAULT_TARGET_COLOR);
        assert_eq!(state.take_pending_tap(), None);
    }

    #[test]
    fn target_color_change_rederives_thresholds() {
        let state = TrackingState::new();
        sleep(WRITE_THROTTLE + Duration::from_millis(10));
        assert!(state.set_target_color(ColorSample::new(30, 40, 220)));
        let expected =
            color_space::bounds(ColorSpaceId::Hsv, CoarseColor::Blue);
        assert_eq!(state.thresholds(), expected);
    }
}
