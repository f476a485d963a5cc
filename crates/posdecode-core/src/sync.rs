//! Reconciles the animation frame index with an externally driven focus time
//!
//! Either side may move: playback advances the frame index, a user scrub
//! moves the focus time. The synchronizer remembers the focus time it last
//! expected to see. If the incoming focus time still equals it, the frame
//! index must have moved and its time is pushed outward; otherwise the
//! focus was moved externally and the matching frame is selected. Calls
//! must be serialized; the expected time is plain owned state.

use crate::animation::{AnimationState, Timestamped};
use crate::types::SYNC_TOLERANCE_MIN_FRAMES;

/// Sorted frame times supporting "last frame at or before" lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameTimeIndex {
    times: Vec<f64>,
    /// End of the last frame; the last frame start when unknown
    end_time: Option<f64>,
}

impl FrameTimeIndex {
    pub fn new(times: Vec<f64>) -> Self {
        debug_assert!(
            times.windows(2).all(|w| w[0] <= w[1]),
            "frame times must be ordered"
        );
        Self {
            times,
            end_time: None,
        }
    }

    pub fn from_frames<T: Timestamped>(frames: &[T]) -> Self {
        Self::new(frames.iter().map(Timestamped::time_sec).collect())
    }

    /// Extend lookups through the last frame's interval up to `end_time`
    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Index of the last frame whose time is `<= time`
    ///
    /// `None` before the first frame, past the end of the last frame, or
    /// for NaN.
    pub fn find(&self, time: f64) -> Option<usize> {
        let first = *self.times.first()?;
        let last = *self.times.last()?;
        let end = self.end_time.map_or(last, |end| end.max(last));
        if time.is_nan() || time < first || time > end {
            return None;
        }
        self.times.partition_point(|&t| t <= time).checked_sub(1)
    }
}

/// Update the host must route to the other side
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncAction {
    /// Playback moved: set the external focus time
    PushFocusTime { time: f64, auto_scroll: bool },
    /// The focus moved: select this frame
    SetCurrentFrame { index: usize },
}

#[derive(Debug, Clone, Default)]
pub struct TimeSynchronizer {
    expected_focus_time: Option<f64>,
    tolerance_frames: Option<usize>,
}

impl TimeSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat focus times within `frames` frames of the current frame as in sync
    pub fn with_tolerance(tolerance_frames: Option<usize>) -> Self {
        Self {
            expected_focus_time: None,
            tolerance_frames,
        }
    }

    pub fn expected_focus_time(&self) -> Option<f64> {
        self.expected_focus_time
    }

    /// Decide which side changed since the last call
    ///
    /// `index` must describe `state.frame_data`.
    pub fn reconcile<T: Timestamped>(
        &mut self,
        state: &AnimationState<T>,
        focus_time: Option<f64>,
        index: &FrameTimeIndex,
    ) -> Option<SyncAction> {
        let focus_time = focus_time?;
        let first_time = state.frame_data.first()?.time_sec();

        if self.within_tolerance(state, focus_time) {
            self.expected_focus_time = Some(focus_time);
            return None;
        }

        let Some(expected) = self.expected_focus_time else {
            self.expected_focus_time = Some(first_time);
            return None;
        };

        if focus_time == expected {
            let frame_time = state.current_time()?;
            self.expected_focus_time = Some(frame_time);
            Some(SyncAction::PushFocusTime {
                time: frame_time,
                auto_scroll: true,
            })
        } else {
            self.expected_focus_time = Some(focus_time);
            let matched = index.find(focus_time);
            if matched.is_none() {
                log::debug!("Focus time {} is outside the loaded frames", focus_time);
            }
            matched.map(|index| SyncAction::SetCurrentFrame { index })
        }
    }

    fn within_tolerance<T: Timestamped>(&self, state: &AnimationState<T>, focus_time: f64) -> bool {
        let Some(tolerance) = self.tolerance_frames else {
            return false;
        };
        if state.frame_data.len() < SYNC_TOLERANCE_MIN_FRAMES {
            return false;
        }
        let current = state.current_frame_index.min(state.last_index());
        let lower = current.saturating_sub(tolerance);
        let upper = (current + tolerance).min(state.last_index());
        let lower_time = state.frame_data[lower].time_sec();
        let upper_time = state.frame_data[upper].time_sec();
        lower_time <= focus_time && focus_time <= upper_time
    }
}
