//! Frame-based animation state and its reducer

/// Anything that can be placed on the time axis
pub trait Timestamped {
    /// Time of this frame in seconds
    fn time_sec(&self) -> f64;
}

impl Timestamped for f64 {
    fn time_sec(&self) -> f64 {
        *self
    }
}

/// Playback state over an ordered sequence of frames
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState<T> {
    pub frame_data: Vec<T>,
    pub current_frame_index: usize,
    pub playing: bool,
    /// Frames skipped per [`AnimationAction::Advance`]
    pub frames_per_tick: usize,
}

impl<T> Default for AnimationState<T> {
    fn default() -> Self {
        Self {
            frame_data: Vec::new(),
            current_frame_index: 0,
            playing: false,
            frames_per_tick: 1,
        }
    }
}

/// Actions accepted by [`AnimationState::apply`]
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationAction<T> {
    /// Replace the frames and rewind
    SetFrameData(Vec<T>),
    /// Jump to a frame (clamped into the data)
    SetCurrentFrame { new_index: usize },
    /// Step forward by `frames_per_tick`; pauses at the last frame
    Advance,
    Play,
    Pause,
    TogglePlayback,
    SkipToStart,
    SkipToEnd,
    SetFramesPerTick(usize),
}

impl<T> AnimationState<T> {
    pub fn new(frame_data: Vec<T>, frames_per_tick: usize) -> Self {
        Self {
            frame_data,
            frames_per_tick: frames_per_tick.max(1),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame_data.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.frame_data.len().saturating_sub(1)
    }

    pub fn current_frame(&self) -> Option<&T> {
        self.frame_data.get(self.current_frame_index)
    }

    pub fn is_at_end(&self) -> bool {
        self.current_frame_index >= self.last_index()
    }

    pub fn apply(&mut self, action: AnimationAction<T>) {
        match action {
            AnimationAction::SetFrameData(frames) => {
                self.frame_data = frames;
                self.current_frame_index = 0;
                self.playing = false;
            }
            AnimationAction::SetCurrentFrame { new_index } => {
                self.current_frame_index = new_index.min(self.last_index());
            }
            AnimationAction::Advance => {
                let next = self.current_frame_index.saturating_add(self.frames_per_tick);
                if next >= self.last_index() {
                    self.current_frame_index = self.last_index();
                    self.playing = false;
                } else {
                    self.current_frame_index = next;
                }
            }
            AnimationAction::Play => self.play(),
            AnimationAction::Pause => self.playing = false,
            AnimationAction::TogglePlayback => {
                if self.playing {
                    self.playing = false;
                } else {
                    self.play();
                }
            }
            AnimationAction::SkipToStart => self.current_frame_index = 0,
            AnimationAction::SkipToEnd => {
                self.current_frame_index = self.last_index();
                self.playing = false;
            }
            AnimationAction::SetFramesPerTick(frames) => self.frames_per_tick = frames.max(1),
        }
    }

    fn play(&mut self) {
        if self.frame_data.len() < 2 {
            return;
        }
        // Playing from the last frame starts over
        if self.is_at_end() {
            self.current_frame_index = 0;
        }
        self.playing = true;
    }
}

impl<T: Timestamped> AnimationState<T> {
    /// Time of the current frame
    pub fn current_time(&self) -> Option<f64> {
        self.current_frame().map(Timestamped::time_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(n: usize) -> AnimationState<f64> {
        AnimationState::new((0..n).map(|i| i as f64 * 0.5).collect(), 1)
    }

    #[test]
    fn test_set_current_frame_clamps() {
        let mut s = state(5);
        s.apply(AnimationAction::SetCurrentFrame { new_index: 3 });
        assert_eq!(s.current_frame_index, 3);
        assert_eq!(s.current_time(), Some(1.5));
        s.apply(AnimationAction::SetCurrentFrame { new_index: 99 });
        assert_eq!(s.current_frame_index, 4);
    }

    #[test]
    fn test_advance_stops_at_end() {
        let mut s = state(5);
        s.apply(AnimationAction::SetFramesPerTick(3));
        s.apply(AnimationAction::Play);
        s.apply(AnimationAction::Advance);
        assert_eq!(s.current_frame_index, 3);
        assert!(s.playing);
        s.apply(AnimationAction::Advance);
        assert_eq!(s.current_frame_index, 4);
        assert!(!s.playing, "reaching the last frame pauses playback");
    }

    #[test]
    fn test_play_from_end_restarts() {
        let mut s = state(5);
        s.apply(AnimationAction::SkipToEnd);
        s.apply(AnimationAction::TogglePlayback);
        assert!(s.playing);
        assert_eq!(s.current_frame_index, 0);
        s.apply(AnimationAction::TogglePlayback);
        assert!(!s.playing);
    }

    #[test]
    fn test_set_frame_data_rewinds() {
        let mut s = state(5);
        s.apply(AnimationAction::SetCurrentFrame { new_index: 2 });
        s.apply(AnimationAction::Play);
        s.apply(AnimationAction::SetFrameData(vec![10.0, 11.0]));
        assert_eq!(s.current_frame_index, 0);
        assert!(!s.playing);
        assert_eq!(s.current_time(), Some(10.0));
    }

    #[test]
    fn test_empty_state_is_inert() {
        let mut s: AnimationState<f64> = AnimationState::default();
        s.apply(AnimationAction::Play);
        s.apply(AnimationAction::Advance);
        s.apply(AnimationAction::SetCurrentFrame { new_index: 4 });
        assert!(!s.playing);
        assert_eq!(s.current_frame_index, 0);
        assert_eq!(s.current_time(), None);
    }
}
