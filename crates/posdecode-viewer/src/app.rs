//! Viewer application state and message handling
//!
//! Playback and user seeks meet in the [`TimeSynchronizer`]: a tick advances
//! the animation and the synchronizer pushes the new frame time out to the
//! focus cursor; a click moves the focus cursor and the synchronizer selects
//! the matching frame.

use std::time::Duration;

use iced::widget::{button, checkbox, column, container, row, text, Space};
use iced::{time, Center, Element, Fill, Subscription, Task, Theme};
use posdecode_core::config::PlaybackConfig;
use posdecode_core::{
    AnimationAction, AnimationState, DecodedPositionPlot, FrameTimeIndex, PixelBuffer,
    SyncAction, TimeSynchronizer,
};
use posdecode_widgets::{heatmap_panel, HeatmapState, PanelEvent, LABEL_COLOR, MIN_VISIBLE_SPAN_SEC};

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    TogglePlayback,
    SkipToStart,
    SkipToEnd,
    ToggleOverlay(bool),
    Panel(PanelEvent),
}

pub struct ViewerApp {
    plot: DecodedPositionPlot,
    heatmap: HeatmapState,
    animation: AnimationState<f64>,
    frame_index: FrameTimeIndex,
    sync: TimeSynchronizer,
    /// Externally visible time cursor
    focus_time: Option<f64>,
    show_overlay: bool,
    tick_interval: Duration,
    /// Full data extent in seconds
    data_range: (f64, f64),
}

impl ViewerApp {
    pub fn new(plot: DecodedPositionPlot, playback: &PlaybackConfig) -> Self {
        let frame_times = plot.data().frame_times();
        let data_range = (plot.data().start_time_sec(), plot.data().end_time_sec());
        let frame_index = FrameTimeIndex::new(frame_times.clone()).with_end_time(data_range.1);
        let animation = AnimationState::new(frame_times, playback.frames_per_tick);

        let mut app = Self {
            plot,
            heatmap: HeatmapState::new(data_range.0, data_range.1),
            focus_time: animation.current_time(),
            animation,
            frame_index,
            sync: TimeSynchronizer::with_tolerance(playback.sync_tolerance_frames),
            show_overlay: false,
            tick_interval: Duration::from_millis(playback.tick_interval_ms.max(1)),
            data_range,
        };
        app.heatmap.focus_time_sec = app.focus_time;
        // First reconciliation only establishes the baseline
        app.synchronize();
        app
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                if self.animation.playing {
                    self.animation.apply(AnimationAction::Advance);
                    self.synchronize();
                }
            }
            Message::TogglePlayback => {
                self.animation.apply(AnimationAction::TogglePlayback);
                self.synchronize();
            }
            Message::SkipToStart => {
                self.animation.apply(AnimationAction::SkipToStart);
                self.synchronize();
            }
            Message::SkipToEnd => {
                self.animation.apply(AnimationAction::SkipToEnd);
                self.synchronize();
            }
            Message::ToggleOverlay(show) => {
                self.show_overlay = show;
                self.plot.set_show_overlay(show);
                self.repaint();
            }
            Message::Panel(event) => self.handle_panel_event(event),
        }
        Task::none()
    }

    fn handle_panel_event(&mut self, event: PanelEvent) {
        match event {
            PanelEvent::Seek(time) => {
                self.set_focus(time, false);
                self.synchronize();
            }
            PanelEvent::Pan(delta) => {
                let window = pan_window(self.visible_window(), delta, self.data_range);
                self.set_visible_window(window);
            }
            PanelEvent::Zoom { anchor_sec, factor } => {
                let window = zoom_window(self.visible_window(), anchor_sec, factor, self.data_range);
                self.set_visible_window(window);
            }
            PanelEvent::Resized(size) => {
                self.heatmap.viewport = size;
                let (width, height) = (size.width.max(0.0) as usize, size.height.max(0.0) as usize);
                if let Err(e) = self.plot.set_viewport(width, height) {
                    log::error!("Failed to resize heatmap: {}", e);
                }
                self.repaint();
            }
        }
    }

    /// Route whichever side changed to the other one
    fn synchronize(&mut self) {
        // A frame change applied here echoes once so the cursor snaps to the frame
        for _ in 0..2 {
            match self
                .sync
                .reconcile(&self.animation, self.focus_time, &self.frame_index)
            {
                Some(SyncAction::SetCurrentFrame { index }) => {
                    self.animation
                        .apply(AnimationAction::SetCurrentFrame { new_index: index });
                }
                Some(SyncAction::PushFocusTime { time, auto_scroll }) => {
                    self.set_focus(time, auto_scroll);
                    break;
                }
                None => break,
            }
        }
    }

    fn set_focus(&mut self, time: f64, auto_scroll: bool) {
        self.focus_time = Some(time);
        self.heatmap.focus_time_sec = Some(time);
        if auto_scroll {
            let window = self.visible_window();
            let scrolled = scroll_to_include(window, time, self.data_range);
            if scrolled != window {
                self.set_visible_window(scrolled);
            }
        }
    }

    fn visible_window(&self) -> (f64, f64) {
        (self.heatmap.visible_start_sec, self.heatmap.visible_end_sec)
    }

    fn set_visible_window(&mut self, (start, end): (f64, f64)) {
        self.heatmap.visible_start_sec = start;
        self.heatmap.visible_end_sec = end;
        if let Err(e) = self.plot.set_visible_range(Some(start), Some(end)) {
            log::error!("Failed to update visible range {:.3}-{:.3}: {}", start, end, e);
            return;
        }
        self.repaint();
    }

    /// Paint the panel at layout size and hand it to the widget
    fn repaint(&mut self) {
        let (width, height) = self.plot.viewport();
        let mut panel = PixelBuffer::new(width, height);
        self.plot.paint(&mut panel);
        self.heatmap.set_panel(&panel);
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.animation.playing {
            time::every(self.tick_interval).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let panel = heatmap_panel(&self.heatmap, Message::Panel);

        let play_label = if self.animation.playing { "Pause" } else { "Play" };
        let mut overlay_toggle = checkbox(self.show_overlay)
            .label("Show actual position overlay")
            .size(16);
        if self.plot.has_overlay() {
            overlay_toggle = overlay_toggle.on_toggle(Message::ToggleOverlay);
        }

        let time_label = match self.focus_time {
            Some(time) => format!(
                "{:.3} s  (frame {} of {})",
                time,
                self.animation.current_frame_index + 1,
                self.animation.frame_data.len()
            ),
            None => String::from("no data"),
        };

        let controls = row![
            button(text("|<")).on_press(Message::SkipToStart),
            button(text(play_label)).on_press(Message::TogglePlayback),
            button(text(">|")).on_press(Message::SkipToEnd),
            Space::new().width(20),
            overlay_toggle,
            Space::new().width(Fill),
            text(time_label).size(14).color(LABEL_COLOR),
        ]
        .spacing(10)
        .align_y(Center)
        .padding(5);

        container(column![panel, controls].spacing(10).padding(10))
            .width(Fill)
            .height(Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Keep a window of fixed span inside the data extent
fn clamp_window(start: f64, span: f64, (data_start, data_end): (f64, f64)) -> (f64, f64) {
    let span = span.min(data_end - data_start);
    let start = start.clamp(data_start, (data_end - span).max(data_start));
    (start, start + span)
}

/// Shift the window by `delta` seconds
fn pan_window((start, end): (f64, f64), delta: f64, data: (f64, f64)) -> (f64, f64) {
    clamp_window(start + delta, end - start, data)
}

/// Scale the window span by `factor` around `anchor`
fn zoom_window((start, end): (f64, f64), anchor: f64, factor: f64, data: (f64, f64)) -> (f64, f64) {
    let span = end - start;
    let new_span = (span * factor).clamp(MIN_VISIBLE_SPAN_SEC, (data.1 - data.0).max(MIN_VISIBLE_SPAN_SEC));
    let ratio = if span > 0.0 { (anchor - start) / span } else { 0.5 };
    clamp_window(anchor - ratio * new_span, new_span, data)
}

/// Re-centre the window on `time` when it has left the window
fn scroll_to_include((start, end): (f64, f64), time: f64, data: (f64, f64)) -> (f64, f64) {
    if time >= start && time <= end {
        return (start, end);
    }
    let span = end - start;
    clamp_window(time - span / 2.0, span, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posdecode_core::config::PlotConfig;
    use posdecode_core::DecodedPositionData;

    const DATA: (f64, f64) = (0.0, 10.0);

    fn app(frames: usize) -> ViewerApp {
        let data = DecodedPositionData {
            values: vec![100; frames],
            positions: (0..frames).map(|f| (f % 4) as u32).collect(),
            frame_bounds: vec![1; frames],
            positions_key: vec![1.0, 2.0, 3.0, 4.0],
            start_time_sec: Some(0.0),
            sampling_frequency_hz: Some(10.0),
            observed_positions: None,
        };
        let config = PlotConfig::default();
        let plot = DecodedPositionPlot::new(data, &config).unwrap();
        ViewerApp::new(plot, &config.playback)
    }

    #[test]
    fn test_pan_is_clamped() {
        assert_eq!(pan_window((2.0, 4.0), 1.0, DATA), (3.0, 5.0));
        assert_eq!(pan_window((2.0, 4.0), -5.0, DATA), (0.0, 2.0));
        assert_eq!(pan_window((7.0, 9.0), 5.0, DATA), (8.0, 10.0));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let (start, end) = zoom_window((0.0, 10.0), 5.0, 0.5, DATA);
        assert_eq!((start, end), (2.5, 7.5));
        // Zooming out past the data shows everything
        assert_eq!(zoom_window((2.0, 8.0), 5.0, 4.0, DATA), (0.0, 10.0));
        let (start, end) = zoom_window((0.0, 0.02), 0.01, 0.01, DATA);
        assert!((end - start - MIN_VISIBLE_SPAN_SEC).abs() < 1e-12);
    }

    #[test]
    fn test_scroll_to_include() {
        assert_eq!(scroll_to_include((2.0, 4.0), 3.0, DATA), (2.0, 4.0));
        assert_eq!(scroll_to_include((2.0, 4.0), 6.0, DATA), (5.0, 7.0));
        assert_eq!(scroll_to_include((2.0, 4.0), 9.9, DATA), (8.0, 10.0));
    }

    #[test]
    fn test_seek_selects_frame() {
        let mut app = app(50);
        app.update(Message::Panel(PanelEvent::Seek(2.0)));
        assert_eq!(app.animation.current_frame_index, 20);
        assert_eq!(app.focus_time, Some(2.0));
    }

    #[test]
    fn test_playback_moves_cursor() {
        let mut app = app(50);
        app.update(Message::TogglePlayback);
        assert!(app.animation.playing);
        app.update(Message::Tick);
        app.update(Message::Tick);
        assert_eq!(app.animation.current_frame_index, 2);
        assert_eq!(app.focus_time, Some(0.2));
        assert_eq!(app.heatmap.focus_time_sec, Some(0.2));
    }

    #[test]
    fn test_seek_then_play_continues_from_seek() {
        let mut app = app(50);
        app.update(Message::Panel(PanelEvent::Seek(3.0)));
        app.update(Message::TogglePlayback);
        app.update(Message::Tick);
        assert_eq!(app.animation.current_frame_index, 31);
        assert_eq!(app.focus_time, Some(app.animation.frame_data[31]));
    }

    #[test]
    fn test_resize_paints_panel() {
        let mut app = app(50);
        assert!(app.heatmap.image.is_none());
        app.update(Message::Panel(PanelEvent::Resized(iced::Size::new(120.0, 40.0))));
        assert!(app.heatmap.image.is_some());
        assert_eq!(app.plot.viewport(), (120, 40));
    }
}
