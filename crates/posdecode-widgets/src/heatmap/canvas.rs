//! Canvas program for the heatmap overlay
//!
//! Draws the focus cursor and translates mouse input into [`PanelEvent`]s:
//! a click seeks, a horizontal drag pans, the wheel zooms around the pointer.
//! It also reports the panel size so the host can paint at layout resolution.

use super::state::HeatmapState;
use crate::theme::CURSOR_COLOR;
use iced::widget::canvas::{self, Event, Frame, Geometry, Path, Program, Stroke};
use iced::{mouse, Point, Rectangle, Size, Theme};

/// Pixels the pointer must travel before a press becomes a drag
const DRAG_THRESHOLD: f32 = 3.0;

/// Zoom factor per wheel notch (applied to the visible span)
const WHEEL_ZOOM_IN: f64 = 0.8;
const WHEEL_ZOOM_OUT: f64 = 1.25;

/// User intent reported by the heatmap panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    /// Move the focus time
    Seek(f64),
    /// Shift the visible window by this many seconds
    Pan(f64),
    /// Scale the visible span by `factor`, keeping `anchor_sec` fixed
    Zoom { anchor_sec: f64, factor: f64 },
    /// Panel was laid out at a new size
    Resized(Size),
}

/// Canvas state for press/drag tracking
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatmapInteraction {
    /// Pointer x when the left button went down
    pub press_x: Option<f32>,
    /// Pointer x at the last pan step
    pub last_x: f32,
    pub dragging: bool,
}

pub struct HeatmapCanvas<'a, Message, F>
where
    F: Fn(PanelEvent) -> Message,
{
    pub state: &'a HeatmapState,
    pub on_event: F,
}

impl<'a, Message, F> HeatmapCanvas<'a, Message, F>
where
    F: Fn(PanelEvent) -> Message,
{
    fn publish(&self, event: PanelEvent) -> Option<canvas::Action<Message>> {
        Some(canvas::Action::publish((self.on_event)(event)))
    }
}

impl<'a, Message, F> Program<Message> for HeatmapCanvas<'a, Message, F>
where
    Message: Clone,
    F: Fn(PanelEvent) -> Message,
{
    type State = HeatmapInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if bounds.size() != self.state.viewport {
            log::debug!(
                "HeatmapCanvas: laid out at {}x{}",
                bounds.width,
                bounds.height
            );
            return self.publish(PanelEvent::Resized(bounds.size()));
        }

        if let Some(position) = cursor.position_in(bounds) {
            match event {
                Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                    interaction.press_x = Some(position.x);
                    interaction.last_x = position.x;
                    interaction.dragging = false;
                }
                Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                    let press_x = interaction.press_x?;
                    if !interaction.dragging && (position.x - press_x).abs() < DRAG_THRESHOLD {
                        return None;
                    }
                    interaction.dragging = true;
                    let dx = position.x - interaction.last_x;
                    interaction.last_x = position.x;
                    if dx != 0.0 {
                        // Dragging right reveals earlier times
                        let delta = -self.state.seconds_per_pixels(dx, bounds.width);
                        return self.publish(PanelEvent::Pan(delta));
                    }
                }
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                    let was_click = interaction.press_x.is_some() && !interaction.dragging;
                    interaction.press_x = None;
                    interaction.dragging = false;
                    if was_click {
                        let time = self.state.time_at(position.x, bounds.width);
                        return self.publish(PanelEvent::Seek(time));
                    }
                }
                Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                    let y = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => *y,
                        mouse::ScrollDelta::Pixels { y, .. } => *y,
                    };
                    if y == 0.0 {
                        return None;
                    }
                    let factor = if y > 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
                    let anchor_sec = self.state.time_at(position.x, bounds.width);
                    return self.publish(PanelEvent::Zoom { anchor_sec, factor });
                }
                _ => {}
            }
        } else if matches!(event, Event::Mouse(mouse::Event::ButtonReleased(_))) {
            interaction.press_x = None;
            interaction.dragging = false;
        }

        None
    }

    fn mouse_interaction(
        &self,
        interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if !cursor.is_over(bounds) {
            mouse::Interaction::default()
        } else if interaction.dragging {
            mouse::Interaction::Grabbing
        } else {
            mouse::Interaction::Crosshair
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        if let Some(x) = self
            .state
            .focus_time_sec
            .and_then(|time| self.state.x_of(time, bounds.width))
        {
            frame.stroke(
                &Path::line(Point::new(x, 0.0), Point::new(x, bounds.height)),
                Stroke::default().with_color(CURSOR_COLOR).with_width(2.0),
            );
        }

        vec![frame.into_geometry()]
    }
}
