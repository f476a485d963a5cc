//! Shared colours for the heatmap widgets

use iced::Color;

/// Focus time cursor
pub const CURSOR_COLOR: Color = Color::from_rgb(1.0, 0.35, 0.35);

/// Shown where no heatmap has been painted yet
pub const PANEL_BACKGROUND: Color = Color::from_rgb(0.08, 0.08, 0.1);

/// Label text for the time readout
pub const LABEL_COLOR: Color = Color::from_rgb(0.8, 0.8, 0.8);
