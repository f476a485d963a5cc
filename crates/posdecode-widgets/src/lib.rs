//! UI widgets for the decoded position viewer
//!
//! Follows the iced 0.14 split used throughout:
//!
//! - **State structs**: Pure data ([`HeatmapState`])
//! - **View functions**: Take state + callbacks, return `Element<Message>`
//! - **Canvas Programs**: Handle custom rendering and event-to-callback translation
//!
//! The heatmap itself is painted on the CPU by `posdecode-core`; the widget
//! shows the painted panel as an image and layers the focus cursor and mouse
//! handling over it.

pub mod heatmap;
pub mod theme;

pub use heatmap::{
    heatmap_panel, HeatmapCanvas, HeatmapInteraction, HeatmapState, PanelEvent, MIN_VISIBLE_SPAN_SEC,
};
pub use theme::{CURSOR_COLOR, LABEL_COLOR, PANEL_BACKGROUND};
