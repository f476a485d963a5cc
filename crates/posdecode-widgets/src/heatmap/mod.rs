//! Decoded position heatmap panel
//!
//! - `state`: visible window, focus time and the painted panel image
//! - `canvas`: cursor drawing plus click-to-seek, drag-to-pan, wheel-to-zoom
//! - `view`: the `heatmap_panel` view function stacking both

mod canvas;
mod state;
mod view;

pub use canvas::{HeatmapCanvas, HeatmapInteraction, PanelEvent};
pub use state::{HeatmapState, MIN_VISIBLE_SPAN_SEC};
pub use view::heatmap_panel;
