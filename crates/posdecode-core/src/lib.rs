//! Posdecode Core - Rendering pipeline for decoded position heatmaps

pub mod animation;
pub mod color;
pub mod config;
pub mod data;
pub mod downsample;
pub mod error;
pub mod offscreen;
pub mod panel;
pub mod plot;
pub mod raster;
pub mod runs;
pub mod sync;
pub mod types;

pub use animation::{AnimationAction, AnimationState, Timestamped};
pub use color::{ColorScale, ColorStyles};
pub use data::{load_data, DecodedPositionData};
pub use downsample::{DownsampleMode, DownsampledSeries};
pub use error::{CacheError, DataError, EncodeError, PlotError};
pub use offscreen::{CacheUpdate, ColumnPainter, OffscreenCache, PositionLayout, RunPainter};
pub use panel::{paint_panel, PanelProps};
pub use plot::DecodedPositionPlot;
pub use raster::{PixelBuffer, RasterSurface, Rgba};
pub use runs::{Run, TimeColumn};
pub use sync::{FrameTimeIndex, SyncAction, TimeSynchronizer};
pub use types::*;
