//! Heatmap view function
//!
//! ```ignore
//! fn view(&self) -> Element<Message> {
//!     let panel = heatmap_panel(&self.heatmap, Message::Panel);
//!     column![panel, controls].into()
//! }
//! ```

use super::canvas::{HeatmapCanvas, PanelEvent};
use super::state::HeatmapState;
use crate::theme::PANEL_BACKGROUND;
use iced::widget::image::FilterMethod;
use iced::widget::{container, image, stack, Canvas};
use iced::{Background, ContentFit, Element, Length};

/// Heatmap image with the focus cursor and mouse handling layered on top
///
/// `on_event` receives seeks, pans, zooms and panel resizes.
pub fn heatmap_panel<'a, Message>(
    state: &'a HeatmapState,
    on_event: impl Fn(PanelEvent) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let background: Element<'a, Message> = match &state.image {
        // The panel is painted at layout size; nearest filtering keeps
        // probability bins crisp when it is stretched during a resize
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Fill)
            .filter_method(FilterMethod::Nearest)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => container("")
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(PANEL_BACKGROUND)),
                ..container::Style::default()
            })
            .into(),
    };

    let overlay = Canvas::new(HeatmapCanvas { state, on_event })
        .width(Length::Fill)
        .height(Length::Fill);

    stack![background, overlay]
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
