use iced::widget::{button, column, container, image, text, Column, Row, Space};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::pagination::PaginationControls;
use crate::ui::render::{Card, GalleryView};
use crate::Message;

/// Height of the image area of a card, in logical pixels
const CARD_IMAGE_HEIGHT: f32 = 220.0;

const SPACING: f32 = 12.0;

/// Paint the gallery region for the current view
pub fn gallery<'a>(view: &'a GalleryView, columns: u32) -> Element<'a, Message> {
    match view {
        GalleryView::Loading => notice(text("Loading images…")),
        GalleryView::Empty => notice(text("No images found on this page.")),
        GalleryView::Error(_) => notice(text("Error loading images.").style(text::danger)),
        GalleryView::Cards(cards) => {
            let columns = columns.max(1) as usize;
            let rows = cards.chunks(columns).map(|chunk| -> Element<'a, Message> {
                let mut line = Row::with_children(chunk.iter().map(card)).spacing(SPACING);
                // Keep card widths uniform on a short last row
                for _ in chunk.len()..columns {
                    line = line.push(Space::with_width(Length::Fill));
                }
                line.into()
            });
            Column::with_children(rows).spacing(SPACING).into()
        }
    }
}

/// One card; pressing it hands the slot and URL to the image viewer
fn card(card: &Card) -> Element<'_, Message> {
    let picture = image(image::Handle::from_path(card.url.as_str()))
        .width(Length::Fill)
        .height(Length::Fixed(CARD_IMAGE_HEIGHT))
        .content_fit(ContentFit::Cover);

    let body = column![picture, text(card.label()).size(14)]
        .spacing(6)
        .align_x(Alignment::Center);

    button(body)
        .on_press(Message::OpenImage {
            slot: card.slot,
            url: card.url.clone(),
        })
        .padding(6)
        .width(Length::Fill)
        .style(button::secondary)
        .into()
}

fn notice<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .padding(32)
        .center_x(Length::Fill)
        .into()
}

/// Prev, the numbered window, Next
pub fn pagination_bar<'a>(controls: PaginationControls) -> Element<'a, Message> {
    let mut bar = Row::new().spacing(8).align_y(Alignment::Center);

    bar = bar.push(
        button(text("Prev"))
            .on_press_maybe(controls.previous_enabled.then_some(Message::PreviousPage))
            .style(button::secondary),
    );

    for page in &controls.pages {
        let style = if page.is_current {
            button::primary
        } else {
            button::secondary
        };
        bar = bar.push(
            button(text(page.page.to_string()))
                .on_press_maybe(page.enabled.then_some(Message::GoToPage(page.page)))
                .style(style),
        );
    }

    bar = bar.push(
        button(text("Next"))
            .on_press_maybe(controls.next_enabled.then_some(Message::NextPage))
            .style(button::secondary),
    );

    container(bar).center_x(Length::Fill).into()
}
