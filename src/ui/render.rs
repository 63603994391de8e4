/// Page results to a declarative card list.
///
/// This is the only layer that turns a failed load into something the user
/// sees. Painting the result is left to `grid.rs`.

use crate::error::LoadError;
use crate::gallery::PageResult;

/// One visible image card.
///
/// The card's activation affordance carries both fields, so whatever opens
/// the image knows which slot it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub slot: u32,
    pub url: String,
}

impl Card {
    pub fn label(&self) -> String {
        format!("Image {}", self.slot)
    }
}

/// What the gallery region shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GalleryView {
    #[default]
    Loading,
    /// Every slot on the page was absent. Not an error.
    Empty,
    Error(String),
    Cards(Vec<Card>),
}

/// Build the view for a settled page load
pub fn render(outcome: &Result<PageResult, LoadError>) -> GalleryView {
    match outcome {
        Ok(page) => {
            let cards: Vec<Card> = page
                .resolved()
                .map(|(slot, url)| Card {
                    slot,
                    url: url.to_owned(),
                })
                .collect();

            if cards.is_empty() {
                GalleryView::Empty
            } else {
                GalleryView::Cards(cards)
            }
        }
        Err(err) => GalleryView::Error(err.to_string()),
    }
}
