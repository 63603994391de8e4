/// User interface module
///
/// - `render.rs` turns a page result into a declarative `GalleryView`
/// - `grid.rs` paints that view and the pagination bar with iced widgets

pub mod grid;
pub mod render;
