/// State management module
///
/// This module handles all gallery state, including:
/// - Current page, page count and the loading lock (pagination.rs)
/// - The per-folder session tying cache, loader and view together (session.rs)

pub mod pagination;
pub mod session;
