//! Ranked full-text search and the windowed timeline view.

mod text_search;
mod timeline;
