//! flipbook - a page-turning e-book viewer
//!
//! the crate is split in two layers:
//!
//! - [`engine::FlipbookEngine`] is the page-turn state machine. it knows
//!   about pages, positions, layout modes and input, and nothing else.
//! - [`viewer::EbookViewer`] loads pdf, html or image content into pages,
//!   drives an engine and keeps the surrounding [`chrome::Chrome`] (indicator,
//!   progress, buttons, bookmarks panel) in sync.
//!
//! neither layer draws anything. the host implements [`engine::layout::Stage`]
//! and [`engine::layout::Surface`] and reads the view-models back; the `flipbook`
//! binary does this on a terminal with ratatui.

pub mod bookmarks;
pub mod chrome;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod loader;
pub mod types;
pub mod viewer;

pub use {
    error::{FlipbookError, Result},
    loader::{RawSource, Source},
    viewer::{EbookViewer, Platform, ViewerOptions},
};
