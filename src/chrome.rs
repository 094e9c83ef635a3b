//! the viewer's surrounding ui as plain data
//!
//! [`Chrome`] is what a host draws around the flipbook: title, page
//! indicator, progress, button states, loading overlay and bookmarks panel.
//! the viewer keeps it in sync; hosts only read it.

use crate::types::PageChange;

/// the fixed element ids a host page provides
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Viewer,
    Title,
    PageIndicator,
    ProgressBar,
    LoadingOverlay,
    LoadingText,
    FlipbookContainer,
    Flipbook,
    BtnPrev,
    BtnNext,
    MobilePrev,
    MobileNext,
    PageInput,
    PageTotal,
    BtnFullscreen,
    BtnBookmark,
    BookmarksPanel,
    BookmarksList,
    BtnCloseBookmarks,
}

impl ElementId {
    /// every id, in markup order
    pub const ALL: [Self; 19] = [
        Self::Viewer,
        Self::Title,
        Self::PageIndicator,
        Self::ProgressBar,
        Self::LoadingOverlay,
        Self::LoadingText,
        Self::FlipbookContainer,
        Self::Flipbook,
        Self::BtnPrev,
        Self::BtnNext,
        Self::MobilePrev,
        Self::MobileNext,
        Self::PageInput,
        Self::PageTotal,
        Self::BtnFullscreen,
        Self::BtnBookmark,
        Self::BookmarksPanel,
        Self::BookmarksList,
        Self::BtnCloseBookmarks,
    ];

    /// the `id` attribute value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "ebook-viewer",
            Self::Title => "ebook-title",
            Self::PageIndicator => "page-indicator",
            Self::ProgressBar => "progress-bar",
            Self::LoadingOverlay => "loading-overlay",
            Self::LoadingText => "loading-text",
            Self::FlipbookContainer => "flipbook-container",
            Self::Flipbook => "flipbook",
            Self::BtnPrev => "btn-prev",
            Self::BtnNext => "btn-next",
            Self::MobilePrev => "mobile-prev",
            Self::MobileNext => "mobile-next",
            Self::PageInput => "page-input",
            Self::PageTotal => "page-total",
            Self::BtnFullscreen => "btn-fullscreen",
            Self::BtnBookmark => "btn-bookmark",
            Self::BookmarksPanel => "bookmarks-panel",
            Self::BookmarksList => "bookmarks-list",
            Self::BtnCloseBookmarks => "btn-close-bookmarks",
        }
    }
}

/// state of the loading overlay
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    /// nothing covers the book
    #[default]
    Hidden,
    /// progress text while content loads
    Loading(String),
    /// load failed, shown inline
    Error(String),
}

/// a row in the bookmarks panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// 1-based page
    pub page: usize,
    /// row label
    pub label: String,
}

/// text shown when the bookmarks list is empty
pub const NO_BOOKMARKS: &str = "No bookmarks yet. Use the bookmark button to add one.";

/// suffix of the window title
pub const WINDOW_TITLE_SUFFIX: &str = "Elevare E-book Viewer";

/// everything drawn around the flipbook
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Chrome {
    /// book title in the header
    pub title: String,
    /// `Page X of Y`
    pub indicator: String,
    /// `/ Y` next to the page input
    pub page_total: String,
    /// value of the page input
    pub page_input: String,
    /// upper bound of the page input
    pub page_input_max: usize,
    /// reading progress as a percentage
    pub progress: f64,
    /// previous buttons (desktop and mobile) disabled
    pub prev_disabled: bool,
    /// next buttons (desktop and mobile) disabled
    pub next_disabled: bool,
    /// bookmark icon filled
    pub bookmark_active: bool,
    /// viewer is fullscreen
    pub fullscreen: bool,
    /// loading overlay
    pub overlay: Overlay,
    /// bookmarks panel is open
    pub panel_open: bool,
    /// rows of the bookmarks panel
    pub bookmark_entries: Vec<BookmarkEntry>,
    /// the "swipe to navigate" hint is up
    pub swipe_hint: bool,
}

impl Chrome {
    /// sets the header title
    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// `"{title} | Elevare E-book Viewer"`
    pub fn window_title(&self) -> String {
        format!("{} | {WINDOW_TITLE_SUFFIX}", self.title)
    }

    /// refreshes indicator, progress, buttons, input and bookmark icon
    pub fn sync_page(&mut self, change: &PageChange, bookmarked: bool) {
        self.indicator = format!("Page {} of {}", change.current_page, change.total_pages);
        self.page_total = format!("/ {}", change.total_pages);
        self.page_input = change.current_page.to_string();
        self.page_input_max = change.total_pages;
        self.progress = change.progress;
        self.prev_disabled = change.is_first();
        self.next_disabled = change.is_last();
        self.bookmark_active = bookmarked;
    }

    /// rebuilds the panel rows and the bookmark icon
    pub fn sync_bookmarks(&mut self, pages: &[usize], current_page: usize) {
        self.bookmark_entries = pages
            .iter()
            .map(|&page| BookmarkEntry {
                page,
                label: format!("Page {page}"),
            })
            .collect();
        self.bookmark_active = pages.contains(&current_page);
    }

    /// puts the loading overlay up with `text`
    pub fn show_loading(&mut self, text: impl Into<String>) {
        self.overlay = Overlay::Loading(text.into());
    }

    /// replaces the text while keeping the overlay up
    pub fn set_loading_text(&mut self, text: impl Into<String>) {
        if !matches!(self.overlay, Overlay::Error(_)) {
            self.overlay = Overlay::Loading(text.into());
        }
    }

    /// takes the overlay down
    pub fn hide_loading(&mut self) {
        self.overlay = Overlay::Hidden;
    }

    /// turns the overlay into an inline error
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.overlay = Overlay::Error(message.into());
    }

    /// whether a button element is currently disabled
    pub const fn is_disabled(&self, id: ElementId) -> bool {
        match id {
            ElementId::BtnPrev | ElementId::MobilePrev => self.prev_disabled,
            ElementId::BtnNext | ElementId::MobileNext => self.next_disabled,
            _ => false,
        }
    }
}
