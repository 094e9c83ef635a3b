//! the e-book viewer: loads content, drives a flipbook and keeps the chrome
//! around it in sync
//!
//! one [`EbookViewer`] per book. everything platform specific (time, storage,
//! network, pdf rasterising, fullscreen, the embedding page) comes in through
//! a [`Platform`], so the viewer itself is plain state that hosts pump with
//! input, [`EbookViewer::tick`] and [`EbookViewer::resize`].

use {
    crate::{
        FlipbookError, Result,
        bookmarks::{Bookmarks, Storage},
        chrome::{Chrome, ElementId},
        clock::SharedClock,
        config::ViewerConfig,
        engine::{
            Callbacks, EngineEvent, EngineOptions, FlipbookEngine,
            input::{Key, KeyOutcome, PointerEvent, PointerOutcome},
            layout::{Stage, Surface},
        },
        host::{Fullscreen, MessageSink, PageChangeMessage},
        loader::{
            Source,
            fetch::Fetcher,
            html, images,
            pdf::{self, PdfBackend, PdfRenderer},
        },
        types::{ContentType, Page, PageChange},
    },
};

/// inline message shown when content cannot be loaded
pub const LOAD_ERROR_MESSAGE: &str = "Could not load the e-book. Check the source and try again.";

/// services the viewer borrows from whatever is hosting it
pub struct Platform {
    /// time source for animations, debounce and long press
    pub clock: SharedClock,
    /// where bookmarks persist
    pub storage: Box<dyn Storage>,
    /// network access for url sources
    pub fetcher: Box<dyn Fetcher>,
    /// pdf rasteriser, pdf sources fail without one
    pub pdf_backend: Option<Box<dyn PdfBackend>>,
    /// native fullscreen, toggling is a no-op without one
    pub fullscreen: Option<Box<dyn Fullscreen>>,
    /// the embedding page, when running embedded
    pub parent: Option<Box<dyn MessageSink>>,
}

impl Platform {
    /// the required services, everything optional left out
    pub fn new(
        clock: SharedClock,
        storage: impl Storage + 'static,
        fetcher: impl Fetcher + 'static,
    ) -> Self {
        Self {
            clock,
            storage: Box::new(storage),
            fetcher: Box::new(fetcher),
            pdf_backend: None,
            fullscreen: None,
            parent: None,
        }
    }

    /// enables pdf content
    pub fn with_pdf_backend(mut self, backend: impl PdfBackend + 'static) -> Self {
        self.pdf_backend = Some(Box::new(backend));
        self
    }

    /// enables the fullscreen button
    pub fn with_fullscreen(mut self, fullscreen: impl Fullscreen + 'static) -> Self {
        self.fullscreen = Some(Box::new(fullscreen));
        self
    }

    /// posts page changes to an embedding host
    pub fn with_parent(mut self, parent: impl MessageSink + 'static) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

/// what to open
pub struct ViewerOptions {
    /// the content
    pub source: Source,
    /// book title, falls back to pdf metadata and then the configured default
    pub title: Option<String>,
    /// listeners
    pub callbacks: Callbacks,
}

impl ViewerOptions {
    /// opens `source` with no title and no listeners
    pub fn new(source: Source) -> Self {
        Self {
            source,
            title: None,
            callbacks: Callbacks::default(),
        }
    }

    /// overrides the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// called after every page change
    pub fn on_page_change(mut self, cb: impl FnMut(&PageChange) + 'static) -> Self {
        self.callbacks.on_page_change = Some(Box::new(cb));
        self
    }

    /// called once the first page is on screen
    pub fn on_ready(mut self, cb: impl FnMut() + 'static) -> Self {
        self.callbacks.on_ready = Some(Box::new(cb));
        self
    }

    /// called when loading fails
    pub fn on_error(mut self, cb: impl FnMut(&FlipbookError) + 'static) -> Self {
        self.callbacks.on_error = Some(Box::new(cb));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Press {
    Released,
    Held { deadline: u64 },
    LongPressed,
}

/// a loaded book plus its chrome
pub struct EbookViewer<S: Surface> {
    config: ViewerConfig,
    clock: SharedClock,
    storage: Box<dyn Storage>,
    fetcher: Box<dyn Fetcher>,
    pdf: Option<PdfRenderer>,
    fullscreen: Option<Box<dyn Fullscreen>>,
    parent: Option<Box<dyn MessageSink>>,
    engine: Option<FlipbookEngine<S>>,
    callbacks: Callbacks,
    chrome: Chrome,
    bookmarks: Bookmarks,
    title: String,
    content_type: Option<ContentType>,
    current_page: usize,
    total_pages: usize,
    initialized: bool,
    is_fullscreen: bool,
    press: Press,
    swipe_hint_until: Option<u64>,
    missing_elements: Vec<ElementId>,
}

impl<S: Surface> EbookViewer<S> {
    /// an idle viewer, nothing is loaded until [`Self::init`]
    pub fn new(platform: Platform, config: ViewerConfig) -> Self {
        let Platform {
            clock,
            storage,
            fetcher,
            pdf_backend,
            fullscreen,
            parent,
        } = platform;

        let pdf = pdf_backend.map(|backend| PdfRenderer::new(backend, config.pdf.clone()));

        Self {
            clock,
            storage,
            fetcher,
            pdf,
            fullscreen,
            parent,
            engine: None,
            callbacks: Callbacks::default(),
            chrome: Chrome::default(),
            bookmarks: Bookmarks::default(),
            title: config.default_title.clone(),
            content_type: None,
            current_page: 1,
            total_pages: 0,
            initialized: false,
            is_fullscreen: false,
            press: Press::Released,
            swipe_hint_until: None,
            missing_elements: Vec::new(),
            config,
        }
    }

    /// loads `options.source` and starts a flipbook on `stage`
    ///
    /// a load failure leaves an inline error in the loading overlay and is
    /// returned; there is no retry
    pub fn init<St>(&mut self, options: ViewerOptions, stage: &mut St) -> Result<()>
    where
        St: Stage<Surface = S>,
    {
        if self.engine.is_some() {
            self.destroy();
        }

        let ViewerOptions {
            source,
            title,
            callbacks,
        } = options;
        self.callbacks = callbacks;

        self.missing_elements = ElementId::ALL
            .into_iter()
            .filter(|id| !stage.has_element(id.as_str()))
            .collect();
        for id in &self.missing_elements {
            log::debug!("EbookViewer: element #{} not found", id.as_str());
        }

        let supplied_title = title.filter(|t| !t.trim().is_empty());
        let title_supplied = supplied_title.is_some();
        let title = supplied_title.unwrap_or_else(|| self.config.default_title.clone());
        self.content_type = Some(source.content_type());
        self.current_page = 1;
        self.total_pages = 0;
        self.set_title(title);

        self.chrome.show_loading("Loading e-book...");

        let pages = match self.load(&source, title_supplied) {
            Ok(pages) => pages,
            Err(err) => return Err(self.fail(err)),
        };

        let options =
            EngineOptions::new(self.config.container.clone(), pages).with_config(self.config.engine.clone());
        let engine = match FlipbookEngine::init(stage, options, self.clock.clone()) {
            Ok(engine) => engine,
            Err(err) => return Err(self.fail(err)),
        };

        self.engine = Some(engine);
        self.pump();

        Ok(())
    }

    fn load(&mut self, source: &Source, title_supplied: bool) -> Result<Vec<Page>> {
        match source {
            Source::Pdf(pdf_source) => {
                let Self {
                    pdf,
                    chrome,
                    fetcher,
                    ..
                } = self;
                let renderer = pdf.as_mut().ok_or(FlipbookError::NoPdfBackend)?;

                chrome.set_loading_text("Loading PDF...");
                let bytes = pdf::resolve_bytes(pdf_source, fetcher.as_ref())?;
                renderer.load(bytes, &mut |percent| {
                    chrome.set_loading_text(format!("Loading PDF... {}%", percent.round()));
                })?;

                chrome.set_loading_text("Rendering pages...");
                let pages = renderer.render_all(|progress| {
                    chrome.set_loading_text(format!(
                        "Rendering page {} of {}...",
                        progress.page_num, progress.total_pages
                    ));
                })?;

                let metadata_title = renderer
                    .metadata()
                    .ok()
                    .and_then(|m| m.title)
                    .filter(|t| !t.trim().is_empty());
                if !title_supplied && let Some(title) = metadata_title {
                    self.set_title(title);
                }

                Ok(pages)
            }
            Source::Html(html_source) => {
                self.chrome.set_loading_text("Loading content...");
                html::load(html_source, self.fetcher.as_ref())
            }
            Source::Images(image_source) => Ok(images::load(image_source)),
        }
    }

    fn fail(&mut self, err: FlipbookError) -> FlipbookError {
        log::error!("EbookViewer: failed to load e-book: {err}");
        self.chrome.show_error(LOAD_ERROR_MESSAGE);
        if let Some(cb) = self.callbacks.on_error.as_mut() {
            cb(&err);
        }
        err
    }

    fn set_title(&mut self, title: String) {
        self.chrome.set_title(&title);
        self.bookmarks = Bookmarks::load(self.storage.as_ref(), &self.config.bookmarks_key, &title);
        self.title = title;
        self.sync_bookmarks();
    }

    /// drains engine events into the chrome, the listeners and the parent
    fn pump(&mut self) {
        while let Some(event) = self.engine.as_mut().and_then(FlipbookEngine::poll_event) {
            match event {
                EngineEvent::PageChanged(change) => self.on_page_change(&change),
                EngineEvent::Ready => self.on_ready(),
                EngineEvent::Rerendered(mode) => {
                    log::debug!("EbookViewer: rendered in {mode:?} mode");
                }
            }
        }
    }

    fn on_page_change(&mut self, change: &PageChange) {
        self.current_page = change.current_page;
        self.total_pages = change.total_pages;
        self.chrome
            .sync_page(change, self.bookmarks.contains(change.current_page));

        if let Some(parent) = self.parent.as_ref() {
            let posted = serde_json::to_string(&PageChangeMessage::from(change))
                .map_err(FlipbookError::from)
                .and_then(|message| parent.post_message(&message, "*"));
            if let Err(e) = posted {
                log::warn!("EbookViewer: could not notify parent: {e}");
            }
        }

        if let Some(cb) = self.callbacks.on_page_change.as_mut() {
            cb(change);
        }
    }

    fn on_ready(&mut self) {
        self.initialized = true;
        self.chrome.hide_loading();

        let width = self.engine.as_ref().map_or(0, FlipbookEngine::viewport_width);
        if width <= self.config.swipe_hint_breakpoint {
            self.chrome.swipe_hint = true;
            self.swipe_hint_until = Some(self.clock.now_ms().saturating_add(self.config.swipe_hint_ms));
        }

        if let Some(cb) = self.callbacks.on_ready.as_mut() {
            cb();
        }
    }

    fn with_engine(&mut self, f: impl FnOnce(&mut FlipbookEngine<S>) -> bool) -> bool {
        let moved = self.engine.as_mut().is_some_and(f);
        self.pump();
        moved
    }

    /// one page forward
    pub fn next_page(&mut self) -> bool {
        self.with_engine(FlipbookEngine::next_page)
    }

    /// one page back
    pub fn prev_page(&mut self) -> bool {
        self.with_engine(FlipbookEngine::prev_page)
    }

    /// jumps to a 1-based page
    pub fn go_to_page(&mut self, page_num: usize) -> bool {
        self.with_engine(|engine| engine.go_to_page(page_num))
    }

    /// forwards pointer input to the flipbook
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let outcome = self
            .engine
            .as_mut()
            .map(|engine| engine.handle_pointer(event))
            .unwrap_or_default();
        self.pump();
        outcome
    }

    /// forwards a key press to the flipbook
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self
            .engine
            .as_mut()
            .map(|engine| engine.handle_key(key))
            .unwrap_or_default();
        self.pump();
        outcome
    }

    /// applies every timer that has expired
    pub fn tick(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.tick();
        }
        self.pump();

        let now = self.clock.now_ms();

        if let Press::Held { deadline } = self.press
            && now >= deadline
        {
            self.press = Press::LongPressed;
            self.open_bookmarks_panel();
        }

        if self.swipe_hint_until.is_some_and(|until| now >= until) {
            self.swipe_hint_until = None;
            self.chrome.swipe_hint = false;
        }
    }

    /// the viewport changed width
    pub fn resize(&mut self, width: u32) {
        if let Some(engine) = self.engine.as_mut() {
            engine.resize(width);
        }
    }

    /// bookmarks or un-bookmarks the current page, returns the new state
    pub fn toggle_bookmark(&mut self) -> bool {
        let bookmarked = self
            .bookmarks
            .toggle(self.current_page, self.storage.as_ref());
        self.sync_bookmarks();
        bookmarked
    }

    /// removes one bookmark, returns whether it existed
    pub fn remove_bookmark(&mut self, page: usize) -> bool {
        let removed = self.bookmarks.remove(page, self.storage.as_ref());
        if removed {
            self.sync_bookmarks();
        }
        removed
    }

    /// bookmarked pages, ascending
    pub fn bookmarks(&self) -> Vec<usize> {
        self.bookmarks.pages().to_vec()
    }

    fn sync_bookmarks(&mut self) {
        self.chrome
            .sync_bookmarks(self.bookmarks.pages(), self.current_page);
    }

    /// the bookmark button went down
    pub fn press_bookmark_button(&mut self) {
        let deadline = self.clock.now_ms().saturating_add(self.config.long_press_ms);
        self.press = Press::Held { deadline };
    }

    /// the bookmark button came up
    ///
    /// released before the long press fired it is a plain click and toggles
    /// the bookmark; after that it does nothing
    pub fn release_bookmark_button(&mut self) {
        match std::mem::replace(&mut self.press, Press::Released) {
            Press::Held { deadline } if self.clock.now_ms() >= deadline => {
                self.open_bookmarks_panel();
            }
            Press::Held { .. } => {
                self.toggle_bookmark();
            }
            Press::LongPressed | Press::Released => {}
        }
    }

    /// the pointer left the bookmark button while held
    pub fn cancel_bookmark_press(&mut self) {
        self.press = Press::Released;
    }

    /// shows the bookmarks panel with fresh rows
    pub fn open_bookmarks_panel(&mut self) {
        self.chrome.panel_open = true;
        self.sync_bookmarks();
    }

    /// hides the bookmarks panel
    pub fn close_bookmarks_panel(&mut self) {
        self.chrome.panel_open = false;
    }

    /// a row of the bookmarks panel was picked
    pub fn select_bookmark(&mut self, page: usize) -> bool {
        let moved = self.go_to_page(page);
        self.close_bookmarks_panel();
        moved
    }

    /// the page input was submitted
    ///
    /// a number within the book navigates, anything else puts the current
    /// page back into the input
    pub fn submit_page_input(&mut self, text: &str) -> bool {
        match text.trim().parse::<usize>() {
            Ok(page) if (1..=self.total_pages).contains(&page) => self.go_to_page(page),
            _ => {
                self.chrome.page_input = self.current_page.to_string();
                false
            }
        }
    }

    /// asks the host to enter or leave fullscreen
    ///
    /// the chrome only changes once the host reports back through
    /// [`Self::on_fullscreen_change`]
    pub fn toggle_fullscreen(&mut self) {
        let Some(fullscreen) = self.fullscreen.as_mut() else {
            log::debug!("EbookViewer: fullscreen is not available");
            return;
        };

        let result = if fullscreen.is_active() {
            fullscreen.exit()
        } else {
            fullscreen.request(ElementId::Viewer)
        };

        if let Err(e) = result {
            log::warn!("EbookViewer: fullscreen request failed: {e}");
        }
    }

    /// the host entered or left fullscreen
    pub fn on_fullscreen_change(&mut self, active: bool) {
        self.is_fullscreen = active;
        self.chrome.fullscreen = active;
    }

    /// tears down the flipbook and the pdf document
    pub fn destroy(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        if let Some(renderer) = self.pdf.as_mut() {
            renderer.destroy();
        }

        self.initialized = false;
        self.press = Press::Released;
        self.swipe_hint_until = None;
        self.chrome.swipe_hint = false;
        self.chrome.panel_open = false;
    }

    /// whether a book is loaded
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// last state the host reported
    pub const fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// 1-based current page
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// pages in the loaded book
    pub const fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// resolved book title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// type of the loaded source
    pub const fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// what the host should draw around the book
    pub const fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    /// host elements that were absent at init
    pub fn missing_elements(&self) -> &[ElementId] {
        &self.missing_elements
    }

    /// the running flipbook, `None` before init and after destroy
    pub const fn engine(&self) -> Option<&FlipbookEngine<S>> {
        self.engine.as_ref()
    }

    /// settings the viewer runs with
    pub const fn config(&self) -> &ViewerConfig {
        &self.config
    }
}
