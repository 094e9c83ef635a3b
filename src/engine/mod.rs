//! page-turn state machine
//!
//! the engine owns the page list, the current position and the flip
//! animation. it never touches a real display: every state change is turned
//! into a [`RenderPlan`] and handed to a [`Surface`], and every page change is
//! queued as an [`EngineEvent`] (and passed to the optional callbacks).
//!
//! navigation is gated by a small state machine. a spread flip goes
//! `Idle -> Animating -> Idle` and announces its page change on the way out; a
//! single-page turn announces at once and goes `Idle -> Settling -> Idle`.
//! either phase ends through [`FlipbookEngine::tick`] once the injected clock
//! passes the deadline, or through [`FlipbookEngine::finish_animation`].

pub mod input;
pub mod layout;

use {
    crate::{
        FlipbookError, Result,
        clock::SharedClock,
        config::EngineConfig,
        types::{FlipDirection, LayoutMode, Page, PageChange},
    },
    input::{GestureTracker, Key, KeyOutcome, NavIntent, PointerEvent, PointerOutcome},
    layout::{Flip, RenderPlan, Stage, Surface},
    std::collections::VecDeque,
};

const MAX_QUEUED_EVENTS: usize = 1024;

/// optional listeners, invoked synchronously when the matching event fires
#[derive(Default)]
pub struct Callbacks {
    /// every page change, after the flip finished
    pub on_page_change: Option<Box<dyn FnMut(&PageChange)>>,
    /// first render done
    pub on_ready: Option<Box<dyn FnMut()>>,
    /// initialisation failed
    pub on_error: Option<Box<dyn FnMut(&FlipbookError)>>,
}

impl Callbacks {
    fn error(&mut self, err: &FlipbookError) {
        if let Some(cb) = self.on_error.as_mut() {
            cb(err);
        }
    }
}

/// what to build the engine with
pub struct EngineOptions {
    /// id of the element to render into
    pub container: String,
    /// initial pages
    pub pages: Vec<Page>,
    /// thresholds and timings
    pub config: EngineConfig,
    /// listeners
    pub callbacks: Callbacks,
}

impl EngineOptions {
    /// options with default tuning and no listeners
    pub fn new(container: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            container: container.into(),
            pages,
            config: EngineConfig::default(),
            callbacks: Callbacks::default(),
        }
    }

    /// replaces the tuning
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// sets the page change listener
    pub fn on_page_change(mut self, cb: impl FnMut(&PageChange) + 'static) -> Self {
        self.callbacks.on_page_change = Some(Box::new(cb));
        self
    }

    /// sets the ready listener
    pub fn on_ready(mut self, cb: impl FnMut() + 'static) -> Self {
        self.callbacks.on_ready = Some(Box::new(cb));
        self
    }

    /// sets the error listener
    pub fn on_error(mut self, cb: impl FnMut(&FlipbookError) + 'static) -> Self {
        self.callbacks.on_error = Some(Box::new(cb));
        self
    }
}

/// notifications produced by the engine, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// the first render is on screen
    Ready,
    /// the visible page changed
    PageChanged(PageChange),
    /// the page stack was rebuilt for a layout mode
    Rerendered(LayoutMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Animating { flip: Flip, deadline: u64 },
    /// single-page turn already announced, navigation stays locked until the deadline
    Settling { deadline: u64 },
}

/// the flipbook itself, bound to one surface
pub struct FlipbookEngine<S: Surface> {
    surface: Option<S>,
    pages: Vec<Page>,
    current: usize,
    phase: Phase,
    mode: LayoutMode,
    viewport_width: u32,
    pending_resize: Option<(u32, u64)>,
    gesture: GestureTracker,
    config: EngineConfig,
    clock: SharedClock,
    events: VecDeque<EngineEvent>,
    callbacks: Callbacks,
}

impl<S: Surface> FlipbookEngine<S> {
    /// attaches to `options.container` on the stage and renders the pages
    ///
    /// a missing or unknown container is logged, reported to `on_error` and
    /// returned as an error; nothing is rendered in that case
    pub fn init<St>(stage: &mut St, options: EngineOptions, clock: SharedClock) -> Result<Self>
    where
        St: Stage<Surface = S>,
    {
        let EngineOptions {
            container,
            pages,
            config,
            mut callbacks,
        } = options;

        if container.trim().is_empty() {
            let err = FlipbookError::MissingContainer;
            log::error!("FlipbookEngine: {err}");
            callbacks.error(&err);
            return Err(err);
        }

        let Some(surface) = stage.attach(&container) else {
            let err = FlipbookError::ContainerNotFound(container);
            log::error!("FlipbookEngine: {err}");
            callbacks.error(&err);
            return Err(err);
        };

        let viewport_width = stage.viewport_width();
        let mode = LayoutMode::for_width(viewport_width, config.single_page_breakpoint);

        let mut engine = Self {
            surface: Some(surface),
            pages: Vec::new(),
            current: 0,
            phase: Phase::Idle,
            mode,
            viewport_width,
            pending_resize: None,
            gesture: GestureTracker::default(),
            config,
            clock,
            events: VecDeque::new(),
            callbacks,
        };

        engine.set_pages(pages);
        engine.emit(EngineEvent::Ready);

        Ok(engine)
    }

    /// swaps the whole page list and goes back to the first page
    pub fn set_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        self.current = 0;
        self.phase = Phase::Idle;
        self.gesture.reset();
        self.rerender();
        self.emit_page_change();
    }

    /// one page forward; `false` while a flip plays or on the last page
    #[allow(clippy::arithmetic_side_effects)]
    pub fn next_page(&mut self) -> bool {
        if self.is_animating() || self.current + 1 >= self.pages.len() {
            return false;
        }

        let departing = self.current;
        self.current += 1;
        self.turn(Flip {
            page: departing,
            direction: FlipDirection::Left,
        });

        true
    }

    /// one page back; `false` while a flip plays or on the first page
    #[allow(clippy::arithmetic_side_effects)]
    pub fn prev_page(&mut self) -> bool {
        if self.is_animating() || self.current == 0 {
            return false;
        }

        self.current -= 1;
        self.turn(Flip {
            page: self.current,
            direction: FlipDirection::Right,
        });

        true
    }

    /// jumps straight to a 1-based page
    ///
    /// rejected when out of range, already there, or while a flip plays
    #[allow(clippy::arithmetic_side_effects)]
    pub fn go_to_page(&mut self, page_num: usize) -> bool {
        if self.is_animating()
            || page_num < 1
            || page_num > self.pages.len()
            || page_num - 1 == self.current
        {
            return false;
        }

        log::debug!("FlipbookEngine: jump {} -> {}", self.current + 1, page_num);
        self.current = page_num - 1;
        self.refresh();
        self.emit_page_change();

        true
    }

    /// 1-based current page, `1` for an empty book
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn current_page(&self) -> usize {
        self.current + 1
    }

    /// number of pages
    pub const fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// the page list
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// current layout strategy
    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// last applied viewport width
    pub const fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// whether a turn is in flight and navigation is locked
    pub const fn is_animating(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// the bound surface, `None` after [`Self::destroy`]
    pub const fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// mutable access to the bound surface
    pub const fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// the render plan for the current state
    pub fn plan(&self) -> RenderPlan {
        let flip = match self.phase {
            Phase::Animating { flip, .. } => Some(flip),
            Phase::Idle | Phase::Settling { .. } => None,
        };

        RenderPlan::compute(self.pages.len(), self.current, self.mode, flip)
    }

    /// completes the turn in flight
    ///
    /// a spread flip emits its page change here, a single-page turn only
    /// releases the lock since its change went out when it started.
    /// returns `false` when nothing was animating
    pub fn finish_animation(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => false,
            Phase::Settling { .. } => true,
            Phase::Animating { .. } => {
                self.refresh();
                self.emit_page_change();
                true
            }
        }
    }

    /// applies every deadline that has passed on the clock
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();

        if let Phase::Animating { deadline, .. } | Phase::Settling { deadline } = self.phase
            && now >= deadline
        {
            self.finish_animation();
        }

        if let Some((width, deadline)) = self.pending_resize
            && now >= deadline
        {
            self.pending_resize = None;
            self.apply_width(width);
        }
    }

    /// records a new viewport width, applied after the debounce window
    #[allow(clippy::arithmetic_side_effects)]
    pub fn resize(&mut self, width: u32) {
        let deadline = self.clock.now_ms() + self.config.resize_debounce_ms;
        self.pending_resize = Some((width, deadline));
    }

    /// feeds a touch, mouse or click event through the gesture tracker
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        let (intent, prevent_default) = self.gesture.interpret(&event, &self.config);

        PointerOutcome {
            prevent_default,
            navigated: intent.map(|i| self.navigate(i)),
        }
    }

    /// feeds a key press
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match key.intent() {
            Some(intent) => KeyOutcome {
                prevent_default: true,
                navigated: Some(self.navigate(intent)),
            },
            None => KeyOutcome::default(),
        }
    }

    /// executes a navigation intent
    pub fn navigate(&mut self, intent: NavIntent) -> bool {
        match intent {
            NavIntent::Next => self.next_page(),
            NavIntent::Prev => self.prev_page(),
            NavIntent::First => self.go_to_page(1),
            NavIntent::Last => self.go_to_page(self.pages.len()),
        }
    }

    /// next queued event
    pub fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }

    /// clears the surface, drops listeners and resets to the empty state
    pub fn destroy(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.clear();
        }

        self.pages.clear();
        self.current = 0;
        self.phase = Phase::Idle;
        self.pending_resize = None;
        self.gesture.reset();
        self.events.clear();
        self.callbacks = Callbacks::default();
    }

    fn turn(&mut self, flip: Flip) {
        match self.mode {
            LayoutMode::Single => {
                let deadline = self
                    .clock
                    .now_ms()
                    .saturating_add(self.config.single_page_lock_ms);
                self.phase = Phase::Settling { deadline };
                self.refresh();
                self.emit_page_change();
            }
            LayoutMode::Spread => {
                let deadline = self
                    .clock
                    .now_ms()
                    .saturating_add(self.config.flip_duration_ms);
                self.phase = Phase::Animating { flip, deadline };
                self.refresh();
            }
        }
    }

    fn apply_width(&mut self, width: u32) {
        self.viewport_width = width;
        let mode = LayoutMode::for_width(width, self.config.single_page_breakpoint);

        if mode != self.mode {
            log::debug!("FlipbookEngine: layout {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.rerender();
        }
    }

    fn refresh(&mut self) {
        let plan = self.plan();
        if let Some(surface) = self.surface.as_mut() {
            surface.update(&plan);
        }
    }

    fn rerender(&mut self) {
        let plan = self.plan();
        if let Some(surface) = self.surface.as_mut() {
            surface.mount(&plan);
        }
        self.emit(EngineEvent::Rerendered(self.mode));
    }

    fn emit_page_change(&mut self) {
        let change = PageChange::new(self.current_page(), self.pages.len());
        self.emit(EngineEvent::PageChanged(change));
    }

    fn emit(&mut self, event: EngineEvent) {
        match &event {
            EngineEvent::PageChanged(change) => {
                if let Some(cb) = self.callbacks.on_page_change.as_mut() {
                    cb(change);
                }
            }
            EngineEvent::Ready => {
                if let Some(cb) = self.callbacks.on_ready.as_mut() {
                    cb();
                }
            }
            EngineEvent::Rerendered(_) => {}
        }

        if self.events.len() >= MAX_QUEUED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    #![allow(clippy::missing_panics_doc, clippy::arithmetic_side_effects)]
    use {
        super::*,
        crate::clock::ManualClock,
        assert2::check as assert,
        std::{cell::RefCell, rc::Rc, sync::Arc},
        super::input::Point,
    };

    /// surface that remembers every call it received
    #[derive(Default, Clone)]
    pub(crate) struct RecordingSurface {
        pub(crate) log: Rc<RefCell<Vec<String>>>,
        pub(crate) last: Rc<RefCell<Option<RenderPlan>>>,
    }

    impl RecordingSurface {
        pub(crate) fn mounts(&self) -> usize {
            self.log.borrow().iter().filter(|l| *l == "mount").count()
        }
    }

    impl Surface for RecordingSurface {
        fn mount(&mut self, plan: &RenderPlan) {
            self.log.borrow_mut().push("mount".to_string());
            *self.last.borrow_mut() = Some(plan.clone());
        }

        fn update(&mut self, plan: &RenderPlan) {
            self.log.borrow_mut().push("update".to_string());
            *self.last.borrow_mut() = Some(plan.clone());
        }

        fn clear(&mut self) {
            self.log.borrow_mut().push("clear".to_string());
            *self.last.borrow_mut() = None;
        }
    }

    pub(crate) struct TestStage {
        pub(crate) width: u32,
        pub(crate) surface: RecordingSurface,
        pub(crate) ids: Vec<&'static str>,
    }

    impl TestStage {
        pub(crate) fn new(width: u32) -> Self {
            Self {
                width,
                surface: RecordingSurface::default(),
                ids: vec!["flipbook"],
            }
        }
    }

    impl Stage for TestStage {
        type Surface = RecordingSurface;

        fn attach(&mut self, id: &str) -> Option<RecordingSurface> {
            self.has_element(id).then(|| self.surface.clone())
        }

        fn has_element(&self, id: &str) -> bool {
            self.ids.iter().any(|known| *known == id)
        }

        fn viewport_width(&self) -> u32 {
            self.width
        }
    }

    pub(crate) fn html_pages(n: usize) -> Vec<Page> {
        (0..n)
            .map(|i| Page::Html {
                html: format!("<p>{i}</p>"),
            })
            .collect()
    }

    fn engine(width: u32, pages: usize) -> (FlipbookEngine<RecordingSurface>, ManualClock, TestStage) {
        let clock = ManualClock::new();
        let mut stage = TestStage::new(width);
        let engine = FlipbookEngine::init(
            &mut stage,
            EngineOptions::new("flipbook", html_pages(pages)),
            Arc::new(clock.clone()),
        )
        .unwrap();
        (engine, clock, stage)
    }

    fn page_changes(engine: &mut FlipbookEngine<RecordingSurface>) -> Vec<usize> {
        let mut out = Vec::new();
        while let Some(event) = engine.poll_event() {
            if let EngineEvent::PageChanged(change) = event {
                out.push(change.current_page);
            }
        }
        out
    }

    #[test]
    fn test_missing_container_is_an_error_not_a_panic() {
        let mut stage = TestStage::new(800);
        let errors = Rc::new(RefCell::new(0));
        let seen = errors.clone();
        let result = FlipbookEngine::init(
            &mut stage,
            EngineOptions::new("", html_pages(2)).on_error(move |_| *seen.borrow_mut() += 1),
            Arc::new(ManualClock::new()),
        );
        assert!(matches!(result, Err(FlipbookError::MissingContainer)));
        assert!(*errors.borrow() == 1);
    }

    #[test]
    fn test_unknown_container_is_reported() {
        let mut stage = TestStage::new(800);
        let result = FlipbookEngine::init(
            &mut stage,
            EngineOptions::new("nope", html_pages(2)),
            Arc::new(ManualClock::new()),
        );
        assert!(matches!(result, Err(FlipbookError::ContainerNotFound(id)) if id == "nope"));
        assert!(stage.surface.log.borrow().is_empty());
    }

    #[test]
    fn test_init_renders_and_announces_first_page() {
        let (mut engine, _, stage) = engine(800, 3);
        assert!(stage.surface.mounts() == 1);
        assert!(engine.poll_event() == Some(EngineEvent::Rerendered(LayoutMode::Spread)));
        assert!(engine.poll_event() == Some(EngineEvent::PageChanged(PageChange::new(1, 3))));
        assert!(engine.poll_event() == Some(EngineEvent::Ready));
        assert!(engine.poll_event().is_none());
    }

    #[test]
    fn test_go_to_page_in_range_lands_there() {
        let (mut engine, _, _) = engine(800, 5);
        for target in [3, 5, 1, 4, 2] {
            assert!(engine.go_to_page(target));
            assert!(engine.current_page() == target);
        }
    }

    #[test]
    fn test_go_to_page_out_of_range_or_current_is_rejected() {
        let (mut engine, _, _) = engine(800, 5);
        assert!(!engine.go_to_page(0));
        assert!(!engine.go_to_page(6));
        assert!(!engine.go_to_page(1));
        assert!(engine.current_page() == 1);
    }

    #[test]
    fn test_next_page_at_last_page_is_rejected() {
        let (mut engine, _, _) = engine(400, 2);
        assert!(engine.next_page());
        assert!(!engine.next_page());
        assert!(engine.current_page() == 2);
    }

    #[test]
    fn test_prev_page_at_first_page_is_rejected() {
        let (mut engine, _, _) = engine(800, 2);
        assert!(!engine.prev_page());
        assert!(engine.current_page() == 1);
    }

    #[test]
    fn test_animation_lock_rejects_second_flip_until_deadline() {
        let (mut engine, clock, _) = engine(800, 4);
        page_changes(&mut engine);

        assert!(engine.next_page());
        assert!(engine.is_animating());
        assert!(!engine.next_page());
        assert!(!engine.prev_page());
        assert!(!engine.go_to_page(4));
        assert!(page_changes(&mut engine).is_empty());

        clock.advance(599);
        engine.tick();
        assert!(engine.is_animating());

        clock.advance(1);
        engine.tick();
        assert!(!engine.is_animating());
        assert!(page_changes(&mut engine) == vec![2]);
        assert!(engine.next_page());
    }

    #[test]
    fn test_finish_animation_completes_flip_explicitly() {
        let (mut engine, _, _) = engine(800, 3);
        assert!(!engine.finish_animation());
        assert!(engine.next_page());
        assert!(engine.plan().slots[0].flip == Some(FlipDirection::Left));
        assert!(engine.finish_animation());
        assert!(engine.plan().slots[0].flip.is_none());
        assert!(engine.plan().slots[0].turned);
    }

    #[test]
    fn test_prev_flip_is_attached_to_page_turning_back() {
        let (mut engine, _, _) = engine(800, 3);
        engine.go_to_page(3);
        assert!(engine.prev_page());
        let plan = engine.plan();
        assert!(plan.slots[1].flip == Some(FlipDirection::Right));
    }

    #[test]
    fn test_single_page_turn_announces_at_once_and_locks_briefly() {
        let (mut engine, clock, _) = engine(400, 5);
        page_changes(&mut engine);
        assert!(engine.mode() == LayoutMode::Single);

        assert!(engine.next_page());
        assert!(page_changes(&mut engine) == vec![2]);
        assert!(engine.is_animating());
        assert!(!engine.next_page());
        assert!(!engine.prev_page());
        assert!(engine.plan().slots.iter().all(|s| s.flip.is_none()));

        clock.advance(299);
        engine.tick();
        assert!(!engine.next_page());

        clock.advance(1);
        engine.tick();
        assert!(!engine.is_animating());
        assert!(page_changes(&mut engine).is_empty());
        assert!(engine.next_page());
        assert!(engine.current_page() == 3);
    }

    #[test]
    fn test_finish_animation_releases_single_page_lock_without_second_change() {
        let (mut engine, _, _) = engine(400, 3);
        page_changes(&mut engine);
        assert!(engine.next_page());
        assert!(engine.finish_animation());
        assert!(page_changes(&mut engine) == vec![2]);
        assert!(engine.prev_page());
    }

    #[test]
    fn test_set_pages_empty_reports_zero_pages_on_page_one() {
        let (mut engine, _, _) = engine(800, 3);
        engine.go_to_page(2);
        page_changes(&mut engine);
        engine.set_pages(Vec::new());
        assert!(engine.total_pages() == 0);
        assert!(engine.current_page() == 1);
        assert!(page_changes(&mut engine) == vec![1]);
        assert!(!engine.next_page());
        assert!(!engine.prev_page());
    }

    #[test]
    fn test_set_pages_resets_position_and_rerenders() {
        let (mut engine, _, stage) = engine(800, 3);
        engine.go_to_page(3);
        engine.set_pages(html_pages(5));
        assert!(engine.current_page() == 1);
        assert!(engine.total_pages() == 5);
        assert!(stage.surface.mounts() == 2);
    }

    #[test]
    fn test_resize_across_breakpoint_rerenders_and_keeps_position() {
        let (mut engine, clock, stage) = engine(800, 5);
        engine.go_to_page(3);
        let mounts = stage.surface.mounts();

        engine.resize(700);
        engine.resize(500);
        engine.resize(400);
        clock.advance(249);
        engine.tick();
        assert!(engine.mode() == LayoutMode::Spread);

        clock.advance(1);
        engine.tick();
        assert!(engine.mode() == LayoutMode::Single);
        assert!(engine.viewport_width() == 400);
        assert!(engine.current_page() == 3);
        assert!(stage.surface.mounts() == mounts + 1);

        let plan = stage.surface.last.borrow().clone().unwrap();
        assert!(plan.mode == LayoutMode::Single);
        assert!(plan.current == 2);
    }

    #[test]
    fn test_resize_within_same_mode_does_not_rerender() {
        let (mut engine, clock, stage) = engine(800, 5);
        engine.resize(1200);
        clock.advance(250);
        engine.tick();
        assert!(stage.surface.mounts() == 1);
    }

    #[test]
    fn test_keyboard_navigation() {
        let (mut engine, _, _) = engine(400, 5);
        let outcome = engine.handle_key(Key::End);
        assert!(outcome.prevent_default);
        assert!(outcome.navigated == Some(true));
        assert!(engine.current_page() == 5);

        let outcome = engine.handle_key(Key::PageDown);
        assert!(outcome.prevent_default);
        assert!(outcome.navigated == Some(false));

        engine.handle_key(Key::Home);
        assert!(engine.current_page() == 1);
        assert!(engine.handle_key(Key::Other) == KeyOutcome::default());
    }

    #[test]
    fn test_swipe_and_click_navigation() {
        let (mut engine, clock, _) = engine(400, 5);
        let settle = |engine: &mut FlipbookEngine<RecordingSurface>| {
            clock.advance(300);
            engine.tick();
        };

        engine.handle_pointer(PointerEvent::TouchStart(vec![Point::new(300.0, 50.0)]));
        let outcome = engine.handle_pointer(PointerEvent::TouchEnd(Point::new(100.0, 60.0)));
        assert!(outcome.navigated == Some(true));
        assert!(engine.current_page() == 2);
        settle(&mut engine);

        engine.handle_pointer(PointerEvent::Click {
            x: 390.0,
            width: 400.0,
        });
        engine.handle_pointer(PointerEvent::Click {
            x: 390.0,
            width: 400.0,
        });
        assert!(engine.current_page() == 3);
        settle(&mut engine);

        let outcome = engine.handle_pointer(PointerEvent::Click {
            x: 200.0,
            width: 400.0,
        });
        assert!(outcome.navigated.is_none());

        engine.handle_pointer(PointerEvent::Click {
            x: 10.0,
            width: 400.0,
        });
        assert!(engine.current_page() == 2);
    }

    #[test]
    fn test_callbacks_fire_after_flip_completes() {
        let clock = ManualClock::new();
        let mut stage = TestStage::new(800);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let ready = Rc::new(RefCell::new(false));
        let (s, r) = (seen.clone(), ready.clone());
        let mut engine = FlipbookEngine::init(
            &mut stage,
            EngineOptions::new("flipbook", html_pages(3))
                .on_page_change(move |c| s.borrow_mut().push(c.current_page))
                .on_ready(move || *r.borrow_mut() = true),
            Arc::new(clock.clone()),
        )
        .unwrap();

        assert!(*ready.borrow());
        engine.next_page();
        assert!(*seen.borrow() == vec![1]);
        clock.advance(600);
        engine.tick();
        assert!(*seen.borrow() == vec![1, 2]);
    }

    #[test]
    fn test_destroy_clears_surface_and_state() {
        let (mut engine, _, stage) = engine(800, 3);
        engine.go_to_page(2);
        engine.destroy();
        assert!(stage.surface.log.borrow().last().map(String::as_str) == Some("clear"));
        assert!(engine.surface().is_none());
        assert!(engine.total_pages() == 0);
        assert!(engine.current_page() == 1);
        assert!(engine.poll_event().is_none());
        assert!(!engine.next_page());
    }
}
