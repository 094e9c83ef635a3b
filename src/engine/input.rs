//! pointer gestures, click zones and key bindings

use crate::config::EngineConfig;

/// what a gesture, click or key asks the engine to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    /// one page forward
    Next,
    /// one page back
    Prev,
    /// jump to the first page
    First,
    /// jump to the last page
    Last,
}

/// a position in container-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// horizontal offset
    pub x: f32,
    /// vertical offset
    pub y: f32,
}

impl Point {
    /// shorthand constructor
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// pointer input delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// fingers went down, one point per active touch
    TouchStart(Vec<Point>),
    /// a finger moved
    TouchMove(Point),
    /// the last finger lifted at this point
    TouchEnd(Point),
    /// mouse button pressed
    MouseDown(Point),
    /// mouse moved, with or without a button held
    MouseMove(Point),
    /// mouse button released
    MouseUp(Point),
    /// a completed click; `width` is the container width
    Click {
        /// click x in container pixels
        x: f32,
        /// container width in pixels
        width: f32,
    },
}

/// what the host should do after the engine saw a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerOutcome {
    /// suppress the native action (scrolling, text selection)
    pub prevent_default: bool,
    /// `Some(moved)` when the event resolved into a navigation attempt
    pub navigated: Option<bool>,
}

/// keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// arrow right
    ArrowRight,
    /// arrow left
    ArrowLeft,
    /// page down
    PageDown,
    /// page up
    PageUp,
    /// home
    Home,
    /// end
    End,
    /// anything else
    Other,
}

impl Key {
    /// the navigation bound to this key, if any
    pub const fn intent(self) -> Option<NavIntent> {
        match self {
            Self::ArrowRight | Self::PageDown => Some(NavIntent::Next),
            Self::ArrowLeft | Self::PageUp => Some(NavIntent::Prev),
            Self::Home => Some(NavIntent::First),
            Self::End => Some(NavIntent::Last),
            Self::Other => None,
        }
    }
}

/// result of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    /// the key is bound, the default browser action must be suppressed
    pub prevent_default: bool,
    /// `Some(moved)` for bound keys
    pub navigated: Option<bool>,
}

/// transient drag state shared by touch and mouse input
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    start: Point,
    dragging: bool,
    suppress_click: bool,
}

impl GestureTracker {
    /// whether a drag is in progress
    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// resets every transient field
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// turns a raw event into an optional navigation intent
    ///
    /// returns the intent and whether the native default should be prevented
    pub fn interpret(
        &mut self,
        event: &PointerEvent,
        config: &EngineConfig,
    ) -> (Option<NavIntent>, bool) {
        match event {
            PointerEvent::TouchStart(points) => {
                if let [point] = points.as_slice() {
                    self.begin(*point);
                } else {
                    self.dragging = false;
                }
                (None, false)
            }
            PointerEvent::MouseDown(point) => {
                self.begin(*point);
                (None, false)
            }
            PointerEvent::TouchMove(point) | PointerEvent::MouseMove(point) => {
                if !self.dragging {
                    return (None, false);
                }
                let dx = (point.x - self.start.x).abs();
                let dy = (point.y - self.start.y).abs();
                (None, dx > dy)
            }
            PointerEvent::TouchEnd(point) | PointerEvent::MouseUp(point) => {
                if !self.dragging {
                    return (None, false);
                }
                self.dragging = false;
                let intent = swipe_intent(point.x - self.start.x, config.swipe_threshold);
                self.suppress_click = intent.is_some();
                (intent, false)
            }
            PointerEvent::Click { x, width } => {
                if std::mem::take(&mut self.suppress_click) {
                    return (None, false);
                }
                (click_intent(*x, *width, config.click_zone), false)
            }
        }
    }

    fn begin(&mut self, point: Point) {
        self.start = point;
        self.dragging = true;
        self.suppress_click = false;
    }
}

/// a horizontal drag past the threshold; leftward means forward
pub fn swipe_intent(dx: f32, threshold: f32) -> Option<NavIntent> {
    if dx.abs() <= threshold {
        None
    } else if dx < 0.0 {
        Some(NavIntent::Next)
    } else {
        Some(NavIntent::Prev)
    }
}

/// left `zone` of the width goes back, right `zone` goes forward, the middle
/// is dead
pub fn click_intent(x: f32, width: f32, zone: f32) -> Option<NavIntent> {
    if width <= 0.0 {
        return None;
    }

    let ratio = x / width;
    if ratio < zone {
        Some(NavIntent::Prev)
    } else if ratio > 1.0 - zone {
        Some(NavIntent::Next)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {super::*, assert2::check as assert};

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_key_bindings() {
        assert!(Key::ArrowRight.intent() == Some(NavIntent::Next));
        assert!(Key::PageDown.intent() == Some(NavIntent::Next));
        assert!(Key::ArrowLeft.intent() == Some(NavIntent::Prev));
        assert!(Key::PageUp.intent() == Some(NavIntent::Prev));
        assert!(Key::Home.intent() == Some(NavIntent::First));
        assert!(Key::End.intent() == Some(NavIntent::Last));
        assert!(Key::Other.intent().is_none());
    }

    #[test]
    fn test_swipe_threshold_is_exclusive() {
        assert!(swipe_intent(-50.0, 50.0).is_none());
        assert!(swipe_intent(-51.0, 50.0) == Some(NavIntent::Next));
        assert!(swipe_intent(80.0, 50.0) == Some(NavIntent::Prev));
    }

    #[test]
    fn test_click_zones() {
        assert!(click_intent(10.0, 100.0, 0.3) == Some(NavIntent::Prev));
        assert!(click_intent(50.0, 100.0, 0.3).is_none());
        assert!(click_intent(90.0, 100.0, 0.3) == Some(NavIntent::Next));
        assert!(click_intent(10.0, 0.0, 0.3).is_none());
    }

    #[test]
    fn test_multi_touch_start_is_ignored() {
        let mut tracker = GestureTracker::default();
        let two = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        tracker.interpret(&PointerEvent::TouchStart(two), &config());
        assert!(!tracker.is_dragging());
        let (intent, _) =
            tracker.interpret(&PointerEvent::TouchEnd(Point::new(-200.0, 0.0)), &config());
        assert!(intent.is_none());
    }

    #[test]
    fn test_vertical_drag_keeps_native_scroll() {
        let mut tracker = GestureTracker::default();
        tracker.interpret(
            &PointerEvent::TouchStart(vec![Point::new(100.0, 100.0)]),
            &config(),
        );
        let (_, prevent) =
            tracker.interpret(&PointerEvent::TouchMove(Point::new(110.0, 180.0)), &config());
        assert!(!prevent);
        let (_, prevent) =
            tracker.interpret(&PointerEvent::TouchMove(Point::new(40.0, 110.0)), &config());
        assert!(prevent);
    }

    #[test]
    fn test_mouse_drag_mirrors_touch_and_swallows_following_click() {
        let mut tracker = GestureTracker::default();
        tracker.interpret(&PointerEvent::MouseDown(Point::new(300.0, 10.0)), &config());
        let (intent, _) =
            tracker.interpret(&PointerEvent::MouseUp(Point::new(200.0, 12.0)), &config());
        assert!(intent == Some(NavIntent::Next));
        assert!(!tracker.is_dragging());

        let click = PointerEvent::Click {
            x: 190.0,
            width: 200.0,
        };
        let (intent, _) = tracker.interpret(&click, &config());
        assert!(intent.is_none());
        let (intent, _) = tracker.interpret(&click, &config());
        assert!(intent == Some(NavIntent::Next));
    }
}
