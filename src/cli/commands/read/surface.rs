use {
    flipbook::{
        Result,
        chrome::ElementId,
        engine::layout::{RenderPlan, Stage, Surface},
        host::Fullscreen,
    },
    std::{cell::Cell, rc::Rc},
};

/// pixels one terminal column stands for when talking to the engine
pub const CELL_WIDTH_PX: u32 = 8;

/// pixels one terminal row stands for
pub const CELL_HEIGHT_PX: u32 = 16;

/// keeps the latest render plan for the tui to draw from
#[derive(Debug, Default)]
pub struct PlanSurface {
    plan: Option<RenderPlan>,
    mounts: usize,
}

impl PlanSurface {
    pub const fn plan(&self) -> Option<&RenderPlan> {
        self.plan.as_ref()
    }

    /// bumps on every full re-render, decoded pictures go stale when it moves
    pub const fn mounts(&self) -> usize {
        self.mounts
    }
}

impl Surface for PlanSurface {
    fn mount(&mut self, plan: &RenderPlan) {
        self.mounts = self.mounts.wrapping_add(1);
        self.plan = Some(plan.clone());
    }

    fn update(&mut self, plan: &RenderPlan) {
        self.plan = Some(plan.clone());
    }

    fn clear(&mut self) {
        self.plan = None;
    }
}

/// the terminal as a host page
///
/// every chrome element is drawn by the tui, so they all exist
#[derive(Debug)]
pub struct TerminalStage {
    width: u32,
}

impl TerminalStage {
    pub const fn new(width: u32) -> Self {
        Self { width }
    }

    /// stage sized for a terminal `cols` wide
    pub fn for_columns(cols: u16) -> Self {
        Self::new(u32::from(cols).saturating_mul(CELL_WIDTH_PX))
    }
}

impl Stage for TerminalStage {
    type Surface = PlanSurface;

    fn attach(&mut self, id: &str) -> Option<PlanSurface> {
        (!id.trim().is_empty()).then(PlanSurface::default)
    }

    fn has_element(&self, _id: &str) -> bool {
        true
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }
}

/// fullscreen for the terminal reader: hides everything but the pages
///
/// requests are queued and applied by the event loop, mirroring how a
/// browser reports the change asynchronously
#[derive(Debug, Clone, Default)]
pub struct TerminalFullscreen {
    active: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<bool>>>,
}

impl TerminalFullscreen {
    /// the queued change, applied to the shared state
    pub fn take_change(&self) -> Option<bool> {
        let change = self.pending.take()?;
        self.active.set(change);
        Some(change)
    }
}

impl Fullscreen for TerminalFullscreen {
    fn request(&mut self, element: ElementId) -> Result<()> {
        log::debug!("terminal fullscreen requested for #{}", element.as_str());
        self.pending.set(Some(true));
        Ok(())
    }

    fn exit(&mut self) -> Result<()> {
        self.pending.set(Some(false));
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_panics_doc)]
    use {
        super::*,
        assert2::check as assert,
        flipbook::types::LayoutMode,
    };

    #[test]
    fn test_stage_width_follows_columns() {
        let stage = TerminalStage::for_columns(100);
        assert!(stage.viewport_width() == 800);
        assert!(stage.has_element("anything"));
    }

    #[test]
    fn test_attach_needs_an_id() {
        let mut stage = TerminalStage::new(640);
        assert!(stage.attach("").is_none());
        assert!(stage.attach("flipbook").is_some());
    }

    #[test]
    fn test_surface_tracks_mounts_and_updates() {
        let mut surface = PlanSurface::default();
        let plan = RenderPlan::compute(3, 0, LayoutMode::Single, None);
        surface.mount(&plan);
        surface.update(&RenderPlan::compute(3, 1, LayoutMode::Single, None));
        assert!(surface.mounts() == 1);
        assert!(surface.plan().map(|p| p.current) == Some(1));
        surface.clear();
        assert!(surface.plan().is_none());
    }

    #[test]
    fn test_fullscreen_change_is_applied_once_taken() {
        let mut fullscreen = TerminalFullscreen::default();
        fullscreen.request(ElementId::Viewer).unwrap();
        assert!(!fullscreen.is_active());
        assert!(fullscreen.take_change() == Some(true));
        assert!(fullscreen.is_active());
        assert!(fullscreen.take_change().is_none());

        fullscreen.exit().unwrap();
        assert!(fullscreen.take_change() == Some(false));
        assert!(!fullscreen.is_active());
    }
}
