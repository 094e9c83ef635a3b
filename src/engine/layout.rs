//! the render plan and the display adapters it is handed to

use crate::types::{FlipDirection, LayoutMode};

/// a flip that is currently playing on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flip {
    /// zero-based index of the page being turned
    pub page: usize,
    /// which way it turns
    pub direction: FlipDirection,
}

/// how one page should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlot {
    /// zero-based page index, also the front face content
    pub index: usize,
    /// content index shown on the back face, spread mode only
    pub back: Option<usize>,
    /// stacking order, higher is on top
    pub z_index: usize,
    /// flipped out of view to the left
    pub turned: bool,
    /// drawn at all
    pub visible: bool,
    /// set on the departing page while a flip plays
    pub flip: Option<FlipDirection>,
}

/// description of the whole page stack for one engine state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    /// layout strategy the slots were computed for
    pub mode: LayoutMode,
    /// zero-based current page
    pub current: usize,
    /// one slot per page, in page order
    pub slots: Vec<PageSlot>,
}

impl RenderPlan {
    /// computes the plan for a page count, position, mode and in-flight flip
    ///
    /// pure, so the navigation logic can be checked without any surface
    #[allow(clippy::arithmetic_side_effects)]
    pub fn compute(total: usize, current: usize, mode: LayoutMode, flip: Option<Flip>) -> Self {
        let slots = (0..total)
            .map(|index| {
                let flip = flip.filter(|f| f.page == index).map(|f| f.direction);
                let z_index = total - index.abs_diff(current);

                match mode {
                    LayoutMode::Spread => PageSlot {
                        index,
                        back: (index + 1 < total).then_some(index + 1),
                        z_index,
                        turned: index < current,
                        visible: true,
                        flip,
                    },
                    LayoutMode::Single => PageSlot {
                        index,
                        back: None,
                        z_index,
                        turned: false,
                        visible: index == current,
                        flip: None,
                    },
                }
            })
            .collect();

        Self {
            mode,
            current,
            slots,
        }
    }

    /// the slots that are actually drawn
    pub fn visible(&self) -> impl Iterator<Item = &PageSlot> {
        self.slots.iter().filter(|s| s.visible)
    }

    /// the slot of the current page, if any
    pub fn current_slot(&self) -> Option<&PageSlot> {
        self.slots.get(self.current)
    }
}

/// the thing a flipbook draws into
///
/// `mount` rebuilds every page node, `update` only toggles the per-page
/// state (turned, visible, flipping) after a navigation
pub trait Surface {
    /// full re-render
    fn mount(&mut self, plan: &RenderPlan);
    /// visibility / class update
    fn update(&mut self, plan: &RenderPlan);
    /// remove everything that was rendered
    fn clear(&mut self);
}

/// resolves element ids into surfaces and reports viewport metrics
pub trait Stage {
    /// what `attach` hands back
    type Surface: Surface;

    /// binds a surface to the element with `id`, `None` when there is no such
    /// element
    fn attach(&mut self, id: &str) -> Option<Self::Surface>;

    /// whether an element with `id` exists in the host markup
    fn has_element(&self, id: &str) -> bool;

    /// current viewport width in css pixels
    fn viewport_width(&self) -> u32;
}

/// surface that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn mount(&mut self, _plan: &RenderPlan) {}
    fn update(&mut self, _plan: &RenderPlan) {}
    fn clear(&mut self) {}
}
