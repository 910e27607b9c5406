//! The view lifecycle: the phase gate consulted by the box editor.
//!
//! A frame moves through style recalculation, tree rebuild, layout and paint
//! in that order. Each active phase is entered through
//! [`ViewLifecycle::start`], which hands back a [`LifecycleScope`]; dropping
//! the scope moves the lifecycle to the matching clean phase. The box tree
//! only queries this object, it never drives it.

use std::cell::{Cell, RefCell};
use std::fmt;

use serde::Serialize;
use strum_macros::{Display as StrumDisplay, EnumIter};
use thiserror::Error;

/// Where a frame currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay, EnumIter)]
pub enum Phase {
    /// Something changed; a new frame is needed.
    VisualUpdatePending,
    /// The style resolver is pushing styles.
    InStyleRecalc,
    /// Styles are up to date.
    StyleClean,
    /// Boxes are being created, attached and detached.
    InTreeRebuild,
    /// The box tree shape is up to date.
    TreeClean,
    /// Bounds are being computed.
    InLayout,
    /// Bounds are up to date.
    LayoutClean,
    /// The paint driver is consuming change flags.
    InPaint,
    /// The frame is complete.
    PaintClean,
    /// The view is being torn down.
    Shutdown,
}

impl Phase {
    /// Active phases are entered through a [`LifecycleScope`].
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::InStyleRecalc | Self::InTreeRebuild | Self::InLayout | Self::InPaint
        )
    }

    /// The phase reached when an active phase finishes.
    #[must_use]
    pub const fn clean_phase(self) -> Option<Self> {
        match self {
            Self::InStyleRecalc => Some(Self::StyleClean),
            Self::InTreeRebuild => Some(Self::TreeClean),
            Self::InLayout => Some(Self::LayoutClean),
            Self::InPaint => Some(Self::PaintClean),
            _ => None,
        }
    }

    /// Position within a frame. A finished frame counts as the start of the
    /// next one.
    const fn order(self) -> u8 {
        match self {
            Self::VisualUpdatePending | Self::PaintClean => 0,
            Self::InStyleRecalc => 1,
            Self::StyleClean => 2,
            Self::InTreeRebuild => 3,
            Self::TreeClean => 4,
            Self::InLayout => 5,
            Self::LayoutClean => 6,
            Self::InPaint => 7,
            Self::Shutdown => u8::MAX,
        }
    }
}

/// Illegal phase transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Phases only move forward within a frame, one active phase at a time;
    /// style and tree work may be redone until layout starts.
    #[error("cannot enter {to} while in {from}")]
    InvalidTransition {
        /// The phase the lifecycle was in.
        from: Phase,
        /// The phase that was requested.
        to: Phase,
    },
    /// Only active phases can be started.
    #[error("{0} is not an active phase")]
    NotActivePhase(Phase),
    /// Nothing can start after shutdown.
    #[error("lifecycle has shut down")]
    ShutDown,
}

/// The phase gate shared by a box tree and its drivers.
///
/// Single-threaded by construction: state lives in [`Cell`]s and the tree
/// holds it through an `Rc`.
pub struct ViewLifecycle {
    phase: Cell<Phase>,
    update_requested: Cell<bool>,
    on_schedule: RefCell<Option<Box<dyn Fn()>>>,
}

impl ViewLifecycle {
    /// A lifecycle waiting for its first frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Cell::new(Phase::VisualUpdatePending),
            update_requested: Cell::new(true),
            on_schedule: RefCell::new(None),
        }
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Structure, style and dirty flags may change outside of layout and
    /// paint.
    #[must_use]
    pub fn allows_tree_mutations(&self) -> bool {
        !matches!(
            self.phase.get(),
            Phase::InLayout | Phase::LayoutClean | Phase::InPaint
        )
    }

    /// True while bounds are being computed.
    #[must_use]
    pub fn in_layout(&self) -> bool {
        self.phase.get() == Phase::InLayout
    }

    /// True while the paint driver runs.
    #[must_use]
    pub fn in_paint(&self) -> bool {
        self.phase.get() == Phase::InPaint
    }

    /// True once [`ViewLifecycle::shutdown`] has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.phase.get() == Phase::Shutdown
    }

    /// Enter an active phase.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when `phase` is not an active phase, when
    /// another active phase is running, when `phase` would move the frame
    /// backwards past work that layout already consumed, or after shutdown.
    pub fn start(&self, phase: Phase) -> Result<LifecycleScope<'_>, LifecycleError> {
        let current = self.phase.get();
        if current == Phase::Shutdown {
            return Err(LifecycleError::ShutDown);
        }
        if !phase.is_active() {
            return Err(LifecycleError::NotActivePhase(phase));
        }
        // Style and tree results can be rebuilt until layout reads them.
        let is_redo = matches!(current, Phase::StyleClean | Phase::TreeClean)
            && phase.order() <= Phase::InTreeRebuild.order();
        if current.is_active() || (current.order() >= phase.order() && !is_redo) {
            return Err(LifecycleError::InvalidTransition {
                from: current,
                to: phase,
            });
        }
        if current == Phase::PaintClean || current == Phase::VisualUpdatePending {
            self.update_requested.set(false);
        }
        self.phase.set(phase);
        Ok(LifecycleScope {
            lifecycle: self,
            phase,
        })
    }

    /// Ask for another frame. Called by the box editor whenever a box
    /// connected to the document becomes dirty. Ignored after shutdown.
    pub fn schedule_visual_update(&self) {
        if self.is_shutdown() {
            return;
        }
        self.update_requested.set(true);
        self.reset();
        if let Some(callback) = self.on_schedule.borrow().as_ref() {
            callback();
        }
    }

    /// Start over at [`Phase::VisualUpdatePending`] from any resting phase.
    /// Active phases keep running and a shut down lifecycle stays down.
    pub fn reset(&self) {
        let current = self.phase.get();
        if current.is_active() || current == Phase::Shutdown {
            return;
        }
        self.update_requested.set(true);
        self.phase.set(Phase::VisualUpdatePending);
    }

    /// True if a visual update was requested since the last frame started.
    #[must_use]
    pub fn is_visual_update_requested(&self) -> bool {
        self.update_requested.get()
    }

    /// Install the callback run on every [`ViewLifecycle::schedule_visual_update`].
    pub fn set_schedule_callback(&self, callback: impl Fn() + 'static) {
        *self.on_schedule.borrow_mut() = Some(Box::new(callback));
    }

    /// Move to [`Phase::Shutdown`]. Always succeeds; tree mutation is
    /// permitted afterwards so owners can dismantle their trees.
    pub fn shutdown(&self) {
        self.phase.set(Phase::Shutdown);
    }

    fn finish(&self, phase: Phase) {
        if self.phase.get() != phase {
            return;
        }
        if let Some(clean) = phase.clean_phase() {
            self.phase.set(clean);
        }
    }
}

impl Default for ViewLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ViewLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewLifecycle")
            .field("phase", &self.phase.get())
            .field("update_requested", &self.update_requested.get())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ViewLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewLifecycle({})", self.phase.get())
    }
}

/// An entered active phase. Dropping it finishes the phase.
#[must_use = "dropping the scope immediately finishes the phase"]
pub struct LifecycleScope<'a> {
    lifecycle: &'a ViewLifecycle,
    phase: Phase,
}

impl LifecycleScope<'_> {
    /// The phase this scope holds open.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }
}

impl Drop for LifecycleScope<'_> {
    fn drop(&mut self) {
        self.lifecycle.finish(self.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_active_phases_have_clean_phases() {
        for phase in Phase::iter() {
            assert_eq!(phase.is_active(), phase.clean_phase().is_some(), "{phase}");
        }
    }

    #[test]
    fn test_finish_ignores_stale_scope() {
        let lifecycle = ViewLifecycle::new();
        lifecycle.shutdown();
        lifecycle.finish(Phase::InLayout);
        assert_eq!(lifecycle.phase(), Phase::Shutdown);
    }

    #[test]
    fn test_tree_rebuild_reruns_until_layout() {
        let lifecycle = ViewLifecycle::new();
        drop(lifecycle.start(Phase::InTreeRebuild).unwrap());
        assert_eq!(lifecycle.phase(), Phase::TreeClean);

        drop(lifecycle.start(Phase::InTreeRebuild).unwrap());
        drop(lifecycle.start(Phase::InStyleRecalc).unwrap());
        assert_eq!(lifecycle.phase(), Phase::StyleClean);

        drop(lifecycle.start(Phase::InLayout).unwrap());
        assert!(matches!(
            lifecycle.start(Phase::InTreeRebuild),
            Err(LifecycleError::InvalidTransition {
                from: Phase::LayoutClean,
                to: Phase::InTreeRebuild,
            })
        ));
    }

    #[test]
    fn test_schedule_resets_resting_phases() {
        let lifecycle = ViewLifecycle::new();
        drop(lifecycle.start(Phase::InTreeRebuild).unwrap());
        assert!(!lifecycle.is_visual_update_requested());

        lifecycle.schedule_visual_update();

        assert_eq!(lifecycle.phase(), Phase::VisualUpdatePending);
        assert!(lifecycle.is_visual_update_requested());
    }

    #[test]
    fn test_schedule_leaves_active_phase_running() {
        let lifecycle = ViewLifecycle::new();
        let scope = lifecycle.start(Phase::InTreeRebuild).unwrap();

        lifecycle.schedule_visual_update();

        assert_eq!(lifecycle.phase(), Phase::InTreeRebuild);
        assert!(lifecycle.is_visual_update_requested());
        drop(scope);
        assert_eq!(lifecycle.phase(), Phase::TreeClean);
    }
}
