//! Application controller and coordination layer
//!
//! The controller owns the monitor registry, the layout model and the
//! interaction state, and wires them to the position store and the desktop
//! manager. Every handler returns whether the surface needs a redraw.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::app::state::{CommitRequest, InteractionMachine, InteractionState, PointerEvent, Transition};
use crate::domain::core::ScreenPoint;
use crate::domain::layout::LayoutModel;
use crate::domain::monitors::{MonitorRect, MonitorRegistry};
use crate::store::{AttributeBackend, GioBackend, ManagerRefresher, PositionStore, ProcessRefresher};
use crate::ui::SceneLayout;

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Window error: {0}")]
    Window(#[from] crate::platform::WindowError),
}

/// Controller used by the real application
pub type DesktopController = AppController<GioBackend, ProcessRefresher>;

pub struct AppController<B, R> {
    registry: MonitorRegistry,
    model: LayoutModel,
    state: InteractionState,
    store: PositionStore<B>,
    refresher: R,
    refresh_on_commit: bool,
}

impl<B: AttributeBackend, R: ManagerRefresher> AppController<B, R> {
    /// Creates a controller and performs the initial load
    pub fn new(
        registry: MonitorRegistry,
        hit_radius: u32,
        store: PositionStore<B>,
        refresher: R,
        refresh_on_commit: bool,
    ) -> Self {
        let model = LayoutModel::new(registry.virtual_canvas(), hit_radius);
        let mut controller = Self {
            registry,
            model,
            state: InteractionState::Idle,
            store,
            refresher,
            refresh_on_commit,
        };
        controller.reload();
        controller
    }

    pub fn model(&self) -> &LayoutModel {
        &self.model
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Reloads every position from the store
    ///
    /// Ignored while a drag is active. A listing failure keeps the current set.
    pub fn reload(&mut self) -> bool {
        if self.state.is_dragging() {
            debug!("reload ignored during drag");
            return false;
        }

        match self.store.load_all() {
            Ok(positions) => {
                self.model.rebuild_from(positions);
                if self.model.is_empty() {
                    info!("no desktop file has a stored position");
                } else {
                    debug!(icons = self.model.len(), "icons reloaded");
                }
                true
            }
            Err(err) => {
                warn!("reload failed: {err}");
                false
            }
        }
    }

    /// Surface resize notification
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let scale = self.model.recompute_scale(width, height);
        debug!(width, height, scale, "surface resized");
        true
    }

    /// Display configuration change: new monitor set, new canvas, new scale
    pub fn display_changed(&mut self, monitors: Vec<MonitorRect>) -> bool {
        self.registry.replace(monitors);
        self.model.set_canvas(self.registry.virtual_canvas());
        info!(
            monitors = self.registry.monitors().len(),
            canvas = ?self.registry.virtual_canvas(),
            "display configuration changed"
        );
        true
    }

    pub fn pointer_down(&mut self, point: ScreenPoint) -> bool {
        self.dispatch(PointerEvent::Down(point))
    }

    pub fn pointer_move(&mut self, point: ScreenPoint) -> bool {
        self.dispatch(PointerEvent::Move(point))
    }

    pub fn pointer_up(&mut self, point: ScreenPoint) -> bool {
        self.dispatch(PointerEvent::Up(point))
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.dispatch(PointerEvent::Cancel)
    }

    /// Geometry for the next frame
    pub fn scene(&self) -> SceneLayout {
        SceneLayout::build(&self.registry, &self.model)
    }

    fn dispatch(&mut self, event: PointerEvent) -> bool {
        let (state, transition) = InteractionMachine::process_event(self.state, event, &mut self.model);
        self.state = state;

        let redraw = transition.needs_redraw();
        if let Transition::Commit(commit) = transition {
            self.commit(commit);
        }
        redraw
    }

    /// Persists a released drag, then asks the manager to reload
    ///
    /// A failed save leaves the model at the dragged position; the user can
    /// retry by dragging again.
    fn commit(&mut self, commit: CommitRequest) {
        match self.store.save(&commit.path, commit.position) {
            Ok(()) => info!(
                entity = commit.entity.index(),
                path = %commit.path.display(),
                x = commit.position.x,
                y = commit.position.y,
                "icon position saved"
            ),
            Err(err) => warn!(path = %commit.path.display(), "failed to save icon position: {err}"),
        }

        if self.refresh_on_commit {
            if let Err(err) = self.refresher.refresh() {
                debug!("desktop manager refresh failed: {err}");
            }
        }
    }
}
