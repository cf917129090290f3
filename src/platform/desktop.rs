//! Main window on X11 and Wayland desktops
//!
//! winit runs the event loop and reports the monitors, softbuffer presents the
//! frames tiny-skia renders. Window sizes and pointer positions are physical
//! pixels, the unit the renderer draws in.
//!
//! Event mapping:
//! - Resized: rescale
//! - left button and cursor motion: drag state machine
//! - focus loss: cancel the current drag
//! - F5: reload positions, Escape: cancel the current drag
//! - ScaleFactorChanged: re-detect monitors
//! - RedrawRequested: render and present

use std::convert::Infallible;
use std::num::NonZeroU32;
use std::rc::Rc;

use softbuffer::{Context, SoftBufferError, Surface};
use tiny_skia::Pixmap;
use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{CursorIcon, Window, WindowId};

use crate::app::DesktopController;
use crate::domain::core::ScreenPoint;
use crate::domain::monitors::{MonitorRect, MonitorRegistry, MonitorSource};
use crate::ui::SceneRenderer;

/// Window errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to run the event loop: {0}")]
    EventLoop(#[from] EventLoopError),

    #[error("Failed to create the main window: {0}")]
    WindowCreationFailed(#[from] OsError),

    #[error("Failed to set up the drawing surface: {0}")]
    Surface(#[from] SoftBufferError),
}

/// Display query backed by the running event loop
pub struct WinitMonitors<'a>(pub &'a ActiveEventLoop);

impl MonitorSource for WinitMonitors<'_> {
    type Error = Infallible;

    fn query(&self) -> Result<Vec<MonitorRect>, Self::Error> {
        Ok(self
            .0
            .available_monitors()
            .map(|monitor| monitor_rect(monitor.position(), monitor.size(), monitor.scale_factor()))
            .collect())
    }
}

fn monitor_rect(position: PhysicalPosition<i32>, size: PhysicalSize<u32>, scale_factor: f64) -> MonitorRect {
    let width = i32::try_from(size.width).unwrap_or(i32::MAX);
    let height = i32::try_from(size.height).unwrap_or(i32::MAX);
    MonitorRect::new(position.x, position.y, width, height).with_scale_factor(scale_factor as f32)
}

fn screen_point(position: PhysicalPosition<f64>) -> ScreenPoint {
    ScreenPoint::new(position.x, position.y)
}

/// Packs one BGRA pixel into softbuffer's `0RGB` word
fn xrgb_from_bgra(pixel: &[u8]) -> u32 {
    (u32::from(pixel[2]) << 16) | (u32::from(pixel[1]) << 8) | u32::from(pixel[0])
}

/// The open window and the surface it presents through
struct Presenter {
    window: Rc<Window>,
    // Kept alive for as long as the surface
    _context: Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
}

impl Presenter {
    fn present(&mut self, renderer: &SceneRenderer, pixmap: &Pixmap) -> Result<(), SoftBufferError> {
        let (Some(width), Some(height)) = (NonZeroU32::new(pixmap.width()), NonZeroU32::new(pixmap.height()))
        else {
            return Ok(());
        };
        self.surface.resize(width, height)?;

        let pixels = renderer.pixmap_to_bgra(pixmap);
        let mut buffer = self.surface.buffer_mut()?;
        for (word, pixel) in buffer.iter_mut().zip(pixels.chunks_exact(4)) {
            *word = xrgb_from_bgra(pixel);
        }
        buffer.present()
    }
}

struct DesktopApp {
    controller: DesktopController,
    renderer: SceneRenderer,
    requested_size: LogicalSize<f64>,
    presenter: Option<Presenter>,
    cursor: ScreenPoint,
    error: Option<WindowError>,
}

impl DesktopApp {
    fn new(controller: DesktopController, width: u32, height: u32) -> Self {
        Self {
            controller,
            renderer: SceneRenderer::new(),
            requested_size: LogicalSize::new(f64::from(width), f64::from(height)),
            presenter: None,
            cursor: ScreenPoint::default(),
            error: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), WindowError> {
        self.detect_monitors(event_loop);

        let attributes = Window::default_attributes()
            .with_title("Desktop Icon Layout")
            .with_inner_size(self.requested_size)
            .with_resizable(true);
        let window = Rc::new(event_loop.create_window(attributes)?);
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;

        let size = window.inner_size();
        self.controller.resize(size.width, size.height);
        window.request_redraw();
        info!(width = size.width, height = size.height, "window opened");

        self.presenter = Some(Presenter {
            window,
            _context: context,
            surface,
        });
        Ok(())
    }

    fn detect_monitors(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let registry = MonitorRegistry::detect(&WinitMonitors(event_loop));
        self.controller.display_changed(registry.monitors().to_vec())
    }

    fn handle_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::F5) => {
                info!("reloading icon positions");
                self.controller.reload()
            }
            Key::Named(NamedKey::Escape) => self.controller.cancel_drag(),
            _ => false,
        }
    }

    fn paint(&mut self) {
        let Some(presenter) = self.presenter.as_mut() else {
            return;
        };

        match self.renderer.render_layout(&self.controller.scene()) {
            Ok(pixmap) => {
                if let Err(err) = presenter.present(&self.renderer, &pixmap) {
                    warn!("failed to present frame: {err}");
                }
            }
            Err(err) => debug!("skipping paint: {err}"),
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.presenter.is_some() {
            return;
        }
        if let Err(err) = self.open(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let changed = match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                false
            }
            WindowEvent::Resized(size) => self.controller.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => self.detect_monitors(event_loop),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = screen_point(position);
                self.controller.pointer_move(self.cursor)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.controller.pointer_down(self.cursor),
                ElementState::Released => self.controller.pointer_up(self.cursor),
            },
            WindowEvent::Focused(false) => self.controller.cancel_drag(),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                self.handle_key(&event.logical_key)
            }
            WindowEvent::RedrawRequested => {
                self.paint();
                false
            }
            _ => false,
        };

        if changed {
            if let Some(presenter) = &self.presenter {
                let cursor = if self.controller.state().is_dragging() {
                    CursorIcon::Grabbing
                } else {
                    CursorIcon::Default
                };
                presenter.window.set_cursor(cursor);
                presenter.window.request_redraw();
            }
        }
    }
}

/// Opens the window and runs the event loop until it is closed
pub fn run(controller: DesktopController, width: u32, height: u32) -> Result<(), WindowError> {
    let event_loop = EventLoop::new()?;
    let mut app = DesktopApp::new(controller, width, height);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.error.take() {
        return Err(err);
    }
    info!("window closed");
    Ok(())
}
