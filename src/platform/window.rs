//! Main application window
//!
//! A single resizable top-level window hosts the schematic. The window
//! procedure turns Win32 messages into controller calls:
//! - WM_SIZE: rescale
//! - left button down/move/up: drag state machine (mouse captured during a drag)
//! - F5: reload positions, Escape: cancel the current drag
//! - WM_DISPLAYCHANGE: re-detect monitors
//! - WM_PAINT: render the scene with tiny-skia and blit it
//!
//! Any controller call that reports a change invalidates the client area, so
//! every state change is followed by exactly one repaint.

use std::ffi::c_void;

use tracing::{debug, info, warn};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BeginPaint, DIB_RGB_COLORS, EndPaint, InvalidateRect,
    PAINTSTRUCT, SetDIBitsToDevice,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture, VK_ESCAPE, VK_F5};
use windows::Win32::UI::WindowsAndMessaging::{
    CREATESTRUCTW, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, CreateWindowExW, DefWindowProcW,
    DispatchMessageW, GWLP_USERDATA, GetMessageW, GetWindowLongPtrW, IDC_ARROW, LoadCursorW, MSG,
    PostQuitMessage, RegisterClassW, SetWindowLongPtrW, TranslateMessage, WM_CAPTURECHANGED,
    WM_DESTROY, WM_DISPLAYCHANGE, WM_ERASEBKGND, WM_KEYDOWN, WM_LBUTTONDOWN, WM_LBUTTONUP,
    WM_MOUSEMOVE, WM_NCCREATE, WM_NCDESTROY, WM_PAINT, WM_SIZE, WNDCLASSW, WS_OVERLAPPEDWINDOW,
    WS_VISIBLE,
};
use windows::core::w;

use crate::app::DesktopController;
use crate::domain::core::ScreenPoint;
use crate::platform::monitors::enumerate_monitors;
use crate::ui::{RendererError, SceneRenderer};

/// Window errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to get module handle")]
    ModuleHandleFailed,

    #[error("Failed to register window class")]
    WindowClassRegistrationFailed,

    #[error("Failed to create the main window")]
    WindowCreationFailed,
}

/// Everything the window procedure needs, owned by the window for its lifetime
struct WindowState {
    controller: DesktopController,
    renderer: SceneRenderer,
}

/// Opens the window and runs the message loop until it is closed
pub fn run(controller: DesktopController, width: u32, height: u32) -> Result<(), WindowError> {
    let class_name = w!("IconLayoutWindow");
    let hinstance = unsafe { GetModuleHandleW(None) }.map_err(|_| WindowError::ModuleHandleFailed)?;

    let wc = WNDCLASSW {
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(window_proc),
        hInstance: hinstance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
        lpszClassName: class_name,
        ..Default::default()
    };

    if unsafe { RegisterClassW(&wc) } == 0 {
        return Err(WindowError::WindowClassRegistrationFailed);
    }

    let state = Box::into_raw(Box::new(WindowState {
        controller,
        renderer: SceneRenderer::new(),
    }));

    let hwnd = unsafe {
        CreateWindowExW(
            Default::default(),
            class_name,
            w!("Desktop Icon Layout"),
            WS_OVERLAPPEDWINDOW | WS_VISIBLE,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            width as i32,
            height as i32,
            None,
            None,
            hinstance,
            Some(state as *const c_void),
        )
    };

    if hwnd.0 == 0 {
        // The window never took ownership of the state
        drop(unsafe { Box::from_raw(state) });
        return Err(WindowError::WindowCreationFailed);
    }

    info!(width, height, "window opened");

    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 == 0 || result.0 == -1 {
            break;
        }

        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // WM_NCDESTROY has detached the state from the window
    drop(unsafe { Box::from_raw(state) });
    info!("window closed");
    Ok(())
}

/// Extracts signed client coordinates from a mouse message
fn point_from_lparam(lparam: LPARAM) -> ScreenPoint {
    let x = (lparam.0 & 0xffff) as u16 as i16;
    let y = ((lparam.0 >> 16) & 0xffff) as u16 as i16;
    ScreenPoint::new(f64::from(x), f64::from(y))
}

/// Extracts the client size from WM_SIZE
fn size_from_lparam(lparam: LPARAM) -> (u32, u32) {
    ((lparam.0 & 0xffff) as u32, ((lparam.0 >> 16) & 0xffff) as u32)
}

fn invalidate_if(hwnd: HWND, changed: bool) -> LRESULT {
    if changed {
        unsafe {
            InvalidateRect(hwnd, None, false);
        }
    }
    LRESULT(0)
}

/// Runs `f` against the state attached to `hwnd`
///
/// The borrow ends when `f` returns, so calls that re-enter the window
/// procedure (capture release, painting) must happen outside `f`.
unsafe fn with_state<T>(hwnd: HWND, f: impl FnOnce(&mut WindowState) -> T) -> Option<T> {
    let state = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut WindowState;
    if state.is_null() {
        None
    } else {
        Some(f(unsafe { &mut *state }))
    }
}

fn handle_key(controller: &mut DesktopController, wparam: WPARAM) -> bool {
    let key = wparam.0 as u16;
    if key == VK_F5.0 {
        info!("reloading icon positions");
        controller.reload()
    } else if key == VK_ESCAPE.0 {
        controller.cancel_drag()
    } else {
        false
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe {
        // Some(changed) when the state handled the message, None to fall through
        let handled = match msg {
            WM_NCCREATE => {
                let create = &*(lparam.0 as *const CREATESTRUCTW);
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
                None
            }
            WM_SIZE => {
                let (width, height) = size_from_lparam(lparam);
                with_state(hwnd, |state| state.controller.resize(width, height))
            }
            WM_LBUTTONDOWN => with_state(hwnd, |state| {
                let changed = state.controller.pointer_down(point_from_lparam(lparam));
                (changed, state.controller.state().is_dragging())
            })
            .map(|(changed, dragging)| {
                if dragging {
                    SetCapture(hwnd);
                }
                changed
            }),
            WM_MOUSEMOVE => with_state(hwnd, |state| {
                state.controller.pointer_move(point_from_lparam(lparam))
            }),
            WM_LBUTTONUP => {
                let changed = with_state(hwnd, |state| {
                    state.controller.pointer_up(point_from_lparam(lparam))
                });
                // Delivers WM_CAPTURECHANGED before returning
                let _ = ReleaseCapture();
                changed
            }
            // Capture lost mid-drag (another window grabbed the mouse)
            WM_CAPTURECHANGED => with_state(hwnd, |state| state.controller.cancel_drag()),
            WM_KEYDOWN => with_state(hwnd, |state| handle_key(&mut state.controller, wparam)),
            WM_DISPLAYCHANGE => {
                let monitors = enumerate_monitors().unwrap_or_else(|err| {
                    warn!("monitor detection failed, using a 1x1 canvas: {err}");
                    Vec::new()
                });
                with_state(hwnd, |state| state.controller.display_changed(monitors))
            }
            WM_PAINT => {
                let frame = with_state(hwnd, |state| {
                    let renderer = &state.renderer;
                    renderer
                        .render_layout(&state.controller.scene())
                        .map(|pixmap| (pixmap.width(), pixmap.height(), renderer.pixmap_to_bgra(&pixmap)))
                });
                frame.map(|frame| {
                    paint(hwnd, frame);
                    false
                })
            }
            // The whole client area is blitted on paint
            WM_ERASEBKGND => return LRESULT(1),
            WM_DESTROY => {
                PostQuitMessage(0);
                return LRESULT(0);
            }
            WM_NCDESTROY => {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                None
            }
            _ => None,
        };

        match handled {
            Some(changed) => invalidate_if(hwnd, changed),
            None => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

/// Copies a rendered frame into the client area
///
/// `BeginPaint` can re-enter the window procedure, so the frame is rendered
/// before the state borrow is released.
fn paint(hwnd: HWND, frame: Result<(u32, u32, Vec<u8>), RendererError>) {
    unsafe {
        let mut ps = PAINTSTRUCT::default();
        let hdc = BeginPaint(hwnd, &mut ps);

        match frame {
            Ok((width, height, pixels)) => {
                let mut bitmap_info = BITMAPINFO::default();
                bitmap_info.bmiHeader = BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width as i32,
                    biHeight: -(height as i32), // top-down rows, same as the pixmap
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                };

                SetDIBitsToDevice(
                    hdc,
                    0,
                    0,
                    width,
                    height,
                    0,
                    0,
                    0,
                    height,
                    pixels.as_ptr() as *const c_void,
                    &bitmap_info,
                    DIB_RGB_COLORS,
                );
            }
            Err(err) => debug!("skipping paint: {err}"),
        }

        let _ = EndPaint(hwnd, &ps);
    }
}
