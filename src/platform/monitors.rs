//! Monitor enumeration and DPI-aware coordinate handling
//!
//! Enumerates all connected monitors as absolute rectangles in the Windows
//! virtual coordinate system, where secondary monitors can have negative
//! coordinates. The process must be per-monitor DPI aware for these to be
//! real pixels.

use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::UI::HiDpi::*;

use crate::domain::monitors::{MonitorRect, MonitorSource};

/// Error types for monitor operations
#[derive(Debug)]
pub enum MonitorError {
    /// Failed to enumerate monitors
    EnumerationFailed,
}

impl std::fmt::Display for MonitorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::EnumerationFailed => write!(f, "Failed to enumerate monitors"),
        }
    }
}

impl std::error::Error for MonitorError {}

/// Callback function for monitor enumeration
///
/// Enumeration continues past monitors that fail to report their info; a
/// partial set is better than none.
unsafe extern "system" fn enum_monitor_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _rect: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    unsafe {
        let monitors = &mut *(lparam.0 as *mut Vec<MonitorRect>);

        let mut monitor_info = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };

        if GetMonitorInfoW(hmonitor, &mut monitor_info) == FALSE {
            return TRUE;
        }

        let mut dpi_x: u32 = 96;
        let mut dpi_y: u32 = 96;
        if GetDpiForMonitor(hmonitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y).is_err() {
            dpi_x = 96;
        }

        let bounds = monitor_info.rcMonitor;
        monitors.push(
            MonitorRect::new(
                bounds.left,
                bounds.top,
                bounds.right - bounds.left,
                bounds.bottom - bounds.top,
            )
            .with_scale_factor(dpi_x as f32 / 96.0),
        );

        TRUE
    }
}

/// Enumerates all monitors in absolute desktop pixels
pub fn enumerate_monitors() -> Result<Vec<MonitorRect>, MonitorError> {
    let mut monitors: Vec<MonitorRect> = Vec::new();

    unsafe {
        if EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_proc),
            LPARAM(&mut monitors as *mut _ as isize),
        ) == FALSE
        {
            return Err(MonitorError::EnumerationFailed);
        }
    }

    Ok(monitors)
}

/// Display query backed by `EnumDisplayMonitors`
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Monitors;

impl MonitorSource for Win32Monitors {
    type Error = MonitorError;

    fn query(&self) -> Result<Vec<MonitorRect>, Self::Error> {
        enumerate_monitors()
    }
}

/// Opts the process into per-monitor DPI awareness so monitor rectangles and
/// client coordinates are real pixels
pub fn enable_dpi_awareness() {
    if let Err(err) =
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
    {
        tracing::debug!("DPI awareness not changed: {err}");
    }
}
