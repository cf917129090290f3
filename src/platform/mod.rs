//! Platform window and display integration
//!
//! Windows talks to Win32 directly for monitor enumeration and the main
//! window. Every other target opens the window through winit. Both expose the
//! same `run` entry point and `WindowError`; everything outside this module is
//! platform independent.

#[cfg(not(windows))]
pub mod desktop;
#[cfg(windows)]
pub mod monitors;
#[cfg(windows)]
pub mod window;

#[cfg(not(windows))]
pub use desktop::{WindowError, run};
#[cfg(windows)]
pub use window::{WindowError, run};
