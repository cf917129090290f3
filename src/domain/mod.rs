//! Domain logic and core data structures
//!
//! This module contains the virtual-canvas layout engine. It is pure logic,
//! independent of Win32, the attribute store and the desktop manager.

pub mod core;
pub mod layout;
pub mod monitors;
