pub mod controller;
pub mod state;

pub use controller::{AppController, AppError, DesktopController};
