pub mod renderer;

pub use renderer::{RendererError, SceneLayout, SceneRenderer};
