//! Schematic rendering using tiny-skia
//!
//! Layout calculation is separated from rasterisation: [`SceneLayout`] maps
//! monitors and icons into surface coordinates, [`SceneRenderer`] paints it.

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect as SkiaRect, Stroke, Transform};

use crate::domain::core::VirtualPoint;
use crate::domain::layout::LayoutModel;
use crate::domain::monitors::MonitorRegistry;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidSurfaceDimensions { width: u32, height: u32 },
}

/// A monitor outline in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub width: f32,
    pub color: Color,
}

/// An icon dot in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
}

/// Pre-calculated geometry for one frame
#[derive(Debug, Clone)]
pub struct SceneLayout {
    pub outlines: Vec<Outline>,
    pub dots: Vec<Dot>,
    pub background: Color,
    pub surface_width: u32,
    pub surface_height: u32,
}

impl SceneLayout {
    const OUTLINE_WIDTH: f32 = 2.0;

    pub fn outline_color() -> Color {
        Color::from_rgba8(179, 179, 179, 255)
    }

    pub fn dot_color() -> Color {
        Color::from_rgba8(0, 0, 255, 255)
    }

    pub fn dragging_color() -> Color {
        Color::from_rgba8(230, 80, 0, 255)
    }

    /// Builds the frame for the model's current scale and surface size
    ///
    /// Dots keep the hit radius regardless of scale: the radius is a pointer
    /// affordance, not a size in virtual space.
    pub fn build(registry: &MonitorRegistry, model: &LayoutModel) -> Self {
        let (surface_width, surface_height) = model.surface_size();
        let scale = model.scale() as f32;

        let outlines = registry
            .monitors()
            .iter()
            .map(|monitor| {
                let origin = model.to_screen(VirtualPoint::new(monitor.rect.x, monitor.rect.y));
                Outline {
                    x: origin.x as f32,
                    y: origin.y as f32,
                    w: monitor.rect.w as f32 * scale,
                    h: monitor.rect.h as f32 * scale,
                    width: Self::OUTLINE_WIDTH,
                    color: Self::outline_color(),
                }
            })
            .collect();

        let radius = model.hit_radius() as f32;
        let dots = model
            .entities()
            .iter()
            .map(|entity| {
                let center = model.to_screen(entity.position);
                Dot {
                    x: center.x as f32,
                    y: center.y as f32,
                    radius,
                    color: if entity.dragging {
                        Self::dragging_color()
                    } else {
                        Self::dot_color()
                    },
                }
            })
            .collect();

        Self {
            outlines,
            dots,
            background: Color::WHITE,
            surface_width,
            surface_height,
        }
    }
}

/// Rasterises scene layouts into pixmaps
#[derive(Debug, Default)]
pub struct SceneRenderer;

impl SceneRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a scene layout to a pixmap
    pub fn render_layout(&self, layout: &SceneLayout) -> Result<Pixmap, RendererError> {
        if layout.surface_width == 0 || layout.surface_height == 0 {
            return Err(RendererError::InvalidSurfaceDimensions {
                width: layout.surface_width,
                height: layout.surface_height,
            });
        }

        let mut pixmap = Pixmap::new(layout.surface_width, layout.surface_height)
            .ok_or(RendererError::PixmapCreationFailed)?;
        pixmap.fill(layout.background);

        self.render_outlines(&mut pixmap, &layout.outlines);
        self.render_dots(&mut pixmap, &layout.dots);

        Ok(pixmap)
    }

    fn render_outlines(&self, pixmap: &mut Pixmap, outlines: &[Outline]) {
        for outline in outlines {
            // Degenerate (zero-area) monitors have nothing to draw
            let Some(rect) = SkiaRect::from_xywh(outline.x, outline.y, outline.w, outline.h) else {
                continue;
            };
            let path = PathBuilder::from_rect(rect);

            let mut paint = Paint::default();
            paint.set_color(outline.color);

            let stroke = Stroke {
                width: outline.width,
                ..Stroke::default()
            };

            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn render_dots(&self, pixmap: &mut Pixmap, dots: &[Dot]) {
        for dot in dots {
            let Some(path) = PathBuilder::from_circle(dot.x, dot.y, dot.radius) else {
                continue;
            };

            let mut paint = Paint::default();
            paint.set_color(dot.color);
            paint.anti_alias = true;

            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    /// Converts a pixmap to the BGRA byte order GDI expects
    pub fn pixmap_to_bgra(&self, pixmap: &Pixmap) -> Vec<u8> {
        let mut data = pixmap.data().to_vec();
        for pixel in data.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
        data
    }
}
