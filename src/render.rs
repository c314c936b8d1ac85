//! Render command batching - decouples scene building from GPU execution
//!
//! Draw ops are turned into rect and glyph instances, and consecutive
//! instances of the same kind are grouped so the GPU draws each group in one
//! call while keeping the painter's order between groups.

use crate::font::{GlyphQuad, SharedFontSystem};
use crate::layout::Rect;
use crate::scene::DrawOp;
use crate::theme::Color;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectInstance {
    pub rect: Rect,
    pub color: Color,
}

/// Single glyph instance (physical pixels)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInstance {
    pub quad: GlyphQuad,
    pub color: Color,
}

/// Batched draw call for GPU
#[derive(Clone, Debug, PartialEq)]
pub enum BatchedDraw {
    /// Multiple rects
    RectBatch { instances: Vec<RectInstance> },
    /// Multiple glyphs in one draw call
    GlyphBatch { instances: Vec<GlyphInstance> },
}

/// Converts draw ops to batches
pub struct Renderer {
    font_system: SharedFontSystem,
    /// Physical font size in pixels
    font_px: f32,
}

impl Renderer {
    pub fn new(font_system: SharedFontSystem, font_px: f32) -> Self {
        Self {
            font_system,
            font_px,
        }
    }

    pub fn set_font_px(&mut self, font_px: f32) {
        self.font_px = font_px;
    }

    pub fn render(&self, ops: &[DrawOp]) -> Vec<BatchedDraw> {
        let mut batches: Vec<BatchedDraw> = Vec::new();

        for op in ops {
            match op {
                DrawOp::Rect { rect, color } => {
                    let instance = RectInstance {
                        rect: *rect,
                        color: *color,
                    };
                    match batches.last_mut() {
                        Some(BatchedDraw::RectBatch { instances }) => instances.push(instance),
                        _ => batches.push(BatchedDraw::RectBatch {
                            instances: vec![instance],
                        }),
                    }
                }
                DrawOp::Text { x, y, text, color } => {
                    let quads = self.font_system.layout_line(text, self.font_px, *x, *y);
                    if quads.is_empty() {
                        continue;
                    }
                    let glyphs = quads.into_iter().map(|quad| GlyphInstance {
                        quad,
                        color: *color,
                    });
                    match batches.last_mut() {
                        Some(BatchedDraw::GlyphBatch { instances }) => instances.extend(glyphs),
                        _ => batches.push(BatchedDraw::GlyphBatch {
                            instances: glyphs.collect(),
                        }),
                    }
                }
            }
        }

        batches
    }
}
