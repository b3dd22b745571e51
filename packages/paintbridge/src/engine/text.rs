use kurbo::Point;

use super::PaintEngine;
use crate::font::{em_size, FontDescription, TextItem};
use crate::native::{DeviceContext, GlyphRun};

impl<C: DeviceContext> PaintEngine<C> {
    /// Looks up `desc` in the font cache, resolving it on a miss.
    ///
    /// A face that cannot be resolved is replaced by the configured fallback family
    /// and cached under the requested description. When the fallback fails too,
    /// nothing is cached and `None` is returned.
    pub(super) fn resolve_font(&mut self, ctx: &mut C, desc: &FontDescription) -> Option<&C::FontFace> {
        if !self.fonts.contains_key(desc) {
            let face = match ctx.create_font_face(desc, &desc.family) {
                Ok(face) => face,
                Err(err) => {
                    tracing::debug!(family = %desc.family, %err, "font not found, trying fallback");
                    let fallback = &self.config.fallback_font_family;
                    match ctx.create_font_face(desc, fallback) {
                        Ok(face) => face,
                        Err(err) => {
                            tracing::debug!(family = %fallback, %err, "fallback font not found");
                            return None;
                        }
                    }
                }
            };
            self.fonts.insert(desc.clone(), face);
        }
        self.fonts.get(desc)
    }

    /// Number of resolved fonts kept by this engine.
    pub fn cached_font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Draws `item` as one glyph run with its baseline starting at `pos`, painted with
    /// the pen's brush.
    pub fn draw_text_item(&mut self, ctx: &mut C, pos: Point, item: &TextItem) {
        if !self.active || item.text.is_empty() || self.pen.brush.is_none() {
            return;
        }
        let em = em_size(item.font.point_size, ctx.dpi().y);
        if self.resolve_font(ctx, &item.font).is_none() {
            return;
        }
        let (Some(face), Some(brush)) = (self.fonts.get(&item.font), &self.pen.brush) else {
            return;
        };
        let shaped = match ctx.shape_text(face, &item.text, em) {
            Ok(shaped) => shaped,
            Err(err) => {
                tracing::warn!(%err, "text shaping failed");
                return;
            }
        };
        let run = GlyphRun {
            font_face: face,
            em_size: em,
            glyph_indices: &shaped.glyph_indices,
            advances: &shaped.advances,
        };
        ctx.draw_glyph_run(pos, &run, brush);
    }
}
