use kurbo::{Line, Point, Rect};

use super::{created, PaintEngine};
use crate::image::Image;
use crate::native::DeviceContext;
use crate::path::Path;
use crate::shapes::{IntLine, IntPoint, IntRect};

/// Grows `rect` by half a pixel on every edge so strokes land on pixel boundaries.
fn snap_outward(rect: Rect) -> Rect {
    Rect::new(rect.x0 - 0.5, rect.y0 - 0.5, rect.x1 + 0.5, rect.y1 + 0.5)
}

/// Shifts a line with positive slope up by half a pixel.
fn adjust_line(line: Line) -> Line {
    let d = line.p1 - line.p0;
    if d.x * d.y > 0.0 {
        Line::new((line.p0.x, line.p0.y - 0.5), (line.p1.x, line.p1.y - 0.5))
    } else {
        line
    }
}

/// Integer pixel rectangle covering `rect`, clamped so its far edges stay in `i32`.
fn covering(rect: Rect) -> IntRect {
    const LIMIT: f64 = (i32::MAX / 2) as f64;
    let r = rect.abs().expand();
    let clamp = |v: f64| v.clamp(-LIMIT, LIMIT);
    let (x0, y0, x1, y1) = (clamp(r.x0), clamp(r.y0), clamp(r.x1), clamp(r.y1));
    IntRect::new(x0 as i32, y0 as i32, (x1 - x0) as i32, (y1 - y0) as i32)
}

impl<C: DeviceContext> PaintEngine<C> {
    /// Fills, then strokes, each rectangle. The stroke is snapped outward by half a
    /// pixel on every edge.
    pub fn draw_rects(&mut self, ctx: &mut C, rects: &[Rect]) {
        self.draw_rects_with(ctx, rects, snap_outward);
    }

    /// Like [`PaintEngine::draw_rects`] without the half-pixel snap.
    pub fn draw_int_rects(&mut self, ctx: &mut C, rects: &[IntRect]) {
        let rects: Vec<Rect> = rects.iter().map(|r| Rect::from(*r)).collect();
        self.draw_rects_with(ctx, &rects, |r| r);
    }

    fn draw_rects_with(&mut self, ctx: &mut C, rects: &[Rect], stroke_rect: impl Fn(Rect) -> Rect) {
        if !self.active {
            return;
        }
        let width = self.pen_width();
        for rect in rects {
            if let Some(brush) = &self.brush.resource {
                ctx.fill_rectangle(*rect, brush);
            }
            if let (Some(brush), Some(style)) = (&self.pen.brush, &self.pen.stroke_style) {
                ctx.draw_rectangle(stroke_rect(*rect), brush, width, Some(style));
            }
        }
    }

    pub fn draw_lines(&mut self, ctx: &mut C, lines: &[Line]) {
        if !self.active {
            return;
        }
        let (Some(brush), Some(style)) = (&self.pen.brush, &self.pen.stroke_style) else {
            return;
        };
        let width = self.pen_width();
        for line in lines {
            ctx.draw_line(adjust_line(*line), brush, width, Some(style));
        }
    }

    pub fn draw_int_lines(&mut self, ctx: &mut C, lines: &[IntLine]) {
        let lines: Vec<Line> = lines.iter().map(|l| Line::from(*l)).collect();
        self.draw_lines(ctx, &lines);
    }

    /// Fills the path with the brush, then strokes it with the pen.
    pub fn draw_path(&mut self, ctx: &mut C, path: &Path) {
        if !self.active {
            return;
        }
        let fill = self.brush.resource.as_ref();
        let stroke = self.pen.brush.as_ref().zip(self.pen.stroke_style.as_ref());
        if fill.is_none() && stroke.is_none() {
            return;
        }
        let Some(desc) = path.to_geometry() else {
            return;
        };
        let Some(geometry) = created("create_path_geometry", ctx.create_path_geometry(&desc)) else {
            return;
        };
        if let Some(brush) = fill {
            ctx.fill_geometry(&geometry, brush);
        }
        if let Some((brush, style)) = stroke {
            ctx.draw_geometry(&geometry, brush, self.pen_width(), Some(style));
        }
        ctx.release_geometry(geometry);
    }

    /// Each point becomes a filled circle of radius one, painted with the brush.
    pub fn draw_points(&mut self, ctx: &mut C, points: &[Point]) {
        if !self.active {
            return;
        }
        if let Some(brush) = &self.brush.resource {
            for p in points {
                ctx.fill_ellipse(*p, 1.0, 1.0, brush);
            }
        }
    }

    /// Integer variant of [`PaintEngine::draw_points`], painted with the pen's brush.
    pub fn draw_int_points(&mut self, ctx: &mut C, points: &[IntPoint]) {
        if !self.active {
            return;
        }
        if let Some(brush) = &self.pen.brush {
            for p in points {
                ctx.fill_ellipse((*p).into(), 1.0, 1.0, brush);
            }
        }
    }

    /// Polygons are not translated.
    pub fn draw_polygon(&mut self, _ctx: &mut C, points: &[Point]) {
        tracing::trace!(points = points.len(), "polygon drawing is not supported");
    }

    /// Draws the `src` part of `image` scaled into `dest`. The image is uploaded on
    /// every call and released once drawn.
    pub fn draw_image(&mut self, ctx: &mut C, dest: Rect, image: &Image, src: Rect) {
        if !self.active {
            return;
        }
        let Some(part) = image.sub_image(covering(src)) else {
            return;
        };
        let dpi = ctx.dpi();
        let Some(bitmap) = created("create_bitmap", ctx.create_bitmap(&part.to_premultiplied(), dpi)) else {
            return;
        };
        ctx.draw_bitmap(&bitmap, dest, self.state.opacity as f32, self.interpolation_mode(), None);
        ctx.release_bitmap(bitmap);
    }

    /// Pixmaps and images share one representation.
    pub fn draw_pixmap(&mut self, ctx: &mut C, dest: Rect, pixmap: &Image, src: Rect) {
        self.draw_image(ctx, dest, pixmap, src);
    }

    /// Repeats `pixmap` across `rect`. `offset` is the pixmap position that lands on
    /// the top-left corner of `rect`. Tiles on the right and bottom edges are clipped
    /// to `rect`.
    pub fn draw_tiled_pixmap(&mut self, ctx: &mut C, rect: Rect, pixmap: &Image, offset: Point) {
        if !self.active || pixmap.is_null() || rect.is_zero_area() {
            return;
        }
        let dpi = ctx.dpi();
        let Some(bitmap) = created("create_bitmap", ctx.create_bitmap(&pixmap.to_premultiplied(), dpi)) else {
            return;
        };
        let size = ctx.bitmap_size(&bitmap);
        let (tw, th) = (size.width, size.height);
        if tw <= 0.0 || th <= 0.0 {
            ctx.release_bitmap(bitmap);
            return;
        }
        let rect = rect.abs();
        let opacity = self.state.opacity as f32;
        let interpolation = self.interpolation_mode();
        let mut y = rect.y0 - offset.y.rem_euclid(th);
        while y < rect.y1 {
            let mut x = rect.x0 - offset.x.rem_euclid(tw);
            while x < rect.x1 {
                let tile = Rect::new(x, y, x + tw, y + th);
                let dest = tile.intersect(rect);
                let src = dest - tile.origin().to_vec2();
                ctx.draw_bitmap(&bitmap, dest, opacity, interpolation, Some(src));
                x += tw;
            }
            y += th;
        }
        ctx.release_bitmap(bitmap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_positive_slopes_are_adjusted() {
        let down = Line::new((0.0, 0.0), (10.0, 10.0));
        assert_eq!(adjust_line(down), Line::new((0.0, -0.5), (10.0, 9.5)));
        let reversed = Line::new((10.0, 10.0), (0.0, 0.0));
        assert_eq!(adjust_line(reversed).p0.y, 9.5);
        let up = Line::new((0.0, 10.0), (10.0, 0.0));
        assert_eq!(adjust_line(up), up);
        let flat = Line::new((0.0, 5.0), (10.0, 5.0));
        assert_eq!(adjust_line(flat), flat);
    }

    #[test]
    fn source_rect_is_covered_by_whole_pixels() {
        assert_eq!(covering(Rect::new(0.5, 1.2, 3.1, 4.0)), IntRect::new(0, 1, 4, 3));
        assert_eq!(covering(Rect::new(2.0, 2.0, 0.0, 0.0)), IntRect::new(0, 0, 2, 2));
    }

    #[test]
    fn huge_source_rects_stay_in_range() {
        let far = covering(Rect::new(2.0e9, 0.0, 4.0e9, 1.0));
        assert_eq!(far.width, 0);
        assert!(far.right() >= far.x);
        let wide = covering(Rect::new(-1.0e12, -5.0, 1.0e12, 5.0));
        assert!(wide.width > 0);
        assert_eq!(wide.right(), i32::MAX / 2);
    }
}
