use super::brush::to_native_brush;
use super::{created, PaintEngine};
use crate::native::{CapStyle, DashStyle, DeviceContext, LineJoin, StrokeStyleProperties, StrokeTransform};
use crate::pen::{Pen, PenCap, PenJoin, PenStyle};

pub(super) struct PenCache<B, S> {
    pub(super) source: Option<Pen>,
    pub(super) opacity: f64,
    pub(super) brush: Option<B>,
    pub(super) stroke_style: Option<S>,
}

impl<B, S> Default for PenCache<B, S> {
    fn default() -> Self {
        Self {
            source: None,
            opacity: 1.0,
            brush: None,
            stroke_style: None,
        }
    }
}

/// Native stroke style for `pen`, or `None` when the pen has no native equivalent
/// (no pen at all, or a custom dash pattern).
pub fn stroke_style_properties(pen: &Pen) -> Option<StrokeStyleProperties> {
    let dash_style = match pen.style {
        PenStyle::NoPen => return None,
        PenStyle::Solid => DashStyle::Solid,
        PenStyle::Dash => DashStyle::Dash,
        PenStyle::Dot => DashStyle::Dot,
        PenStyle::DashDot => DashStyle::DashDot,
        PenStyle::DashDotDot => DashStyle::DashDotDot,
        PenStyle::CustomDash => {
            tracing::trace!("custom dash patterns are not translated");
            return None;
        }
    };
    // Thin dashes lose their gaps under square or round caps.
    let cap = if pen.style.is_dashed() && pen.width <= 1.0 {
        CapStyle::Flat
    } else {
        match pen.cap {
            PenCap::Flat => CapStyle::Flat,
            PenCap::Square => CapStyle::Square,
            PenCap::Round => CapStyle::Round,
        }
    };
    let line_join = match pen.join {
        PenJoin::Miter => LineJoin::Miter,
        PenJoin::Bevel => LineJoin::Bevel,
        PenJoin::Round => LineJoin::Round,
    };
    let transform_type = if pen.width == 0.0 {
        StrokeTransform::Hairline
    } else if pen.cosmetic {
        StrokeTransform::Fixed
    } else {
        StrokeTransform::Normal
    };
    Some(StrokeStyleProperties {
        start_cap: cap,
        end_cap: cap,
        dash_cap: cap,
        line_join,
        miter_limit: (pen.miter_limit * 2.0) as f32,
        dash_style,
        dash_offset: pen.dash_offset as f32,
        transform_type,
    })
}

impl<C: DeviceContext> PaintEngine<C> {
    /// Rebuilds stroke brush and stroke style when forced or when the pen or opacity
    /// changed.
    pub(super) fn update_pen(&mut self, ctx: &mut C, force: bool) {
        let unchanged =
            self.pen.source.as_ref() == Some(&self.state.pen) && self.pen.opacity == self.state.opacity;
        if unchanged && !force {
            return;
        }
        let pen = &self.state.pen;
        let (brush, stroke_style) = if pen.is_none() {
            (None, None)
        } else {
            let brush = to_native_brush(ctx, &pen.brush, self.interpolation_mode());
            if let Some(brush) = &brush {
                ctx.set_brush_opacity(brush, self.state.opacity as f32);
            }
            let stroke_style = stroke_style_properties(pen)
                .and_then(|props| created("create_stroke_style", ctx.create_stroke_style(&props)));
            (brush, stroke_style)
        };
        let previous = std::mem::replace(
            &mut self.pen,
            PenCache {
                source: Some(self.state.pen.clone()),
                opacity: self.state.opacity,
                brush,
                stroke_style,
            },
        );
        if let Some(old) = previous.brush {
            ctx.release_brush(old);
        }
        if let Some(old) = previous.stroke_style {
            ctx.release_stroke_style(old);
        }
    }

    /// Width handed to native stroke calls.
    pub(super) fn pen_width(&self) -> f32 {
        self.state.pen.width as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::Brush;
    use peniko::Color;

    fn pen(width: f64) -> Pen {
        Pen::new(Brush::solid(Color::BLACK), width)
    }

    #[test]
    fn width_selects_stroke_transform() {
        let hairline = stroke_style_properties(&pen(0.0)).unwrap();
        assert_eq!(hairline.transform_type, StrokeTransform::Hairline);
        let cosmetic = stroke_style_properties(&pen(3.0).with_cosmetic(true)).unwrap();
        assert_eq!(cosmetic.transform_type, StrokeTransform::Fixed);
        let normal = stroke_style_properties(&pen(3.0)).unwrap();
        assert_eq!(normal.transform_type, StrokeTransform::Normal);
        // A zero width wins over the cosmetic flag.
        let both = stroke_style_properties(&pen(0.0).with_cosmetic(true)).unwrap();
        assert_eq!(both.transform_type, StrokeTransform::Hairline);
    }

    #[test]
    fn miter_limit_is_doubled() {
        let mut p = pen(2.0).with_join(PenJoin::Miter);
        p.miter_limit = 4.0;
        let props = stroke_style_properties(&p).unwrap();
        assert_eq!(props.miter_limit, 8.0);
        assert_eq!(props.line_join, LineJoin::Miter);
    }

    #[test]
    fn thin_dashes_use_flat_caps() {
        let thin = stroke_style_properties(&pen(1.0).with_style(PenStyle::Dot).with_cap(PenCap::Round)).unwrap();
        assert_eq!((thin.start_cap, thin.dash_style), (CapStyle::Flat, DashStyle::Dot));
        let thick = stroke_style_properties(&pen(2.0).with_style(PenStyle::Dot).with_cap(PenCap::Round)).unwrap();
        assert_eq!(thick.dash_cap, CapStyle::Round);
        let solid = stroke_style_properties(&pen(1.0).with_cap(PenCap::Round)).unwrap();
        assert_eq!(solid.end_cap, CapStyle::Round);
    }

    #[test]
    fn custom_dash_and_no_pen_have_no_style() {
        assert!(stroke_style_properties(&pen(1.0).with_style(PenStyle::CustomDash)).is_none());
        assert!(stroke_style_properties(&Pen::none()).is_none());
    }
}
