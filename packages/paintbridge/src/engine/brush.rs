use kurbo::{Affine, Point};

use super::{created, PaintEngine};
use crate::brush::{pattern_image, Brush, BrushStyle, ColorStop};
use crate::native::{
    BitmapBrushProperties, DeviceContext, ExtendMode, GradientStop, InterpolationMode,
    LinearGradientProperties, RadialGradientProperties,
};

pub(super) struct BrushCache<B> {
    pub(super) source: Option<Brush>,
    pub(super) opacity: f64,
    pub(super) resource: Option<B>,
}

impl<B> Default for BrushCache<B> {
    fn default() -> Self {
        Self {
            source: None,
            opacity: 1.0,
            resource: None,
        }
    }
}

/// Native stops for toolkit gradient stops. Positions and colors pass through unchanged.
pub fn gradient_stops(stops: &[ColorStop]) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|stop| GradientStop {
            position: stop.position as f32,
            color: stop.color,
        })
        .collect()
}

/// Creates the native brush for `brush`. Returns `None` for [`BrushStyle::NoBrush`],
/// for conical gradients, and when any native call fails.
pub fn to_native_brush<C: DeviceContext>(
    ctx: &mut C,
    brush: &Brush,
    interpolation: InterpolationMode,
) -> Option<C::Brush> {
    let tiled = BitmapBrushProperties {
        extend_mode_x: ExtendMode::Wrap,
        extend_mode_y: ExtendMode::Wrap,
        interpolation_mode: interpolation,
    };
    let resource = match &brush.style {
        BrushStyle::NoBrush => return None,
        BrushStyle::Solid => created("create_solid_color_brush", ctx.create_solid_color_brush(brush.color))?,
        BrushStyle::LinearGradient(g) => {
            let stops = created(
                "create_gradient_stop_collection",
                ctx.create_gradient_stop_collection(&gradient_stops(&g.stops)),
            )?;
            let props = LinearGradientProperties {
                start: g.start,
                end: g.end,
            };
            created("create_linear_gradient_brush", ctx.create_linear_gradient_brush(props, &stops))?
        }
        BrushStyle::RadialGradient(g) => {
            let stops = created(
                "create_gradient_stop_collection",
                ctx.create_gradient_stop_collection(&gradient_stops(&g.stops)),
            )?;
            let props = RadialGradientProperties {
                center: g.center,
                origin_offset: g.focal - g.center,
                radius_x: g.radius,
                radius_y: g.radius,
            };
            created("create_radial_gradient_brush", ctx.create_radial_gradient_brush(props, &stops))?
        }
        BrushStyle::ConicalGradient(_) => {
            tracing::trace!("conical gradients have no native brush");
            return None;
        }
        BrushStyle::Texture(image) => {
            let dpi = ctx.dpi();
            let bitmap = created("create_bitmap", ctx.create_bitmap(&image.to_premultiplied(), dpi))?;
            bitmap_brush(ctx, bitmap, tiled)?
        }
        pattern => {
            let image = pattern_image(pattern, brush.color)?;
            let dpi = ctx.dpi();
            let bitmap = created("create_bitmap", ctx.create_bitmap(&image, dpi))?;
            bitmap_brush(ctx, bitmap, tiled)?
        }
    };
    if brush.transform != Affine::IDENTITY {
        ctx.set_brush_transform(&resource, brush.transform);
    }
    Some(resource)
}

/// The brush holds on to the bitmap, so the caller's handle is released right away.
fn bitmap_brush<C: DeviceContext>(ctx: &mut C, bitmap: C::Bitmap, props: BitmapBrushProperties) -> Option<C::Brush> {
    let brush = created("create_bitmap_brush", ctx.create_bitmap_brush(&bitmap, props));
    ctx.release_bitmap(bitmap);
    brush
}

impl<C: DeviceContext> PaintEngine<C> {
    /// Rebuilds the fill brush when forced or when the brush or opacity changed.
    pub(super) fn update_brush(&mut self, ctx: &mut C, force: bool) {
        let unchanged = self.brush.source.as_ref() == Some(&self.state.brush)
            && self.brush.opacity == self.state.opacity;
        if unchanged && !force {
            return;
        }
        let resource = to_native_brush(ctx, &self.state.brush, self.interpolation_mode());
        if let Some(resource) = &resource {
            ctx.set_brush_opacity(resource, self.state.opacity as f32);
            if self.brush_origin != Point::ZERO {
                let t = ctx.brush_transform(resource);
                ctx.set_brush_transform(resource, with_origin(t, self.brush_origin));
            }
        }
        let previous = std::mem::replace(
            &mut self.brush,
            BrushCache {
                source: Some(self.state.brush.clone()),
                opacity: self.state.opacity,
                resource,
            },
        );
        if let Some(old) = previous.resource {
            ctx.release_brush(old);
        }
    }

    /// Moves the brush origin, replacing the previous offset in the brush transform.
    pub(super) fn update_brush_origin(&mut self, ctx: &mut C, origin: Point) {
        if origin == self.brush_origin {
            return;
        }
        if let Some(resource) = &self.brush.resource {
            let t = without_origin(ctx.brush_transform(resource), self.brush_origin);
            ctx.set_brush_transform(resource, with_origin(t, origin));
        }
        self.brush_origin = origin;
    }
}

fn with_origin(t: Affine, origin: Point) -> Affine {
    Affine::translate(origin.to_vec2()) * t
}

fn without_origin(t: Affine, origin: Point) -> Affine {
    Affine::translate(-origin.to_vec2()) * t
}
