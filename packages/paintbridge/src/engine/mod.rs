//! The paint engine: translates toolkit painter state and draw calls into native
//! resources and draw calls.
//!
//! A [`PaintEngine`] is bound to one native context for its whole life but does not
//! hold it; every call takes the context explicitly. The render target that owns the
//! context also owns the engine and replaces both together when the device is lost,
//! so cached brushes, pens and fonts never outlive the context that created them.
//!
//! Native resources are rebuilt lazily. [`PaintEngine::update_state`] only looks at the
//! aspects flagged dirty, and a flagged aspect is only rebuilt when its value (or the
//! opacity) actually differs from the cached one.

mod brush;
mod draw;
mod pen;
mod text;

use kurbo::{Affine, Point};
use rustc_hash::FxHashMap;

use crate::config::EngineConfig;
use crate::error::NativeResult;
use crate::font::FontDescription;
use crate::native::{AntialiasMode, DeviceContext, InterpolationMode, PrimitiveBlend};
use crate::state::{CompositionMode, DirtyFlags, PainterState, RenderHints};

use self::brush::BrushCache;
use self::pen::PenCache;

pub use self::brush::{gradient_stops, to_native_brush};
pub use self::pen::stroke_style_properties;

pub struct PaintEngine<C: DeviceContext> {
    config: EngineConfig,
    state: PainterState,
    active: bool,
    brush: BrushCache<C::Brush>,
    pen: PenCache<C::Brush, C::StrokeStyle>,
    /// Offset currently folded into the native brush transform.
    brush_origin: Point,
    fonts: FxHashMap<FontDescription, C::FontFace>,
}

impl<C: DeviceContext> PaintEngine<C> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: PainterState::default(),
            active: false,
            brush: BrushCache::default(),
            pen: PenCache::default(),
            brush_origin: Point::ZERO,
            fonts: FxHashMap::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The painter state as last applied.
    pub fn state(&self) -> &PainterState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Native brush currently used for fills, if any.
    pub fn brush_resource(&self) -> Option<&C::Brush> {
        self.brush.resource.as_ref()
    }

    /// Native brush currently used for strokes, if any.
    pub fn pen_brush_resource(&self) -> Option<&C::Brush> {
        self.pen.brush.as_ref()
    }

    pub fn stroke_style_resource(&self) -> Option<&C::StrokeStyle> {
        self.pen.stroke_style.as_ref()
    }

    /// Primes a session that the caller has already opened on `ctx`.
    ///
    /// The transform is reset to identity and brush and pen are rebuilt even when
    /// they match the cached values.
    pub fn begin(&mut self, ctx: &mut C, state: &PainterState) {
        ctx.set_transform(Affine::IDENTITY);
        self.state = state.clone();
        self.update_pen(ctx, true);
        self.update_brush(ctx, true);
        self.update_brush_origin(ctx, state.brush_origin);
        self.active = true;
        tracing::trace!("paint engine active");
    }

    /// Leaves the active state. Closing the native session is up to the caller.
    pub fn end(&mut self) {
        self.active = false;
        tracing::trace!("paint engine inactive");
    }

    /// Applies the aspects of `state` flagged in `dirty`.
    ///
    /// Aspects are processed in a fixed order: brush, brush origin, pen, opacity,
    /// composition mode, transform, hints, font. An opacity or composition change
    /// re-derives brush and pen before the blend mode is applied.
    pub fn update_state(&mut self, ctx: &mut C, dirty: DirtyFlags, state: &PainterState) {
        if dirty.contains(DirtyFlags::BRUSH) {
            self.state.brush = state.brush.clone();
            self.update_brush(ctx, false);
        }
        if dirty.contains(DirtyFlags::BRUSH_ORIGIN) {
            self.state.brush_origin = state.brush_origin;
            self.update_brush_origin(ctx, state.brush_origin);
        }
        if dirty.contains(DirtyFlags::PEN) {
            self.state.pen = state.pen.clone();
            self.update_pen(ctx, false);
        }
        if dirty.contains(DirtyFlags::OPACITY) {
            self.state.opacity = state.opacity;
            self.update_brush(ctx, false);
            self.update_pen(ctx, false);
        }
        if dirty.contains(DirtyFlags::COMPOSITION_MODE) {
            self.state.composition_mode = state.composition_mode;
            self.update_brush(ctx, false);
            self.update_pen(ctx, false);
            ctx.set_primitive_blend(primitive_blend(state.composition_mode));
        }
        if dirty.contains(DirtyFlags::TRANSFORM) {
            self.state.transform = state.transform;
            ctx.set_transform(state.transform);
        }
        if dirty.contains(DirtyFlags::HINTS) {
            self.state.render_hints = state.render_hints;
            ctx.set_antialias_mode(antialias_mode(state.render_hints));
        }
        if dirty.contains(DirtyFlags::FONT) {
            self.state.font = state.font.clone();
            self.resolve_font(ctx, &state.font);
        }
    }

    fn interpolation_mode(&self) -> InterpolationMode {
        interpolation_mode(self.state.render_hints)
    }
}

/// Blend mode used for a toolkit composition mode. Modes without a native
/// counterpart paint as a copy.
pub fn primitive_blend(mode: CompositionMode) -> PrimitiveBlend {
    match mode {
        CompositionMode::SourceOver => PrimitiveBlend::SourceOver,
        CompositionMode::Source => PrimitiveBlend::Copy,
        other => {
            tracing::trace!(?other, "composition mode has no native blend, using copy");
            PrimitiveBlend::Copy
        }
    }
}

pub fn antialias_mode(hints: RenderHints) -> AntialiasMode {
    if hints.contains(RenderHints::ANTIALIASING) {
        AntialiasMode::PerPrimitive
    } else {
        AntialiasMode::Aliased
    }
}

pub fn interpolation_mode(hints: RenderHints) -> InterpolationMode {
    if hints.contains(RenderHints::SMOOTH_PIXMAP_TRANSFORM) {
        InterpolationMode::Linear
    } else {
        InterpolationMode::NearestNeighbor
    }
}

/// Unwraps a factory result, logging the failing call.
fn created<T>(call: &'static str, result: NativeResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(call, %err, "native resource creation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_source_and_source_over_map_faithfully() {
        assert_eq!(primitive_blend(CompositionMode::SourceOver), PrimitiveBlend::SourceOver);
        assert_eq!(primitive_blend(CompositionMode::Source), PrimitiveBlend::Copy);
        assert_eq!(primitive_blend(CompositionMode::Multiply), PrimitiveBlend::Copy);
        assert_eq!(primitive_blend(CompositionMode::Xor), PrimitiveBlend::Copy);
    }

    #[test]
    fn hints_select_native_modes() {
        assert_eq!(antialias_mode(RenderHints::ANTIALIASING), AntialiasMode::PerPrimitive);
        assert_eq!(antialias_mode(RenderHints::TEXT_ANTIALIASING), AntialiasMode::Aliased);
        assert_eq!(
            interpolation_mode(RenderHints::SMOOTH_PIXMAP_TRANSFORM),
            InterpolationMode::Linear
        );
        assert_eq!(interpolation_mode(RenderHints::empty()), InterpolationMode::NearestNeighbor);
    }
}
