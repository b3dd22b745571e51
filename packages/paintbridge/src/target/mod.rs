//! Render targets and the paint session protocol.
//!
//! A render target owns a native drawing context, the surface bound to it, and the
//! [`PaintEngine`] that translates into that context. Device loss is only detected when
//! a drawing session ends; the target then rebuilds its context, surface and engine in
//! place and reports the frame as lost so the host can schedule a repaint.

mod bitmap;
mod window;

pub use bitmap::{BitmapProperties, BitmapTarget};
pub use window::{WindowEvent, WindowKind, WindowTarget};

use kurbo::{Line, Point, Rect};

use crate::engine::PaintEngine;
use crate::error::NativeError;
use crate::font::TextItem;
use crate::image::Image;
use crate::native::{AntialiasMode, DeviceContext, TextAntialiasMode, UnitMode};
use crate::path::Path;
use crate::shapes::{IntLine, IntPoint, IntRect};
use crate::state::{DirtyFlags, PainterState};

/// Metrics a paint device reports to the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintDeviceMetric {
    Width,
    Height,
    WidthMM,
    HeightMM,
    NumColors,
    Depth,
    DpiX,
    DpiY,
    PhysicalDpiX,
    PhysicalDpiY,
    DevicePixelRatio,
    DevicePixelRatioScaled,
}

/// A surface the paint engine can draw into.
pub trait RenderTarget {
    type Context: DeviceContext;

    /// The native context, if it has been created.
    fn context(&self) -> Option<&Self::Context>;

    /// The native context together with the engine bound to it.
    fn parts_mut(&mut self) -> Option<(&mut Self::Context, &mut PaintEngine<Self::Context>)>;

    /// Rebuilds the native context and everything derived from it.
    fn recreate_target(&mut self);

    /// Opens a drawing session. Returns `false` when there is no context to draw into.
    fn begin_draw(&mut self) -> bool {
        match self.parts_mut() {
            Some((ctx, _)) => {
                ctx.begin_draw();
                true
            }
            None => false,
        }
    }

    /// Closes the drawing session.
    ///
    /// Returns `false` when the device was lost. The target has been recreated by
    /// then and everything drawn in this session is gone.
    fn end_draw(&mut self) -> bool {
        let Some((ctx, _)) = self.parts_mut() else {
            return false;
        };
        match ctx.end_draw() {
            Ok(()) => true,
            Err(NativeError::RecreateTarget) => {
                tracing::info!("device lost, recreating render target");
                self.recreate_target();
                false
            }
            Err(err) => {
                tracing::warn!(%err, "end_draw failed");
                true
            }
        }
    }

    /// Answers a metric query from the native context. Returns -1 while no context exists.
    fn metric(&self, metric: PaintDeviceMetric) -> i32 {
        match self.context() {
            Some(ctx) => context_metric(ctx, metric),
            None => -1,
        }
    }
}

fn context_metric<C: DeviceContext>(ctx: &C, metric: PaintDeviceMetric) -> i32 {
    let (width, height) = ctx.pixel_size();
    let dpi = ctx.dpi();
    let mm = |px: u32, dpi: f32| (px as f64 * 25.4 / dpi as f64).round() as i32;
    match metric {
        PaintDeviceMetric::Width => width as i32,
        PaintDeviceMetric::Height => height as i32,
        PaintDeviceMetric::WidthMM => mm(width, dpi.x),
        PaintDeviceMetric::HeightMM => mm(height, dpi.y),
        PaintDeviceMetric::NumColors => i32::MAX,
        PaintDeviceMetric::Depth => 32,
        PaintDeviceMetric::DpiX | PaintDeviceMetric::PhysicalDpiX => dpi.x.round() as i32,
        PaintDeviceMetric::DpiY | PaintDeviceMetric::PhysicalDpiY => dpi.y.round() as i32,
        PaintDeviceMetric::DevicePixelRatio => 1,
        PaintDeviceMetric::DevicePixelRatioScaled => -1,
    }
}

/// Puts a freshly created context into the state every target expects.
pub(crate) fn configure_context<C: DeviceContext>(ctx: &mut C) {
    ctx.set_antialias_mode(AntialiasMode::Aliased);
    ctx.set_text_antialias_mode(TextAntialiasMode::ClearType);
    ctx.set_unit_mode(UnitMode::Pixels);
}

/// An open paint session on a render target.
///
/// Created by [`PaintSession::begin`], closed by [`PaintSession::end`] or on drop.
pub struct PaintSession<'a, T: RenderTarget> {
    target: &'a mut T,
    finished: bool,
}

impl<'a, T: RenderTarget> PaintSession<'a, T> {
    /// Opens a native drawing session and primes the engine with `state`. Returns
    /// `None` when the target has no context.
    pub fn begin(target: &'a mut T, state: &PainterState) -> Option<Self> {
        if !target.begin_draw() {
            tracing::debug!("render target is not ready for painting");
            return None;
        }
        let (ctx, engine) = target.parts_mut()?;
        engine.begin(ctx, state);
        Some(Self {
            target,
            finished: false,
        })
    }

    fn with_engine(&mut self, f: impl FnOnce(&mut PaintEngine<T::Context>, &mut T::Context)) {
        if let Some((ctx, engine)) = self.target.parts_mut() {
            f(engine, ctx);
        }
    }

    pub fn context(&self) -> Option<&T::Context> {
        self.target.context()
    }

    pub fn update_state(&mut self, dirty: DirtyFlags, state: &PainterState) {
        self.with_engine(|engine, ctx| engine.update_state(ctx, dirty, state));
    }

    pub fn draw_rects(&mut self, rects: &[Rect]) {
        self.with_engine(|engine, ctx| engine.draw_rects(ctx, rects));
    }

    pub fn draw_int_rects(&mut self, rects: &[IntRect]) {
        self.with_engine(|engine, ctx| engine.draw_int_rects(ctx, rects));
    }

    pub fn draw_lines(&mut self, lines: &[Line]) {
        self.with_engine(|engine, ctx| engine.draw_lines(ctx, lines));
    }

    pub fn draw_int_lines(&mut self, lines: &[IntLine]) {
        self.with_engine(|engine, ctx| engine.draw_int_lines(ctx, lines));
    }

    pub fn draw_path(&mut self, path: &Path) {
        self.with_engine(|engine, ctx| engine.draw_path(ctx, path));
    }

    pub fn draw_points(&mut self, points: &[Point]) {
        self.with_engine(|engine, ctx| engine.draw_points(ctx, points));
    }

    pub fn draw_int_points(&mut self, points: &[IntPoint]) {
        self.with_engine(|engine, ctx| engine.draw_int_points(ctx, points));
    }

    pub fn draw_polygon(&mut self, points: &[Point]) {
        self.with_engine(|engine, ctx| engine.draw_polygon(ctx, points));
    }

    pub fn draw_image(&mut self, dest: Rect, image: &Image, src: Rect) {
        self.with_engine(|engine, ctx| engine.draw_image(ctx, dest, image, src));
    }

    pub fn draw_pixmap(&mut self, dest: Rect, pixmap: &Image, src: Rect) {
        self.with_engine(|engine, ctx| engine.draw_pixmap(ctx, dest, pixmap, src));
    }

    pub fn draw_tiled_pixmap(&mut self, rect: Rect, pixmap: &Image, offset: Point) {
        self.with_engine(|engine, ctx| engine.draw_tiled_pixmap(ctx, rect, pixmap, offset));
    }

    pub fn draw_text_item(&mut self, pos: Point, item: &TextItem) {
        self.with_engine(|engine, ctx| engine.draw_text_item(ctx, pos, item));
    }

    /// Closes the session. `false` means the frame was lost to a device reset and
    /// should be painted again.
    pub fn end(mut self) -> bool {
        self.finish()
    }

    fn finish(&mut self) -> bool {
        self.finished = true;
        if let Some((_, engine)) = self.target.parts_mut() {
            engine.end();
        }
        self.target.end_draw()
    }
}

impl<T: RenderTarget> Drop for PaintSession<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}
