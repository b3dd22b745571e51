use kurbo::Rect;
use peniko::Color;

use super::{configure_context, RenderTarget};
use crate::config::EngineConfig;
use crate::engine::PaintEngine;
use crate::native::{DeviceContext, Dpi, GraphicsDevice};

/// Size and resolution of a bitmap target's backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapProperties {
    pub width: u32,
    pub height: u32,
    pub dpi: Dpi,
}

/// An off-screen render target backed by a native bitmap.
///
/// Nothing native is created until the target is first drawn to or explicitly
/// initialized; the size and DPI then default to the values in [`EngineConfig`].
/// The backing bitmap is never modified in place: resizing or changing the DPI
/// replaces it.
pub struct BitmapTarget<D: GraphicsDevice> {
    device: D,
    config: EngineConfig,
    ctx: Option<D::Context>,
    engine: Option<PaintEngine<D::Context>>,
    bitmap: Option<<D::Context as DeviceContext>::TargetBitmap>,
    width: u32,
    height: u32,
    dpi: Dpi,
}

impl<D: GraphicsDevice> BitmapTarget<D> {
    pub fn new(device: D, config: EngineConfig) -> Self {
        let (width, height) = config.default_bitmap_size;
        let dpi = config.default_dpi;
        Self {
            device,
            config,
            ctx: None,
            engine: None,
            bitmap: None,
            width,
            height,
            dpi,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.ctx.is_some()
    }

    /// Initializes with the stored size and DPI if that has not happened yet.
    pub fn ensure_init(&mut self) -> bool {
        if self.is_initialized() {
            return true;
        }
        self.init(self.width, self.height, self.dpi)
    }

    /// Creates a new context, engine and backing bitmap, dropping any existing ones.
    /// Returns false and leaves the target uninitialized when any of them fails.
    pub fn init(&mut self, width: u32, height: u32, dpi: Dpi) -> bool {
        self.width = width;
        self.height = height;
        self.dpi = dpi;
        self.bitmap = None;
        self.engine = None;
        self.ctx = None;

        let mut ctx = match self.device.create_device_context(self.config.context_options) {
            Ok(ctx) => ctx,
            Err(err) => {
                tracing::warn!(%err, "could not create device context for bitmap target");
                return false;
            }
        };
        configure_context(&mut ctx);
        ctx.set_dpi(dpi);
        let bitmap = match ctx.create_target_bitmap(width, height, dpi) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                tracing::warn!(%err, width, height, "could not create target bitmap");
                return false;
            }
        };
        ctx.set_target(Some(&bitmap));
        self.bitmap = Some(bitmap);
        self.ctx = Some(ctx);
        self.engine = Some(PaintEngine::new(self.config.clone()));
        tracing::debug!(width, height, dpi_x = dpi.x, dpi_y = dpi.y, "bitmap target initialized");
        true
    }

    /// Replaces the backing bitmap with one of the new size. Must not be called while
    /// a session is open.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.rebuild_bitmap();
        tracing::debug!(width, height, "bitmap target resized");
    }

    /// Replaces the backing bitmap with one of the same pixel size at a new DPI.
    pub fn change_dpi(&mut self, dpi: Dpi) {
        self.dpi = dpi;
        if let Some(ctx) = &mut self.ctx {
            ctx.set_dpi(dpi);
        }
        self.rebuild_bitmap();
        tracing::debug!(dpi_x = dpi.x, dpi_y = dpi.y, "bitmap target dpi changed");
    }

    fn rebuild_bitmap(&mut self) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        ctx.set_target(None);
        if let Some(old) = self.bitmap.take() {
            ctx.release_target_bitmap(old);
        }
        self.bitmap = match ctx.create_target_bitmap(self.width, self.height, self.dpi) {
            Ok(bitmap) => Some(bitmap),
            Err(err) => {
                tracing::warn!(%err, "could not recreate target bitmap");
                None
            }
        };
        ctx.set_target(self.bitmap.as_ref());
    }

    /// Fills `rect` with `color` in a session of its own.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) -> bool {
        if !self.begin_draw() {
            return false;
        }
        if let Some(ctx) = &mut self.ctx {
            match ctx.create_solid_color_brush(color) {
                Ok(brush) => {
                    ctx.fill_rectangle(rect, &brush);
                    ctx.release_brush(brush);
                }
                Err(err) => tracing::warn!(%err, "could not create fill brush"),
            }
        }
        self.end_draw()
    }

    /// Clears the whole bitmap to `color` in a session of its own.
    pub fn flush(&mut self, color: Color) -> bool {
        if !self.begin_draw() {
            return false;
        }
        if let Some(ctx) = &mut self.ctx {
            ctx.clear(color);
        }
        self.end_draw()
    }

    /// The current backing bitmap.
    pub fn bitmap(&self) -> Option<&<D::Context as DeviceContext>::TargetBitmap> {
        self.bitmap.as_ref()
    }

    pub fn bitmap_properties(&self) -> BitmapProperties {
        BitmapProperties {
            width: self.width,
            height: self.height,
            dpi: self.dpi,
        }
    }
}

impl<D: GraphicsDevice> RenderTarget for BitmapTarget<D> {
    type Context = D::Context;

    fn context(&self) -> Option<&D::Context> {
        self.ctx.as_ref()
    }

    fn parts_mut(&mut self) -> Option<(&mut D::Context, &mut PaintEngine<D::Context>)> {
        if !self.ensure_init() {
            return None;
        }
        self.ctx.as_mut().zip(self.engine.as_mut())
    }

    fn recreate_target(&mut self) {
        tracing::debug!("recreating bitmap target");
        self.init(self.width, self.height, self.dpi);
    }
}
