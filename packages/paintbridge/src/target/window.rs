use kurbo::Size;
use raw_window_handle::RawWindowHandle;

use super::{configure_context, RenderTarget};
use crate::config::EngineConfig;
use crate::engine::PaintEngine;
use crate::error::NativeResult;
use crate::native::{DeviceContext, DeviceContextOptions, GraphicsDevice, SwapChain, SwapChainDescription};

/// Which kind of host surface a [`WindowTarget`] is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// A child widget. Paints only on [`WindowEvent::Paint`].
    Widget,
    /// A top-level window. Paints on [`WindowEvent::Paint`] and
    /// [`WindowEvent::UpdateRequest`].
    TopLevel,
}

/// Events a window target reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Paint,
    UpdateRequest,
    /// New logical size together with the window's scale factor.
    Resize { size: Size, scale_factor: f64 },
}

type TargetBitmap<D> = <<D as GraphicsDevice>::Context as DeviceContext>::TargetBitmap;

/// A render target presenting into a window through a swap chain.
///
/// The swap chain's back buffer is wrapped as the context's target after every resize
/// and after every recreation.
pub struct WindowTarget<D: GraphicsDevice> {
    device: D,
    config: EngineConfig,
    kind: WindowKind,
    window: RawWindowHandle,
    swap_chain: Option<D::SwapChain>,
    ctx: Option<D::Context>,
    engine: Option<PaintEngine<D::Context>>,
    back_buffer: Option<TargetBitmap<D>>,
    size: (u32, u32),
}

impl<D: GraphicsDevice> WindowTarget<D> {
    /// Creates the swap chain and drawing context for `window`.
    ///
    /// Nothing is bound as a target until the first resize.
    pub fn new(device: D, window: RawWindowHandle, kind: WindowKind, config: EngineConfig) -> NativeResult<Self> {
        let mut target = Self {
            device,
            config,
            kind,
            window,
            swap_chain: None,
            ctx: None,
            engine: None,
            back_buffer: None,
            size: (0, 0),
        };
        target.setup()?;
        Ok(target)
    }

    fn setup(&mut self) -> NativeResult<()> {
        self.back_buffer = None;
        self.engine = None;
        self.ctx = None;
        self.swap_chain = None;

        let desc = SwapChainDescription {
            width: self.size.0,
            height: self.size.1,
            ..Default::default()
        };
        let swap_chain = self.device.create_swap_chain_for_window(self.window, &desc)?;
        let mut ctx = self.device.create_device_context(DeviceContextOptions::None)?;
        configure_context(&mut ctx);
        self.swap_chain = Some(swap_chain);
        self.ctx = Some(ctx);
        self.engine = Some(PaintEngine::new(self.config.clone()));
        Ok(())
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.ctx.is_some() && self.swap_chain.is_some()
    }

    /// Pixel size of the swap chain buffers.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn back_buffer(&self) -> Option<&TargetBitmap<D>> {
        self.back_buffer.as_ref()
    }

    /// Resizes the swap chain buffers and rebinds the back buffer. Must not be called
    /// while a session is open.
    pub fn resize_swap_chain(&mut self, width: u32, height: u32) -> bool {
        self.size = (width, height);
        let (Some(ctx), Some(swap_chain)) = (&mut self.ctx, &mut self.swap_chain) else {
            return false;
        };
        ctx.set_target(None);
        if let Some(old) = self.back_buffer.take() {
            ctx.release_target_bitmap(old);
        }
        let bound = swap_chain
            .resize_buffers(width, height)
            .and_then(|()| swap_chain.back_buffer_target(ctx));
        match bound {
            Ok(bitmap) => {
                ctx.set_target(Some(&bitmap));
                self.back_buffer = Some(bitmap);
                tracing::debug!(width, height, "swap chain resized");
                true
            }
            Err(err) => {
                tracing::warn!(%err, width, height, "could not resize swap chain");
                false
            }
        }
    }

    /// Resizes to `size` logical pixels at `scale_factor`, rounded to device pixels.
    pub fn handle_resize(&mut self, size: Size, scale_factor: f64) -> bool {
        let width = (size.width * scale_factor).round().max(0.0) as u32;
        let height = (size.height * scale_factor).round().max(0.0) as u32;
        self.resize_swap_chain(width, height)
    }

    /// Dispatches a window event. `paint` runs for paint events this flavor reacts to;
    /// the back buffer is presented after every such event, whether or not anything
    /// was drawn. Returns whether the event was handled.
    pub fn handle_event(&mut self, event: WindowEvent, paint: impl FnOnce(&mut Self)) -> bool {
        match event {
            WindowEvent::Resize { size, scale_factor } => {
                self.handle_resize(size, scale_factor);
                true
            }
            WindowEvent::Paint => {
                self.paint_and_present(paint);
                true
            }
            WindowEvent::UpdateRequest if self.kind == WindowKind::TopLevel => {
                self.paint_and_present(paint);
                true
            }
            WindowEvent::UpdateRequest => false,
        }
    }

    fn paint_and_present(&mut self, paint: impl FnOnce(&mut Self)) {
        if self.is_initialized() {
            paint(self);
        } else {
            tracing::warn!(kind = ?self.kind, "window target is not initialized, presenting without painting");
        }
        self.present();
    }

    /// Presents the back buffer without waiting for vertical sync.
    pub fn present(&mut self) -> bool {
        let Some(swap_chain) = &mut self.swap_chain else {
            return false;
        };
        match swap_chain.present(0) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "present failed");
                false
            }
        }
    }

    /// Executes pending native drawing commands.
    pub fn flush(&mut self) -> bool {
        let Some(ctx) = &mut self.ctx else {
            return false;
        };
        match ctx.flush() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, "flush failed");
                false
            }
        }
    }
}

impl<D: GraphicsDevice> RenderTarget for WindowTarget<D> {
    type Context = D::Context;

    fn context(&self) -> Option<&D::Context> {
        self.ctx.as_ref()
    }

    fn parts_mut(&mut self) -> Option<(&mut D::Context, &mut PaintEngine<D::Context>)> {
        self.ctx.as_mut().zip(self.engine.as_mut())
    }

    fn recreate_target(&mut self) {
        tracing::debug!(kind = ?self.kind, "recreating window target");
        if let Err(err) = self.setup() {
            tracing::warn!(%err, "could not recreate window target");
            return;
        }
        let (width, height) = self.size;
        if width > 0 && height > 0 {
            self.resize_swap_chain(width, height);
        }
    }
}
