use paintbridge::native::SwapChain;
use paintbridge::NativeResult;
use windows::Win32::Graphics::Direct2D::ID2D1Bitmap1;
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT_UNKNOWN;
use windows::Win32::Graphics::Dxgi::{IDXGISurface, IDXGISwapChain1, DXGI_PRESENT, DXGI_SWAP_CHAIN_FLAG};

use crate::context::D2DContext;
use crate::error::NativeCall;

/// A flip-model swap chain bound to a window.
pub struct D2DSwapChain {
    swap_chain: IDXGISwapChain1,
}

impl D2DSwapChain {
    pub(crate) fn new(swap_chain: IDXGISwapChain1) -> Self {
        Self { swap_chain }
    }

    pub fn raw(&self) -> &IDXGISwapChain1 {
        &self.swap_chain
    }
}

impl SwapChain<D2DContext> for D2DSwapChain {
    fn resize_buffers(&mut self, width: u32, height: u32) -> NativeResult<()> {
        unsafe {
            self.swap_chain
                .ResizeBuffers(0, width, height, DXGI_FORMAT_UNKNOWN, DXGI_SWAP_CHAIN_FLAG(0))
        }
        .native("ResizeBuffers")
    }

    fn back_buffer_target(&mut self, ctx: &mut D2DContext) -> NativeResult<ID2D1Bitmap1> {
        let surface: IDXGISurface = unsafe { self.swap_chain.GetBuffer(0) }.native("GetBuffer")?;
        ctx.wrap_surface(&surface)
    }

    fn present(&mut self, sync_interval: u32) -> NativeResult<()> {
        unsafe { self.swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }
            .ok()
            .native("Present")
    }
}
