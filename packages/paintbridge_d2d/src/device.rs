use std::sync::{Arc, OnceLock};

use paintbridge::native::{DeviceContextOptions, GraphicsDevice, SwapChainDescription};
use paintbridge::{NativeError, NativeResult};
use raw_window_handle::RawWindowHandle;
use windows::core::{Interface, HRESULT};
use windows::Win32::Foundation::{HMODULE, HWND};
use windows::Win32::Graphics::Direct2D::{
    D2D1CreateFactory, ID2D1Device, ID2D1Factory1, D2D1_DEVICE_CONTEXT_OPTIONS,
    D2D1_DEVICE_CONTEXT_OPTIONS_ENABLE_MULTITHREADED_OPTIMIZATIONS, D2D1_DEVICE_CONTEXT_OPTIONS_NONE,
    D2D1_FACTORY_TYPE_MULTI_THREADED,
};
use windows::Win32::Graphics::Direct3D::{D3D_DRIVER_TYPE, D3D_DRIVER_TYPE_HARDWARE, D3D_DRIVER_TYPE_WARP};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_CREATE_DEVICE_DEBUG,
    D3D11_CREATE_DEVICE_FLAG, D3D11_SDK_VERSION,
};
use windows::Win32::Graphics::DirectWrite::{DWriteCreateFactory, IDWriteFactory, DWRITE_FACTORY_TYPE_SHARED};
use windows::Win32::Graphics::Dxgi::Common::{DXGI_FORMAT_B8G8R8A8_UNORM, DXGI_SAMPLE_DESC};
use windows::Win32::Graphics::Dxgi::{
    IDXGIDevice, IDXGIFactory2, DXGI_ERROR_SDK_COMPONENT_MISSING, DXGI_ERROR_UNSUPPORTED, DXGI_SWAP_CHAIN_DESC1,
    DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL, DXGI_USAGE_RENDER_TARGET_OUTPUT,
};

use crate::context::D2DContext;
use crate::error::NativeCall;
use crate::swapchain::D2DSwapChain;

struct DeviceInner {
    d3d: ID3D11Device,
    factory: ID2D1Factory1,
    device: ID2D1Device,
    dxgi_factory: IDXGIFactory2,
    dwrite: IDWriteFactory,
}

// SAFETY: the Direct2D factory is created multi-threaded and the Direct3D 11 device is
// free-threaded. The DXGI factory and the shared DirectWrite factory may be used from any
// thread. Contexts created from these handles stay on the thread that created them.
unsafe impl Send for DeviceInner {}
unsafe impl Sync for DeviceInner {}

static GLOBAL_DEVICE: OnceLock<D2DDevice> = OnceLock::new();

/// The graphics device every context and swap chain is created from.
#[derive(Clone)]
pub struct D2DDevice {
    inner: Arc<DeviceInner>,
}

impl D2DDevice {
    /// Returns the process-wide device, creating it on first use.
    ///
    /// A failed creation is not cached; the next call tries again.
    pub fn global() -> NativeResult<Self> {
        if let Some(device) = GLOBAL_DEVICE.get() {
            return Ok(device.clone());
        }
        let device = Self::new()?;
        Ok(GLOBAL_DEVICE.get_or_init(|| device).clone())
    }

    /// Creates a device independent of the process-wide one.
    pub fn new() -> NativeResult<Self> {
        let d3d = create_d3d_device()?;
        unsafe {
            let factory: ID2D1Factory1 =
                D2D1CreateFactory(D2D1_FACTORY_TYPE_MULTI_THREADED, None).native("D2D1CreateFactory")?;
            let dxgi_device = d3d.cast::<IDXGIDevice>().native("QueryInterface")?;
            let device = factory.CreateDevice(&dxgi_device).native("CreateDevice")?;
            let adapter = dxgi_device.GetAdapter().native("GetAdapter")?;
            let dxgi_factory: IDXGIFactory2 = adapter.GetParent().native("GetParent")?;
            let dwrite: IDWriteFactory =
                DWriteCreateFactory(DWRITE_FACTORY_TYPE_SHARED).native("DWriteCreateFactory")?;
            tracing::debug!("created Direct2D device");
            Ok(Self {
                inner: Arc::new(DeviceInner {
                    d3d,
                    factory,
                    device,
                    dxgi_factory,
                    dwrite,
                }),
            })
        }
    }

    pub fn d3d_device(&self) -> &ID3D11Device {
        &self.inner.d3d
    }

    /// Whether the underlying Direct3D device was removed or reset.
    pub fn is_lost(&self) -> bool {
        unsafe { self.inner.d3d.GetDeviceRemovedReason().is_err() }
    }
}

fn create_d3d_device() -> NativeResult<ID3D11Device> {
    let mut flags = D3D11_CREATE_DEVICE_BGRA_SUPPORT;
    if cfg!(debug_assertions) {
        flags |= D3D11_CREATE_DEVICE_DEBUG;
    }
    let mut result = create_with_flags(flags);
    if let Err(err) = &result {
        if let Some(fallback) = without_debug_layer(flags, err.code()) {
            tracing::info!("Direct3D debug layer is not installed, creating the device without it");
            result = create_with_flags(fallback);
        }
    }
    result
        .native("D3D11CreateDevice")?
        .ok_or(NativeError::failed("D3D11CreateDevice", 0x8000_4005))
}

/// Hardware device, falling back to WARP where hardware is unsupported.
fn create_with_flags(flags: D3D11_CREATE_DEVICE_FLAG) -> windows::core::Result<Option<ID3D11Device>> {
    let result = create_with_type(D3D_DRIVER_TYPE_HARDWARE, flags);
    match &result {
        Err(err) if err.code() == DXGI_ERROR_UNSUPPORTED => {
            tracing::info!("hardware device unsupported, falling back to WARP");
            create_with_type(D3D_DRIVER_TYPE_WARP, flags)
        }
        _ => result,
    }
}

fn create_with_type(
    driver_type: D3D_DRIVER_TYPE,
    flags: D3D11_CREATE_DEVICE_FLAG,
) -> windows::core::Result<Option<ID3D11Device>> {
    let mut device = None;
    unsafe {
        D3D11CreateDevice(
            None,
            driver_type,
            HMODULE::default(),
            flags,
            None,
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            None,
        )?;
    }
    Ok(device)
}

/// Flags to retry with when creation failed only because the SDK layers are missing.
fn without_debug_layer(flags: D3D11_CREATE_DEVICE_FLAG, code: HRESULT) -> Option<D3D11_CREATE_DEVICE_FLAG> {
    let debug = (flags & D3D11_CREATE_DEVICE_DEBUG) == D3D11_CREATE_DEVICE_DEBUG;
    (debug && code == DXGI_ERROR_SDK_COMPONENT_MISSING)
        .then(|| D3D11_CREATE_DEVICE_FLAG(flags.0 & !D3D11_CREATE_DEVICE_DEBUG.0))
}

fn context_options(options: DeviceContextOptions) -> D2D1_DEVICE_CONTEXT_OPTIONS {
    match options {
        DeviceContextOptions::None => D2D1_DEVICE_CONTEXT_OPTIONS_NONE,
        DeviceContextOptions::MultithreadedOptimizations => D2D1_DEVICE_CONTEXT_OPTIONS_ENABLE_MULTITHREADED_OPTIMIZATIONS,
    }
}

impl GraphicsDevice for D2DDevice {
    type Context = D2DContext;
    type SwapChain = D2DSwapChain;

    fn create_device_context(&self, options: DeviceContextOptions) -> NativeResult<D2DContext> {
        if self.is_lost() {
            tracing::warn!("creating a context on a removed device");
        }
        let ctx = unsafe { self.inner.device.CreateDeviceContext(context_options(options)) }
            .native("CreateDeviceContext")?;
        Ok(D2DContext::new(ctx, self.inner.factory.clone(), self.inner.dwrite.clone()))
    }

    fn create_swap_chain_for_window(
        &self,
        window: RawWindowHandle,
        desc: &SwapChainDescription,
    ) -> NativeResult<D2DSwapChain> {
        let hwnd = match window {
            RawWindowHandle::Win32(handle) => HWND(handle.hwnd.get() as _),
            _ => return Err(NativeError::Unsupported("non-Win32 window handle")),
        };
        let props = DXGI_SWAP_CHAIN_DESC1 {
            Width: desc.width,
            Height: desc.height,
            Format: DXGI_FORMAT_B8G8R8A8_UNORM,
            SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            // The flip model needs at least two buffers.
            BufferCount: desc.buffer_count.max(2),
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
            ..Default::default()
        };
        let swap_chain = unsafe {
            self.inner
                .dxgi_factory
                .CreateSwapChainForHwnd(&self.inner.d3d, hwnd, &props, None, None)
        }
        .native("CreateSwapChainForHwnd")?;
        tracing::debug!(width = desc.width, height = desc.height, "created swap chain");
        Ok(D2DSwapChain::new(swap_chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_layer_is_dropped_only_when_missing() {
        let debug = D3D11_CREATE_DEVICE_BGRA_SUPPORT | D3D11_CREATE_DEVICE_DEBUG;
        assert_eq!(
            without_debug_layer(debug, DXGI_ERROR_SDK_COMPONENT_MISSING),
            Some(D3D11_CREATE_DEVICE_BGRA_SUPPORT)
        );
        assert_eq!(without_debug_layer(debug, DXGI_ERROR_UNSUPPORTED), None);
        assert_eq!(
            without_debug_layer(D3D11_CREATE_DEVICE_BGRA_SUPPORT, DXGI_ERROR_SDK_COMPONENT_MISSING),
            None
        );
    }
}
