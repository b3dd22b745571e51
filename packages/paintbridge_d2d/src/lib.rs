//! Direct2D implementation of the `paintbridge` native traits.
//!
//! [`D2DDevice`] owns the Direct3D device, the Direct2D factory and device, and the
//! DirectWrite factory. A process-wide instance is available through
//! [`D2DDevice::global`]. Contexts and swap chains created from it plug straight into
//! `paintbridge`'s bitmap and window targets:
//!
//! ```ignore
//! let device = D2DDevice::global()?;
//! let mut target = BitmapTarget::new(device, EngineConfig::from_env());
//! ```
#![cfg(windows)]

mod context;
mod device;
mod error;
mod swapchain;

pub use context::D2DContext;
pub use device::D2DDevice;
pub use swapchain::D2DSwapChain;
