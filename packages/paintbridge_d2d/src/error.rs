use paintbridge::{NativeError, NativeResult};
use windows::Win32::Graphics::Direct2D::D2DERR_RECREATE_TARGET;
use windows::Win32::Graphics::Dxgi::{DXGI_ERROR_DEVICE_REMOVED, DXGI_ERROR_DEVICE_RESET};

pub(crate) fn native_error(call: &'static str, err: &windows::core::Error) -> NativeError {
    let code = err.code();
    if code == D2DERR_RECREATE_TARGET || code == DXGI_ERROR_DEVICE_REMOVED || code == DXGI_ERROR_DEVICE_RESET {
        NativeError::RecreateTarget
    } else {
        NativeError::failed(call, code.0 as u32)
    }
}

/// Tags a `windows` result with the name of the call that produced it.
pub(crate) trait NativeCall<T> {
    fn native(self, call: &'static str) -> NativeResult<T>;
}

impl<T> NativeCall<T> for windows::core::Result<T> {
    fn native(self, call: &'static str) -> NativeResult<T> {
        self.map_err(|err| native_error(call, &err))
    }
}
