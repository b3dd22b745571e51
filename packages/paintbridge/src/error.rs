use thiserror::Error;

/// Failure reported by a native drawing call.
///
/// Native factories and session calls return this instead of panicking; the paint
/// engine logs it and treats the requested resource as absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// The device was lost; the context and its target must be rebuilt.
    #[error("render target must be recreated")]
    RecreateTarget,
    /// A native call returned a failure code.
    #[error("{call} failed with {code:#010x}")]
    Failed { call: &'static str, code: u32 },
    /// The native API has no counterpart for the request.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
    /// The surface has no device context yet.
    #[error("device context is not initialized")]
    NotInitialized,
}

impl NativeError {
    pub fn failed(call: &'static str, code: u32) -> Self {
        Self::Failed { call, code }
    }

    pub fn is_device_loss(&self) -> bool {
        matches!(self, Self::RecreateTarget)
    }
}

pub type NativeResult<T> = Result<T, NativeError>;
