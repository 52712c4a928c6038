// Backend error taxonomy
//
// Every failure during bring-up is fatal at the point of detection. The
// host-facing entry points wrap these into anyhow errors, log them and hand
// them back to the caller.

use ash::vk;
use std::path::PathBuf;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The Vulkan loader could not be found or opened.
    #[error("Failed to load Vulkan library: {0}")]
    LibraryLoad(String),

    /// Vulkan enumerated no physical devices at all.
    #[error("Vulkan reported no devices")]
    NoAdapters,

    /// Devices exist but none passed every selection predicate.
    #[error("Can't find supported device (presentation + graphics), {rejected} candidate(s) rejected")]
    NoSuitableAdapter { rejected: usize },

    #[error("Shader file not found: {path:?}")]
    AssetMissing { path: PathBuf },

    #[error("Shader file size is not a multiple of 4: {path:?} ({len} bytes)")]
    AssetMalformed { path: PathBuf, len: u64 },

    #[error("Failed to read {path:?}: {source}")]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A native creation call returned a failure status.
    #[error("{call} failed: {result}")]
    NativeCall {
        call: &'static str,
        result: vk::Result,
    },

    /// The surface currently has no area (minimized window).
    #[error("Cannot create a swapchain for a {width}x{height} surface")]
    ZeroSizedSurface { width: u32, height: u32 },

    #[error("Presentation mode {0:?} is not supported by the selected device")]
    UnsupportedPresentationMode(vk::PresentModeKHR),

    #[error("Unsupported window system: {0}")]
    UnsupportedWindow(String),
}

/// Adapter for `map_err` on raw `ash` results.
pub(crate) fn native(call: &'static str) -> impl FnOnce(vk::Result) -> BackendError {
    move |result| BackendError::NativeCall { call, result }
}
