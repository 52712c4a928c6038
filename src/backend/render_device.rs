// Render device - host-facing entry points
//
// The host calls `init` once with a window, `set_res` on every resolution or
// fullscreen change and drops the device (or calls `exit`) on shutdown.
// Errors are logged here and then handed back to the host unchanged in kind;
// there is no degraded mode.

use super::adapter::{select_adapter, AdapterCandidate, AdapterSelection, SelectionCriteria};
use super::device::{LogicalDevice, DEFAULT_QUEUE_PRIORITY};
use super::error::{BackendError, BackendResult};
use super::instance::VulkanInstance;
use super::pipeline::{build_pipeline, PipelineObjects};
use super::presentation::PresentationMode;
use super::surface::PresentationSurface;
use super::swapchain::{RebuildOutcome, Swapchain, SwapchainApi, SwapchainTarget, VulkanSwapchainApi};
use anyhow::Result;
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::path::PathBuf;

/// Everything the backend needs from the host's configuration.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    pub app_name: String,
    pub presentation_mode: PresentationMode,
    /// Directory holding `shader.vert.spv` and `shader.frag.spv`
    pub data_dir: PathBuf,
    pub enable_validation: bool,
    /// Device extensions required on top of the swapchain extension
    pub extra_device_extensions: Vec<String>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            app_name: "Vulkan1Drv".to_string(),
            presentation_mode: PresentationMode::default(),
            data_dir: PathBuf::from("data"),
            enable_validation: cfg!(debug_assertions),
            extra_device_extensions: Vec::new(),
        }
    }
}

impl RendererSettings {
    pub fn selection_criteria(&self) -> SelectionCriteria {
        let extra = self
            .extra_device_extensions
            .iter()
            .filter_map(|name| match CString::new(name.as_str()) {
                Ok(name) => Some(name),
                Err(_) => {
                    log::warn!("Ignoring device extension name with NUL byte: {:?}", name);
                    None
                }
            })
            .collect::<Vec<_>>();
        SelectionCriteria::new(self.presentation_mode).with_extensions(extra)
    }
}

/// Resolution and fullscreen flag as last requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayState {
    pub resolution: vk::Extent2D,
    pub fullscreen: bool,
}

impl DisplayState {
    /// Record a `set_res` request. Returns the extent to rebuild for, or
    /// `None` for a zero-sized drawable. The fullscreen flag is recorded
    /// either way.
    pub fn request(&mut self, width: u32, height: u32, fullscreen: bool) -> Option<vk::Extent2D> {
        if fullscreen != self.fullscreen {
            log::info!("Fullscreen mode changed, reinitializing swapchain");
        }
        self.fullscreen = fullscreen;

        if width == 0 || height == 0 {
            log::debug!("Zero-sized drawable, keeping current swapchain");
            return None;
        }
        Some(vk::Extent2D { width, height })
    }
}

/// Fails with `UnsupportedPresentationMode` unless the adapter reported `mode`.
pub fn ensure_supported(selection: &AdapterSelection, mode: PresentationMode) -> BackendResult<()> {
    if selection.supports(mode) {
        Ok(())
    } else {
        Err(BackendError::UnsupportedPresentationMode(mode.present_mode()))
    }
}

/// Rebuild `swapchain` for `mode`. An unsupported mode leaves the chain untouched.
pub fn rebuild_for_mode<A: SwapchainApi>(
    swapchain: &mut Swapchain<A>,
    selection: &AdapterSelection,
    caps: &vk::SurfaceCapabilitiesKHR,
    mode: PresentationMode,
    resolution: vk::Extent2D,
) -> BackendResult<RebuildOutcome> {
    ensure_supported(selection, mode)?;
    swapchain.rebuild(caps, mode, resolution)
}

/// Vulkan objects owned by the renderer.
///
/// IMPORTANT: Field order matters for Drop! Fields drop top to bottom, which
/// is the reverse of creation order.
pub struct RenderDevice {
    swapchain: Swapchain<VulkanSwapchainApi>,
    pipeline: PipelineObjects,
    device: LogicalDevice,
    surface: PresentationSurface,
    instance: VulkanInstance,

    selection: AdapterSelection,
    settings: RendererSettings,
    display: DisplayState,
}

impl RenderDevice {
    /// Bring up the backend for `window`.
    ///
    /// `color_bytes` is accepted for host compatibility and ignored.
    pub fn init<W>(
        window: &W,
        width: u32,
        height: u32,
        color_bytes: u32,
        fullscreen: bool,
        settings: &RendererSettings,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        log::info!(
            "Init {}x{} ({} color bytes, ignored), {}",
            width,
            height,
            color_bytes,
            if fullscreen { "fullscreen" } else { "windowed" }
        );

        Self::try_init(window, vk::Extent2D { width, height }, fullscreen, settings).map_err(|e| {
            log::error!("Vulkan initialization failed: {}", e);
            anyhow::Error::new(e).context("Vulkan1Drv initialization failed")
        })
    }

    fn try_init<W>(
        window: &W,
        resolution: vk::Extent2D,
        fullscreen: bool,
        settings: &RendererSettings,
    ) -> BackendResult<Self>
    where
        W: HasWindowHandle + HasDisplayHandle,
    {
        let display_handle = window
            .display_handle()
            .map_err(|e| BackendError::UnsupportedWindow(e.to_string()))?
            .as_raw();
        let window_handle = window
            .window_handle()
            .map_err(|e| BackendError::UnsupportedWindow(e.to_string()))?
            .as_raw();

        // Step 1: Instance (+ debug messenger when validating)
        let instance = VulkanInstance::new(&settings.app_name, display_handle, settings.enable_validation)?;

        // Step 2: Surface for the host window
        let surface = PresentationSurface::new(&instance.entry, &instance.instance, display_handle, window_handle)?;

        // Step 3: Probe every adapter and pick the first that fits
        let adapters = instance.enumerate_adapters()?;
        log::info!("Vulkan reported {} device(s)", adapters.len());
        let candidates = adapters
            .into_iter()
            .map(|physical_device| AdapterCandidate::probe(&instance.instance, &surface, physical_device))
            .collect::<BackendResult<Vec<_>>>()?;

        let criteria = settings.selection_criteria();
        let selection = select_adapter(&candidates, &criteria)?;

        // Step 4: Logical device and queues
        let device = LogicalDevice::new(&instance.instance, &selection, DEFAULT_QUEUE_PRIORITY)?;

        // Step 5: Swapchain
        let target = SwapchainTarget {
            surface: surface.handle,
            surface_format: selection.surface_format,
            queue_families: selection.queue_families,
        };
        let caps = surface.capabilities(selection.physical_device)?;
        let swapchain = Swapchain::new(
            VulkanSwapchainApi::new(&instance.instance, &device.device),
            target,
            &caps,
            settings.presentation_mode,
            resolution,
        )?;

        // Step 6: Pipeline
        let pipeline = build_pipeline(&device.device, &settings.data_dir, swapchain.extent, swapchain.format)?;

        log::info!("Vulkan initialized successfully!");

        Ok(Self {
            swapchain,
            pipeline,
            device,
            surface,
            instance,
            selection,
            settings: settings.clone(),
            display: DisplayState { resolution, fullscreen },
        })
    }

    /// Resize entry point. A fullscreen toggle goes through the same full rebuild.
    pub fn set_res(&mut self, width: u32, height: u32, color_bytes: u32, fullscreen: bool) -> Result<()> {
        log::info!(
            "SetRes {}x{} ({} color bytes, ignored), {}",
            width,
            height,
            color_bytes,
            if fullscreen { "fullscreen" } else { "windowed" }
        );

        let Some(resolution) = self.display.request(width, height, fullscreen) else {
            return Ok(());
        };

        let outcome = self
            .rebuild_swapchain(resolution, self.settings.presentation_mode)
            .map_err(|e| {
                log::error!("Swapchain rebuild failed: {}", e);
                anyhow::Error::new(e).context("Vulkan1Drv resize failed")
            })?;
        if outcome == RebuildOutcome::Deferred {
            log::debug!("Surface has no area, resize deferred");
        }

        self.display.resolution = resolution;
        Ok(())
    }

    /// Switch presentation mode, rebuilding the swapchain.
    ///
    /// A mode the selected adapter did not report is rejected and the current
    /// chain stays in place.
    pub fn set_presentation_mode(&mut self, mode: PresentationMode) -> Result<()> {
        let outcome = ensure_supported(&self.selection, mode)
            .and_then(|()| self.rebuild_swapchain(self.display.resolution, mode))
            .map_err(|e| {
                log::error!("Presentation mode change failed: {}", e);
                anyhow::Error::new(e).context("Vulkan1Drv presentation mode change failed")
            })?;

        match outcome {
            RebuildOutcome::Rebuilt { .. } => log::info!("Presentation mode is now {:?}", mode),
            RebuildOutcome::Deferred => log::info!("Presentation mode {:?} applies on next resize", mode),
        }
        self.settings.presentation_mode = mode;
        Ok(())
    }

    fn rebuild_swapchain(&mut self, resolution: vk::Extent2D, mode: PresentationMode) -> BackendResult<RebuildOutcome> {
        self.device.wait_idle()?;
        let caps = self.surface.capabilities(self.selection.physical_device)?;
        rebuild_for_mode(&mut self.swapchain, &self.selection, &caps, mode, resolution)
    }

    /// Teardown entry point. Everything is released in reverse creation order.
    pub fn exit(self) {
        log::info!("Shutting down Vulkan1Drv");
        drop(self);
    }

    pub fn selection(&self) -> &AdapterSelection {
        &self.selection
    }

    pub fn device(&self) -> &LogicalDevice {
        &self.device
    }

    pub fn swapchain(&self) -> &Swapchain<VulkanSwapchainApi> {
        &self.swapchain
    }

    pub fn pipeline(&self) -> &PipelineObjects {
        &self.pipeline
    }

    pub fn presentation_mode(&self) -> PresentationMode {
        self.settings.presentation_mode
    }

    pub fn display(&self) -> DisplayState {
        self.display
    }
}

impl Drop for RenderDevice {
    fn drop(&mut self) {
        // Nothing may still be using the chain or pipeline when they go away.
        if let Err(e) = self.device.wait_idle() {
            log::warn!("Device wait failed during shutdown: {}", e);
        }
    }
}
