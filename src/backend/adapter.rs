// Physical device (adapter) selection
//
// Each adapter is probed once against the presentation surface; the facts
// gathered there are immutable and selection itself is a pure first-fit scan
// over them. No scoring: the first candidate in enumeration order that passes
// every predicate wins.

use super::error::{native, BackendError, BackendResult};
use super::presentation::PresentationMode;
use super::surface::PresentationSurface;
use ash::vk;
use std::collections::BTreeSet;
use std::ffi::{c_char, CStr, CString};

/// Surface format the backend renders into unless overridden.
pub const PREFERRED_SURFACE_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_UNORM,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
};

/// Device extensions every candidate must expose.
pub fn default_device_extensions() -> Vec<CString> {
    vec![ash::extensions::khr::Swapchain::name().to_owned()]
}

/// Dynamic rendering is core from this version on; older devices need the extension.
pub const DYNAMIC_RENDERING_CORE_VERSION: u32 = vk::API_VERSION_1_3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub queue_count: u32,
    pub flags: vk::QueueFlags,
    /// Whether this family can present to the surface the adapter was probed with.
    pub supports_present: bool,
}

/// Everything selection needs to know about one physical device.
#[derive(Debug, Clone)]
pub struct AdapterCandidate {
    pub physical_device: vk::PhysicalDevice,
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
    pub features: vk::PhysicalDeviceFeatures,
    pub queue_families: Vec<QueueFamily>,
    pub surface_capabilities: vk::SurfaceCapabilitiesKHR,
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub extensions: BTreeSet<String>,
}

impl AdapterCandidate {
    /// Query every fact about `physical_device` relative to `surface`.
    pub fn probe(
        instance: &ash::Instance,
        surface: &PresentationSurface,
        physical_device: vk::PhysicalDevice,
    ) -> BackendResult<Self> {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let features = unsafe { instance.get_physical_device_features(physical_device) };
        let family_properties =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };

        let mut queue_families = Vec::with_capacity(family_properties.len());
        for (index, props) in family_properties.iter().enumerate() {
            let index = index as u32;
            let supports_present = unsafe {
                surface.loader.get_physical_device_surface_support(
                    physical_device,
                    index,
                    surface.handle,
                )
            }
            .map_err(native("vkGetPhysicalDeviceSurfaceSupportKHR"))?;

            queue_families.push(QueueFamily {
                index,
                queue_count: props.queue_count,
                flags: props.queue_flags,
                supports_present,
            });
        }

        let extensions = unsafe { instance.enumerate_device_extension_properties(physical_device) }
            .map_err(native("vkEnumerateDeviceExtensionProperties"))?
            .iter()
            .map(|ext| {
                unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) }
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Ok(Self {
            physical_device,
            name,
            device_type: properties.device_type,
            api_version: properties.api_version,
            features,
            queue_families,
            surface_capabilities: surface.capabilities(physical_device)?,
            surface_formats: surface.formats(physical_device)?,
            present_modes: surface.present_modes(physical_device)?,
            extensions,
        })
    }

    /// Extensions to check and enable on this device: the required set, plus
    /// `VK_KHR_dynamic_rendering` when the device predates Vulkan 1.3.
    pub fn device_extensions(&self, criteria: &SelectionCriteria) -> Vec<CString> {
        let mut names = criteria.required_extensions.clone();
        let dynamic_rendering = ash::extensions::khr::DynamicRendering::name();
        if self.api_version < DYNAMIC_RENDERING_CORE_VERSION && !names.iter().any(|n| n.as_c_str() == dynamic_rendering) {
            names.push(dynamic_rendering.to_owned());
        }
        names
    }

    /// Run the selection predicates in order, stopping at the first failure.
    pub fn evaluate(&self, criteria: &SelectionCriteria) -> Result<QueueFamilyIndices, Rejection> {
        if self.features.texture_compression_bc != vk::TRUE {
            return Err(Rejection::MissingTextureCompression);
        }

        let missing: Vec<String> = self
            .device_extensions(criteria)
            .iter()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !self.extensions.contains(name))
            .collect();
        if !missing.is_empty() {
            return Err(Rejection::MissingExtensions(missing));
        }

        let wanted = criteria.surface_format;
        if !self
            .surface_formats
            .iter()
            .any(|f| f.format == wanted.format && f.color_space == wanted.color_space)
        {
            return Err(Rejection::MissingSurfaceFormat {
                format: wanted.format,
                color_space: wanted.color_space,
            });
        }

        let present_mode = criteria.presentation_mode.present_mode();
        if !self.present_modes.contains(&present_mode) {
            return Err(Rejection::MissingPresentMode(present_mode));
        }

        // The two searches are independent and may land on the same family.
        let graphics = self
            .queue_families
            .iter()
            .find(|f| f.queue_count > 0 && f.flags.contains(vk::QueueFlags::GRAPHICS))
            .ok_or(Rejection::NoGraphicsFamily)?
            .index;

        let present = self
            .queue_families
            .iter()
            .find(|f| f.queue_count > 0 && f.supports_present)
            .ok_or(Rejection::NoPresentFamily)?
            .index;

        Ok(QueueFamilyIndices { graphics, present })
    }
}

/// Why a candidate was passed over.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no BC texture compression")]
    MissingTextureCompression,
    #[error("missing device extensions {0:?}")]
    MissingExtensions(Vec<String>),
    #[error("surface format {format:?}/{color_space:?} unsupported")]
    MissingSurfaceFormat {
        format: vk::Format,
        color_space: vk::ColorSpaceKHR,
    },
    #[error("present mode {0:?} unsupported")]
    MissingPresentMode(vk::PresentModeKHR),
    #[error("no queue family with graphics support")]
    NoGraphicsFamily,
    #[error("no queue family can present to the surface")]
    NoPresentFamily,
}

#[derive(Debug, Clone)]
pub struct SelectionCriteria {
    pub required_extensions: Vec<CString>,
    pub surface_format: vk::SurfaceFormatKHR,
    pub presentation_mode: PresentationMode,
}

impl SelectionCriteria {
    pub fn new(presentation_mode: PresentationMode) -> Self {
        Self {
            required_extensions: default_device_extensions(),
            surface_format: PREFERRED_SURFACE_FORMAT,
            presentation_mode,
        }
    }

    /// Require additional device extensions on top of the defaults.
    pub fn with_extensions(mut self, extra: impl IntoIterator<Item = CString>) -> Self {
        for name in extra {
            if !self.required_extensions.contains(&name) {
                self.required_extensions.push(name);
            }
        }
        self
    }

    /// Replace the single accepted surface format. No fallback search is done.
    pub fn with_surface_format(mut self, surface_format: vk::SurfaceFormatKHR) -> Self {
        self.surface_format = surface_format;
        self
    }

    pub fn extension_name_ptrs(&self) -> Vec<*const c_char> {
        self.required_extensions.iter().map(|name| name.as_ptr()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyIndices {
    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

/// The chosen adapter plus what device and swapchain creation need from it.
#[derive(Debug, Clone)]
pub struct AdapterSelection {
    /// Position of the adapter in the enumeration order.
    pub index: usize,
    pub physical_device: vk::PhysicalDevice,
    pub name: String,
    pub queue_families: QueueFamilyIndices,
    pub surface_format: vk::SurfaceFormatKHR,
    pub surface_capabilities: vk::SurfaceCapabilitiesKHR,
    pub present_modes: Vec<vk::PresentModeKHR>,
    /// Device extensions the logical device is created with.
    pub device_extensions: Vec<CString>,
}

impl AdapterSelection {
    pub fn supports(&self, mode: PresentationMode) -> bool {
        self.present_modes.contains(&mode.present_mode())
    }

    pub fn extension_name_ptrs(&self) -> Vec<*const c_char> {
        self.device_extensions.iter().map(|name| name.as_ptr()).collect()
    }
}

/// Pick the first candidate satisfying every predicate.
pub fn select_adapter(
    candidates: &[AdapterCandidate],
    criteria: &SelectionCriteria,
) -> BackendResult<AdapterSelection> {
    if candidates.is_empty() {
        return Err(BackendError::NoAdapters);
    }

    for (index, candidate) in candidates.iter().enumerate() {
        match candidate.evaluate(criteria) {
            Ok(queue_families) => {
                log::info!(
                    "Selected device #{} \"{}\" ({:?}), graphics family {}, present family {}",
                    index,
                    candidate.name,
                    candidate.device_type,
                    queue_families.graphics,
                    queue_families.present
                );
                return Ok(AdapterSelection {
                    index,
                    physical_device: candidate.physical_device,
                    name: candidate.name.clone(),
                    queue_families,
                    surface_format: criteria.surface_format,
                    surface_capabilities: candidate.surface_capabilities,
                    present_modes: candidate.present_modes.clone(),
                    device_extensions: candidate.device_extensions(criteria),
                });
            }
            Err(reason) => {
                log::info!("Rejected device #{} \"{}\": {}", index, candidate.name, reason);
            }
        }
    }

    Err(BackendError::NoSuitableAdapter {
        rejected: candidates.len(),
    })
}
