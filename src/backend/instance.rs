// Vulkan instance and diagnostic channel
//
// Responsibilities:
// - Loading the Vulkan library
// - Instance creation with the platform surface extensions
// - Validation layer + debug messenger (relays driver messages to the log)

use super::error::{native, BackendError, BackendResult};
use super::surface;
use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry};
use raw_window_handle::RawDisplayHandle;
use std::ffi::{CStr, CString};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

pub struct VulkanInstance {
    // Order matters for drop: messenger, then instance, then the library.
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
    pub instance: ash::Instance,
    pub entry: Entry,
}

impl VulkanInstance {
    /// Create a Vulkan instance able to present on `display`.
    ///
    /// # Arguments
    /// * `app_name` - Application name reported to the driver
    /// * `enable_validation` - Enable validation layers and the debug messenger
    pub fn new(app_name: &str, display: RawDisplayHandle, enable_validation: bool) -> BackendResult<Self> {
        log::info!("Creating Vulkan instance: {}", app_name);

        let entry = unsafe { Entry::load() }.map_err(|e| BackendError::LibraryLoad(e.to_string()))?;

        let enable_validation = enable_validation && Self::has_validation_layer(&entry);
        let instance = Self::create_instance(&entry, app_name, display, enable_validation)?;

        let debug_utils = if enable_validation {
            match Self::setup_debug_messenger(&entry, &instance) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(e);
                }
            }
        } else {
            None
        };

        Ok(Self {
            debug_utils,
            instance,
            entry,
        })
    }

    fn has_validation_layer(entry: &Entry) -> bool {
        let available = entry
            .enumerate_instance_layer_properties()
            .unwrap_or_default()
            .iter()
            .any(|layer| unsafe { CStr::from_ptr(layer.layer_name.as_ptr()) } == VALIDATION_LAYER);

        if !available {
            log::warn!("{:?} not installed, continuing without validation", VALIDATION_LAYER);
        }
        available
    }

    fn create_instance(
        entry: &Entry,
        app_name: &str,
        display: RawDisplayHandle,
        enable_validation: bool,
    ) -> BackendResult<ash::Instance> {
        let app_name_cstr = CString::new(app_name).unwrap_or_else(|_| c"vulkan1-drv".to_owned());
        let engine_name = c"Vulkan1Drv";

        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(engine_name)
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_3);

        let mut extensions: Vec<_> = surface::required_instance_extensions(display)?
            .into_iter()
            .map(CStr::as_ptr)
            .collect();
        if enable_validation {
            extensions.push(DebugUtils::name().as_ptr());
        }

        let layer_names = if enable_validation {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names);

        unsafe { entry.create_instance(&create_info, None) }.map_err(native("vkCreateInstance"))
    }

    fn setup_debug_messenger(
        entry: &Entry,
        instance: &ash::Instance,
    ) -> BackendResult<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = DebugUtils::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(native("vkCreateDebugUtilsMessengerEXT"))?;

        Ok((debug_utils, messenger))
    }

    pub fn enumerate_adapters(&self) -> BackendResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }.map_err(native("vkEnumeratePhysicalDevices"))
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan instance...");
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Category names a debug message is tagged with, e.g. `ERROR:VALIDATION:`.
pub(crate) fn message_prefix(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
) -> String {
    let mut prefix = String::new();

    let severities = [
        (vk::DebugUtilsMessageSeverityFlagsEXT::ERROR, "ERROR:"),
        (vk::DebugUtilsMessageSeverityFlagsEXT::WARNING, "WARNING:"),
        (vk::DebugUtilsMessageSeverityFlagsEXT::INFO, "INFO:"),
        (vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE, "DEBUG:"),
    ];
    for (flag, name) in severities {
        if severity.contains(flag) {
            prefix.push_str(name);
        }
    }

    let types = [
        (vk::DebugUtilsMessageTypeFlagsEXT::GENERAL, "GENERAL:"),
        (vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION, "VALIDATION:"),
        (vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE, "PERFORMANCE:"),
    ];
    for (flag, name) in types {
        if message_type.contains(flag) {
            prefix.push_str(name);
        }
    }

    prefix
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();
    let prefix = message_prefix(message_severity, message_type);

    if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::error!("[Vulkan] {} {}", prefix, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::warn!("[Vulkan] {} {}", prefix, message);
    } else if message_severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::info!("[Vulkan] {} {}", prefix, message);
    } else {
        log::debug!("[Vulkan] {} {}", prefix, message);
    }

    vk::FALSE
}
