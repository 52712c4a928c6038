// Presentation surface
//
// Binds a native window to Vulkan. Window-system interop stays minimal: the
// host hands over raw window/display handles and we pick the matching
// platform surface extension.

use super::error::{native, BackendError, BackendResult};
use ash::extensions::khr;
use ash::{vk, Entry};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use std::ffi::CStr;
use std::ptr;

/// Instance extensions needed to create a surface on `display`.
pub fn required_instance_extensions(display: RawDisplayHandle) -> BackendResult<Vec<&'static CStr>> {
    let platform = match display {
        RawDisplayHandle::Windows(_) => khr::Win32Surface::name(),
        RawDisplayHandle::Wayland(_) => khr::WaylandSurface::name(),
        RawDisplayHandle::Xlib(_) => khr::XlibSurface::name(),
        RawDisplayHandle::Xcb(_) => khr::XcbSurface::name(),
        other => return Err(BackendError::UnsupportedWindow(format!("{other:?}"))),
    };
    Ok(vec![khr::Surface::name(), platform])
}

pub struct PresentationSurface {
    pub loader: khr::Surface,
    pub handle: vk::SurfaceKHR,
}

impl PresentationSurface {
    pub fn new(
        entry: &Entry,
        instance: &ash::Instance,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> BackendResult<Self> {
        let handle = unsafe { create_platform_surface(entry, instance, display, window)? };
        log::debug!("Created presentation surface {:?}", handle);

        Ok(Self {
            loader: khr::Surface::new(entry, instance),
            handle,
        })
    }

    pub fn capabilities(&self, physical_device: vk::PhysicalDevice) -> BackendResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.loader
                .get_physical_device_surface_capabilities(physical_device, self.handle)
        }
        .map_err(native("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"))
    }

    pub fn formats(&self, physical_device: vk::PhysicalDevice) -> BackendResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.loader
                .get_physical_device_surface_formats(physical_device, self.handle)
        }
        .map_err(native("vkGetPhysicalDeviceSurfaceFormatsKHR"))
    }

    pub fn present_modes(&self, physical_device: vk::PhysicalDevice) -> BackendResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.loader
                .get_physical_device_surface_present_modes(physical_device, self.handle)
        }
        .map_err(native("vkGetPhysicalDeviceSurfacePresentModesKHR"))
    }
}

impl Drop for PresentationSurface {
    fn drop(&mut self) {
        log::debug!("Destroying presentation surface");
        unsafe {
            self.loader.destroy_surface(self.handle, None);
        }
    }
}

unsafe fn create_platform_surface(
    entry: &Entry,
    instance: &ash::Instance,
    display: RawDisplayHandle,
    window: RawWindowHandle,
) -> BackendResult<vk::SurfaceKHR> {
    match (display, window) {
        (RawDisplayHandle::Windows(_), RawWindowHandle::Win32(handle)) => {
            let hinstance = handle.hinstance.map(|h| h.get()).unwrap_or(0) as *const std::ffi::c_void;
            let hwnd = handle.hwnd.get() as *const std::ffi::c_void;
            let create_info = vk::Win32SurfaceCreateInfoKHR::builder()
                .hinstance(hinstance)
                .hwnd(hwnd);
            khr::Win32Surface::new(entry, instance)
                .create_win32_surface(&create_info, None)
                .map_err(native("vkCreateWin32SurfaceKHR"))
        }
        (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(window)) => {
            let create_info = vk::WaylandSurfaceCreateInfoKHR::builder()
                .display(display.display.as_ptr())
                .surface(window.surface.as_ptr());
            khr::WaylandSurface::new(entry, instance)
                .create_wayland_surface(&create_info, None)
                .map_err(native("vkCreateWaylandSurfaceKHR"))
        }
        (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(window)) => {
            let dpy = display.display.map_or(ptr::null_mut(), |d| d.as_ptr());
            let create_info = vk::XlibSurfaceCreateInfoKHR::builder()
                .dpy(dpy as *mut _)
                .window(window.window);
            khr::XlibSurface::new(entry, instance)
                .create_xlib_surface(&create_info, None)
                .map_err(native("vkCreateXlibSurfaceKHR"))
        }
        (RawDisplayHandle::Xcb(display), RawWindowHandle::Xcb(window)) => {
            let connection = display.connection.map_or(ptr::null_mut(), |c| c.as_ptr());
            let create_info = vk::XcbSurfaceCreateInfoKHR::builder()
                .connection(connection)
                .window(window.window.get());
            khr::XcbSurface::new(entry, instance)
                .create_xcb_surface(&create_info, None)
                .map_err(native("vkCreateXcbSurfaceKHR"))
        }
        (display, window) => Err(BackendError::UnsupportedWindow(format!(
            "{display:?} / {window:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::{AndroidDisplayHandle, WaylandDisplayHandle, WindowsDisplayHandle};
    use std::ptr::NonNull;

    #[test]
    fn windows_needs_win32_surface() {
        let names = required_instance_extensions(RawDisplayHandle::Windows(WindowsDisplayHandle::new())).unwrap();
        assert_eq!(names, vec![khr::Surface::name(), khr::Win32Surface::name()]);
    }

    #[test]
    fn wayland_needs_wayland_surface() {
        let mut dummy = 0u8;
        let display = NonNull::from(&mut dummy).cast();
        let names = required_instance_extensions(RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display))).unwrap();
        assert_eq!(names[1], khr::WaylandSurface::name());
    }

    #[test]
    fn unknown_window_system_is_rejected() {
        let result = required_instance_extensions(RawDisplayHandle::Android(AndroidDisplayHandle::new()));
        assert!(matches!(result, Err(BackendError::UnsupportedWindow(_))));
    }
}
