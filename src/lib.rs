// Vulkan1Drv - Vulkan backend bring-up for a host-owned window
//
// `backend` owns every Vulkan object; `config` maps config.toml onto the
// backend's settings.

pub mod backend;
pub mod config;
