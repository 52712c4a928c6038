// Backend module - Vulkan bring-up
//
// Bring-up order: instance -> surface -> adapter selection -> logical device
// -> swapchain -> pipeline. Only the swapchain is rebuilt afterwards.

pub mod adapter;
pub mod bundle;
pub mod device;
pub mod error;
pub mod guard;
pub mod instance;
pub mod pipeline;
pub mod presentation;
pub mod render_device;
pub mod shader;
pub mod surface;
pub mod swapchain;

pub use adapter::{select_adapter, AdapterCandidate, AdapterSelection, SelectionCriteria};
pub use device::LogicalDevice;
pub use error::{BackendError, BackendResult};
pub use presentation::PresentationMode;
pub use render_device::{RenderDevice, RendererSettings};
pub use swapchain::Swapchain;
