// Swapchain - Window presentation
//
// Manages the chain of images presented to the surface. The chain is never
// resized in place: every resolution, fullscreen or presentation-mode change
// destroys all views and the chain, then builds a new one from scratch.

use super::adapter::QueueFamilyIndices;
use super::error::{native, BackendError, BackendResult};
use super::guard::Guarded;
use super::presentation::PresentationMode;
use ash::extensions::khr;
use ash::prelude::VkResult;
use ash::vk;

/// Native calls the swapchain needs. Implemented over `ash` for real devices.
pub trait SwapchainApi {
    fn create_swapchain(&self, info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR>;
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;
    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>;
    fn destroy_image_view(&self, view: vk::ImageView);
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
}

impl<T: SwapchainApi + ?Sized> SwapchainApi for &T {
    fn create_swapchain(&self, info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        (**self).create_swapchain(info)
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        (**self).swapchain_images(swapchain)
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        (**self).create_image_view(info)
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        (**self).destroy_image_view(view)
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        (**self).destroy_swapchain(swapchain)
    }
}

pub struct VulkanSwapchainApi {
    device: ash::Device,
    loader: khr::Swapchain,
}

impl VulkanSwapchainApi {
    pub fn new(instance: &ash::Instance, device: &ash::Device) -> Self {
        Self {
            device: device.clone(),
            loader: khr::Swapchain::new(instance, device),
        }
    }
}

impl SwapchainApi for VulkanSwapchainApi {
    fn create_swapchain(&self, info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        unsafe { self.loader.create_swapchain(info, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.loader.get_swapchain_images(swapchain) }
    }

    fn create_image_view(&self, info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        unsafe { self.device.create_image_view(info, None) }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.loader.destroy_swapchain(swapchain, None) }
    }
}

/// Inputs fixed at adapter selection time and shared by every rebuild.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainTarget {
    pub surface: vk::SurfaceKHR,
    pub surface_format: vk::SurfaceFormatKHR,
    pub queue_families: QueueFamilyIndices,
}

/// Use the surface's current extent when defined, else clamp `requested`.
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, requested: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: requested
            .width
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: requested
            .height
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}

/// 3 images for triple buffering, 2 otherwise, kept within the surface's bounds.
/// A `max_image_count` of 0 means no upper limit.
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR, mode: PresentationMode) -> u32 {
    let mut count = mode.requested_image_count().max(caps.min_image_count);
    if caps.max_image_count > 0 {
        count = count.min(caps.max_image_count);
    }
    count
}

/// Exclusive for a shared family; concurrent across `[graphics, present]` otherwise.
pub fn sharing_mode(families: &QueueFamilyIndices) -> (vk::SharingMode, Vec<u32>) {
    if families.is_shared() {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    } else {
        (
            vk::SharingMode::CONCURRENT,
            vec![families.graphics, families.present],
        )
    }
}

/// Zero in either dimension: the window is minimized and nothing can be presented.
pub fn is_presentable(extent: vk::Extent2D) -> bool {
    extent.width > 0 && extent.height > 0
}

/// What `Swapchain::rebuild` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    Rebuilt { destroyed_views: usize },
    /// The surface has no area right now; the current chain is kept as is.
    Deferred,
}

pub struct Swapchain<A: SwapchainApi> {
    pub handle: vk::SwapchainKHR,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub extent: vk::Extent2D,
    pub presentation_mode: PresentationMode,
    /// (image, view) pairs in the order the platform returned the images
    pub images: Vec<(vk::Image, vk::ImageView)>,
    target: SwapchainTarget,
    api: A,
}

impl<A: SwapchainApi> Swapchain<A> {
    pub fn new(
        api: A,
        target: SwapchainTarget,
        caps: &vk::SurfaceCapabilitiesKHR,
        mode: PresentationMode,
        requested: vk::Extent2D,
    ) -> BackendResult<Self> {
        let mut swapchain = Self {
            handle: vk::SwapchainKHR::null(),
            format: target.surface_format.format,
            color_space: target.surface_format.color_space,
            extent: vk::Extent2D::default(),
            presentation_mode: mode,
            images: Vec::new(),
            target,
            api,
        };
        swapchain.build(caps, mode, requested)?;
        Ok(swapchain)
    }

    /// Tear everything down and create a fresh chain.
    ///
    /// The caller must make sure no submitted work still references the old
    /// images (wait for device idle first).
    pub fn rebuild(
        &mut self,
        caps: &vk::SurfaceCapabilitiesKHR,
        mode: PresentationMode,
        requested: vk::Extent2D,
    ) -> BackendResult<RebuildOutcome> {
        let extent = choose_extent(caps, requested);
        if !is_presentable(extent) {
            log::debug!(
                "Surface extent is {}x{}, keeping current swapchain",
                extent.width,
                extent.height
            );
            return Ok(RebuildOutcome::Deferred);
        }

        let destroyed = self.teardown();
        log::info!("Rebuilding swapchain, destroyed {} image views", destroyed);
        self.build(caps, mode, requested)?;
        Ok(RebuildOutcome::Rebuilt {
            destroyed_views: destroyed,
        })
    }

    pub fn image_views(&self) -> impl Iterator<Item = vk::ImageView> + '_ {
        self.images.iter().map(|&(_, view)| view)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn build(
        &mut self,
        caps: &vk::SurfaceCapabilitiesKHR,
        mode: PresentationMode,
        requested: vk::Extent2D,
    ) -> BackendResult<()> {
        let api = &self.api;
        let target = &self.target;

        let extent = choose_extent(caps, requested);
        if !is_presentable(extent) {
            return Err(BackendError::ZeroSizedSurface {
                width: extent.width,
                height: extent.height,
            });
        }
        let image_count = choose_image_count(caps, mode);
        let (sharing, family_indices) = sharing_mode(&target.queue_families);

        log::info!(
            "Creating swapchain: {}x{}, {} images requested, {:?}, {:?}",
            extent.width,
            extent.height,
            image_count,
            mode.present_mode(),
            sharing
        );

        let create_info = vk::SwapchainCreateInfoKHR::builder()
            .surface(target.surface)
            .min_image_count(image_count)
            .image_format(target.surface_format.format)
            .image_color_space(target.surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing)
            .queue_family_indices(&family_indices)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(mode.present_mode())
            .clipped(true);

        let chain = Guarded::new(
            api.create_swapchain(&create_info)
                .map_err(native("vkCreateSwapchainKHR"))?,
            |chain| api.destroy_swapchain(chain),
        );

        let images = api
            .swapchain_images(*chain)
            .map_err(native("vkGetSwapchainImagesKHR"))?;

        let mut views = Vec::with_capacity(images.len());
        for &image in &images {
            let view_info = vk::ImageViewCreateInfo::builder()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(target.surface_format.format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = api
                .create_image_view(&view_info)
                .map_err(native("vkCreateImageView"))?;
            views.push(Guarded::new(view, |view| api.destroy_image_view(view)));
        }

        log::info!("Created swapchain with {} images", images.len());

        let views: Vec<vk::ImageView> = views.into_iter().map(Guarded::into_inner).collect();
        let handle = chain.into_inner();

        self.handle = handle;
        self.extent = extent;
        self.presentation_mode = mode;
        self.images = images.into_iter().zip(views).collect();
        Ok(())
    }

    /// Destroy every view, then the chain. Returns the number of views destroyed.
    fn teardown(&mut self) -> usize {
        let destroyed = self.images.len();
        for (_, view) in self.images.drain(..) {
            self.api.destroy_image_view(view);
        }
        if self.handle != vk::SwapchainKHR::null() {
            self.api.destroy_swapchain(self.handle);
            self.handle = vk::SwapchainKHR::null();
        }
        destroyed
    }
}

impl<A: SwapchainApi> Drop for Swapchain<A> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::backend::adapter::{self, SelectionCriteria, PREFERRED_SURFACE_FORMAT};
    use crate::backend::device::{queue_create_infos, DEFAULT_QUEUE_PRIORITY};
    use crate::backend::error::BackendError;
    use ash::vk::Handle;
    use std::cell::RefCell;

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedChain {
        pub min_image_count: u32,
        pub extent: vk::Extent2D,
        pub sharing_mode: vk::SharingMode,
        pub family_indices: Vec<u32>,
        pub present_mode: vk::PresentModeKHR,
        pub usage: vk::ImageUsageFlags,
        pub composite_alpha: vk::CompositeAlphaFlagsKHR,
        pub clipped: bool,
    }

    #[derive(Default)]
    pub(crate) struct MockState {
        next_handle: u64,
        pub platform_image_count: usize,
        pub fail_view_at: Option<usize>,
        pub chains: Vec<RecordedChain>,
        pub live_chains: Vec<vk::SwapchainKHR>,
        pub live_views: Vec<vk::ImageView>,
        pub destroyed_views: usize,
        pub destroyed_chains: usize,
        pub teardown_log: Vec<&'static str>,
        views_this_chain: usize,
    }

    #[derive(Default)]
    pub(crate) struct MockApi {
        pub state: RefCell<MockState>,
    }

    impl MockApi {
        pub(crate) fn with_images(count: usize) -> Self {
            let api = MockApi::default();
            api.state.borrow_mut().platform_image_count = count;
            api
        }

        fn next(&self) -> u64 {
            let mut state = self.state.borrow_mut();
            state.next_handle += 1;
            state.next_handle
        }
    }

    impl SwapchainApi for MockApi {
        fn create_swapchain(&self, info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
            let family_indices = if info.queue_family_index_count == 0 {
                Vec::new()
            } else {
                unsafe {
                    std::slice::from_raw_parts(info.p_queue_family_indices, info.queue_family_index_count as usize)
                }
                .to_vec()
            };
            let handle = vk::SwapchainKHR::from_raw(self.next());
            let mut state = self.state.borrow_mut();
            state.chains.push(RecordedChain {
                min_image_count: info.min_image_count,
                extent: info.image_extent,
                sharing_mode: info.image_sharing_mode,
                family_indices,
                present_mode: info.present_mode,
                usage: info.image_usage,
                composite_alpha: info.composite_alpha,
                clipped: info.clipped == vk::TRUE,
            });
            state.live_chains.push(handle);
            state.views_this_chain = 0;
            Ok(handle)
        }

        fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
            let count = self.state.borrow().platform_image_count;
            Ok((0..count).map(|_| vk::Image::from_raw(self.next())).collect())
        }

        fn create_image_view(&self, _info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
            {
                let mut state = self.state.borrow_mut();
                if state.fail_view_at == Some(state.views_this_chain) {
                    return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
                }
                state.views_this_chain += 1;
            }
            let view = vk::ImageView::from_raw(self.next());
            self.state.borrow_mut().live_views.push(view);
            Ok(view)
        }

        fn destroy_image_view(&self, view: vk::ImageView) {
            let mut state = self.state.borrow_mut();
            state.live_views.retain(|&v| v != view);
            state.destroyed_views += 1;
            state.teardown_log.push("view");
        }

        fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
            let mut state = self.state.borrow_mut();
            state.live_chains.retain(|&c| c != swapchain);
            state.destroyed_chains += 1;
            state.teardown_log.push("chain");
        }
    }

    pub(crate) fn caps() -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D { width: 64, height: 64 },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 2160,
            },
            current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
            ..Default::default()
        }
    }

    pub(crate) fn target(graphics: u32, present: u32) -> SwapchainTarget {
        SwapchainTarget {
            surface: vk::SurfaceKHR::from_raw(0xABC),
            surface_format: PREFERRED_SURFACE_FORMAT,
            queue_families: QueueFamilyIndices { graphics, present },
        }
    }

    pub(crate) fn extent(width: u32, height: u32) -> vk::Extent2D {
        vk::Extent2D { width, height }
    }

    #[test]
    fn defined_current_extent_wins() {
        let mut caps = caps();
        caps.current_extent = extent(800, 600);
        assert_eq!(choose_extent(&caps, extent(1920, 1080)), extent(800, 600));
        assert_eq!(choose_extent(&caps, extent(1, 1)), extent(800, 600));
    }

    #[test]
    fn undefined_extent_is_clamped_idempotently() {
        let caps = caps();
        let clamped = choose_extent(&caps, extent(8000, 10));
        assert_eq!(clamped, extent(4096, 64));
        assert_eq!(choose_extent(&caps, clamped), clamped);

        let inside = extent(1280, 720);
        assert_eq!(choose_extent(&caps, inside), inside);
    }

    #[test]
    fn image_count_follows_mode() {
        let caps = caps();
        assert_eq!(choose_image_count(&caps, PresentationMode::VSyncTripleBuffering), 3);
        assert_eq!(choose_image_count(&caps, PresentationMode::Immediate), 2);
        assert_eq!(choose_image_count(&caps, PresentationMode::VSyncDoubleBuffering), 2);
        assert_eq!(choose_image_count(&caps, PresentationMode::RelaxedVSyncDoubleBuffering), 2);
    }

    #[test]
    fn image_count_respects_surface_bounds() {
        let mut caps = caps();
        caps.min_image_count = 3;
        assert_eq!(choose_image_count(&caps, PresentationMode::Immediate), 3);

        caps.min_image_count = 1;
        caps.max_image_count = 2;
        assert_eq!(choose_image_count(&caps, PresentationMode::VSyncTripleBuffering), 2);

        caps.max_image_count = 0;
        assert_eq!(choose_image_count(&caps, PresentationMode::VSyncTripleBuffering), 3);
    }

    #[test]
    fn sharing_mode_depends_on_families() {
        assert_eq!(
            sharing_mode(&QueueFamilyIndices { graphics: 1, present: 1 }),
            (vk::SharingMode::EXCLUSIVE, vec![])
        );
        assert_eq!(
            sharing_mode(&QueueFamilyIndices { graphics: 2, present: 0 }),
            (vk::SharingMode::CONCURRENT, vec![2, 0])
        );
    }

    #[test]
    fn creation_passes_fixed_parameters() {
        let swapchain = Swapchain::new(
            MockApi::with_images(3),
            target(0, 1),
            &caps(),
            PresentationMode::VSyncTripleBuffering,
            extent(1280, 720),
        )
        .unwrap();

        let state = swapchain.api().state.borrow();
        let chain = &state.chains[0];
        assert_eq!(chain.min_image_count, 3);
        assert_eq!(chain.extent, extent(1280, 720));
        assert_eq!(chain.sharing_mode, vk::SharingMode::CONCURRENT);
        assert_eq!(chain.family_indices, vec![0, 1]);
        assert_eq!(chain.present_mode, vk::PresentModeKHR::MAILBOX);
        assert_eq!(chain.usage, vk::ImageUsageFlags::COLOR_ATTACHMENT);
        assert_eq!(chain.composite_alpha, vk::CompositeAlphaFlagsKHR::OPAQUE);
        assert!(chain.clipped);
        assert_eq!(swapchain.images.len(), 3);
        assert_eq!(swapchain.extent, extent(1280, 720));
    }

    #[test]
    fn platform_may_return_more_images_than_requested() {
        let swapchain = Swapchain::new(
            MockApi::with_images(4),
            target(0, 0),
            &caps(),
            PresentationMode::Immediate,
            extent(640, 480),
        )
        .unwrap();
        assert_eq!(swapchain.api().state.borrow().chains[0].min_image_count, 2);
        assert_eq!(swapchain.images.len(), 4);
        assert_eq!(swapchain.image_views().count(), 4);
    }

    #[test]
    fn rebuild_tears_down_everything_first() {
        let mut swapchain = Swapchain::new(
            MockApi::with_images(3),
            target(0, 0),
            &caps(),
            PresentationMode::VSyncDoubleBuffering,
            extent(640, 480),
        )
        .unwrap();
        let old_views: Vec<_> = swapchain.image_views().collect();
        let old_handle = swapchain.handle;

        swapchain.api().state.borrow_mut().platform_image_count = 5;
        let outcome = swapchain
            .rebuild(&caps(), PresentationMode::VSyncTripleBuffering, extent(1920, 1080))
            .unwrap();

        assert_eq!(
            outcome,
            RebuildOutcome::Rebuilt {
                destroyed_views: old_views.len()
            }
        );
        let state = swapchain.api().state.borrow();
        assert_eq!(state.destroyed_views, 3);
        assert_eq!(state.destroyed_chains, 1);
        assert!(!state.live_chains.contains(&old_handle));
        assert!(old_views.iter().all(|v| !state.live_views.contains(v)));
        assert_eq!(state.live_chains, vec![swapchain.handle]);
        assert_eq!(state.live_views.len(), 5);
        drop(state);

        assert_eq!(swapchain.images.len(), 5);
        assert_eq!(swapchain.extent, extent(1920, 1080));
        assert_eq!(swapchain.presentation_mode, PresentationMode::VSyncTripleBuffering);
    }

    #[test]
    fn failed_view_releases_partial_chain() {
        let api = MockApi::with_images(3);
        api.state.borrow_mut().fail_view_at = Some(2);

        let result = Swapchain::new(
            api,
            target(0, 0),
            &caps(),
            PresentationMode::Immediate,
            extent(640, 480),
        );
        let err = result.err().unwrap();
        assert!(matches!(
            err,
            BackendError::NativeCall {
                call: "vkCreateImageView",
                ..
            }
        ));
    }

    #[test]
    fn failed_rebuild_leaves_nothing_alive() {
        let mut swapchain = Swapchain::new(
            MockApi::with_images(2),
            target(0, 0),
            &caps(),
            PresentationMode::Immediate,
            extent(640, 480),
        )
        .unwrap();
        swapchain.api().state.borrow_mut().fail_view_at = Some(1);

        assert!(swapchain
            .rebuild(&caps(), PresentationMode::Immediate, extent(800, 600))
            .is_err());

        let state = swapchain.api().state.borrow();
        assert!(state.live_views.is_empty());
        assert!(state.live_chains.is_empty());
        drop(state);
        assert!(swapchain.images.is_empty());
        assert_eq!(swapchain.handle, vk::SwapchainKHR::null());
    }

    #[test]
    fn minimized_surface_defers_rebuild() {
        let mut swapchain = Swapchain::new(
            MockApi::with_images(3),
            target(0, 0),
            &caps(),
            PresentationMode::VSyncDoubleBuffering,
            extent(640, 480),
        )
        .unwrap();
        let handle = swapchain.handle;
        let views: Vec<_> = swapchain.image_views().collect();

        let mut minimized = caps();
        minimized.current_extent = extent(0, 0);
        let outcome = swapchain
            .rebuild(&minimized, PresentationMode::Immediate, extent(1920, 1080))
            .unwrap();

        assert_eq!(outcome, RebuildOutcome::Deferred);
        assert_eq!(swapchain.handle, handle);
        assert_eq!(swapchain.image_views().collect::<Vec<_>>(), views);
        assert_eq!(swapchain.presentation_mode, PresentationMode::VSyncDoubleBuffering);
        let state = swapchain.api().state.borrow();
        assert_eq!(state.chains.len(), 1);
        assert_eq!(state.destroyed_views, 0);
        assert_eq!(state.live_chains, vec![handle]);
    }

    #[test]
    fn zero_extent_is_never_sent_to_the_driver() {
        let api = MockApi::with_images(2);
        let mut minimized = caps();
        minimized.current_extent = extent(0, 0);

        let result = Swapchain::new(&api, target(0, 0), &minimized, PresentationMode::Immediate, extent(640, 480));
        assert!(matches!(
            result.err(),
            Some(BackendError::ZeroSizedSurface { width: 0, height: 0 })
        ));
        assert!(api.state.borrow().chains.is_empty());
    }

    #[test]
    fn drop_destroys_views_then_chain() {
        let api = MockApi::with_images(2);
        {
            let swapchain = Swapchain::new(
                &api,
                target(0, 0),
                &caps(),
                PresentationMode::Immediate,
                extent(640, 480),
            )
            .unwrap();
            assert_ne!(swapchain.handle, vk::SwapchainKHR::null());
        }
        let state = api.state.borrow();
        assert_eq!(state.teardown_log, vec!["view", "view", "chain"]);
        assert!(state.live_views.is_empty());
        assert!(state.live_chains.is_empty());
    }

    #[test]
    fn failed_view_destroys_earlier_views_before_chain() {
        let api = MockApi::with_images(3);
        api.state.borrow_mut().fail_view_at = Some(2);
        assert!(Swapchain::new(&api, target(0, 0), &caps(), PresentationMode::Immediate, extent(640, 480)).is_err());

        let state = api.state.borrow();
        assert_eq!(state.teardown_log, vec!["view", "view", "chain"]);
        assert!(state.live_views.is_empty());
        assert!(state.live_chains.is_empty());
    }

    #[test]
    fn wrong_format_then_passing_adapter_end_to_end() {
        let mut a = adapter::tests::passing_candidate(1, "A");
        a.surface_formats = vec![vk::SurfaceFormatKHR {
            format: vk::Format::R5G6B5_UNORM_PACK16,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        }];
        let mut b = adapter::tests::passing_candidate(2, "B");
        b.queue_families = vec![
            adapter::QueueFamily {
                index: 0,
                queue_count: 1,
                flags: vk::QueueFlags::TRANSFER,
                supports_present: false,
            },
            adapter::QueueFamily {
                index: 1,
                queue_count: 2,
                flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE,
                supports_present: true,
            },
        ];

        let criteria = SelectionCriteria::new(PresentationMode::VSyncDoubleBuffering);
        let selection = adapter::select_adapter(&[a, b], &criteria).unwrap();
        assert_eq!(selection.name, "B");
        assert_eq!(selection.queue_families, QueueFamilyIndices { graphics: 1, present: 1 });

        let priorities = [DEFAULT_QUEUE_PRIORITY];
        let queue_infos = queue_create_infos(&selection.queue_families, &priorities);
        assert_eq!(queue_infos.len(), 1);
        assert_eq!(queue_infos[0].queue_family_index, 1);

        let swapchain = Swapchain::new(
            MockApi::with_images(2),
            SwapchainTarget {
                surface: vk::SurfaceKHR::from_raw(0xABC),
                surface_format: selection.surface_format,
                queue_families: selection.queue_families,
            },
            &selection.surface_capabilities,
            criteria.presentation_mode,
            extent(1024, 768),
        )
        .unwrap();
        let state = swapchain.api().state.borrow();
        assert_eq!(state.chains[0].sharing_mode, vk::SharingMode::EXCLUSIVE);
        assert!(state.chains[0].family_indices.is_empty());
        // Candidate B reports a defined current extent of 1280x720.
        assert_eq!(state.chains[0].extent, extent(1280, 720));
    }

    #[test]
    fn no_suitable_adapter_when_every_candidate_fails() {
        let mut a = adapter::tests::passing_candidate(1, "A");
        a.present_modes.clear();
        let criteria = SelectionCriteria::new(PresentationMode::Immediate);
        assert!(matches!(
            adapter::select_adapter(&[a], &criteria),
            Err(BackendError::NoSuitableAdapter { rejected: 1 })
        ));
    }
}
