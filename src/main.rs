// =============================================================================
// VULKAN1DRV DEMO HOST
// =============================================================================
//
// Opens a window and drives the render device through its host entry points:
//
//   resumed          -> RenderDevice::init
//   Resized / F11    -> RenderDevice::set_res
//   F5               -> RenderDevice::set_presentation_mode (next mode)
//   Escape / close   -> RenderDevice::exit
//
// =============================================================================

use anyhow::Result;
use std::sync::Arc;
use vulkan1_drv::backend::{BackendError, RenderDevice};
use vulkan1_drv::config::Config;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

/// The demo always asks for 32-bit color; the backend ignores the value.
const COLOR_BYTES: u32 = 4;

fn main() -> Result<()> {
    let config = Config::load();

    init_logging(&config);
    log::info!("Starting Vulkan1Drv demo");
    log::info!(
        "Window: {}x{} ({})",
        config.window.width,
        config.window.height,
        if config.window.fullscreen { "fullscreen" } else { "windowed" }
    );
    log::info!("Presentation mode: {:?}", config.graphics.presentation_mode);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    // A failed init or rebuild ends the loop; hand the error back to the caller.
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// env_logger with the config's level unless RUST_LOG overrides it
fn init_logging(config: &Config) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.parse_filters(&config.debug.log_level);
    }
    builder.init();
}

/// A rejected mode leaves the chain in place; any other failure tore it down.
fn is_rejected_mode(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<BackendError>(),
        Some(BackendError::UnsupportedPresentationMode(_))
    )
}

/// IMPORTANT: Field order matters for Drop! The device must be gone before
/// the window it presents to.
struct App {
    device: Option<RenderDevice>,
    window: Option<Arc<Window>>,
    config: Config,
    is_fullscreen: bool,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        let is_fullscreen = config.window.fullscreen;
        Self {
            device: None,
            window: None,
            config,
            is_fullscreen,
            fatal: None,
        }
    }

    /// Stop the demo with `error`. The device is not used again.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("Fatal: {:#}", error);
        self.fatal = Some(error);
        self.shutdown(event_loop);
    }

    fn resize(&mut self, event_loop: &ActiveEventLoop, width: u32, height: u32) {
        let Some(device) = self.device.as_mut() else {
            return;
        };
        if let Err(e) = device.set_res(width, height, COLOR_BYTES, self.is_fullscreen) {
            self.fail(event_loop, e);
        }
    }

    fn toggle_fullscreen(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.clone() else {
            return;
        };

        self.is_fullscreen = !self.is_fullscreen;
        if self.is_fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
            log::info!("Entered fullscreen mode");
        } else {
            window.set_fullscreen(None);
            log::info!("Exited fullscreen mode");
        }

        let size = window.inner_size();
        self.resize(event_loop, size.width, size.height);
    }

    fn cycle_presentation_mode(&mut self, event_loop: &ActiveEventLoop) {
        let Some(device) = self.device.as_mut() else {
            return;
        };

        let mode = device.presentation_mode().next();
        let Err(e) = device.set_presentation_mode(mode) else {
            return;
        };

        if is_rejected_mode(&e) {
            log::warn!("Staying on {:?}: {:#}", device.presentation_mode(), e);
        } else {
            self.fail(event_loop, e);
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(device) = self.device.take() {
            device.exit();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut window_attributes = WindowAttributes::default()
            .with_title(&self.config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        if self.is_fullscreen {
            window_attributes = window_attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        let size = window.inner_size();
        let settings = self.config.renderer_settings();
        match RenderDevice::init(
            window.as_ref(),
            size.width,
            size.height,
            COLOR_BYTES,
            self.is_fullscreen,
            &settings,
        ) {
            Ok(device) => {
                let selection = device.selection();
                log::info!("Rendering on \"{}\" (adapter #{})", selection.name, selection.index);
                self.device = Some(device);
            }
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                self.shutdown(event_loop);
            }

            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
                self.resize(event_loop, size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if !event.state.is_pressed() || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key) = event.physical_key {
                    match key {
                        KeyCode::Escape => {
                            log::info!("ESC pressed, exiting...");
                            self.shutdown(event_loop);
                        }
                        KeyCode::F11 => self.toggle_fullscreen(event_loop),
                        KeyCode::F5 => self.cycle_presentation_mode(event_loop),
                        _ => {}
                    }
                }
            }

            _ => {}
        }
    }
}
