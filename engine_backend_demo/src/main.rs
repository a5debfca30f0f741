//! Engine backend demo
//!
//! Opens a window, feeds the window system's surface extensions into the
//! platform config, bootstraps the Vulkan driver, creates a surface for the
//! window and tears everything down in order when the window closes.
//!
//! Run with `RUST_LOG=debug cargo run -p engine_backend_demo` for the full
//! bootstrap trace.

use ash::vk;
use engine_backend::backend::{Driver, Engine, Platform, PlatformConfig};
use engine_backend::backend::log::LogFacadeLogger;
use engine_backend_vulkan::backend::{required_surface_extensions, PlatformFactory, VulkanDriver, VulkanPlatform};
use std::error::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Engine::set_logger(LogFacadeLogger);

    let event_loop = EventLoop::new()?;
    let mut app = DemoApp::default();
    event_loop.run_app(&mut app)?;
    Ok(())
}

/// Everything alive between window creation and shutdown
///
/// Teardown order: surface, driver (messenger, device, instance), platform, window.
struct Session {
    window: Window,
    platform: Box<VulkanPlatform>,
    driver: VulkanDriver,
    surface: vk::SurfaceKHR,
}

impl Session {
    fn start(event_loop: &ActiveEventLoop) -> Result<Self, Box<dyn Error>> {
        let attributes = Window::default_attributes()
            .with_title("Engine Backend Demo")
            .with_inner_size(LogicalSize::new(800, 600));
        let window = event_loop.create_window(attributes)?;

        let surface_extensions = required_surface_extensions(&window)?;
        log::info!("Window system requires {:?}", surface_extensions);

        let config = PlatformConfig::default()
            .with_app_name("Engine Backend Demo")
            .with_required_extensions(surface_extensions);

        let mut platform = PlatformFactory::create_vulkan(config);
        let driver = platform.create_vulkan_driver();

        let surface = platform.create_surface(&window)?;
        driver.debug_utils().set_name(surface, "demo window surface");

        let context = driver.context();
        log::info!(
            "Bootstrap complete (validation: {}, debug utils: {})",
            context.is_validation_enabled(),
            context.is_debug_utils_supported()
        );

        Ok(Self {
            window,
            platform,
            driver,
            surface,
        })
    }

    fn shutdown(self) {
        let Session { window, platform, mut driver, surface } = self;

        platform.destroy_surface(surface);
        driver.terminate();

        let mut handle: Option<Box<dyn Platform>> = Some(platform);
        PlatformFactory::destroy(&mut handle);

        drop(window);
        log::info!("Shutdown complete");
    }
}

#[derive(Default)]
struct DemoApp {
    session: Option<Session>,
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        match Session::start(event_loop) {
            Ok(session) => {
                session.window.request_redraw();
                self.session = Some(session);
            }
            Err(e) => {
                log::error!("Failed to start demo: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(session) = self.session.take() {
                    session.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }
}
