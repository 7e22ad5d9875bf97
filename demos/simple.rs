use ember::{ContextBuilder, ContextConfig, DeviceCandidate, PhysicalDeviceSelector, Version};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

#[derive(Default, Debug)]
struct App {
    window: Option<Arc<Window>>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let init_window = || -> anyhow::Result<Arc<Window>> {
            let window = Arc::new(event_loop.create_window(WindowAttributes::default())?);

            let config = ContextConfig::new()
                .app_name("Example Vulkan Application")
                .app_version(Version::new(0, 1, 0))
                .enable_validation(true)
                .enable_diagnostics_channel(true);

            let context = ContextBuilder::with_window(window.clone(), config)?.build()?;
            let surface = context.create_surface(&*window)?;

            let physical_device = PhysicalDeviceSelector::new(&context)
                .surface(&surface)
                .select()?;
            tracing::info!(
                "Rendering on {} (graphics family {:?}, present family {:?})",
                physical_device.name(),
                physical_device.graphics_queue_family(),
                physical_device.present_queue_family(),
            );

            // Any strategy over the compatible candidates can replace the scorer.
            let first = PhysicalDeviceSelector::new(&context)
                .surface(&surface)
                .picker(|candidates: &[DeviceCandidate]| {
                    candidates
                        .iter()
                        .position(|c| c.name().contains("llvmpipe"))
                        .unwrap_or(0)
                })
                .select()?;
            tracing::info!("Custom picker chose {}", first.name());

            // The surface goes first, then the context releases the messenger,
            // the instance and windowing in that order.
            drop(surface);
            drop(context);

            Ok(window)
        };

        match init_window() {
            Ok(window) => {
                self.window.replace(window);
            }
            Err(err) => {
                tracing::error!("Could not initialize window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let event_loop = EventLoop::new()?;
    let mut app = App::default();
    event_loop.run_app(&mut app)?;

    Ok(())
}
