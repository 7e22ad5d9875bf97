use crate::WindowingError;
use crate::runtime::{AshRuntime, Runtime};
use ash::vk;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CStr;
use std::fmt::Debug;
use std::sync::Arc;

pub trait WindowTraits: HasDisplayHandle + HasWindowHandle + Debug {}
impl<T> WindowTraits for T where T: HasDisplayHandle + HasWindowHandle + Debug {}

/// The platform windowing layer the context presents through.
///
/// The value returned by [`WindowSystem::activate`] keeps the layer active;
/// dropping it deactivates the layer. The context holds it for its whole
/// lifetime and drops it last.
pub trait WindowSystem<R: Runtime> {
    type Activation;
    type Window: ?Sized;

    fn activate(&self) -> Result<Self::Activation, WindowingError>;

    /// Instance extensions the layer needs to create surfaces.
    fn required_extensions(&self, activation: &Self::Activation) -> crate::Result<Vec<String>>;

    fn create_surface(
        &self,
        runtime: &R,
        instance: &R::Instance,
        window: &Self::Window,
    ) -> crate::Result<vk::SurfaceKHR>;
}

/// Windowing through `raw-window-handle`, for winit and friends.
///
/// The event loop owns the platform connection, so activation only checks that
/// the display is reachable.
#[derive(Debug, Clone)]
pub struct RawWindowSystem {
    display: Option<Arc<dyn WindowTraits>>,
}

impl RawWindowSystem {
    pub fn new(window: Arc<dyn WindowTraits>) -> Self {
        Self {
            display: Some(window),
        }
    }

    /// No surface extensions; surfaces cannot be presented to.
    pub fn headless() -> Self {
        Self { display: None }
    }

    pub fn is_headless(&self) -> bool {
        self.display.is_none()
    }
}

#[derive(Debug)]
pub struct RawActivation {
    display: Option<raw_window_handle::RawDisplayHandle>,
}

impl Drop for RawActivation {
    fn drop(&mut self) {
        #[cfg(feature = "enable_tracing")]
        tracing::trace!(display = ?self.display, "Windowing deactivated");
    }
}

impl WindowSystem<AshRuntime> for RawWindowSystem {
    type Activation = RawActivation;
    type Window = dyn WindowTraits;

    fn activate(&self) -> Result<RawActivation, WindowingError> {
        let display_handle = match &self.display {
            Some(window) => Some(window.display_handle()?.as_raw()),
            None => None,
        };

        #[cfg(feature = "enable_tracing")]
        tracing::trace!(display = ?display_handle, "Windowing activated");

        Ok(RawActivation {
            display: display_handle,
        })
    }

    fn required_extensions(&self, activation: &RawActivation) -> crate::Result<Vec<String>> {
        let Some(display) = activation.display else {
            return Ok(vec![]);
        };

        let extensions = ash_window::enumerate_required_extensions(display)
            .map_err(WindowingError::RequiredExtensions)?;

        Ok(extensions
            .iter()
            .map(|&ext| unsafe { CStr::from_ptr(ext) }.to_string_lossy().into_owned())
            .collect())
    }

    fn create_surface(
        &self,
        runtime: &AshRuntime,
        instance: &<AshRuntime as Runtime>::Instance,
        window: &Self::Window,
    ) -> crate::Result<vk::SurfaceKHR> {
        let display_handle = window
            .display_handle()
            .map_err(WindowingError::from)?
            .as_raw();
        let window_handle = window
            .window_handle()
            .map_err(WindowingError::from)?
            .as_raw();

        let surface = unsafe {
            ash_window::create_surface(
                runtime.entry(),
                instance.as_ref(),
                display_handle,
                window_handle,
                None,
            )
        }
        .map_err(WindowingError::SurfaceCreation)?;

        #[cfg(feature = "enable_tracing")]
        tracing::info!("Created vkSurfaceKhr");

        Ok(surface)
    }
}
