use crate::config::{ContextConfig, ENGINE_INFO};
use crate::diagnostics::MessengerFilter;
use crate::negotiation::Capabilities;
use crate::runtime::{AshRuntime, InstanceRequest, Runtime};
use crate::system_info::{SystemInfo, Unsupported};
use crate::window::{RawWindowSystem, WindowSystem, WindowTraits};
use crate::{ContextError, Version};
use ash::vk;
use std::sync::Arc;

/// Builds a [`Context`].
///
/// `build` walks Uninitialized → WindowingActive → InstanceCreated → Ready;
/// dropping the context is the Destroyed transition. A failure at any step
/// releases whatever was acquired before it, newest first.
pub struct ContextBuilder<R: Runtime = AshRuntime, W: WindowSystem<R> = RawWindowSystem> {
    runtime: R,
    windowing: W,
    config: ContextConfig,
}

impl ContextBuilder<AshRuntime, RawWindowSystem> {
    /// Loads Vulkan and presents through `window`.
    pub fn with_window(window: Arc<dyn WindowTraits>, config: ContextConfig) -> crate::Result<Self> {
        Ok(Self::new(
            AshRuntime::load()?,
            RawWindowSystem::new(window),
            config,
        ))
    }

    /// Loads Vulkan without any surface support.
    pub fn headless(config: ContextConfig) -> crate::Result<Self> {
        Ok(Self::new(
            AshRuntime::load()?,
            RawWindowSystem::headless(),
            config,
        ))
    }
}

impl<R: Runtime, W: WindowSystem<R>> ContextBuilder<R, W> {
    pub fn new(runtime: R, windowing: W, config: ContextConfig) -> Self {
        Self {
            runtime,
            windowing,
            config,
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    #[cfg_attr(feature = "enable_tracing", tracing::instrument(skip(self)))]
    pub fn build(self) -> crate::Result<Context<R, W>> {
        let Self {
            runtime,
            windowing,
            config,
        } = self;

        let activation = windowing.activate()?;
        #[cfg(feature = "enable_tracing")]
        tracing::trace!("Context state: WindowingActive");

        let mandated = windowing.required_extensions(&activation)?;
        let capabilities = Capabilities::negotiate(&config, &mandated);

        let system_info = SystemInfo::get_system_info(&runtime)?;
        let unsupported = system_info.report_unsupported(&capabilities);

        check_instance_version(&config, system_info.instance_api_version)?;

        #[cfg(feature = "enable_tracing")]
        tracing::debug!(
            r#"
Application info: {{
    name: {:?},
    version: {},
    engine_name: {:?},
    engine_version: {},
    api_version: {},
}}
            "#,
            config.app_name,
            config.app_version,
            ENGINE_INFO.name,
            ENGINE_INFO.version,
            config.api_version,
        );

        let instance = runtime.create_instance(&InstanceRequest {
            app_name: &config.app_name,
            app_version: config.app_version,
            engine: ENGINE_INFO,
            api_version: config.api_version,
            extensions: &capabilities.extensions,
            layers: &capabilities.layers,
            flags: capabilities.flags,
        })?;
        #[cfg(feature = "enable_tracing")]
        tracing::trace!("Context state: InstanceCreated");

        let mut context = Context {
            instance,
            debug_messenger: None,
            capabilities,
            unsupported,
            config,
            runtime,
            windowing,
            _activation: activation,
        };

        // An error here drops `context`, which destroys the instance before
        // deactivating windowing.
        if context.config.diagnostics.enable_diagnostics_channel {
            let filter = MessengerFilter::from_config(&context.config.diagnostics);
            let messenger = context
                .runtime
                .create_messenger(&context.instance, filter)?;
            context.debug_messenger = Some(messenger);
        }

        #[cfg(feature = "enable_tracing")]
        tracing::trace!("Context state: Ready");

        Ok(context)
    }
}

/// Rejects loaders that cannot honour the request.
///
/// A 1.0 loader fails instance creation for any `apiVersion` above 1.0; newer
/// loaders accept a higher version than they report.
fn check_instance_version(config: &ContextConfig, available: Version) -> Result<(), ContextError> {
    if let Some(minimum) = config.minimum_instance_version {
        if available < minimum {
            return Err(ContextError::ApiVersionUnavailable {
                requested: minimum,
                available,
            });
        }
    }

    if available == Version::V1_0_0 && config.api_version > Version::V1_0_0 {
        return Err(ContextError::ApiVersionUnavailable {
            requested: config.api_version,
            available,
        });
    }

    Ok(())
}

/// An instance, its optional debug messenger and the windowing activation
/// they depend on.
///
/// Drop releases them in reverse: messenger, instance, then windowing.
pub struct Context<R: Runtime = AshRuntime, W: WindowSystem<R> = RawWindowSystem> {
    instance: R::Instance,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    capabilities: Capabilities,
    unsupported: Unsupported,
    config: ContextConfig,
    runtime: R,
    windowing: W,
    // Declared last so it is dropped after everything above.
    _activation: W::Activation,
}

impl<R: Runtime, W: WindowSystem<R>> Context<R, W> {
    pub fn instance(&self) -> &R::Instance {
        &self.instance
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn windowing(&self) -> &W {
        &self.windowing
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn api_version(&self) -> Version {
        self.config.api_version
    }

    /// The extensions, layers and flags the instance was created with.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Requested names the runtime did not list when the context was built.
    pub fn unsupported(&self) -> &Unsupported {
        &self.unsupported
    }

    pub fn debug_messenger(&self) -> Option<vk::DebugUtilsMessengerEXT> {
        self.debug_messenger
    }

    pub fn has_diagnostics_channel(&self) -> bool {
        self.debug_messenger.is_some()
    }

    /// Binds a presentable surface to `window`.
    pub fn create_surface(&self, window: &W::Window) -> crate::Result<Surface<'_, R>> {
        let handle = self
            .windowing
            .create_surface(&self.runtime, &self.instance, window)?;

        Ok(Surface {
            runtime: &self.runtime,
            instance: &self.instance,
            handle,
        })
    }
}

impl<R: Runtime, W: WindowSystem<R>> Drop for Context<R, W> {
    fn drop(&mut self) {
        unsafe {
            if let Some(debug_messenger) = self.debug_messenger.take() {
                self.runtime
                    .destroy_messenger(&self.instance, debug_messenger);
            }
            self.runtime.destroy_instance(&self.instance);
        }

        #[cfg(feature = "enable_tracing")]
        tracing::trace!("Context state: Destroyed");
    }
}

impl AsRef<ash::Instance> for Context<AshRuntime, RawWindowSystem> {
    fn as_ref(&self) -> &ash::Instance {
        self.instance.as_ref()
    }
}

/// A surface that cannot outlive the context that created it.
pub struct Surface<'a, R: Runtime> {
    runtime: &'a R,
    instance: &'a R::Instance,
    handle: vk::SurfaceKHR,
}

impl<R: Runtime> Surface<'_, R> {
    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }
}

impl<R: Runtime> Drop for Surface<'_, R> {
    fn drop(&mut self) {
        unsafe { self.runtime.destroy_surface(self.instance, self.handle) }
    }
}
