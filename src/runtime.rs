use crate::config::EngineInfo;
use crate::device::{DeviceCandidate, QueueFamily, SurfaceSupport};
use crate::diagnostics::{MessengerFilter, diagnostics_callback};
use crate::{ContextError, Version};
use ash::{ext, khr, vk};
use std::ffi::{CStr, CString, FromBytesUntilNulError};

/// Everything needed to create the instance.
#[derive(Debug, Clone)]
pub struct InstanceRequest<'a> {
    pub app_name: &'a str,
    pub app_version: Version,
    pub engine: EngineInfo,
    pub api_version: Version,
    pub extensions: &'a [String],
    pub layers: &'a [String],
    pub flags: vk::InstanceCreateFlags,
}

/// The native graphics runtime.
///
/// [`AshRuntime`] talks to the Vulkan loader; the context and the device
/// selector only ever go through this trait.
pub trait Runtime {
    type Instance;

    fn instance_version(&self) -> crate::Result<Version>;

    fn instance_extensions(&self) -> crate::Result<Vec<String>>;

    fn instance_layers(&self) -> crate::Result<Vec<String>>;

    fn create_instance(&self, request: &InstanceRequest<'_>) -> crate::Result<Self::Instance>;

    fn create_messenger(
        &self,
        instance: &Self::Instance,
        filter: MessengerFilter,
    ) -> crate::Result<vk::DebugUtilsMessengerEXT>;

    /// # Safety
    /// `messenger` must come from `create_messenger` on `instance` and not be
    /// used afterwards.
    unsafe fn destroy_messenger(
        &self,
        instance: &Self::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
    );

    /// # Safety
    /// Every child object must already be destroyed and `instance` must not be
    /// used afterwards.
    unsafe fn destroy_instance(&self, instance: &Self::Instance);

    /// # Safety
    /// `surface` must belong to `instance` and not be used afterwards.
    unsafe fn destroy_surface(&self, instance: &Self::Instance, surface: vk::SurfaceKHR);

    fn enumerate_physical_devices(
        &self,
        instance: &Self::Instance,
    ) -> crate::Result<Vec<vk::PhysicalDevice>>;

    /// Snapshots `device`. Surface support and per-family present support are
    /// only queried when `surface` is given.
    fn describe_physical_device(
        &self,
        instance: &Self::Instance,
        device: vk::PhysicalDevice,
        surface: Option<vk::SurfaceKHR>,
    ) -> crate::Result<DeviceCandidate>;
}

pub struct AshRuntime {
    entry: ash::Entry,
}

impl AshRuntime {
    /// Loads the Vulkan loader library.
    #[cfg_attr(feature = "enable_tracing", tracing::instrument)]
    pub fn load() -> crate::Result<Self> {
        #[cfg(feature = "enable_tracing")]
        tracing::trace!("Loading entry...");
        let entry = unsafe { ash::Entry::load() }?;
        #[cfg(feature = "enable_tracing")]
        tracing::trace!("Entry loaded.");

        Ok(Self { entry })
    }

    pub fn from_entry(entry: ash::Entry) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }
}

impl std::fmt::Debug for AshRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AshRuntime").finish_non_exhaustive()
    }
}

/// A live instance with the extension loaders the crate needs.
pub struct AshInstance {
    instance: ash::Instance,
    surface: khr::surface::Instance,
    debug_utils: ext::debug_utils::Instance,
}

impl AshInstance {
    pub fn surface_loader(&self) -> &khr::surface::Instance {
        &self.surface
    }
}

impl AsRef<ash::Instance> for AshInstance {
    fn as_ref(&self) -> &ash::Instance {
        &self.instance
    }
}

fn owned_name(name: Result<&CStr, FromBytesUntilNulError>) -> String {
    name.map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn c_names(names: &[String]) -> crate::Result<Vec<CString>> {
    names
        .iter()
        .map(|name| {
            CString::new(name.as_str())
                .map_err(|_| crate::Error::from(ContextError::InvalidName(name.clone())))
        })
        .collect()
}

impl Runtime for AshRuntime {
    type Instance = AshInstance;

    fn instance_version(&self) -> crate::Result<Version> {
        let version = unsafe { self.entry.try_enumerate_instance_version() }?;
        Ok(version.map_or(Version::V1_0_0, Version::from))
    }

    fn instance_extensions(&self) -> crate::Result<Vec<String>> {
        let extensions = unsafe { self.entry.enumerate_instance_extension_properties(None) }?;
        Ok(extensions
            .iter()
            .map(|ext| owned_name(ext.extension_name_as_c_str()))
            .collect())
    }

    fn instance_layers(&self) -> crate::Result<Vec<String>> {
        let layers = unsafe { self.entry.enumerate_instance_layer_properties() }?;
        Ok(layers
            .iter()
            .map(|layer| owned_name(layer.layer_name_as_c_str()))
            .collect())
    }

    #[cfg_attr(feature = "enable_tracing", tracing::instrument(skip(self)))]
    fn create_instance(&self, request: &InstanceRequest<'_>) -> crate::Result<AshInstance> {
        let app_name = CString::new(request.app_name)
            .map_err(|_| ContextError::InvalidName(request.app_name.to_owned()))?;
        let engine_name = CString::new(request.engine.name)
            .map_err(|_| ContextError::InvalidName(request.engine.name.to_owned()))?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(request.app_version.into())
            .engine_name(&engine_name)
            .engine_version(request.engine.version.into())
            .api_version(request.api_version.into());

        let extensions = c_names(request.extensions)?;
        let layers = c_names(request.layers)?;
        let extension_ptrs = extensions.iter().map(|e| e.as_ptr()).collect::<Vec<_>>();
        let layer_ptrs = layers.iter().map(|l| l.as_ptr()).collect::<Vec<_>>();

        let create_info = vk::InstanceCreateInfo::default()
            .flags(request.flags)
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe { self.entry.create_instance(&create_info, None) }
            .map_err(ContextError::FailedCreateInstance)?;

        #[cfg(feature = "enable_tracing")]
        tracing::info!("Created vkInstance");

        Ok(AshInstance {
            surface: khr::surface::Instance::new(&self.entry, &instance),
            debug_utils: ext::debug_utils::Instance::new(&self.entry, &instance),
            instance,
        })
    }

    fn create_messenger(
        &self,
        instance: &AshInstance,
        filter: MessengerFilter,
    ) -> crate::Result<vk::DebugUtilsMessengerEXT> {
        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(filter.severity)
            .message_type(filter.message_type)
            .pfn_user_callback(Some(diagnostics_callback));

        let messenger = unsafe {
            instance
                .debug_utils
                .create_debug_utils_messenger(&create_info, None)
        }
        .map_err(ContextError::FailedCreateDebugMessenger)?;

        #[cfg(feature = "enable_tracing")]
        tracing::info!("Created debug messenger");

        Ok(messenger)
    }

    unsafe fn destroy_messenger(
        &self,
        instance: &AshInstance,
        messenger: vk::DebugUtilsMessengerEXT,
    ) {
        unsafe {
            instance
                .debug_utils
                .destroy_debug_utils_messenger(messenger, None)
        }
    }

    unsafe fn destroy_instance(&self, instance: &AshInstance) {
        unsafe { instance.instance.destroy_instance(None) }
    }

    unsafe fn destroy_surface(&self, instance: &AshInstance, surface: vk::SurfaceKHR) {
        unsafe { instance.surface.destroy_surface(surface, None) }
    }

    fn enumerate_physical_devices(
        &self,
        instance: &AshInstance,
    ) -> crate::Result<Vec<vk::PhysicalDevice>> {
        Ok(unsafe { instance.instance.enumerate_physical_devices() }?)
    }

    fn describe_physical_device(
        &self,
        instance: &AshInstance,
        device: vk::PhysicalDevice,
        surface: Option<vk::SurfaceKHR>,
    ) -> crate::Result<DeviceCandidate> {
        let raw = &instance.instance;

        let properties = unsafe { raw.get_physical_device_properties(device) };
        let memory = unsafe { raw.get_physical_device_memory_properties(device) };
        let families = unsafe { raw.get_physical_device_queue_family_properties(device) };
        let extensions = unsafe { raw.enumerate_device_extension_properties(device) }?;

        let memory_heaps = memory
            .memory_heaps
            .iter()
            .take(memory.memory_heap_count as usize)
            .copied()
            .collect();

        let mut queue_families = Vec::with_capacity(families.len());
        for (index, family) in (0u32..).zip(&families) {
            let present_support = match surface {
                Some(surface) => Some(unsafe {
                    instance
                        .surface
                        .get_physical_device_surface_support(device, index, surface)
                }?),
                None => None,
            };
            queue_families.push(QueueFamily {
                index,
                flags: family.queue_flags,
                queue_count: family.queue_count,
                present_support,
            });
        }

        let mut candidate = DeviceCandidate::new(
            device,
            owned_name(properties.device_name_as_c_str()),
            properties.device_type,
        )
        .with_api_version(Version::from(properties.api_version))
        .with_memory_heaps(memory_heaps)
        .with_queue_families(queue_families)
        .with_extensions(
            extensions
                .iter()
                .map(|ext| owned_name(ext.extension_name_as_c_str()))
                .collect(),
        );

        if let Some(surface) = surface {
            let formats = unsafe {
                instance
                    .surface
                    .get_physical_device_surface_formats(device, surface)
            }?;
            let present_modes = unsafe {
                instance
                    .surface
                    .get_physical_device_surface_present_modes(device, surface)
            }?;
            candidate = candidate.with_surface_support(SurfaceSupport {
                formats,
                present_modes,
            });
        }

        Ok(candidate)
    }
}
