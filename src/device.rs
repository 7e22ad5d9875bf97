use crate::compatibility::CompatibilityFilter;
use crate::context::{Context, Surface};
use crate::runtime::Runtime;
use crate::scoring::ScoringPicker;
use crate::window::WindowSystem;
use crate::{PhysicalDeviceError, Version};
use ash::vk;

/// One queue family of a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
    /// Whether the family can present to the selection surface. `None` when no
    /// surface was queried.
    pub present_support: Option<bool>,
}

impl QueueFamily {
    pub fn supports_graphics(&self) -> bool {
        self.flags.contains(vk::QueueFlags::GRAPHICS)
    }

    pub fn supports_present(&self) -> bool {
        self.present_support == Some(true)
    }
}

/// Formats and present modes a candidate offers for the selection surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSupport {
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

/// Read-only snapshot of a physical device taken during enumeration.
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    handle: vk::PhysicalDevice,
    name: String,
    device_type: vk::PhysicalDeviceType,
    api_version: Version,
    memory_heaps: Vec<vk::MemoryHeap>,
    queue_families: Vec<QueueFamily>,
    extensions: Vec<String>,
    surface_support: Option<SurfaceSupport>,
}

impl DeviceCandidate {
    pub fn new(
        handle: vk::PhysicalDevice,
        name: impl Into<String>,
        device_type: vk::PhysicalDeviceType,
    ) -> Self {
        Self {
            handle,
            name: name.into(),
            device_type,
            api_version: Version::V1_0_0,
            memory_heaps: vec![],
            queue_families: vec![],
            extensions: vec![],
            surface_support: None,
        }
    }

    pub fn with_api_version(mut self, version: Version) -> Self {
        self.api_version = version;
        self
    }

    pub fn with_memory_heaps(mut self, heaps: Vec<vk::MemoryHeap>) -> Self {
        self.memory_heaps = heaps;
        self
    }

    pub fn with_queue_families(mut self, families: Vec<QueueFamily>) -> Self {
        self.queue_families = families;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_surface_support(mut self, support: SurfaceSupport) -> Self {
        self.surface_support = Some(support);
        self
    }

    pub fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_type(&self) -> vk::PhysicalDeviceType {
        self.device_type
    }

    pub fn api_version(&self) -> Version {
        self.api_version
    }

    pub fn memory_heaps(&self) -> &[vk::MemoryHeap] {
        &self.memory_heaps
    }

    pub fn queue_families(&self) -> &[QueueFamily] {
        &self.queue_families
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn surface_support(&self) -> Option<&SurfaceSupport> {
        self.surface_support.as_ref()
    }

    pub fn supports_extension(&self, name: &str) -> bool {
        crate::names::contains(&self.extensions, name)
    }

    /// First graphics family, restricted to families that can present when
    /// `present` is set.
    pub fn graphics_queue_family(&self, present: bool) -> Option<u32> {
        self.queue_families
            .iter()
            .find(|family| family.supports_graphics() && (!present || family.supports_present()))
            .map(|family| family.index)
    }
}

/// Chooses one of the compatible candidates.
///
/// Implemented for any `Fn(&[DeviceCandidate]) -> usize`, so a closure
/// returning an index into the slice works as a picker.
pub trait DevicePicker {
    fn pick(&self, candidates: &[DeviceCandidate]) -> crate::Result<usize>;
}

impl<F> DevicePicker for F
where
    F: Fn(&[DeviceCandidate]) -> usize,
{
    fn pick(&self, candidates: &[DeviceCandidate]) -> crate::Result<usize> {
        Ok(self(candidates))
    }
}

/// The selected device, independent of the enumeration it came from.
#[derive(Debug, Clone)]
pub struct PhysicalDevice {
    properties: DeviceCandidate,
    graphics_queue_family: Option<u32>,
    present_queue_family: Option<u32>,
}

impl PhysicalDevice {
    fn resolve(candidate: DeviceCandidate, present: bool) -> Self {
        let graphics_queue_family = candidate.graphics_queue_family(present);
        let present_queue_family = if present {
            graphics_queue_family
        } else {
            None
        };

        Self {
            properties: candidate,
            graphics_queue_family,
            present_queue_family,
        }
    }

    pub fn handle(&self) -> vk::PhysicalDevice {
        self.properties.handle
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }

    pub fn device_type(&self) -> vk::PhysicalDeviceType {
        self.properties.device_type
    }

    pub fn properties(&self) -> &DeviceCandidate {
        &self.properties
    }

    pub fn graphics_queue_family(&self) -> Option<u32> {
        self.graphics_queue_family
    }

    /// Only set when selection ran against a surface.
    pub fn present_queue_family(&self) -> Option<u32> {
        self.present_queue_family
    }
}

impl AsRef<vk::PhysicalDevice> for PhysicalDevice {
    fn as_ref(&self) -> &vk::PhysicalDevice {
        &self.properties.handle
    }
}

pub struct PhysicalDeviceSelector<'a, R: Runtime, W: WindowSystem<R>> {
    context: &'a Context<R, W>,
    surface: Option<&'a Surface<'a, R>>,
    filter_extensions: Vec<String>,
    picker: Option<Box<dyn DevicePicker + 'a>>,
}

impl<'a, R: Runtime, W: WindowSystem<R>> PhysicalDeviceSelector<'a, R, W> {
    pub fn new(context: &'a Context<R, W>) -> Self {
        Self {
            context,
            surface: None,
            filter_extensions: vec![],
            picker: None,
        }
    }

    /// Run the presentation checks against `surface`. Without one they are
    /// skipped.
    pub fn surface(mut self, surface: &'a Surface<'a, R>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Require a device extension on top of `VK_KHR_swapchain`.
    pub fn require_extension(mut self, extension: impl Into<String>) -> Self {
        crate::names::append_if_absent(&mut self.filter_extensions, [extension.into()]);
        self
    }

    /// Replace the default scoring with a custom strategy.
    pub fn picker(mut self, picker: impl DevicePicker + 'a) -> Self {
        self.picker = Some(Box::new(picker));
        self
    }

    #[cfg_attr(feature = "enable_tracing", tracing::instrument(skip(self)))]
    pub fn select(self) -> crate::Result<PhysicalDevice> {
        let runtime = self.context.runtime();
        let instance = self.context.instance();
        let surface = self.surface.map(Surface::handle);

        let physical_devices = runtime
            .enumerate_physical_devices(instance)
            .map_err(|_| PhysicalDeviceError::FailedToEnumeratePhysicalDevices)?;

        #[cfg(feature = "enable_tracing")]
        tracing::debug!("Found {} physical devices", physical_devices.len());

        // A device that cannot be described is treated as incompatible.
        let mut candidates = physical_devices
            .into_iter()
            .filter_map(
                |device| match runtime.describe_physical_device(instance, device, surface) {
                    Ok(candidate) => Some(candidate),
                    Err(_err) => {
                        #[cfg(feature = "enable_tracing")]
                        tracing::warn!("Skipping physical device {device:?}: {_err}");
                        None
                    }
                },
            )
            .collect::<Vec<_>>();

        let mut filter = CompatibilityFilter::new(surface.is_some());
        for extension in &self.filter_extensions {
            filter.require_extension(extension.clone());
        }
        filter.remove_incompatible(&mut candidates);

        if candidates.is_empty() {
            return Err(PhysicalDeviceError::NoCompatibleDevice.into());
        }

        let index = match &self.picker {
            Some(picker) => picker.pick(&candidates)?,
            None => ScoringPicker.pick(&candidates)?,
        };
        if index >= candidates.len() {
            return Err(PhysicalDeviceError::PickedOutOfRange {
                index,
                len: candidates.len(),
            }
            .into());
        }

        let physical_device = PhysicalDevice::resolve(candidates.swap_remove(index), surface.is_some());

        #[cfg(feature = "enable_tracing")]
        tracing::info!(
            "Selected physical device {} ({:?})",
            physical_device.name(),
            physical_device.device_type()
        );

        Ok(physical_device)
    }
}
