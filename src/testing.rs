//! Test doubles for the runtime and windowing seams.

use crate::device::{DeviceCandidate, QueueFamily, SurfaceSupport};
use crate::diagnostics::MessengerFilter;
use crate::runtime::{InstanceRequest, Runtime};
use crate::system_info::{DEBUG_UTILS_EXT_NAME, VALIDATION_LAYER_NAME};
use crate::window::WindowSystem;
use crate::{ContextError, Version, WindowingError};
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Activate,
    Deactivate,
    CreateInstance,
    DestroyInstance,
    CreateMessenger,
    DestroyMessenger,
    CreateSurface,
    DestroySurface,
}

pub type Journal = Rc<RefCell<Vec<Call>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(vec![]))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub app_name: String,
    pub engine_name: String,
    pub api_version: Version,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
}

pub struct MockRuntime {
    pub calls: Journal,
    pub requests: Rc<RefCell<Vec<RecordedRequest>>>,
    pub filters: Rc<RefCell<Vec<MessengerFilter>>>,
    instance_version: Version,
    instance_extensions: Vec<String>,
    instance_layers: Vec<String>,
    devices: Vec<DeviceCandidate>,
    surface_support: HashMap<u64, (SurfaceSupport, bool)>,
    fail_instance: bool,
    fail_messenger: bool,
    fail_enumeration: bool,
    lost_devices: Vec<u64>,
}

impl MockRuntime {
    pub fn new(calls: Journal) -> Self {
        Self {
            calls,
            requests: Rc::default(),
            filters: Rc::default(),
            instance_version: Version::V1_3_0,
            instance_extensions: vec!["VK_KHR_surface".into(), DEBUG_UTILS_EXT_NAME.into()],
            instance_layers: vec![VALIDATION_LAYER_NAME.into()],
            devices: vec![],
            surface_support: HashMap::new(),
            fail_instance: false,
            fail_messenger: false,
            fail_enumeration: false,
            lost_devices: vec![],
        }
    }

    pub fn with_instance_version(mut self, version: Version) -> Self {
        self.instance_version = version;
        self
    }

    pub fn with_instance_extensions(mut self, extensions: &[&str]) -> Self {
        self.instance_extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_instance_layers(mut self, layers: &[&str]) -> Self {
        self.instance_layers = layers.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_device(mut self, device: DeviceCandidate) -> Self {
        self.devices.push(device);
        self
    }

    /// What device `raw` reports when described against a surface.
    pub fn with_surface_support(mut self, raw: u64, support: SurfaceSupport, present: bool) -> Self {
        self.surface_support.insert(raw, (support, present));
        self
    }

    pub fn failing_instance(mut self) -> Self {
        self.fail_instance = true;
        self
    }

    pub fn failing_messenger(mut self) -> Self {
        self.fail_messenger = true;
        self
    }

    pub fn failing_enumeration(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    /// Device `raw` is still enumerated but cannot be described.
    pub fn with_lost_device(mut self, raw: u64) -> Self {
        self.lost_devices.push(raw);
        self
    }
}

pub struct MockInstance;

impl Runtime for MockRuntime {
    type Instance = MockInstance;

    fn instance_version(&self) -> crate::Result<Version> {
        Ok(self.instance_version)
    }

    fn instance_extensions(&self) -> crate::Result<Vec<String>> {
        Ok(self.instance_extensions.clone())
    }

    fn instance_layers(&self) -> crate::Result<Vec<String>> {
        Ok(self.instance_layers.clone())
    }

    fn create_instance(&self, request: &InstanceRequest<'_>) -> crate::Result<MockInstance> {
        if self.fail_instance {
            return Err(ContextError::FailedCreateInstance(vk::Result::ERROR_INCOMPATIBLE_DRIVER).into());
        }
        self.requests.borrow_mut().push(RecordedRequest {
            app_name: request.app_name.to_owned(),
            engine_name: request.engine.name.to_owned(),
            api_version: request.api_version,
            extensions: request.extensions.to_vec(),
            layers: request.layers.to_vec(),
        });
        self.calls.borrow_mut().push(Call::CreateInstance);
        Ok(MockInstance)
    }

    fn create_messenger(
        &self,
        _instance: &MockInstance,
        filter: MessengerFilter,
    ) -> crate::Result<vk::DebugUtilsMessengerEXT> {
        if self.fail_messenger {
            return Err(ContextError::FailedCreateDebugMessenger(
                vk::Result::ERROR_EXTENSION_NOT_PRESENT,
            )
            .into());
        }
        self.filters.borrow_mut().push(filter);
        self.calls.borrow_mut().push(Call::CreateMessenger);
        Ok(vk::DebugUtilsMessengerEXT::from_raw(0xd1a9))
    }

    unsafe fn destroy_messenger(
        &self,
        _instance: &MockInstance,
        _messenger: vk::DebugUtilsMessengerEXT,
    ) {
        self.calls.borrow_mut().push(Call::DestroyMessenger);
    }

    unsafe fn destroy_instance(&self, _instance: &MockInstance) {
        self.calls.borrow_mut().push(Call::DestroyInstance);
    }

    unsafe fn destroy_surface(&self, _instance: &MockInstance, _surface: vk::SurfaceKHR) {
        self.calls.borrow_mut().push(Call::DestroySurface);
    }

    fn enumerate_physical_devices(
        &self,
        _instance: &MockInstance,
    ) -> crate::Result<Vec<vk::PhysicalDevice>> {
        if self.fail_enumeration {
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED.into());
        }
        Ok(self.devices.iter().map(DeviceCandidate::handle).collect())
    }

    fn describe_physical_device(
        &self,
        _instance: &MockInstance,
        device: vk::PhysicalDevice,
        surface: Option<vk::SurfaceKHR>,
    ) -> crate::Result<DeviceCandidate> {
        if self.lost_devices.contains(&device.as_raw()) {
            return Err(vk::Result::ERROR_SURFACE_LOST_KHR.into());
        }

        let candidate = self
            .devices
            .iter()
            .find(|candidate| candidate.handle() == device)
            .cloned()
            .ok_or(vk::Result::ERROR_DEVICE_LOST)?;

        if surface.is_none() {
            return Ok(candidate);
        }

        let (support, present) = self
            .surface_support
            .get(&device.as_raw())
            .cloned()
            .unwrap_or_default();
        Ok(with_present(candidate, present).with_surface_support(support))
    }
}

pub struct MockWindowSystem {
    calls: Journal,
    extensions: Vec<String>,
    fail_activation: bool,
    surfaces: Cell<u64>,
}

impl MockWindowSystem {
    pub fn new(calls: Journal, extensions: Vec<&str>) -> Self {
        Self {
            calls,
            extensions: extensions.into_iter().map(str::to_owned).collect(),
            fail_activation: false,
            surfaces: Cell::new(0),
        }
    }

    pub fn failing_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }
}

pub struct MockActivation {
    calls: Journal,
}

impl Drop for MockActivation {
    fn drop(&mut self) {
        self.calls.borrow_mut().push(Call::Deactivate);
    }
}

impl WindowSystem<MockRuntime> for MockWindowSystem {
    type Activation = MockActivation;
    type Window = ();

    fn activate(&self) -> Result<MockActivation, WindowingError> {
        if self.fail_activation {
            return Err(WindowingError::ActivationFailed {
                code: 65544,
                description: "X11: Failed to open display".into(),
            });
        }
        self.calls.borrow_mut().push(Call::Activate);
        Ok(MockActivation {
            calls: self.calls.clone(),
        })
    }

    fn required_extensions(&self, _activation: &MockActivation) -> crate::Result<Vec<String>> {
        Ok(self.extensions.clone())
    }

    fn create_surface(
        &self,
        _runtime: &MockRuntime,
        _instance: &MockInstance,
        _window: &(),
    ) -> crate::Result<vk::SurfaceKHR> {
        self.surfaces.set(self.surfaces.get() + 1);
        self.calls.borrow_mut().push(Call::CreateSurface);
        Ok(vk::SurfaceKHR::from_raw(0x5000 + self.surfaces.get()))
    }
}

pub fn heap(size: vk::DeviceSize, flags: vk::MemoryHeapFlags) -> vk::MemoryHeap {
    vk::MemoryHeap { size, flags }
}

/// A device with one graphics family and a device-local heap of `local_gib`.
pub fn candidate(
    raw: u64,
    device_type: vk::PhysicalDeviceType,
    local_gib: u64,
    extensions: &[&str],
) -> DeviceCandidate {
    let prefix = match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => "discrete",
        vk::PhysicalDeviceType::INTEGRATED_GPU => "integrated",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "virtual",
        vk::PhysicalDeviceType::CPU => "cpu",
        _ => "other",
    };

    DeviceCandidate::new(
        vk::PhysicalDevice::from_raw(raw),
        format!("{prefix}-{raw}"),
        device_type,
    )
    .with_memory_heaps(vec![
        heap(local_gib << 30, vk::MemoryHeapFlags::DEVICE_LOCAL),
        heap(16 << 30, vk::MemoryHeapFlags::empty()),
    ])
    .with_queue_families(vec![QueueFamily {
        index: 0,
        flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
        queue_count: 1,
        present_support: None,
    }])
    .with_extensions(extensions.iter().map(|e| e.to_string()).collect())
}

pub fn discrete(raw: u64, local_gib: u64) -> DeviceCandidate {
    candidate(raw, vk::PhysicalDeviceType::DISCRETE_GPU, local_gib, &["VK_KHR_swapchain"])
}

pub fn integrated(raw: u64, local_gib: u64) -> DeviceCandidate {
    candidate(raw, vk::PhysicalDeviceType::INTEGRATED_GPU, local_gib, &["VK_KHR_swapchain"])
}

/// Sets every queue family's present support as if queried against a surface.
pub fn with_present(candidate: DeviceCandidate, present: bool) -> DeviceCandidate {
    let families = candidate
        .queue_families()
        .iter()
        .cloned()
        .map(|family| QueueFamily {
            present_support: Some(present),
            ..family
        })
        .collect();
    candidate.with_queue_families(families)
}

/// Collects the level and message of every event it sees.
#[cfg(feature = "enable_tracing")]
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: std::sync::Arc<std::sync::Mutex<Vec<(tracing::Level, String)>>>,
}

#[cfg(feature = "enable_tracing")]
impl EventRecorder {
    /// Runs `f` with this recorder as the thread's subscriber.
    pub fn record<T>(&self, f: impl FnOnce() -> T) -> T {
        use tracing_subscriber::layer::SubscriberExt;

        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn events(&self) -> Vec<(tracing::Level, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn levels(&self) -> Vec<tracing::Level> {
        self.events().into_iter().map(|(level, _)| level).collect()
    }

    pub fn count(&self, level: tracing::Level) -> usize {
        self.levels().into_iter().filter(|&l| l == level).count()
    }
}

#[cfg(feature = "enable_tracing")]
struct MessageVisitor(String);

#[cfg(feature = "enable_tracing")]
impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

#[cfg(feature = "enable_tracing")]
impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventRecorder {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}
