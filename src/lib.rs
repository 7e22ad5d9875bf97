mod compatibility;
mod config;
mod context;
mod device;
mod diagnostics;
mod error;
mod names;
mod negotiation;
mod runtime;
mod scoring;
mod system_info;
#[cfg(test)]
mod testing;
#[cfg(feature = "enable_tracing")]
mod tracing;
mod version;
mod window;

pub use compatibility::{CompatibilityFilter, Requirement, SWAPCHAIN_EXT_NAME};
pub use config::{ContextConfig, DiagnosticsConfig, ENGINE_INFO, EngineInfo};
pub use context::{Context, ContextBuilder, Surface};
pub use device::{
    DeviceCandidate, DevicePicker, PhysicalDevice, PhysicalDeviceSelector, QueueFamily,
    SurfaceSupport,
};
pub use diagnostics::{MessengerFilter, Severity};
pub use error::*;
pub use names::{append_if_absent, contains};
pub use negotiation::Capabilities;
pub use runtime::{AshInstance, AshRuntime, InstanceRequest, Runtime};
pub use scoring::{Score, ScoringPicker, device_type_score, memory_score, score};
pub use system_info::{DEBUG_UTILS_EXT_NAME, SystemInfo, Unsupported, VALIDATION_LAYER_NAME};
pub use version::Version;
pub use window::{RawActivation, RawWindowSystem, WindowSystem, WindowTraits};
