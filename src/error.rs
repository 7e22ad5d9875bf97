use crate::Version;
use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Windowing error: {0}")]
    Windowing(#[from] WindowingError),
    #[error("Context error: {0}")]
    Context(#[from] ContextError),
    #[error("Physical device error: {0}")]
    PhysicalDevice(#[from] PhysicalDeviceError),
    #[error("Vulkan loading error: {0}")]
    Loading(#[from] ash::LoadingError),
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum WindowingError {
    #[error("Failed to activate windowing system ({code}): {description}")]
    ActivationFailed { code: i32, description: String },
    #[error("Window handle unavailable: {0}")]
    Handle(#[from] raw_window_handle::HandleError),
    #[error("Failed to query required surface extensions: {0}")]
    RequiredExtensions(vk::Result),
    #[error("Failed to create surface: {0}")]
    SurfaceCreation(vk::Result),
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Vulkan {requested} unavailable, runtime provides {available}")]
    ApiVersionUnavailable {
        requested: Version,
        available: Version,
    },
    #[error("Failed to create instance: {0}")]
    FailedCreateInstance(vk::Result),
    #[error("Failed to create debug messenger: {0}")]
    FailedCreateDebugMessenger(vk::Result),
    #[error("Name contains an interior nul byte: {0:?}")]
    InvalidName(String),
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum PhysicalDeviceError {
    #[error("Failed to enumerate physical devices")]
    FailedToEnumeratePhysicalDevices,
    #[error("No compatible physical device")]
    NoCompatibleDevice,
    #[error("Picker returned index {index} for {len} candidates")]
    PickedOutOfRange { index: usize, len: usize },
    #[error("Unrecognized physical device type {0}")]
    UnrecognizedDeviceType(i32),
}

pub type Result<T> = std::result::Result<T, Error>;
