use crate::Version;
use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Physical device error: {0}")]
    PhysicalDevice(#[from] PhysicalDeviceError),
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, PartialOrd, PartialEq, Eq, Ord, Error)]
pub enum PhysicalDeviceError {
    #[error("Surface extension not loaded")]
    SurfaceExtensionNotLoaded,
    #[error("Failed to enumerate physical devices")]
    FailedToEnumeratePhysicalDevices,
    #[error("No physical devices found")]
    NoPhysicalDevicesFound,
    #[error("No suitable device")]
    NoSuitableDevice,
    #[error("Device {device} reports queue family {family_index} more than once")]
    DuplicateQueueFamily { device: usize, family_index: u32 },
}

/// Malformed queue requests, refused before any device is considered.
#[derive(Debug, PartialEq, Error)]
pub enum QueueError {
    #[error("Queue request {request} has no required capabilities")]
    EmptyCapabilities { request: usize },
    #[error("Queue request {request} asks for zero queues")]
    ZeroQueueCount { request: usize },
    #[error("Queue request {request} has priority {priority} outside [0, 1]")]
    PriorityOutOfRange { request: usize, priority: f32 },
}

/// Why a single device was disqualified. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("API version {available} is below the required {required}")]
    ApiVersionTooLow {
        available: Version,
        required: Version,
    },
    #[error("Missing required extensions: {0:?}")]
    MissingExtensions(Vec<String>),
    #[error("Surface of queue request {request} has no formats or present modes")]
    UnusableSurface { request: usize },
    #[error("Queue request {request} is short of {missing} queues")]
    UnsatisfiableRequest { request: usize, missing: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
