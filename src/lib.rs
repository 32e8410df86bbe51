mod aggregate;
mod allocator;
mod capability;
mod descriptor;
mod error;
mod events;
mod extensions;
mod request;
mod selector;
mod version;
mod vulkan;

pub use aggregate::{FamilyCreateRecord, aggregate_family_records};
pub use allocator::allocate_queues;
pub use capability::CapabilityMask;
pub use descriptor::{
    DeviceDescriptor, DeviceProperties, DeviceSource, DeviceType, QueueFamilyDescriptor,
    QueueFamilyProperties, SurfaceSupport, collect_descriptors,
};
pub use error::*;
pub use events::{SelectionEvent, SelectionObserver, TracingObserver};
pub use extensions::{ExtensionCheck, check_extensions};
pub use request::{
    DEFAULT_QUEUE_PRIORITY, DeviceRequirements, QueueLocation, QueueRequest, normalize_priorities,
};
pub use selector::{
    DISQUALIFIED_SCORE, DeviceScore, DeviceSelector, PREFERRED_TYPE_SCORE, Selection,
};
pub use version::Version;
pub use vulkan::{AshDeviceSource, queue_create_infos};
