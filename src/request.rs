use crate::{CapabilityMask, QueueError};
use ash::vk;
use std::collections::BTreeSet;

/// Default priority for queues whose request did not name one.
pub const DEFAULT_QUEUE_PRIORITY: f32 = 1.0;

/// A concrete queue on the selected device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueLocation {
    /// Index of the queue family.
    pub family_index: u32,
    /// Queue index within the family.
    pub slot_index: u32,
}

impl QueueLocation {
    pub fn new(family_index: u32, slot_index: u32) -> Self {
        Self {
            family_index,
            slot_index,
        }
    }
}

/// Caller's declaration of the queues it needs.
///
/// `S` is the surface handle type, `vk::SurfaceKHR` unless a custom
/// [`DeviceSource`](crate::DeviceSource) is used.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueRequest<S = vk::SurfaceKHR> {
    pub capabilities: CapabilityMask,
    pub surface: Option<S>,
    pub count: u32,
    pub priorities: Vec<f32>,
    pub(crate) queue_locations: Vec<QueueLocation>,
}

impl<S> QueueRequest<S> {
    pub fn new(capabilities: CapabilityMask, count: u32) -> Self {
        Self {
            capabilities,
            surface: None,
            count,
            priorities: Vec::new(),
            queue_locations: Vec::new(),
        }
    }

    /// Require that the queues can present to `surface`.
    pub fn with_surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_priorities(mut self, priorities: impl Into<Vec<f32>>) -> Self {
        self.priorities = priorities.into();
        self
    }

    /// Locations assigned to this request, one per queue, in unit order.
    ///
    /// Empty on requests the caller built; populated on the copies returned in a
    /// [`Selection`](crate::Selection).
    pub fn queue_locations(&self) -> &[QueueLocation] {
        &self.queue_locations
    }

    /// Distinct queue families this request's queues live in.
    pub fn family_indices(&self) -> BTreeSet<u32> {
        self.queue_locations
            .iter()
            .map(|location| location.family_index)
            .collect()
    }

    /// Pads missing priorities with [`DEFAULT_QUEUE_PRIORITY`].
    pub fn normalize_priorities(&mut self) {
        self.pad_priorities(self.count);
    }

    /// Pads priorities up to `count`, but never past `limit`.
    pub(crate) fn pad_priorities(&mut self, limit: u32) {
        let len = self.count.min(limit) as usize;
        if self.priorities.len() < len {
            self.priorities.resize(len, DEFAULT_QUEUE_PRIORITY);
        }
    }

    pub(crate) fn validate(&self, request: usize) -> Result<(), QueueError> {
        if self.capabilities.is_empty() {
            return Err(QueueError::EmptyCapabilities { request });
        }

        if self.count == 0 {
            return Err(QueueError::ZeroQueueCount { request });
        }

        if let Some(&priority) = self
            .priorities
            .iter()
            .find(|priority| !(0.0..=1.0).contains(*priority))
        {
            return Err(QueueError::PriorityOutOfRange { request, priority });
        }

        Ok(())
    }
}

/// Everything a device has to provide: the queues and the device extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRequirements<S = vk::SurfaceKHR> {
    pub queues: Vec<QueueRequest<S>>,
    pub extensions: Vec<String>,
}

impl<S> Default for DeviceRequirements<S> {
    fn default() -> Self {
        Self {
            queues: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

impl<S> DeviceRequirements<S> {
    pub fn fill_queue_priorities_if_needed(&mut self) {
        normalize_priorities(&mut self.queues);
    }

    /// Like [`fill_queue_priorities_if_needed`](Self::fill_queue_priorities_if_needed),
    /// stopping at `capacity` queues per request. A request asking for more can
    /// not be served anyway.
    pub(crate) fn fill_queue_priorities_within(&mut self, capacity: u32) {
        for request in &mut self.queues {
            request.pad_priorities(capacity);
        }
    }

    pub(crate) fn validate(&self) -> Result<(), QueueError> {
        self.queues
            .iter()
            .enumerate()
            .try_for_each(|(index, request)| request.validate(index))
    }
}

/// Runs [`QueueRequest::normalize_priorities`] over every request.
pub fn normalize_priorities<S>(requests: &mut [QueueRequest<S>]) {
    for request in requests {
        request.normalize_priorities();
    }
}
