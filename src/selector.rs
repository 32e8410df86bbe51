use crate::{
    DeviceDescriptor, DeviceRequirements, DeviceSource, DeviceType, FamilyCreateRecord,
    PhysicalDeviceError, QueueLocation, QueueRequest, RejectionReason, SelectionEvent,
    SelectionObserver, TracingObserver, Version, aggregate_family_records, allocate_queues,
    check_extensions, collect_descriptors,
};
use ash::vk;
use std::collections::{BTreeMap, BTreeSet};

/// Score of a device that cannot serve the requirements.
pub const DISQUALIFIED_SCORE: i32 = -1;
/// Bonus for a device of the preferred type.
pub const PREFERRED_TYPE_SCORE: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceScore {
    pub device_index: usize,
    pub value: i32,
}

#[derive(Debug)]
struct SelectionCriteria {
    preferred_device_type: DeviceType,
    required_api_version: Version,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            preferred_device_type: DeviceType::Discrete,
            required_api_version: Version::V1_0_0,
        }
    }
}

/// Picks the device that can serve every queue request and extension, and
/// lays the requested queues out on it.
///
/// Devices are tried in enumeration order. A device earns
/// [`PREFERRED_TYPE_SCORE`] when it is of the preferred type (discrete by
/// default) and the highest score wins, the earliest device on a tie.
pub struct DeviceSelector<'a, S = vk::SurfaceKHR> {
    requirements: DeviceRequirements<S>,
    selection_criteria: SelectionCriteria,
    observer: Box<dyn SelectionObserver + 'a>,
}

impl<S> Default for DeviceSelector<'_, S> {
    fn default() -> Self {
        Self {
            requirements: DeviceRequirements::default(),
            selection_criteria: SelectionCriteria::default(),
            observer: Box::new(TracingObserver),
        }
    }
}

impl<'a, S: Clone> DeviceSelector<'a, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requirements(mut self, requirements: DeviceRequirements<S>) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn queue_request(mut self, request: QueueRequest<S>) -> Self {
        self.requirements.queues.push(request);
        self
    }

    pub fn queue_requests(mut self, requests: impl IntoIterator<Item = QueueRequest<S>>) -> Self {
        self.requirements.queues.extend(requests);
        self
    }

    pub fn required_extension(mut self, name: impl Into<String>) -> Self {
        self.requirements.extensions.push(name.into());
        self
    }

    pub fn preferred_device_type(mut self, device_type: DeviceType) -> Self {
        self.selection_criteria.preferred_device_type = device_type;
        self
    }

    pub fn required_api_version(mut self, version: Version) -> Self {
        self.selection_criteria.required_api_version = version;
        self
    }

    pub fn observer(mut self, observer: impl SelectionObserver + 'a) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Shorthand for [`observer`](Self::observer) with a closure.
    pub fn on_event<F>(self, f: F) -> Self
    where
        F: FnMut(&SelectionEvent<'_>) + 'a,
    {
        self.observer(f)
    }

    /// Snapshots the devices of `source` and selects among them.
    pub fn select<D>(self, source: &D) -> crate::Result<Selection<D::Device, S>>
    where
        D: DeviceSource<Surface = S>,
    {
        self.requirements.validate()?;
        let descriptors = collect_descriptors(source, &self.requirements.queues)?;
        self.run(descriptors)
    }

    /// Selects among devices that were already collected.
    ///
    /// `presentation_support` and `surface_support` of the descriptors must be
    /// keyed by the position of the requests given to this selector. A device
    /// listing the same family index twice is refused with
    /// [`PhysicalDeviceError::DuplicateQueueFamily`].
    pub fn select_from_descriptors<H>(
        self,
        descriptors: Vec<DeviceDescriptor<H>>,
    ) -> crate::Result<Selection<H, S>> {
        self.requirements.validate()?;
        if descriptors.is_empty() {
            return Err(PhysicalDeviceError::NoPhysicalDevicesFound.into());
        }
        check_family_indices(&descriptors)?;
        self.run(descriptors)
    }

    #[cfg_attr(feature = "enable_tracing", tracing::instrument(skip_all))]
    fn run<H>(self, mut descriptors: Vec<DeviceDescriptor<H>>) -> crate::Result<Selection<H, S>> {
        let DeviceSelector {
            mut requirements,
            selection_criteria,
            mut observer,
        } = self;

        // No device can place more queues than its families offer in total.
        let capacity = descriptors
            .iter()
            .map(|device| {
                device
                    .families
                    .iter()
                    .map(|family| u64::from(family.max_queue_count))
                    .sum::<u64>()
            })
            .max()
            .unwrap_or(0);
        requirements.fill_queue_priorities_within(u32::try_from(capacity).unwrap_or(u32::MAX));

        for (index, device) in descriptors.iter().enumerate() {
            observer.on_event(&SelectionEvent::DeviceDiscovered {
                index,
                name: device.name(),
                device_type: device.properties.device_type,
                api_version: device.properties.api_version,
                families: &device.families,
            });
        }

        struct Best<R> {
            index: usize,
            score: i32,
            requests: Vec<R>,
        }

        let mut best: Option<Best<QueueRequest<S>>> = None;
        let mut scores = Vec::with_capacity(descriptors.len());

        for (index, device) in descriptors.iter_mut().enumerate() {
            let value = match score_device(device, &requirements, &selection_criteria) {
                Ok((score, requests)) => {
                    if !requirements.extensions.is_empty() {
                        observer.on_event(&SelectionEvent::ExtensionsEnabled {
                            index,
                            extensions: &device.enabled_extensions,
                        });
                    }

                    if best.as_ref().is_none_or(|best| score > best.score) {
                        best = Some(Best {
                            index,
                            score,
                            requests,
                        });
                    }
                    score
                }
                Err(reason) => {
                    observer.on_event(&SelectionEvent::DeviceRejected {
                        index,
                        name: device.name(),
                        reason: &reason,
                    });
                    DISQUALIFIED_SCORE
                }
            };

            observer.on_event(&SelectionEvent::DeviceScored {
                index,
                name: device.name(),
                score: value,
            });
            scores.push(DeviceScore {
                device_index: index,
                value,
            });
        }

        let Some(best) = best else {
            #[cfg(feature = "enable_tracing")]
            tracing::error!("Queue requests couldn't be fulfilled by any device");
            return Err(PhysicalDeviceError::NoSuitableDevice.into());
        };

        let device = descriptors
            .into_iter()
            .nth(best.index)
            .ok_or(PhysicalDeviceError::NoSuitableDevice)?;

        for (request_index, request) in best.requests.iter().enumerate() {
            for (unit, location) in request.queue_locations().iter().enumerate() {
                observer.on_event(&SelectionEvent::QueueAssigned {
                    request: request_index,
                    unit,
                    location: *location,
                    priority: request.priorities[unit],
                });
            }
        }

        let family_records = aggregate_family_records(&device, &best.requests);
        for record in family_records.values() {
            observer.on_event(&SelectionEvent::FamilyRecordBuilt { record });
        }

        observer.on_event(&SelectionEvent::DeviceSelected {
            index: best.index,
            name: device.name(),
            score: best.score,
        });

        Ok(Selection {
            device_index: best.index,
            score: best.score,
            device,
            requests: best.requests,
            family_records,
            scores,
        })
    }
}

fn check_family_indices<H>(descriptors: &[DeviceDescriptor<H>]) -> Result<(), PhysicalDeviceError> {
    for (device, descriptor) in descriptors.iter().enumerate() {
        let mut seen = BTreeSet::new();
        for family in &descriptor.families {
            if !seen.insert(family.index) {
                return Err(PhysicalDeviceError::DuplicateQueueFamily {
                    device,
                    family_index: family.index,
                });
            }
        }
    }
    Ok(())
}

/// Runs the checks on one device, cheapest first.
fn score_device<H, S: Clone>(
    device: &mut DeviceDescriptor<H>,
    requirements: &DeviceRequirements<S>,
    criteria: &SelectionCriteria,
) -> Result<(i32, Vec<QueueRequest<S>>), RejectionReason> {
    if device.properties.api_version < criteria.required_api_version {
        return Err(RejectionReason::ApiVersionTooLow {
            available: device.properties.api_version,
            required: criteria.required_api_version,
        });
    }

    let extensions = check_extensions(device, &requirements.extensions);
    if !extensions.is_supported() {
        return Err(RejectionReason::MissingExtensions(extensions.missing));
    }

    let requests = allocate_queues(device, &requirements.queues)?;

    let score = if device.properties.device_type == criteria.preferred_device_type {
        PREFERRED_TYPE_SCORE
    } else {
        0
    };

    Ok((score, requests))
}

/// The chosen device and where every requested queue lives on it.
#[derive(Debug, Clone)]
pub struct Selection<H = vk::PhysicalDevice, S = vk::SurfaceKHR> {
    /// Position of the device in enumeration order.
    pub device_index: usize,
    pub score: i32,
    pub device: DeviceDescriptor<H>,
    /// Copies of the requests with their queue locations filled in.
    pub requests: Vec<QueueRequest<S>>,
    pub family_records: BTreeMap<u32, FamilyCreateRecord>,
    /// Score of every candidate, disqualified ones included.
    pub scores: Vec<DeviceScore>,
}

impl<H, S> Selection<H, S> {
    pub fn handle(&self) -> &H {
        &self.device.handle
    }

    pub fn enabled_extensions(&self) -> &BTreeSet<String> {
        &self.device.enabled_extensions
    }

    /// Location of the `unit`-th queue of request `request`.
    pub fn queue_location(&self, request: usize, unit: usize) -> Option<QueueLocation> {
        self.requests
            .get(request)?
            .queue_locations()
            .get(unit)
            .copied()
    }
}
