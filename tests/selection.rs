use ash_queue_select::{
    CapabilityMask, DeviceProperties, DeviceRequirements, DeviceSelector, DeviceSource,
    DeviceType, Error, PhysicalDeviceError, QueueFamilyProperties, QueueLocation, QueueRequest,
    RejectionReason, SelectionEvent, SurfaceSupport, Version,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing_subscriber::EnvFilter;

const G: CapabilityMask = CapabilityMask::GRAPHICS;
const C: CapabilityMask = CapabilityMask::COMPUTE;
const T: CapabilityMask = CapabilityMask::TRANSFER;

const WINDOW: u32 = 1;
const BROKEN_WINDOW: u32 = 2;

struct FakeDevice {
    name: &'static str,
    device_type: DeviceType,
    extensions: &'static [&'static str],
    families: Vec<QueueFamilyProperties>,
    /// Families able to present to `WINDOW`.
    presenting: Vec<u32>,
    surface_formats: usize,
}

#[derive(Default)]
struct FakeSource {
    devices: Vec<FakeDevice>,
}

impl DeviceSource for FakeSource {
    type Device = usize;
    type Surface = u32;

    fn enumerate_devices(&self) -> ash_queue_select::Result<Vec<usize>> {
        Ok((0..self.devices.len()).collect())
    }

    fn device_properties(&self, device: usize) -> ash_queue_select::Result<DeviceProperties> {
        let device = &self.devices[device];
        Ok(DeviceProperties {
            name: device.name.to_string(),
            device_type: device.device_type,
            api_version: Version::V1_3_0,
        })
    }

    fn device_extensions(&self, device: usize) -> ash_queue_select::Result<BTreeSet<String>> {
        Ok(self.devices[device]
            .extensions
            .iter()
            .map(|ext| ext.to_string())
            .collect())
    }

    fn queue_families(
        &self,
        device: usize,
    ) -> ash_queue_select::Result<Vec<QueueFamilyProperties>> {
        Ok(self.devices[device].families.clone())
    }

    fn supports_presentation(
        &self,
        device: usize,
        family_index: u32,
        surface: u32,
    ) -> ash_queue_select::Result<bool> {
        Ok(surface != 0 && self.devices[device].presenting.contains(&family_index))
    }

    fn surface_support(
        &self,
        device: usize,
        surface: u32,
    ) -> ash_queue_select::Result<SurfaceSupport> {
        Ok(SurfaceSupport {
            format_count: self.devices[device].surface_formats,
            present_mode_count: if surface == BROKEN_WINDOW { 0 } else { 3 },
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn family(capabilities: CapabilityMask, max_queue_count: u32) -> QueueFamilyProperties {
    QueueFamilyProperties {
        capabilities,
        max_queue_count,
    }
}

/// A desktop GPU with a universal family, an async compute family and a
/// transfer-only family.
fn desktop(name: &'static str, device_type: DeviceType) -> FakeDevice {
    FakeDevice {
        name,
        device_type,
        extensions: &["VK_KHR_swapchain", "VK_KHR_synchronization2"],
        families: vec![
            family(G | C | T | CapabilityMask::SPARSE_BINDING, 16),
            family(C | T | CapabilityMask::SPARSE_BINDING, 8),
            family(T | CapabilityMask::SPARSE_BINDING, 2),
        ],
        presenting: vec![0],
        surface_formats: 2,
    }
}

fn engine_requests() -> Vec<QueueRequest<u32>> {
    vec![
        QueueRequest::new(G, 1).with_surface(WINDOW),
        QueueRequest::new(C, 3).with_priorities([1.0, 0.5]),
        QueueRequest::new(T, 4).with_priorities([0.25]),
        QueueRequest::new(G | C, 2),
    ]
}

#[test]
fn full_selection_respects_every_law() {
    init_tracing();
    let source = FakeSource {
        devices: vec![
            desktop("integrated", DeviceType::Integrated),
            desktop("discrete", DeviceType::Discrete),
        ],
    };
    let requests = engine_requests();

    let selection = DeviceSelector::new()
        .requirements(DeviceRequirements {
            queues: requests.clone(),
            extensions: vec!["VK_KHR_swapchain".to_string()],
        })
        .select(&source)
        .unwrap();

    assert_eq!(selection.device.name(), "discrete");
    assert_eq!(*selection.handle(), 1);
    assert_eq!(
        selection.enabled_extensions(),
        &BTreeSet::from(["VK_KHR_swapchain".to_string()])
    );

    let mut used = BTreeSet::new();
    let mut per_family: BTreeMap<u32, u32> = BTreeMap::new();

    for (index, request) in selection.requests.iter().enumerate() {
        assert_eq!(request.queue_locations().len(), request.count as usize);

        for location in request.queue_locations() {
            assert!(used.insert(*location), "slot {location:?} handed out twice");
            *per_family.entry(location.family_index).or_default() += 1;

            let family = selection.device.family(location.family_index).unwrap();
            assert!(location.slot_index < family.max_queue_count);
            assert!(request.capabilities.is_subset_of(family.capabilities));
            if request.surface.is_some() {
                assert!(family.presentation_support.contains(&index));
            }
        }
    }

    for (family_index, record) in &selection.family_records {
        let family = selection.device.family(*family_index).unwrap();
        assert_eq!(record.queue_count, per_family[family_index]);
        assert_eq!(record.priorities.len(), record.queue_count as usize);
        assert!(record.queue_count <= family.max_queue_count);
    }

    // Transfer fills the transfer-only family first, then spills into compute.
    assert_eq!(
        selection.requests[2].queue_locations(),
        &[
            QueueLocation::new(2, 0),
            QueueLocation::new(2, 1),
            QueueLocation::new(1, 3),
            QueueLocation::new(1, 4),
        ]
    );
    assert_eq!(selection.family_records[&2].priorities, vec![0.25, 1.0]);
    assert_eq!(
        selection.family_records[&1].priorities,
        vec![1.0, 0.5, 1.0, 1.0, 1.0]
    );

    // The caller's copy is left alone.
    assert!(requests.iter().all(|request| request.queue_locations().is_empty()));
    assert_eq!(requests[1].priorities, vec![1.0, 0.5]);
}

#[test]
fn repeated_runs_are_identical() {
    let source = FakeSource {
        devices: vec![
            desktop("a", DeviceType::Discrete),
            desktop("b", DeviceType::Discrete),
        ],
    };

    let run = || {
        DeviceSelector::new()
            .queue_requests(engine_requests())
            .select(&source)
            .unwrap()
    };

    let first = run();
    let second = run();

    assert_eq!(first.device_index, second.device_index);
    assert_eq!(first.requests, second.requests);
    assert_eq!(first.family_records, second.family_records);
    assert_eq!(first.scores, second.scores);
}

#[test]
fn minimal_device_serves_a_single_graphics_queue() {
    let source = FakeSource {
        devices: vec![FakeDevice {
            name: "tiny",
            device_type: DeviceType::Integrated,
            extensions: &[],
            families: vec![family(G | T, 1)],
            presenting: vec![],
            surface_formats: 2,
        }],
    };

    let selection = DeviceSelector::new()
        .queue_request(QueueRequest::new(G, 1))
        .select(&source)
        .unwrap();

    assert_eq!(selection.queue_location(0, 0), Some(QueueLocation::new(0, 0)));
}

#[test]
fn short_device_is_reported_as_unsuitable() {
    let source = FakeSource {
        devices: vec![FakeDevice {
            name: "tiny",
            device_type: DeviceType::Discrete,
            extensions: &[],
            families: vec![family(G, 1), family(T, 8)],
            presenting: vec![],
            surface_formats: 2,
        }],
    };

    let mut rejections = Vec::new();
    let result = DeviceSelector::new()
        .queue_request(QueueRequest::new(G, 2))
        .on_event(|event| {
            if let SelectionEvent::DeviceRejected { name, reason, .. } = event {
                rejections.push((name.to_string(), (*reason).clone()));
            }
        })
        .select(&source);

    assert!(matches!(
        result,
        Err(Error::PhysicalDevice(PhysicalDeviceError::NoSuitableDevice))
    ));
    assert_eq!(
        rejections,
        vec![(
            "tiny".to_string(),
            RejectionReason::UnsatisfiableRequest {
                request: 0,
                missing: 1
            }
        )]
    );
}

#[test]
fn surface_without_present_modes_rejects_the_device() {
    let source = FakeSource {
        devices: vec![desktop("discrete", DeviceType::Discrete)],
    };

    let mut rejections = Vec::new();
    let result = DeviceSelector::new()
        .queue_request(QueueRequest::new(T, 1))
        .queue_request(QueueRequest::new(G, 1).with_surface(BROKEN_WINDOW))
        .on_event(|event| {
            if let SelectionEvent::DeviceRejected { reason, .. } = event {
                rejections.push((*reason).clone());
            }
        })
        .select(&source);

    assert!(result.is_err());
    assert_eq!(
        rejections,
        vec![RejectionReason::UnusableSurface { request: 1 }]
    );
}

#[test]
fn missing_extension_falls_back_to_the_next_device() {
    let mut bare = desktop("bare", DeviceType::Discrete);
    bare.extensions = &[];
    let source = FakeSource {
        devices: vec![bare, desktop("integrated", DeviceType::Integrated)],
    };

    let selection = DeviceSelector::new()
        .queue_request(QueueRequest::new(G, 1).with_surface(WINDOW))
        .required_extension("VK_KHR_swapchain")
        .select(&source)
        .unwrap();

    assert_eq!(selection.device.name(), "integrated");
    assert_eq!(selection.scores[0].value, ash_queue_select::DISQUALIFIED_SCORE);
}

#[test]
fn device_without_surface_formats_gives_way_to_the_next() {
    init_tracing();
    let mut formatless = desktop("discrete", DeviceType::Discrete);
    formatless.surface_formats = 0;
    let source = FakeSource {
        devices: vec![formatless, desktop("integrated", DeviceType::Integrated)],
    };

    let mut rejections = Vec::new();
    let selection = DeviceSelector::new()
        .queue_request(QueueRequest::new(G, 1).with_surface(WINDOW))
        .on_event(|event| {
            if let SelectionEvent::DeviceRejected { index, reason, .. } = event {
                rejections.push((*index, (*reason).clone()));
            }
        })
        .select(&source)
        .unwrap();

    assert_eq!(selection.device.name(), "integrated");
    assert_eq!(selection.scores[0].value, ash_queue_select::DISQUALIFIED_SCORE);
    assert_eq!(selection.scores[1].value, 0);
    assert_eq!(
        rejections,
        vec![(0, RejectionReason::UnusableSurface { request: 0 })]
    );
}
