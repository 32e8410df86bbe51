use crate::{DeviceDescriptor, QueueRequest};
use std::collections::BTreeMap;

/// Queue count and per-slot priorities for one family, ready for logical
/// device creation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FamilyCreateRecord {
    pub family_index: u32,
    pub queue_count: u32,
    /// `priorities[slot]` is the priority of the queue in that slot.
    pub priorities: Vec<f32>,
}

/// Folds the locations of allocated `requests` into one record per family.
///
/// # Panics
///
/// If a located unit has no priority, so requests must have gone through
/// [`normalize_priorities`](crate::normalize_priorities) first. Also if a
/// record ends up with a gap in its slots or more queues than the family
/// offers, which means the allocator handed out bad locations.
pub fn aggregate_family_records<H, S>(
    device: &DeviceDescriptor<H>,
    requests: &[QueueRequest<S>],
) -> BTreeMap<u32, FamilyCreateRecord> {
    let mut records: BTreeMap<u32, FamilyCreateRecord> = BTreeMap::new();

    for (request_index, request) in requests.iter().enumerate() {
        for (unit, location) in request.queue_locations().iter().enumerate() {
            assert!(
                unit < request.priorities.len(),
                "request {request_index} has no priority for queue {unit}, normalize priorities first"
            );

            let record = records
                .entry(location.family_index)
                .or_insert_with(|| FamilyCreateRecord {
                    family_index: location.family_index,
                    ..Default::default()
                });

            let slot = location.slot_index as usize;
            if record.priorities.len() < slot + 1 {
                record.priorities.resize(slot + 1, 0.0);
            }

            record.priorities[slot] = request.priorities[unit];
            record.queue_count += 1;
        }
    }

    for record in records.values() {
        let max_queue_count = device
            .family(record.family_index)
            .map_or(0, |family| family.max_queue_count);

        assert_eq!(
            record.queue_count as usize,
            record.priorities.len(),
            "family {} has {} queues but {} priority slots",
            record.family_index,
            record.queue_count,
            record.priorities.len()
        );
        assert!(
            record.queue_count <= max_queue_count,
            "family {} was given {} queues but offers {}",
            record.family_index,
            record.queue_count,
            max_queue_count
        );
    }

    records
}
