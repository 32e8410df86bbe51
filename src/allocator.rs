//! Greedy assignment of queue requests to queue family slots on one device.
//!
//! Requests are served in the order they were given and never revisited, so an
//! earlier broad request can take capacity a later narrow one needed and get
//! the device rejected. Each request looks at its candidate families narrowest
//! first, which keeps universal families free for requests that need them.

use crate::{DeviceDescriptor, QueueFamilyDescriptor, QueueLocation, QueueRequest, RejectionReason};

/// Assigns every queue of every request to a `(family, slot)` on `device`.
///
/// Works on a copy of `requests`; the returned requests carry their
/// [`queue_locations`](QueueRequest::queue_locations). Expects priorities to be
/// normalized already.
pub fn allocate_queues<H, S: Clone>(
    device: &DeviceDescriptor<H>,
    requests: &[QueueRequest<S>],
) -> Result<Vec<QueueRequest<S>>, RejectionReason> {
    let mut requests = requests.to_vec();
    for request in &mut requests {
        request.queue_locations.clear();
    }

    // Families are addressed by position, not by their reported index.
    let mut capacity_left: Vec<u32> = device
        .families
        .iter()
        .map(|family| family.max_queue_count)
        .collect();

    for (request_index, request) in requests.iter_mut().enumerate() {
        if request.surface.is_some() {
            let usable = device
                .surface_support
                .get(&request_index)
                .is_some_and(|support| support.is_usable());

            if !usable {
                return Err(RejectionReason::UnusableSurface {
                    request: request_index,
                });
            }
        }

        let mut remaining = request.count;

        for position in suitable_families(device, request, request_index) {
            if remaining == 0 {
                break;
            }

            let family = &device.families[position];
            let left = capacity_left[position];
            if left == 0 {
                continue;
            }

            let count = left.min(remaining);
            let first_slot = family.max_queue_count - left;
            request.queue_locations.extend(
                (first_slot..first_slot + count).map(|slot| QueueLocation::new(family.index, slot)),
            );

            capacity_left[position] -= count;
            remaining -= count;
        }

        if remaining > 0 {
            return Err(RejectionReason::UnsatisfiableRequest {
                request: request_index,
                missing: remaining,
            });
        }
    }

    Ok(requests)
}

/// Positions of the families that can serve `request`, fewest extra capabilities first.
fn suitable_families<H, S>(
    device: &DeviceDescriptor<H>,
    request: &QueueRequest<S>,
    request_index: usize,
) -> Vec<usize> {
    let mut positions: Vec<usize> = device
        .families
        .iter()
        .enumerate()
        .filter(|(_, family)| can_serve(family, request, request_index))
        .map(|(position, _)| position)
        .collect();

    // Stable, so equally narrow families stay in index order.
    positions.sort_by_key(|&position| device.families[position].capabilities.flag_count());
    positions
}

fn can_serve<S>(family: &QueueFamilyDescriptor, request: &QueueRequest<S>, request_index: usize) -> bool {
    request.capabilities.is_subset_of(family.capabilities)
        && (request.surface.is_none() || family.presentation_support.contains(&request_index))
}
