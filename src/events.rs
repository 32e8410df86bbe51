//! Diagnostics emitted while a device is being selected.
//!
//! The selection never logs on its own. It reports [`SelectionEvent`]s to the
//! [`SelectionObserver`] it was given, which defaults to [`TracingObserver`].

use crate::{
    DeviceType, FamilyCreateRecord, QueueFamilyDescriptor, QueueLocation, RejectionReason, Version,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent<'e> {
    DeviceDiscovered {
        index: usize,
        name: &'e str,
        device_type: DeviceType,
        api_version: Version,
        families: &'e [QueueFamilyDescriptor],
    },
    ExtensionsEnabled {
        index: usize,
        extensions: &'e BTreeSet<String>,
    },
    DeviceRejected {
        index: usize,
        name: &'e str,
        reason: &'e RejectionReason,
    },
    DeviceScored {
        index: usize,
        name: &'e str,
        score: i32,
    },
    DeviceSelected {
        index: usize,
        name: &'e str,
        score: i32,
    },
    QueueAssigned {
        request: usize,
        unit: usize,
        location: QueueLocation,
        priority: f32,
    },
    FamilyRecordBuilt {
        record: &'e FamilyCreateRecord,
    },
}

pub trait SelectionObserver {
    fn on_event(&mut self, event: &SelectionEvent<'_>);
}

impl<F> SelectionObserver for F
where
    F: FnMut(&SelectionEvent<'_>),
{
    fn on_event(&mut self, event: &SelectionEvent<'_>) {
        self(event)
    }
}

/// Forwards events to `tracing`. Does nothing unless the `enable_tracing`
/// feature is on.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SelectionObserver for TracingObserver {
    fn on_event(&mut self, event: &SelectionEvent<'_>) {
        #[cfg(feature = "enable_tracing")]
        trace_event(event);
        #[cfg(not(feature = "enable_tracing"))]
        let _ = event;
    }
}

#[cfg(feature = "enable_tracing")]
fn trace_event(event: &SelectionEvent<'_>) {
    match *event {
        SelectionEvent::DeviceDiscovered {
            index,
            name,
            device_type,
            api_version,
            families,
        } => {
            tracing::info!(index, name, ?device_type, %api_version, "Found physical device");
            for family in families {
                tracing::info!(
                    "    family {}: {{ {} }} max queues: {}",
                    family.index,
                    family.capabilities,
                    family.max_queue_count
                );
            }
        }
        SelectionEvent::ExtensionsEnabled { index, extensions } => {
            tracing::debug!(index, ?extensions, "Enabled device extensions");
        }
        SelectionEvent::DeviceRejected {
            index,
            name,
            reason,
        } => {
            tracing::warn!(index, name, %reason, "Physical device rejected");
        }
        SelectionEvent::DeviceScored { index, name, score } => {
            tracing::debug!(index, name, score, "Scored physical device");
        }
        SelectionEvent::DeviceSelected { index, name, score } => {
            tracing::info!(index, name, score, "Selected physical device");
        }
        SelectionEvent::QueueAssigned {
            request,
            unit,
            location,
            priority,
        } => {
            tracing::debug!(
                request,
                unit,
                family = location.family_index,
                slot = location.slot_index,
                priority,
                "Assigned queue"
            );
        }
        SelectionEvent::FamilyRecordBuilt { record } => {
            tracing::info!(
                "Family[{}] {:?}",
                record.family_index,
                record.priorities
            );
        }
    }
}
