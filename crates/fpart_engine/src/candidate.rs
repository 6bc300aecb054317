//! Per-node candidate device sets.
//!
//! A node's candidate set is either [`Unconstrained`] — no seed or neighbor
//! has touched it yet — or [`Allowed`], an explicit sorted set of device ids
//! it may still occupy. `Allowed` with an empty vector means "narrowed to
//! nothing" and is deliberately distinct from `Unconstrained`; conflating the
//! two lets a dead-end node masquerade as a fresh one.
//!
//! [`Unconstrained`]: CandidateSet::Unconstrained
//! [`Allowed`]: CandidateSet::Allowed

use fpart_model::DeviceId;
use serde::{Deserialize, Serialize};

/// The devices a node may still legally be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateSet {
    /// No constraint has reached this node yet.
    Unconstrained,
    /// The node may only occupy these devices (sorted ascending, distinct).
    Allowed(Vec<DeviceId>),
}

impl CandidateSet {
    /// Builds a seeded set from fixed-pair devices: sorted, deduplicated.
    pub fn seeded(mut devices: Vec<DeviceId>) -> Self {
        devices.sort_unstable();
        devices.dedup();
        CandidateSet::Allowed(devices)
    }

    /// Returns `true` if no constraint has been applied yet.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, CandidateSet::Unconstrained)
    }

    /// Returns the allowed devices, or `None` while unconstrained.
    pub fn as_allowed(&self) -> Option<&[DeviceId]> {
        match self {
            CandidateSet::Unconstrained => None,
            CandidateSet::Allowed(devices) => Some(devices),
        }
    }

    /// Returns whether `device` is still a candidate.
    ///
    /// An unconstrained set contains every device.
    pub fn contains(&self, device: DeviceId) -> bool {
        match self {
            CandidateSet::Unconstrained => true,
            CandidateSet::Allowed(devices) => devices.binary_search(&device).is_ok(),
        }
    }

    /// Narrows this set by a sorted list of allowed devices.
    ///
    /// An unconstrained set becomes a copy of `allowed`; a constrained set
    /// becomes the sorted intersection. Narrowing to an empty set is allowed
    /// and leaves the node eligible only for the fallback pass.
    pub fn narrow_to(&mut self, allowed: &[DeviceId]) {
        match self {
            CandidateSet::Unconstrained => {
                *self = CandidateSet::Allowed(allowed.to_vec());
            }
            CandidateSet::Allowed(devices) => {
                *devices = intersect_sorted(devices, allowed);
            }
        }
    }

    /// Removes a single device (a device that reached capacity).
    ///
    /// No-op while unconstrained: full devices are excluded whenever an
    /// unconstrained set is materialized.
    pub fn remove(&mut self, device: DeviceId) {
        if let CandidateSet::Allowed(devices) = self {
            if let Ok(pos) = devices.binary_search(&device) {
                devices.remove(pos);
            }
        }
    }

    /// Clears the set once the node has reached a terminal state.
    pub fn clear(&mut self) {
        *self = CandidateSet::Allowed(Vec::new());
    }
}

/// Intersects two sorted, deduplicated device sequences with a linear merge.
pub fn intersect_sorted(a: &[DeviceId], b: &[DeviceId]) -> Vec<DeviceId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}
