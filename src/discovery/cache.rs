//! Topology cache.
//!
//! Context id → last observed instance list. Each entry is an `Arc` snapshot:
//! writers swap the whole list in one insert, readers clone the `Arc` and
//! never hold a shard lock past the lookup.

use std::sync::Arc;

use dashmap::DashMap;

use crate::discovery::InstanceRecord;
use crate::observability::metrics;

pub(crate) type Topology = Arc<Vec<InstanceRecord>>;

#[derive(Debug, Default)]
pub(crate) struct TopologyCache {
    entries: DashMap<String, Topology>,
}

impl TopologyCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, context_id: &str) -> Option<Topology> {
        self.entries.get(context_id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn contains(&self, context_id: &str) -> bool {
        self.entries.contains_key(context_id)
    }

    /// Replace the entry for `context_id` with a pushed list.
    pub(crate) fn apply_update(&self, context_id: &str, instances: Vec<InstanceRecord>) {
        tracing::info!(
            context_id = %context_id,
            instances = instances.len(),
            "Topology update received"
        );
        metrics::record_topology_update(context_id, instances.len());
        self.entries.insert(context_id.to_string(), Arc::new(instances));
    }

    /// Store an initial lookup result unless a push already filled the key.
    pub(crate) fn insert_if_vacant(&self, context_id: &str, instances: Vec<InstanceRecord>) -> Topology {
        let entry = self
            .entries
            .entry(context_id.to_string())
            .or_insert_with(|| Arc::new(instances));
        Arc::clone(entry.value())
    }
}
