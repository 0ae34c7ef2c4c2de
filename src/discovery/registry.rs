//! Instance registry interface and an in-process implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::discovery::InstanceRecord;

/// Callback a registry invokes with the full new instance list for a context id.
pub type InstanceWatcher = Arc<dyn Fn(Vec<InstanceRecord>) + Send + Sync>;

/// Interface the directory requires from a service registry.
#[async_trait]
pub trait InstanceRegistry: Send + Sync {
    /// Return the current instances for `context_id` and register `watcher`
    /// for every later topology change of that context id.
    ///
    /// An empty list means the registry knows nothing about the context id.
    /// The watcher must be called from the registry's own thread of control,
    /// never from inside this call.
    async fn select_instances_and_watch(
        &self,
        context_id: &str,
        watcher: InstanceWatcher,
    ) -> Vec<InstanceRecord>;
}

/// Registry kept in process memory.
///
/// Topology is changed with [`MemoryRegistry::publish`], which notifies the
/// watchers of that context id on a blocking-pool thread.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    instances: Arc<DashMap<String, Vec<InstanceRecord>>>,
    watchers: Arc<DashMap<String, Vec<InstanceWatcher>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a registry, grouping records by their context id.
    pub fn from_records(records: impl IntoIterator<Item = InstanceRecord>) -> Self {
        let mut grouped: HashMap<String, Vec<InstanceRecord>> = HashMap::new();
        for record in records {
            grouped.entry(record.context_id.clone()).or_default().push(record);
        }

        let registry = Self::new();
        for (context_id, records) in grouped {
            registry.instances.insert(context_id, records);
        }
        registry
    }

    /// Replace the instances of `context_id` and wait until every watcher saw them.
    pub async fn publish(&self, context_id: &str, instances: Vec<InstanceRecord>) {
        self.instances.insert(context_id.to_string(), instances.clone());

        let watchers: Vec<InstanceWatcher> = self
            .watchers
            .get(context_id)
            .map(|w| w.value().clone())
            .unwrap_or_default();
        if watchers.is_empty() {
            return;
        }

        let notify = tokio::task::spawn_blocking(move || {
            for watcher in watchers {
                watcher(instances.clone());
            }
        });
        if let Err(e) = notify.await {
            tracing::error!(context_id = %context_id, error = %e, "Registry watcher panicked");
        }
    }

    /// Number of watchers registered for `context_id`.
    pub fn watcher_count(&self, context_id: &str) -> usize {
        self.watchers.get(context_id).map(|w| w.len()).unwrap_or(0)
    }
}

#[async_trait]
impl InstanceRegistry for MemoryRegistry {
    async fn select_instances_and_watch(
        &self,
        context_id: &str,
        watcher: InstanceWatcher,
    ) -> Vec<InstanceRecord> {
        self.watchers
            .entry(context_id.to_string())
            .or_default()
            .push(watcher);

        self.instances
            .get(context_id)
            .map(|i| i.value().clone())
            .unwrap_or_default()
    }
}
