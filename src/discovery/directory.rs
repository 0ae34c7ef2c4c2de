//! Context id → upstream resolution.
//!
//! # Responsibilities
//! - Static mode: parse the configured server list
//! - Dynamic mode: cache-first lookup, registry call and watch on a miss
//! - Normalize every address to carry an explicit scheme
//!
//! # Design Decisions
//! - The cache is only reachable through `resolve` and the watcher callback
//! - No TTL: freshness comes entirely from registry pushes
//! - An empty first lookup is an error and leaves the cache untouched

use std::fmt;
use std::sync::Arc;

use crate::config::schema::{RegisterConfig, REGISTER_TYPE_LOCAL};
use crate::discovery::cache::{Topology, TopologyCache};
use crate::discovery::registry::{InstanceRegistry, InstanceWatcher};
use crate::discovery::InstanceRecord;
use crate::error::DispatchError;
use crate::load_balancer::{append_scheme, Upstream};

/// Resolves context ids to upstream sets.
pub struct InstanceDirectory {
    register_type: String,
    server_lists: String,
    registry: Option<Arc<dyn InstanceRegistry>>,
    cache: Arc<TopologyCache>,
}

impl InstanceDirectory {
    /// Create a directory from the register configuration.
    ///
    /// `registry` is required for any `registerType` other than `"local"`;
    /// its absence is reported on resolution.
    pub fn new(config: &RegisterConfig, registry: Option<Arc<dyn InstanceRegistry>>) -> Self {
        Self {
            register_type: config.register_type.trim().to_string(),
            server_lists: config.server_lists.clone(),
            registry,
            cache: Arc::new(TopologyCache::new()),
        }
    }

    /// Resolve the upstreams currently serving `context_id`.
    pub async fn resolve(&self, context_id: &str, request_url: &str) -> Result<Vec<Upstream>, DispatchError> {
        if self.register_type.is_empty() {
            return Err(DispatchError::Configuration(
                "configure registerType is required.".into(),
            ));
        }

        let upstreams = if self.register_type == REGISTER_TYPE_LOCAL {
            self.resolve_static()?
        } else {
            self.resolve_dynamic(context_id).await?
        };

        tracing::trace!(
            context_id = %context_id,
            url = %request_url,
            upstreams = upstreams.len(),
            "Resolved upstreams"
        );
        Ok(upstreams)
    }

    /// True once a topology for `context_id` has been stored.
    pub fn is_cached(&self, context_id: &str) -> bool {
        self.cache.contains(context_id)
    }

    fn resolve_static(&self) -> Result<Vec<Upstream>, DispatchError> {
        let upstreams: Vec<Upstream> = self
            .server_lists
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| Upstream::new(append_scheme(address, "http")))
            .collect();

        if upstreams.is_empty() {
            return Err(DispatchError::Configuration(
                "illegal param, serverLists configuration required if registerType equals local.".into(),
            ));
        }
        Ok(upstreams)
    }

    async fn resolve_dynamic(&self, context_id: &str) -> Result<Vec<Upstream>, DispatchError> {
        let topology = match self.cache.get(context_id) {
            Some(topology) => topology,
            None => self.watch(context_id).await?,
        };
        Ok(topology.iter().map(|record| record.to_upstream()).collect())
    }

    /// First lookup for a context id: ask the registry and subscribe to pushes.
    async fn watch(&self, context_id: &str) -> Result<Topology, DispatchError> {
        let registry = self.registry.as_ref().ok_or_else(|| {
            DispatchError::Configuration(format!(
                "registerType `{}` requires an instance registry",
                self.register_type
            ))
        })?;

        let cache = Arc::clone(&self.cache);
        let key = context_id.to_string();
        let watcher: InstanceWatcher = Arc::new(move |instances: Vec<InstanceRecord>| cache.apply_update(&key, instances));

        tracing::debug!(context_id = %context_id, "Topology cache miss, querying registry");
        let initial = registry.select_instances_and_watch(context_id, watcher).await;

        if initial.is_empty() {
            // A push may have landed while the registry call was in flight.
            return self.cache.get(context_id).ok_or_else(|| {
                tracing::warn!(context_id = %context_id, "Registry returned no instances");
                DispatchError::TopologyNotFound {
                    context_id: context_id.to_string(),
                }
            });
        }
        Ok(self.cache.insert_if_vacant(context_id, initial))
    }
}

impl fmt::Debug for InstanceDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceDirectory")
            .field("register_type", &self.register_type)
            .field("server_lists", &self.server_lists)
            .field("has_registry", &self.registry.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{InstanceRecord, MemoryRegistry};

    fn local(server_lists: &str) -> RegisterConfig {
        RegisterConfig {
            register_type: "local".into(),
            server_lists: server_lists.into(),
            ..Default::default()
        }
    }

    fn dynamic() -> RegisterConfig {
        RegisterConfig {
            register_type: "memory".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_register_type() {
        let directory = InstanceDirectory::new(&RegisterConfig::default(), None);
        let err = directory.resolve("svcA", "http://placeholder/").await.unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_static_list_is_normalized() {
        let directory = InstanceDirectory::new(&local("10.0.0.1:8080, https://10.0.0.2:8443,,"), None);
        let upstreams = directory.resolve("ignored", "http://placeholder/").await.unwrap();
        let urls: Vec<&str> = upstreams.iter().map(Upstream::url).collect();
        assert_eq!(urls, vec!["http://10.0.0.1:8080", "https://10.0.0.2:8443"]);
    }

    #[tokio::test]
    async fn test_empty_static_list() {
        for list in ["", " ", ",", " , ,"] {
            let directory = InstanceDirectory::new(&local(list), None);
            let err = directory.resolve("svcA", "http://placeholder/").await.unwrap_err();
            assert!(matches!(err, DispatchError::Configuration(_)), "list {list:?}");
        }
    }

    #[tokio::test]
    async fn test_dynamic_without_registry() {
        let directory = InstanceDirectory::new(&dynamic(), None);
        let err = directory.resolve("svcA", "http://placeholder/").await.unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_dynamic_is_cache_first() {
        let registry = MemoryRegistry::from_records(vec![InstanceRecord::new("10.0.0.1", 80, "svcA")]);
        let directory = InstanceDirectory::new(&dynamic(), Some(Arc::new(registry.clone())));

        let first = directory.resolve("svcA", "http://placeholder/").await.unwrap();
        assert_eq!(first[0].url(), "http://10.0.0.1:80");
        assert!(directory.is_cached("svcA"));

        directory.resolve("svcA", "http://placeholder/").await.unwrap();
        directory.resolve("svcA", "http://placeholder/").await.unwrap();
        assert_eq!(registry.watcher_count("svcA"), 1);
    }

    #[tokio::test]
    async fn test_push_replaces_topology() {
        let registry = MemoryRegistry::from_records(vec![
            InstanceRecord::new("10.0.0.1", 80, "svcA"),
            InstanceRecord::new("10.0.0.2", 80, "svcA"),
        ]);
        let directory = InstanceDirectory::new(&dynamic(), Some(Arc::new(registry.clone())));
        assert_eq!(directory.resolve("svcA", "/").await.unwrap().len(), 2);

        registry
            .publish("svcA", vec![InstanceRecord::new("10.0.0.3", 81, "svcA")])
            .await;

        let upstreams = directory.resolve("svcA", "/").await.unwrap();
        assert_eq!(upstreams.len(), 1);
        assert_eq!(upstreams[0].url(), "http://10.0.0.3:81");
    }

    #[tokio::test]
    async fn test_unknown_context_not_cached() {
        let registry = MemoryRegistry::new();
        let directory = InstanceDirectory::new(&dynamic(), Some(Arc::new(registry.clone())));

        let err = directory.resolve("svcX", "/").await.unwrap_err();
        assert!(matches!(err, DispatchError::TopologyNotFound { ref context_id } if context_id == "svcX"));
        assert!(!directory.is_cached("svcX"));

        // the watcher stays registered, so a later push makes the context resolvable
        registry
            .publish("svcX", vec![InstanceRecord::new("10.0.0.4", 80, "svcX")])
            .await;
        assert!(directory.is_cached("svcX"));
        assert_eq!(directory.resolve("svcX", "/").await.unwrap().len(), 1);
    }
}
