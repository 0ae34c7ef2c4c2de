//! Round-robin load balancing strategy.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::load_balancer::{upstream::Upstream, LoadBalancer};

/// Round-robin selector.
///
/// Keeps one rotating counter per cluster, keyed by the context id passed as
/// `hint`, so the map never outgrows the topology cache. A new instance list
/// for the same cluster keeps rotating from where the old one stopped.
/// Calls without a hint fall back to a key derived from the set's URLs.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursors: DashMap<String, AtomicUsize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&self, upstreams: &[Upstream], hint: &str) -> usize {
        if !hint.is_empty() {
            if let Some(cursor) = self.cursors.get(hint) {
                return cursor.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.cursors
            .entry(cursor_key(upstreams, hint))
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
    }
}

fn cursor_key(upstreams: &[Upstream], hint: &str) -> String {
    if !hint.is_empty() {
        return hint.to_string();
    }
    let mut hasher = DefaultHasher::new();
    for upstream in upstreams {
        upstream.url().hash(&mut hasher);
    }
    format!("#{:016x}", hasher.finish())
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, upstreams: &[Upstream], hint: &str) -> Option<Upstream> {
        if upstreams.is_empty() {
            return None;
        }

        let start_count = self.advance(upstreams, hint);
        let len = upstreams.len();

        // Skip unhealthy entries; give up after one full lap.
        for i in 0..len {
            let index = start_count.wrapping_add(i) % len;
            let upstream = &upstreams[index];
            if upstream.is_healthy() {
                return Some(upstream.clone());
            }
        }
        None
    }
}
