//! Upstream abstraction.
//!
//! # Responsibilities
//! - Represent a single resolved endpoint (`scheme://host:port`)
//! - Carry the optional weight and health state a strategy may use
//!
//! Upstreams are plain values. Neither the directory nor a strategy mutates
//! one; a topology change replaces the whole set.

/// Health State enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HealthState {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

/// A single upstream endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Upstream {
    url: String,
    weight: u32,
    status: HealthState,
}

impl Upstream {
    /// Create an upstream with weight 1 and unknown health.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            weight: 1,
            status: HealthState::Unknown,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_status(mut self, status: HealthState) -> Self {
        self.status = status;
        self
    }

    /// Base URL, always with an explicit scheme.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn status(&self) -> HealthState {
        self.status
    }

    /// Return true if upstream is considered healthy (Healthy or Unknown).
    pub fn is_healthy(&self) -> bool {
        self.status != HealthState::Unhealthy
    }
}

/// Prefix `scheme://` unless the address already names a scheme.
pub fn append_scheme(address: &str, scheme: &str) -> String {
    let address = address.trim();
    if address.contains("://") {
        address.to_string()
    } else {
        format!("{scheme}://{address}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_scheme() {
        assert_eq!(append_scheme("10.0.0.1:8080", "http"), "http://10.0.0.1:8080");
        assert_eq!(append_scheme(" 10.0.0.1:8080 ", "http"), "http://10.0.0.1:8080");
        assert_eq!(append_scheme("https://svc.internal:443", "http"), "https://svc.internal:443");
    }

    #[test]
    fn test_health() {
        let up = Upstream::new("http://a:1");
        assert_eq!(up.status(), HealthState::Unknown);
        assert!(up.is_healthy());
        assert!(!up.clone().with_status(HealthState::Unhealthy).is_healthy());
        assert_eq!(up.with_weight(5).weight(), 5);
    }
}
