//! Registry instance records.

use serde::{Deserialize, Serialize};

use crate::load_balancer::{append_scheme, Upstream};

/// One instance of a logical cluster as reported by a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub host: String,
    pub port: u16,
    pub context_id: String,
}

impl InstanceRecord {
    pub fn new(host: impl Into<String>, port: u16, context_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            context_id: context_id.into(),
        }
    }

    /// `host:port`, scheme defaulted to `http`.
    pub fn to_upstream(&self) -> Upstream {
        Upstream::new(append_scheme(&format!("{}:{}", self.host, self.port), "http"))
    }
}
