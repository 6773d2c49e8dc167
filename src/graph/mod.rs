//! Service graph input model
//!
//! A [`ServiceGraph`] is the declarative description the converter compiles:
//! an ordered list of services, each pinned to a namespace and a cluster.
//! Per-service call scripts are kept as opaque YAML so they can be embedded
//! in the generated ConfigMap without being interpreted here.
//!
//! Graph files may carry a `defaults` block whose values fill in any field a
//! service leaves unset. Keys the converter does not model (`isEntrypoint`,
//! `requestSize`, policy counts, ...) are kept per service and written back
//! into the embedded graph unchanged. A top-level `apiVersion`/`kind` header
//! is accepted and ignored.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Namespace used when neither the service nor the defaults block sets one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Replica count used when neither the service nor the defaults block sets one
pub const DEFAULT_NUM_REPLICAS: i32 = 1;

/// Protocol a mock service speaks
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Plain HTTP (default)
    #[default]
    Http,
    /// gRPC
    Grpc,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Grpc => write!(f, "grpc"),
        }
    }
}

/// One node in the service graph
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service name, unique within its namespace
    pub name: String,
    /// Namespace the service and its shared ConfigMap live in
    pub namespace: String,
    /// Cluster the service is materialized in
    pub cluster: String,
    /// Replica count for the generated Deployment (not bounds-checked)
    pub num_replicas: i32,
    /// Protocol
    #[serde(rename = "type")]
    pub type_: ServiceType,
    /// Fraction of requests answered with an error, e.g. `"10%"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_rate: Option<String>,
    /// Size of each response body, e.g. `"1KB"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size: Option<String>,
    /// Outbound calls and sleeps, passed through untouched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<serde_yaml::Value>,
    /// Graph keys with no meaning to the converter, passed through untouched
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl Service {
    /// Create a service with built-in defaults for everything but its identity
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        cluster: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            cluster: cluster.into(),
            num_replicas: DEFAULT_NUM_REPLICAS,
            type_: ServiceType::default(),
            error_rate: None,
            response_size: None,
            script: vec![],
            extra: serde_yaml::Mapping::new(),
        }
    }

    /// Set the replica count
    pub fn with_replicas(mut self, num_replicas: i32) -> Self {
        self.num_replicas = num_replicas;
        self
    }

    /// Append a script step
    pub fn with_step(mut self, step: serde_yaml::Value) -> Self {
        self.script.push(step);
        self
    }

    /// Set a pass-through graph key, e.g. `isEntrypoint`
    pub fn with_extra(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether this service belongs to the given cluster
    pub fn is_in_cluster(&self, cluster: &str) -> bool {
        self.cluster == cluster
    }
}

/// Ordered collection of services
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct ServiceGraph {
    /// Services in declaration order
    pub services: Vec<Service>,
}

// =============================================================================
// Graph file format
// =============================================================================

/// Values applied to every service that leaves the field unset
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceDefaults {
    namespace: Option<String>,
    cluster: Option<String>,
    num_replicas: Option<i32>,
    #[serde(rename = "type")]
    type_: Option<ServiceType>,
    error_rate: Option<String>,
    response_size: Option<String>,
    #[serde(flatten)]
    extra: serde_yaml::Mapping,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEntry {
    name: String,
    namespace: Option<String>,
    cluster: Option<String>,
    num_replicas: Option<i32>,
    #[serde(rename = "type")]
    type_: Option<ServiceType>,
    error_rate: Option<String>,
    response_size: Option<String>,
    #[serde(default)]
    script: Vec<serde_yaml::Value>,
    #[serde(flatten)]
    extra: serde_yaml::Mapping,
}

/// Top-level keys other than these (`apiVersion`, `kind`) are ignored
#[derive(Clone, Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    defaults: ServiceDefaults,
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

impl ServiceEntry {
    fn resolve(self, defaults: &ServiceDefaults) -> Service {
        let mut extra = self.extra;
        for (key, value) in &defaults.extra {
            if !extra.contains_key(key) {
                extra.insert(key.clone(), value.clone());
            }
        }
        Service {
            name: self.name,
            namespace: self
                .namespace
                .or_else(|| defaults.namespace.clone())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            cluster: self
                .cluster
                .or_else(|| defaults.cluster.clone())
                .unwrap_or_default(),
            num_replicas: self
                .num_replicas
                .or(defaults.num_replicas)
                .unwrap_or(DEFAULT_NUM_REPLICAS),
            type_: self.type_.or(defaults.type_).unwrap_or_default(),
            error_rate: self.error_rate.or_else(|| defaults.error_rate.clone()),
            response_size: self.response_size.or_else(|| defaults.response_size.clone()),
            script: self.script,
            extra,
        }
    }
}

impl ServiceGraph {
    /// Create a graph from services in order
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }

    /// Parse a graph file, applying its `defaults` block
    pub fn from_yaml(input: &str) -> Result<Self> {
        let file: GraphFile = serde_yaml::from_str(input)?;
        let defaults = file.defaults;
        let services = file
            .services
            .into_iter()
            .map(|entry| entry.resolve(&defaults))
            .collect();
        Ok(Self { services })
    }

    /// Read and parse a graph file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let graph = Self::from_yaml(&content)?;
        debug!(path = %path.display(), services = graph.service_count(), "loaded service graph");
        Ok(graph)
    }

    /// Encode the whole graph as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Number of services in the graph
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Services assigned to the given cluster, in graph order
    pub fn in_cluster<'a>(&'a self, cluster: &'a str) -> impl Iterator<Item = &'a Service> + 'a {
        self.services.iter().filter(move |s| s.is_in_cluster(cluster))
    }

    /// Optional pre-compile check for malformed graphs
    ///
    /// The compiler itself accepts any graph; callers wanting stronger
    /// guarantees run this first.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(Error::validation(format!(
                    "service in namespace '{}' has an empty name",
                    service.namespace
                )));
            }
            if service.num_replicas < 0 {
                return Err(Error::validation(format!(
                    "service '{}' has negative numReplicas ({})",
                    service.name, service.num_replicas
                )));
            }
            if !seen.insert((service.namespace.as_str(), service.name.as_str())) {
                return Err(Error::validation(format!(
                    "service '{}' in namespace '{}' declared twice",
                    service.name, service.namespace
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
