//! Service graph compiler
//!
//! Turns a [`ServiceGraph`] into the full manifest set for one target
//! cluster. The output order is fixed so that regenerated manifests diff
//! cleanly:
//!
//! 1. One graph ConfigMap per namespace, in first-seen namespace order
//! 2. Deployment then Service for each in-cluster graph node, in graph order
//! 3. The client Deployment then Service
//!
//! # Usage
//!
//! ```text
//! let params = CompileParams::new("east");
//! let yaml = ManifestCompiler::new(&params).compile_to_yaml(&graph)?;
//! ```
//!
//! Compiling is pure: nothing is cached between calls and the only input
//! besides the graph and params is the creation timestamp, which can be
//! pinned with [`ManifestCompiler::with_timestamp`].

mod config_map;

pub use config_map::compile_config_map;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::info;

use crate::graph::ServiceGraph;
use crate::labels::{LabelPolicy, Labels};
use crate::manifest::{to_yaml_stream, Manifest};
use crate::namespace::resolve_namespaces;
use crate::workload::client::ClientCompiler;
use crate::workload::{ConfigMap, Deployment, Service, WorkloadCompiler};
use crate::{Result, DEFAULT_CLIENT_IMAGE, DEFAULT_ENVIRONMENT, DEFAULT_SERVICE_IMAGE};

/// Caller-supplied inputs that are not part of the graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileParams {
    /// Only services assigned to this cluster are materialized
    pub cluster: String,
    /// Target environment name (e.g. `NONE`, `ISTIO`)
    pub environment: String,
    /// Image for the load-generating client
    pub client_image: String,
    /// Namespace the client pair is created in
    pub client_namespace: String,
    /// Node selector for client pods
    pub client_node_selector: Labels,
    /// Image for every mock service
    pub service_image: String,
    /// Node selector for mock service pods
    pub service_node_selector: Labels,
    /// Passed to each mock service as `--max-idle-connections-per-host`
    pub service_max_idle_connections_per_host: u32,
}

impl CompileParams {
    /// Params for the given cluster with default images and placement
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            client_image: DEFAULT_CLIENT_IMAGE.to_string(),
            client_namespace: crate::graph::DEFAULT_NAMESPACE.to_string(),
            client_node_selector: Labels::new(),
            service_image: DEFAULT_SERVICE_IMAGE.to_string(),
            service_node_selector: Labels::new(),
            service_max_idle_connections_per_host: 0,
        }
    }
}

/// Ordered manifest set produced by one compile
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledManifests {
    /// Namespaces that received a graph ConfigMap, in output order
    pub namespaces: Vec<String>,
    /// Every manifest in output order
    pub manifests: Vec<Manifest>,
}

impl CompiledManifests {
    /// Total number of manifests
    pub fn resource_count(&self) -> usize {
        self.manifests.len()
    }

    /// Graph ConfigMaps in output order
    pub fn config_maps(&self) -> impl Iterator<Item = &ConfigMap> {
        self.manifests.iter().filter_map(|m| match m {
            Manifest::ConfigMap(cm) => Some(cm),
            _ => None,
        })
    }

    /// Deployments in output order (graph nodes, then the client)
    pub fn deployments(&self) -> impl Iterator<Item = &Deployment> {
        self.manifests.iter().filter_map(|m| match m {
            Manifest::Deployment(d) => Some(d),
            _ => None,
        })
    }

    /// Services in output order (graph nodes, then the client)
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.manifests.iter().filter_map(|m| match m {
            Manifest::Service(s) => Some(s),
            _ => None,
        })
    }

    /// Encode the manifest set as one multi-document YAML stream
    pub fn to_yaml(&self) -> Result<String> {
        to_yaml_stream(&self.manifests)
    }
}

/// Compiler from service graph to Kubernetes manifests
pub struct ManifestCompiler<'a> {
    params: &'a CompileParams,
    policy: LabelPolicy,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> ManifestCompiler<'a> {
    /// Create a compiler with the default label policy
    pub fn new(params: &'a CompileParams) -> Self {
        Self {
            params,
            policy: LabelPolicy::default(),
            timestamp: None,
        }
    }

    /// Use a custom label policy
    pub fn with_policy(mut self, policy: LabelPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stamp every manifest with this creation time instead of the clock
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Compile the graph into the ordered manifest set
    ///
    /// Fails only if the graph cannot be encoded into a ConfigMap; no
    /// partial set is returned.
    pub fn compile(&self, graph: &ServiceGraph) -> Result<CompiledManifests> {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| Utc::now().trunc_subsecs(0));
        let cluster = self.params.cluster.as_str();

        let namespaces = resolve_namespaces(&graph.services, cluster);
        let mut manifests: Vec<Manifest> =
            Vec::with_capacity(namespaces.len() + 2 * graph.service_count() + 2);

        for namespace in &namespaces {
            let config_map = compile_config_map(graph, namespace, &self.policy, timestamp)?;
            manifests.push(config_map.into());
        }

        let workloads = WorkloadCompiler::new(self.params, &self.policy, timestamp);
        let mut in_cluster = 0;
        for service in graph.in_cluster(cluster) {
            let output = workloads.compile(service);
            manifests.push(output.deployment.into());
            manifests.push(output.service.into());
            in_cluster += 1;
        }

        let client = ClientCompiler::compile(self.params, &self.policy, timestamp);
        manifests.push(client.deployment.into());
        manifests.push(client.service.into());

        info!(
            cluster = %cluster,
            environment = %self.params.environment,
            namespaces = namespaces.len(),
            services = in_cluster,
            manifests = manifests.len(),
            "compiled service graph"
        );

        Ok(CompiledManifests {
            namespaces,
            manifests,
        })
    }

    /// Compile and encode in one step
    pub fn compile_to_yaml(&self, graph: &ServiceGraph) -> Result<String> {
        self.compile(graph)?.to_yaml()
    }
}

// =============================================================================
// Tests
// =============================================================================
