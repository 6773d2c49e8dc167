//! Kubernetes resource types and per-service workload generation
//!
//! This module defines the Kubernetes resources the converter emits:
//! - ConfigMap: the embedded service graph, one per namespace
//! - Deployment: mock-service replicas for one graph node
//! - Service: stable network endpoint in front of a Deployment
//!
//! [`WorkloadCompiler`] turns one graph node into its Deployment and Service.
//! The load-generating client pair lives in [`client`].

pub mod client;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::CompileParams;
use crate::graph;
use crate::labels::{identity_selector, LabelPolicy, Labels};
use crate::{
    CONFIG_MAP_KEY, CONFIG_MAP_NAME, CONFIG_PATH, CONFIG_VOLUME, GRAPH_FILE_NAME,
    SERVICE_CONTAINER_NAME, SERVICE_NAME_ENV_KEY, SERVICE_PORT, SERVICE_PORT_NAME,
};

// =============================================================================
// Kubernetes Resource Types
// =============================================================================

/// Standard Kubernetes ObjectMeta
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Labels,
    /// Creation timestamp, stamped at compile time
    pub creation_timestamp: DateTime<Utc>,
}

impl ObjectMeta {
    /// Create metadata with no labels or annotations
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        creation_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            creation_timestamp,
        }
    }

    /// Replace the label set
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

// =============================================================================
// ConfigMap
// =============================================================================

/// Kubernetes ConfigMap
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Data entries
    pub data: BTreeMap<String, String>,
}

// =============================================================================
// Deployment
// =============================================================================

/// Kubernetes Deployment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: DeploymentSpec,
}

/// Deployment spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Number of replicas; omitted to let the cluster default apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Label selector
    pub selector: LabelSelector,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Label selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    pub match_labels: Labels,
}

/// Pod template spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    /// Pod metadata
    pub metadata: PodMeta,
    /// Pod spec
    pub spec: PodSpec,
}

/// Pod metadata (subset of ObjectMeta)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodMeta {
    /// Labels
    pub labels: Labels,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Labels,
    /// Creation timestamp
    pub creation_timestamp: DateTime<Utc>,
}

/// Pod spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Node selector
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: Labels,
    /// Containers
    pub containers: Vec<Container>,
    /// Volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

/// Container spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: String,
    /// Image
    pub image: String,
    /// Args
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

/// Environment variable
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    /// Variable name
    pub name: String,
    /// Variable value
    pub value: String,
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port number
    pub container_port: u16,
}

/// Volume
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    pub name: String,
    /// ConfigMap source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapVolumeSource>,
}

/// ConfigMap volume source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapVolumeSource {
    /// ConfigMap name
    pub name: String,
    /// Keys projected into the volume
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPath>,
}

/// Projection of one ConfigMap key to a file
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyToPath {
    /// ConfigMap key
    pub key: String,
    /// Relative file path inside the mount
    pub path: String,
}

/// Volume mount
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name
    pub name: String,
    /// Mount path
    pub mount_path: String,
}

// =============================================================================
// Service
// =============================================================================

/// Kubernetes Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

/// Service spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Ports
    pub ports: Vec<ServicePort>,
    /// Selector
    pub selector: Labels,
}

/// Service port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name
    pub name: String,
    /// Port number
    pub port: u16,
}

// =============================================================================
// Generated Workloads Container
// =============================================================================

/// Deployment and Service generated for one graph node (or the client)
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedWorkloads {
    /// Kubernetes Deployment
    pub deployment: Deployment,
    /// Kubernetes Service
    pub service: Service,
}

// =============================================================================
// Workload Compiler
// =============================================================================

/// Compiler for the Deployment and Service of one in-cluster graph node
pub struct WorkloadCompiler<'a> {
    params: &'a CompileParams,
    policy: &'a LabelPolicy,
    timestamp: DateTime<Utc>,
}

impl<'a> WorkloadCompiler<'a> {
    /// Create a workload compiler sharing one timestamp across its output
    pub fn new(params: &'a CompileParams, policy: &'a LabelPolicy, timestamp: DateTime<Utc>) -> Self {
        Self {
            params,
            policy,
            timestamp,
        }
    }

    /// Compile a graph node into its Deployment and Service
    pub fn compile(&self, service: &graph::Service) -> GeneratedWorkloads {
        debug!(
            service = %service.name,
            namespace = %service.namespace,
            protocol = %service.type_,
            replicas = service.num_replicas,
            "compiling service workloads"
        );
        GeneratedWorkloads {
            deployment: self.compile_deployment(service),
            service: self.compile_service(service),
        }
    }

    /// Compile the mock-service Deployment for a graph node
    ///
    /// The replica count is copied as-is; bounds are the graph loader's concern.
    pub fn compile_deployment(&self, service: &graph::Service) -> Deployment {
        let container = Container {
            name: SERVICE_CONTAINER_NAME.to_string(),
            image: self.params.service_image.clone(),
            args: vec![format!(
                "--max-idle-connections-per-host={}",
                self.params.service_max_idle_connections_per_host
            )],
            env: vec![EnvVar {
                name: SERVICE_NAME_ENV_KEY.to_string(),
                value: service.name.clone(),
            }],
            ports: vec![ContainerPort {
                container_port: SERVICE_PORT,
            }],
            volume_mounts: vec![VolumeMount {
                name: CONFIG_VOLUME.to_string(),
                mount_path: CONFIG_PATH.to_string(),
            }],
        };

        Deployment {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            metadata: ObjectMeta::new(&service.name, &service.namespace, self.timestamp)
                .with_labels(self.policy.service_labels(&service.name)),
            spec: DeploymentSpec {
                replicas: Some(service.num_replicas),
                selector: LabelSelector {
                    match_labels: identity_selector(&service.name),
                },
                template: PodTemplateSpec {
                    metadata: PodMeta {
                        labels: self.policy.pod_labels(&service.name),
                        annotations: self.policy.scrape_annotations.clone(),
                        creation_timestamp: self.timestamp,
                    },
                    spec: PodSpec {
                        node_selector: self.params.service_node_selector.clone(),
                        containers: vec![container],
                        volumes: vec![graph_config_volume()],
                    },
                },
            },
        }
    }

    /// Compile the Service fronting a graph node's pods
    pub fn compile_service(&self, service: &graph::Service) -> Service {
        Service {
            api_version: "v1".to_string(),
            kind: "Service".to_string(),
            metadata: ObjectMeta::new(&service.name, &service.namespace, self.timestamp)
                .with_labels(self.policy.service_labels(&service.name)),
            spec: ServiceSpec {
                ports: vec![ServicePort {
                    name: SERVICE_PORT_NAME.to_string(),
                    port: SERVICE_PORT,
                }],
                selector: identity_selector(&service.name),
            },
        }
    }
}

/// Volume projecting the namespace's graph ConfigMap to a single file
fn graph_config_volume() -> Volume {
    Volume {
        name: CONFIG_VOLUME.to_string(),
        config_map: Some(ConfigMapVolumeSource {
            name: CONFIG_MAP_NAME.to_string(),
            items: vec![KeyToPath {
                key: CONFIG_MAP_KEY.to_string(),
                path: GRAPH_FILE_NAME.to_string(),
            }],
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
