//! isotope-convert - compiles service graphs into Kubernetes manifests
//!
//! A service graph describes mock services, the namespace and cluster each
//! belongs to, and the calls they make. For one target cluster this crate
//! emits a multi-document YAML stream with a graph ConfigMap per namespace,
//! a Deployment and Service per in-cluster service, and a load-generating
//! client pair.
//!
//! # Modules
//!
//! - [`graph`] - Service graph model, graph-file loading and optional validation
//! - [`labels`] - Label/annotation policy shared by all builders
//! - [`namespace`] - Namespace resolution for a target cluster
//! - [`workload`] - Kubernetes resource types, Deployment/Service and client builders
//! - [`compiler`] - Graph-to-manifest compiler and ConfigMap builder
//! - [`manifest`] - Manifest wrapper and multi-document YAML assembly
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod compiler;
pub mod error;
pub mod graph;
pub mod labels;
pub mod manifest;
pub mod namespace;
pub mod workload;

pub use compiler::{CompileParams, CompiledManifests, ManifestCompiler};
pub use error::Error;
pub use graph::{Service, ServiceGraph};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Well-known identifiers
// =============================================================================
// Mock services and tooling that read the generated manifests depend on these
// exact values.

/// Name of the per-namespace ConfigMap holding the graph
pub const CONFIG_MAP_NAME: &str = "service-graph-config";

/// ConfigMap data key holding the graph YAML
pub const CONFIG_MAP_KEY: &str = "service-graph";

/// Volume that mounts the graph ConfigMap into mock service pods
pub const CONFIG_VOLUME: &str = "config-volume";

/// Directory the graph volume is mounted at
pub const CONFIG_PATH: &str = "/etc/config";

/// File name of the projected graph inside [`CONFIG_PATH`]
pub const GRAPH_FILE_NAME: &str = "service-graph.yaml";

/// Container name of every mock service
pub const SERVICE_CONTAINER_NAME: &str = "mock-service";

/// Environment variable telling a mock service its own name
pub const SERVICE_NAME_ENV_KEY: &str = "SERVICE_NAME";

/// Port every mock service listens on
pub const SERVICE_PORT: u16 = 8080;

/// Name of the Service port in front of each mock service
pub const SERVICE_PORT_NAME: &str = "http-web";

/// Name of the client Deployment and Service
pub const CLIENT_NAME: &str = "client";

/// Container name of the load-generating client
pub const CLIENT_CONTAINER_NAME: &str = "fortio-client";

/// Port the client serves its UI and API on
pub const CLIENT_PORT: u16 = 8080;

/// Name of the client Service port
pub const CLIENT_PORT_NAME: &str = "http-fortio";

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Default load-generating client image
pub const DEFAULT_CLIENT_IMAGE: &str = "fortio/fortio:latest";

/// Default mock service image
pub const DEFAULT_SERVICE_IMAGE: &str = "tahler/isotope-service:1";

/// Default environment name (no mesh installed)
pub const DEFAULT_ENVIRONMENT: &str = "NONE";
