//! Load-generating client workloads
//!
//! Every compile emits one fortio client Deployment and its Service in the
//! client namespace. Nothing about the graph changes them.

use chrono::{DateTime, Utc};

use super::{
    Container, ContainerPort, Deployment, DeploymentSpec, GeneratedWorkloads, LabelSelector,
    ObjectMeta, PodMeta, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use crate::compiler::CompileParams;
use crate::labels::{labels, LabelPolicy, Labels, APP_LABEL};
use crate::{CLIENT_CONTAINER_NAME, CLIENT_NAME, CLIENT_PORT, CLIENT_PORT_NAME};

/// Compiler for the fixed client Deployment/Service pair
pub struct ClientCompiler;

impl ClientCompiler {
    /// Compile the client pair from the caller's image, placement and namespace
    pub fn compile(
        params: &CompileParams,
        policy: &LabelPolicy,
        timestamp: DateTime<Utc>,
    ) -> GeneratedWorkloads {
        GeneratedWorkloads {
            deployment: Self::compile_deployment(params, policy, timestamp),
            service: Self::compile_service(params, timestamp),
        }
    }

    fn compile_deployment(
        params: &CompileParams,
        policy: &LabelPolicy,
        timestamp: DateTime<Utc>,
    ) -> Deployment {
        Deployment {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            metadata: ObjectMeta::new(CLIENT_NAME, &params.client_namespace, timestamp)
                .with_labels(client_labels()),
            spec: DeploymentSpec {
                replicas: None,
                selector: LabelSelector {
                    match_labels: client_labels(),
                },
                template: PodTemplateSpec {
                    metadata: PodMeta {
                        labels: client_labels(),
                        annotations: policy.scrape_annotations.clone(),
                        creation_timestamp: timestamp,
                    },
                    spec: PodSpec {
                        node_selector: params.client_node_selector.clone(),
                        containers: vec![Container {
                            name: CLIENT_CONTAINER_NAME.to_string(),
                            image: params.client_image.clone(),
                            args: vec!["server".to_string()],
                            env: vec![],
                            ports: vec![ContainerPort {
                                container_port: CLIENT_PORT,
                            }],
                            volume_mounts: vec![],
                        }],
                        volumes: vec![],
                    },
                },
            },
        }
    }

    fn compile_service(params: &CompileParams, timestamp: DateTime<Utc>) -> Service {
        Service {
            api_version: "v1".to_string(),
            kind: "Service".to_string(),
            metadata: ObjectMeta::new(CLIENT_NAME, &params.client_namespace, timestamp)
                .with_labels(client_labels()),
            spec: ServiceSpec {
                ports: vec![ServicePort {
                    name: CLIENT_PORT_NAME.to_string(),
                    port: CLIENT_PORT,
                }],
                selector: client_labels(),
            },
        }
    }
}

fn client_labels() -> Labels {
    labels([(APP_LABEL, CLIENT_NAME)])
}
