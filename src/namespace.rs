//! Namespace resolution for a target cluster

use crate::graph::Service;

/// Distinct namespaces of the services assigned to `cluster`
///
/// Order is first occurrence over the service list. Services in other
/// clusters never contribute a namespace.
pub fn resolve_namespaces(services: &[Service], cluster: &str) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    for service in services.iter().filter(|s| s.is_in_cluster(cluster)) {
        if !namespaces.contains(&service.namespace) {
            namespaces.push(service.namespace.clone());
        }
    }
    namespaces
}
