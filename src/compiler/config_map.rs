//! Per-namespace ConfigMap embedding the service graph

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::graph::ServiceGraph;
use crate::labels::LabelPolicy;
use crate::workload::{ConfigMap, ObjectMeta};
use crate::{Result, CONFIG_MAP_KEY, CONFIG_MAP_NAME};

/// Build the graph ConfigMap for one namespace
///
/// The whole graph is embedded, not only the namespace's services: every
/// mock service needs the full topology to route its calls.
pub fn compile_config_map(
    graph: &ServiceGraph,
    namespace: &str,
    policy: &LabelPolicy,
    timestamp: DateTime<Utc>,
) -> Result<ConfigMap> {
    let graph_yaml = graph.to_yaml()?;
    debug!(namespace = %namespace, bytes = graph_yaml.len(), "compiling graph config map");

    let mut data = BTreeMap::new();
    data.insert(CONFIG_MAP_KEY.to_string(), graph_yaml);

    Ok(ConfigMap {
        api_version: "v1".to_string(),
        kind: "ConfigMap".to_string(),
        metadata: ObjectMeta::new(CONFIG_MAP_NAME, namespace, timestamp)
            .with_labels(policy.app_labels.clone()),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Service;
    use crate::labels::labels;
    use chrono::TimeZone;

    fn graph() -> ServiceGraph {
        ServiceGraph::new(vec![
            Service::new("a", "ns1", "east"),
            Service::new("b", "ns2", "west").with_replicas(3),
        ])
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn story_config_map_identity() {
        let cm = compile_config_map(&graph(), "ns1", &LabelPolicy::default(), ts()).unwrap();

        assert_eq!(cm.api_version, "v1");
        assert_eq!(cm.kind, "ConfigMap");
        assert_eq!(cm.metadata.name, "service-graph-config");
        assert_eq!(cm.metadata.namespace, "ns1");
        assert_eq!(cm.metadata.labels, labels([("tool", "isotope")]));
        assert_eq!(cm.metadata.creation_timestamp, ts());
    }

    #[test]
    fn story_config_map_embeds_entire_graph() {
        let graph = graph();
        let cm = compile_config_map(&graph, "ns1", &LabelPolicy::default(), ts()).unwrap();

        assert_eq!(cm.data.len(), 1);
        let embedded = cm.data.get("service-graph").expect("graph key");

        // Services from other namespaces and clusters are included too
        let parsed = ServiceGraph::from_yaml(embedded).unwrap();
        assert_eq!(parsed, graph);
    }

    #[test]
    fn story_unmodelled_graph_keys_reach_config_map() {
        let graph = ServiceGraph::from_yaml(
            "apiVersion: v1alpha1\nkind: MockServiceGraph\nservices:\n- name: a\n  namespace: ns1\n  isEntrypoint: true\n",
        )
        .unwrap();
        let cm = compile_config_map(&graph, "ns1", &LabelPolicy::default(), ts()).unwrap();

        let embedded = cm.data.get("service-graph").expect("graph key");
        assert!(embedded.contains("isEntrypoint: true"));
        let parsed = ServiceGraph::from_yaml(embedded).unwrap();
        assert_eq!(
            parsed.services[0].extra.get("isEntrypoint"),
            Some(&serde_yaml::Value::Bool(true))
        );
    }

    #[test]
    fn story_same_content_in_every_namespace() {
        let graph = graph();
        let policy = LabelPolicy::default();
        let a = compile_config_map(&graph, "ns1", &policy, ts()).unwrap();
        let b = compile_config_map(&graph, "ns2", &policy, ts()).unwrap();
        assert_eq!(a.data, b.data);
    }
}
