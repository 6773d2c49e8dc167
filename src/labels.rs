//! Label and annotation policy for generated manifests
//!
//! Every builder receives a [`LabelPolicy`] instead of reading module-level
//! maps, so the fixed sets travel with the compile request.

use std::collections::BTreeMap;

/// Label key that identifies a pod; used by both pod templates and selectors
pub const IDENTITY_LABEL: &str = "name";

/// Label key carrying the service name on Deployment and Service metadata
pub const APP_LABEL: &str = "app";

/// Label set, sorted by key for stable output
pub type Labels = BTreeMap<String, String>;

/// Fixed labels and annotations stamped onto generated resources
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelPolicy {
    /// Marks resources owned by the graph (ConfigMaps)
    pub app_labels: Labels,
    /// Marks service nodes (Deployments, Services, pod templates)
    pub node_labels: Labels,
    /// Pod template annotations enabling metrics scraping
    pub scrape_annotations: Labels,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            app_labels: labels([("tool", "isotope")]),
            node_labels: labels([("role", "service")]),
            scrape_annotations: labels([("prometheus.io/scrape", "true")]),
        }
    }
}

impl LabelPolicy {
    /// Metadata labels for a service's Deployment and Service
    pub fn service_labels(&self, name: &str) -> Labels {
        combine_labels(&self.node_labels, &labels([(APP_LABEL, name)]))
    }

    /// Pod template labels for a service
    pub fn pod_labels(&self, name: &str) -> Labels {
        combine_labels(&self.node_labels, &identity_selector(name))
    }
}

/// Selector matching pods of the named service
pub fn identity_selector(name: &str) -> Labels {
    labels([(IDENTITY_LABEL, name)])
}

/// Merge two label sets; entries in `b` win on key collision
pub fn combine_labels(a: &Labels, b: &Labels) -> Labels {
    let mut merged = a.clone();
    merged.extend(b.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Build a label set from key/value pairs
pub fn labels<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Labels {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_later_labels_win_on_collision() {
        let a = labels([("role", "service"), ("tier", "web")]);
        let b = labels([("role", "client")]);

        let merged = combine_labels(&a, &b);
        assert_eq!(merged.get("role"), Some(&"client".to_string()));
        assert_eq!(merged.get("tier"), Some(&"web".to_string()));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn story_combine_leaves_inputs_untouched() {
        let a = labels([("role", "service")]);
        let b = labels([("app", "frontend")]);
        let _ = combine_labels(&a, &b);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn story_default_policy_values() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.app_labels, labels([("tool", "isotope")]));
        assert_eq!(policy.node_labels, labels([("role", "service")]));
        assert_eq!(
            policy.scrape_annotations,
            labels([("prometheus.io/scrape", "true")])
        );
    }

    #[test]
    fn story_service_and_pod_labels() {
        let policy = LabelPolicy::default();

        let svc = policy.service_labels("frontend");
        assert_eq!(svc, labels([("role", "service"), ("app", "frontend")]));

        let pod = policy.pod_labels("frontend");
        assert_eq!(pod, labels([("role", "service"), ("name", "frontend")]));
        assert_eq!(identity_selector("frontend"), labels([("name", "frontend")]));
    }
}
