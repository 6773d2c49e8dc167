//! Manifest wrapper and multi-document YAML assembly

use serde::Serialize;

use crate::workload::{ConfigMap, Deployment, ObjectMeta, Service};
use crate::{Error, Result};

/// Separator written before every document except the first
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Any resource the converter emits
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    /// Embedded service graph
    ConfigMap(ConfigMap),
    /// Workload
    Deployment(Deployment),
    /// Network endpoint
    Service(Service),
}

impl Manifest {
    /// Kubernetes kind
    pub fn kind(&self) -> &str {
        self.metadata_and_kind().1
    }

    /// Resource name
    pub fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Resource namespace
    pub fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    /// Resource metadata
    pub fn metadata(&self) -> &ObjectMeta {
        self.metadata_and_kind().0
    }

    fn metadata_and_kind(&self) -> (&ObjectMeta, &String) {
        match self {
            Self::ConfigMap(cm) => (&cm.metadata, &cm.kind),
            Self::Deployment(d) => (&d.metadata, &d.kind),
            Self::Service(s) => (&s.metadata, &s.kind),
        }
    }

    /// Serialize this manifest to a single YAML document
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::serialization(format!(
                "failed to encode {} {}/{}: {}",
                self.kind(),
                self.namespace(),
                self.name(),
                e
            ))
        })
    }
}

impl From<ConfigMap> for Manifest {
    fn from(cm: ConfigMap) -> Self {
        Self::ConfigMap(cm)
    }
}

impl From<Deployment> for Manifest {
    fn from(d: Deployment) -> Self {
        Self::Deployment(d)
    }
}

impl From<Service> for Manifest {
    fn from(s: Service) -> Self {
        Self::Service(s)
    }
}

/// Encode every manifest and join them into one stream
///
/// Any encoding failure aborts the whole stream; no partial output is returned.
pub fn to_yaml_stream<'a>(manifests: impl IntoIterator<Item = &'a Manifest>) -> Result<String> {
    let documents = manifests
        .into_iter()
        .map(Manifest::to_yaml)
        .collect::<Result<Vec<_>>>()?;
    Ok(documents.join(DOCUMENT_SEPARATOR))
}
