use indexmap::IndexMap;

use crate::{manifest::Str, resmap::ResourceMap, resource::Resource};

/// Stamps the annotations the platform release tooling needs to decide where an object is
/// shipped.
pub trait PlatformAnnotator {
    /// With `merge` unset the object's annotations are replaced wholesale.
    fn annotate(&self, resource: &mut Resource, merge: bool);
}

const RELEASE_ANNOTATIONS: [(&str, &str); 4] = [
    (
        "exclude.release.openshift.io/internal-openshift-hosted",
        "true",
    ),
    (
        "include.release.openshift.io/self-managed-high-availability",
        "true",
    ),
    ("include.release.openshift.io/single-node-developer", "true"),
    ("release.openshift.io/feature-set", "TechPreviewNoUpgrade"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAnnotator {
    annotations: IndexMap<Str, Str>,
}

impl ReleaseAnnotator {
    pub fn new(annotations: IndexMap<Str, Str>) -> Self {
        Self { annotations }
    }

    pub fn annotations(&self) -> &IndexMap<Str, Str> {
        &self.annotations
    }
}

impl Default for ReleaseAnnotator {
    fn default() -> Self {
        Self::new(
            RELEASE_ANNOTATIONS
                .into_iter()
                .map(|(k, v)| (Str::from(k), Str::from(v)))
                .collect(),
        )
    }
}

impl PlatformAnnotator for ReleaseAnnotator {
    fn annotate(&self, resource: &mut Resource, merge: bool) {
        let mut metadata = resource.make_metadata_mut();
        let mut annotations = metadata.make_annotations_mut();
        if !merge {
            annotations.clear();
        }

        for (key, value) in &self.annotations {
            annotations.insert(key.as_str(), value.as_str());
        }
    }
}

/// Moves roles, bindings and service accounts into their own stream, in their original order,
/// replacing their annotations with the platform set. Returns `(core, rbac)`.
#[tracing::instrument(skip_all)]
pub fn split_rbac(
    resources: ResourceMap,
    annotator: &dyn PlatformAnnotator,
) -> (ResourceMap, ResourceMap) {
    let (core, mut rbac) = resources.partition(|resource| resource.kind().is_rbac());
    for resource in rbac.iter_mut() {
        annotator.annotate(resource, false);
    }

    tracing::debug!(core = core.len(), rbac = rbac.len(), "split rbac");
    (core, rbac)
}
