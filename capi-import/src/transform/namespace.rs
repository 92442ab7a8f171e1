use serde_json::Value;

use crate::{
    error::Result,
    fieldspec,
    manifest::{Str, annotation},
    resmap::ResourceMap,
    resource::{Kind, Object, Resource},
};

use super::Transformer;

/// Kinds outside the pipeline's closed set that are nonetheless cluster-scoped.
const CLUSTER_SCOPED: &[&str] = &[
    "APIService",
    "ClusterIssuer",
    "PriorityClass",
    "StorageClass",
    "PersistentVolume",
];

/// Moves every namespaced object, and every reference to one, into the target namespace.
pub struct TargetNamespaceTransformer(pub Str);

impl Transformer for TargetNamespaceTransformer {
    #[tracing::instrument(skip_all, name = "namespace_transform", fields(namespace = %self.0))]
    fn transform(&mut self, resources: &mut ResourceMap) -> Result<()> {
        let builtin = fieldspec::Builtin::get();
        let ns = self.0.to_string();

        // Namespace is part of identity, so the map is rebuilt.
        let mut out = ResourceMap::with_capacity(resources.len());
        for mut resource in std::mem::take(resources) {
            if is_namespaced(&resource) {
                resource.set_namespace(Some(self.0.clone()));
            }

            builtin
                .namespace_references
                .apply::<String>(&mut resource, |ns_ref| {
                    *ns_ref = ns.clone();
                    Ok(())
                })?;

            builtin.subjects.apply::<Object>(&mut resource, |subject| {
                if subject.get("kind").and_then(Value::as_str) == Some("ServiceAccount") {
                    subject.insert("namespace".into(), Value::String(ns.clone()));
                }
                Ok(())
            })?;

            retarget_injection_reference(&mut resource, &ns);

            out.insert(resource)?;
        }

        *resources = out;
        Ok(())
    }
}

fn is_namespaced(resource: &Resource) -> bool {
    match resource.kind() {
        Kind::Other => !CLUSTER_SCOPED.contains(&resource.kind_name().as_str()),
        kind => !kind.is_cluster_scoped(),
    }
}

fn retarget_injection_reference(resource: &mut Resource, ns: &str) {
    let Some(certificate) = resource
        .annotations()
        .and_then(|annotations| annotations.get(annotation::INJECT_CA_FROM))
        .and_then(|value| value.split_once('/'))
        .map(|(_, certificate)| certificate.to_string())
    else {
        return;
    };

    if let Some(mut annotations) = resource.make_metadata_mut().annotations_mut() {
        annotations.insert(annotation::INJECT_CA_FROM, format!("{ns}/{certificate}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENTS: &str = r#"
apiVersion: v1
kind: Namespace
metadata:
  name: capi-system
---
apiVersion: v1
kind: Service
metadata:
  name: capi-webhook-service
  namespace: capi-system
---
apiVersion: rbac.authorization.k8s.io/v1
kind: ClusterRoleBinding
metadata:
  name: capi-manager-rolebinding
subjects:
- kind: ServiceAccount
  name: capi-manager
  namespace: capi-system
- kind: Group
  name: system:masters
---
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: clusters.cluster.x-k8s.io
  annotations:
    cert-manager.io/inject-ca-from: capi-system/capi-serving-cert
spec:
  conversion:
    webhook:
      clientConfig:
        service:
          name: capi-webhook-service
          namespace: capi-system
"#;

    fn transform() -> ResourceMap {
        let mut resources = ResourceMap::from_yaml_stream(COMPONENTS).unwrap();
        TargetNamespaceTransformer("openshift-cluster-api".into())
            .transform(&mut resources)
            .unwrap();
        resources
    }

    #[test]
    fn namespaced_objects_move() {
        let resources = transform();
        let service = resources
            .iter()
            .find(|r| r.kind() == Kind::Service)
            .unwrap();
        assert_eq!(
            service.namespace().map(|ns| ns.as_str()),
            Some("openshift-cluster-api")
        );
    }

    #[test]
    fn cluster_scoped_objects_stay_unnamespaced() {
        let resources = transform();
        for resource in resources.iter().filter(|r| r.kind() != Kind::Service) {
            assert!(resource.namespace().is_none(), "{}", resource.id());
        }
    }

    #[test]
    fn references_follow() {
        let rendered = transform().to_yaml_stream().unwrap();
        assert!(!rendered.contains("capi-system/"), "{rendered}");
        assert!(rendered.contains("cert-manager.io/inject-ca-from: openshift-cluster-api/capi-serving-cert"));
        assert_eq!(rendered.matches("namespace: openshift-cluster-api").count(), 3, "{rendered}");
        // The namespace object itself keeps its name, it is dropped later.
        assert!(rendered.contains("name: capi-system"));
    }
}
