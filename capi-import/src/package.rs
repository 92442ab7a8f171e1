//! Packaging of a provider's final component stream into the objects the cluster operator
//! installs from.

use std::collections::BTreeMap;

use compact_str::format_compact;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    manifest::{Str, TypeMeta, apiversion, kind, label},
    provider::{ProviderContext, ProviderType},
    resmap::ResourceMap,
    yaml,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectMeta {
    pub name: Str,
    pub namespace: Str,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<Str, Str>,
}

/// The artifact holding a provider's upstream metadata and rewritten components.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigMap {
    #[serde(flatten)]
    pub type_meta: TypeMeta<apiversion::V1, kind::ConfigMap>,
    pub metadata: ObjectMeta,
    pub data: BTreeMap<Str, Str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ProviderKind {
    CoreProvider,
    ControlPlaneProvider,
    BootstrapProvider,
    InfrastructureProvider,
}

impl From<ProviderType> for ProviderKind {
    fn from(ty: ProviderType) -> Self {
        match ty {
            ProviderType::Core => ProviderKind::CoreProvider,
            ProviderType::ControlPlane => ProviderKind::ControlPlaneProvider,
            ProviderType::Bootstrap => ProviderKind::BootstrapProvider,
            ProviderType::Infrastructure => ProviderKind::InfrastructureProvider,
        }
    }
}

/// Activation record telling the cluster operator which version of a provider to install and
/// which config maps to fetch it from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderRecord {
    #[serde(flatten)]
    pub type_meta: TypeMeta<apiversion::OperatorV1Alpha1, ProviderKind>,
    pub metadata: ObjectMeta,
    pub spec: ProviderSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    pub version: Str,
    pub fetch_config: FetchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FetchConfig {
    pub selector: LabelSelector,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: BTreeMap<Str, Str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub config_map: ConfigMap,
    pub provider: ProviderRecord,
}

fn selector_labels(ctx: &ProviderContext) -> BTreeMap<Str, Str> {
    BTreeMap::from([
        (label::PROVIDER_NAME.into(), ctx.name().clone()),
        (label::PROVIDER_TYPE.into(), ctx.ty().type_name().into()),
    ])
}

/// Builds the config map and activation record for a provider's final component stream.
///
/// `metadata` is the raw upstream `metadata.yaml` and is embedded verbatim.
#[tracing::instrument(skip_all, fields(provider = %ctx.name()))]
pub fn package(
    components: &ResourceMap,
    ctx: &ProviderContext,
    namespace: &str,
    metadata: &[u8],
) -> Result<Package> {
    let metadata = std::str::from_utf8(metadata).map_err(|_| Error::Utf8 {
        what: format!("metadata of provider `{}`", ctx.name()),
    })?;

    let mut labels = selector_labels(ctx);
    labels.insert(label::PROVIDER_VERSION.into(), ctx.version().clone());

    let config_map = ConfigMap {
        type_meta: TypeMeta::default(),
        metadata: ObjectMeta {
            name: format_compact!("{}-{}", ctx.name(), ctx.version()),
            namespace: namespace.into(),
            labels,
        },
        data: BTreeMap::from([
            ("metadata".into(), metadata.into()),
            ("components".into(), components.to_yaml_stream()?.into()),
        ]),
    };

    let provider = ProviderRecord {
        type_meta: TypeMeta {
            api_version: apiversion::OperatorV1Alpha1,
            kind: ctx.ty().into(),
        },
        metadata: ObjectMeta {
            name: ctx.name().clone(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
        },
        spec: ProviderSpec {
            version: ctx.version().clone(),
            fetch_config: FetchConfig {
                selector: LabelSelector {
                    match_labels: selector_labels(ctx),
                },
            },
        },
    };

    Ok(Package {
        config_map,
        provider,
    })
}

impl Package {
    pub fn render_config_map(&self) -> Result<String> {
        Ok(yaml::ensure_newline(&yaml::to_string(&self.config_map)?))
    }

    pub fn render_provider(&self) -> Result<String> {
        Ok(yaml::ensure_newline(&yaml::to_string(&self.provider)?))
    }
}

pub fn render_rbac(rbac: &ResourceMap) -> Result<String> {
    Ok(yaml::ensure_newline(&rbac.to_yaml_stream()?))
}

/// `<type>-<name>.yaml`, relative to the providers directory.
pub fn config_map_file_name(ctx: &ProviderContext) -> String {
    format!("{}.yaml", ctx.qualified_name())
}

/// `<type>-<name>-provider.yaml`, relative to the providers directory.
pub fn provider_file_name(ctx: &ProviderContext) -> String {
    format!("{}-provider.yaml", ctx.qualified_name())
}

/// `0000_30_cluster-api-<type>-<name>_03_rbac.yaml`, relative to the manifests directory.
pub fn rbac_file_name(ctx: &ProviderContext) -> String {
    format!("0000_30_cluster-api-{}_03_rbac.yaml", ctx.qualified_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    const METADATA: &str = "apiVersion: clusterctl.cluster.x-k8s.io/v1alpha3\nkind: Metadata\n";

    fn aws() -> ProviderContext {
        ProviderContext::new("aws", ProviderType::Infrastructure, "v2.0.2")
    }

    fn components() -> ResourceMap {
        ResourceMap::from_yaml_stream(
            r#"
apiVersion: v1
kind: Service
metadata:
  name: capa-webhook-service
  namespace: openshift-cluster-api
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: capa-controller-manager
  namespace: openshift-cluster-api
"#,
        )
        .unwrap()
    }

    #[test]
    fn config_map_contents() {
        let package = package(&components(), &aws(), "openshift-cluster-api", METADATA.as_bytes())
            .unwrap();
        let cm = &package.config_map;

        assert_eq!(cm.metadata.name, "aws-v2.0.2");
        assert_eq!(cm.metadata.namespace, "openshift-cluster-api");
        assert_eq!(
            cm.metadata.labels,
            BTreeMap::from([
                ("provider.cluster.x-k8s.io/name".into(), "aws".into()),
                ("provider.cluster.x-k8s.io/type".into(), "infrastructure".into()),
                ("provider.cluster.x-k8s.io/version".into(), "v2.0.2".into()),
            ])
        );
        assert_eq!(cm.data["metadata"], METADATA);

        let components = &cm.data["components"];
        assert_eq!(components.matches("\n---\n").count(), 1);
        assert!(!components.ends_with('\n'));

        let reparsed = ResourceMap::from_yaml_stream(components).unwrap();
        assert_eq!(reparsed, self::components());
    }

    #[test]
    fn provider_record() {
        let package = package(&components(), &aws(), "openshift-cluster-api", METADATA.as_bytes())
            .unwrap();
        let rendered = package.render_provider().unwrap();
        assert_eq!(
            rendered,
            r#"apiVersion: operator.cluster.x-k8s.io/v1alpha1
kind: InfrastructureProvider
metadata:
  name: aws
  namespace: openshift-cluster-api
spec:
  version: v2.0.2
  fetchConfig:
    selector:
      matchLabels:
        provider.cluster.x-k8s.io/name: aws
        provider.cluster.x-k8s.io/type: infrastructure
"#
        );
    }

    #[test]
    fn provider_kind_per_type() {
        for (ty, kind) in [
            (ProviderType::Core, "CoreProvider"),
            (ProviderType::ControlPlane, "ControlPlaneProvider"),
            (ProviderType::Bootstrap, "BootstrapProvider"),
            (ProviderType::Infrastructure, "InfrastructureProvider"),
        ] {
            let ctx = ProviderContext::new("p", ty, "v1");
            let package = package(&ResourceMap::default(), &ctx, "ns", b"").unwrap();
            assert!(
                package
                    .render_provider()
                    .unwrap()
                    .contains(&format!("kind: {kind}\n"))
            );
        }
    }

    #[test]
    fn rendered_config_map_round_trips() {
        let package = package(&components(), &aws(), "openshift-cluster-api", METADATA.as_bytes())
            .unwrap();
        let rendered = package.render_config_map().unwrap();
        assert!(rendered.starts_with("apiVersion: v1\nkind: ConfigMap\n"), "{rendered}");
        assert!(rendered.ends_with('\n') && !rendered.ends_with("\n\n"));

        let parsed: ConfigMap = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed, package.config_map);
    }

    #[test]
    fn metadata_must_be_utf8() {
        let err = package(&components(), &aws(), "ns", &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::Utf8 { .. }), "{err}");
    }

    #[test]
    fn file_names_are_lowercase() {
        let ctx = ProviderContext::new("OpenStack", ProviderType::Infrastructure, "v0.7.1");
        assert_eq!(config_map_file_name(&ctx), "infrastructure-openstack.yaml");
        assert_eq!(provider_file_name(&ctx), "infrastructure-openstack-provider.yaml");
        assert_eq!(
            rbac_file_name(&ctx),
            "0000_30_cluster-api-infrastructure-openstack_03_rbac.yaml"
        );
    }

    #[test]
    fn empty_rbac_renders_single_newline() {
        assert_eq!(render_rbac(&ResourceMap::default()).unwrap(), "\n");
    }
}
