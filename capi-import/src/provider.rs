use core::fmt;

use compact_str::format_compact;
use serde::{Deserialize, Serialize};

use crate::manifest::Str;

/// The four kinds of Cluster API provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Core,
    ControlPlane,
    Bootstrap,
    Infrastructure,
}

impl ProviderType {
    /// Name used in labels, image keys and file names.
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderType::Core => "core",
            ProviderType::ControlPlane => "controlplane",
            ProviderType::Bootstrap => "bootstrap",
            ProviderType::Infrastructure => "infrastructure",
        }
    }

    /// Prefix of the upstream manifest label and components file name.
    pub fn manifest_prefix(&self) -> &'static str {
        match self {
            ProviderType::Core => "core",
            ProviderType::ControlPlane => "control-plane",
            ProviderType::Bootstrap => "bootstrap",
            ProviderType::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Identity of the provider being imported. Fixed for the duration of one provider's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderContext {
    name: Str,
    ty: ProviderType,
    version: Str,
}

impl ProviderContext {
    pub fn new(name: impl Into<Str>, ty: ProviderType, version: impl Into<Str>) -> Self {
        Self {
            name: name.into(),
            ty,
            version: version.into(),
        }
    }

    pub fn name(&self) -> &Str {
        &self.name
    }

    pub fn ty(&self) -> ProviderType {
        self.ty
    }

    pub fn version(&self) -> &Str {
        &self.version
    }

    /// `<type>-<name>`, the stem of every file written for this provider.
    pub fn qualified_name(&self) -> Str {
        format_compact!("{}-{}", self.ty.type_name(), self.name).to_lowercase().into()
    }

    /// The label clusterctl stamps on every object of the provider, e.g. `infrastructure-aws`.
    pub fn manifest_label(&self) -> Str {
        match self.ty {
            ProviderType::Core => "cluster-api".into(),
            ty => format_compact!("{}-{}", ty.manifest_prefix(), self.name),
        }
    }

    /// Upstream components file name, e.g. `infrastructure-components.yaml`.
    pub fn components_file(&self) -> Str {
        format_compact!("{}-components.yaml", self.ty.manifest_prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_per_provider_type() {
        let core = ProviderContext::new("cluster-api", ProviderType::Core, "v1.4.0");
        assert_eq!(core.qualified_name(), "core-cluster-api");
        assert_eq!(core.manifest_label(), "cluster-api");
        assert_eq!(core.components_file(), "core-components.yaml");

        let kcp = ProviderContext::new("kubeadm", ProviderType::ControlPlane, "v1.4.0");
        assert_eq!(kcp.qualified_name(), "controlplane-kubeadm");
        assert_eq!(kcp.manifest_label(), "control-plane-kubeadm");
        assert_eq!(kcp.components_file(), "control-plane-components.yaml");

        let aws = ProviderContext::new("AWS", ProviderType::Infrastructure, "v2.0.2");
        assert_eq!(aws.qualified_name(), "infrastructure-aws");
    }

    #[test]
    fn provider_type_deserializes_from_type_name() {
        for ty in [
            ProviderType::Core,
            ProviderType::ControlPlane,
            ProviderType::Bootstrap,
            ProviderType::Infrastructure,
        ] {
            let parsed: ProviderType = serde_yaml::from_str(ty.type_name()).unwrap();
            assert_eq!(parsed, ty);
        }
    }
}
