use compact_str::CompactString;
use serde::{Deserialize, Serialize};

pub type Str = CompactString;

/// The `apiVersion`/`kind` header of an object this crate emits. Flattened into the object
/// it heads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta<V, K> {
    pub api_version: V,
    pub kind: K,
}

impl<V, K> Default for TypeMeta<V, K>
where
    V: Default,
    K: Default,
{
    fn default() -> Self {
        Self {
            api_version: V::default(),
            kind: K::default(),
        }
    }
}

pub mod kind {
    use super::define_symbol;

    define_symbol!(ConfigMap = "ConfigMap");
}

pub mod apiversion {
    use super::define_symbol;

    define_symbol!(V1 = "v1");
    define_symbol!(OperatorV1Alpha1 = "operator.cluster.x-k8s.io/v1alpha1");
}

/// Well-known annotation and label keys.
pub mod annotation {
    pub const INJECT_CA_FROM: &str = "cert-manager.io/inject-ca-from";
    pub const INJECT_CABUNDLE: &str = "service.beta.openshift.io/inject-cabundle";
    pub const SERVING_CERT_SECRET_NAME: &str = "service.beta.openshift.io/serving-cert-secret-name";
}

pub mod label {
    pub const PROVIDER_NAME: &str = "provider.cluster.x-k8s.io/name";
    pub const PROVIDER_TYPE: &str = "provider.cluster.x-k8s.io/type";
    pub const PROVIDER_VERSION: &str = "provider.cluster.x-k8s.io/version";
    pub const CLUSTER_PROVIDER: &str = "cluster.x-k8s.io/provider";
    pub const CLUSTERCTL: &str = "clusterctl.cluster.x-k8s.io";
}

macro_rules! define_symbol {
    ($name:ident = $value:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[allow(non_camel_case_types)]
        pub struct $name;

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", $value)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", $value)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str($value)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value: $crate::manifest::Str = ::serde::Deserialize::deserialize(deserializer)?;
                if value == $value {
                    Ok($name)
                } else {
                    Err(serde::de::Error::custom(format!(
                        "expected `{}`, found `{value}`",
                        $value
                    )))
                }
            }
        }

    };
}

use define_symbol;
