//! Substitution keys for the container images a provider ships.

use std::collections::BTreeMap;

use compact_str::format_compact;
use indexmap::IndexMap;

use crate::{
    error::Result,
    manifest::Str,
    provider::ProviderContext,
    resmap::ResourceMap,
    resource::{Deployment, Kind},
    yaml::ensure_newline,
};

/// The last path segment of an image reference with any digest and tag removed.
///
/// `registry.k8s.io/cluster-api/cluster-api-controller:v1.4.0` becomes
/// `cluster-api-controller`.
pub fn bare_image_name(image: &str) -> &str {
    let name = image.rsplit('/').next().unwrap_or(image);
    let name = name.split_once('@').map_or(name, |(name, _digest)| name);
    name.split_once(':').map_or(name, |(name, _tag)| name)
}

/// Maps an image to the key the release tooling substitutes it under.
///
/// The provider name keeps its case; only file names are lower-cased.
pub fn image_key(ctx: &ProviderContext, image: &str) -> Str {
    let (ty, provider) = (ctx.ty().type_name(), ctx.name());
    match bare_image_name(image) {
        "kube-rbac-proxy" => "kube-rbac-proxy".into(),
        name @ "ip-address-manager" => format_compact!("{ty}-{provider}:{name}"),
        _ => format_compact!("{ty}-{provider}:manager"),
    }
}

/// Keys every container image of every Deployment. Later containers win on key collisions.
#[tracing::instrument(skip_all, fields(provider = %ctx.name()))]
pub fn derive_keys(resources: &ResourceMap, ctx: &ProviderContext) -> Result<IndexMap<Str, Str>> {
    let mut keys = IndexMap::new();
    for resource in resources.iter() {
        if resource.kind() != Kind::Deployment {
            continue;
        }

        let deployment = resource.decode::<Deployment>()?;
        for container in deployment.spec.template.spec.containers {
            let key = image_key(ctx, &container.image);
            tracing::debug!(%key, image = %container.image, "keyed image");
            keys.insert(key, container.image);
        }
    }

    Ok(keys)
}

/// Image key to full image reference, accumulated across providers and runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCatalog(BTreeMap<String, String>);

impl ImageCatalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    /// Two-space indented JSON with sorted keys and a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        Ok(ensure_newline(&serde_json::to_string_pretty(&self.0)?))
    }

    /// Overwrites existing keys and adds new ones. Keys are never removed.
    pub fn merge(mut self, keys: IndexMap<Str, Str>) -> Self {
        self.0.extend(
            keys.into_iter()
                .map(|(key, image)| (key.into_string(), image.into_string())),
        );
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
