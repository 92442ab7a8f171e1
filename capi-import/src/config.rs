use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    manifest::Str,
    provider::{ProviderContext, ProviderType},
    transform::{Exclusion, ReleaseAnnotator},
    yaml,
};

const DEFAULT: &str = include_str!("config/default.yaml");

/// Import settings. Paths are relative to the output root.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub target_namespace: Str,
    pub providers_dir: PathBuf,
    pub manifests_dir: PathBuf,
    pub image_catalog: PathBuf,
    pub version_catalog: PathBuf,
    /// Annotations stamped on RBAC objects. The release annotation set when absent.
    #[serde(default)]
    pub platform_annotations: Option<IndexMap<Str, Str>>,
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderConfig {
    pub name: Str,
    #[serde(rename = "type")]
    pub ty: ProviderType,
    #[serde(default)]
    pub exclude: Option<Exclusion>,
}

impl ProviderConfig {
    pub fn context(&self, version: impl Into<Str>) -> ProviderContext {
        ProviderContext::new(self.name.clone(), self.ty, version)
    }
}

impl Config {
    /// The upstream provider list and the paths of the release repository layout.
    pub fn builtin() -> &'static Self {
        static INSTANCE: OnceLock<Config> = OnceLock::new();
        INSTANCE.get_or_init(|| yaml::from_str(DEFAULT).expect("builtin config"))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(yaml::from_slice(&bytes)?)
    }

    pub fn annotator(&self) -> ReleaseAnnotator {
        match &self.platform_annotations {
            Some(annotations) => ReleaseAnnotator::new(annotations.clone()),
            None => ReleaseAnnotator::default(),
        }
    }

    /// Providers to import, narrowed to `only` when given.
    pub fn providers<'a>(
        &'a self,
        only: Option<&'a str>,
    ) -> impl Iterator<Item = &'a ProviderConfig> + 'a {
        self.providers
            .iter()
            .filter(move |provider| only.is_none_or(|name| provider.name == name))
    }
}
