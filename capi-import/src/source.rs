//! Where upstream provider releases are read from.

use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    provider::ProviderContext,
};

/// A provider's release repository.
#[async_trait::async_trait]
pub trait ComponentSource: Send + Sync {
    /// Reads `path` from the release tagged `version`.
    async fn get_file(&self, version: &str, path: &str) -> Result<Vec<u8>>;

    /// Path of the components manifest within a release.
    fn components_path(&self) -> &str;
}

/// A mirror of provider releases on disk, laid out as `<root>/<manifest-label>/<version>/<file>`.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    dir: PathBuf,
    components_path: String,
}

impl LocalRepository {
    pub fn new(root: impl AsRef<Path>, ctx: &ProviderContext) -> Self {
        Self {
            dir: root.as_ref().join(ctx.manifest_label().as_str()),
            components_path: ctx.components_file().into(),
        }
    }
}

#[async_trait::async_trait]
impl ComponentSource for LocalRepository {
    async fn get_file(&self, version: &str, path: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(version).join(path);
        tracing::debug!(path = %path.display(), "reading");
        tokio::fs::read(&path)
            .await
            .map_err(|source| Error::Read { path, source })
    }

    fn components_path(&self) -> &str {
        &self.components_path
    }
}

/// The raw upstream files one provider import starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub metadata: Vec<u8>,
    pub components: String,
}

impl Release {
    pub async fn fetch(source: &dyn ComponentSource, version: &str) -> Result<Self> {
        let metadata = source.get_file(version, "metadata.yaml").await?;
        let components = source.get_file(version, source.components_path()).await?;
        let components = String::from_utf8(components).map_err(|_| Error::Utf8 {
            what: source.components_path().to_owned(),
        })?;
        Ok(Self {
            metadata,
            components,
        })
    }
}
