//! Per-provider import: the pure transformation from an upstream release to rendered release
//! assets, and the driver that reads inputs and commits outputs for every configured provider.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use crate::{
    config::{Config, ProviderConfig},
    error::{Error, Result},
    images::{self, ImageCatalog},
    package,
    provider::ProviderContext,
    resmap::ResourceMap,
    source::{LocalRepository, Release},
    transform::{
        ComponentFilter, ProviderLabelTransformer, ServiceCaTransformer,
        TargetNamespaceTransformer, Transformer, split_rbac,
    },
    versions::VersionCatalog,
};

/// A rendered file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub files: Vec<OutputFile>,
    pub catalog: ImageCatalog,
    pub components: usize,
    pub rbac: usize,
    pub dropped: usize,
}

pub struct Pipeline<'a> {
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Runs every stage over one provider's release. Nothing is written, the outcome holds the
    /// rendered component config map, activation record, RBAC manifest and the updated image
    /// catalog.
    #[tracing::instrument(skip_all, fields(provider = %ctx.name(), version = %ctx.version()))]
    pub fn run(
        &self,
        provider: &ProviderConfig,
        ctx: &ProviderContext,
        release: &Release,
        catalog: ImageCatalog,
    ) -> Result<Outcome> {
        let mut resources = ResourceMap::from_yaml_stream(&release.components)?;
        let total = resources.len();

        TargetNamespaceTransformer(self.config.target_namespace.clone())
            .transform(&mut resources)?;
        ProviderLabelTransformer::new(ctx).transform(&mut resources)?;
        ServiceCaTransformer::default().transform(&mut resources)?;

        let (mut components, rbac) = split_rbac(resources, &self.config.annotator());
        if let Some(exclusion) = &provider.exclude {
            ComponentFilter::new(exclusion.clone()).transform(&mut components)?;
        }

        let catalog = catalog.merge(images::derive_keys(&components, ctx)?);
        let package =
            package::package(&components, ctx, &self.config.target_namespace, &release.metadata)?;

        let files = vec![
            OutputFile {
                path: self
                    .config
                    .providers_dir
                    .join(package::config_map_file_name(ctx)),
                contents: package.render_config_map()?,
            },
            OutputFile {
                path: self
                    .config
                    .providers_dir
                    .join(package::provider_file_name(ctx)),
                contents: package.render_provider()?,
            },
            OutputFile {
                path: self.config.manifests_dir.join(package::rbac_file_name(ctx)),
                contents: package::render_rbac(&rbac)?,
            },
            OutputFile {
                path: self.config.image_catalog.clone(),
                contents: catalog.to_json()?,
            },
        ];

        Ok(Outcome {
            files,
            catalog,
            components: components.len(),
            rbac: rbac.len(),
            dropped: total - components.len() - rbac.len(),
        })
    }
}

/// Imports every configured provider, or only `only`, from a local release mirror into `root`.
///
/// Providers are processed in order. A provider's files are written only once all of them have
/// been rendered, and the first failure stops the run.
pub async fn import_providers(
    config: &Config,
    mirror: &Path,
    root: &Path,
    only: Option<&str>,
) -> anyhow::Result<Vec<Outcome>> {
    let providers = config.providers(only).collect::<Vec<_>>();
    if providers.is_empty() {
        bail!("no provider named `{}` is configured", only.unwrap_or_default());
    }

    let versions_path = root.join(&config.version_catalog);
    let versions = VersionCatalog::from_slice(&read(&versions_path).await?)
        .with_context(|| format!("failed to parse {}", versions_path.display()))?;

    let pipeline = Pipeline::new(config);
    let mut outcomes = Vec::with_capacity(providers.len());
    for provider in providers {
        let version = versions.version_of(&provider.name)?;
        let ctx = provider.context(version.clone());
        tracing::info!(provider = %ctx.name(), ty = %ctx.ty(), version = %ctx.version(), "importing");

        let repo = LocalRepository::new(mirror, &ctx);
        let release = Release::fetch(&repo, version)
            .await
            .with_context(|| format!("failed to fetch {} {}", ctx.manifest_label(), version))?;

        let catalog = load_catalog(&root.join(&config.image_catalog)).await?;
        let outcome = pipeline
            .run(provider, &ctx, &release, catalog)
            .with_context(|| format!("failed to import provider `{}`", ctx.name()))?;

        commit(root, &outcome.files).await?;
        tracing::info!(
            provider = %ctx.name(),
            components = outcome.components,
            rbac = outcome.rbac,
            dropped = outcome.dropped,
            "imported"
        );
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// A missing catalog is an empty one, it is created on first commit.
async fn load_catalog(path: &Path) -> anyhow::Result<ImageCatalog> {
    match tokio::fs::read(path).await {
        Ok(bytes) => ImageCatalog::from_slice(&bytes)
            .with_context(|| format!("failed to parse {}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ImageCatalog::default()),
        Err(source) => Err(Error::Read {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}

async fn commit(root: &Path, files: &[OutputFile]) -> anyhow::Result<()> {
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(&path, &file.contents)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote");
    }
    Ok(())
}
