//! Imports Cluster API provider releases as platform release assets.
//!
//! Each provider's upstream components are moved into the target namespace, switched from
//! cert-manager to the platform service CA, split into an RBAC manifest and a component config
//! map, and packaged with an activation record for the cluster operator.

pub mod config;
pub mod error;
mod fieldspec;
pub mod images;
pub mod manifest;
pub mod package;
pub mod pipeline;
pub mod provider;
pub mod resmap;
pub mod resource;
mod serde_ex;
pub mod source;
pub mod transform;
pub mod versions;
pub mod yaml;

pub use self::config::{Config, ProviderConfig};
pub use self::error::{Error, IntegrityError, Result};
pub use self::images::ImageCatalog;
pub use self::pipeline::{Outcome, OutputFile, Pipeline, import_providers};
pub use self::provider::{ProviderContext, ProviderType};
pub use self::resmap::ResourceMap;
pub use self::resource::{Kind, ResId, Resource};
pub use self::source::{ComponentSource, LocalRepository, Release};
pub use self::versions::VersionCatalog;
