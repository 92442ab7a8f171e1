use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    manifest::Str,
};

/// Pinned upstream version of every provider, read from a JSON object of name to version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct VersionCatalog {
    versions: BTreeMap<Str, Str>,
}

impl VersionCatalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn version_of(&self, provider: &str) -> Result<&Str> {
        self.versions
            .get(provider)
            .filter(|version| !version.is_empty())
            .ok_or_else(|| Error::MissingVersion(provider.into()))
    }
}
