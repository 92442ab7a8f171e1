use core::fmt;

use indexmap::{IndexMap, map::Entry};
use serde::Deserialize;

use crate::{
    error::Result,
    resource::{ResId, Resource},
};

/// An insertion-ordered set of resources keyed by identity.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    resources: IndexMap<ResId, Resource>,
}

impl fmt::Debug for ResourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.resources.keys()).finish()
    }
}

impl ResourceMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            resources: IndexMap::with_capacity(capacity),
        }
    }

    /// Parses a multi-document YAML stream. Empty documents are skipped.
    pub fn from_yaml_stream(input: &str) -> Result<Self> {
        let mut resources = ResourceMap::default();
        for document in serde_yaml::Deserializer::from_str(input) {
            let value = serde_yaml::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }
            let resource = serde_yaml::from_value::<Resource>(value)?;
            resources.insert(resource)?;
        }
        Ok(resources)
    }

    /// Renders the resources as a multi-document YAML stream, documents separated by `---`.
    /// The result has no trailing newline.
    pub fn to_yaml_stream(&self) -> Result<String> {
        let mut out = String::new();
        for (i, resource) in self.iter().enumerate() {
            if i > 0 {
                out.push_str("\n---\n");
            }
            let document = serde_yaml::to_string(resource)?;
            out.push_str(document.trim_end_matches('\n'));
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn insert(&mut self, resource: Resource) -> Result<(), Conflict> {
        match self.resources.entry(resource.id().clone()) {
            Entry::Occupied(_) => Err(Conflict {
                id: resource.id().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(resource);
                Ok(())
            }
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Resource> + DoubleEndedIterator {
        self.resources.values()
    }

    pub fn iter_mut(
        &mut self,
    ) -> impl ExactSizeIterator<Item = &mut Resource> + DoubleEndedIterator {
        self.resources.values_mut()
    }

    /// Keeps only the resources for which `f` returns true, preserving order.
    pub fn retain(&mut self, mut f: impl FnMut(&Resource) -> bool) {
        self.resources.retain(|_, resource| f(resource));
    }

    /// Splits the map in two, preserving relative order on both sides. Resources for which `f`
    /// returns true end up in the second map.
    pub fn partition(self, mut f: impl FnMut(&Resource) -> bool) -> (ResourceMap, ResourceMap) {
        let (right, left): (IndexMap<_, _>, IndexMap<_, _>) = self
            .resources
            .into_iter()
            .partition(|(_, resource)| f(resource));
        (ResourceMap { resources: left }, ResourceMap { resources: right })
    }
}

impl IntoIterator for ResourceMap {
    type Item = Resource;
    type IntoIter = indexmap::map::IntoValues<ResId, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.into_values()
    }
}

impl<'a> IntoIterator for &'a ResourceMap {
    type Item = &'a Resource;
    type IntoIter = indexmap::map::Values<'a, ResId, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.values()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub id: ResId,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "may not add resource with an already registered id `{}`",
            self.id
        )
    }
}

impl std::error::Error for Conflict {}
