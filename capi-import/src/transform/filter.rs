use regex::Regex;
use serde::Deserialize;

use crate::{error::Result, manifest::Str, resmap::ResourceMap, resource::Kind};

use super::Transformer;

/// Which objects of a provider to leave out, matched against `metadata.name`. Written as
/// `contains: <substring>` (case-insensitive) or `pattern: <regex>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawExclusion")]
pub enum Exclusion {
    Contains(Str),
    Pattern(Regex),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExclusion {
    #[serde(default)]
    contains: Option<Str>,
    #[serde(default, with = "crate::serde_ex::regex::option")]
    pattern: Option<Regex>,
}

impl TryFrom<RawExclusion> for Exclusion {
    type Error = &'static str;

    fn try_from(raw: RawExclusion) -> Result<Self, Self::Error> {
        match (raw.contains, raw.pattern) {
            (Some(needle), None) => Ok(Exclusion::Contains(needle)),
            (None, Some(pattern)) => Ok(Exclusion::Pattern(pattern)),
            _ => Err("exclusion needs exactly one of `contains` or `pattern`"),
        }
    }
}

impl Exclusion {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Exclusion::Contains(needle) => name
                .to_lowercase()
                .contains(needle.to_lowercase().as_str()),
            Exclusion::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

/// Drops the objects matched by an exclusion. CustomResourceDefinitions are always kept since
/// other providers may still serve them.
#[derive(Debug, Clone)]
pub struct ComponentFilter {
    exclusion: Exclusion,
}

impl ComponentFilter {
    pub fn new(exclusion: Exclusion) -> Self {
        Self { exclusion }
    }
}

impl Transformer for ComponentFilter {
    #[tracing::instrument(skip_all, name = "component_filter")]
    fn transform(&mut self, resources: &mut ResourceMap) -> Result<()> {
        resources.retain(|resource| {
            if resource.kind() == Kind::CustomResourceDefinition
                || !self.exclusion.matches(resource.name())
            {
                return true;
            }

            tracing::debug!(id = %resource.id(), "excluded");
            false
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: ipaddresses.ipam.metal3.io
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: ipam-controller-manager
  namespace: capm3-system
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: capm3-controller-manager
  namespace: capm3-system
---
apiVersion: v1
kind: Service
metadata:
  name: IPAM-webhook-service
  namespace: capm3-system
"#;

    fn names(resources: &ResourceMap) -> Vec<&str> {
        resources.iter().map(|r| r.name().as_str()).collect()
    }

    #[test]
    fn contains_is_case_insensitive_and_keeps_crds() {
        let mut resources = ResourceMap::from_yaml_stream(INPUT).unwrap();
        ComponentFilter::new(Exclusion::Contains("ipam".into()))
            .transform(&mut resources)
            .unwrap();
        assert_eq!(
            names(&resources),
            ["ipaddresses.ipam.metal3.io", "capm3-controller-manager"]
        );
    }

    #[test]
    fn pattern_exclusion() {
        let mut resources = ResourceMap::from_yaml_stream(INPUT).unwrap();
        ComponentFilter::new(Exclusion::Pattern(Regex::new("^capm3-").unwrap()))
            .transform(&mut resources)
            .unwrap();
        assert_eq!(resources.len(), 3);
        assert!(!names(&resources).contains(&"capm3-controller-manager"));
    }

    #[test]
    fn deserialize_exclusion() {
        let exclusion: Exclusion = serde_yaml::from_str("contains: ipam").unwrap();
        assert!(exclusion.matches("metal3-IPAM-manager"));

        let exclusion: Exclusion = serde_yaml::from_str("pattern: '^ipam-.*$'").unwrap();
        assert!(exclusion.matches("ipam-controller"));
        assert!(!exclusion.matches("capm3-ipam"));

        assert!(serde_yaml::from_str::<Exclusion>("pattern: '('").is_err());
        assert!(serde_yaml::from_str::<Exclusion>("{}").is_err());
        assert!(serde_yaml::from_str::<Exclusion>("{contains: a, pattern: b}").is_err());
    }
}
