mod kind;
mod typed;
mod view;

use std::fmt;
use std::ops::Deref;

use compact_str::format_compact;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub use self::kind::Kind;
pub use self::typed::{
    Certificate, ClientConfig, Container, CustomResourceDefinition, Deployment, ServiceReference,
    WebhookConfiguration,
};
pub use self::view::{
    AnnotationsView, AnnotationsViewMut, LabelsView, LabelsViewMut, MetadataView, MetadataViewMut,
};

use crate::{
    error::{Error, Result},
    manifest::Str,
};

pub type Object = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gvk {
    pub group: Str,
    pub version: Str,
    pub kind: Str,
}

impl Gvk {
    pub fn api_version(&self) -> Str {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format_compact!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.kind, self.version)
        } else {
            write!(f, "{}.{}.{}", self.kind, self.version, self.group)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct GvkMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Str>,
}

impl fmt::Display for GvkMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = &self.kind {
            write!(f, "{kind}.")?;
        }

        if let Some(version) = &self.version {
            write!(f, "{version}.")?;
        }

        if let Some(group) = &self.group {
            write!(f, "{group}")
        } else {
            write!(f, "*")
        }
    }
}

impl GvkMatcher {
    pub fn matches(&self, gvk: &Gvk) -> bool {
        (self.group.is_none() || self.group.as_ref() == Some(&gvk.group))
            && (self.version.is_none() || self.version.as_ref() == Some(&gvk.version))
            && (self.kind.is_none() || self.kind.as_ref() == Some(&gvk.kind))
    }
}

/// Identity of an object within one set: group/version/kind, namespace and name.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ResId {
    pub gvk: Gvk,
    pub name: Str,
    pub namespace: Option<Str>,
}

impl Deref for ResId {
    type Target = Gvk;

    fn deref(&self) -> &Self::Target {
        &self.gvk
    }
}

impl fmt::Debug for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for ResId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{}/{}.{namespace}", self.gvk, self.name)?;
        } else {
            write!(f, "{}/{}", self.gvk, self.name)?;
        }
        Ok(())
    }
}

/// A schemaless Kubernetes object. `root` holds every field except `apiVersion` and `kind`,
/// which live in the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    id: ResId,
    root: Object,
}

impl Resource {
    pub fn new(id: ResId, mut root: Object) -> Self {
        root.shift_remove("apiVersion");
        root.shift_remove("kind");
        let mut resource = Resource { id, root };
        let name = resource.id.name.to_string();
        let namespace = resource.id.namespace.clone();
        let mut metadata = resource.make_metadata_mut();
        metadata.set_name(name);
        metadata.set_namespace(namespace.as_deref());
        resource
    }

    pub fn id(&self) -> &ResId {
        &self.id
    }

    pub fn name(&self) -> &Str {
        &self.id.name
    }

    pub fn namespace(&self) -> Option<&Str> {
        self.id.namespace.as_ref()
    }

    pub fn gvk(&self) -> &Gvk {
        &self.id.gvk
    }

    /// The raw kind string.
    pub fn kind_name(&self) -> &Str {
        &self.id.kind
    }

    /// The closed kind tag the pipeline dispatches on.
    pub fn kind(&self) -> Kind {
        Kind::from(self.id.kind.as_str())
    }

    pub fn root(&self) -> &Object {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Object {
        &mut self.root
    }

    /// Moves the object into `namespace` (or out of any namespace). This is an identity change,
    /// so callers holding the object in a `ResourceMap` must re-insert it.
    pub fn set_namespace(&mut self, namespace: Option<Str>) {
        self.make_metadata_mut().set_namespace(namespace.as_deref());
        self.id.namespace = namespace;
    }

    /// Decodes the object into the typed shape of its kind.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::Value::Object(self.root.clone());
        serde_json::from_value(value).map_err(|source| Error::Decode {
            id: self.id.clone(),
            source,
        })
    }
}

impl Serialize for Resource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.root.len() + 2))?;
        map.serialize_entry("apiVersion", &self.id.gvk.api_version())?;
        map.serialize_entry("kind", &self.id.kind)?;
        for (key, value) in &self.root {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let mut root = Object::deserialize(deserializer)
            .map_err(|err| D::Error::custom(format!("parsing resource: {err}")))?;

        let api_version = take_string(&mut root, "apiVersion").map_err(D::Error::custom)?;
        let kind = take_string(&mut root, "kind").map_err(D::Error::custom)?;

        let metadata = root
            .get("metadata")
            .and_then(|v| v.as_object())
            .ok_or_else(|| D::Error::custom("parsing resource: missing object `metadata`"))?;
        let name = metadata
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| D::Error::custom("parsing resource: missing string `metadata.name`"))?
            .into();
        let namespace = metadata
            .get("namespace")
            .and_then(|v| v.as_str())
            .filter(|ns| !ns.is_empty())
            .map(Str::from);

        let (group, version) = api_version
            .split_once('/')
            .map_or(("".into(), api_version.clone()), |(g, v)| {
                (g.into(), v.into())
            });

        let id = ResId {
            gvk: Gvk {
                group,
                version,
                kind,
            },
            name,
            namespace,
        };

        Ok(Resource::new(id, root))
    }
}

fn take_string(root: &mut Object, key: &str) -> Result<Str, String> {
    match root.shift_remove(key) {
        Some(serde_json::Value::String(value)) => Ok(value.into()),
        Some(_) => Err(format!("parsing resource: `{key}` must be a string")),
        None => Err(format!("parsing resource: missing field `{key}`")),
    }
}
