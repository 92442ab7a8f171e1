mod builtin;

use core::fmt;
use std::{ops::Deref, str::FromStr};

pub use self::builtin::Builtin;

use crate::{
    error::{Error, Result},
    manifest::Str,
    resource::{GvkMatcher, Object, Resource},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Locates a field inside every resource matching `matcher`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(flatten)]
    pub matcher: GvkMatcher,
    #[serde(with = "crate::serde_ex::string")]
    pub path: FieldPath,
}

#[derive(Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Box<[FieldPathSegment]>,
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#""{self}""#)
    }
}

impl Deref for FieldPath {
    type Target = [FieldPathSegment];

    fn deref(&self) -> &Self::Target {
        &self.segments
    }
}

pub type PathRef<'a> = &'a [FieldPathSegment];

impl FromStr for FieldPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("path cannot be empty".into());
        }

        let segments = s
            .split('/')
            .map(|segment| segment.parse::<FieldPathSegment>())
            .collect::<Result<Box<_>, _>>()?;

        Ok(FieldPath { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPathSegment {
    Field(Str),
    Array(Str),
}

impl fmt::Display for FieldPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPathSegment::Field(field) => write!(f, "{field}"),
            FieldPathSegment::Array(field) => write!(f, "{field}[]"),
        }
    }
}

impl FromStr for FieldPathSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, array) = match s.strip_suffix("[]") {
            Some(name) => (name, true),
            None => (s, false),
        };

        if name.is_empty() {
            return Err(format!("empty field path segment `{s}`"));
        }

        if array {
            Ok(FieldPathSegment::Array(name.into()))
        } else {
            Ok(FieldPathSegment::Field(name.into()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSpecs {
    specs: Vec<FieldSpec>,
}

impl Deref for FieldSpecs {
    type Target = [FieldSpec];

    fn deref(&self) -> &Self::Target {
        &self.specs
    }
}

impl FieldSpecs {
    pub fn apply<T: JsonValue>(
        &self,
        resource: &mut Resource,
        mut f: impl FnMut(&mut T) -> Result<()>,
    ) -> Result<()> {
        for spec in &self.specs {
            spec.apply(resource, &mut f)?;
        }

        Ok(())
    }
}

impl FieldSpec {
    /// Calls `f` on every value found at the spec's path. Missing fields are skipped, never
    /// created.
    pub fn apply<T>(
        &self,
        resource: &mut Resource,
        f: &mut impl FnMut(&mut T) -> Result<()>,
    ) -> Result<()>
    where
        T: JsonValue,
    {
        if !self.matcher.matches(resource.gvk()) {
            return Ok(());
        }

        fn go<T>(
            curr: &mut Object,
            path: PathRef<'_>,
            f: &mut impl FnMut(&mut T) -> Result<()>,
        ) -> Result<(), Walk>
        where
            T: JsonValue,
        {
            let Some((segment, rest)) = path.split_first() else {
                return Ok(());
            };

            match segment {
                FieldPathSegment::Field(field) => {
                    let Some(val) = curr.get_mut(field.as_str()) else {
                        return Ok(());
                    };

                    if rest.is_empty() {
                        let val = T::try_as_mut(val).map_err(|expected| Walk::Shape {
                            field: field.clone(),
                            expected,
                        })?;
                        return f(val).map_err(Walk::Callback);
                    }

                    match val {
                        Value::Null => Ok(()),
                        Value::Object(obj) => go(obj, rest, f),
                        _ => Err(Walk::Shape {
                            field: field.clone(),
                            expected: "an object",
                        }),
                    }
                }
                FieldPathSegment::Array(field) => match curr.get_mut(field.as_str()) {
                    None | Some(Value::Null) => Ok(()),
                    Some(Value::Array(seq)) => {
                        for item in seq {
                            if rest.is_empty() {
                                let item = T::try_as_mut(item).map_err(|expected| Walk::Shape {
                                    field: field.clone(),
                                    expected,
                                })?;
                                f(item).map_err(Walk::Callback)?;
                                continue;
                            }

                            match item {
                                Value::Object(obj) => go(obj, rest, f)?,
                                _ => {
                                    return Err(Walk::Shape {
                                        field: field.clone(),
                                        expected: "a sequence of objects",
                                    });
                                }
                            }
                        }
                        Ok(())
                    }
                    Some(_) => Err(Walk::Shape {
                        field: field.clone(),
                        expected: "a sequence",
                    }),
                },
            }
        }

        let id = resource.id().clone();
        go(resource.root_mut(), &self.path, f).map_err(|walk| match walk {
            Walk::Callback(err) => err,
            Walk::Shape { field, expected } => Error::malformed(
                &id,
                format!("expected {expected} at `{field}` of field path `{}`", self.path),
            ),
        })
    }
}

enum Walk {
    Shape { field: Str, expected: &'static str },
    Callback(Error),
}

pub trait JsonValue {
    fn try_as_mut(value: &mut Value) -> Result<&mut Self, &'static str>;
}

impl JsonValue for Value {
    fn try_as_mut(value: &mut Value) -> Result<&mut Self, &'static str> {
        Ok(value)
    }
}

impl JsonValue for Object {
    fn try_as_mut(value: &mut Value) -> Result<&mut Self, &'static str> {
        match value {
            Value::Object(obj) => Ok(obj),
            _ => Err("an object"),
        }
    }
}

impl JsonValue for String {
    fn try_as_mut(value: &mut Value) -> Result<&mut Self, &'static str> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err("a string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: &str, path: &str) -> FieldSpec {
        FieldSpec {
            matcher: GvkMatcher {
                group: None,
                version: None,
                kind: Some(kind.into()),
            },
            path: path.parse().unwrap(),
        }
    }

    fn webhook() -> Resource {
        serde_yaml::from_str(
            r#"
apiVersion: admissionregistration.k8s.io/v1
kind: MutatingWebhookConfiguration
metadata:
  name: capi-mutating-webhook-configuration
webhooks:
- name: a
  clientConfig:
    service:
      name: capi-webhook-service
      namespace: capi-system
- name: b
  clientConfig:
    url: https://example.com
"#,
        )
        .unwrap()
    }

    #[test]
    fn parse_and_display_path() {
        let path: FieldPath = "webhooks[]/clientConfig/service/namespace".parse().unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.to_string(), "webhooks[]/clientConfig/service/namespace");
        assert!("".parse::<FieldPath>().is_err());
        assert!("a//b".parse::<FieldPath>().is_err());
    }

    #[test]
    fn apply_visits_every_array_element_and_skips_missing() {
        let mut resource = webhook();
        let mut seen = Vec::new();
        spec(
            "MutatingWebhookConfiguration",
            "webhooks[]/clientConfig/service/namespace",
        )
        .apply::<String>(&mut resource, &mut |ns| {
            seen.push(ns.clone());
            *ns = "openshift-cluster-api".into();
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, ["capi-system"]);
        let rendered = serde_yaml::to_string(&resource).unwrap();
        assert!(rendered.contains("namespace: openshift-cluster-api"), "{rendered}");
    }

    #[test]
    fn apply_ignores_other_kinds() {
        let mut resource = webhook();
        let mut called = false;
        spec("ValidatingWebhookConfiguration", "webhooks[]")
            .apply::<Object>(&mut resource, &mut |_| {
                called = true;
                Ok(())
            })
            .unwrap();
        assert!(!called);
    }

    #[test]
    fn apply_reports_shape_mismatch() {
        let mut resource = webhook();
        let err = spec("MutatingWebhookConfiguration", "webhooks[]/name/first")
            .apply::<String>(&mut resource, &mut |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }), "{err}");
    }
}
