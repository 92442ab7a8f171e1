use super::{Object, Resource};

impl Resource {
    pub fn metadata(&self) -> Option<MetadataView<'_>> {
        self.root
            .get("metadata")
            .and_then(|v| v.as_object())
            .map(MetadataView)
    }

    pub fn annotations(&self) -> Option<AnnotationsView<'_>> {
        self.metadata()?.annotations()
    }

    pub fn make_metadata_mut(&mut self) -> MetadataViewMut<'_> {
        if !matches!(self.root.get("metadata"), Some(serde_json::Value::Object(_))) {
            self.root.insert(
                "metadata".to_string(),
                serde_json::Value::Object(Object::new()),
            );
        }

        self.metadata_mut().unwrap()
    }

    pub fn metadata_mut(&mut self) -> Option<MetadataViewMut<'_>> {
        self.root
            .get_mut("metadata")
            .and_then(|v| v.as_object_mut())
            .map(MetadataViewMut)
    }
}

#[derive(Debug)]
pub struct MetadataView<'a>(&'a Object);

impl<'a> MetadataView<'a> {
    pub fn name(&self) -> Option<&'a str> {
        self.0.get("name").and_then(|v| v.as_str())
    }

    pub fn namespace(&self) -> Option<&'a str> {
        self.0.get("namespace").and_then(|v| v.as_str())
    }

    pub fn annotations(&self) -> Option<AnnotationsView<'a>> {
        self.0
            .get("annotations")
            .and_then(|v| v.as_object())
            .map(AnnotationsView)
    }

    pub fn labels(&self) -> Option<LabelsView<'a>> {
        self.0
            .get("labels")
            .and_then(|v| v.as_object())
            .map(LabelsView)
    }
}

#[derive(Debug)]
pub struct LabelsView<'a>(&'a Object);

impl<'a> LabelsView<'a> {
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug)]
pub struct AnnotationsView<'a>(&'a Object);

impl<'a> AnnotationsView<'a> {
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.0.iter().filter_map(|(k, v)| {
            if let (key, serde_json::Value::String(value)) = (k, v) {
                Some((key.as_str(), value.as_str()))
            } else {
                None
            }
        })
    }
}

#[derive(Debug)]
pub struct MetadataViewMut<'a>(&'a mut Object);

impl MetadataViewMut<'_> {
    // This is private because it is unsafe to be used alone since the id must also be modified alongside.
    pub(super) fn set_name(&mut self, name: impl Into<String>) {
        self.0
            .insert("name".to_string(), serde_json::Value::String(name.into()));
    }

    // This is private because it is unsafe to be used alone since the id must also be modified alongside.
    pub(super) fn set_namespace(&mut self, namespace: Option<&str>) {
        match namespace {
            None => self.0.shift_remove("namespace"),
            Some(namespace) => self.0.insert(
                "namespace".to_string(),
                serde_json::Value::String(namespace.into()),
            ),
        };
    }

    pub fn annotations_mut(&mut self) -> Option<AnnotationsViewMut<'_>> {
        self.0
            .get_mut("annotations")
            .and_then(|v| v.as_object_mut())
            .map(AnnotationsViewMut)
    }

    pub fn make_annotations_mut(&mut self) -> AnnotationsViewMut<'_> {
        if !matches!(self.0.get("annotations"), Some(serde_json::Value::Object(_))) {
            self.0.insert(
                "annotations".to_string(),
                serde_json::Value::Object(Object::new()),
            );
        }
        self.annotations_mut().unwrap()
    }

    pub fn labels_mut(&mut self) -> Option<LabelsViewMut<'_>> {
        self.0
            .get_mut("labels")
            .and_then(|v| v.as_object_mut())
            .map(LabelsViewMut)
    }

    pub fn make_labels_mut(&mut self) -> LabelsViewMut<'_> {
        if !matches!(self.0.get("labels"), Some(serde_json::Value::Object(_))) {
            self.0.insert(
                "labels".to_string(),
                serde_json::Value::Object(Object::new()),
            );
        }
        self.labels_mut().unwrap()
    }
}

#[derive(Debug)]
pub struct LabelsViewMut<'a>(&'a mut Object);

impl LabelsViewMut<'_> {
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<serde_json::Value> {
        self.0
            .insert(key.into(), serde_json::Value::String(value.into()))
    }
}

#[derive(Debug)]
pub struct AnnotationsViewMut<'a>(&'a mut Object);

impl AnnotationsViewMut<'_> {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0
            .insert(key.into(), serde_json::Value::String(value.into()));
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        match self.0.shift_remove(key)? {
            serde_json::Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
