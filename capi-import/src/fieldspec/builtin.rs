use std::sync::OnceLock;

use serde::Deserialize;

use super::FieldSpecs;
use crate::yaml;

const NAMESPACE_REFERENCES: &[u8] = include_bytes!("namespaceReferences.yaml");
const SUBJECTS: &[u8] = include_bytes!("subjects.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Builtin {
    /// Namespace fields of service references held by cluster-scoped objects.
    pub namespace_references: FieldSpecs,
    /// Subject lists of role bindings.
    pub subjects: FieldSpecs,
}

impl Builtin {
    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<Builtin> = OnceLock::new();
        INSTANCE.get_or_init(|| Builtin {
            namespace_references: yaml::from_slice::<FieldSpecs>(NAMESPACE_REFERENCES)
                .expect("namespace references"),
            subjects: yaml::from_slice::<FieldSpecs>(SUBJECTS).expect("subjects"),
        })
    }
}

#[cfg(test)]
#[test]
fn ensure_builtin_fieldspecs_valid() {
    let builtin = Builtin::get();
    assert_eq!(builtin.namespace_references.len(), 4);
    assert_eq!(builtin.subjects.len(), 2);
}
