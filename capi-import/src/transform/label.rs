use crate::{
    error::Result,
    manifest::{Str, label},
    provider::ProviderContext,
    resmap::ResourceMap,
};

use super::Transformer;

/// Stamps the labels clusterctl puts on every object of an installed provider.
pub struct ProviderLabelTransformer {
    manifest_label: Str,
}

impl ProviderLabelTransformer {
    pub fn new(context: &ProviderContext) -> Self {
        Self {
            manifest_label: context.manifest_label(),
        }
    }
}

impl Transformer for ProviderLabelTransformer {
    #[tracing::instrument(skip_all, name = "label_transform", fields(provider = %self.manifest_label))]
    fn transform(&mut self, resources: &mut ResourceMap) -> Result<()> {
        for resource in resources.iter_mut() {
            let mut metadata = resource.make_metadata_mut();
            let mut labels = metadata.make_labels_mut();
            labels.insert(label::CLUSTER_PROVIDER, self.manifest_label.as_str());
            labels.insert(label::CLUSTERCTL, "");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderType;

    #[test]
    fn labels_every_resource() {
        let mut resources = ResourceMap::from_yaml_stream(
            r#"
apiVersion: v1
kind: Service
metadata:
  name: a
  labels:
    app: a
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: b
"#,
        )
        .unwrap();
        let context = ProviderContext::new("metal3", ProviderType::Infrastructure, "v1.1.2");
        ProviderLabelTransformer::new(&context)
            .transform(&mut resources)
            .unwrap();

        for resource in resources.iter() {
            let labels = resource.metadata().unwrap().labels().unwrap();
            assert_eq!(
                labels.get(label::CLUSTER_PROVIDER),
                Some("infrastructure-metal3")
            );
            assert_eq!(labels.get(label::CLUSTERCTL), Some(""));
        }

        let service = resources.iter().next().unwrap();
        assert_eq!(service.metadata().unwrap().labels().unwrap().get("app"), Some("a"));
    }
}
