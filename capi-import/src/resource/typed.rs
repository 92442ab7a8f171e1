//! Typed views of the handful of kinds whose contents the pipeline reads. Only the fields the
//! pipeline needs are modelled; everything else is ignored on decode.

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    manifest::Str,
};

use super::{Kind, Resource};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Certificate {
    pub spec: CertificateSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    #[serde(default)]
    pub secret_name: Str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomResourceDefinition {
    pub spec: CustomResourceDefinitionSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomResourceDefinitionSpec {
    #[serde(default)]
    pub conversion: Option<CustomResourceConversion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomResourceConversion {
    #[serde(default)]
    pub webhook: Option<WebhookConversion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConversion {
    #[serde(default)]
    pub client_config: Option<ClientConfig>,
}

/// Mutating and validating webhook configurations share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookConfiguration {
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub name: Str,
    pub client_config: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: Option<ServiceReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceReference {
    pub name: Str,
    #[serde(default)]
    pub namespace: Option<Str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deployment {
    pub spec: DeploymentSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentSpec {
    pub template: PodTemplateSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PodTemplateSpec {
    pub spec: PodSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Container {
    pub name: Str,
    pub image: Str,
}

impl Resource {
    /// The name of the service an injection-carrying object points its CA bundle at: the
    /// conversion webhook service of a CRD, or the first webhook entry's service of a webhook
    /// configuration.
    pub fn injection_service(&self) -> Result<Str> {
        let service = match self.kind() {
            Kind::CustomResourceDefinition => self
                .decode::<CustomResourceDefinition>()?
                .spec
                .conversion
                .and_then(|conversion| conversion.webhook)
                .and_then(|webhook| webhook.client_config)
                .and_then(|client_config| client_config.service),
            Kind::MutatingWebhookConfiguration | Kind::ValidatingWebhookConfiguration => self
                .decode::<WebhookConfiguration>()?
                .webhooks
                .into_iter()
                .next()
                .and_then(|webhook| webhook.client_config.service),
            kind => {
                return Err(Error::malformed(
                    self.id(),
                    format!("{kind} cannot carry a CA injection reference"),
                ));
            }
        };

        service
            .map(|service| service.name)
            .ok_or_else(|| Error::malformed(self.id(), "no webhook service reference"))
    }
}
