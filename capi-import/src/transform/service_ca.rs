//! Translation of cert-manager CA injection into the platform service CA.
//!
//! cert-manager wires TLS for webhooks through three objects: a `Certificate` naming the secret
//! it provisions, an `inject-ca-from` annotation on the CRD or webhook configuration pointing at
//! that certificate, and the `Service` the webhook is served from. The platform service CA
//! instead injects the CA bundle into anything annotated with `inject-cabundle`, and provisions
//! a serving certificate for any service annotated with the secret name to put it in.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    error::{IntegrityError, Result},
    manifest::{Str, annotation},
    resmap::ResourceMap,
    resource::{Certificate, Kind, Resource},
};

use super::Transformer;

/// A decoded `<namespace>/<certificate>` injection reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionReference {
    pub namespace: Str,
    pub certificate: Str,
}

impl InjectionReference {
    pub fn parse(value: &str) -> Option<Self> {
        let (namespace, certificate) = value.split_once('/')?;
        Some(Self {
            namespace: namespace.into(),
            certificate: certificate.into(),
        })
    }
}

/// Service name to the name of the secret its serving certificate must be written to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceSecrets(IndexMap<Str, Str>);

impl ServiceSecrets {
    pub fn get(&self, service: &str) -> Option<&Str> {
        self.0.get(service)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Str, &Str)> {
        self.0.iter()
    }
}

/// Maps every service that backs a CA-injected CRD or webhook to the secret of the certificate
/// the injection pointed at.
///
/// References are resolved by certificate name only, the namespace half of the reference is
/// ignored. A reference that does not resolve to a non-empty secret name is an integrity error.
#[tracing::instrument(skip_all)]
pub fn resolve(resources: &ResourceMap) -> Result<ServiceSecrets> {
    let mut cert_secrets = HashMap::<&str, Str>::new();
    for resource in resources.iter() {
        if resource.kind() == Kind::Certificate {
            let certificate = resource.decode::<Certificate>()?;
            cert_secrets.insert(resource.name().as_str(), certificate.spec.secret_name);
        }
    }

    let mut service_secrets = IndexMap::new();
    for resource in resources.iter() {
        if !resource.kind().accepts_ca_injection() {
            continue;
        }

        let Some(value) = resource
            .annotations()
            .and_then(|annotations| annotations.get(annotation::INJECT_CA_FROM))
        else {
            continue;
        };

        let reference =
            InjectionReference::parse(value).ok_or_else(|| IntegrityError::MalformedReference {
                referrer: resource.id().clone(),
                value: value.into(),
            })?;

        let secret = cert_secrets
            .get(reference.certificate.as_str())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| IntegrityError::UnresolvedCertificate {
                referrer: resource.id().clone(),
                reference: value.into(),
            })?;

        let service = resource.injection_service()?;
        tracing::debug!(%service, %secret, referrer = %resource.id(), "resolved serving secret");
        service_secrets.insert(service, secret.clone());
    }

    Ok(ServiceSecrets(service_secrets))
}

/// Rewrites cert-manager CA injection into service CA annotations and drops the cert-manager and
/// namespace objects the platform makes redundant.
#[derive(Debug, Default)]
pub struct ServiceCaTransformer {
    secrets: ServiceSecrets,
}

impl ServiceCaTransformer {
    /// The bindings resolved by the last call to `transform`.
    pub fn secrets(&self) -> &ServiceSecrets {
        &self.secrets
    }
}

impl Transformer for ServiceCaTransformer {
    #[tracing::instrument(skip_all, name = "service_ca_transform")]
    fn transform(&mut self, resources: &mut ResourceMap) -> Result<()> {
        self.secrets = resolve(resources)?;
        rewrite(resources, &self.secrets)
    }
}

/// The mutation half of the transformer. Deterministic given the same resources and bindings.
pub fn rewrite(resources: &mut ResourceMap, secrets: &ServiceSecrets) -> Result<()> {
    let mut out = ResourceMap::with_capacity(resources.len());
    for mut resource in std::mem::take(resources) {
        match resource.kind() {
            Kind::CustomResourceDefinition
            | Kind::MutatingWebhookConfiguration
            | Kind::ValidatingWebhookConfiguration => swap_injection_annotation(&mut resource),
            Kind::Service => annotate_serving_secret(&mut resource, secrets),
            Kind::Certificate | Kind::Issuer | Kind::Namespace => {
                tracing::debug!(id = %resource.id(), "dropping");
                continue;
            }
            Kind::Deployment
            | Kind::ClusterRole
            | Kind::Role
            | Kind::ClusterRoleBinding
            | Kind::RoleBinding
            | Kind::ServiceAccount
            | Kind::Other => {}
        }

        out.insert(resource)?;
    }

    *resources = out;
    Ok(())
}

fn swap_injection_annotation(resource: &mut Resource) {
    let mut metadata = resource.make_metadata_mut();
    let Some(mut annotations) = metadata.annotations_mut() else {
        return;
    };

    if annotations.remove(annotation::INJECT_CA_FROM).is_some() {
        annotations.insert(annotation::INJECT_CABUNDLE, "true");
    }
}

fn annotate_serving_secret(resource: &mut Resource, secrets: &ServiceSecrets) {
    let Some(secret) = secrets.get(resource.name()) else {
        return;
    };

    tracing::debug!(service = %resource.name(), %secret, "annotating serving secret");
    resource
        .make_metadata_mut()
        .make_annotations_mut()
        .insert(annotation::SERVING_CERT_SECRET_NAME, secret.as_str());
}
