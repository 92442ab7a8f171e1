mod filter;
mod label;
mod namespace;
mod rbac;
mod service_ca;

pub use self::filter::{ComponentFilter, Exclusion};
pub use self::label::ProviderLabelTransformer;
pub use self::namespace::TargetNamespaceTransformer;
pub use self::rbac::{PlatformAnnotator, ReleaseAnnotator, split_rbac};
pub use self::service_ca::{
    InjectionReference, ServiceCaTransformer, ServiceSecrets, resolve, rewrite,
};

use crate::{error::Result, resmap::ResourceMap};

/// A single in-place rewrite of a resource set.
pub trait Transformer {
    fn transform(&mut self, resources: &mut ResourceMap) -> Result<()>;
}
