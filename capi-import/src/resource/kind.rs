use core::fmt;

/// The finite set of kinds the pipeline treats specially. Anything else is `Other` and passes
/// through every stage untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Certificate,
    Issuer,
    Namespace,
    CustomResourceDefinition,
    MutatingWebhookConfiguration,
    ValidatingWebhookConfiguration,
    Service,
    Deployment,
    ClusterRole,
    Role,
    ClusterRoleBinding,
    RoleBinding,
    ServiceAccount,
    Other,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Certificate => "Certificate",
            Kind::Issuer => "Issuer",
            Kind::Namespace => "Namespace",
            Kind::CustomResourceDefinition => "CustomResourceDefinition",
            Kind::MutatingWebhookConfiguration => "MutatingWebhookConfiguration",
            Kind::ValidatingWebhookConfiguration => "ValidatingWebhookConfiguration",
            Kind::Service => "Service",
            Kind::Deployment => "Deployment",
            Kind::ClusterRole => "ClusterRole",
            Kind::Role => "Role",
            Kind::ClusterRoleBinding => "ClusterRoleBinding",
            Kind::RoleBinding => "RoleBinding",
            Kind::ServiceAccount => "ServiceAccount",
            Kind::Other => "<other>",
        }
    }

    /// Kinds that are applied through the separately staged RBAC manifest.
    pub fn is_rbac(&self) -> bool {
        matches!(
            self,
            Kind::ClusterRole
                | Kind::Role
                | Kind::ClusterRoleBinding
                | Kind::RoleBinding
                | Kind::ServiceAccount
        )
    }

    /// Kinds that may carry a CA-injection annotation.
    pub fn accepts_ca_injection(&self) -> bool {
        matches!(
            self,
            Kind::CustomResourceDefinition
                | Kind::MutatingWebhookConfiguration
                | Kind::ValidatingWebhookConfiguration
        )
    }

    pub fn is_cluster_scoped(&self) -> bool {
        match self {
            Kind::Namespace
            | Kind::CustomResourceDefinition
            | Kind::MutatingWebhookConfiguration
            | Kind::ValidatingWebhookConfiguration
            | Kind::ClusterRole
            | Kind::ClusterRoleBinding => true,
            Kind::Certificate
            | Kind::Issuer
            | Kind::Service
            | Kind::Deployment
            | Kind::Role
            | Kind::RoleBinding
            | Kind::ServiceAccount
            | Kind::Other => false,
        }
    }
}

impl From<&str> for Kind {
    fn from(kind: &str) -> Self {
        match kind {
            "Certificate" => Kind::Certificate,
            "Issuer" => Kind::Issuer,
            "Namespace" => Kind::Namespace,
            "CustomResourceDefinition" => Kind::CustomResourceDefinition,
            "MutatingWebhookConfiguration" => Kind::MutatingWebhookConfiguration,
            "ValidatingWebhookConfiguration" => Kind::ValidatingWebhookConfiguration,
            "Service" => Kind::Service,
            "Deployment" => Kind::Deployment,
            "ClusterRole" => Kind::ClusterRole,
            "Role" => Kind::Role,
            "ClusterRoleBinding" => Kind::ClusterRoleBinding,
            "RoleBinding" => Kind::RoleBinding,
            "ServiceAccount" => Kind::ServiceAccount,
            _ => Kind::Other,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
