//! Error types for the import pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::{manifest::Str, resmap::Conflict, resource::ResId};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A reference between objects could not be resolved. Continuing would ship a broken manifest.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// An object claims a kind but does not decode into that kind's shape.
    #[error("decoding `{id}`: {source}")]
    Decode {
        id: ResId,
        #[source]
        source: serde_json::Error,
    },

    /// An object decoded but lacks a field the pipeline relies on.
    #[error("malformed `{id}`: {reason}")]
    Malformed { id: ResId, reason: String },

    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error("no version recorded for provider `{0}`")]
    MissingVersion(Str),

    #[error("reading `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{what}` is not valid utf-8")]
    Utf8 { what: String },
}

impl Error {
    pub fn malformed(id: &ResId, reason: impl Into<String>) -> Self {
        Self::Malformed {
            id: id.clone(),
            reason: reason.into(),
        }
    }
}

/// Referential integrity violations between certificates and their consumers.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("`{referrer}`: can't find secret from certificate `{reference}`")]
    UnresolvedCertificate { referrer: ResId, reference: Str },

    #[error(
        "`{referrer}`: malformed injection reference `{value}`, expected `<namespace>/<certificate>`"
    )]
    MalformedReference { referrer: ResId, value: Str },
}
