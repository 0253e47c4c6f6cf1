// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::registry::Arity;

/// Errors raised while building, registering or evaluating expressions.
///
/// Build-time variants (`PathResolution`, `UnknownOperator`, `Arity`, `DuplicateOperator`,
/// `InvalidOperatorName`, `Composition`, `DuplicateField`, `DuplicateModel`)
/// are programmer errors and surface while rules are assembled. The remaining
/// variants are produced per document.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid path query `{query}` at offset {position}: {reason}")]
    PathResolution {
        query: String,
        position: usize,
        reason: String,
    },

    #[error("unknown operator `{name}`")]
    UnknownOperator { name: String },

    #[error("operator `{name}` is already registered")]
    DuplicateOperator { name: String },

    #[error("operator name `{name}` is invalid (names must be non-empty and not reserved by the rule encoding)")]
    InvalidOperatorName { name: String },

    #[error("`{name}` expects {expected}, got {found}")]
    Arity {
        name: String,
        expected: Arity,
        found: usize,
    },

    #[error("`{operator}`: {message}")]
    Evaluation { operator: String, message: String },

    #[error("evaluation exceeded maximum depth {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("invalid expression encoding: {reason}")]
    Composition { reason: String },

    #[error("field `{field}` is declared more than once in model `{model}`")]
    DuplicateField { model: String, field: String },

    #[error("model `{name}` is already defined")]
    DuplicateModel { name: String },

    #[error("unknown model `{name}`")]
    UnknownModel { name: String },

    #[error("model `{model}`, field `{field}`: {source}")]
    Field {
        model: String,
        field: String,
        #[source]
        source: Box<Error>,
    },

    #[error("model `{model}` failed validation: {message}")]
    Validation { model: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub(crate) fn evaluation(operator: &str, message: impl Into<String>) -> Self {
        Error::Evaluation {
            operator: operator.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn composition(reason: impl Into<String>) -> Self {
        Error::Composition {
            reason: reason.into(),
        }
    }

    /// True for errors that can only be produced while rules are assembled.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::PathResolution { .. }
                | Error::UnknownOperator { .. }
                | Error::DuplicateOperator { .. }
                | Error::InvalidOperatorName { .. }
                | Error::Arity { .. }
                | Error::Composition { .. }
                | Error::DuplicateField { .. }
                | Error::DuplicateModel { .. }
        )
    }
}

pub type Result<T> = core::result::Result<T, Error>;
