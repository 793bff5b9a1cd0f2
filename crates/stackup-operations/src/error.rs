use thiserror::Error;

use crate::context::SagaContext;
use crate::operations::RollbackReport;
use crate::types::ResourceKind;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfiguration {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: ResourceKind, name: String },

    #[error("could not determine whether {kind} '{name}' exists")]
    ExistenceCheck {
        kind: ResourceKind,
        name: String,
        #[source]
        source: Box<OperationError>,
    },

    #[error("{operation} request failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} response did not include {what}")]
    MissingIdentifier {
        operation: &'static str,
        what: &'static str,
    },

    #[error("malformed function ARN '{arn}'")]
    MalformedArn { arn: String },

    #[error("failed to delete {resource} '{id}'")]
    CompensationFailed {
        resource: ResourceKind,
        id: String,
        #[source]
        source: Box<OperationError>,
    },

    /// A step error paired with the context as it stood when the step began.
    #[error("{cause}")]
    Interrupted {
        snapshot: SagaContext,
        cause: Box<OperationError>,
    },

    #[error("provisioning failed at step '{step}'")]
    Provisioning {
        step: String,
        snapshot: SagaContext,
        #[source]
        source: Box<OperationError>,
        rollback: Box<RollbackReport>,
    },
}

impl OperationError {
    /// Context snapshot captured when a provisioning step failed.
    #[must_use]
    pub fn snapshot(&self) -> Option<&SagaContext> {
        match self {
            Self::Interrupted { snapshot, .. } | Self::Provisioning { snapshot, .. } => {
                Some(snapshot)
            }
            _ => None,
        }
    }

    /// The underlying failure, with any snapshot wrapper removed.
    #[must_use]
    pub fn cause(&self) -> &OperationError {
        match self {
            Self::Interrupted { cause, .. } => cause.cause(),
            other => other,
        }
    }

    /// Whether the run was refused before anything was created.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    pub(crate) fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OperationError>;
