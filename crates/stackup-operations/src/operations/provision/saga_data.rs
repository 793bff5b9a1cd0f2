use crate::context::SagaContext;
use crate::{OperationError, Result};

/// Value threaded through the provisioning steps.
///
/// `context` holds the identifiers rollback acts on; the resource ids are
/// intermediate lookups that need no cleanup of their own.
#[derive(Debug, Clone, Default)]
pub struct ProvisionState {
    pub context: SagaContext,
    pub root_resource_id: Option<String>,
    pub resource_id: Option<String>,
}

impl ProvisionState {
    /// Pairs a step failure with the context as it stood before the step ran.
    pub fn fail(&self, cause: OperationError) -> OperationError {
        OperationError::Interrupted {
            snapshot: self.context.clone(),
            cause: Box::new(cause),
        }
    }

    pub fn api_id(&self) -> Result<&str> {
        self.context
            .api_id()
            .ok_or(OperationError::MissingIdentifier {
                operation: "CreateRestApi",
                what: "an API id",
            })
    }

    pub fn function_arn(&self) -> Result<&str> {
        self.context
            .function_arn()
            .ok_or(OperationError::MissingIdentifier {
                operation: "CreateFunction",
                what: "a function ARN",
            })
    }

    pub fn root_resource_id(&self) -> Result<&str> {
        self.root_resource_id
            .as_deref()
            .ok_or(OperationError::MissingIdentifier {
                operation: "GetResources",
                what: "a root resource",
            })
    }

    pub fn resource_id(&self) -> Result<&str> {
        self.resource_id
            .as_deref()
            .ok_or(OperationError::MissingIdentifier {
                operation: "CreateResource",
                what: "a resource id",
            })
    }
}

/// Treats an absent or blank identifier in a response as a failure.
pub(super) fn require_id(
    value: Option<String>,
    operation: &'static str,
    what: &'static str,
) -> Result<String> {
    value
        .filter(|id| !id.trim().is_empty())
        .ok_or(OperationError::MissingIdentifier { operation, what })
}
