use stackup_saga::CompensationError;
use tracing::{info, warn};

use super::context::ProvisionSagaContext;
use crate::context::{ContextSlot, SagaContext};
use crate::traits::{FunctionService, ProvisionReporter, RestApiService};
use crate::types::ResourceKind;
use crate::{OperationError, Result};

/// What rollback did after a failed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// False when rollback was disabled or nothing had been created.
    pub attempted: bool,
    /// Resources deleted, in the order they were deleted.
    pub deleted: Vec<ResourceKind>,
    pub failures: Vec<RollbackFailure>,
}

/// A deletion that did not go through. The resource is left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackFailure {
    pub step: String,
    pub resource: Option<ResourceKind>,
    pub message: String,
}

impl RollbackReport {
    pub(super) fn skipped() -> Self {
        Self::default()
    }

    pub(super) fn from_compensations(
        snapshot: &SagaContext,
        compensation_errors: &[CompensationError<OperationError>],
    ) -> Self {
        let failures: Vec<RollbackFailure> = compensation_errors
            .iter()
            .map(|failure| RollbackFailure {
                step: failure.step.clone(),
                resource: match &failure.error {
                    OperationError::CompensationFailed { resource, .. } => Some(*resource),
                    _ => None,
                },
                message: error_chain(&failure.error),
            })
            .collect();

        let deleted = snapshot
            .populated_slots()
            .into_iter()
            .rev()
            .map(ContextSlot::resource_kind)
            .filter(|kind| !failures.iter().any(|f| f.resource == Some(*kind)))
            .collect();

        Self {
            attempted: true,
            deleted,
            failures,
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn error_chain(error: &OperationError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

pub(super) async fn delete_rest_api<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    api_id: &str,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    match ctx.rest_apis().delete_rest_api(api_id).await {
        Ok(()) => {
            info!(api_id, "deleted REST API");
            ctx.reporter()
                .resource_deleted(ResourceKind::RestApi, api_id);
            Ok(())
        }
        Err(source) => {
            warn!(api_id, error = %source, "could not delete REST API");
            Err(OperationError::CompensationFailed {
                resource: ResourceKind::RestApi,
                id: api_id.to_string(),
                source: Box::new(source),
            })
        }
    }
}

pub(super) async fn delete_function<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    function_name: &str,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    match ctx.functions().delete_function(function_name).await {
        Ok(()) => {
            info!(function = function_name, "deleted function");
            ctx.reporter()
                .resource_deleted(ResourceKind::Function, function_name);
            Ok(())
        }
        Err(source) => {
            warn!(function = function_name, error = %source, "could not delete function");
            Err(OperationError::CompensationFailed {
                resource: ResourceKind::Function,
                id: function_name.to_string(),
                source: Box::new(source),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_snapshot() -> SagaContext {
        let mut snapshot = SagaContext::new();
        snapshot.record_api_id("a1b2c3".to_string());
        snapshot.record_function_arn(
            "arn:aws:lambda:eu-central-1:123456789012:function:orders-fn".to_string(),
        );
        snapshot
    }

    #[test]
    fn clean_rollback_lists_deletions_newest_first() {
        let report = RollbackReport::from_compensations(&full_snapshot(), &[]);

        assert!(report.attempted);
        assert!(report.is_clean());
        assert_eq!(
            report.deleted,
            vec![ResourceKind::Function, ResourceKind::RestApi]
        );
    }

    #[test]
    fn failed_deletion_is_reported_and_not_listed_as_deleted() {
        let errors = vec![CompensationError {
            step: "create_function".to_string(),
            description: "delete the function".to_string(),
            error: OperationError::CompensationFailed {
                resource: ResourceKind::Function,
                id: "orders-fn".to_string(),
                source: Box::new(OperationError::remote("DeleteFunction", "throttled")),
            },
        }];

        let report = RollbackReport::from_compensations(&full_snapshot(), &errors);

        assert_eq!(report.deleted, vec![ResourceKind::RestApi]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].resource, Some(ResourceKind::Function));
        assert_eq!(
            report.failures[0].message,
            "failed to delete function 'orders-fn': DeleteFunction request failed: throttled"
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn skipped_report_attempts_nothing() {
        let report = RollbackReport::skipped();

        assert!(!report.attempted);
        assert!(report.deleted.is_empty());
        assert!(report.is_clean());
    }
}
