use std::sync::Arc;

use stackup_saga::{Saga, SagaBuilder, SagaError, StepStatus};
use tracing::{debug, error, info};

use super::context::ProvisionSagaContext;
use super::preflight;
use super::rollback::RollbackReport;
use super::saga_data::ProvisionState;
use super::saga_steps::{
    CreateDeploymentStep, CreateFunctionStep, CreateResourceStep, CreateRestApiStep,
    FindRootResourceStep, GrantInvokePermissionsStep, PutIntegrationResponseStep,
    PutIntegrationStep, PutMethodStep,
};
use crate::arn::{self, DEFAULT_STAGE};
use crate::config::RunConfiguration;
use crate::context::SagaContext;
use crate::traits::{FunctionService, ProvisionReporter, RestApiService};
use crate::types::ProvisionedStack;
use crate::{OperationError, Result};

type ProvisionSaga<F, A, R> =
    Saga<ProvisionState, ProvisionState, ProvisionSagaContext<F, A, R>, OperationError>;

/// Creates a function and a REST API proxying to it, or leaves nothing behind.
pub struct ProvisionOperation<F, A, R> {
    functions: Arc<F>,
    rest_apis: Arc<A>,
    reporter: Arc<R>,
    rollback_on_failure: bool,
}

impl<F, A, R> ProvisionOperation<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    pub fn new(functions: Arc<F>, rest_apis: Arc<A>, reporter: Arc<R>) -> Self {
        Self {
            functions,
            rest_apis,
            reporter,
            rollback_on_failure: true,
        }
    }

    /// Keep resources created before a failure instead of deleting them.
    #[must_use]
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }

    /// Runs one provisioning attempt.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidConfiguration`] or a pre-flight error
    /// ([`OperationError::AlreadyExists`], [`OperationError::ExistenceCheck`])
    /// before anything is created. Once creation has started, any failure is
    /// returned as [`OperationError::Provisioning`] carrying the failed step,
    /// the original cause, the context snapshot and the rollback outcome.
    pub async fn execute(&self, config: &RunConfiguration) -> Result<ProvisionedStack> {
        config.validate()?;
        preflight::ensure_absent(self.functions.as_ref(), self.rest_apis.as_ref(), config).await?;

        info!(
            function = %config.function.name,
            api = %config.endpoint.api_name,
            region = %config.region,
            "provisioning function and REST API"
        );

        let ctx = ProvisionSagaContext::new(
            Arc::new(config.clone()),
            Arc::clone(&self.functions),
            Arc::clone(&self.rest_apis),
            Arc::clone(&self.reporter),
        );
        let saga = self.build_saga();

        let (result, audit_log) = saga
            .execute_with_audit(&ctx, ProvisionState::default())
            .await;
        debug!(audit = %audit_log.summary(), "provisioning saga finished");

        match result {
            Ok(state) => {
                let stack = finish(&state, config)?;
                self.reporter.succeeded(&stack);
                Ok(stack)
            }
            Err(err) => {
                let compensated = audit_log.steps_with_status(StepStatus::Compensated);
                debug!(?compensated, "rollback finished");
                Err(self.failure_from(err))
            }
        }
    }

    fn build_saga(&self) -> ProvisionSaga<F, A, R> {
        let reporter = Arc::clone(&self.reporter);
        let rollback = self.rollback_on_failure;

        SagaBuilder::new()
            .first_step(CreateRestApiStep::new())
            .then(FindRootResourceStep::new())
            .then(CreateResourceStep::new())
            .then(PutMethodStep::new())
            .then(CreateFunctionStep::new())
            .then(PutIntegrationStep::new())
            .then(PutIntegrationResponseStep::new())
            .then(CreateDeploymentStep::new())
            .then(GrantInvokePermissionsStep::new())
            .on_failure(move |step, step_error: &OperationError| {
                let empty = SagaContext::new();
                let snapshot = step_error.snapshot().unwrap_or(&empty);
                reporter.step_failed(step, step_error.cause(), snapshot);
                if rollback && !snapshot.is_empty() {
                    reporter.rolling_back(snapshot);
                }
            })
            .build()
            .with_rollback(rollback)
    }

    fn failure_from(&self, err: SagaError<OperationError>) -> OperationError {
        let (step, step_error, compensation_errors) = err.into_parts();
        let (snapshot, cause) = match step_error {
            OperationError::Interrupted { snapshot, cause } => (snapshot, cause),
            other => (SagaContext::new(), Box::new(other)),
        };

        error!(step = %step, cause = %cause, "provisioning step failed");

        let rollback = if self.rollback_on_failure && !snapshot.is_empty() {
            RollbackReport::from_compensations(&snapshot, &compensation_errors)
        } else {
            RollbackReport::skipped()
        };

        OperationError::Provisioning {
            step,
            snapshot,
            source: cause,
            rollback: Box::new(rollback),
        }
    }
}

fn finish(state: &ProvisionState, config: &RunConfiguration) -> Result<ProvisionedStack> {
    let api_id = state.api_id()?;
    Ok(ProvisionedStack {
        api_id: api_id.to_string(),
        function_arn: state.function_arn()?.to_string(),
        invoke_url: arn::build_invoke_url(
            api_id,
            &config.region,
            DEFAULT_STAGE,
            &config.endpoint.resource_path_part,
        ),
    })
}
