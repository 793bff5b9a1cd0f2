use std::fmt::Debug;
use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::audit::SagaAuditLog;
use crate::cloneable::CloneableAny;
use crate::erased::ErasedStep;
use crate::error::{CompensationError, SagaError};

pub(crate) type FailureHook<Err> = Box<dyn Fn(&str, &Err) + Send + Sync>;

/// A compiled saga ready for execution.
///
/// Sagas execute a sequence of steps strictly one after another, where each
/// step's output becomes the next step's input. If any step fails, previously
/// completed steps are compensated in reverse order (LIFO), each with the
/// output it committed.
pub struct Saga<Input, Output, Ctx, Err> {
    steps: Vec<Box<dyn ErasedStep<Ctx, Err>>>,
    failure_hook: Option<FailureHook<Err>>,
    rollback: bool,
    _phantom: PhantomData<(Input, Output)>,
}

impl<Input, Output, Ctx, Err> Saga<Input, Output, Ctx, Err>
where
    Input: Clone + Send + 'static,
    Output: Send + 'static,
    Err: Debug,
{
    pub(crate) fn from_parts(
        steps: Vec<Box<dyn ErasedStep<Ctx, Err>>>,
        failure_hook: Option<FailureHook<Err>>,
    ) -> Self {
        Self {
            steps,
            failure_hook,
            rollback: true,
            _phantom: PhantomData,
        }
    }

    /// Enable or disable automatic compensation on failure (enabled by default).
    ///
    /// With rollback disabled a failing step still halts the saga, but the
    /// effects of completed steps are left in place.
    #[must_use]
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback = enabled;
        self
    }

    /// Execute the saga, returning the final output on success.
    ///
    /// # Errors
    ///
    /// Returns `SagaError::StepFailed` if a step fails and all compensations succeed.
    /// Returns `SagaError::CompensationFailed` if a step fails and some compensations also fail.
    pub async fn execute(&self, ctx: &Ctx, input: Input) -> Result<Output, SagaError<Err>> {
        let (result, _audit_log) = self.execute_internal(ctx, input).await;
        result
    }

    /// Execute the saga and return both the result and an audit log.
    pub async fn execute_with_audit(
        &self,
        ctx: &Ctx,
        input: Input,
    ) -> (Result<Output, SagaError<Err>>, SagaAuditLog) {
        self.execute_internal(ctx, input).await
    }

    async fn execute_internal(
        &self,
        ctx: &Ctx,
        input: Input,
    ) -> (Result<Output, SagaError<Err>>, SagaAuditLog) {
        let mut audit_log = SagaAuditLog::new();
        let mut compensation_stack: Vec<(usize, Box<dyn CloneableAny>)> = Vec::new();

        let mut current: Box<dyn CloneableAny> = Box::new(input);

        for (index, step) in self.steps.iter().enumerate() {
            audit_log.record_start(step.name());
            debug!(step = step.name(), index, "executing saga step");

            match step.execute_erased(ctx, current).await {
                Ok(output) => {
                    audit_log.record_success(step.compensation_description());
                    compensation_stack.push((index, output.clone_box()));

                    if index == self.steps.len() - 1 {
                        let typed_output = output
                            .into_any()
                            .downcast::<Output>()
                            .expect("type-state builder guarantees final output type");
                        return (Ok(*typed_output), audit_log);
                    }

                    current = output;
                }
                Err(error) => {
                    audit_log.record_failure();
                    debug!(step = step.name(), ?error, "saga step failed");
                    if let Some(hook) = &self.failure_hook {
                        hook(step.name(), &error);
                    }

                    if !self.rollback {
                        return (
                            Err(SagaError::StepFailed {
                                step: step.name().to_string(),
                                source: error,
                            }),
                            audit_log,
                        );
                    }

                    let saga_error = self
                        .compensate(ctx, &mut audit_log, compensation_stack, step.name(), error)
                        .await;
                    return (Err(saga_error), audit_log);
                }
            }
        }

        unreachable!("saga must have at least one step")
    }

    async fn compensate(
        &self,
        ctx: &Ctx,
        audit_log: &mut SagaAuditLog,
        mut compensation_stack: Vec<(usize, Box<dyn CloneableAny>)>,
        failed_step: &str,
        step_error: Err,
    ) -> SagaError<Err> {
        let mut compensation_errors = Vec::new();

        while let Some((index, committed_output)) = compensation_stack.pop() {
            let step = &self.steps[index];
            let step_name = step.name();
            let description = step.compensation_description();

            match step.compensate_erased(ctx, committed_output).await {
                Ok(()) => {
                    debug!(step = step_name, "compensated saga step");
                    audit_log.record_compensated(index);
                }
                Err(error) => {
                    warn!(step = step_name, %description, ?error, "compensation failed");
                    audit_log.record_compensation_failed(index);
                    compensation_errors.push(CompensationError {
                        step: step_name.to_string(),
                        description,
                        error,
                    });
                }
            }
        }

        if compensation_errors.is_empty() {
            SagaError::StepFailed {
                step: failed_step.to_string(),
                source: step_error,
            }
        } else {
            SagaError::CompensationFailed {
                failed_step: failed_step.to_string(),
                step_error,
                compensation_errors,
            }
        }
    }
}
