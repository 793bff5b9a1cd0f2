use async_trait::async_trait;

/// A step in a saga that can be executed and compensated.
///
/// Each step transforms an input into an output. The output is what the step
/// committed (for a provisioning step, the identifiers of whatever it created),
/// and it is handed back to [`SagaStep::compensate`] if a later step fails.
///
/// # Type Parameters
///
/// - `Input`: Data received from the previous step (or saga entry point)
/// - `Output`: Data produced for the next step, retained for compensation
/// - `Context`: Shared dependencies (injected, not passed between steps)
/// - `Error`: The error type for step failures
#[async_trait]
pub trait SagaStep: Send + Sync {
    /// Data received from the previous step or saga entry point.
    type Input: Clone + Send + 'static;

    /// Data produced for the next step.
    type Output: Clone + Send + 'static;

    /// Shared context providing dependencies.
    type Context: Sync;

    /// Error type for step failures.
    type Error: Send;

    /// Human-readable name for logging and error messages.
    fn name(&self) -> &'static str;

    /// Execute the step, transforming input into output.
    ///
    /// # Errors
    ///
    /// Returns an error if the step fails to complete.
    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error>;

    /// Compensate (undo) the step's effects.
    ///
    /// Called during rollback when a later step fails. Receives the output
    /// this step returned from `execute()`.
    ///
    /// The default implementation is a no-op, suitable for read-only steps.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation fails.
    async fn compensate(
        &self,
        ctx: &Self::Context,
        output: Self::Output,
    ) -> Result<(), Self::Error> {
        let _ = (ctx, output);
        Ok(())
    }

    /// Human-readable description of what compensation will do.
    fn compensation_description(&self) -> String {
        format!("undo {}", self.name())
    }
}
