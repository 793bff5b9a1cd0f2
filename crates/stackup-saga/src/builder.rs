use std::fmt::Debug;
use std::marker::PhantomData;

use crate::erased::{ErasedStep, StepWrapper};
use crate::saga::{FailureHook, Saga};
use crate::step::SagaStep;

/// Marker type for a builder with no steps.
pub struct Empty;

/// Marker type for a builder with at least one step.
pub struct HasSteps<LastOutput>(PhantomData<LastOutput>);

/// Type-state builder for constructing type-safe sagas.
///
/// The builder enforces at compile-time that:
/// - Each step's input type matches the previous step's output type
/// - The saga's input type matches the first step's input
/// - The saga's output type matches the last step's output
///
/// # Compile-time Type Safety
///
/// Mismatched types will not compile:
///
/// ```compile_fail
/// use async_trait::async_trait;
/// use stackup_saga::{SagaBuilder, SagaStep};
///
/// struct CreateApi;
/// #[async_trait]
/// impl SagaStep for CreateApi {
///     type Input = ();
///     type Output = String;  // Outputs the API id
///     type Context = ();
///     type Error = ();
///     fn name(&self) -> &'static str { "create_api" }
///     async fn execute(&self, _: &(), _: ()) -> Result<String, ()> {
///         Ok("api".to_string())
///     }
/// }
///
/// struct CountRoutes;
/// #[async_trait]
/// impl SagaStep for CountRoutes {
///     type Input = u32;  // Expects u32, not String!
///     type Output = u32;
///     type Context = ();
///     type Error = ();
///     fn name(&self) -> &'static str { "count_routes" }
///     async fn execute(&self, _: &(), input: u32) -> Result<u32, ()> {
///         Ok(input + 1)
///     }
/// }
///
/// let saga = SagaBuilder::new()
///     .first_step(CreateApi)
///     .then(CountRoutes)  // Compile error here!
///     .build();
/// ```
///
/// An empty saga (without calling `first_step()`) cannot be built:
///
/// ```compile_fail
/// use stackup_saga::SagaBuilder;
///
/// let saga = SagaBuilder::<(), (), (), ()>::new().build();
/// ```
pub struct SagaBuilder<Input, Output, Ctx, Err, State> {
    steps: Vec<Box<dyn ErasedStep<Ctx, Err>>>,
    failure_hook: Option<FailureHook<Err>>,
    _phantom: PhantomData<(Input, Output, State)>,
}

impl<Ctx, Err> SagaBuilder<(), (), Ctx, Err, Empty> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            failure_hook: None,
            _phantom: PhantomData,
        }
    }
}

impl<Ctx, Err> Default for SagaBuilder<(), (), Ctx, Err, Empty> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx, Err> SagaBuilder<(), (), Ctx, Err, Empty> {
    /// Add the first step to the saga.
    ///
    /// This establishes the saga's input type from the step's input type.
    #[must_use]
    pub fn first_step<S>(
        self,
        step: S,
    ) -> SagaBuilder<S::Input, S::Output, Ctx, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Context = Ctx, Error = Err> + 'static,
    {
        let mut steps = self.steps;
        steps.push(Box::new(StepWrapper::new(step)));
        SagaBuilder {
            steps,
            failure_hook: self.failure_hook,
            _phantom: PhantomData,
        }
    }
}

impl<Input, CurrentOutput, Ctx, Err>
    SagaBuilder<Input, CurrentOutput, Ctx, Err, HasSteps<CurrentOutput>>
{
    /// Add another step to the saga.
    ///
    /// The step's input type must match the current output type.
    #[must_use]
    pub fn then<S>(self, step: S) -> SagaBuilder<Input, S::Output, Ctx, Err, HasSteps<S::Output>>
    where
        S: SagaStep<Input = CurrentOutput, Context = Ctx, Error = Err> + 'static,
    {
        let mut steps = self.steps;
        steps.push(Box::new(StepWrapper::new(step)));
        SagaBuilder {
            steps,
            failure_hook: self.failure_hook,
            _phantom: PhantomData,
        }
    }

    /// Register a hook that observes a step failure before any compensation runs.
    ///
    /// The hook receives the failed step's name and its error.
    #[must_use]
    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &Err) + Send + Sync + 'static,
    {
        self.failure_hook = Some(Box::new(hook));
        self
    }

    /// Build the saga from the accumulated steps.
    #[must_use]
    pub fn build(self) -> Saga<Input, CurrentOutput, Ctx, Err>
    where
        Input: Clone + Send + 'static,
        CurrentOutput: Send + 'static,
        Err: Debug,
    {
        Saga::from_parts(self.steps, self.failure_hook)
    }
}
