//! Integration tests for saga compensation behavior.

use std::sync::Mutex;

use async_trait::async_trait;
use stackup_saga::{SagaBuilder, SagaError, SagaStep};

#[derive(Default)]
struct TestContext {
    compensation_log: Mutex<Vec<String>>,
}

impl TestContext {
    fn log(&self) -> Vec<String> {
        self.compensation_log.lock().expect("lock poisoned").clone()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

#[derive(Debug, Clone, Default)]
struct Created {
    ids: Vec<String>,
}

struct CreateResource {
    kind: &'static str,
}

#[async_trait]
impl SagaStep for CreateResource {
    type Input = Created;
    type Output = Created;
    type Context = TestContext;
    type Error = TestError;

    fn name(&self) -> &'static str {
        self.kind
    }

    async fn execute(
        &self,
        _ctx: &Self::Context,
        mut input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        let id = format!("{}-{}", self.kind, input.ids.len() + 1);
        input.ids.push(id);
        Ok(input)
    }

    async fn compensate(
        &self,
        ctx: &Self::Context,
        output: Self::Output,
    ) -> Result<(), Self::Error> {
        let own_id = output.ids.last().cloned().unwrap_or_default();
        ctx.compensation_log
            .lock()
            .expect("lock poisoned")
            .push(format!("delete {own_id}"));
        Ok(())
    }
}

struct LookupStep;

#[async_trait]
impl SagaStep for LookupStep {
    type Input = Created;
    type Output = Created;
    type Context = TestContext;
    type Error = TestError;

    fn name(&self) -> &'static str {
        "lookup"
    }

    async fn execute(
        &self,
        _ctx: &Self::Context,
        input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        Ok(input)
    }
}

struct FailingStep {
    error_message: &'static str,
}

#[async_trait]
impl SagaStep for FailingStep {
    type Input = Created;
    type Output = Created;
    type Context = TestContext;
    type Error = TestError;

    fn name(&self) -> &'static str {
        "failing"
    }

    async fn execute(
        &self,
        _ctx: &Self::Context,
        _input: Self::Input,
    ) -> Result<Self::Output, Self::Error> {
        Err(TestError(self.error_message.to_string()))
    }
}

#[tokio::test]
async fn compensation_happens_in_reverse_creation_order() {
    let ctx = TestContext::default();
    let saga = SagaBuilder::new()
        .first_step(CreateResource { kind: "api" })
        .then(CreateResource { kind: "resource" })
        .then(CreateResource { kind: "function" })
        .then(FailingStep {
            error_message: "deployment rejected",
        })
        .build();

    let result = saga.execute(&ctx, Created::default()).await;

    assert!(result.is_err());
    assert_eq!(
        ctx.log(),
        vec!["delete function-3", "delete resource-2", "delete api-1"]
    );
}

#[tokio::test]
async fn compensation_receives_the_output_the_step_committed() {
    let ctx = TestContext::default();
    let saga = SagaBuilder::new()
        .first_step(CreateResource { kind: "api" })
        .then(FailingStep {
            error_message: "boom",
        })
        .build();

    let result = saga.execute(&ctx, Created::default()).await;

    assert!(result.is_err());
    assert_eq!(ctx.log(), vec!["delete api-1"]);
}

#[tokio::test]
async fn read_only_steps_have_no_op_compensation() {
    let ctx = TestContext::default();
    let saga = SagaBuilder::new()
        .first_step(LookupStep)
        .then(LookupStep)
        .then(FailingStep {
            error_message: "boom",
        })
        .build();

    let result = saga.execute(&ctx, Created::default()).await;

    assert!(result.is_err());
    assert!(ctx.log().is_empty());
}

#[tokio::test]
async fn mixed_compensation_and_read_only_steps() {
    let ctx = TestContext::default();
    let saga = SagaBuilder::new()
        .first_step(CreateResource { kind: "api" })
        .then(LookupStep)
        .then(CreateResource { kind: "function" })
        .then(LookupStep)
        .then(FailingStep {
            error_message: "boom",
        })
        .build();

    let result = saga.execute(&ctx, Created::default()).await;

    assert!(result.is_err());
    assert_eq!(ctx.log(), vec!["delete function-2", "delete api-1"]);
}

#[tokio::test]
async fn first_step_failure_triggers_no_compensation() {
    let ctx = TestContext::default();
    let saga = SagaBuilder::new()
        .first_step(FailingStep {
            error_message: "immediate failure",
        })
        .then(CreateResource { kind: "api" })
        .build();

    let result = saga.execute(&ctx, Created::default()).await;

    match result {
        Err(SagaError::StepFailed { step, source }) => {
            assert_eq!(step, "failing");
            assert_eq!(source.to_string(), "immediate failure");
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
    assert!(ctx.log().is_empty());
}

#[tokio::test]
async fn steps_after_the_failure_never_run() {
    let ctx = TestContext::default();
    let saga = SagaBuilder::new()
        .first_step(CreateResource { kind: "api" })
        .then(FailingStep {
            error_message: "boom",
        })
        .then(CreateResource { kind: "function" })
        .build();

    let result = saga.execute(&ctx, Created::default()).await;

    assert!(result.is_err());
    assert!(ctx.log().iter().all(|entry| !entry.contains("function")));
}
