use crate::OperationError;
use crate::context::SagaContext;
use crate::types::{ProvisionedStack, ResourceKind};

/// Receives progress events of a provisioning run.
///
/// Calls happen in run order: `step_failed` and `rolling_back` before any
/// compensation, `resource_deleted` once per compensated resource.
pub trait ProvisionReporter: Send + Sync {
    fn step_failed(&self, step: &str, cause: &OperationError, snapshot: &SagaContext);

    fn rolling_back(&self, snapshot: &SagaContext);

    fn resource_deleted(&self, kind: ResourceKind, id: &str);

    fn succeeded(&self, stack: &ProvisionedStack);
}

/// Reporter that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl ProvisionReporter for SilentReporter {
    fn step_failed(&self, _step: &str, _cause: &OperationError, _snapshot: &SagaContext) {}

    fn rolling_back(&self, _snapshot: &SagaContext) {}

    fn resource_deleted(&self, _kind: ResourceKind, _id: &str) {}

    fn succeeded(&self, _stack: &ProvisionedStack) {}
}
