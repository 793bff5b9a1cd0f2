//! Async saga engine for provisioning sequences.
//!
//! A saga runs typed steps strictly in order, each step's output feeding the
//! next. When a step fails, the steps that already completed are compensated
//! in reverse order, each with the output it committed. A compensation that
//! fails is collected and reported next to the original error, and never
//! prevents the remaining compensations from running.

mod audit;
mod builder;
mod cloneable;
mod erased;
mod error;
mod saga;
mod step;

pub use audit::{SagaAuditLog, StepRecord, StepStatus};
pub use builder::SagaBuilder;
pub use error::{CompensationError, SagaError};
pub use saga::Saga;
pub use step::SagaStep;
