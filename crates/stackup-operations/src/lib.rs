//! Provisioning operations for a function-backed HTTP endpoint.
//!
//! The crate creates a serverless function and a REST API in front of it as
//! one saga. Every cloud call goes through the [`traits::FunctionService`] and
//! [`traits::RestApiService`] seams so the orchestration can be exercised
//! without network access; [`providers`] binds those seams to the AWS SDK.

pub mod arn;
pub mod config;
pub mod context;
mod error;
pub mod operations;
pub mod providers;
pub mod traits;
mod types;

#[cfg(test)]
pub(crate) mod mocks;

pub use config::{EndpointSpec, FunctionSpec, RunConfiguration, StaticCredentials};
pub use context::{ContextSlot, SagaContext};
pub use error::{OperationError, Result};
pub use types::{ProvisionedStack, ResourceKind};
