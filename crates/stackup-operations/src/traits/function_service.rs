use async_trait::async_trait;

use crate::Result;
use crate::config::FunctionSpec;

/// Outcome of looking a function up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionLookup {
    /// A function with the name already exists.
    Found,
    /// The service answered definitively that no such function exists.
    NotFound,
}

/// A resource-based policy statement allowing a principal to invoke a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant {
    pub statement_id: String,
    pub action: String,
    pub principal: String,
    pub source_arn: String,
}

#[async_trait]
pub trait FunctionService: Send + Sync {
    /// # Errors
    ///
    /// Returns an error for any failure other than a definitive not-found answer.
    async fn get_function(&self, name: &str) -> Result<FunctionLookup>;

    /// Creates the function and returns its ARN when the service reports one.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    async fn create_function(&self, spec: &FunctionSpec) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the function cannot be deleted.
    async fn delete_function(&self, name: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the statement cannot be added to the function policy.
    async fn add_permission(&self, function_name: &str, grant: &PermissionGrant) -> Result<()>;
}
