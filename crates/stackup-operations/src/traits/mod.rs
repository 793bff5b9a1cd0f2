mod function_service;
mod reporter;
mod rest_api_service;

pub use function_service::{FunctionLookup, FunctionService, PermissionGrant};
pub use reporter::{ProvisionReporter, SilentReporter};
pub use rest_api_service::{ApiResource, IntegrationRequest, RestApiService, RestApiSummary};
