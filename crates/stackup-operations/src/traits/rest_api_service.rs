use async_trait::async_trait;

use crate::Result;

/// Name and id of an existing REST API. Either may be absent in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestApiSummary {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResource {
    pub id: Option<String>,
    pub path: Option<String>,
}

/// A proxy integration forwarding a method to a function invocation URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationRequest {
    pub rest_api_id: String,
    pub resource_id: String,
    pub http_method: String,
    pub integration_http_method: String,
    pub uri: String,
}

#[async_trait]
pub trait RestApiService: Send + Sync {
    /// Lists at most `limit` REST APIs of the account in the configured region.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing request fails.
    async fn list_rest_apis(&self, limit: i32) -> Result<Vec<RestApiSummary>>;

    /// Creates a regional REST API and returns its id when the service reports one.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    async fn create_rest_api(&self, name: &str) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the resources of the API cannot be listed.
    async fn get_resources(&self, rest_api_id: &str) -> Result<Vec<ApiResource>>;

    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    async fn create_resource(
        &self,
        rest_api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<Option<String>>;

    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    async fn put_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        authorization_type: &str,
    ) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    async fn put_integration(&self, request: &IntegrationRequest) -> Result<()>;

    /// Declares a pass-through integration response for `status_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    async fn put_integration_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
    ) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the deployment cannot be created.
    async fn create_deployment(&self, rest_api_id: &str, stage_name: &str) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the API cannot be deleted.
    async fn delete_rest_api(&self, rest_api_id: &str) -> Result<()>;
}
