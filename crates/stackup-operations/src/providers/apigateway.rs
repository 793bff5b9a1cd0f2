use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_apigateway::Client;
use aws_sdk_apigateway::types::{EndpointConfiguration, EndpointType, IntegrationType};

use super::remote_error;
use crate::Result;
use crate::traits::{ApiResource, IntegrationRequest, RestApiService, RestApiSummary};

const RESOURCE_PAGE_LIMIT: i32 = 500;

pub struct ApiGatewayRestApiService {
    client: Client,
}

impl ApiGatewayRestApiService {
    #[must_use]
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RestApiService for ApiGatewayRestApiService {
    async fn list_rest_apis(&self, limit: i32) -> Result<Vec<RestApiSummary>> {
        let output = self
            .client
            .get_rest_apis()
            .limit(limit)
            .send()
            .await
            .map_err(|err| remote_error("GetRestApis", &err))?;

        Ok(output
            .items()
            .iter()
            .map(|api| RestApiSummary {
                id: api.id().map(str::to_string),
                name: api.name().map(str::to_string),
            })
            .collect())
    }

    async fn create_rest_api(&self, name: &str) -> Result<Option<String>> {
        let endpoint = EndpointConfiguration::builder()
            .types(EndpointType::Regional)
            .build();

        let output = self
            .client
            .create_rest_api()
            .name(name)
            .endpoint_configuration(endpoint)
            .send()
            .await
            .map_err(|err| remote_error("CreateRestApi", &err))?;

        Ok(output.id().map(str::to_string))
    }

    async fn get_resources(&self, rest_api_id: &str) -> Result<Vec<ApiResource>> {
        let output = self
            .client
            .get_resources()
            .rest_api_id(rest_api_id)
            .limit(RESOURCE_PAGE_LIMIT)
            .send()
            .await
            .map_err(|err| remote_error("GetResources", &err))?;

        Ok(output
            .items()
            .iter()
            .map(|resource| ApiResource {
                id: resource.id().map(str::to_string),
                path: resource.path().map(str::to_string),
            })
            .collect())
    }

    async fn create_resource(
        &self,
        rest_api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<Option<String>> {
        let output = self
            .client
            .create_resource()
            .rest_api_id(rest_api_id)
            .parent_id(parent_id)
            .path_part(path_part)
            .send()
            .await
            .map_err(|err| remote_error("CreateResource", &err))?;

        Ok(output.id().map(str::to_string))
    }

    async fn put_method(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        authorization_type: &str,
    ) -> Result<()> {
        self.client
            .put_method()
            .rest_api_id(rest_api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .authorization_type(authorization_type)
            .send()
            .await
            .map_err(|err| remote_error("PutMethod", &err))?;
        Ok(())
    }

    async fn put_integration(&self, request: &IntegrationRequest) -> Result<()> {
        self.client
            .put_integration()
            .rest_api_id(&request.rest_api_id)
            .resource_id(&request.resource_id)
            .http_method(&request.http_method)
            .r#type(IntegrationType::AwsProxy)
            .integration_http_method(&request.integration_http_method)
            .uri(&request.uri)
            .send()
            .await
            .map_err(|err| remote_error("PutIntegration", &err))?;
        Ok(())
    }

    async fn put_integration_response(
        &self,
        rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
    ) -> Result<()> {
        self.client
            .put_integration_response()
            .rest_api_id(rest_api_id)
            .resource_id(resource_id)
            .http_method(http_method)
            .status_code(status_code)
            .set_response_templates(Some(HashMap::new()))
            .send()
            .await
            .map_err(|err| remote_error("PutIntegrationResponse", &err))?;
        Ok(())
    }

    async fn create_deployment(&self, rest_api_id: &str, stage_name: &str) -> Result<()> {
        self.client
            .create_deployment()
            .rest_api_id(rest_api_id)
            .stage_name(stage_name)
            .send()
            .await
            .map_err(|err| remote_error("CreateDeployment", &err))?;
        Ok(())
    }

    async fn delete_rest_api(&self, rest_api_id: &str) -> Result<()> {
        self.client
            .delete_rest_api()
            .rest_api_id(rest_api_id)
            .send()
            .await
            .map_err(|err| remote_error("DeleteRestApi", &err))?;
        Ok(())
    }
}
