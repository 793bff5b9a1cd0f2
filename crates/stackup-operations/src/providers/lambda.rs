use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::operation::get_function::GetFunctionError;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Environment, FunctionCode, PackageType, Runtime};
use tracing::debug;

use super::remote_error;
use crate::Result;
use crate::config::FunctionSpec;
use crate::traits::{FunctionLookup, FunctionService, PermissionGrant};

pub struct LambdaFunctionService {
    client: Client,
}

impl LambdaFunctionService {
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
impl FunctionService for LambdaFunctionService {
    async fn get_function(&self, name: &str) -> Result<FunctionLookup> {
        match self.client.get_function().function_name(name).send().await {
            Ok(_) => Ok(FunctionLookup::Found),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .is_some_and(GetFunctionError::is_resource_not_found_exception);
                if !not_found {
                    return Err(remote_error("GetFunction", &err));
                }
                debug!(function = name, "function does not exist");
                Ok(FunctionLookup::NotFound)
            }
        }
    }

    async fn create_function(&self, spec: &FunctionSpec) -> Result<Option<String>> {
        let code = FunctionCode::builder()
            .zip_file(Blob::new(spec.code_bundle.clone()))
            .build();

        let timeout = i32::try_from(spec.effective_timeout_seconds()).unwrap_or(i32::MAX);
        let memory_size = i32::try_from(spec.effective_memory_size_mb()).unwrap_or(i32::MAX);
        let mut request = self
            .client
            .create_function()
            .function_name(&spec.name)
            .role(&spec.execution_role)
            .runtime(Runtime::from(spec.runtime.as_str()))
            .handler(&spec.handler)
            .package_type(PackageType::Zip)
            .code(code)
            .timeout(timeout)
            .memory_size(memory_size);

        if !spec.environment.is_empty() {
            let variables: HashMap<String, String> = spec
                .environment
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            let environment = Environment::builder()
                .set_variables(Some(variables))
                .build();
            request = request.environment(environment);
        }

        let output = request
            .send()
            .await
            .map_err(|err| remote_error("CreateFunction", &err))?;

        Ok(output.function_arn().map(str::to_string))
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        self.client
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(|err| remote_error("DeleteFunction", &err))?;
        Ok(())
    }

    async fn add_permission(&self, function_name: &str, grant: &PermissionGrant) -> Result<()> {
        self.client
            .add_permission()
            .function_name(function_name)
            .statement_id(&grant.statement_id)
            .action(&grant.action)
            .principal(&grant.principal)
            .source_arn(&grant.source_arn)
            .send()
            .await
            .map_err(|err| remote_error("AddPermission", &err))?;
        Ok(())
    }
}
