use std::collections::BTreeMap;
use std::path::PathBuf;

use stackup_operations::{EndpointSpec, FunctionSpec, RunConfiguration, StaticCredentials};
use tracing::debug;

use crate::Cli;
use crate::error::{CliError, Result};

/// Command-line and environment input with every mandatory value present.
#[derive(Debug)]
pub(crate) struct Settings {
    region: String,
    function_name: String,
    execution_role: String,
    api_name: String,
    resource_path_part: String,
    bundle: PathBuf,
    runtime: String,
    handler: String,
    timeout: Option<u32>,
    memory: Option<u32>,
    environment: BTreeMap<String, String>,
    credentials: Option<StaticCredentials>,
    pub(crate) rollback: bool,
}

impl Settings {
    /// Checks that every mandatory value is present, reporting all missing
    /// ones together.
    pub(crate) fn from_cli(cli: Cli) -> Result<Self> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, variable: &'static str| {
            let value = present(value);
            if value.is_none() {
                missing.push(variable);
            }
            value.unwrap_or_default()
        };

        let region = require(cli.region, "AWS_REGION");
        let function_name = require(cli.function_name, "LAMBDA_FUNCTION_NAME");
        let execution_role = require(cli.execution_role, "LAMBDA_EXECUTION_ROLE");
        let api_name = require(cli.api_name, "APIGATEWAY_API_NAME");
        let resource_path_part = require(cli.resource_path_part, "APIGATEWAY_RESOURCE_PATH_PART");

        let credentials = match (present(cli.access_key_id), present(cli.secret_access_key)) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: present(cli.session_token),
            }),
            (Some(_), None) => {
                missing.push("AWS_SECRET_ACCESS_KEY");
                None
            }
            (None, Some(_)) => {
                missing.push("AWS_ACCESS_KEY_ID");
                None
            }
            (None, None) => None,
        };

        if !missing.is_empty() {
            return Err(CliError::MissingEnvironment(missing));
        }

        Ok(Self {
            region,
            function_name,
            execution_role,
            api_name,
            resource_path_part,
            bundle: cli.bundle,
            runtime: cli.runtime,
            handler: cli.handler,
            timeout: cli.timeout,
            memory: cli.memory,
            environment: cli.environment.into_iter().collect(),
            credentials,
            rollback: !cli.no_rollback,
        })
    }

    /// Reads the code bundle and assembles the run configuration.
    pub(crate) fn into_run_configuration(self) -> Result<RunConfiguration> {
        let code_bundle = std::fs::read(&self.bundle).map_err(|source| CliError::BundleRead {
            path: self.bundle.clone(),
            source,
        })?;
        debug!(path = %self.bundle.display(), bytes = code_bundle.len(), "loaded code bundle");

        let mut function = FunctionSpec::new(self.function_name, self.execution_role, code_bundle)
            .with_runtime(self.runtime)
            .with_handler(self.handler);
        function.timeout_seconds = self.timeout;
        function.memory_size_mb = self.memory;
        function.environment = self.environment;

        let config = RunConfiguration::new(
            self.region,
            function,
            EndpointSpec::new(self.api_name, self.resource_path_part),
        );
        Ok(match self.credentials {
            Some(credentials) => config.with_credentials(credentials),
            None => config,
        })
    }
}

/// Treats an empty or whitespace-only value as not set.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_env_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
