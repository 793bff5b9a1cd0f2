//! Run configuration for a single provisioning attempt.

use std::collections::BTreeMap;
use std::fmt;

use crate::{OperationError, Result};

pub const DEFAULT_TIMEOUT_SECONDS: u32 = 8;
pub const DEFAULT_MEMORY_SIZE_MB: u32 = 256;
pub const DEFAULT_RUNTIME: &str = "nodejs12.x";
pub const DEFAULT_HANDLER: &str = "index.handler";

const MAX_TIMEOUT_SECONDS: u32 = 900;
const MIN_MEMORY_SIZE_MB: u32 = 128;
const MAX_MEMORY_SIZE_MB: u32 = 10_240;

/// Explicit access keys used instead of the ambient credential chain.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// The serverless function to create.
#[derive(Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    /// Role the function assumes when it runs.
    pub execution_role: String,
    /// Zip archive holding the function code.
    pub code_bundle: Vec<u8>,
    pub runtime: String,
    pub handler: String,
    pub timeout_seconds: Option<u32>,
    pub memory_size_mb: Option<u32>,
    pub environment: BTreeMap<String, String>,
}

impl FunctionSpec {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        execution_role: impl Into<String>,
        code_bundle: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            execution_role: execution_role.into(),
            code_bundle,
            runtime: DEFAULT_RUNTIME.to_string(),
            handler: DEFAULT_HANDLER.to_string(),
            timeout_seconds: None,
            memory_size_mb: None,
            environment: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = handler.into();
        self
    }

    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u32) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_memory_size_mb(mut self, megabytes: u32) -> Self {
        self.memory_size_mb = Some(megabytes);
        self
    }

    #[must_use]
    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Timeout to create the function with. Zero counts as unset.
    #[must_use]
    pub fn effective_timeout_seconds(&self) -> u32 {
        self.timeout_seconds
            .filter(|&seconds| seconds != 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// Memory size to create the function with. Zero counts as unset.
    #[must_use]
    pub fn effective_memory_size_mb(&self) -> u32 {
        self.memory_size_mb
            .filter(|&megabytes| megabytes != 0)
            .unwrap_or(DEFAULT_MEMORY_SIZE_MB)
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("execution_role", &self.execution_role)
            .field(
                "code_bundle",
                &format_args!("<{} bytes>", self.code_bundle.len()),
            )
            .field("runtime", &self.runtime)
            .field("handler", &self.handler)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("memory_size_mb", &self.memory_size_mb)
            .field("environment", &self.environment.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The REST API and the single resource exposed through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub api_name: String,
    /// Path segment of the resource created under the API root.
    pub resource_path_part: String,
}

impl EndpointSpec {
    #[must_use]
    pub fn new(api_name: impl Into<String>, resource_path_part: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            resource_path_part: resource_path_part.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub region: String,
    /// `None` defers to the default credential chain.
    pub credentials: Option<StaticCredentials>,
    pub function: FunctionSpec,
    pub endpoint: EndpointSpec,
}

impl RunConfiguration {
    #[must_use]
    pub fn new(region: impl Into<String>, function: FunctionSpec, endpoint: EndpointSpec) -> Self {
        Self {
            region: region.into(),
            credentials: None,
            function,
            endpoint,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: StaticCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// # Errors
    ///
    /// Returns [`OperationError::InvalidConfiguration`] for the first blank
    /// required field, a path segment containing `/`, or a timeout or memory
    /// size outside the range the function service accepts.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("region", &self.region),
            ("function name", &self.function.name),
            ("execution role", &self.function.execution_role),
            ("runtime", &self.function.runtime),
            ("handler", &self.function.handler),
            ("API name", &self.endpoint.api_name),
            ("resource path", &self.endpoint.resource_path_part),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OperationError::InvalidConfiguration {
                    field,
                    reason: "must not be blank",
                });
            }
        }

        if self.endpoint.resource_path_part.contains('/') {
            return Err(OperationError::InvalidConfiguration {
                field: "resource path",
                reason: "must be a single path segment",
            });
        }

        if self.function.code_bundle.is_empty() {
            return Err(OperationError::InvalidConfiguration {
                field: "code bundle",
                reason: "must not be empty",
            });
        }

        let timeout = self.function.effective_timeout_seconds();
        if timeout > MAX_TIMEOUT_SECONDS {
            return Err(OperationError::InvalidConfiguration {
                field: "timeout",
                reason: "must be between 1 and 900 seconds",
            });
        }

        let memory = self.function.effective_memory_size_mb();
        if !(MIN_MEMORY_SIZE_MB..=MAX_MEMORY_SIZE_MB).contains(&memory) {
            return Err(OperationError::InvalidConfiguration {
                field: "memory size",
                reason: "must be between 128 and 10240 MB",
            });
        }

        Ok(())
    }
}
