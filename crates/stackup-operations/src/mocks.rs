use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{EndpointSpec, FunctionSpec, RunConfiguration};
use crate::context::{ContextSlot, SagaContext};
use crate::traits::{
    ApiResource, FunctionLookup, FunctionService, IntegrationRequest, PermissionGrant,
    ProvisionReporter, RestApiService, RestApiSummary,
};
use crate::types::{ProvisionedStack, ResourceKind};
use crate::{OperationError, Result};

pub const REGION: &str = "eu-central-1";
pub const ACCOUNT_ID: &str = "123456789012";

#[must_use]
pub fn sample_configuration() -> RunConfiguration {
    RunConfiguration::new(
        REGION,
        FunctionSpec::new(
            "orders-fn",
            "arn:aws:iam::123456789012:role/lambda-basic",
            vec![0x50, 0x4b, 0x03, 0x04],
        ),
        EndpointSpec::new("orders-api", "orders"),
    )
}

#[must_use]
pub fn function_arn(name: &str) -> String {
    format!("arn:aws:lambda:{REGION}:{ACCOUNT_ID}:function:{name}")
}

fn injected(operation: &'static str) -> OperationError {
    OperationError::remote(operation, "injected failure")
}

/// Ordered record of every remote call made through the mocks.
#[derive(Default)]
pub struct CallLog {
    entries: Mutex<Vec<String>>,
}

impl CallLog {
    pub fn record(&self, entry: String) {
        self.entries.lock().expect("lock poisoned").push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|entry| entry.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }

    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.operations()
            .iter()
            .filter(|recorded| recorded.as_str() == operation)
            .count()
    }

    pub fn clear(&self) {
        self.entries.lock().expect("lock poisoned").clear();
    }
}

pub struct MockFunctionService {
    calls: Arc<CallLog>,
    functions: Mutex<HashSet<String>>,
    grants: Mutex<Vec<PermissionGrant>>,
    created: Mutex<Vec<FunctionSpec>>,
    failures: HashSet<&'static str>,
    omit_arn: bool,
}

impl MockFunctionService {
    #[must_use]
    pub fn new(calls: Arc<CallLog>) -> Self {
        Self {
            calls,
            functions: Mutex::new(HashSet::new()),
            grants: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            failures: HashSet::new(),
            omit_arn: false,
        }
    }

    #[must_use]
    pub fn with_existing_function(self, name: &str) -> Self {
        self.functions
            .lock()
            .expect("lock poisoned")
            .insert(name.to_string());
        self
    }

    #[must_use]
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failures.insert(operation);
        self
    }

    #[must_use]
    pub fn without_arn_in_response(mut self) -> Self {
        self.omit_arn = true;
        self
    }

    #[must_use]
    pub fn function_exists(&self, name: &str) -> bool {
        self.functions.lock().expect("lock poisoned").contains(name)
    }

    #[must_use]
    pub fn grants(&self) -> Vec<PermissionGrant> {
        self.grants.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn created_specs(&self) -> Vec<FunctionSpec> {
        self.created.lock().expect("lock poisoned").clone()
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failures.contains(operation) {
            return Err(injected(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl FunctionService for MockFunctionService {
    async fn get_function(&self, name: &str) -> Result<FunctionLookup> {
        self.calls.record(format!("lambda:GetFunction {name}"));
        self.check("GetFunction")?;
        if self.function_exists(name) {
            Ok(FunctionLookup::Found)
        } else {
            Ok(FunctionLookup::NotFound)
        }
    }

    async fn create_function(&self, spec: &FunctionSpec) -> Result<Option<String>> {
        self.calls
            .record(format!("lambda:CreateFunction {}", spec.name));
        self.check("CreateFunction")?;
        self.functions
            .lock()
            .expect("lock poisoned")
            .insert(spec.name.clone());
        self.created
            .lock()
            .expect("lock poisoned")
            .push(spec.clone());
        Ok((!self.omit_arn).then(|| function_arn(&spec.name)))
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        self.calls.record(format!("lambda:DeleteFunction {name}"));
        self.check("DeleteFunction")?;
        self.functions.lock().expect("lock poisoned").remove(name);
        Ok(())
    }

    async fn add_permission(&self, _function_name: &str, grant: &PermissionGrant) -> Result<()> {
        self.calls
            .record(format!("lambda:AddPermission {}", grant.statement_id));
        self.check("AddPermission")?;
        self.grants
            .lock()
            .expect("lock poisoned")
            .push(grant.clone());
        Ok(())
    }
}

pub struct MockRestApiService {
    calls: Arc<CallLog>,
    apis: Mutex<Vec<RestApiSummary>>,
    integrations: Mutex<Vec<IntegrationRequest>>,
    next_id: AtomicUsize,
    failures: HashSet<&'static str>,
    omitted_ids: HashSet<&'static str>,
}

impl MockRestApiService {
    #[must_use]
    pub fn new(calls: Arc<CallLog>) -> Self {
        Self {
            calls,
            apis: Mutex::new(Vec::new()),
            integrations: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            failures: HashSet::new(),
            omitted_ids: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_existing_api(self, name: &str) -> Self {
        let id = self.allocate_id();
        self.apis
            .lock()
            .expect("lock poisoned")
            .push(RestApiSummary {
                id: Some(id),
                name: Some(name.to_string()),
            });
        self
    }

    #[must_use]
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failures.insert(operation);
        self
    }

    /// Makes `operation` succeed without returning the identifier it normally reports.
    #[must_use]
    pub fn omitting_id_from(mut self, operation: &'static str) -> Self {
        self.omitted_ids.insert(operation);
        self
    }

    #[must_use]
    pub fn api_exists(&self, name: &str) -> bool {
        self.apis
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|api| api.name.as_deref() == Some(name))
    }

    #[must_use]
    pub fn integrations(&self) -> Vec<IntegrationRequest> {
        self.integrations.lock().expect("lock poisoned").clone()
    }

    fn allocate_id(&self) -> String {
        format!("api{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        if self.failures.contains(operation) {
            return Err(injected(operation));
        }
        Ok(())
    }

    fn reported(&self, operation: &'static str, id: String) -> Option<String> {
        (!self.omitted_ids.contains(operation)).then_some(id)
    }
}

#[async_trait]
impl RestApiService for MockRestApiService {
    async fn list_rest_apis(&self, limit: i32) -> Result<Vec<RestApiSummary>> {
        self.calls.record(format!("apigateway:GetRestApis {limit}"));
        self.check("GetRestApis")?;
        let take = usize::try_from(limit).unwrap_or_default();
        Ok(self
            .apis
            .lock()
            .expect("lock poisoned")
            .iter()
            .take(take)
            .cloned()
            .collect())
    }

    async fn create_rest_api(&self, name: &str) -> Result<Option<String>> {
        self.calls
            .record(format!("apigateway:CreateRestApi {name}"));
        self.check("CreateRestApi")?;
        let id = self.allocate_id();
        self.apis
            .lock()
            .expect("lock poisoned")
            .push(RestApiSummary {
                id: Some(id.clone()),
                name: Some(name.to_string()),
            });
        Ok(self.reported("CreateRestApi", id))
    }

    async fn get_resources(&self, rest_api_id: &str) -> Result<Vec<ApiResource>> {
        self.calls
            .record(format!("apigateway:GetResources {rest_api_id}"));
        self.check("GetResources")?;
        if self.omitted_ids.contains("GetResources") {
            return Ok(Vec::new());
        }
        Ok(vec![
            ApiResource {
                id: Some(format!("{rest_api_id}-root")),
                path: Some("/".to_string()),
            },
            ApiResource {
                id: Some(format!("{rest_api_id}-health")),
                path: Some("/health".to_string()),
            },
        ])
    }

    async fn create_resource(
        &self,
        rest_api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> Result<Option<String>> {
        self.calls
            .record(format!("apigateway:CreateResource {parent_id}/{path_part}"));
        self.check("CreateResource")?;
        Ok(self.reported("CreateResource", format!("{rest_api_id}-{path_part}")))
    }

    async fn put_method(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        authorization_type: &str,
    ) -> Result<()> {
        self.calls.record(format!(
            "apigateway:PutMethod {resource_id} {http_method} {authorization_type}"
        ));
        self.check("PutMethod")
    }

    async fn put_integration(&self, request: &IntegrationRequest) -> Result<()> {
        self.calls.record(format!(
            "apigateway:PutIntegration {} {}",
            request.resource_id, request.integration_http_method
        ));
        self.check("PutIntegration")?;
        self.integrations
            .lock()
            .expect("lock poisoned")
            .push(request.clone());
        Ok(())
    }

    async fn put_integration_response(
        &self,
        _rest_api_id: &str,
        resource_id: &str,
        http_method: &str,
        status_code: &str,
    ) -> Result<()> {
        self.calls.record(format!(
            "apigateway:PutIntegrationResponse {resource_id} {http_method} {status_code}"
        ));
        self.check("PutIntegrationResponse")
    }

    async fn create_deployment(&self, rest_api_id: &str, stage_name: &str) -> Result<()> {
        self.calls
            .record(format!("apigateway:CreateDeployment {rest_api_id} {stage_name}"));
        self.check("CreateDeployment")
    }

    async fn delete_rest_api(&self, rest_api_id: &str) -> Result<()> {
        self.calls
            .record(format!("apigateway:DeleteRestApi {rest_api_id}"));
        self.check("DeleteRestApi")?;
        self.apis
            .lock()
            .expect("lock poisoned")
            .retain(|api| api.id.as_deref() != Some(rest_api_id));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<String>>,
    snapshots: Mutex<Vec<SagaContext>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock poisoned").clone()
    }

    #[must_use]
    pub fn failure_snapshots(&self) -> Vec<SagaContext> {
        self.snapshots.lock().expect("lock poisoned").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("lock poisoned").push(event);
    }
}

impl ProvisionReporter for RecordingReporter {
    fn step_failed(&self, step: &str, cause: &OperationError, snapshot: &SagaContext) {
        self.push(format!("failed {step}: {cause}"));
        self.snapshots
            .lock()
            .expect("lock poisoned")
            .push(snapshot.clone());
    }

    fn rolling_back(&self, snapshot: &SagaContext) {
        let slots: Vec<&str> = snapshot
            .populated_slots()
            .into_iter()
            .map(ContextSlot::as_str)
            .collect();
        self.push(format!("rolling back {}", slots.join(",")));
    }

    fn resource_deleted(&self, kind: ResourceKind, id: &str) {
        self.push(format!("deleted {kind} {id}"));
    }

    fn succeeded(&self, stack: &ProvisionedStack) {
        self.push(format!("succeeded {}", stack.invoke_url));
    }
}
