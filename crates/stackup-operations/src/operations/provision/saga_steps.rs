use std::marker::PhantomData;

use async_trait::async_trait;
use stackup_saga::SagaStep;
use tracing::{debug, info};

use super::context::ProvisionSagaContext;
use super::rollback;
use super::saga_data::{ProvisionState, require_id};
use crate::arn::{self, DEFAULT_STAGE};
use crate::traits::{
    FunctionService, IntegrationRequest, PermissionGrant, ProvisionReporter, RestApiService,
};
use crate::{OperationError, Result};

const ANY_METHOD: &str = "ANY";
const NO_AUTHORIZATION: &str = "NONE";
const INTEGRATION_HTTP_METHOD: &str = "POST";
const SUCCESS_STATUS: &str = "200";
const INVOKE_ACTION: &str = "lambda:InvokeFunction";
const GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// Statement ids and stages of the two invoke permissions: one for console
/// test invocations on any stage, one for the deployed default stage.
const INVOKE_GRANTS: [(&str, &str); 2] = [
    ("apigateway-test", "*"),
    ("apigateway-default", DEFAULT_STAGE),
];

pub struct CreateRestApiStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> CreateRestApiStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for CreateRestApiStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for CreateRestApiStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "create_rest_api"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        mut input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        let api_id = create_rest_api(ctx)
            .await
            .map_err(|cause| input.fail(cause))?;

        info!(api_id = %api_id, api = %ctx.config().endpoint.api_name, "created REST API");
        input.context.record_api_id(api_id);
        Ok(input)
    }

    async fn compensate(
        &self,
        ctx: &Self::Context,
        output: Self::Output,
    ) -> std::result::Result<(), Self::Error> {
        match output.context.api_id() {
            Some(api_id) => rollback::delete_rest_api(ctx, api_id).await,
            None => Ok(()),
        }
    }

    fn compensation_description(&self) -> String {
        "delete the REST API".to_string()
    }
}

async fn create_rest_api<F, A, R>(ctx: &ProvisionSagaContext<F, A, R>) -> Result<String>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    let api_name = &ctx.config().endpoint.api_name;
    let api_id = ctx.rest_apis().create_rest_api(api_name).await?;
    require_id(api_id, "CreateRestApi", "an API id")
}

pub struct FindRootResourceStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> FindRootResourceStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for FindRootResourceStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for FindRootResourceStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "find_root_resource"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        mut input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        let root_id = find_root_resource(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;

        debug!(root_resource_id = %root_id, "found root resource");
        input.root_resource_id = Some(root_id);
        Ok(input)
    }
}

async fn find_root_resource<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<String>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    let resources = ctx.rest_apis().get_resources(state.api_id()?).await?;
    let root = resources
        .into_iter()
        .find(|resource| resource.path.as_deref() == Some("/"))
        .and_then(|resource| resource.id);
    require_id(root, "GetResources", "a root resource")
}

pub struct CreateResourceStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> CreateResourceStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for CreateResourceStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for CreateResourceStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "create_resource"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        mut input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        let resource_id = create_resource(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;

        info!(
            resource_id = %resource_id,
            path = %ctx.config().endpoint.resource_path_part,
            "created resource"
        );
        input.resource_id = Some(resource_id);
        Ok(input)
    }
}

async fn create_resource<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<String>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    let resource_id = ctx
        .rest_apis()
        .create_resource(
            state.api_id()?,
            state.root_resource_id()?,
            &ctx.config().endpoint.resource_path_part,
        )
        .await?;
    require_id(resource_id, "CreateResource", "a resource id")
}

pub struct PutMethodStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> PutMethodStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for PutMethodStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for PutMethodStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "put_method"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        put_method(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;

        debug!(method = ANY_METHOD, "declared method");
        Ok(input)
    }
}

async fn put_method<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    ctx.rest_apis()
        .put_method(
            state.api_id()?,
            state.resource_id()?,
            ANY_METHOD,
            NO_AUTHORIZATION,
        )
        .await
}

pub struct CreateFunctionStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> CreateFunctionStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for CreateFunctionStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for CreateFunctionStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "create_function"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        mut input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        let function_arn = create_function(ctx)
            .await
            .map_err(|cause| input.fail(cause))?;

        let runtime = &ctx.config().function.runtime;
        info!(function_arn = %function_arn, runtime = %runtime, "created function");
        input.context.record_function_arn(function_arn);
        Ok(input)
    }

    async fn compensate(
        &self,
        ctx: &Self::Context,
        output: Self::Output,
    ) -> std::result::Result<(), Self::Error> {
        if output.context.function_arn().is_none() {
            return Ok(());
        }
        rollback::delete_function(ctx, &ctx.config().function.name).await
    }

    fn compensation_description(&self) -> String {
        "delete the function".to_string()
    }
}

async fn create_function<F, A, R>(ctx: &ProvisionSagaContext<F, A, R>) -> Result<String>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    let spec = &ctx.config().function;
    let function_arn = ctx.functions().create_function(spec).await?;
    require_id(function_arn, "CreateFunction", "a function ARN")
}

pub struct PutIntegrationStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> PutIntegrationStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for PutIntegrationStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for PutIntegrationStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "put_integration"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        put_integration(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;

        debug!("wired proxy integration to function");
        Ok(input)
    }
}

async fn put_integration<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    let request = IntegrationRequest {
        rest_api_id: state.api_id()?.to_string(),
        resource_id: state.resource_id()?.to_string(),
        http_method: ANY_METHOD.to_string(),
        integration_http_method: INTEGRATION_HTTP_METHOD.to_string(),
        uri: arn::build_invocation_uri(&ctx.config().region, state.function_arn()?),
    };
    ctx.rest_apis().put_integration(&request).await
}

pub struct PutIntegrationResponseStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> PutIntegrationResponseStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for PutIntegrationResponseStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for PutIntegrationResponseStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "put_integration_response"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        put_integration_response(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;
        Ok(input)
    }
}

async fn put_integration_response<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    ctx.rest_apis()
        .put_integration_response(
            state.api_id()?,
            state.resource_id()?,
            ANY_METHOD,
            SUCCESS_STATUS,
        )
        .await
}

pub struct CreateDeploymentStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> CreateDeploymentStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for CreateDeploymentStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for CreateDeploymentStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "create_deployment"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        create_deployment(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;

        info!(stage = DEFAULT_STAGE, "deployed REST API");
        Ok(input)
    }
}

async fn create_deployment<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    ctx.rest_apis()
        .create_deployment(state.api_id()?, DEFAULT_STAGE)
        .await
}

pub struct GrantInvokePermissionsStep<F, A, R> {
    _marker: PhantomData<(F, A, R)>,
}

impl<F, A, R> GrantInvokePermissionsStep<F, A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F, A, R> Default for GrantInvokePermissionsStep<F, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F, A, R> SagaStep for GrantInvokePermissionsStep<F, A, R>
where
    F: FunctionService + 'static,
    A: RestApiService + 'static,
    R: ProvisionReporter + 'static,
{
    type Input = ProvisionState;
    type Output = ProvisionState;
    type Context = ProvisionSagaContext<F, A, R>;
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "grant_invoke_permissions"
    }

    async fn execute(
        &self,
        ctx: &Self::Context,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        grant_invoke_permissions(ctx, &input)
            .await
            .map_err(|cause| input.fail(cause))?;

        info!("granted REST API permission to invoke function");
        Ok(input)
    }
}

async fn grant_invoke_permissions<F, A, R>(
    ctx: &ProvisionSagaContext<F, A, R>,
    state: &ProvisionState,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    let config = ctx.config();
    let api_id = state.api_id()?;
    let account_id = arn::account_id_from_function_arn(state.function_arn()?)?;

    for (statement_id, stage) in INVOKE_GRANTS {
        let grant = PermissionGrant {
            statement_id: statement_id.to_string(),
            action: INVOKE_ACTION.to_string(),
            principal: GATEWAY_PRINCIPAL.to_string(),
            source_arn: arn::build_permission_source_arn(
                &config.region,
                account_id,
                api_id,
                stage,
                &config.endpoint.resource_path_part,
            ),
        };
        debug!(statement_id, source_arn = %grant.source_arn, "adding invoke permission");
        ctx.functions()
            .add_permission(&config.function.name, &grant)
            .await?;
    }
    Ok(())
}
