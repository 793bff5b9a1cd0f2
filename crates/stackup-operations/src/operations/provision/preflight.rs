use tracing::debug;

use crate::config::RunConfiguration;
use crate::traits::{FunctionLookup, FunctionService, RestApiService};
use crate::types::ResourceKind;
use crate::{OperationError, Result};

/// Number of REST APIs inspected when looking for a name clash.
pub const REST_API_LIST_LIMIT: i32 = 500;

/// Refuses the run if the function or the REST API already exists.
///
/// Nothing is created here, so a refusal needs no rollback. A lookup that
/// fails for any reason other than a definitive not-found answer is reported
/// as [`OperationError::ExistenceCheck`] rather than treated as absence.
pub(super) async fn ensure_absent<F, A>(
    functions: &F,
    rest_apis: &A,
    config: &RunConfiguration,
) -> Result<()>
where
    F: FunctionService,
    A: RestApiService,
{
    let function_name = &config.function.name;
    match functions.get_function(function_name).await {
        Ok(FunctionLookup::NotFound) => {
            debug!(function = %function_name, "function name is free");
        }
        Ok(FunctionLookup::Found) => {
            return Err(OperationError::AlreadyExists {
                kind: ResourceKind::Function,
                name: function_name.clone(),
            });
        }
        Err(source) => {
            return Err(OperationError::ExistenceCheck {
                kind: ResourceKind::Function,
                name: function_name.clone(),
                source: Box::new(source),
            });
        }
    }

    let api_name = &config.endpoint.api_name;
    let existing = rest_apis
        .list_rest_apis(REST_API_LIST_LIMIT)
        .await
        .map_err(|source| OperationError::ExistenceCheck {
            kind: ResourceKind::RestApi,
            name: api_name.clone(),
            source: Box::new(source),
        })?;

    if existing
        .iter()
        .any(|api| api.name.as_deref() == Some(api_name.as_str()))
    {
        return Err(OperationError::AlreadyExists {
            kind: ResourceKind::RestApi,
            name: api_name.clone(),
        });
    }

    debug!(api = %api_name, checked = existing.len(), "REST API name is free");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mocks::{CallLog, MockFunctionService, MockRestApiService, sample_configuration};

    #[tokio::test]
    async fn passes_when_neither_resource_exists() -> anyhow::Result<()> {
        let calls = Arc::new(CallLog::default());
        let functions = MockFunctionService::new(Arc::clone(&calls));
        let rest_apis = MockRestApiService::new(Arc::clone(&calls))
            .with_existing_api("billing-api");

        ensure_absent(&functions, &rest_apis, &sample_configuration()).await?;

        assert_eq!(
            calls.entries(),
            vec!["lambda:GetFunction orders-fn", "apigateway:GetRestApis 500"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn existing_function_is_a_precondition_violation() {
        let calls = Arc::new(CallLog::default());
        let functions =
            MockFunctionService::new(Arc::clone(&calls)).with_existing_function("orders-fn");
        let rest_apis = MockRestApiService::new(Arc::clone(&calls));

        let err = ensure_absent(&functions, &rest_apis, &sample_configuration())
            .await
            .expect_err("existing function must be refused");

        assert!(matches!(
            err,
            OperationError::AlreadyExists {
                kind: ResourceKind::Function,
                ..
            }
        ));
        assert_eq!(calls.entries(), vec!["lambda:GetFunction orders-fn"]);
    }

    #[tokio::test]
    async fn api_name_must_match_exactly() -> anyhow::Result<()> {
        let calls = Arc::new(CallLog::default());
        let functions = MockFunctionService::new(Arc::clone(&calls));
        let rest_apis = MockRestApiService::new(Arc::clone(&calls))
            .with_existing_api("orders-api-v2")
            .with_existing_api("Orders-Api");

        ensure_absent(&functions, &rest_apis, &sample_configuration()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn existing_api_is_a_precondition_violation() {
        let calls = Arc::new(CallLog::default());
        let functions = MockFunctionService::new(Arc::clone(&calls));
        let rest_apis =
            MockRestApiService::new(Arc::clone(&calls)).with_existing_api("orders-api");

        let err = ensure_absent(&functions, &rest_apis, &sample_configuration())
            .await
            .expect_err("existing API must be refused");

        assert_eq!(err.to_string(), "REST API 'orders-api' already exists");
    }

    #[tokio::test]
    async fn lookup_failure_is_not_treated_as_absence() {
        let calls = Arc::new(CallLog::default());
        let functions = MockFunctionService::new(Arc::clone(&calls)).failing_on("GetFunction");
        let rest_apis = MockRestApiService::new(Arc::clone(&calls));

        let err = ensure_absent(&functions, &rest_apis, &sample_configuration())
            .await
            .expect_err("lookup failure must propagate");

        assert!(matches!(
            err,
            OperationError::ExistenceCheck {
                kind: ResourceKind::Function,
                ..
            }
        ));
        assert!(!err.is_precondition_violation());
    }

    #[tokio::test]
    async fn listing_failure_is_not_treated_as_absence() {
        let calls = Arc::new(CallLog::default());
        let functions = MockFunctionService::new(Arc::clone(&calls));
        let rest_apis = MockRestApiService::new(Arc::clone(&calls)).failing_on("GetRestApis");

        let err = ensure_absent(&functions, &rest_apis, &sample_configuration())
            .await
            .expect_err("listing failure must propagate");

        assert!(matches!(
            err,
            OperationError::ExistenceCheck {
                kind: ResourceKind::RestApi,
                ..
            }
        ));
    }
}
