use std::sync::Arc;

use crate::config::RunConfiguration;
use crate::traits::{FunctionService, ProvisionReporter, RestApiService};

/// Services and configuration shared by every step of one provisioning run.
pub struct ProvisionSagaContext<F, A, R> {
    config: Arc<RunConfiguration>,
    functions: Arc<F>,
    rest_apis: Arc<A>,
    reporter: Arc<R>,
}

impl<F, A, R> Clone for ProvisionSagaContext<F, A, R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            functions: Arc::clone(&self.functions),
            rest_apis: Arc::clone(&self.rest_apis),
            reporter: Arc::clone(&self.reporter),
        }
    }
}

impl<F, A, R> ProvisionSagaContext<F, A, R>
where
    F: FunctionService,
    A: RestApiService,
    R: ProvisionReporter,
{
    pub fn new(
        config: Arc<RunConfiguration>,
        functions: Arc<F>,
        rest_apis: Arc<A>,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            config,
            functions,
            rest_apis,
            reporter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    #[must_use]
    pub fn functions(&self) -> &F {
        &self.functions
    }

    #[must_use]
    pub fn rest_apis(&self) -> &A {
        &self.rest_apis
    }

    #[must_use]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }
}
