mod apigateway;
mod lambda;
mod sdk;

pub use apigateway::ApiGatewayRestApiService;
pub use lambda::LambdaFunctionService;
pub use sdk::load_sdk_config;

use aws_sdk_lambda::error::DisplayErrorContext;

use crate::OperationError;

fn remote_error(
    operation: &'static str,
    error: &(impl std::error::Error + 'static),
) -> OperationError {
    OperationError::remote(operation, DisplayErrorContext(error).to_string())
}
