//! Builders for the ARNs and URLs that wire the REST API to the function.

use crate::{OperationError, Result};

/// Stage every deployment is published to.
pub const DEFAULT_STAGE: &str = "default";

/// Invocation URI a proxy integration uses to reach the function.
#[must_use]
pub fn build_invocation_uri(region: &str, function_arn: &str) -> String {
    format!(
        "arn:aws:apigateway:{region}:lambda:path/2015-03-31/functions/{function_arn}/invocations"
    )
}

/// Account id embedded in a function ARN.
///
/// # Errors
///
/// Returns [`OperationError::MalformedArn`] if the ARN does not have the
/// `arn:partition:service:region:account:...` shape or the account field is empty.
pub fn account_id_from_function_arn(function_arn: &str) -> Result<&str> {
    let mut fields = function_arn.split(':');
    let is_arn = fields.next() == Some("arn");
    match fields.nth(3) {
        Some(account) if is_arn && !account.is_empty() => Ok(account),
        _ => Err(OperationError::MalformedArn {
            arn: function_arn.to_string(),
        }),
    }
}

/// Source ARN a permission is scoped to. `stage` may be `*` to cover the
/// console's test invocations.
#[must_use]
pub fn build_permission_source_arn(
    region: &str,
    account_id: &str,
    api_id: &str,
    stage: &str,
    path_part: &str,
) -> String {
    format!("arn:aws:execute-api:{region}:{account_id}:{api_id}/{stage}/*/{path_part}")
}

#[must_use]
pub fn build_invoke_url(api_id: &str, region: &str, stage: &str, path_part: &str) -> String {
    format!("https://{api_id}.execute-api.{region}.amazonaws.com/{stage}/{path_part}")
}
