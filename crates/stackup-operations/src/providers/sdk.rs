use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_lambda::config::Credentials;
use tracing::debug;

use crate::config::StaticCredentials;

const CREDENTIALS_PROVIDER_NAME: &str = "stackup-static";

/// Loads shared SDK configuration for `region`.
///
/// Explicit credentials take precedence; otherwise the default provider chain
/// (environment, profile, instance metadata) is used.
pub async fn load_sdk_config(region: &str, credentials: Option<&StaticCredentials>) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    if let Some(credentials) = credentials {
        debug!(access_key_id = %credentials.access_key_id, "using static credentials");
        loader = loader.credentials_provider(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        ));
    }

    loader.load().await
}
