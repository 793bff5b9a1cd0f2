use std::fmt;

use serde::Serialize;

/// Kind of cloud resource a provisioning run can leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Function,
    RestApi,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function => f.write_str("function"),
            Self::RestApi => f.write_str("REST API"),
        }
    }
}

/// Identifiers of a fully provisioned function and its public endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedStack {
    pub api_id: String,
    pub function_arn: String,
    /// Public URL of the deployed resource on the default stage.
    pub invoke_url: String,
}
