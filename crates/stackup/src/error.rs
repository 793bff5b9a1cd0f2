use std::path::PathBuf;

use stackup_operations::OperationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid environment variables:\n- {}", format_missing(.0))]
    MissingEnvironment(Vec<&'static str>),

    #[error("failed to read code bundle '{}'", path.display())]
    BundleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Operation(#[from] OperationError),
}

fn format_missing(variables: &[&str]) -> String {
    variables
        .iter()
        .map(|variable| format!("{variable} needs to be set"))
        .collect::<Vec<_>>()
        .join("\n- ")
}

pub type Result<T> = std::result::Result<T, CliError>;
