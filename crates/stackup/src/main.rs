mod error;
mod output;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use stackup_operations::config::{DEFAULT_HANDLER, DEFAULT_RUNTIME};
use stackup_operations::operations::ProvisionOperation;
use stackup_operations::providers::{
    ApiGatewayRestApiService, LambdaFunctionService, load_sdk_config,
};
use stackup_operations::{OperationError, RunConfiguration};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{CliError, Result};
use crate::output::ConsoleReporter;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "stackup")]
#[command(version)]
#[command(
    about = "Create a Lambda function behind an API Gateway REST API, rolling back on failure",
    long_about = None
)]
pub(crate) struct Cli {
    /// Region to create the resources in
    #[arg(long, env = "AWS_REGION")]
    pub(crate) region: Option<String>,

    /// Name of the function to create
    #[arg(long, env = "LAMBDA_FUNCTION_NAME")]
    pub(crate) function_name: Option<String>,

    /// ARN of the role the function runs as
    #[arg(long, env = "LAMBDA_EXECUTION_ROLE")]
    pub(crate) execution_role: Option<String>,

    /// Name of the REST API to create
    #[arg(long, env = "APIGATEWAY_API_NAME")]
    pub(crate) api_name: Option<String>,

    /// Path segment of the resource that proxies to the function
    #[arg(long = "resource-path", env = "APIGATEWAY_RESOURCE_PATH_PART")]
    pub(crate) resource_path_part: Option<String>,

    /// Zip archive with the function code
    #[arg(long, default_value = "bundle.zip")]
    pub(crate) bundle: PathBuf,

    /// Function runtime identifier
    #[arg(long, default_value = DEFAULT_RUNTIME)]
    pub(crate) runtime: String,

    /// Function entry point
    #[arg(long, default_value = DEFAULT_HANDLER)]
    pub(crate) handler: String,

    /// Function timeout in seconds (default: 8)
    #[arg(long)]
    pub(crate) timeout: Option<u32>,

    /// Function memory size in MB (default: 256)
    #[arg(long)]
    pub(crate) memory: Option<u32>,

    /// Environment variable for the function, may be repeated
    #[arg(
        long = "env",
        value_name = "KEY=VALUE",
        value_parser = settings::parse_env_assignment
    )]
    pub(crate) environment: Vec<(String, String)>,

    /// Keep resources created before a failure instead of deleting them
    #[arg(long)]
    pub(crate) no_rollback: bool,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide = true, hide_env_values = true)]
    pub(crate) access_key_id: Option<String>,

    #[arg(
        long,
        env = "AWS_SECRET_ACCESS_KEY",
        hide = true,
        hide_env_values = true
    )]
    pub(crate) secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide = true, hide_env_values = true)]
    pub(crate) session_token: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        print_error(&e);
        if let CliError::Operation(OperationError::Provisioning {
            snapshot,
            rollback,
            ..
        }) = &e
        {
            output::print_rollback_summary(snapshot, rollback);
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(cli)?;
    let rollback = settings.rollback;
    let config: RunConfiguration = settings.into_run_configuration()?;
    config.validate()?;

    let credentials = config.credentials.as_ref();
    let sdk_config = load_sdk_config(&config.region, credentials).await;
    let operation = ProvisionOperation::new(
        Arc::new(LambdaFunctionService::new(&sdk_config)),
        Arc::new(ApiGatewayRestApiService::new(&sdk_config)),
        Arc::new(ConsoleReporter),
    )
    .with_rollback(rollback);

    operation.execute(&config).await?;
    Ok(())
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
