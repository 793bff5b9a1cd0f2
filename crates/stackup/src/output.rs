use std::fmt::Write;

use stackup_operations::operations::RollbackReport;
use stackup_operations::traits::ProvisionReporter;
use stackup_operations::{OperationError, ProvisionedStack, ResourceKind, SagaContext};

/// Prints provisioning progress for an operator watching the terminal.
pub(crate) struct ConsoleReporter;

impl ProvisionReporter for ConsoleReporter {
    fn step_failed(&self, step: &str, cause: &OperationError, snapshot: &SagaContext) {
        eprint!("{}", format_step_failure(step, cause, snapshot));
    }

    fn rolling_back(&self, _snapshot: &SagaContext) {
        eprintln!("Rolling back...");
    }

    fn resource_deleted(&self, kind: ResourceKind, id: &str) {
        eprintln!("  deleted {kind} '{id}'");
    }

    fn succeeded(&self, stack: &ProvisionedStack) {
        print!("{}", format_success(stack));
    }
}

pub(crate) fn print_rollback_summary(snapshot: &SagaContext, rollback: &RollbackReport) {
    if let Some(summary) = format_rollback_summary(snapshot, rollback) {
        eprint!("{summary}");
    }
}

fn format_step_failure(step: &str, cause: &OperationError, snapshot: &SagaContext) -> String {
    let mut output = format!("Step '{step}' failed: {cause}\n");
    let mut source = std::error::Error::source(cause);
    while let Some(inner) = source {
        let _ = writeln!(output, "  caused by: {inner}");
        source = inner.source();
    }
    let _ = writeln!(output, "Context at failure:\n{}", snapshot.to_json_pretty());
    output
}

fn format_success(stack: &ProvisionedStack) -> String {
    let mut output = String::from("Provisioned successfully\n");
    let _ = writeln!(output, "  function: {}", stack.function_arn);
    let _ = writeln!(output, "  REST API: {}", stack.api_id);
    let _ = writeln!(output, "  endpoint: {}", stack.invoke_url);
    output
}

/// Lists what an operator has to clean up by hand, if anything.
fn format_rollback_summary(snapshot: &SagaContext, rollback: &RollbackReport) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }

    if !rollback.attempted {
        return Some(format!(
            "Rollback disabled; created resources were left in place:\n{}\n",
            snapshot.to_json_pretty()
        ));
    }

    if rollback.is_clean() {
        return None;
    }

    let mut output = String::from("Rollback incomplete; delete these resources manually:\n");
    for failure in &rollback.failures {
        let _ = writeln!(output, "  {}", failure.message);
    }
    Some(output)
}
