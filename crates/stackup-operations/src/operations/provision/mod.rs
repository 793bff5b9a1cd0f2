mod context;
mod operation;
mod preflight;
mod rollback;
mod saga_data;
mod saga_steps;

pub use context::ProvisionSagaContext;
pub use operation::ProvisionOperation;
pub use preflight::REST_API_LIST_LIMIT;
pub use rollback::{RollbackFailure, RollbackReport};
