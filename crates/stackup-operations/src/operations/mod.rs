mod provision;

pub use provision::{
    ProvisionOperation, ProvisionSagaContext, REST_API_LIST_LIMIT, RollbackFailure, RollbackReport,
};
