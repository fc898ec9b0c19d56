use bulkapi_core::{EvalError, HandlerError};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("template evaluation failed: {0}")]
    Eval(#[from] EvalError),

    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("sub-request rejected: {0}")]
    Rejected(Value),

    #[error("handler dropped the response without finalizing")]
    NoResponse,
}
