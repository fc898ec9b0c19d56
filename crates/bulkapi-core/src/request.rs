use serde_json::{Map, Value};

use crate::descriptor::SubRequest;
use crate::results::ResultSet;

/// The request value handed to the orchestrator and, per sub-request, to the
/// handler. Mirrors the descriptor fields and carries the root result set so
/// nested bulk invocations can reference everything produced so far.
#[derive(Clone, Debug, Default)]
pub struct BulkRequest {
    pub method: Option<String>,
    pub url: String,
    pub headers: Map<String, Value>,
    pub body: Value,
    pub first: bool,
    /// Root result set established by an enclosing bulk invocation, if any.
    pub root_results: Option<ResultSet>,
}

impl BulkRequest {
    /// A top-level request carrying only a bulk payload body.
    pub fn new(body: Value) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    /// The per-dispatch request: descriptor fields copied over, root set
    /// attached.
    pub fn from_sub(sub: SubRequest, root: ResultSet) -> Self {
        Self {
            method: sub.method,
            url: sub.url,
            headers: sub.headers,
            body: sub.body,
            first: sub.first,
            root_results: Some(root),
        }
    }
}
