use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, error, instrument};

use bulkapi_core::ids::{BulkId, CallId};
use bulkapi_core::util::stringify;
use bulkapi_core::{
    BulkRequest, Evaluator, Handler, Outcome, ResolutionContext, Responder, ResultSet, SubRequest,
};

use crate::divide::divide_indexed;
use crate::error::BulkError;
use crate::resolver::Resolver;

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct BulkConfig {
    /// Maximum tree-walk depth before the resolver leaves a subtree as-is.
    pub max_depth: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

type SuccessFn = Box<dyn Fn(&mut Responder, &[Value]) + Send + Sync>;
type FailureFn = Box<dyn Fn(&mut Responder, &BulkError) + Send + Sync>;

/// Splits one bulk request into its sub-requests, drives them through the
/// handler in three phases, and recombines the outcomes into a single
/// ordered result sequence.
pub struct BulkApi {
    handler: Arc<dyn Handler>,
    resolver: Resolver,
    on_success: SuccessFn,
    on_failure: FailureFn,
}

impl BulkApi {
    pub fn new(handler: Arc<dyn Handler>, evaluator: Arc<dyn Evaluator>) -> Self {
        Self::with_config(handler, evaluator, BulkConfig::default())
    }

    pub fn with_config(
        handler: Arc<dyn Handler>,
        evaluator: Arc<dyn Evaluator>,
        config: BulkConfig,
    ) -> Self {
        Self {
            handler,
            resolver: Resolver::new(evaluator, config.max_depth),
            on_success: Box::new(|res, results| {
                res.end(Some(Value::String(stringify(&Value::Array(
                    results.to_vec(),
                )))));
            }),
            on_failure: Box::new(|res, err| {
                res.status(409);
                res.end(Some(Value::String(err.to_string())));
            }),
        }
    }

    /// Replace the success continuation used by [`call_bulk`](Self::call_bulk).
    pub fn with_success(
        mut self,
        on_success: impl Fn(&mut Responder, &[Value]) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Box::new(on_success);
        self
    }

    /// Replace the failure continuation used by [`call_bulk`](Self::call_bulk).
    pub fn with_failure(
        mut self,
        on_failure: impl Fn(&mut Responder, &BulkError) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Box::new(on_failure);
        self
    }

    /// Resolve a whole bulk request into its ordered result sequence.
    ///
    /// Three phases over the divided descriptors: immediate bodies pass
    /// through, sequential dispatches are awaited one at a time, parallel
    /// dispatches are resolved up front and awaited as one batch. Outcomes
    /// come back in the positions their sub-requests held in the payload.
    #[instrument(skip(self, req), fields(bulk_id = tracing::field::Empty))]
    pub async fn resolve(&self, req: BulkRequest) -> Result<Vec<Value>, BulkError> {
        let bulk_id = BulkId::new();
        tracing::Span::current().record("bulk_id", bulk_id.as_str());

        let results = ResultSet::new();
        let root = req
            .root_results
            .clone()
            .unwrap_or_else(|| results.clone());

        // The root body may itself carry a deferred reference that generates
        // the sub-request list.
        let body = self
            .resolver
            .resolve_body(req.body, &context(&results, &root))?;

        let subs = divide_indexed(&body);
        debug!(subrequests = subs.len(), "bulk payload divided");

        let mut ordered: Vec<(usize, Value)> = Vec::with_capacity(subs.len());
        let mut cursor = 0;

        // Immediate phase: bodies pass through without touching the handler.
        while cursor < subs.len() && subs[cursor].1.method.is_none() {
            let (position, sub) = &subs[cursor];
            let body = self
                .resolver
                .resolve_body(sub.body.clone(), &context(&results, &root))?;
            results.push(body.clone());
            ordered.push((*position, body));
            cursor += 1;
        }

        // Sequential phase: dispatch and await one at a time so later
        // sub-requests can reference these outcomes.
        while cursor < subs.len() && subs[cursor].1.first {
            let (position, sub) = &subs[cursor];
            let mut sub = sub.clone();
            sub.body = self
                .resolver
                .resolve_body(sub.body, &context(&results, &root))?;
            let outcome = self.dispatch(sub, &root).await?;
            results.push(outcome.clone());
            ordered.push((*position, outcome));
            cursor += 1;
        }

        // Parallel phase: every remaining body resolves before any dispatch,
        // so a parallel sub-request can reference immediate and sequential
        // outcomes but never another parallel one.
        let mut positions = Vec::with_capacity(subs.len() - cursor);
        let mut pending = Vec::with_capacity(subs.len() - cursor);
        for (position, sub) in &subs[cursor..] {
            let mut sub = sub.clone();
            sub.body = self
                .resolver
                .resolve_body(sub.body, &context(&results, &root))?;
            positions.push(*position);
            pending.push(self.dispatch(sub, &root));
        }
        if !pending.is_empty() {
            debug!(parallel = pending.len(), "awaiting parallel batch");
            let outcomes = try_join_all(pending).await?;
            results.extend(outcomes.clone());
            ordered.extend(positions.into_iter().zip(outcomes));
        }

        ordered.sort_by_key(|(position, _)| *position);
        Ok(ordered.into_iter().map(|(_, value)| value).collect())
    }

    /// Bridge one descriptor to the external handler and await its outcome.
    async fn dispatch(&self, sub: SubRequest, root: &ResultSet) -> Result<Value, BulkError> {
        let call_id = CallId::new();
        debug!(call_id = %call_id, url = %sub.url, "dispatching sub-request");
        let (responder, completion) = Responder::channel();
        let req = BulkRequest::from_sub(sub, root.clone());
        self.handler.handle(req, responder).await?;
        match completion.await {
            Ok(Outcome::Resolved(value)) => Ok(value),
            Ok(Outcome::Rejected(value)) => Err(BulkError::Rejected(value)),
            Err(_) => Err(BulkError::NoResponse),
        }
    }

    /// Top-level entry: resolve the bulk request and complete the outer
    /// responder through the success or failure continuation.
    pub async fn call_bulk(&self, req: BulkRequest, mut res: Responder) {
        match self.resolve(req).await {
            Ok(values) => (self.on_success)(&mut res, &values),
            Err(err) => {
                error!(error = %err, "bulk resolution failed");
                (self.on_failure)(&mut res, &err);
            }
        }
    }
}

fn context(results: &ResultSet, root: &ResultSet) -> ResolutionContext {
    ResolutionContext::new(results.snapshot(), root.snapshot())
}
