//! bulkapi — bulk-request orchestration over a single-request handler.
//!
//! One composite payload describes several logical sub-requests; the engine
//! divides it, resolves cross-references between sub-requests and earlier
//! results, drives the descriptors through the handler in three phases
//! (immediate, sequential, parallel), and returns one ordered result
//! sequence.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use bulkapi::{BulkApi, BulkRequest, Handler, HandlerError, PathEvaluator, Responder};
//! use serde_json::json;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Handler for Echo {
//!     async fn handle(&self, req: BulkRequest, mut res: Responder) -> Result<(), HandlerError> {
//!         res.status(200).end(Some(json!({"url": req.url})));
//!         Ok(())
//!     }
//! }
//!
//! # async fn run() -> Result<(), bulkapi::BulkError> {
//! let api = BulkApi::new(Arc::new(Echo), Arc::new(PathEvaluator));
//! let results = api
//!     .resolve(BulkRequest::new(json!({
//!         "base": {"method": "GET"},
//!         "_": [{"url": "/a"}, {"url": "/b", "first": true}]
//!     })))
//!     .await?;
//! assert_eq!(results.len(), 2);
//! # Ok(())
//! # }
//! ```

pub use bulkapi_core::{
    BulkRequest, EvalError, Evaluator, ExecutionClass, Handler, HandlerError, Outcome,
    ResolutionContext, Responder, ResultSet, SubRequest,
};
pub use bulkapi_engine::{divide, BulkApi, BulkConfig, BulkError, Resolver};
pub use bulkapi_template::PathEvaluator;
