use bulkapi_core::{EvalError, Evaluator, ResolutionContext};
use serde_json::Value;

/// Identity evaluator: every leaf comes back unchanged. Lets the engine be
/// exercised with inert templates.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughEvaluator;

impl Evaluator for PassthroughEvaluator {
    fn evaluate(&self, node: &Value, _ctx: &ResolutionContext) -> Result<Value, EvalError> {
        Ok(node.clone())
    }
}

/// Evaluator that fails on every leaf, for failure-path tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingEvaluator;

impl Evaluator for FailingEvaluator {
    fn evaluate(&self, node: &Value, _ctx: &ResolutionContext) -> Result<Value, EvalError> {
        Err(EvalError::InvalidExpression(format!(
            "mock failure at {node}"
        )))
    }
}
