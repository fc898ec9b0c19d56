use serde_json::Value;

/// The values visible to expression evaluation at one point of the walk.
///
/// `result` and `root_result` are snapshots: `result` holds what the current
/// batch has produced so far, `root_result` everything produced across the
/// whole (possibly nested) bulk operation. `data` and `index` are bound only
/// while expanding a deferred reference. One context is built per
/// resolve-request invocation and discarded afterwards.
#[derive(Clone, Debug, Default)]
pub struct ResolutionContext {
    pub result: Vec<Value>,
    pub root_result: Vec<Value>,
    pub data: Option<Value>,
    pub index: Option<usize>,
}

impl ResolutionContext {
    pub fn new(result: Vec<Value>, root_result: Vec<Value>) -> Self {
        Self {
            result,
            root_result,
            data: None,
            index: None,
        }
    }

    /// Derive the context for one expansion element.
    pub fn with_expansion(&self, data: Value, index: usize) -> Self {
        Self {
            result: self.result.clone(),
            root_result: self.root_result.clone(),
            data: Some(data),
            index: Some(index),
        }
    }
}

/// The opaque expression evaluator the resolver routes leaves through.
///
/// The grammar is the implementation's business; the engine only cares that
/// a leaf comes back as the value to substitute in its place. Implementations
/// must leave non-expression leaves unchanged.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, node: &Value, ctx: &ResolutionContext) -> Result<Value, EvalError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    #[error("unresolved reference: {0}")]
    Unresolved(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expansion_context_binds_data_and_index() {
        let ctx = ResolutionContext::new(vec![json!(1)], vec![json!(1), json!(2)]);
        assert_eq!(ctx.data, None);
        assert_eq!(ctx.index, None);

        let child = ctx.with_expansion(json!("x"), 3);
        assert_eq!(child.data, Some(json!("x")));
        assert_eq!(child.index, Some(3));
        assert_eq!(child.result, ctx.result);
        assert_eq!(child.root_result, ctx.root_result);
    }

    #[test]
    fn eval_error_display() {
        let err = EvalError::Unresolved("result[9]".into());
        assert_eq!(err.to_string(), "unresolved reference: result[9]");
    }
}
