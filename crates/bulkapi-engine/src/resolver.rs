use std::sync::Arc;

use bulkapi_core::{EvalError, Evaluator, ResolutionContext};
use serde_json::{Map, Value};
use tracing::warn;

/// Walks sub-request bodies, expanding deferred references and substituting
/// template leaves through the injected evaluator.
///
/// The resolver owns the tree structure (recursion, depth guard, deferred
/// markers); the evaluator owns leaf substitution and its grammar stays
/// opaque to the engine.
pub struct Resolver {
    evaluator: Arc<dyn Evaluator>,
    max_depth: usize,
}

impl Resolver {
    pub fn new(evaluator: Arc<dyn Evaluator>, max_depth: usize) -> Self {
        Self {
            evaluator,
            max_depth,
        }
    }

    /// Resolve one body against the context, returning the rewritten value.
    pub fn resolve_body(&self, body: Value, ctx: &ResolutionContext) -> Result<Value, EvalError> {
        let body = self.expand(body, ctx)?;
        self.walk(body, ctx, 0)
    }

    /// Deferred-reference expansion at the body root: a `from` that
    /// evaluates to a sequence turns `_` into one evaluated clone of the
    /// template per element, with `$data`/`$` bound. `from` is removed
    /// whether or not it expanded.
    fn expand(&self, body: Value, ctx: &ResolutionContext) -> Result<Value, EvalError> {
        let mut map = match body {
            Value::Object(map) => map,
            other => return Ok(other),
        };
        let from = match map.remove("from") {
            Some(from) => self.walk(from, ctx, 0)?,
            None => return Ok(Value::Object(map)),
        };
        if let Value::Array(elements) = from {
            let template = map.get("_").cloned().unwrap_or(Value::Null);
            let mut expanded = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                let child = ctx.with_expansion(element, index);
                expanded.push(self.walk(template.clone(), &child, 0)?);
            }
            map.insert("_".to_string(), Value::Array(expanded));
        }
        Ok(Value::Object(map))
    }

    fn walk(&self, node: Value, ctx: &ResolutionContext, depth: usize) -> Result<Value, EvalError> {
        if depth > self.max_depth {
            warn!(depth, "max walk depth exceeded, leaving subtree unresolved");
            return Ok(node);
        }
        match node {
            Value::Object(map) => {
                // An object with both `from` and `_` is a deferred marker
                // belonging to a nested bulk invocation: its sibling keys
                // resolve now, the marker subtrees stay untouched.
                let deferred = map.contains_key("from") && map.contains_key("_");
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    let value = if deferred && (key == "from" || key == "_") {
                        value
                    } else {
                        self.walk(value, ctx, depth + 1)?
                    };
                    out.insert(key, value);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.walk(item, ctx, depth + 1)?);
                }
                Ok(Value::Array(out))
            }
            leaf => self.evaluator.evaluate(&leaf, ctx),
        }
    }
}
