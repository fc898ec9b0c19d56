use bulkapi_core::{EvalError, Evaluator, ResolutionContext};
use serde_json::Value;

/// Default expression grammar: a string leaf that is, in full, a context
/// reference — `result`, `rootResult`, `$data`, or `$` — followed by any
/// chain of `.key` / `[index]` segments.
///
/// `"result[0].id"` substitutes the `id` field of the first result produced
/// in the current batch; `"$data"` and `"$"` substitute the current expansion
/// element and index. Anything that is not a reference (including `$data`/`$`
/// outside an expansion) passes through unchanged. Traversal into a bound
/// root that misses is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathEvaluator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Root {
    Result,
    RootResult,
    Data,
    Index,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

fn parse(expr: &str) -> Option<(Root, Vec<Segment>)> {
    let (root, mut rest) = if let Some(r) = expr.strip_prefix("rootResult") {
        (Root::RootResult, r)
    } else if let Some(r) = expr.strip_prefix("result") {
        (Root::Result, r)
    } else if let Some(r) = expr.strip_prefix("$data") {
        (Root::Data, r)
    } else if let Some(r) = expr.strip_prefix('$') {
        (Root::Index, r)
    } else {
        return None;
    };
    // Identifiers that merely start with a root name ("results", "$datum")
    // are not references.
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let mut segments = Vec::new();
    while !rest.is_empty() {
        if let Some(r) = rest.strip_prefix('.') {
            let end = r
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(r.len());
            if end == 0 {
                return None;
            }
            segments.push(Segment::Key(r[..end].to_string()));
            rest = &r[end..];
        } else if let Some(r) = rest.strip_prefix('[') {
            let close = r.find(']')?;
            let index: usize = r[..close].parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &r[close + 1..];
        } else {
            return None;
        }
    }
    Some((root, segments))
}

fn traverse(expr: &str, mut current: Value, segments: &[Segment]) -> Result<Value, EvalError> {
    for segment in segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(mut map)) => map
                .remove(key)
                .ok_or_else(|| EvalError::Unresolved(expr.to_string()))?,
            (Segment::Index(index), Value::Array(mut items)) => {
                if *index >= items.len() {
                    return Err(EvalError::Unresolved(expr.to_string()));
                }
                items.swap_remove(*index)
            }
            _ => return Err(EvalError::Unresolved(expr.to_string())),
        };
    }
    Ok(current)
}

impl Evaluator for PathEvaluator {
    fn evaluate(&self, node: &Value, ctx: &ResolutionContext) -> Result<Value, EvalError> {
        let expr = match node {
            Value::String(s) => s.as_str(),
            _ => return Ok(node.clone()),
        };
        let (root, segments) = match parse(expr) {
            Some(parsed) => parsed,
            None => return Ok(node.clone()),
        };
        let base = match root {
            Root::Result => Value::Array(ctx.result.clone()),
            Root::RootResult => Value::Array(ctx.root_result.clone()),
            Root::Data => match &ctx.data {
                Some(data) => data.clone(),
                None => return Ok(node.clone()),
            },
            Root::Index => match ctx.index {
                Some(index) => Value::from(index),
                None => return Ok(node.clone()),
            },
        };
        traverse(expr, base, &segments)
    }
}
