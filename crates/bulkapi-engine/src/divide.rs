use bulkapi_core::util::{stringify, truthy};
use bulkapi_core::SubRequest;
use serde_json::{Map, Value};

/// Normalize a raw bulk payload into the ordered list of sub-requests.
///
/// Accepts a single descriptor-like object, an array of them, or an object
/// carrying `base` defaults and `_` items. Anything that is not an object or
/// array divides into nothing. The output is stably partitioned by execution
/// class: no-method items first, then sequential, then parallel.
pub fn divide(payload: &Value) -> Vec<SubRequest> {
    divide_indexed(payload)
        .into_iter()
        .map(|(_, sub)| sub)
        .collect()
}

/// Like [`divide`], but each descriptor keeps the position it held in the
/// payload so the scheduler can return outcomes in input order.
pub(crate) fn divide_indexed(payload: &Value) -> Vec<(usize, SubRequest)> {
    let base = payload
        .get("base")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let items: Vec<Value> = match payload {
        Value::Object(map) => match map.get("_") {
            Some(Value::Array(seq)) => seq.clone(),
            Some(single) if truthy(single) => vec![single.clone()],
            _ => vec![payload.clone()],
        },
        Value::Array(seq) => seq.clone(),
        _ => return Vec::new(),
    };

    let mut subs: Vec<(usize, SubRequest)> = items
        .iter()
        .enumerate()
        .map(|(position, item)| (position, build(item, &base)))
        .collect();
    subs.sort_by_key(|(_, sub)| sub.class().rank());
    subs
}

fn build(item: &Value, base: &Map<String, Value>) -> SubRequest {
    let fields = item.as_object().cloned().unwrap_or_default();

    let method = non_empty_method(fields.get("method"))
        .or_else(|| non_empty_method(base.get("method")));

    let url = join_url(url_part(base.get("url")), url_part(fields.get("url")));

    let mut headers = base
        .get("headers")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(item_headers) = fields.get("headers").and_then(Value::as_object) {
        for (key, value) in item_headers {
            headers.insert(key.clone(), value.clone());
        }
    }

    let body = merge_bodies(base.get("body"), fields.get("body"));

    let first = match fields.get("first") {
        Some(flag) if !flag.is_null() => truthy(flag),
        _ => base.get("first").map(truthy).unwrap_or(false),
    };

    SubRequest {
        method,
        url,
        headers,
        body,
        first,
    }
}

fn non_empty_method(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn url_part(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v) => stringify(v),
    }
}

/// Join base and item URL with exactly one separating slash. Item URLs that
/// already start with `/` or `http` are appended as-is.
fn join_url(base: String, item: String) -> String {
    let base = match base.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => base,
    };
    if item.starts_with('/') || item.starts_with("http") {
        format!("{base}{item}")
    } else {
        format!("{base}/{item}")
    }
}

/// Merge base and item bodies, item winning on key conflicts. An
/// array-valued item body replaces wholesale as a fresh sequence.
fn merge_bodies(base: Option<&Value>, item: Option<&Value>) -> Value {
    if let Some(Value::Array(seq)) = item {
        return Value::Array(seq.clone());
    }
    let mut merged = base
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    if let Some(Value::Object(fields)) = item {
        for (key, value) in fields {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}
