use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A normalized single sub-request, produced by dividing a bulk payload.
///
/// `url` is always fully joined (base + relative); `method`, `headers`,
/// `body`, and `first` have the base defaults already folded in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Map<String, Value>,
    #[serde(default = "empty_body")]
    pub body: Value,
    #[serde(default)]
    pub first: bool,
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

impl SubRequest {
    pub fn class(&self) -> ExecutionClass {
        ExecutionClass::of(self)
    }
}

impl Default for SubRequest {
    fn default() -> Self {
        Self {
            method: None,
            url: String::new(),
            headers: Map::new(),
            body: empty_body(),
            first: false,
        }
    }
}

/// Scheduling class of a sub-request. Derived from the descriptor, never
/// stored on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionClass {
    /// No method: the body is emitted without invoking the handler.
    Immediate,
    /// Method and `first`: dispatched and awaited one at a time.
    Sequential,
    /// Method, not `first`: dispatched together, awaited as a batch.
    Parallel,
}

impl ExecutionClass {
    pub fn of(sub: &SubRequest) -> Self {
        match (&sub.method, sub.first) {
            (None, _) => Self::Immediate,
            (Some(_), true) => Self::Sequential,
            (Some(_), false) => Self::Parallel,
        }
    }

    /// Phase ordering: Immediate < Sequential < Parallel.
    pub fn rank(self) -> u8 {
        match self {
            Self::Immediate => 0,
            Self::Sequential => 1,
            Self::Parallel => 2,
        }
    }
}
