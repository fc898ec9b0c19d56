use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::request::BulkRequest;
use crate::util::stringify;

/// Terminal signal of one dispatched sub-request.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Resolved(Value),
    Rejected(Value),
}

/// Errors a handler can raise instead of finalizing its responder.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("handler failed: {0}")]
    Failed(String),
}

/// The single-request handler the orchestrator fans out to.
///
/// A handler is expected to finalize its responder exactly once per
/// invocation (`end`, `send`, `json`, or `status(..)` followed by one of
/// them). Returning an error instead rejects that sub-request.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: BulkRequest, res: Responder) -> Result<(), HandlerError>;
}

/// Response builder handed to handlers.
///
/// Two states: Open while the completion channel is still held, Finalized
/// once it has been consumed. Finalized is terminal; every completion call
/// after the first is a no-op.
#[derive(Debug)]
pub struct Responder {
    status: Option<u16>,
    buffer: String,
    completion: Option<oneshot::Sender<Outcome>>,
}

impl Responder {
    /// Create a responder and the receiver its outcome arrives on.
    pub fn channel() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                status: None,
                buffer: String::new(),
                completion: Some(tx),
            },
            rx,
        )
    }

    /// Record the status code. Chainable.
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.status = Some(code);
        self
    }

    /// Append the stringified value to the response buffer without
    /// finalizing.
    pub fn write(&mut self, data: &Value) {
        self.buffer.push_str(&stringify(data));
    }

    /// Finalize with `data`, or with the accumulated buffer when absent.
    pub fn end(&mut self, data: Option<Value>) {
        self.finalize(data);
    }

    pub fn send(&mut self, data: Value) {
        self.finalize(Some(data));
    }

    pub fn json(&mut self, data: Value) {
        self.finalize(Some(data));
    }

    pub fn send_with_status(&mut self, code: u16, data: Value) {
        self.status(code);
        self.finalize(Some(data));
    }

    pub fn json_with_status(&mut self, code: u16, data: Value) {
        self.send_with_status(code, data);
    }

    pub fn is_finalized(&self) -> bool {
        self.completion.is_none()
    }

    /// Open → Finalized, exactly once. Resolves when no positive status was
    /// recorded or the status is 2xx; rejects otherwise.
    fn finalize(&mut self, data: Option<Value>) {
        let tx = match self.completion.take() {
            Some(tx) => tx,
            None => return,
        };
        let resolved = match self.status {
            Some(code) if code > 0 => (200..300).contains(&code),
            _ => true,
        };
        let payload = data.unwrap_or_else(|| Value::String(std::mem::take(&mut self.buffer)));
        let outcome = if resolved {
            Outcome::Resolved(payload)
        } else {
            Outcome::Rejected(payload)
        };
        let _ = tx.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn end_resolves_without_status() {
        let (mut res, rx) = Responder::channel();
        res.end(Some(json!({"ok": true})));
        assert!(res.is_finalized());
        assert_eq!(rx.await.unwrap(), Outcome::Resolved(json!({"ok": true})));
    }

    #[tokio::test]
    async fn two_hundreds_resolve_and_others_reject() {
        let (mut res, rx) = Responder::channel();
        res.status(204).end(Some(json!("no content")));
        assert_eq!(rx.await.unwrap(), Outcome::Resolved(json!("no content")));

        let (mut res, rx) = Responder::channel();
        res.status(404).end(Some(json!("missing")));
        assert_eq!(rx.await.unwrap(), Outcome::Rejected(json!("missing")));
    }

    #[tokio::test]
    async fn zero_status_counts_as_unset() {
        let (mut res, rx) = Responder::channel();
        res.status(0).end(Some(json!("ok")));
        assert_eq!(rx.await.unwrap(), Outcome::Resolved(json!("ok")));
    }

    #[tokio::test]
    async fn finalize_twice_is_a_noop() {
        let (mut res, rx) = Responder::channel();
        res.send(json!("first"));
        res.send(json!("second"));
        res.status(500).end(Some(json!("third")));
        assert_eq!(rx.await.unwrap(), Outcome::Resolved(json!("first")));
    }

    #[tokio::test]
    async fn end_without_data_drains_the_write_buffer() {
        let (mut res, rx) = Responder::channel();
        res.write(&json!("chunk-1 "));
        res.write(&json!({"n": 2}));
        res.end(None);
        assert_eq!(
            rx.await.unwrap(),
            Outcome::Resolved(json!(r#"chunk-1 {"n":2}"#))
        );
    }

    #[tokio::test]
    async fn send_with_status_rejects_on_conflict() {
        let (mut res, rx) = Responder::channel();
        res.send_with_status(409, json!("conflict"));
        assert_eq!(rx.await.unwrap(), Outcome::Rejected(json!("conflict")));
    }

    #[tokio::test]
    async fn dropping_unfinalized_closes_the_channel() {
        let (res, rx) = Responder::channel();
        drop(res);
        assert!(rx.await.is_err());
    }
}
