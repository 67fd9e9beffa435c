//! Testing utilities for the TechCard workspace
//!
//! Wire fixtures and a scripted in-memory transport.

#![allow(missing_docs)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use techcard_model::CompositeKey;
use techcard_session::{
    check_status, parse_envelope, TechCardRequest, TechCardTransport, TransportError,
    TransportResult,
};
use tokio::sync::Mutex;

/// Pipe element tree: one block with integer, real and choice parameters
pub fn pipe_tree() -> Value {
    json!({
        "type": "pipe",
        "params": {
            "2": {"name": "Dims", "params": {
                "10": {"name": "Thickness", "val": 8.5},
                "1": {"name": "Diameter", "val": 273}
            }},
            "1": {"name": "Object", "params": {
                "0": {"name": "Объект контроля", "val": {"id": 7, "name": "Pipe D273x8"}},
                "1.4": {"name": "Grade", "val": {"1": "St20", "2": "09G2S"}},
                "1.10": {"name": "Welded", "val": true}
            }}
        }
    })
}

/// Object-types response
pub fn object_types() -> Value {
    json!({"type": {"1": "Труба", "0": "Пластина"}, "params": {}})
}

/// Elements response for an object type
pub fn elements() -> Value {
    json!({"type": null, "params": {"1": {"name": "Object", "params": {
        "0": {"name": "Объект контроля", "val": {
            "2": "Труба Д273x8; АТС-0002-21",
            "1": "Труба Д273x8; АТС-0001-21"
        }}
    }}}})
}

/// Single-parameter response
pub fn single_param(block: &str, param: &str, name: &str, val: Value) -> Value {
    json!({"type": "pipe", "params": {block: {"name": "Block", "params": {
        param: {"name": name, "val": val}
    }}}})
}

/// Parse a composite key
pub fn key(text: &str) -> CompositeKey {
    text.parse().unwrap()
}

#[derive(Debug)]
enum Reply {
    Body { text: String, delay: Duration },
    Status { status: u16, delay: Duration },
    Failure { error: TransportError, delay: Duration },
}

impl Reply {
    fn delay(&self) -> Duration {
        match self {
            Self::Body { delay, .. } | Self::Status { delay, .. } | Self::Failure { delay, .. } => {
                *delay
            }
        }
    }
}

/// In-memory transport answering from per-endpoint queues
///
/// Replies are popped when a request arrives, then delivered after their
/// delay. Bodies go through `parse_envelope` like a real HTTP transport.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    requests: Mutex<Vec<TechCardRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply, double-encoded like the real service
    pub async fn push_json(&self, endpoint: &'static str, value: Value) {
        self.push_json_delayed(endpoint, value, Duration::ZERO).await;
    }

    pub async fn push_json_delayed(&self, endpoint: &'static str, value: Value, delay: Duration) {
        let text = serde_json::to_string(&value.to_string()).unwrap();
        self.push(endpoint, Reply::Body { text, delay }).await;
    }

    /// Queue a raw body
    pub async fn push_body(&self, endpoint: &'static str, text: impl Into<String>) {
        let reply = Reply::Body {
            text: text.into(),
            delay: Duration::ZERO,
        };
        self.push(endpoint, reply).await;
    }

    pub async fn push_status(&self, endpoint: &'static str, status: u16) {
        let reply = Reply::Status {
            status,
            delay: Duration::ZERO,
        };
        self.push(endpoint, reply).await;
    }

    pub async fn push_failure(&self, endpoint: &'static str, error: TransportError) {
        self.push_failure_delayed(endpoint, error, Duration::ZERO).await;
    }

    pub async fn push_failure_delayed(
        &self,
        endpoint: &'static str,
        error: TransportError,
        delay: Duration,
    ) {
        self.push(endpoint, Reply::Failure { error, delay }).await;
    }

    /// Requests received so far, in arrival order
    pub async fn requests(&self) -> Vec<TechCardRequest> {
        self.requests.lock().await.clone()
    }

    async fn push(&self, endpoint: &'static str, reply: Reply) {
        self.replies
            .lock()
            .await
            .entry(endpoint)
            .or_default()
            .push_back(reply);
    }
}

#[async_trait]
impl TechCardTransport for ScriptedTransport {
    async fn send(&self, request: TechCardRequest) -> TransportResult<Value> {
        let endpoint = request.endpoint();
        self.requests.lock().await.push(request);

        let reply = self
            .replies
            .lock()
            .await
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| TransportError::Unavailable(format!("no reply scripted for {endpoint}")))?;

        tokio::time::sleep(reply.delay()).await;
        match reply {
            Reply::Body { text, .. } => parse_envelope(&text),
            Reply::Status { status, .. } => check_status(status).map(|()| Value::Null),
            Reply::Failure { error, .. } => Err(error),
        }
    }
}
