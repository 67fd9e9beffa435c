//! Transport collaborator
//!
//! The session never talks HTTP itself. It hands [`TechCardRequest`]s to a
//! [`TechCardTransport`] and receives already-parsed JSON bodies back.
//! Implementations decode raw bodies with [`parse_envelope`].

use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt::{self, Display, Formatter};

/// One request to the tech-card service
#[derive(Debug, Clone, PartialEq)]
pub enum TechCardRequest {
    /// List object types
    ObjectTypes,
    /// List elements of an object type
    Elements {
        /// Object type id
        type_id: i64,
    },
    /// Fetch the parameter tree of an element
    ElementTree {
        /// Element id
        element_id: i64,
    },
    /// Submit an encoded payload (per-edit or final)
    UpdateTechCard {
        /// Wire payload from `encode`
        tech_card: Value,
    },
}

impl TechCardRequest {
    /// Endpoint path segment
    #[inline]
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::ObjectTypes => "object",
            Self::Elements { .. } => "element",
            Self::ElementTree { .. } => "elementParamValue",
            Self::UpdateTechCard { .. } => "updateTechCard",
        }
    }

    /// JSON request body
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::ObjectTypes => json!({}),
            Self::Elements { type_id } => json!({ "type": type_id }),
            Self::ElementTree { element_id } => json!({ "idElement": element_id }),
            Self::UpdateTechCard { tech_card } => json!({ "techCard": tech_card }),
        }
    }
}

impl Display for TechCardRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "POST {} {}", self.endpoint(), self.body())
    }
}

/// Async transport to the tech-card service
#[async_trait]
pub trait TechCardTransport: Send + Sync {
    /// Send one request and return the parsed response body
    async fn send(&self, request: TechCardRequest) -> TransportResult<Value>;

    /// Fetch object types
    async fn object_types(&self) -> TransportResult<Value> {
        self.send(TechCardRequest::ObjectTypes).await
    }

    /// Fetch elements of an object type
    async fn elements(&self, type_id: i64) -> TransportResult<Value> {
        self.send(TechCardRequest::Elements { type_id }).await
    }

    /// Fetch the parameter tree of an element
    async fn element_tree(&self, element_id: i64) -> TransportResult<Value> {
        self.send(TechCardRequest::ElementTree { element_id }).await
    }

    /// Submit an encoded payload
    async fn update_tech_card(&self, tech_card: Value) -> TransportResult<Value> {
        self.send(TechCardRequest::UpdateTechCard { tech_card }).await
    }
}

/// Map an HTTP status to a transport error
///
/// # Errors
/// `TransportError::Http` for any status outside `200..300`
#[inline]
pub fn check_status(status: u16) -> TransportResult<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(TransportError::Http { status })
    }
}

/// Decode a response body
///
/// The service wraps its JSON in a JSON string. The body is parsed once and,
/// when that yields a string, parsed again. Plain JSON is accepted as is.
///
/// # Errors
/// `TransportError::Envelope` if the body is not JSON
pub fn parse_envelope(text: &str) -> TransportResult<Value> {
    let outer: Value =
        serde_json::from_str(text).map_err(|err| TransportError::Envelope(err.to_string()))?;
    match outer {
        Value::String(inner) => match serde_json::from_str(&inner) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(inner)),
        },
        other => Ok(other),
    }
}
