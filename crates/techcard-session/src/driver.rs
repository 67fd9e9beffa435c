//! Async form driver
//!
//! [`FormDriver`] pairs a [`FormSession`] with a transport. Edit round trips
//! run concurrently in a [`JoinSet`]; their completions are applied to the
//! session one at a time, in arrival order. Nothing else touches the session
//! while a completion is applied.

use crate::catalog::{decode_object_types, extract_elements, CatalogEntry};
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult, TransportError, TransportResult};
use crate::session::{Completion, FormSession, PendingRequest, RequestId};
use crate::transport::{TechCardRequest, TechCardTransport};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use techcard_model::CompositeKey;
use techcard_sync::decode_with;
use tokio::task::JoinSet;

/// A finished round trip as applied to the session
#[derive(Debug)]
pub struct Finished {
    /// Request that finished
    pub id: RequestId,
    /// Outcome, or the transport failure that left the session untouched
    pub outcome: SessionResult<Completion>,
}

/// Drives one form session against a transport
pub struct FormDriver {
    session: FormSession,
    transport: Arc<dyn TechCardTransport>,
    timeout: Duration,
    in_flight: JoinSet<(PendingRequest, TransportResult<Value>)>,
}

impl std::fmt::Debug for FormDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDriver")
            .field("session", &self.session)
            .field("timeout", &self.timeout)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl FormDriver {
    /// Create driver
    ///
    /// # Errors
    /// `SessionError::Config` if the configuration is invalid
    pub fn new(transport: Arc<dyn TechCardTransport>, config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;
        Ok(Self {
            timeout: config.request_timeout(),
            session: FormSession::new(config),
            transport,
            in_flight: JoinSet::new(),
        })
    }

    /// Session state
    #[inline]
    #[must_use]
    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Mutable session state (typing, local value changes)
    #[inline]
    pub fn session_mut(&mut self) -> &mut FormSession {
        &mut self.session
    }

    /// Number of round trips still running
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Fetch the object-type catalog
    ///
    /// # Errors
    /// `SessionError::Transport` on transport failure
    pub async fn object_types(&self) -> SessionResult<Vec<CatalogEntry>> {
        let wire = self.call(TechCardRequest::ObjectTypes).await?;
        Ok(decode_object_types(&wire))
    }

    /// Fetch the elements of an object type
    ///
    /// # Errors
    /// - `SessionError::InvalidTypeId` if `type_id` is not an integer
    /// - `SessionError::Transport` on transport failure
    pub async fn elements(&self, type_id: &str) -> SessionResult<Vec<CatalogEntry>> {
        let type_id: i64 = type_id
            .trim()
            .parse()
            .map_err(|_| SessionError::InvalidTypeId(type_id.to_string()))?;
        let wire = self.call(TechCardRequest::Elements { type_id }).await?;
        let tree = decode_with(&wire, &self.session.config().decode_options());
        Ok(extract_elements(&tree, &self.session.config().element_locator))
    }

    /// Select an element and load its tree
    ///
    /// Round trips still running for the previous element are aborted.
    ///
    /// # Errors
    /// - `SessionError::InvalidElementId` if `element_id` is not an integer
    /// - `SessionError::Transport` on transport failure
    pub async fn select_element(&mut self, element_id: &str) -> SessionResult<Completion> {
        let pending = self.session.select_element(element_id)?;
        self.in_flight.abort_all();
        let result = self.call(pending.request().clone()).await;
        self.session.complete(pending, result)
    }

    /// Commit an edit and start its round trip
    ///
    /// # Errors
    /// Any error of [`FormSession::begin_edit`]
    ///
    /// # Panics
    /// If called outside a Tokio runtime
    pub fn edit(&mut self, key: &CompositeKey, text: impl Into<String>) -> SessionResult<RequestId> {
        let pending = self.session.begin_edit(key, text)?;
        Ok(self.spawn(pending))
    }

    /// Wait for the next round trip and apply it
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Finished> {
        loop {
            match self.in_flight.join_next().await? {
                Ok((pending, result)) => {
                    let id = pending.id();
                    let outcome = self.session.complete(pending, result);
                    return Some(Finished { id, outcome });
                }
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    tracing::error!(error = %err, "round trip task failed");
                }
            }
        }
    }

    /// Apply every outstanding round trip
    pub async fn settle(&mut self) -> Vec<Finished> {
        let mut finished = Vec::with_capacity(self.in_flight.len());
        while let Some(next) = self.next_completion().await {
            finished.push(next);
        }
        finished
    }

    /// Settle outstanding edits, then submit the final payload
    ///
    /// # Errors
    /// - `SessionError::InvalidFields` while any field fails validation
    /// - `SessionError::Transport` on transport failure
    pub async fn submit(&mut self) -> SessionResult<Completion> {
        for finished in self.settle().await {
            if let Err(err) = finished.outcome {
                tracing::warn!(request = %finished.id, error = %err, "edit failed before submit");
            }
        }
        let pending = self.session.begin_final()?;
        let result = self.call(pending.request().clone()).await;
        self.session.complete(pending, result)
    }

    fn spawn(&mut self, pending: PendingRequest) -> RequestId {
        let id = pending.id();
        let transport = Arc::clone(&self.transport);
        let timeout = self.timeout;
        self.in_flight.spawn(async move {
            let result = dispatch(transport.as_ref(), pending.request().clone(), timeout).await;
            (pending, result)
        });
        id
    }

    async fn call(&self, request: TechCardRequest) -> TransportResult<Value> {
        dispatch(self.transport.as_ref(), request, self.timeout).await
    }
}

/// Route a session request to its collaborator call
async fn dispatch(
    transport: &dyn TechCardTransport,
    request: TechCardRequest,
    timeout: Duration,
) -> TransportResult<Value> {
    tracing::debug!(endpoint = request.endpoint(), "sending request");
    match request {
        TechCardRequest::ObjectTypes => with_timeout(timeout, transport.object_types()).await,
        TechCardRequest::Elements { type_id } => {
            with_timeout(timeout, transport.elements(type_id)).await
        }
        TechCardRequest::ElementTree { element_id } => {
            with_timeout(timeout, transport.element_tree(element_id)).await
        }
        TechCardRequest::UpdateTechCard { tech_card } => {
            with_timeout(timeout, transport.update_tech_card(tech_card)).await
        }
    }
}

async fn with_timeout<F>(timeout: Duration, call: F) -> TransportResult<Value>
where
    F: Future<Output = TransportResult<Value>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(TransportError::Timeout {
            secs: timeout.as_secs(),
        }))
}
