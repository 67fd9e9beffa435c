//! Form session
//!
//! [`FormSession`] owns everything one inspector's form needs for its
//! lifetime: the current [`Tree`], the [`EditState`], the standard-values
//! cache and the bookkeeping for in-flight requests. It performs no I/O.
//! Requests leave as [`PendingRequest`]s and come back through
//! [`FormSession::complete`], in any order.
//!
//! # Staleness
//!
//! Every request occupies a [`RequestSlot`] (the edited key, the final
//! submission, or the element load) and carries a generation. Only the
//! latest generation issued for a slot may apply its response; older ones
//! complete as [`Completion::Superseded`]. Selecting another element
//! supersedes everything in flight.

use crate::config::SessionConfig;
use crate::error::{InvalidField, SessionError, SessionResult, TransportResult};
use crate::transport::TechCardRequest;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use techcard_model::{BlockId, CompositeKey, EditState, ParamId, Parameter, Tree};
use techcard_sync::{
    decode_with, encode, infer_type, keystroke_filter, merge_in_place, validate, DecodeOptions,
    StandardValuesCache, ValueType, Verdict,
};
use ulid::Ulid;

/// Unique id of one dispatched request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestId(Ulid);

impl RequestId {
    /// Generate new id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a request is for; one live generation per slot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    /// Initial tree of the selected element
    Load,
    /// Round trip after editing one parameter
    Edit(CompositeKey),
    /// Final submission
    Final,
}

impl Display for RequestSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Edit(key) => write!(f, "edit {key}"),
            Self::Final => f.write_str("final"),
        }
    }
}

/// A request issued by the session, awaiting its response
#[derive(Debug, Clone)]
pub struct PendingRequest {
    id: RequestId,
    slot: RequestSlot,
    epoch: u64,
    generation: u64,
    request: TechCardRequest,
}

impl PendingRequest {
    /// Request id
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Slot the request occupies
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &RequestSlot {
        &self.slot
    }

    /// Request to hand to the transport
    #[inline]
    #[must_use]
    pub fn request(&self) -> &TechCardRequest {
        &self.request
    }
}

/// Result of applying a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response replaced the tree
    Applied {
        /// Keys newly seeded into the edit state
        seeded: usize,
        /// Parameters in the new tree
        params: usize,
    },
    /// The response carried no blocks; nothing changed
    Unchanged,
    /// A newer request for the same slot exists; nothing changed
    Superseded,
}

/// Render model for one parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    /// Composite key
    pub key: CompositeKey,
    /// Owning block id
    pub block_id: BlockId,
    /// Owning block name
    pub block_name: String,
    /// Parameter id
    pub param_id: ParamId,
    /// Parameter name
    pub name: String,
    /// Type inferred from the current value
    pub value_type: ValueType,
    /// Input hint for the type
    pub hint: Option<&'static str>,
    /// Current edit text
    pub text: String,
    /// Choices to offer
    pub standard_values: Vec<String>,
    /// Validation verdict for `text`
    pub verdict: Verdict,
}

/// State of one form session
#[derive(Debug)]
pub struct FormSession {
    config: SessionConfig,
    decode_options: DecodeOptions,
    object_type: Option<String>,
    element: Option<i64>,
    epoch: u64,
    next_generation: u64,
    generations: HashMap<RequestSlot, u64>,
    tree: Tree,
    edits: EditState,
    standard_values: StandardValuesCache,
}

impl FormSession {
    /// Create session
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            decode_options: config.decode_options(),
            standard_values: config.standard_values_cache(),
            config,
            object_type: None,
            element: None,
            epoch: 0,
            next_generation: 0,
            generations: HashMap::new(),
            tree: Tree::empty(),
            edits: EditState::new(),
        }
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Current edits
    #[inline]
    #[must_use]
    pub fn edits(&self) -> &EditState {
        &self.edits
    }

    /// Selected element id
    #[inline]
    #[must_use]
    pub fn element(&self) -> Option<i64> {
        self.element
    }

    /// Standard-values cache of this session
    #[inline]
    #[must_use]
    pub fn standard_values(&self) -> &StandardValuesCache {
        &self.standard_values
    }

    /// Object type sent with payloads
    ///
    /// An explicitly chosen type wins over the one reported in the tree.
    #[must_use]
    pub fn object_type(&self) -> Option<&str> {
        self.object_type
            .as_deref()
            .or(self.tree.object_type.as_deref())
    }

    /// Choose the object type sent with payloads
    #[inline]
    pub fn set_object_type(&mut self, object_type: Option<String>) {
        self.object_type = object_type;
    }

    /// Select an element and issue the load of its tree
    ///
    /// Resets the tree, the edits and the standard-values cache, and
    /// supersedes every request in flight.
    ///
    /// # Errors
    /// `SessionError::InvalidElementId` if `element_id` is not an integer
    pub fn select_element(&mut self, element_id: &str) -> SessionResult<PendingRequest> {
        let id: i64 = element_id
            .trim()
            .parse()
            .map_err(|_| SessionError::InvalidElementId(element_id.to_string()))?;

        self.element = Some(id);
        self.epoch += 1;
        self.generations.clear();
        self.tree = Tree::empty();
        self.edits.clear();
        self.standard_values.invalidate_all();
        tracing::info!(element = id, epoch = self.epoch, "element selected");

        Ok(self.issue(
            RequestSlot::Load,
            TechCardRequest::ElementTree { element_id: id },
        ))
    }

    /// Install a tree, seeding untouched keys and caching choices
    ///
    /// A tree without blocks leaves the session untouched.
    pub fn apply_tree(&mut self, tree: Tree) -> Completion {
        if tree.is_empty() {
            return Completion::Unchanged;
        }
        let seeded = merge_in_place(&mut self.edits, &tree);
        self.standard_values.cache_tree(&tree);
        let params = tree.param_count();
        self.tree = tree;
        Completion::Applied { seeded, params }
    }

    /// Offer typed text to a field
    ///
    /// Text that could never become a value of the field's type is refused
    /// silently; returns whether it was taken.
    ///
    /// # Errors
    /// `SessionError::UnknownKey` if no displayed parameter has `key`
    pub fn type_into(&mut self, key: &CompositeKey, candidate: &str) -> SessionResult<bool> {
        let value_type = infer_type(&self.param(key)?.value);
        if !keystroke_filter(candidate, value_type) {
            return Ok(false);
        }
        self.edits.set(key.clone(), candidate);
        Ok(true)
    }

    /// Set a field's text without filtering (e.g. a picked choice)
    ///
    /// # Errors
    /// `SessionError::UnknownKey` if no displayed parameter has `key`
    pub fn set_value(&mut self, key: &CompositeKey, text: impl Into<String>) -> SessionResult<()> {
        self.param(key)?;
        self.edits.set(key.clone(), text);
        Ok(())
    }

    /// Commit an edit and issue its round trip
    ///
    /// # Errors
    /// - `SessionError::NoElementSelected` before an element is chosen
    /// - `SessionError::UnknownKey` if no displayed parameter has `key`
    pub fn begin_edit(
        &mut self,
        key: &CompositeKey,
        text: impl Into<String>,
    ) -> SessionResult<PendingRequest> {
        self.require_element()?;
        self.set_value(key, text)?;
        let tech_card = self.payload();
        let pending = self.issue(
            RequestSlot::Edit(key.clone()),
            TechCardRequest::UpdateTechCard { tech_card },
        );
        tracing::debug!(request = %pending.id, key = %key, "edit dispatched");
        Ok(pending)
    }

    /// Issue the final submission
    ///
    /// # Errors
    /// - `SessionError::NoElementSelected` before an element is chosen
    /// - `SessionError::InvalidFields` while any field fails validation
    pub fn begin_final(&mut self) -> SessionResult<PendingRequest> {
        self.require_element()?;
        self.submission_gate()?;
        let tech_card = self.payload();
        let pending = self.issue(RequestSlot::Final, TechCardRequest::UpdateTechCard { tech_card });
        tracing::info!(request = %pending.id, "final submission dispatched");
        Ok(pending)
    }

    /// Check if a pending request may still apply its response
    #[must_use]
    pub fn is_current(&self, pending: &PendingRequest) -> bool {
        pending.epoch == self.epoch
            && self.generations.get(&pending.slot) == Some(&pending.generation)
    }

    /// Apply the outcome of a round trip
    ///
    /// Merges against the edits as they are now, not as they were when the
    /// request left.
    ///
    /// # Errors
    /// `SessionError::Transport` if the round trip failed; the tree and edits
    /// are left as they were
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        result: TransportResult<Value>,
    ) -> SessionResult<Completion> {
        if !self.is_current(&pending) {
            tracing::debug!(request = %pending.id, slot = %pending.slot, "completion superseded");
            return Ok(Completion::Superseded);
        }

        let wire = match result {
            Ok(wire) => wire,
            Err(err) => {
                tracing::warn!(
                    request = %pending.id,
                    slot = %pending.slot,
                    error = %err,
                    "round trip failed; keeping prior state"
                );
                return Err(err.into());
            }
        };

        let tree = decode_with(&wire, &self.decode_options);
        let completion = self.apply_tree(tree);
        tracing::info!(
            request = %pending.id,
            slot = %pending.slot,
            outcome = ?completion,
            "completion applied"
        );
        Ok(completion)
    }

    /// Wire payload for the current tree and edits
    #[must_use]
    pub fn payload(&self) -> Value {
        encode(self.object_type(), &self.tree, &self.edits)
    }

    /// Choices to offer for a key
    #[must_use]
    pub fn standard_values_for(&self, key: &CompositeKey) -> Vec<String> {
        self.tree
            .find(key)
            .map(|param| self.standard_values.lookup(param))
            .unwrap_or_default()
    }

    /// Render model of every displayed parameter, in display order
    #[must_use]
    pub fn field_views(&self) -> Vec<FieldView> {
        self.tree
            .flat_params()
            .map(|param| self.view(param))
            .collect()
    }

    /// Every field whose text fails validation
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<InvalidField> {
        self.tree
            .flat_params()
            .filter_map(|param| {
                let key = param.key();
                let text = self.edits.get(&key).unwrap_or_default();
                let verdict = validate(text, infer_type(&param.value));
                verdict.error_message.map(|message| InvalidField {
                    key,
                    name: param.name.clone(),
                    message,
                })
            })
            .collect()
    }

    /// Gate for final submission
    ///
    /// # Errors
    /// `SessionError::InvalidFields` listing every failing field
    pub fn submission_gate(&self) -> SessionResult<()> {
        let invalid = self.invalid_fields();
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(SessionError::InvalidFields(invalid))
        }
    }

    fn view(&self, param: &Parameter) -> FieldView {
        let key = param.key();
        let value_type = infer_type(&param.value);
        let text = self.edits.get(&key).unwrap_or_default().to_string();
        FieldView {
            block_id: param.block_id.clone(),
            block_name: param.block_name.clone(),
            param_id: param.id.clone(),
            name: param.name.clone(),
            value_type,
            hint: value_type.hint(),
            verdict: validate(&text, value_type),
            standard_values: self.standard_values.lookup(param),
            text,
            key,
        }
    }

    fn param(&self, key: &CompositeKey) -> SessionResult<&Parameter> {
        self.tree
            .find(key)
            .ok_or_else(|| SessionError::UnknownKey(key.clone()))
    }

    fn require_element(&self) -> SessionResult<i64> {
        self.element.ok_or(SessionError::NoElementSelected)
    }

    fn issue(&mut self, slot: RequestSlot, request: TechCardRequest) -> PendingRequest {
        self.next_generation += 1;
        self.generations.insert(slot.clone(), self.next_generation);
        PendingRequest {
            id: RequestId::new(),
            slot,
            epoch: self.epoch,
            generation: self.next_generation,
            request,
        }
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
