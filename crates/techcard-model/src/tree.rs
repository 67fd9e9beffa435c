//! Block/parameter tree
//!
//! A [`Tree`] is produced fresh by every decode of a server response and is
//! never mutated afterwards; a new snapshot replaces the old one.

use crate::key::{BlockId, CompositeKey, ParamId};
use crate::value::RawValue;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// One named, valued field within a block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Parameter id (dotted)
    pub id: ParamId,
    /// Display name
    pub name: String,
    /// Value as delivered
    pub value: RawValue,
    /// Owning block id
    pub block_id: BlockId,
    /// Owning block name
    pub block_name: String,
}

impl Parameter {
    /// Composite key addressing this parameter
    #[inline]
    #[must_use]
    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(&self.block_id, &self.id)
    }
}

/// A named group of related parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Block id (integer-valued text)
    pub id: BlockId,
    /// Display name
    pub name: String,
    /// Parameters in display order
    pub params: Vec<Parameter>,
}

impl Block {
    /// Create empty block
    #[inline]
    #[must_use]
    pub fn new(id: BlockId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Find parameter by id
    #[must_use]
    pub fn param(&self, id: &ParamId) -> Option<&Parameter> {
        self.params.iter().find(|param| &param.id == id)
    }
}

/// Decoded server response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    /// Object type reported by the server
    pub object_type: Option<String>,
    /// Blocks in display order
    pub blocks: Vec<Block>,
}

impl Tree {
    /// Empty tree (`{type: null, blocks: []}`)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the tree has no blocks
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every parameter, block by block, in display order
    pub fn flat_params(&self) -> impl Iterator<Item = &Parameter> {
        self.blocks.iter().flat_map(|block| block.params.iter())
    }

    /// Total parameter count
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.blocks.iter().map(|block| block.params.len()).sum()
    }

    /// Find block by id
    #[must_use]
    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    /// Find parameter by composite key
    #[must_use]
    pub fn find(&self, key: &CompositeKey) -> Option<&Parameter> {
        let (block_id, param_id) = key.decode().ok()?;
        self.block(&block_id)?.param(&param_id)
    }

    /// Composite keys of every parameter, in display order
    pub fn keys(&self) -> impl Iterator<Item = CompositeKey> + '_ {
        self.flat_params().map(Parameter::key)
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flat: Vec<&Parameter> = self.flat_params().collect();
        let mut state = serializer.serialize_struct("Tree", 3)?;
        state.serialize_field("type", &self.object_type)?;
        state.serialize_field("blocks", &self.blocks)?;
        state.serialize_field("flatParams", &flat)?;
        state.end()
    }
}
