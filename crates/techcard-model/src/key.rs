//! Identifiers and composite keys
//!
//! Provides [`BlockId`], [`ParamId`] and [`CompositeKey`], the address of a
//! single parameter across the whole block tree.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between the block half and the param half of a composite key
pub const KEY_SEPARATOR: char = '.';

/// Block identifier as sent by the server (integer-valued text)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Create block id from text
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parameter identifier: dot-separated integer segments (`"1.4.2"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(String);

impl ParamId {
    /// Create param id from text
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw id text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterator over the dot-separated segments
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_SEPARATOR)
    }
}

macro_rules! id_conversions {
    ($ty:ident) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

id_conversions!(BlockId);
id_conversions!(ParamId);

/// `blockId.paramId`, unique within one tree snapshot
///
/// The param half keeps its own dots verbatim, so decoding splits on the
/// first separator only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Build key from its halves
    #[inline]
    #[must_use]
    pub fn new(block: &BlockId, param: &ParamId) -> Self {
        let mut key = String::with_capacity(block.0.len() + param.0.len() + 1);
        key.push_str(&block.0);
        key.push(KEY_SEPARATOR);
        key.push_str(&param.0);
        Self(key)
    }

    /// Split key into block and param halves
    ///
    /// # Errors
    /// Returns error if the separator is missing or either half is empty
    pub fn decode(&self) -> Result<(BlockId, ParamId), KeyError> {
        split_key(&self.0)
    }

    /// Block half (text before the first separator)
    #[must_use]
    pub fn block_part(&self) -> Option<&str> {
        self.0.split_once(KEY_SEPARATOR).map(|(block, _)| block)
    }

    /// Param half (text after the first separator)
    #[must_use]
    pub fn param_part(&self) -> Option<&str> {
        self.0.split_once(KEY_SEPARATOR).map(|(_, param)| param)
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn split_key(text: &str) -> Result<(BlockId, ParamId), KeyError> {
    let (block, param) = text
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| KeyError::MissingSeparator(text.to_string()))?;
    if block.is_empty() {
        return Err(KeyError::EmptyBlock(text.to_string()));
    }
    if param.is_empty() {
        return Err(KeyError::EmptyParam(text.to_string()));
    }
    Ok((BlockId::from(block), ParamId::from(param)))
}

impl Display for CompositeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CompositeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (block, param) = split_key(s)?;
        Ok(Self::new(&block, &param))
    }
}

impl AsRef<str> for CompositeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors decoding composite keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// No `.` between block and param halves
    #[error("composite key '{0}' has no block/param separator")]
    MissingSeparator(String),

    /// Nothing before the separator
    #[error("composite key '{0}' has an empty block id")]
    EmptyBlock(String),

    /// Nothing after the separator
    #[error("composite key '{0}' has an empty param id")]
    EmptyParam(String),
}
