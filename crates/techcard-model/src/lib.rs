//! TechCard Model
//!
//! Data model for the server-defined block/parameter tree of a tech card.
//!
//! # Core Concepts
//!
//! - [`CompositeKey`]: `blockId.paramId`, the unique address of one parameter
//! - [`RawValue`]: tagged variant for untyped wire values
//! - [`Tree`]: ordered blocks of ordered parameters
//! - [`EditState`]: user-entered text per composite key
//! - [`order`]: deterministic comparator for block and dotted param ids
//!
//! # Example
//!
//! ```rust
//! use techcard_model::{BlockId, CompositeKey, ParamId};
//!
//! let key = CompositeKey::new(&BlockId::from("2"), &ParamId::from("1.4"));
//! assert_eq!(key.to_string(), "2.1.4");
//!
//! let (block, param) = key.decode().unwrap();
//! assert_eq!(block.as_str(), "2");
//! assert_eq!(param.as_str(), "1.4");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod edit;
pub mod key;
pub mod order;
pub mod tree;
pub mod value;

// Re-exports
pub use edit::EditState;
pub use key::{BlockId, CompositeKey, KeyError, ParamId};
pub use order::{compare_block_ids, compare_param_ids, order_blocks, order_params, ParamRank};
pub use tree::{Block, Parameter, Tree};
pub use value::{RawValue, Scalar};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the tree model
    pub use crate::{
        Block, BlockId, CompositeKey, EditState, ParamId, Parameter, RawValue, Scalar, Tree,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
