//! TechCard Sync
//!
//! Pure synchronization core between the server's block/parameter tree and
//! the client's edit state.
//!
//! # Core Concepts
//!
//! - [`decode`] / [`encode`]: nested wire tree ⇄ ordered [`Tree`](techcard_model::Tree)
//! - [`merge`]: reconcile a fresh tree with edits; touched keys always win
//! - [`infer_type`]: classify an untyped value as integer, real, boolean or string
//! - [`validate`] / [`keystroke_filter`]: post-hoc verdicts and the stricter typing gate
//! - [`StandardValuesCache`]: choice lists that outlive the response carrying them
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use techcard_model::EditState;
//! use techcard_sync::{decode, encode, merge};
//!
//! let wire = json!({
//!     "type": "pipe",
//!     "params": {"2": {"name": "Dims", "params": {
//!         "10": {"name": "Thickness", "val": 8.5},
//!         "1": {"name": "Diameter", "val": 273}
//!     }}}
//! });
//!
//! let tree = decode(&wire);
//! let mut edits = merge(&EditState::new(), &tree);
//! edits.set("2.1".parse().unwrap(), "300");
//!
//! let payload = encode(Some("pipe"), &tree, &edits);
//! assert_eq!(payload["params"]["2"]["params"]["1"]["val"], "300");
//! assert_eq!(payload["params"]["2"]["params"]["10"]["val"], 8.5);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod infer;
pub mod merge;
pub mod standard_values;
pub mod transform;
pub mod validate;

// Re-exports
pub use infer::{infer_type, ValueType};
pub use merge::{merge, merge_in_place, seed_value};
pub use standard_values::{
    cache_standard_values, extract_choices, lookup_standard_values, StandardValuesCache,
};
pub use transform::{decode, decode_with, encode, flat_view, DecodeOptions, FlatParam};
pub use validate::{keystroke_filter, validate, Verdict};

// Ordering is part of the core surface
pub use techcard_model::{order_blocks, order_params};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for the synchronization core
    pub use crate::{
        decode, encode, infer_type, keystroke_filter, merge, validate, StandardValuesCache,
        ValueType, Verdict,
    };
    pub use techcard_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
