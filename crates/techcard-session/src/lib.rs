//! TechCard Session
//!
//! Lifetime of one inspection form: element selection, edit round trips,
//! reconciliation of out-of-order responses and final submission.
//!
//! # Core Concepts
//!
//! - [`FormSession`]: owns the tree, edits and standard-values cache; no I/O
//! - [`FormDriver`]: runs round trips concurrently and applies them in arrival order
//! - [`TechCardTransport`]: the collaborator that talks to the service
//! - [`SessionConfig`]: timeouts, labels and the element locator, loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use techcard_session::{Completion, FormSession};
//!
//! let mut session = FormSession::default();
//! let load = session.select_element("42")?;
//! let wire = json!({"type": "pipe", "params": {"2": {"name": "Dims", "params": {
//!     "1": {"name": "Diameter", "val": 273}
//! }}}});
//! assert!(matches!(
//!     session.complete(load, Ok(wire))?,
//!     Completion::Applied { seeded: 1, .. }
//! ));
//!
//! let key = "2.1".parse()?;
//! let _pending = session.begin_edit(&key, "300")?;
//! assert_eq!(session.payload()["params"]["2"]["params"]["1"]["val"], "300");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod catalog;
pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod transport;

// Re-exports
pub use catalog::{decode_object_types, extract_elements, CatalogEntry, ElementLocator};
pub use config::{Labels, SessionConfig};
pub use driver::{Finished, FormDriver};
pub use error::{
    ConfigError, InvalidField, SessionError, SessionResult, TransportError, TransportResult,
};
pub use session::{
    Completion, FieldView, FormSession, PendingRequest, RequestId, RequestSlot,
};
pub use transport::{check_status, parse_envelope, TechCardRequest, TechCardTransport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a form session
    pub use crate::{
        Completion, FormDriver, FormSession, SessionConfig, SessionError, SessionResult,
        TechCardTransport, TransportError,
    };
    pub use techcard_sync::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
