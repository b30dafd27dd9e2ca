//! Error reporting and diagnostic messages for prefab.
//!
//! Library crates return structured errors; anything that reaches a user is
//! first turned into a [`DiagnosticMessage`], which renders as tidyverse-style
//! text ([`DiagnosticMessage::to_text`]) or JSON ([`DiagnosticMessage::to_json`]).
//!
//! ```
//! use prefab_error_reporting::DiagnosticMessageBuilder;
//!
//! let error = DiagnosticMessageBuilder::error("Undefined profile")
//!     .with_code("PF-3-2")
//!     .problem("host 'vm1': profile 'web' not defined in config")
//!     .add_hint("Define `web` under `profiles`?")
//!     .build();
//!
//! assert!(error.to_text().starts_with("Error [PF-3-2]: Undefined profile"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_error_info, get_subsystem};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage};
