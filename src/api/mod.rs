//! Purpose: Define the stable public Rust API boundary for `dniscan`.
//! Exports: Parser entry points, record types, reports, and the registration draft.
//! Role: Public, additive-only surface used by the CLI and embedding callers.
//! Invariants: Report JSON shapes are additive-only once published.

mod draft;
mod report;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::manual::{is_document_number, manual_entry};
pub use crate::core::parse::{
    DEFAULT_EXCERPT_BYTES, FailureKind, ParseFailure, ParseOptions, Scan, parse, scan,
};
pub use crate::core::record::{
    Candidate, IdentityRecord, Provenance, SexCode, UNAVAILABLE, to_iso_date,
};
pub use crate::core::scheme::{DelimiterScheme, SchemePriority};
pub use draft::RegistrationDraft;
pub use report::{candidates_json, failure_json, record_json, scan_json};
