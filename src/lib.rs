//! Purpose: Library crate behind the `dniscan` CLI and tests.
//! Exports: `core` (scheme detection, parsing, records, errors), `api`, `notice`.
//! Role: Parses decoded PDF417 identity-card payloads; no I/O, no logging.
//! Invariants: Callers go through `api` for the stable surface; `core` may change.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub mod notice;
