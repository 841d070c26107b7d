//! Crate-level tests that need the HTTP stack or generated inputs.
//!
//! Module-local unit tests live next to the code they cover; this tree
//! holds the wiremock-backed client tests and the proptest suites.

mod common;
mod property;
mod unit;
