//! Test utilities for PinSchema integration tests
//!
//! `TypeFixture` builds the standard type registry used across the tests,
//! either in code or from the JSON catalog under `tests/fixtures`.

pub mod type_fixture;
