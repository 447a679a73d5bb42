//! DocStore integration tests
//!
//! Organized by operation group: root-level writes, path-addressed
//! operations, persistence behaviour, and concurrent access.

mod persistence;
mod scenarios;
