//! Test utilities for sqlitekit integration tests
//!
//! Every fixture owns its own temporary directory, so tests never share a
//! database file and can run in parallel.

#![allow(dead_code)]

pub mod test_fixture;
