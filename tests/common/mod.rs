//! Common test utilities for Quarry scenario and CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated workspace and home directories plus CLI helpers
//! - Fixtures: descriptor, solution and build-output writers
//! - `image`: synthesized managed PE images for the metadata reader

#![allow(dead_code)]

pub mod env;
pub mod fixtures;
pub mod image;

pub use env::*;
pub use fixtures::*;
