//! Shared fixtures for integration tests

mod release;

pub use release::{NoTrunk, ReleaseIndex};
