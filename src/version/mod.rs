//! Release version handling
//!
//! Upstream release identifiers come in several inconsistent shapes
//! (`1.9.0.1`, `2.4.0.0-0.4.rc4`, `2.7.0rc2`, `ansible-devel`). This module
//! turns them into a total order.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Lister    │────▶│   Sorter    │────▶│ (matrix run)│
//! │  (fetch)    │     │   (order)   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Normalizer  │──▶ VersionKey
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`key`]: `VersionKey`, `Qualifier` and the devel sentinel
//! - [`normalizer`]: raw string to `VersionKey`
//! - [`sorter`]: release-precedence ordering with devel pinned last
//! - [`lister`]: sources of raw identifiers (HTML index, JSON file)
//! - [`error`]: error types for normalization and listing

pub mod error;
pub mod key;
pub mod lister;
pub mod normalizer;
pub mod sorter;

pub use key::{DEVEL_MARKER, Qualifier, VersionKey, is_devel};
pub use normalizer::normalize;
pub use sorter::sort_versions;
