//! Artifact cache for release environments
//!
//! Downloads release archives, extracts them atomically and keeps a trunk
//! checkout fresh, all under a single cache root.
//!
//! # Modules
//!
//! - [`layout`]: deterministic paths under the cache root
//! - [`cache`]: `ArtifactCache::ensure`, the only writer of the cache tree
//! - [`fetcher`]: HTTP download of archives and bootstrap scripts
//! - [`extractor`]: `.tar.gz` extraction
//! - [`trunk`]: git checkout of the development trunk
//! - [`error`]: error types for cache operations

pub mod cache;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod layout;
pub mod trunk;

pub use cache::{ArtifactCache, CacheEntry, Collaborators, EntryState};
pub use layout::CacheLayout;

#[cfg(test)]
pub(crate) mod testing {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    /// Build an in-memory `.tar.gz` with every file under `root/`
    pub(crate) fn tarball(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, body) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o755);
            builder
                .append_data(&mut header, format!("{}/{}", root, name), body.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }
}
