//! Archive extraction

use std::fs::File;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use tracing::debug;

use crate::artifact::error::ExtractError;

/// Trait for unpacking a release archive into a directory
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Unpack `archive` into the existing directory `dest`
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError>;
}

/// Extractor for gzip-compressed tarballs
#[derive(Debug, Default)]
pub struct TarGzExtractor;

#[async_trait]
impl Extractor for TarGzExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError> {
        debug!("tar xzf {:?} -C {:?}", archive, dest);

        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), ExtractError> {
            let decoder = GzDecoder::new(File::open(&archive)?);
            tar::Archive::new(decoder).unpack(&dest)?;
            Ok(())
        })
        .await?
    }
}
