//! Download of release archives and bootstrap scripts

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::artifact::error::FetchError;

/// Trait for fetching a remote resource into a local file
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dest`.
    ///
    /// `dest` must only appear once the download completed.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

/// HTTP fetcher streaming the body into `<dest>.part` and renaming it into place
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn download(&self, url: &str, partial: &Path) -> Result<(), FetchError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(partial).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        debug!("Downloaded {} bytes from {}", written, url);
        Ok(())
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        debug!("{} -> {:?}", url, dest);

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial = partial_path(dest);
        if let Err(e) = self.download(url, &partial).await {
            warn!("Failed to download {}: {}", url, e);
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, dest).await?;
        Ok(())
    }
}
