//! Sources of release identifiers

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::version::error::ListerError;

const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Trait for listing the release identifiers published upstream
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReleaseLister: Send + Sync {
    /// Returns every known identifier in publication order (not sorted)
    async fn list_versions(&self) -> Result<Vec<String>, ListerError>;
}

/// Lists releases by scraping archive links from an HTML release index
pub struct HttpReleaseLister {
    client: Client,
    releases_url: String,
    trunk_id: Option<String>,
    href_re: Regex,
}

impl HttpReleaseLister {
    /// `trunk_id` is appended to every listing when set
    pub fn new(releases_url: &str, trunk_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            releases_url: releases_url.trim_end_matches('/').to_string(),
            trunk_id,
            href_re: Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap(),
        }
    }

    /// Extract archive identifiers from the index page body
    pub fn parse_index(&self, html: &str) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for caps in self.href_re.captures_iter(html) {
            let href = &caps[1];
            let Some(stem) = href.strip_suffix(ARCHIVE_SUFFIX) else {
                continue;
            };
            if href.contains("latest") {
                continue;
            }
            let id = stem.rsplit('/').next().unwrap_or(stem);
            if id.is_empty() || ids.iter().any(|existing| existing == id) {
                continue;
            }
            ids.push(id.to_string());
        }
        ids
    }
}

#[async_trait]
impl ReleaseLister for HttpReleaseLister {
    async fn list_versions(&self) -> Result<Vec<String>, ListerError> {
        debug!("Fetching release index: {}", self.releases_url);

        let response = self.client.get(&self.releases_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Release index returned status {}: {}", status, self.releases_url);
            return Err(ListerError::InvalidResponse(format!(
                "Release index returned status {}",
                status
            )));
        }

        let body = response.text().await?;
        let mut ids = self.parse_index(&body);
        debug!("Found {} release archives", ids.len());

        if let Some(trunk) = &self.trunk_id {
            ids.push(trunk.clone());
        }
        Ok(ids)
    }
}

/// Reads identifiers from a JSON array on disk, for offline runs
pub struct FileReleaseLister {
    path: PathBuf,
}

impl FileReleaseLister {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ReleaseLister for FileReleaseLister {
    async fn list_versions(&self) -> Result<Vec<String>, ListerError> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ListerError::File {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ListerError::Parse { path, source })
    }
}

/// Lister for the configured release index, or for `versions_from` when an
/// offline list is given
pub fn release_lister(settings: &Settings, versions_from: Option<&Path>) -> Box<dyn ReleaseLister> {
    match versions_from {
        Some(path) => Box::new(FileReleaseLister::new(path.to_path_buf())),
        None => Box::new(HttpReleaseLister::new(
            &settings.releases_url,
            settings.include_trunk.then(|| settings.trunk_id()),
        )),
    }
}
