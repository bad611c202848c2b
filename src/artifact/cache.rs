//! Idempotent, atomic materialization of release environments

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::artifact::error::CacheError;
use crate::artifact::extractor::Extractor;
use crate::artifact::fetcher::Fetcher;
use crate::artifact::layout::{CacheLayout, bootstrap_script};
use crate::artifact::trunk::TrunkSync;
use crate::config::BootstrapSource;
use crate::version::is_devel;

/// Materialization state of a single version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Requested, nothing on disk yet
    Pending,
    /// Archive present in the cache
    Downloaded,
    /// Environment finalized at its canonical path
    Extracted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub version: String,
    pub archive: Option<PathBuf>,
    pub extracted: Option<PathBuf>,
    pub state: EntryState,
}

impl CacheEntry {
    fn pending(version: &str) -> Self {
        Self {
            version: version.to_string(),
            archive: None,
            extracted: None,
            state: EntryState::Pending,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == EntryState::Extracted
    }
}

/// Collaborators used to materialize environments
pub struct Collaborators {
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub trunk: Arc<dyn TrunkSync>,
}

/// On-disk store of release archives and their prepared environments.
///
/// Owns the cache root. A finalized environment directory is trusted forever;
/// only the trunk checkout is refreshed, on every [`ArtifactCache::ensure`].
pub struct ArtifactCache {
    layout: CacheLayout,
    releases_url: String,
    bootstrap: BootstrapSource,
    collaborators: Collaborators,
    known: HashSet<String>,
    entries: HashMap<String, CacheEntry>,
}

impl ArtifactCache {
    /// Create the cache, building the directory tree under the layout root
    pub fn new(
        layout: CacheLayout,
        releases_url: &str,
        bootstrap: BootstrapSource,
        collaborators: Collaborators,
    ) -> Result<Self, CacheError> {
        info!("Using artifact cache at {:?}", layout.root());
        layout.create_dirs()?;

        Ok(Self {
            layout,
            releases_url: releases_url.trim_end_matches('/').to_string(),
            bootstrap,
            collaborators,
            known: HashSet::new(),
            entries: HashMap::new(),
        })
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Declare identifiers obtained from the release lister
    pub fn register<I, S>(&mut self, versions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known.extend(versions.into_iter().map(Into::into));
    }

    pub fn entry(&self, version: &str) -> Option<&CacheEntry> {
        self.entries.get(version)
    }

    /// Return the ready environment directory for `version`, downloading and
    /// extracting it on first use.
    pub async fn ensure(&mut self, version: &str) -> Result<PathBuf, CacheError> {
        if !self.known.contains(version) {
            return Err(CacheError::UnknownVersion(version.to_string()));
        }

        if is_devel(version) {
            return self.ensure_trunk(version).await;
        }

        if let Some(dir) = self
            .entries
            .get(version)
            .filter(|entry| entry.is_ready())
            .and_then(|entry| entry.extracted.clone())
        {
            debug!("{} already prepared at {:?}", version, dir);
            return Ok(dir);
        }

        self.entries
            .entry(version.to_string())
            .or_insert_with(|| CacheEntry::pending(version));

        let archive = self.ensure_archive(version).await?;
        self.update(version, |entry| {
            entry.archive = Some(archive.clone());
            entry.state = EntryState::Downloaded;
        });

        let dir = self.ensure_extracted(version, &archive).await?;
        self.ensure_bootstrap(&dir).await?;
        self.update(version, |entry| {
            entry.extracted = Some(dir.clone());
            entry.state = EntryState::Extracted;
        });

        Ok(dir)
    }

    fn update(&mut self, version: &str, apply: impl FnOnce(&mut CacheEntry)) {
        if let Some(entry) = self.entries.get_mut(version) {
            apply(entry);
        }
    }

    async fn ensure_archive(&self, version: &str) -> Result<PathBuf, CacheError> {
        let archive = self.layout.archive_path(version);
        if archive.exists() {
            return Ok(archive);
        }

        let url = format!(
            "{}/{}",
            self.releases_url,
            CacheLayout::archive_name(version)
        );
        info!("Downloading {}", url);
        self.collaborators
            .fetcher
            .fetch(&url, &archive)
            .await
            .map_err(|source| CacheError::Download {
                url,
                path: archive.clone(),
                source,
            })?;
        Ok(archive)
    }

    /// Extract into a temporary sibling and move the result into place, so the
    /// canonical path only ever holds a complete tree.
    async fn ensure_extracted(&self, version: &str, archive: &Path) -> Result<PathBuf, CacheError> {
        let dest = self.layout.extracted_path(version);
        if dest.exists() {
            return Ok(dest);
        }

        let parent = self.layout.extracted_dir();
        let staging = tempfile::Builder::new()
            .prefix(&format!(".{}.", version))
            .suffix(".tmp")
            .tempdir_in(&parent)
            .map_err(CacheError::io(&parent))?;

        info!("Extracting {:?}", archive);
        self.collaborators
            .extractor
            .extract(archive, staging.path())
            .await
            .map_err(|source| CacheError::Extract {
                archive: archive.to_path_buf(),
                source,
            })?;

        let roots = std::fs::read_dir(staging.path())
            .map_err(CacheError::io(staging.path()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(CacheError::io(staging.path()))?;

        let moved = if roots.is_empty() {
            return Err(CacheError::EmptyArchive(archive.to_path_buf()));
        } else if roots.len() == 1 && roots[0].is_dir() {
            let moved = tokio::fs::rename(&roots[0], &dest).await;
            if let Err(e) = staging.close() {
                warn!("Failed to remove staging directory: {}", e);
            }
            moved
        } else {
            debug!("{:?} has no single top-level directory", archive);
            let staged = staging.keep();
            let moved = tokio::fs::rename(&staged, &dest).await;
            if moved.is_err() {
                let _ = tokio::fs::remove_dir_all(&staged).await;
            }
            moved
        };

        match moved {
            Ok(()) => Ok(dest),
            // another invocation finalized the same version first
            Err(_) if dest.is_dir() => {
                warn!("{:?} was finalized concurrently; using it", dest);
                Ok(dest)
            }
            Err(source) => Err(CacheError::Io { path: dest, source }),
        }
    }

    async fn ensure_bootstrap(&self, env_dir: &Path) -> Result<(), CacheError> {
        let script = bootstrap_script(env_dir);
        if script.exists() {
            return Ok(());
        }

        if let Some(parent) = script.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(CacheError::io(parent))?;
        }

        debug!("Installing bootstrap script {:?}", script);
        match &self.bootstrap {
            BootstrapSource::Url(url) => self
                .collaborators
                .fetcher
                .fetch(url, &script)
                .await
                .map_err(|source| CacheError::Download {
                    url: url.clone(),
                    path: script.clone(),
                    source,
                }),
            BootstrapSource::File(path) => tokio::fs::copy(path, &script)
                .await
                .map(|_| ())
                .map_err(CacheError::io(path)),
        }
    }

    async fn ensure_trunk(&mut self, version: &str) -> Result<PathBuf, CacheError> {
        let dir = self.layout.checkout_path(version);

        self.collaborators
            .trunk
            .sync(&dir)
            .await
            .map_err(|source| CacheError::Trunk {
                path: dir.clone(),
                source,
            })?;
        self.ensure_bootstrap(&dir).await?;

        self.entries.insert(
            version.to_string(),
            CacheEntry {
                version: version.to_string(),
                archive: None,
                extracted: Some(dir.clone()),
                state: EntryState::Extracted,
            },
        );
        Ok(dir)
    }
}
