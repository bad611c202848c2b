use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Upstream defaults
// =============================================================================

/// Release index listing every published archive
pub const DEFAULT_RELEASES_URL: &str = "https://releases.ansible.com/ansible";

/// Repository cloned for the development trunk
pub const DEFAULT_TRUNK_URL: &str = "https://github.com/ansible/ansible";

/// Branch the trunk checkout is rebased onto
pub const DEFAULT_TRUNK_BRANCH: &str = "devel";

/// Known-good environment bootstrap script
pub const DEFAULT_BOOTSTRAP_SOURCE: &str =
    "https://raw.githubusercontent.com/ansible/ansible/devel/hacking/env-setup";

pub const DEFAULT_PACKAGE_NAME: &str = "ansible";

/// Results file, relative to the working directory
pub const DEFAULT_RESULT_LOG: &str = "ansible_versions.log";

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "RELEASE_MATRIX_CACHE_DIR";

const SYSTEM_CACHE_PARENT: &str = "/var/cache";
const CACHE_DIR_NAME: &str = "release-matrix";

/// Tool settings
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Cache root; resolved with [`cache_dir`] when unset
    pub cache_dir: Option<PathBuf>,
    pub releases_url: String,
    pub trunk_url: String,
    pub trunk_branch: String,
    /// `http(s)://` URL to download, or a local file to copy
    pub bootstrap_source: String,
    pub package_name: String,
    /// Executables rewritten to their per-version paths in test commands
    pub executables: Vec<String>,
    pub version_env_var: String,
    pub interpreter_env_var: String,
    pub result_log: PathBuf,
    /// Append the trunk identifier to listed releases
    pub include_trunk: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_dir: None,
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            trunk_url: DEFAULT_TRUNK_URL.to_string(),
            trunk_branch: DEFAULT_TRUNK_BRANCH.to_string(),
            bootstrap_source: DEFAULT_BOOTSTRAP_SOURCE.to_string(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            executables: vec![
                "ansible".to_string(),
                "ansible-playbook".to_string(),
                "ansible-doc".to_string(),
            ],
            version_env_var: "ANSIBLE_TEST_VERSION".to_string(),
            interpreter_env_var: "TEST_PYTHON".to_string(),
            result_log: PathBuf::from(DEFAULT_RESULT_LOG),
            include_trunk: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Identifier of the development trunk, e.g. `ansible-devel`
    pub fn trunk_id(&self) -> String {
        format!("{}-{}", self.package_name, crate::version::DEVEL_MARKER)
    }

    /// Cache root to use: the configured one, or the resolved default
    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(cache_dir)
    }
}

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub cache_dir: Option<PathBuf>,
    pub releases_url: Option<String>,
    pub result_log: Option<PathBuf>,
}

impl Settings {
    /// Replace every field for which an override is given
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(dir) = overrides.cache_dir {
            self.cache_dir = Some(dir);
        }
        if let Some(url) = overrides.releases_url {
            self.releases_url = url;
        }
        if let Some(path) = overrides.result_log {
            self.result_log = path;
        }
        self
    }
}

/// Where a bootstrap script comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapSource {
    Url(String),
    File(PathBuf),
}

impl BootstrapSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            BootstrapSource::Url(source.to_string())
        } else {
            BootstrapSource::File(PathBuf::from(source))
        }
    }
}

/// Returns the default cache root.
///
/// Uses $RELEASE_MATRIX_CACHE_DIR if set, otherwise /var/cache/release-matrix
/// when it exists or /var/cache is writable, otherwise ~/.release-matrix,
/// or ./.release-matrix if there is no home directory.
pub fn cache_dir() -> PathBuf {
    let system_dir = Path::new(SYSTEM_CACHE_PARENT).join(CACHE_DIR_NAME);
    let system_usable = system_dir.exists() || is_writable(Path::new(SYSTEM_CACHE_PARENT));
    cache_dir_with_env(
        std::env::var(CACHE_DIR_ENV).ok(),
        system_usable,
        dirs::home_dir(),
    )
}

fn cache_dir_with_env(
    env_override: Option<String>,
    system_usable: bool,
    home_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    if system_usable {
        return Path::new(SYSTEM_CACHE_PARENT).join(CACHE_DIR_NAME);
    }
    home_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(format!(".{}", CACHE_DIR_NAME))
}

fn is_writable(dir: &Path) -> bool {
    std::fs::metadata(dir)
        .map(|meta| meta.is_dir() && !meta.permissions().readonly())
        .unwrap_or(false)
        && tempfile::tempfile_in(dir).is_ok()
}
