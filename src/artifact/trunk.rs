//! Working checkout of the development trunk

use std::ffi::OsString;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::artifact::error::TrunkError;

/// Trait for keeping a trunk checkout up to date
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrunkSync: Send + Sync {
    /// Clone into `dest` if absent, otherwise bring it up to date
    async fn sync(&self, dest: &Path) -> Result<(), TrunkError>;
}

/// Trunk checkout managed with the `git` command line
pub struct GitTrunk {
    url: String,
    branch: String,
}

impl GitTrunk {
    pub fn new(url: &str, branch: &str) -> Self {
        Self {
            url: url.to_string(),
            branch: branch.to_string(),
        }
    }

    /// The git invocations `sync` will run for `dest`
    pub fn commands(&self, dest: &Path) -> Vec<Vec<OsString>> {
        if dest.exists() {
            vec![
                vec!["-C".into(), dest.into(), "fetch".into(), "-a".into()],
                vec![
                    "-C".into(),
                    dest.into(),
                    "pull".into(),
                    "--rebase".into(),
                    "origin".into(),
                    self.branch.clone().into(),
                ],
            ]
        } else {
            vec![vec![
                "clone".into(),
                self.url.clone().into(),
                dest.into(),
            ]]
        }
    }
}

async fn run_git(args: &[OsString]) -> Result<(), TrunkError> {
    let command = format!(
        "git {}",
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    debug!("{}", command);

    let status = Command::new("git")
        .args(args)
        .status()
        .await
        .map_err(|source| TrunkError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(TrunkError::Failed {
            command,
            code: status.code(),
        });
    }
    Ok(())
}

#[async_trait]
impl TrunkSync for GitTrunk {
    async fn sync(&self, dest: &Path) -> Result<(), TrunkError> {
        if dest.exists() {
            info!("Updating trunk checkout {:?}", dest);
        } else {
            info!("Cloning {} into {:?}", self.url, dest);
        }
        for args in self.commands(dest) {
            run_git(&args).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn commands_clone_when_checkout_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("ansible-devel");
        let trunk = GitTrunk::new("https://github.com/ansible/ansible", "devel");

        let commands = trunk.commands(&dest);

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0][0], "clone");
        assert_eq!(commands[0][1], "https://github.com/ansible/ansible");
        assert_eq!(commands[0][2], dest.as_os_str());
    }

    #[test]
    fn commands_fetch_and_rebase_existing_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let trunk = GitTrunk::new("https://github.com/ansible/ansible", "devel");

        let commands = trunk.commands(temp_dir.path());

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0][2], "fetch");
        assert_eq!(
            commands[1][2..],
            ["pull", "--rebase", "origin", "devel"].map(OsString::from)
        );
    }
}
