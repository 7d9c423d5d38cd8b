//! On-disk layout of an install and its staging area.
//!
//! A version lives in `<install_root>/<version>/`. While a job runs its files
//! are written to the hidden sibling `<install_root>/.<version>.staging/` and
//! only moved into place once every file has been checked.

use std::io;
use std::path::{Path, PathBuf};

use storedl_core::BuildVersion;

/// Planned directories for one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Final location of the version.
    pub install_dir: PathBuf,
    /// Where the job writes until commit.
    pub staging_dir: PathBuf,
    /// Previous install while it is being replaced.
    backup_dir: PathBuf,
}

impl InstallLayout {
    pub fn plan(install_root: &Path, version: &BuildVersion) -> Self {
        Self {
            install_dir: install_root.join(version.as_str()),
            staging_dir: install_root.join(format!(".{version}.staging")),
            backup_dir: install_root.join(format!(".{version}.old")),
        }
    }

    /// Installed location of a manifest path.
    pub fn installed(&self, relative: &str) -> PathBuf {
        self.install_dir.join(relative)
    }

    /// Staging location of a manifest path.
    pub fn staged(&self, relative: &str) -> PathBuf {
        self.staging_dir.join(relative)
    }

    pub async fn has_install(&self) -> bool {
        tokio::fs::try_exists(&self.install_dir)
            .await
            .unwrap_or(false)
    }

    /// Create an empty staging directory, discarding leftovers of an
    /// interrupted job.
    pub async fn prepare_staging(&self) -> io::Result<()> {
        if tokio::fs::try_exists(&self.staging_dir).await? {
            tracing::debug!(
                target: "storedl.transfer",
                path = %self.staging_dir.display(),
                "removing stale staging directory"
            );
            tokio::fs::remove_dir_all(&self.staging_dir).await?;
        }
        tokio::fs::create_dir_all(&self.staging_dir).await
    }

    /// Remove the staging directory. Never fails the job.
    pub async fn discard_staging(&self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.staging_dir).await {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    target: "storedl.transfer",
                    path = %self.staging_dir.display(),
                    error = %e,
                    "failed to remove staging directory"
                );
            }
        }
    }

    /// Replace the whole install with the staging directory.
    ///
    /// The old install is moved aside first and restored if the final rename
    /// fails.
    pub async fn commit_replace(&self) -> io::Result<()> {
        let had_install = self.has_install().await;
        if had_install {
            if tokio::fs::try_exists(&self.backup_dir).await? {
                tokio::fs::remove_dir_all(&self.backup_dir).await?;
            }
            tokio::fs::rename(&self.install_dir, &self.backup_dir).await?;
        }

        if let Err(e) = tokio::fs::rename(&self.staging_dir, &self.install_dir).await {
            if had_install {
                if let Err(restore) = tokio::fs::rename(&self.backup_dir, &self.install_dir).await {
                    tracing::error!(
                        target: "storedl.transfer",
                        path = %self.install_dir.display(),
                        error = %restore,
                        "failed to restore previous install"
                    );
                }
            }
            return Err(e);
        }

        if had_install {
            if let Err(e) = tokio::fs::remove_dir_all(&self.backup_dir).await {
                tracing::warn!(
                    target: "storedl.transfer",
                    path = %self.backup_dir.display(),
                    error = %e,
                    "failed to remove previous install"
                );
            }
        }
        Ok(())
    }

    /// Move repaired files over their installed copies, then drop staging.
    pub async fn commit_repairs(&self, repaired: &[String]) -> io::Result<()> {
        for relative in repaired {
            let target = self.installed(relative);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::rename(self.staged(relative), &target).await?;
        }
        self.discard_staging().await;
        Ok(())
    }
}
